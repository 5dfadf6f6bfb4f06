/// json views for the presentation layer
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::invoice::InvoiceRecord;
use crate::item::SellableItem;
use crate::reservation::ReservationHold;
use crate::types::{HoldId, HoldState, InvoiceId, ItemId, ItemKind, ItemStatus, PaymentMode};

/// serializable view of an item as seen at a given instant
///
/// A hold that ran out is shown as available even before the lifecycle
/// has been asked to release it.
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemView {
    pub id: ItemId,
    pub kind: ItemKind,
    pub title: String,
    pub price: Money,
    pub area: Decimal,
    pub price_per_area: Option<Money>,
    pub status: ItemStatus,
    pub hold_expires_at: Option<DateTime<Utc>>,
    pub can_reserve: bool,
}

impl ItemView {
    pub fn from_item(item: &SellableItem, now: DateTime<Utc>) -> Self {
        let lapsed = item.hold_lapsed(now);
        let status = if lapsed { ItemStatus::Available } else { item.status };

        ItemView {
            id: item.id,
            kind: item.kind,
            title: item.title.clone(),
            price: item.price,
            area: item.area,
            price_per_area: item.price_per_area(),
            status,
            hold_expires_at: if lapsed { None } else { item.hold_expires_at },
            can_reserve: status == ItemStatus::Available,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// serializable view of a hold with its countdown precomputed
#[derive(Debug, Serialize, Deserialize)]
pub struct HoldView {
    pub id: HoldId,
    pub item_id: ItemId,
    pub holder: String,
    pub state: HoldState,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub seconds_remaining: i64,
    /// `HH:MM:SS`, hours not wrapped at 24
    pub countdown: String,
}

impl HoldView {
    pub fn from_hold(hold: &ReservationHold, now: DateTime<Utc>) -> Self {
        let state = if hold.is_due_to_expire(now) {
            HoldState::Expired
        } else {
            hold.state
        };
        let remaining = hold.time_remaining(now);

        HoldView {
            id: hold.id,
            item_id: hold.item_id,
            holder: hold.holder.clone(),
            state,
            created_at: hold.created_at,
            expires_at: hold.expires_at,
            seconds_remaining: remaining.num_seconds(),
            countdown: format_countdown(remaining),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InstallmentLine {
    pub number: u32,
    pub due_date: DateTime<Utc>,
    pub amount: Money,
}

/// serializable view of an invoice
#[derive(Debug, Serialize, Deserialize)]
pub struct InvoiceView {
    pub id: InvoiceId,
    pub number: String,
    pub item_id: ItemId,
    pub buyer: String,
    pub mode: PaymentMode,
    pub amount_paid: Money,
    pub total_price: Money,
    pub outstanding: Money,
    pub term_months: Option<u32>,
    pub monthly_payment: Option<Money>,
    pub installments: Vec<InstallmentLine>,
    pub payment_reference: String,
    pub issued_at: DateTime<Utc>,
}

impl InvoiceView {
    pub fn from_invoice(invoice: &InvoiceRecord) -> Self {
        let plan = invoice.plan();
        let installments = invoice
            .schedule()
            .map(|schedule| {
                schedule
                    .installments
                    .iter()
                    .map(|i| InstallmentLine {
                        number: i.number,
                        due_date: i.due_date,
                        amount: i.amount,
                    })
                    .collect()
            })
            .unwrap_or_default();

        InvoiceView {
            id: invoice.id(),
            number: invoice.number().to_string(),
            item_id: invoice.item_id(),
            buyer: invoice.buyer().to_string(),
            mode: invoice.mode(),
            amount_paid: invoice.amount(),
            total_price: plan.map(|p| p.total_price).unwrap_or(invoice.amount()),
            outstanding: invoice.outstanding(),
            term_months: plan.and_then(|p| p.term_months),
            monthly_payment: plan.map(|p| p.monthly_payment.round_to_minor()),
            installments,
            payment_reference: invoice.payment_reference().to_string(),
            issued_at: invoice.created_at(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// format a countdown as `HH:MM:SS`, clamped at zero
pub fn format_countdown(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckoutConfig;
    use crate::decimal::Rate;
    use crate::payments::PaymentPlanCalculator;
    use crate::reservation::ReservationLifecycle;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_countdown_format() {
        assert_eq!(format_countdown(Duration::hours(48)), "48:00:00");
        assert_eq!(format_countdown(Duration::seconds(3_725)), "01:02:05");
        assert_eq!(format_countdown(Duration::seconds(-5)), "00:00:00");
    }

    #[test]
    fn test_hold_view_counts_down() {
        let mut lifecycle = ReservationLifecycle::new(&CheckoutConfig::standard());
        let mut item = SellableItem::property("Garden lot", Money::from_major(40_000), dec!(600), t0());
        let hold = lifecycle.request_hold(&mut item, "buyer-1", t0()).unwrap();

        let view = HoldView::from_hold(&hold, t0() + Duration::minutes(90));
        assert_eq!(view.state, HoldState::Active);
        assert_eq!(view.seconds_remaining, 46 * 3600 + 30 * 60);
        assert_eq!(view.countdown, "46:30:00");

        let json = view.to_json_pretty().unwrap();
        assert!(json.contains("\"countdown\": \"46:30:00\""));

        let late = HoldView::from_hold(&hold, t0() + Duration::hours(49));
        assert_eq!(late.state, HoldState::Expired);
        assert_eq!(late.seconds_remaining, 0);
    }

    #[test]
    fn test_item_view_applies_lapsed_hold() {
        let mut lifecycle = ReservationLifecycle::new(&CheckoutConfig::standard());
        let mut item = SellableItem::property("Garden lot", Money::from_major(40_000), dec!(500), t0());
        lifecycle.request_hold(&mut item, "buyer-1", t0()).unwrap();

        let held = ItemView::from_item(&item, t0() + Duration::hours(1));
        assert_eq!(held.status, ItemStatus::Held);
        assert!(!held.can_reserve);
        assert_eq!(held.price_per_area, Some(Money::from_major(80)));

        let lapsed = ItemView::from_item(&item, t0() + Duration::hours(48));
        assert_eq!(lapsed.status, ItemStatus::Available);
        assert!(lapsed.can_reserve);
        assert_eq!(lapsed.hold_expires_at, None);
    }

    #[test]
    fn test_invoice_view_lists_installments() {
        let item = SellableItem::property("Garden lot", Money::from_major(60_000), dec!(500), t0());
        let plan = PaymentPlanCalculator::standard()
            .quote_installments(item.price, Rate::from_percentage(20), 6)
            .unwrap();
        let invoice = InvoiceRecord::issue(&item, None, "buyer-1", &plan, "psp-77", t0()).unwrap();

        let view = InvoiceView::from_invoice(&invoice);
        assert_eq!(view.amount_paid, Money::from_major(12_000));
        assert_eq!(view.total_price, Money::from_major(60_000));
        assert_eq!(view.outstanding, Money::from_major(48_000));
        assert_eq!(view.term_months, Some(6));
        assert_eq!(view.monthly_payment, Some(Money::from_major(8_000)));
        assert_eq!(view.installments.len(), 6);
        assert!(view.to_json_pretty().is_ok());

        let full = PaymentPlanCalculator::standard().quote_full(item.price);
        let invoice = InvoiceRecord::issue(&item, None, "buyer-1", &full, "psp-78", t0()).unwrap();
        let view = InvoiceView::from_invoice(&invoice);
        assert_eq!(view.total_price, Money::from_major(60_000));
        assert!(view.installments.is_empty());
    }
}
