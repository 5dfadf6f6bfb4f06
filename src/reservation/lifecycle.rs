use chrono::{DateTime, Duration, Utc};

use crate::config::CheckoutConfig;
use crate::errors::{CheckoutError, Result};
use crate::events::{Event, EventStore};
use crate::invoice::InvoiceRecord;
use crate::item::SellableItem;
use crate::reservation::ReservationHold;
use crate::types::{HoldState, HolderId};

/// owns the hold/sale state machine of sellable items
///
/// Items and holds are passed in as plain data and mutated in place; the
/// caller persists them afterwards. Expiry is evaluated lazily on every
/// operation that reads a hold, so no background timer is needed.
#[derive(Debug)]
pub struct ReservationLifecycle {
    hold_duration: Duration,
    events: EventStore,
}

impl ReservationLifecycle {
    pub fn new(config: &CheckoutConfig) -> Self {
        Self::with_hold_duration(config.hold_duration())
    }

    pub fn with_hold_duration(hold_duration: Duration) -> Self {
        Self {
            hold_duration,
            events: EventStore::new(),
        }
    }

    pub fn hold_duration(&self) -> Duration {
        self.hold_duration
    }

    /// place a hold on an available item
    pub fn request_hold(
        &mut self,
        item: &mut SellableItem,
        holder: impl Into<HolderId>,
        now: DateTime<Utc>,
    ) -> Result<ReservationHold> {
        self.refresh_item(item, now)?;

        if !item.is_available() {
            tracing::debug!(item_id = %item.id, status = %item.status, "hold rejected");
            return Err(item.unavailable());
        }

        let hold = ReservationHold::open(item.id, holder.into(), now, self.hold_duration);
        item.mark_held(hold.id, hold.expires_at, now)?;

        tracing::info!(
            item_id = %item.id,
            hold_id = %hold.id,
            expires_at = %hold.expires_at,
            "hold created"
        );
        self.events.emit(Event::HoldCreated {
            hold_id: hold.id,
            item_id: item.id,
            holder: hold.holder.clone(),
            expires_at: hold.expires_at,
            timestamp: now,
        });

        Ok(hold)
    }

    /// expire the hold if its time is up and free the item it was holding
    pub fn check_expiry(
        &mut self,
        hold: &mut ReservationHold,
        item: &mut SellableItem,
        now: DateTime<Utc>,
    ) -> Result<HoldState> {
        ensure_same_item(hold, item)?;

        if hold.is_due_to_expire(now) {
            hold.close(HoldState::Expired, now)?;
            tracing::info!(item_id = %item.id, hold_id = %hold.id, "hold expired");
            self.events.emit(Event::HoldExpired {
                hold_id: hold.id,
                item_id: item.id,
                timestamp: now,
            });

            if item.held_by == Some(hold.id) {
                self.release_item(item, now)?;
            }
        }

        Ok(hold.state)
    }

    /// free an item whose hold ran out, for reads that only see the item
    pub fn refresh_item(&mut self, item: &mut SellableItem, now: DateTime<Utc>) -> Result<bool> {
        if !item.hold_lapsed(now) {
            return Ok(false);
        }
        self.release_item(item, now)?;
        Ok(true)
    }

    /// release an active hold at the holder's request
    pub fn cancel_hold(
        &mut self,
        hold: &mut ReservationHold,
        item: &mut SellableItem,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.check_expiry(hold, item, now)?;
        hold.close(HoldState::Cancelled, now)?;

        if item.held_by == Some(hold.id) {
            item.release(now)?;
        }

        tracing::info!(item_id = %item.id, hold_id = %hold.id, "hold cancelled");
        self.events.emit(Event::HoldCancelled {
            hold_id: hold.id,
            item_id: item.id,
            timestamp: now,
        });

        Ok(())
    }

    /// record the sale of an item, through its active hold or directly
    pub fn convert_to_sale(
        &mut self,
        item: &mut SellableItem,
        hold: Option<&mut ReservationHold>,
        invoice: &InvoiceRecord,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if invoice.item_id() != item.id {
            return Err(CheckoutError::invalid_input(format!(
                "invoice {} is for item {}, not {}",
                invoice.number(),
                invoice.item_id(),
                item.id
            )));
        }

        if item.is_sold() {
            return Err(item.unavailable());
        }

        match hold {
            Some(hold) => {
                if invoice.hold_id() != Some(hold.id) {
                    return Err(CheckoutError::invalid_input(format!(
                        "invoice {} was not issued against hold {}",
                        invoice.number(),
                        hold.id
                    )));
                }

                let state = self.check_expiry(hold, item, now)?;
                if state != HoldState::Active {
                    return Err(CheckoutError::invalid_state(state, HoldState::Active));
                }
                if item.held_by != Some(hold.id) {
                    return Err(CheckoutError::invalid_state(
                        "item held under another hold",
                        format!("item held under hold {}", hold.id),
                    ));
                }

                hold.close(HoldState::Converted, now)?;
                item.mark_sold(now)?;

                self.events.emit(Event::HoldConverted {
                    hold_id: hold.id,
                    item_id: item.id,
                    invoice_id: invoice.id(),
                    timestamp: now,
                });
            }
            None => {
                self.refresh_item(item, now)?;
                if !item.is_available() {
                    return Err(item.unavailable());
                }
                item.mark_sold(now)?;
            }
        }

        tracing::info!(item_id = %item.id, invoice = %invoice.number(), "item sold");
        self.events.emit(Event::ItemSold {
            item_id: item.id,
            invoice_id: invoice.id(),
            timestamp: now,
        });

        Ok(())
    }

    /// countdown for the presentation layer
    pub fn time_remaining(&self, hold: &ReservationHold, now: DateTime<Utc>) -> Duration {
        hold.time_remaining(now)
    }

    pub fn events(&self) -> &EventStore {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventStore {
        &mut self.events
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    fn release_item(&mut self, item: &mut SellableItem, now: DateTime<Utc>) -> Result<()> {
        item.release(now)?;
        self.events.emit(Event::ItemReleased {
            item_id: item.id,
            timestamp: now,
        });
        Ok(())
    }
}

fn ensure_same_item(hold: &ReservationHold, item: &SellableItem) -> Result<()> {
    if hold.item_id != item.id {
        return Err(CheckoutError::invalid_state(
            format!("hold {} on item {}", hold.id, item.id),
            format!("hold on item {}", hold.item_id),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::{Money, Rate};
    use crate::payments::PaymentPlanCalculator;
    use crate::types::ItemStatus;
    use chrono::TimeZone;
    use hourglass_rs::{SafeTimeProvider, TimeSource};
    use rust_decimal_macros::dec;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn listed(price: i64) -> SellableItem {
        SellableItem::property("Lakeside plot", Money::from_major(price), dec!(420), t0())
    }

    fn lifecycle() -> ReservationLifecycle {
        ReservationLifecycle::new(&CheckoutConfig::standard())
    }

    fn full_invoice(item: &SellableItem, hold: Option<&ReservationHold>, now: DateTime<Utc>) -> InvoiceRecord {
        let plan = PaymentPlanCalculator::standard().quote_full(item.price);
        InvoiceRecord::issue(item, hold, "buyer-1", &plan, "pay-001", now).unwrap()
    }

    #[test]
    fn test_request_hold() {
        let mut lifecycle = lifecycle();
        let mut item = listed(100_000);

        let hold = lifecycle.request_hold(&mut item, "buyer-1", t0()).unwrap();

        assert_eq!(hold.state, HoldState::Active);
        assert_eq!(hold.expires_at, t0() + Duration::hours(48));
        assert_eq!(item.status, ItemStatus::Held);
        assert_eq!(item.hold_expires_at, Some(hold.expires_at));
        assert_eq!(item.held_by, Some(hold.id));
        assert!(matches!(lifecycle.events().events()[0], Event::HoldCreated { .. }));
    }

    #[test]
    fn test_second_hold_rejected() {
        let mut lifecycle = lifecycle();
        let mut item = listed(100_000);

        lifecycle.request_hold(&mut item, "buyer-1", t0()).unwrap();
        let err = lifecycle
            .request_hold(&mut item, "buyer-2", t0() + Duration::hours(1))
            .unwrap_err();

        assert_eq!(
            err,
            CheckoutError::ItemUnavailable {
                item_id: item.id,
                status: ItemStatus::Held,
            }
        );
    }

    #[test]
    fn test_expired_hold_frees_item() {
        let mut lifecycle = lifecycle();
        let mut item = listed(100_000);
        let mut hold = lifecycle.request_hold(&mut item, "buyer-1", t0()).unwrap();

        // expiry one second in the past
        let now = hold.expires_at + Duration::seconds(1);
        let state = lifecycle.check_expiry(&mut hold, &mut item, now).unwrap();

        assert_eq!(state, HoldState::Expired);
        assert_eq!(hold.closed_at, Some(now));
        assert!(item.is_available());
        assert_eq!(item.hold_expires_at, None);

        let events = lifecycle.take_events();
        assert!(matches!(events[1], Event::HoldExpired { .. }));
        assert!(matches!(events[2], Event::ItemReleased { .. }));
    }

    #[test]
    fn test_check_expiry_before_deadline_is_noop() {
        let mut lifecycle = lifecycle();
        let mut item = listed(100_000);
        let mut hold = lifecycle.request_hold(&mut item, "buyer-1", t0()).unwrap();

        let state = lifecycle
            .check_expiry(&mut hold, &mut item, t0() + Duration::hours(47))
            .unwrap();

        assert_eq!(state, HoldState::Active);
        assert!(item.is_held());
    }

    #[test]
    fn test_stale_hold_does_not_release_new_holder() {
        let mut lifecycle = lifecycle();
        let mut item = listed(100_000);
        let mut first = lifecycle.request_hold(&mut item, "buyer-1", t0()).unwrap();

        // a second buyer reads the item after the first hold ran out
        let later = t0() + Duration::hours(50);
        let second = lifecycle.request_hold(&mut item, "buyer-2", later).unwrap();
        assert_eq!(item.held_by, Some(second.id));

        // the first hold is only now observed as expired
        let state = lifecycle.check_expiry(&mut first, &mut item, later).unwrap();
        assert_eq!(state, HoldState::Expired);
        assert!(item.is_held());
        assert_eq!(item.held_by, Some(second.id));
    }

    #[test]
    fn test_cancel_hold() {
        let mut lifecycle = lifecycle();
        let mut item = listed(100_000);
        let mut hold = lifecycle.request_hold(&mut item, "buyer-1", t0()).unwrap();

        lifecycle
            .cancel_hold(&mut hold, &mut item, t0() + Duration::hours(2))
            .unwrap();
        assert_eq!(hold.state, HoldState::Cancelled);
        assert!(item.is_available());

        // cancelling twice is a stale view
        let err = lifecycle
            .cancel_hold(&mut hold, &mut item, t0() + Duration::hours(3))
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidState { .. }));
    }

    #[test]
    fn test_cancel_after_expiry_fails() {
        let mut lifecycle = lifecycle();
        let mut item = listed(100_000);
        let mut hold = lifecycle.request_hold(&mut item, "buyer-1", t0()).unwrap();

        let err = lifecycle
            .cancel_hold(&mut hold, &mut item, t0() + Duration::hours(49))
            .unwrap_err();

        assert_eq!(
            err,
            CheckoutError::InvalidState {
                current: "expired".to_string(),
                expected: "active".to_string(),
            }
        );
        assert_eq!(hold.state, HoldState::Expired);
        assert!(item.is_available());
    }

    #[test]
    fn test_convert_held_item() {
        let mut lifecycle = lifecycle();
        let mut item = listed(100_000);
        let mut hold = lifecycle.request_hold(&mut item, "buyer-1", t0()).unwrap();

        let now = t0() + Duration::hours(1);
        let invoice = full_invoice(&item, Some(&hold), now);
        lifecycle
            .convert_to_sale(&mut item, Some(&mut hold), &invoice, now)
            .unwrap();

        assert_eq!(hold.state, HoldState::Converted);
        assert!(item.is_sold());
        assert!(lifecycle
            .events()
            .events()
            .iter()
            .any(|e| matches!(e, Event::HoldConverted { .. })));
    }

    #[test]
    fn test_direct_purchase_without_hold() {
        let mut lifecycle = lifecycle();
        let mut item = listed(100_000);

        let invoice = full_invoice(&item, None, t0());
        lifecycle.convert_to_sale(&mut item, None, &invoice, t0()).unwrap();

        assert!(item.is_sold());
    }

    #[test]
    fn test_second_conversion_fails_and_leaves_item() {
        let mut lifecycle = lifecycle();
        let mut item = listed(100_000);

        let invoice = full_invoice(&item, None, t0());
        lifecycle.convert_to_sale(&mut item, None, &invoice, t0()).unwrap();
        let sold = item.clone();

        let again = full_invoice(&item, None, t0() + Duration::hours(1));
        let err = lifecycle
            .convert_to_sale(&mut item, None, &again, t0() + Duration::hours(1))
            .unwrap_err();

        assert_eq!(
            err,
            CheckoutError::ItemUnavailable {
                item_id: item.id,
                status: ItemStatus::Sold,
            }
        );
        assert_eq!(item, sold);
    }

    #[test]
    fn test_direct_purchase_of_held_item_rejected() {
        let mut lifecycle = lifecycle();
        let mut item = listed(100_000);
        lifecycle.request_hold(&mut item, "buyer-1", t0()).unwrap();

        let invoice = full_invoice(&item, None, t0());
        let err = lifecycle
            .convert_to_sale(&mut item, None, &invoice, t0() + Duration::hours(1))
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::ItemUnavailable { status: ItemStatus::Held, .. }
        ));
        assert!(item.is_held());
    }

    #[test]
    fn test_convert_expired_hold_fails() {
        let mut lifecycle = lifecycle();
        let mut item = listed(100_000);
        let mut hold = lifecycle.request_hold(&mut item, "buyer-1", t0()).unwrap();

        let late = t0() + Duration::hours(48);
        let invoice = full_invoice(&item, Some(&hold), late);
        let err = lifecycle
            .convert_to_sale(&mut item, Some(&mut hold), &invoice, late)
            .unwrap_err();

        assert!(matches!(err, CheckoutError::InvalidState { .. }));
        assert_eq!(hold.state, HoldState::Expired);
        assert!(item.is_available());
    }

    #[test]
    fn test_hold_countdown_with_controlled_time() {
        let time = SafeTimeProvider::new(TimeSource::Test(t0()));
        let control = time.test_control().unwrap();

        let mut lifecycle = lifecycle();
        let mut item = listed(100_000);
        let mut hold = lifecycle.request_hold(&mut item, "buyer-1", time.now()).unwrap();

        // presentation layer polls once a minute
        for _ in 0..90 {
            control.advance(Duration::minutes(1));
            lifecycle.check_expiry(&mut hold, &mut item, time.now()).unwrap();
        }
        assert_eq!(
            lifecycle.time_remaining(&hold, time.now()),
            Duration::hours(48) - Duration::minutes(90)
        );

        control.advance(Duration::hours(47));
        assert_eq!(
            lifecycle.check_expiry(&mut hold, &mut item, time.now()).unwrap(),
            HoldState::Expired
        );
        assert_eq!(lifecycle.time_remaining(&hold, time.now()), Duration::zero());

        // installments quote still works on the freed item
        let plan = PaymentPlanCalculator::standard()
            .quote_installments(item.price, Rate::from_percentage(30), 12)
            .unwrap();
        assert_eq!(plan.down_payment, Money::from_major(30_000));
    }

    #[test]
    fn test_mismatched_hold_rejected() {
        let mut lifecycle = lifecycle();
        let mut item = listed(100_000);
        let mut other = listed(90_000);
        let mut hold = lifecycle.request_hold(&mut item, "buyer-1", t0()).unwrap();

        assert!(matches!(
            lifecycle.check_expiry(&mut hold, &mut other, t0()),
            Err(CheckoutError::InvalidState { .. })
        ));
    }
}
