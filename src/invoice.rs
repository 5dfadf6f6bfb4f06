use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{CheckoutError, Result};
use crate::item::SellableItem;
use crate::payments::{InstallmentSchedule, PaymentPlan};
use crate::reservation::ReservationHold;
use crate::types::{HoldId, HolderId, InvoiceId, ItemId, PaymentMode};

/// record of a finalized sale
///
/// Issued once per successful payment and never changed afterwards, so all
/// fields are private behind read-only accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    id: InvoiceId,
    number: String,
    item_id: ItemId,
    hold_id: Option<HoldId>,
    buyer: HolderId,
    amount: Money,
    mode: PaymentMode,
    plan: Option<PaymentPlan>,
    schedule: Option<InstallmentSchedule>,
    payment_reference: String,
    created_at: DateTime<Utc>,
}

impl InvoiceRecord {
    /// build the invoice for a payment that already went through
    pub fn issue(
        item: &SellableItem,
        hold: Option<&ReservationHold>,
        buyer: impl Into<HolderId>,
        plan: &PaymentPlan,
        payment_reference: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if plan.total_price != item.price {
            return Err(CheckoutError::invalid_input(format!(
                "plan priced at {} but item {} costs {}",
                plan.total_price, item.id, item.price
            )));
        }
        if let Some(hold) = hold {
            if hold.item_id != item.id {
                return Err(CheckoutError::invalid_input(format!(
                    "hold {} is for item {}, not {}",
                    hold.id, hold.item_id, item.id
                )));
            }
        }

        let payment_reference = payment_reference.into();
        if payment_reference.trim().is_empty() {
            return Err(CheckoutError::invalid_input("invoice needs a payment reference"));
        }

        let (plan_snapshot, schedule) = if plan.is_installments() {
            (Some(plan.clone()), Some(InstallmentSchedule::generate(plan, now)?))
        } else {
            (None, None)
        };

        let id = Uuid::new_v4();
        Ok(Self {
            id,
            number: invoice_number(id),
            item_id: item.id,
            hold_id: hold.map(|h| h.id),
            buyer: buyer.into(),
            amount: plan.amount_due_now(),
            mode: plan.mode,
            plan: plan_snapshot,
            schedule,
            payment_reference,
            created_at: now,
        })
    }

    pub fn id(&self) -> InvoiceId {
        self.id
    }

    /// human readable number, e.g. `INV-3F2A91C0`
    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn hold_id(&self) -> Option<HoldId> {
        self.hold_id
    }

    pub fn buyer(&self) -> &str {
        &self.buyer
    }

    /// amount charged at finalization
    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn mode(&self) -> PaymentMode {
        self.mode
    }

    /// plan snapshot, installments only
    pub fn plan(&self) -> Option<&PaymentPlan> {
        self.plan.as_ref()
    }

    pub fn schedule(&self) -> Option<&InstallmentSchedule> {
        self.schedule.as_ref()
    }

    pub fn payment_reference(&self) -> &str {
        &self.payment_reference
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// still owed after this invoice
    pub fn outstanding(&self) -> Money {
        self.plan.as_ref().map(|p| p.remaining).unwrap_or(Money::ZERO)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn invoice_number(id: InvoiceId) -> String {
    let simple = id.simple().to_string();
    format!("INV-{}", simple[..8].to_uppercase())
}
