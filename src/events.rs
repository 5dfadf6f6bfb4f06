use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{HoldId, HolderId, InvoiceId, ItemId, PaymentMode};

/// all events emitted by reservation and checkout transitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // hold events
    HoldCreated {
        hold_id: HoldId,
        item_id: ItemId,
        holder: HolderId,
        expires_at: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },
    HoldExpired {
        hold_id: HoldId,
        item_id: ItemId,
        timestamp: DateTime<Utc>,
    },
    HoldCancelled {
        hold_id: HoldId,
        item_id: ItemId,
        timestamp: DateTime<Utc>,
    },
    HoldConverted {
        hold_id: HoldId,
        item_id: ItemId,
        invoice_id: InvoiceId,
        timestamp: DateTime<Utc>,
    },

    // item events
    ItemReleased {
        item_id: ItemId,
        timestamp: DateTime<Utc>,
    },
    ItemSold {
        item_id: ItemId,
        invoice_id: InvoiceId,
        timestamp: DateTime<Utc>,
    },

    // payment events
    InvoiceIssued {
        invoice_id: InvoiceId,
        item_id: ItemId,
        amount: Money,
        mode: PaymentMode,
        timestamp: DateTime<Utc>,
    },
    PaymentFailed {
        item_id: ItemId,
        amount: Money,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    /// payment settled but the sale could not be recorded; needs a refund
    PaymentUnapplied {
        item_id: ItemId,
        payment_reference: String,
        amount: Money,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    pub fn item_id(&self) -> ItemId {
        match self {
            Event::HoldCreated { item_id, .. }
            | Event::HoldExpired { item_id, .. }
            | Event::HoldCancelled { item_id, .. }
            | Event::HoldConverted { item_id, .. }
            | Event::ItemReleased { item_id, .. }
            | Event::ItemSold { item_id, .. }
            | Event::InvoiceIssued { item_id, .. }
            | Event::PaymentFailed { item_id, .. }
            | Event::PaymentUnapplied { item_id, .. } => *item_id,
        }
    }
}

/// messaging collaborator informed of transitions for user-facing alerts
///
/// Fire and forget: nothing is returned and a failing notifier must not
/// affect the transition that produced the event.
pub trait Notifier {
    fn notify(&self, event: &Event);
}

/// notifier that only writes events to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &Event) {
        tracing::info!(item_id = %event.item_id(), ?event, "checkout event");
    }
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// drain every pending event into the notifier, oldest first
    pub fn forward(&mut self, notifier: &dyn Notifier) -> usize {
        let events = self.take_events();
        for event in &events {
            notifier.notify(event);
        }
        events.len()
    }
}
