use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CheckoutError, Result};
use crate::types::{HoldId, HoldState, HolderId, ItemId};

/// a temporary, time-bounded claim on an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationHold {
    pub id: HoldId,
    pub item_id: ItemId,
    pub holder: HolderId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub state: HoldState,
    /// when the hold left `Active`
    pub closed_at: Option<DateTime<Utc>>,
}

impl ReservationHold {
    pub(crate) fn open(item_id: ItemId, holder: HolderId, now: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_id,
            holder,
            created_at: now,
            expires_at: now + duration,
            state: HoldState::Active,
            closed_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == HoldState::Active
    }

    /// active but past its expiry at `now`; the next lifecycle read expires it
    pub fn is_due_to_expire(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && now >= self.expires_at
    }

    /// countdown shown to the holder, zero once the hold is no longer in force
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Duration {
        if !self.is_active() || now >= self.expires_at {
            return Duration::zero();
        }
        self.expires_at - now
    }

    /// active -> expired | converted | cancelled
    pub(crate) fn close(&mut self, to: HoldState, now: DateTime<Utc>) -> Result<()> {
        if !self.is_active() {
            return Err(CheckoutError::invalid_state(self.state, HoldState::Active));
        }
        if to == HoldState::Active {
            return Err(CheckoutError::invalid_input("a hold cannot be reopened"));
        }

        self.state = to;
        self.closed_at = Some(now);
        Ok(())
    }
}
