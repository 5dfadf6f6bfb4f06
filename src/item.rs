use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{CheckoutError, Result};
use crate::types::{HoldId, ItemId, ItemKind, ItemStatus};

/// a property or lot offered for sale
///
/// Plain data so a persistence collaborator can store it as is. Status only
/// changes through [`crate::reservation::ReservationLifecycle`], which keeps
/// the transitions monotonic: `Available -> Held -> Sold`, `Held -> Available`
/// on expiry or cancellation, nothing out of `Sold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellableItem {
    pub id: ItemId,
    pub kind: ItemKind,
    pub title: String,
    pub price: Money,
    /// area in square metres
    pub area: Decimal,
    pub status: ItemStatus,
    pub hold_expires_at: Option<DateTime<Utc>>,
    pub held_by: Option<HoldId>,
    pub last_status_change: DateTime<Utc>,
}

impl SellableItem {
    /// list a whole property
    pub fn property(title: impl Into<String>, price: Money, area: Decimal, listed_at: DateTime<Utc>) -> Self {
        Self::new(ItemKind::Property, title.into(), price, area, listed_at)
    }

    /// list a lot of an existing property
    pub fn lot(
        property_id: ItemId,
        title: impl Into<String>,
        price: Money,
        area: Decimal,
        listed_at: DateTime<Utc>,
    ) -> Self {
        Self::new(ItemKind::Lot { property_id }, title.into(), price, area, listed_at)
    }

    fn new(kind: ItemKind, title: String, price: Money, area: Decimal, listed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title,
            price,
            area,
            status: ItemStatus::Available,
            hold_expires_at: None,
            held_by: None,
            last_status_change: listed_at,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == ItemStatus::Available
    }

    pub fn is_held(&self) -> bool {
        self.status == ItemStatus::Held
    }

    pub fn is_sold(&self) -> bool {
        self.status == ItemStatus::Sold
    }

    /// whether the item is held and its hold has run out at `now`
    pub fn hold_lapsed(&self, now: DateTime<Utc>) -> bool {
        self.is_held() && self.hold_expires_at.map_or(true, |expiry| now >= expiry)
    }

    /// price per square metre, when an area is recorded
    pub fn price_per_area(&self) -> Option<Money> {
        if self.area <= Decimal::ZERO {
            return None;
        }
        Some(self.price / self.area)
    }

    pub(crate) fn unavailable(&self) -> CheckoutError {
        CheckoutError::ItemUnavailable {
            item_id: self.id,
            status: self.status,
        }
    }

    /// available -> held
    pub(crate) fn mark_held(&mut self, hold_id: HoldId, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
        if !self.is_available() {
            return Err(self.unavailable());
        }
        if expires_at <= now {
            return Err(CheckoutError::invalid_input("hold expiry must lie in the future"));
        }

        self.status = ItemStatus::Held;
        self.hold_expires_at = Some(expires_at);
        self.held_by = Some(hold_id);
        self.last_status_change = now;
        Ok(())
    }

    /// held -> available
    pub(crate) fn release(&mut self, now: DateTime<Utc>) -> Result<()> {
        if !self.is_held() {
            return Err(CheckoutError::invalid_state(self.status, ItemStatus::Held));
        }

        self.status = ItemStatus::Available;
        self.hold_expires_at = None;
        self.held_by = None;
        self.last_status_change = now;
        Ok(())
    }

    /// available | held -> sold
    pub(crate) fn mark_sold(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.is_sold() {
            return Err(self.unavailable());
        }

        self.status = ItemStatus::Sold;
        self.hold_expires_at = None;
        self.held_by = None;
        self.last_status_change = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn listed() -> SellableItem {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        SellableItem::property("Hillside villa", Money::from_major(250_000), dec!(180), t0)
    }

    #[test]
    fn test_transitions_are_monotonic() {
        let mut item = listed();
        let now = item.last_status_change;
        let hold = Uuid::new_v4();

        item.mark_held(hold, now + Duration::hours(48), now).unwrap();
        assert!(item.is_held());
        assert_eq!(item.held_by, Some(hold));

        // cannot hold twice
        assert!(matches!(
            item.mark_held(Uuid::new_v4(), now + Duration::hours(48), now),
            Err(CheckoutError::ItemUnavailable { status: ItemStatus::Held, .. })
        ));

        item.mark_sold(now).unwrap();
        assert!(item.is_sold());
        assert_eq!(item.hold_expires_at, None);

        // nothing leaves sold
        assert!(item.release(now).is_err());
        assert!(item.mark_held(hold, now + Duration::hours(1), now).is_err());
        assert!(matches!(
            item.mark_sold(now),
            Err(CheckoutError::ItemUnavailable { status: ItemStatus::Sold, .. })
        ));
    }

    #[test]
    fn test_hold_expiry_must_be_future() {
        let mut item = listed();
        let now = item.last_status_change;
        assert!(item.mark_held(Uuid::new_v4(), now, now).is_err());
        assert!(item.is_available());
    }

    #[test]
    fn test_hold_lapsed() {
        let mut item = listed();
        let now = item.last_status_change;
        item.mark_held(Uuid::new_v4(), now + Duration::hours(48), now).unwrap();

        assert!(!item.hold_lapsed(now + Duration::hours(47)));
        assert!(item.hold_lapsed(now + Duration::hours(48)));
    }

    #[test]
    fn test_lot_and_price_per_area() {
        let parent = listed();
        let lot = SellableItem::lot(parent.id, "Lot 4", Money::from_major(40_000), dec!(500), parent.last_status_change);
        assert_eq!(lot.kind, ItemKind::Lot { property_id: parent.id });
        assert_eq!(lot.price_per_area(), Some(Money::from_major(80)));
    }
}
