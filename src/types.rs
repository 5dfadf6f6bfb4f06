use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// unique identifier for a property or lot
pub type ItemId = Uuid;

/// unique identifier for a reservation hold
pub type HoldId = Uuid;

/// unique identifier for an invoice
pub type InvoiceId = Uuid;

/// identity of the buyer holding or purchasing an item
pub type HolderId = String;

/// what is being sold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// a whole property
    Property,
    /// a lot carved out of a property
    Lot { property_id: ItemId },
}

/// item status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemStatus {
    /// free to hold or purchase
    Available,
    /// under an active reservation hold
    Held,
    /// purchased, terminal
    Sold,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemStatus::Available => "available",
            ItemStatus::Held => "held",
            ItemStatus::Sold => "sold",
        };
        f.write_str(name)
    }
}

/// reservation hold state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoldState {
    /// hold in force until its expiry
    Active,
    /// expiry reached before conversion or cancellation
    Expired,
    /// turned into a sale
    Converted,
    /// released by the holder
    Cancelled,
}

impl fmt::Display for HoldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HoldState::Active => "active",
            HoldState::Expired => "expired",
            HoldState::Converted => "converted",
            HoldState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// how the buyer pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMode {
    /// whole price at checkout
    Full,
    /// down payment at checkout, remainder in monthly installments
    Installments,
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentMode::Full => "full",
            PaymentMode::Installments => "installments",
        };
        f.write_str(name)
    }
}
