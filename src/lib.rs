pub mod checkout;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod invoice;
pub mod item;
pub mod payments;
pub mod reservation;
pub mod serialization;
pub mod types;

// re-export key types
pub use checkout::Checkout;
pub use config::{CheckoutConfig, InstallmentConfig, PaymentConfig, ReservationConfig};
pub use decimal::{Money, Rate};
pub use errors::{CheckoutError, Result};
pub use events::{Event, EventStore, LogNotifier, Notifier};
pub use invoice::InvoiceRecord;
pub use item::SellableItem;
pub use payments::{
    AmortizationSchedule, Installment, InstallmentSchedule, LoanQuote, PaymentDecline,
    PaymentGateway, PaymentPlan, PaymentPlanCalculator, PaymentReceipt, PaymentRequest,
    ScheduledPayment,
};
pub use reservation::{ReservationHold, ReservationLifecycle};
pub use serialization::{HoldView, InvoiceView, ItemView};
pub use types::{
    HoldId, HoldState, HolderId, InvoiceId, ItemId, ItemKind, ItemStatus, PaymentMode,
};

// re-export external dependencies that users will need
pub use async_trait::async_trait;
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
