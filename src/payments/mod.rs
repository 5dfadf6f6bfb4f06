pub mod amortization;
pub mod installments;
pub mod loan;
pub mod plan;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{CheckoutError, Result};
use crate::types::{ItemId, PaymentMode};

pub use amortization::{AmortizationSchedule, ScheduledPayment};
pub use installments::{Installment, InstallmentSchedule};
pub use loan::{calculate_monthly_payment, LoanQuote};
pub use plan::{PaymentPlan, PaymentPlanCalculator};

/// payment request handed to the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub item_id: ItemId,
    pub amount: Money,
    pub mode: PaymentMode,
    /// caller-side reference, unique per finalization attempt
    pub reference: String,
}

impl PaymentRequest {
    pub fn new(item_id: ItemId, amount: Money, mode: PaymentMode, reference: impl Into<String>) -> Self {
        Self {
            item_id,
            amount,
            mode,
            reference: reference.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_positive() {
            return Err(CheckoutError::invalid_input(format!(
                "payment amount must be positive, got {}",
                self.amount
            )));
        }
        if self.reference.trim().is_empty() {
            return Err(CheckoutError::invalid_input("payment reference is empty"));
        }
        Ok(())
    }
}

/// accepted payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// reference assigned by the payment provider
    pub reference: String,
}

/// declined payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDecline {
    pub reason: String,
}

impl PaymentDecline {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// external payment provider
///
/// Implementations must not assume the caller awaits the future to
/// completion: the checkout drops it once the payment timeout elapses.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn submit(&self, request: PaymentRequest) -> std::result::Result<PaymentReceipt, PaymentDecline>;
}

#[async_trait]
impl<T: PaymentGateway + ?Sized> PaymentGateway for Arc<T> {
    async fn submit(&self, request: PaymentRequest) -> std::result::Result<PaymentReceipt, PaymentDecline> {
        (**self).submit(request).await
    }
}
