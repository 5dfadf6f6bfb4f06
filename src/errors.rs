use std::time::Duration;

use thiserror::Error;

use crate::types::{ItemId, ItemStatus};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckoutError {
    #[error("item unavailable: {item_id} is {status}")]
    ItemUnavailable {
        item_id: ItemId,
        status: ItemStatus,
    },

    #[error("invalid state: current {current}, expected {expected}")]
    InvalidState {
        current: String,
        expected: String,
    },

    #[error("invalid input: {message}")]
    InvalidInput {
        message: String,
    },

    #[error("payment timed out after {timeout:?}")]
    PaymentTimeout {
        timeout: Duration,
    },

    #[error("payment failed: {reason}")]
    PaymentFailed {
        reason: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

impl CheckoutError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        CheckoutError::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_state(current: impl ToString, expected: impl ToString) -> Self {
        CheckoutError::InvalidState {
            current: current.to_string(),
            expected: expected.to_string(),
        }
    }

    /// the caller acted on a stale view of an item or hold and should
    /// refresh before retrying
    pub fn requires_refresh(&self) -> bool {
        matches!(
            self,
            CheckoutError::ItemUnavailable { .. } | CheckoutError::InvalidState { .. }
        )
    }

    /// the same request can be submitted again unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckoutError::PaymentTimeout { .. } | CheckoutError::PaymentFailed { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_classification() {
        let stale = CheckoutError::ItemUnavailable {
            item_id: Uuid::new_v4(),
            status: ItemStatus::Sold,
        };
        assert!(stale.requires_refresh());
        assert!(!stale.is_retryable());
        assert!(stale.to_string().ends_with(" is sold"));

        let declined = CheckoutError::PaymentFailed {
            reason: "card declined".to_string(),
        };
        assert!(declined.is_retryable());
        assert!(!declined.requires_refresh());

        let bad = CheckoutError::invalid_input("down payment below 20%");
        assert!(!bad.is_retryable());
        assert!(!bad.requires_refresh());
        assert_eq!(bad.to_string(), "invalid input: down payment below 20%");
    }
}
