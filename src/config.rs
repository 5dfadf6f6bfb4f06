use chrono::Duration;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Rate;
use crate::errors::{CheckoutError, Result};
use crate::payments::amortization::MAX_TERM_MONTHS;

/// checkout configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    pub reservation: ReservationConfig,
    pub installments: InstallmentConfig,
    pub payment: PaymentConfig,
}

/// reservation hold settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationConfig {
    /// how long a hold keeps an item exclusive
    pub hold_duration_hours: u32,
    /// how often a presentation layer should re-read holds for countdowns
    pub countdown_refresh_secs: u32,
}

/// installment plan bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentConfig {
    pub min_down_payment: Rate,
    pub max_down_payment: Rate,
    pub allowed_terms_months: Vec<u32>,
}

/// payment collaborator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// how long to wait for the payment collaborator before giving up
    pub timeout_secs: u64,
}

impl CheckoutConfig {
    /// 48 hour holds, 20-50% down over 6 to 36 months, 30 second payment deadline
    pub fn standard() -> Self {
        Self {
            reservation: ReservationConfig {
                hold_duration_hours: 48,
                countdown_refresh_secs: 60,
            },
            installments: InstallmentConfig::standard(),
            payment: PaymentConfig { timeout_secs: 30 },
        }
    }

    /// parse and validate a json configuration document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CheckoutConfig =
            serde_json::from_str(json).map_err(|e| CheckoutError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.reservation.hold_duration_hours == 0 {
            return Err(CheckoutError::InvalidConfiguration {
                message: "hold duration must be at least one hour".to_string(),
            });
        }

        if self.reservation.countdown_refresh_secs == 0
            || self.reservation.countdown_refresh_secs > 60
        {
            return Err(CheckoutError::InvalidConfiguration {
                message: format!(
                    "countdown refresh must be between 1 and 60 seconds, got {}",
                    self.reservation.countdown_refresh_secs
                ),
            });
        }

        if self.payment.timeout_secs == 0 {
            return Err(CheckoutError::InvalidConfiguration {
                message: "payment timeout must be positive".to_string(),
            });
        }

        self.installments.validate()
    }

    pub fn hold_duration(&self) -> Duration {
        Duration::hours(i64::from(self.reservation.hold_duration_hours))
    }

    pub fn countdown_refresh(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.reservation.countdown_refresh_secs))
    }

    pub fn payment_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.payment.timeout_secs)
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl InstallmentConfig {
    pub fn standard() -> Self {
        Self {
            min_down_payment: Rate::from_percentage(20),
            max_down_payment: Rate::from_percentage(50),
            allowed_terms_months: vec![6, 12, 18, 24, 36],
        }
    }

    pub fn validate(&self) -> Result<()> {
        let min = self.min_down_payment.as_decimal();
        let max = self.max_down_payment.as_decimal();

        if min <= dec!(0) || max >= dec!(1) || min > max {
            return Err(CheckoutError::InvalidConfiguration {
                message: format!(
                    "down payment bounds must satisfy 0% < min <= max < 100%, got {} to {}",
                    self.min_down_payment, self.max_down_payment
                ),
            });
        }

        if self.allowed_terms_months.is_empty() {
            return Err(CheckoutError::InvalidConfiguration {
                message: "at least one installment term is required".to_string(),
            });
        }

        if self.allowed_terms_months.contains(&0) {
            return Err(CheckoutError::InvalidConfiguration {
                message: "installment terms must be at least one month".to_string(),
            });
        }

        if let Some(&longest) = self.allowed_terms_months.iter().max() {
            if longest > MAX_TERM_MONTHS {
                return Err(CheckoutError::InvalidConfiguration {
                    message: format!(
                        "installment term of {} months exceeds {} months",
                        longest, MAX_TERM_MONTHS
                    ),
                });
            }
        }

        Ok(())
    }

    pub fn allows_term(&self, months: u32) -> bool {
        self.allowed_terms_months.contains(&months)
    }

    pub fn allows_down_payment(&self, pct: Rate) -> bool {
        pct >= self.min_down_payment && pct <= self.max_down_payment
    }
}

impl Default for InstallmentConfig {
    fn default() -> Self {
        Self::standard()
    }
}
