use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{CheckoutConfig, InstallmentConfig};
use crate::decimal::{Money, Rate};
use crate::errors::{CheckoutError, Result};
use crate::payments::amortization::AmortizationSchedule;
use crate::payments::installments::InstallmentSchedule;
use crate::payments::loan::LoanQuote;
use crate::types::PaymentMode;

/// a computed payment quote
///
/// Never mutated: a changed input means a new quote. In both modes
/// `down_payment + remaining == total_price`; a full payment is simply a
/// down payment of the whole price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentPlan {
    pub total_price: Money,
    pub mode: PaymentMode,
    /// installments only
    pub down_payment_pct: Option<Rate>,
    /// installments only
    pub term_months: Option<u32>,
    pub down_payment: Money,
    pub monthly_payment: Money,
    pub remaining: Money,
}

impl PaymentPlan {
    /// amount charged when the sale is finalized
    pub fn amount_due_now(&self) -> Money {
        self.down_payment
    }

    pub fn is_installments(&self) -> bool {
        self.mode == PaymentMode::Installments
    }

    /// gap between the monthly payments and the remaining principal
    pub fn rounding_drift(&self) -> Money {
        let months = Decimal::from(self.term_months.unwrap_or(0));
        (self.monthly_payment * months - self.remaining).abs()
    }
}

/// pure, deterministic payment quotes
#[derive(Debug, Clone)]
pub struct PaymentPlanCalculator {
    rules: InstallmentConfig,
}

impl PaymentPlanCalculator {
    pub fn new(rules: InstallmentConfig) -> Self {
        Self { rules }
    }

    pub fn standard() -> Self {
        Self::new(InstallmentConfig::standard())
    }

    pub fn from_config(config: &CheckoutConfig) -> Self {
        Self::new(config.installments.clone())
    }

    pub fn rules(&self) -> &InstallmentConfig {
        &self.rules
    }

    /// whole price at checkout
    pub fn quote_full(&self, price: Money) -> PaymentPlan {
        PaymentPlan {
            total_price: price,
            mode: PaymentMode::Full,
            down_payment_pct: None,
            term_months: None,
            down_payment: price,
            monthly_payment: Money::ZERO,
            remaining: Money::ZERO,
        }
    }

    /// down payment now, the rest split evenly over `term_months`
    pub fn quote_installments(
        &self,
        price: Money,
        down_payment_pct: Rate,
        term_months: u32,
    ) -> Result<PaymentPlan> {
        if !price.is_positive() {
            return Err(CheckoutError::invalid_input(format!(
                "price must be positive, got {}",
                price
            )));
        }

        if !self.rules.allows_down_payment(down_payment_pct) {
            return Err(CheckoutError::invalid_input(format!(
                "down payment {} outside {} to {}",
                down_payment_pct, self.rules.min_down_payment, self.rules.max_down_payment
            )));
        }

        if !self.rules.allows_term(term_months) {
            return Err(CheckoutError::invalid_input(format!(
                "term of {} months not in {:?}",
                term_months, self.rules.allowed_terms_months
            )));
        }

        // the charged amount is whole cents; the remainder absorbs the rounding
        let down_payment = price.percentage(down_payment_pct).round_to_minor();
        let remaining = price - down_payment;
        let monthly_payment = remaining / Decimal::from(term_months);

        Ok(PaymentPlan {
            total_price: price,
            mode: PaymentMode::Installments,
            down_payment_pct: Some(down_payment_pct),
            term_months: Some(term_months),
            down_payment,
            monthly_payment,
            remaining,
        })
    }

    /// requote `plan` for `price` and reject it unless it matches exactly
    ///
    /// Plans are plain data and may come back from a client; the returned
    /// plan is the one computed here.
    pub fn verify(&self, price: Money, plan: &PaymentPlan) -> Result<PaymentPlan> {
        let fresh = match plan.mode {
            PaymentMode::Full => self.quote_full(price),
            PaymentMode::Installments => {
                let (pct, term) = match (plan.down_payment_pct, plan.term_months) {
                    (Some(pct), Some(term)) => (pct, term),
                    _ => {
                        return Err(CheckoutError::invalid_input(
                            "installment plan without down payment or term",
                        ))
                    }
                };
                self.quote_installments(price, pct, term)?
            }
        };

        if fresh != *plan {
            return Err(CheckoutError::invalid_input(format!(
                "{} plan does not match the quote for {}",
                plan.mode, price
            )));
        }
        Ok(fresh)
    }

    /// mortgage simulator quote, independent of any hold
    pub fn quote_loan(&self, principal: Money, annual_rate_pct: Decimal, term_years: u32) -> Result<LoanQuote> {
        LoanQuote::new(principal, annual_rate_pct, term_years)
    }

    /// dated monthly installments for an installment plan
    pub fn installment_schedule(&self, plan: &PaymentPlan, start: DateTime<Utc>) -> Result<InstallmentSchedule> {
        InstallmentSchedule::generate(plan, start)
    }

    /// month by month amortization of a loan quote
    pub fn loan_schedule(&self, quote: &LoanQuote, start: DateTime<Utc>) -> Result<AmortizationSchedule> {
        quote.schedule(start)
    }
}

impl Default for PaymentPlanCalculator {
    fn default() -> Self {
        Self::standard()
    }
}
