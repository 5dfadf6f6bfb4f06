use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{CheckoutError, Result};
use crate::payments::amortization::{AmortizationSchedule, MAX_TERM_MONTHS};

/// longest mortgage the simulator quotes
pub const MAX_LOAN_TERM_YEARS: u32 = MAX_TERM_MONTHS / 12;

/// mortgage simulator quote
///
/// Independent of any hold or plan. `monthly_payment` keeps full working
/// precision; [`LoanQuote::monthly_payment_rounded`] is what a lender would
/// actually charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanQuote {
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_years: u32,
    pub monthly_payment: Money,
    pub total_paid: Money,
    pub total_interest: Money,
}

impl LoanQuote {
    pub fn new(principal: Money, annual_rate_pct: Decimal, term_years: u32) -> Result<Self> {
        if !principal.is_positive() {
            return Err(CheckoutError::invalid_input(format!(
                "loan principal must be positive, got {}",
                principal
            )));
        }
        if annual_rate_pct.is_sign_negative() && !annual_rate_pct.is_zero() {
            return Err(CheckoutError::invalid_input(format!(
                "annual rate cannot be negative, got {}%",
                annual_rate_pct
            )));
        }
        if term_years == 0 || term_years > MAX_LOAN_TERM_YEARS {
            return Err(CheckoutError::invalid_input(format!(
                "loan term must be 1 to {} years, got {}",
                MAX_LOAN_TERM_YEARS, term_years
            )));
        }

        let annual_rate = Rate::from_percentage_decimal(annual_rate_pct);
        let months = term_years * 12;
        let monthly_payment = calculate_monthly_payment(principal, annual_rate, months)?;
        let total_paid = monthly_payment
            .as_decimal()
            .checked_mul(Decimal::from(months))
            .map(Money::from_decimal)
            .ok_or_else(|| {
                CheckoutError::invalid_input(format!("total repaid on {} is out of range", principal))
            })?;

        Ok(Self {
            principal,
            annual_rate,
            term_years,
            monthly_payment,
            total_paid,
            total_interest: total_paid - principal,
        })
    }

    pub fn term_months(&self) -> u32 {
        self.term_years * 12
    }

    pub fn monthly_payment_rounded(&self) -> Money {
        self.monthly_payment.round_to_minor()
    }

    /// month by month amortization starting one month after `start`
    pub fn schedule(&self, start: DateTime<Utc>) -> Result<AmortizationSchedule> {
        AmortizationSchedule::generate(self.principal, self.annual_rate, self.term_months(), start)
    }
}

/// equal monthly payment for an annual rate
///
/// EMI = P * r * (1 + r)^n / ((1 + r)^n - 1), and P / n when r is zero.
pub fn calculate_monthly_payment(principal: Money, annual_rate: Rate, months: u32) -> Result<Money> {
    if months == 0 {
        return Err(CheckoutError::invalid_input("payment term must be at least one month"));
    }

    let r = annual_rate.monthly_rate();
    if r.as_decimal().is_zero() {
        return Ok(principal / Decimal::from(months));
    }

    let overflow = || {
        CheckoutError::invalid_input(format!(
            "payment for {} at {} over {} months is out of range",
            principal, annual_rate, months
        ))
    };

    let compound = r.compound_factor(months).ok_or_else(overflow)?;
    let numerator = principal
        .as_decimal()
        .checked_mul(r.as_decimal())
        .and_then(|v| v.checked_mul(compound))
        .ok_or_else(overflow)?;
    let denominator = compound - Decimal::ONE;
    if denominator.is_zero() {
        return Err(overflow());
    }

    Ok(Money::from_decimal(numerator / denominator))
}
