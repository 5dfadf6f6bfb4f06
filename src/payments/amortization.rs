use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{CheckoutError, Result};
use crate::payments::loan::calculate_monthly_payment;

/// longest schedule generated, fifty years of monthly payments
pub const MAX_TERM_MONTHS: u32 = 600;

/// scheduled payment in amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPayment {
    pub payment_number: u32,
    pub payment_date: DateTime<Utc>,
    pub beginning_balance: Money,
    pub payment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub ending_balance: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
}

/// equal-installment amortization schedule in whole cents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub principal: Money,
    pub interest_rate: Rate,
    pub term_months: u32,
    pub start_date: DateTime<Utc>,
    pub payments: Vec<ScheduledPayment>,
    pub total_interest: Money,
    pub total_payment: Money,
}

impl AmortizationSchedule {
    /// generate payment schedule
    pub fn generate(
        principal: Money,
        interest_rate: Rate,
        term_months: u32,
        start_date: DateTime<Utc>,
    ) -> Result<Self> {
        if term_months > MAX_TERM_MONTHS {
            return Err(CheckoutError::invalid_input(format!(
                "schedule of {} months exceeds {} months",
                term_months, MAX_TERM_MONTHS
            )));
        }

        let emi = calculate_monthly_payment(principal, interest_rate, term_months)?.round_to_minor();
        let monthly_rate = interest_rate.monthly_rate().as_decimal();

        let mut payments = Vec::with_capacity(term_months as usize);
        let mut balance = principal;
        let mut cumulative_interest = Money::ZERO;
        let mut cumulative_principal = Money::ZERO;

        for i in 1..=term_months {
            let interest_portion = (balance * monthly_rate).round_to_minor();

            // the last payment clears whatever the rounding left behind
            let (payment_amount, principal_portion) = if i == term_months {
                (balance + interest_portion, balance)
            } else {
                let principal_portion = (emi - interest_portion).min(balance);
                (principal_portion + interest_portion, principal_portion)
            };

            cumulative_interest += interest_portion;
            cumulative_principal += principal_portion;
            let ending_balance = balance - principal_portion;

            payments.push(ScheduledPayment {
                payment_number: i,
                payment_date: add_months(start_date, i)?,
                beginning_balance: balance,
                payment_amount,
                principal_portion,
                interest_portion,
                ending_balance,
                cumulative_interest,
                cumulative_principal,
            });

            balance = ending_balance;
        }

        let total_interest = payments.iter().map(|p| p.interest_portion).sum();
        let total_payment = payments.iter().map(|p| p.payment_amount).sum();

        Ok(Self {
            principal,
            interest_rate,
            term_months,
            start_date,
            payments,
            total_interest,
            total_payment,
        })
    }

    /// get payment for specific period
    pub fn get_payment(&self, payment_number: u32) -> Option<&ScheduledPayment> {
        let index = payment_number.checked_sub(1)?;
        self.payments.get(index as usize)
    }

    /// get remaining balance after payment
    pub fn balance_after_payment(&self, payment_number: u32) -> Money {
        self.get_payment(payment_number)
            .map(|p| p.ending_balance)
            .unwrap_or(self.principal)
    }

    /// interest and principal paid in each calendar year of the schedule
    pub fn yearly_totals(&self) -> Vec<(i32, Money, Money)> {
        use chrono::Datelike;

        let mut years: Vec<(i32, Money, Money)> = Vec::new();
        for payment in &self.payments {
            let year = payment.payment_date.year();
            match years.last_mut() {
                Some((y, interest, principal)) if *y == year => {
                    *interest += payment.interest_portion;
                    *principal += payment.principal_portion;
                }
                _ => years.push((year, payment.interest_portion, payment.principal_portion)),
            }
        }
        years
    }
}

/// add calendar months, clamping to the end of shorter months
pub(crate) fn add_months(date: DateTime<Utc>, months: u32) -> Result<DateTime<Utc>> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| CheckoutError::invalid_input(format!("{} months after {} is out of range", months, date)))
}
