use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{CheckoutError, Result};
use crate::payments::amortization::{add_months, MAX_TERM_MONTHS};
use crate::payments::plan::PaymentPlan;

/// one monthly installment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub number: u32,
    pub due_date: DateTime<Utc>,
    pub amount: Money,
    pub balance_after: Money,
}

/// dated installments covering the remaining principal of a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentSchedule {
    pub principal: Money,
    pub term_months: u32,
    pub start_date: DateTime<Utc>,
    pub installments: Vec<Installment>,
}

impl InstallmentSchedule {
    /// first installment falls one calendar month after `start`
    ///
    /// Every installment but the last is the monthly payment truncated to
    /// whole cents; the last one carries the remainder so the schedule sums
    /// to the remaining principal exactly.
    pub fn generate(plan: &PaymentPlan, start: DateTime<Utc>) -> Result<Self> {
        let term_months = match (plan.is_installments(), plan.term_months) {
            (true, Some(term)) if term > 0 && term <= MAX_TERM_MONTHS => term,
            _ => {
                return Err(CheckoutError::invalid_input(format!(
                    "needs an installment plan of 1 to {} months",
                    MAX_TERM_MONTHS
                )))
            }
        };

        let regular = plan.monthly_payment.truncate_to_minor();
        let mut installments = Vec::with_capacity(term_months as usize);
        let mut balance = plan.remaining;

        for number in 1..=term_months {
            let amount = if number == term_months {
                balance
            } else {
                regular
            };
            balance -= amount;

            installments.push(Installment {
                number,
                due_date: add_months(start, number)?,
                amount,
                balance_after: balance,
            });
        }

        Ok(Self {
            principal: plan.remaining,
            term_months,
            start_date: start,
            installments,
        })
    }

    pub fn total(&self) -> Money {
        self.installments.iter().map(|i| i.amount).sum()
    }

    /// installment by its 1-based number
    pub fn get(&self, number: u32) -> Option<&Installment> {
        let index = number.checked_sub(1)?;
        self.installments.get(index as usize)
    }

    /// first installment not yet due at `now`
    pub fn next_due(&self, now: DateTime<Utc>) -> Option<&Installment> {
        self.installments.iter().find(|i| i.due_date >= now)
    }

    /// sum of installments due strictly before `now`
    pub fn due_before(&self, now: DateTime<Utc>) -> Money {
        self.installments
            .iter()
            .filter(|i| i.due_date < now)
            .map(|i| i.amount)
            .sum()
    }

    /// largest gap between two installments, always under a cent per month
    pub fn rounding_spread(&self) -> Money {
        let max = self.installments.iter().map(|i| i.amount).max().unwrap_or(Money::ZERO);
        let min = self.installments.iter().map(|i| i.amount).min().unwrap_or(Money::ZERO);
        max - min
    }

    /// mean installment, equal to the plan's monthly payment up to rounding
    pub fn average(&self) -> Money {
        if self.term_months == 0 {
            return Money::ZERO;
        }
        self.total() / Decimal::from(self.term_months)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::payments::PaymentPlanCalculator;
    use chrono::{Datelike, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_schedule_sums_exactly() {
        let calculator = PaymentPlanCalculator::standard();
        let plan = calculator
            .quote_installments(Money::from_major(100_000), Rate::from_percentage(30), 12)
            .unwrap();

        let schedule = InstallmentSchedule::generate(&plan, start()).unwrap();

        assert_eq!(schedule.installments.len(), 12);
        assert_eq!(schedule.total(), Money::from_major(70_000));
        assert_eq!(schedule.get(1).unwrap().amount, Money::from_cents(583_333));
        assert_eq!(schedule.get(12).unwrap().amount, Money::from_cents(583_337));
        assert_eq!(schedule.get(12).unwrap().balance_after, Money::ZERO);
        assert!(schedule.rounding_spread() < Money::from_cents(12));
        assert_eq!(schedule.average(), plan.monthly_payment.round_dp(8));
    }

    #[test]
    fn test_due_dates_follow_calendar_months() {
        let plan = PaymentPlanCalculator::standard()
            .quote_installments(Money::from_major(36_000), Rate::from_percentage(50), 6)
            .unwrap();
        let schedule = InstallmentSchedule::generate(&plan, start()).unwrap();

        // month-end start clamps to the last day of shorter months
        let first = schedule.get(1).unwrap().due_date;
        assert_eq!((first.year(), first.month(), first.day()), (2024, 2, 29));
        let third = schedule.get(3).unwrap().due_date;
        assert_eq!((third.month(), third.day()), (4, 30));
        assert_eq!(schedule.get(6).unwrap().due_date.month(), 7);
        assert!(schedule.get(0).is_none());
        assert!(schedule.get(7).is_none());
    }

    #[test]
    fn test_next_due_and_arrears() {
        let plan = PaymentPlanCalculator::standard()
            .quote_installments(Money::from_major(36_000), Rate::from_percentage(50), 6)
            .unwrap();
        let schedule = InstallmentSchedule::generate(&plan, start()).unwrap();

        let after_two = schedule.get(2).unwrap().due_date + chrono::Duration::days(1);
        assert_eq!(schedule.next_due(after_two).unwrap().number, 3);
        assert_eq!(schedule.due_before(after_two), Money::from_major(6_000));
        assert!(schedule.next_due(start() + chrono::Duration::days(400)).is_none());
    }

    #[test]
    fn test_overlong_term_rejected() {
        let mut plan = PaymentPlanCalculator::standard()
            .quote_installments(Money::from_major(36_000), Rate::from_percentage(50), 6)
            .unwrap();
        plan.term_months = Some(u32::MAX);
        assert!(matches!(
            InstallmentSchedule::generate(&plan, start()),
            Err(CheckoutError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_full_plan_has_no_schedule() {
        let plan = PaymentPlanCalculator::standard().quote_full(Money::from_major(50_000));
        assert!(matches!(
            InstallmentSchedule::generate(&plan, start()),
            Err(CheckoutError::InvalidInput { .. })
        ));
    }
}
