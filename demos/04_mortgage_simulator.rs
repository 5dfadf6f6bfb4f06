/// mortgage simulator - loan quotes and a yearly amortization summary
use property_checkout_rs::{Money, PaymentPlanCalculator};
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== mortgage simulator example ===\n");

    let calculator = PaymentPlanCalculator::standard();
    let principal = Money::from_major(80_000);

    for (rate, years) in [(dec!(0), 20), (dec!(3.5), 20), (dec!(3.5), 30), (dec!(6.25), 15)] {
        let quote = calculator.quote_loan(principal, rate, years)?;
        println!(
            "{:>5}% over {} years: ${} a month, ${} interest",
            rate,
            years,
            quote.monthly_payment_rounded(),
            quote.total_interest.round_to_minor()
        );
    }

    let quote = calculator.quote_loan(principal, dec!(3.5), 20)?;
    let schedule = calculator.loan_schedule(&quote, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())?;
    println!("\nyear  interest     principal");
    for (year, interest, repaid) in schedule.yearly_totals() {
        println!("{}  {:>10}  {:>10}", year, interest, repaid);
    }

    Ok(())
}
