/// installment plans - compare down payments and terms
use property_checkout_rs::{Money, PaymentPlanCalculator, Rate};
use chrono::{TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== installment plans example ===\n");

    let calculator = PaymentPlanCalculator::standard();
    let price = Money::from_major(100_000);

    println!("{:>6} {:>6} {:>12} {:>12}", "down", "term", "due now", "monthly");
    for pct in [20, 30, 50] {
        for &term in &calculator.rules().allowed_terms_months {
            let plan = calculator.quote_installments(price, Rate::from_percentage(pct), term)?;
            println!(
                "{:>5}% {:>6} {:>12} {:>12}",
                pct,
                term,
                plan.amount_due_now(),
                plan.monthly_payment.round_to_minor()
            );
        }
    }

    // out of bounds down payment
    if let Err(e) = calculator.quote_installments(price, Rate::from_percentage(15), 12) {
        println!("\n15% down: {}", e);
    }

    // dated schedule for one plan
    let plan = calculator.quote_installments(price, Rate::from_percentage(30), 6)?;
    let start = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
    let schedule = calculator.installment_schedule(&plan, start)?;
    println!("\n30% down over 6 months, paid {}:", start.format("%Y-%m-%d"));
    for installment in &schedule.installments {
        println!(
            "  #{} {} ${} (left ${})",
            installment.number,
            installment.due_date.format("%Y-%m-%d"),
            installment.amount,
            installment.balance_after
        );
    }

    Ok(())
}
