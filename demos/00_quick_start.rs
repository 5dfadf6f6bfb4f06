/// quick start - hold a property and quote an installment plan
use property_checkout_rs::{CheckoutConfig, Money, Rate, ReservationLifecycle, SellableItem};
use property_checkout_rs::{PaymentPlanCalculator, Decimal};
use chrono::Utc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let now = Utc::now();
    let config = CheckoutConfig::standard();

    // list a $100,000 property of 250 m2
    let mut house = SellableItem::property("Riverside house", Money::from_major(100_000), Decimal::from(250), now);

    // reserve it for 48 hours
    let mut lifecycle = ReservationLifecycle::new(&config);
    let hold = lifecycle.request_hold(&mut house, "buyer-1", now)?;
    println!("held until {}", hold.expires_at.format("%Y-%m-%d %H:%M"));

    // 30% down, 12 months
    let plan = PaymentPlanCalculator::from_config(&config)
        .quote_installments(house.price, Rate::from_percentage(30), 12)?;

    println!("down payment: ${}", plan.down_payment);
    println!("monthly:      ${}", plan.monthly_payment.round_to_minor());

    Ok(())
}
