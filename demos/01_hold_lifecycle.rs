/// hold lifecycle - request, cancel, re-hold and direct purchase
use property_checkout_rs::{
    CheckoutConfig, CheckoutError, Decimal, InvoiceRecord, Money, PaymentPlanCalculator,
    ReservationLifecycle, SellableItem,
};
use chrono::{Duration, TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== hold lifecycle example ===\n");

    let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    let mut lifecycle = ReservationLifecycle::new(&CheckoutConfig::standard());
    let property = SellableItem::property("Olive grove", Money::from_major(320_000), Decimal::from(12_000), t0);
    let mut lot = SellableItem::lot(property.id, "Olive grove, lot 3", Money::from_major(45_000), Decimal::from(1_500), t0);

    let mut hold = lifecycle.request_hold(&mut lot, "alice", t0)?;
    println!("alice holds {} until {}", lot.title, hold.expires_at);

    // a second buyer is turned away while the hold is active
    match lifecycle.request_hold(&mut lot, "bob", t0 + Duration::hours(2)) {
        Err(CheckoutError::ItemUnavailable { status, .. }) => println!("bob refused: lot is {}", status),
        other => println!("unexpected: {:?}", other),
    }

    // alice changes her mind
    lifecycle.cancel_hold(&mut hold, &mut lot, t0 + Duration::hours(3))?;
    println!("alice cancelled, lot is {}", lot.status);

    // bob buys outright without holding
    let now = t0 + Duration::hours(4);
    let plan = PaymentPlanCalculator::standard().quote_full(lot.price);
    let invoice = InvoiceRecord::issue(&lot, None, "bob", &plan, "wire-20240601-17", now)?;
    lifecycle.convert_to_sale(&mut lot, None, &invoice, now)?;
    println!("bob bought the lot, invoice {} for ${}", invoice.number(), invoice.amount());

    println!("\nevents:");
    for event in lifecycle.take_events() {
        println!("  {:?}", event);
    }

    Ok(())
}
