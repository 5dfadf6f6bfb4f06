/// time control - watch a 48 hour hold count down and lapse
use property_checkout_rs::{
    CheckoutConfig, Decimal, HoldView, ItemView, Money, ReservationLifecycle, SafeTimeProvider,
    SellableItem, TimeSource,
};
use chrono::{Duration, TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== time control example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();

    let mut lifecycle = ReservationLifecycle::new(&CheckoutConfig::standard());
    let mut item = SellableItem::property("Harbour loft", Money::from_major(180_000), Decimal::from(80), time.now());
    let mut hold = lifecycle.request_hold(&mut item, "buyer-1", time.now())?;

    for step in [1, 12, 24, 10, 1] {
        controller.advance(Duration::hours(step));
        let view = HoldView::from_hold(&hold, time.now());
        println!("{}  remaining {}  ({})", time.now().format("%Y-%m-%d %H:%M"), view.countdown, view.state);
    }

    // the item already reads as available before anyone touches the hold
    println!("\nitem view: {}", ItemView::from_item(&item, time.now()).status);

    let state = lifecycle.check_expiry(&mut hold, &mut item, time.now())?;
    println!("hold is now {}, item is {}", state, item.status);

    Ok(())
}
