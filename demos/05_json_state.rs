/// json state - persist holds and items, then render views
use property_checkout_rs::{
    CheckoutConfig, Decimal, HoldView, ItemView, Money, ReservationHold, ReservationLifecycle,
    SellableItem,
};
use chrono::{Duration, TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let t0 = Utc.with_ymd_and_hms(2024, 3, 15, 18, 0, 0).unwrap();
    let config = CheckoutConfig::from_json(
        r#"{
            "reservation": { "hold_duration_hours": 24, "countdown_refresh_secs": 30 },
            "installments": { "min_down_payment": "0.2", "max_down_payment": "0.5", "allowed_terms_months": [12, 24] },
            "payment": { "timeout_secs": 45 }
        }"#,
    )?;

    let mut lifecycle = ReservationLifecycle::new(&config);
    let mut item = SellableItem::property("Mountain cabin", Money::from_major(95_000), Decimal::from(70), t0);
    let hold = lifecycle.request_hold(&mut item, "buyer-1", t0)?;

    // holds survive a restart as plain data
    let stored = serde_json::to_string(&hold)?;
    let restored: ReservationHold = serde_json::from_str(&stored)?;

    let later = t0 + Duration::hours(6);
    println!("{}", ItemView::from_item(&item, later).to_json_pretty()?);
    println!("{}", HoldView::from_hold(&restored, later).to_json_pretty()?);

    Ok(())
}
