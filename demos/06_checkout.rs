/// checkout - finalize a held sale through an async payment gateway
use property_checkout_rs::{
    async_trait, Checkout, CheckoutConfig, CheckoutError, Decimal, InvoiceView, LogNotifier, Money,
    PaymentDecline, PaymentGateway, PaymentReceipt, PaymentRequest, Rate, SafeTimeProvider,
    SellableItem, TimeSource,
};
use chrono::{Duration, TimeZone, Utc};

/// approves anything below its limit
struct DemoGateway {
    limit: Money,
}

#[async_trait]
impl PaymentGateway for DemoGateway {
    async fn submit(&self, request: PaymentRequest) -> Result<PaymentReceipt, PaymentDecline> {
        if request.amount > self.limit {
            return Err(PaymentDecline::new("amount above card limit"));
        }
        Ok(PaymentReceipt {
            reference: format!("demo-{}", &request.reference[4..12]),
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).init();

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();

    let gateway = DemoGateway { limit: Money::from_major(50_000) };
    let mut checkout = Checkout::new(CheckoutConfig::standard(), gateway)?;
    let mut item = SellableItem::property("Vineyard house", Money::from_major(100_000), Decimal::from(300), time.now());

    let mut hold = checkout.request_hold(&mut item, "buyer-1", &time)?;
    controller.advance(Duration::hours(1));

    // paying in full is above the limit
    let full = checkout.quote_full(&item);
    match checkout.finalize(&mut item, Some(&mut hold), "buyer-1", &full, &time).await {
        Err(CheckoutError::PaymentFailed { reason }) => println!("full payment declined: {}", reason),
        other => println!("unexpected: {:?}", other.map(|i| i.number().to_string())),
    }
    println!("item still {}, hold still {}", item.status, hold.state);

    // 30% down fits
    let plan = checkout.quote_installments(&item, Rate::from_percentage(30), 12)?;
    let invoice = checkout
        .finalize(&mut item, Some(&mut hold), "buyer-1", &plan, &time)
        .await?;

    println!("{}", InvoiceView::from_invoice(&invoice).to_json_pretty()?);
    let forwarded = checkout.forward_events(&LogNotifier);
    println!("forwarded {} events", forwarded);

    Ok(())
}
