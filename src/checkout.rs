use chrono::Duration;
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::CheckoutConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{CheckoutError, Result};
use crate::events::{Event, Notifier};
use crate::invoice::InvoiceRecord;
use crate::item::SellableItem;
use crate::payments::{LoanQuote, PaymentGateway, PaymentPlan, PaymentPlanCalculator, PaymentRequest};
use crate::reservation::{ReservationHold, ReservationLifecycle};
use crate::types::{HoldState, HolderId};

/// hold, quote and finalize a sale against a payment gateway
///
/// Reads the clock through a [`SafeTimeProvider`] so tests and demos can
/// drive time explicitly.
pub struct Checkout<G> {
    config: CheckoutConfig,
    lifecycle: ReservationLifecycle,
    calculator: PaymentPlanCalculator,
    gateway: G,
}

impl<G: PaymentGateway> Checkout<G> {
    pub fn new(config: CheckoutConfig, gateway: G) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            lifecycle: ReservationLifecycle::new(&config),
            calculator: PaymentPlanCalculator::from_config(&config),
            config,
            gateway,
        })
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> &ReservationLifecycle {
        &self.lifecycle
    }

    pub fn calculator(&self) -> &PaymentPlanCalculator {
        &self.calculator
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn request_hold(
        &mut self,
        item: &mut SellableItem,
        holder: impl Into<HolderId>,
        time: &SafeTimeProvider,
    ) -> Result<ReservationHold> {
        self.lifecycle.request_hold(item, holder, time.now())
    }

    pub fn check_expiry(
        &mut self,
        hold: &mut ReservationHold,
        item: &mut SellableItem,
        time: &SafeTimeProvider,
    ) -> Result<HoldState> {
        self.lifecycle.check_expiry(hold, item, time.now())
    }

    pub fn refresh_item(&mut self, item: &mut SellableItem, time: &SafeTimeProvider) -> Result<bool> {
        self.lifecycle.refresh_item(item, time.now())
    }

    pub fn cancel_hold(
        &mut self,
        hold: &mut ReservationHold,
        item: &mut SellableItem,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        self.lifecycle.cancel_hold(hold, item, time.now())
    }

    pub fn time_remaining(&self, hold: &ReservationHold, time: &SafeTimeProvider) -> Duration {
        self.lifecycle.time_remaining(hold, time.now())
    }

    pub fn quote_full(&self, item: &SellableItem) -> PaymentPlan {
        self.calculator.quote_full(item.price)
    }

    pub fn quote_installments(
        &self,
        item: &SellableItem,
        down_payment_pct: Rate,
        term_months: u32,
    ) -> Result<PaymentPlan> {
        self.calculator
            .quote_installments(item.price, down_payment_pct, term_months)
    }

    pub fn quote_loan(&self, principal: Money, annual_rate_pct: Decimal, term_years: u32) -> Result<LoanQuote> {
        self.calculator.quote_loan(principal, annual_rate_pct, term_years)
    }

    /// charge the amount due now and record the sale
    ///
    /// Nothing changes until the gateway resolves. A declined or timed-out
    /// payment leaves item and hold exactly as they were; a hold that lapses
    /// while the payment is in flight is not converted, and the settled
    /// payment is reported as [`Event::PaymentUnapplied`].
    #[tracing::instrument(skip_all, fields(item_id = %item.id, mode = %plan.mode))]
    pub async fn finalize(
        &mut self,
        item: &mut SellableItem,
        mut hold: Option<&mut ReservationHold>,
        buyer: impl Into<HolderId>,
        plan: &PaymentPlan,
        time: &SafeTimeProvider,
    ) -> Result<InvoiceRecord> {
        let buyer = buyer.into();
        let started = time.now();

        match hold.as_deref_mut() {
            Some(hold) => {
                let state = self.lifecycle.check_expiry(hold, item, started)?;
                if state != HoldState::Active {
                    return Err(CheckoutError::invalid_state(state, HoldState::Active));
                }
                if hold.holder != buyer {
                    return Err(CheckoutError::invalid_input(format!(
                        "hold {} belongs to {}, not {}",
                        hold.id, hold.holder, buyer
                    )));
                }
                if item.held_by != Some(hold.id) {
                    return Err(item.unavailable());
                }
            }
            None => {
                self.lifecycle.refresh_item(item, started)?;
                if !item.is_available() {
                    return Err(item.unavailable());
                }
            }
        }

        // only amounts this checkout would have quoted itself get charged
        let plan = self.calculator.verify(item.price, plan)?;

        let request = PaymentRequest::new(
            item.id,
            plan.amount_due_now(),
            plan.mode,
            format!("CHK-{}", Uuid::new_v4().simple()),
        );
        request.validate()?;

        let timeout = self.config.payment_timeout();
        let outcome = tokio::time::timeout(timeout, self.gateway.submit(request.clone())).await;
        let receipt = match outcome {
            Ok(Ok(receipt)) => receipt,
            Ok(Err(decline)) => {
                tracing::warn!(reason = %decline.reason, "payment declined");
                self.record_failure(&request, decline.reason.clone(), time);
                return Err(CheckoutError::PaymentFailed { reason: decline.reason });
            }
            Err(_) => {
                tracing::warn!(?timeout, "payment timed out");
                self.record_failure(&request, format!("no answer within {:?}", timeout), time);
                return Err(CheckoutError::PaymentTimeout { timeout });
            }
        };

        let now = time.now();
        let sale = match InvoiceRecord::issue(item, hold.as_deref(), buyer, &plan, receipt.reference.clone(), now) {
            Ok(invoice) => self
                .lifecycle
                .convert_to_sale(item, hold, &invoice, now)
                .map(|()| invoice),
            Err(err) => Err(err),
        };

        match sale {
            Ok(invoice) => {
                tracing::info!(invoice = %invoice.number(), amount = %invoice.amount(), "invoice issued");
                self.lifecycle.events_mut().emit(Event::InvoiceIssued {
                    invoice_id: invoice.id(),
                    item_id: invoice.item_id(),
                    amount: invoice.amount(),
                    mode: invoice.mode(),
                    timestamp: now,
                });
                Ok(invoice)
            }
            Err(err) => {
                tracing::warn!(payment = %receipt.reference, error = %err, "payment settled but sale not recorded");
                self.lifecycle.events_mut().emit(Event::PaymentUnapplied {
                    item_id: item.id,
                    payment_reference: receipt.reference,
                    amount: request.amount,
                    reason: err.to_string(),
                    timestamp: now,
                });
                Err(err)
            }
        }
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.lifecycle.take_events()
    }

    /// drain pending events into the notifier
    pub fn forward_events(&mut self, notifier: &dyn Notifier) -> usize {
        self.lifecycle.events_mut().forward(notifier)
    }

    fn record_failure(&mut self, request: &PaymentRequest, reason: String, time: &SafeTimeProvider) {
        self.lifecycle.events_mut().emit(Event::PaymentFailed {
            item_id: request.item_id,
            amount: request.amount,
            reason,
            timestamp: time.now(),
        });
    }
}
