//! Payment
//!
//! There is no real payment integration. [`SimulatedGateway`] stands in for the gateway
//! round-trip with a fixed delay and always approves.

use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use crate::checkout::order::Order;

/// Delay the simulated gateway waits before approving.
pub const DEFAULT_PAYMENT_DELAY: Duration = Duration::from_millis(1300);

/// Result of a gateway round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Payment accepted
    Approved,

    /// Payment refused, with the gateway's reason
    Declined(String),
}

/// Settles payment for a pending order.
pub trait PaymentGateway {
    /// Process payment for `order`. Runs to completion once started.
    async fn process(&self, order: &Order) -> PaymentOutcome;
}

/// Gateway that waits a fixed delay and approves every order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    /// Create a gateway with the given delay.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// The artificial processing delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(DEFAULT_PAYMENT_DELAY)
    }
}

impl PaymentGateway for SimulatedGateway {
    #[tracing::instrument(
        name = "checkout.gateway.process",
        skip(self, order),
        fields(order_id = %order.id, payment = %order.payment_method, delay_ms = self.delay.as_millis())
    )]
    async fn process(&self, order: &Order) -> PaymentOutcome {
        sleep(self.delay).await;

        debug!("simulated payment approved");

        PaymentOutcome::Approved
    }
}
