//! Checkout
//!
//! Turns the cart into a persisted [`Order`]. A submission is validated, priced and given
//! an id by [`CheckoutFlow::submit`], settled by a [`PaymentGateway`] and then recorded by
//! [`CheckoutFlow::complete`]. Only one submission may be in flight at a time.

use std::fmt;

use jiff::Timestamp;
use rand::{SeedableRng, rngs::StdRng};
use thiserror::Error;
use tracing::{Span, info, warn};

use crate::{
    checkout::{
        form::{CheckoutForm, ValidationErrors},
        order::{Order, OrderSnapshot},
        payment::{PaymentGateway, PaymentOutcome},
    },
    pricing::{ShippingPolicy, TotalPriceError},
    storage::{Storage, StoreError},
    storefront::Storefront,
};

pub mod form;
pub mod order;
pub mod order_id;
pub mod payment;

/// Errors that end a checkout attempt.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// One or more form fields are invalid
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),

    /// There is nothing in the cart to order
    #[error("your cart is empty")]
    EmptyCart,

    /// Another submission has not completed yet
    #[error("an order is already being placed")]
    SubmissionInFlight,

    /// The pending order is not the one being placed
    #[error("no matching order is being placed")]
    NotInFlight,

    /// Every generated order id was already taken
    #[error("could not generate an unused order id")]
    OrderIdExhausted,

    /// The gateway refused payment
    #[error("payment declined: {0}")]
    PaymentDeclined(String),

    /// Payment went through but the order could not be persisted. The flow is still
    /// processing this order; pass it back to [`CheckoutFlow::complete`] to retry or to
    /// [`CheckoutFlow::abandon`] to give up.
    #[error("order could not be recorded: {source}")]
    NotRecorded {
        /// The order awaiting a successful write
        pending: Box<PendingOrder>,

        /// Why the write failed
        source: StoreError,
    },

    /// Order could not be priced
    #[error(transparent)]
    Price(#[from] TotalPriceError),
}

/// Where a checkout attempt is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CheckoutState {
    /// Waiting for a submission
    #[default]
    Idle,

    /// A submission is awaiting payment
    Processing {
        /// Id of the order being placed
        order_id: String,
    },
}

/// A validated, priced order that has not been recorded yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOrder {
    order: Order,
}

impl PendingOrder {
    /// The order as it will be recorded if payment succeeds.
    pub fn order(&self) -> &Order {
        &self.order
    }

    /// The order id.
    pub fn id(&self) -> &str {
        &self.order.id
    }
}

type CompletionCallback<'f> = Box<dyn FnMut(&Order) + 'f>;

/// Checkout Flow
pub struct CheckoutFlow<'f> {
    state: CheckoutState,
    shipping: ShippingPolicy,
    rng: StdRng,
    on_complete: Option<CompletionCallback<'f>>,
}

impl fmt::Debug for CheckoutFlow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutFlow")
            .field("state", &self.state)
            .field("shipping", &self.shipping)
            .field("on_complete", &self.on_complete.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for CheckoutFlow<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'f> CheckoutFlow<'f> {
    /// Create an idle flow with the default shipping policy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create an idle flow drawing order id suffixes from `rng`.
    pub fn with_rng(rng: StdRng) -> Self {
        CheckoutFlow {
            state: CheckoutState::Idle,
            shipping: ShippingPolicy::default(),
            rng,
            on_complete: None,
        }
    }

    /// Use a different shipping policy.
    #[must_use]
    pub fn with_shipping(mut self, shipping: ShippingPolicy) -> Self {
        self.shipping = shipping;
        self
    }

    /// Call `callback` with every order once it has been recorded.
    #[must_use]
    pub fn on_complete(mut self, callback: impl FnMut(&Order) + 'f) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// The current state.
    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Whether a submission is awaiting payment.
    pub fn is_processing(&self) -> bool {
        matches!(self.state, CheckoutState::Processing { .. })
    }

    /// The shipping policy.
    pub fn shipping(&self) -> &ShippingPolicy {
        &self.shipping
    }

    /// Validate the form, snapshot the cart and reserve an order id.
    ///
    /// The flow stays in [`CheckoutState::Processing`] until the returned order is passed to
    /// [`CheckoutFlow::complete`] or [`CheckoutFlow::abandon`].
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::SubmissionInFlight`]: another submission is still processing.
    /// - [`CheckoutError::Invalid`]: the form has invalid fields.
    /// - [`CheckoutError::EmptyCart`]: the cart is empty.
    /// - [`CheckoutError::Price`]: the cart could not be priced.
    /// - [`CheckoutError::OrderIdExhausted`]: no unused order id could be generated.
    #[tracing::instrument(
        name = "checkout.submit",
        skip(self, storefront, form),
        fields(
            payment = %form.payment,
            delivery = %form.delivery,
            order_id = tracing::field::Empty,
            item_count = tracing::field::Empty
        ),
        err
    )]
    pub fn submit<S: Storage>(
        &mut self,
        storefront: &Storefront<'_, S>,
        form: &CheckoutForm,
    ) -> Result<PendingOrder, CheckoutError> {
        if self.is_processing() {
            return Err(CheckoutError::SubmissionInFlight);
        }

        form.validate()?;

        let snapshot = OrderSnapshot::build(storefront.cart(), storefront.catalog(), &self.shipping)?;

        if snapshot.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let created_at = Timestamp::now();
        let placed = storefront.orders();

        let id = order_id::generate_unique(created_at, &mut self.rng, |candidate| {
            placed.iter().any(|order| order.id == candidate)
        })
        .ok_or(CheckoutError::OrderIdExhausted)?;

        let order = Order::new(id, created_at, form, snapshot);

        let span = Span::current();

        span.record("order_id", tracing::field::display(&order.id));
        span.record("item_count", order.item_count());

        self.state = CheckoutState::Processing {
            order_id: order.id.clone(),
        };

        Ok(PendingOrder { order })
    }

    /// Record a pending order after the gateway has answered.
    ///
    /// On approval the order is settled, prepended to the order history, stored as the last
    /// order and the cart is emptied. The flow returns to [`CheckoutState::Idle`] unless the
    /// order could not be recorded.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::NotInFlight`]: `pending` is not the order being placed.
    /// - [`CheckoutError::PaymentDeclined`]: the gateway declined; nothing is recorded.
    /// - [`CheckoutError::NotRecorded`]: the order could not be persisted; it is handed back
    ///   and the flow keeps processing it.
    #[tracing::instrument(
        name = "checkout.complete",
        skip(self, storefront, pending, outcome),
        fields(order_id = %pending.id()),
        err
    )]
    pub fn complete<S: Storage>(
        &mut self,
        storefront: &mut Storefront<'_, S>,
        pending: PendingOrder,
        outcome: PaymentOutcome,
    ) -> Result<Order, CheckoutError> {
        match &self.state {
            CheckoutState::Processing { order_id } if *order_id == pending.order.id => {}
            CheckoutState::Processing { .. } | CheckoutState::Idle => {
                return Err(CheckoutError::NotInFlight);
            }
        }

        let order = match outcome {
            PaymentOutcome::Approved => pending.order.settled(),
            PaymentOutcome::Declined(reason) => {
                self.state = CheckoutState::Idle;

                warn!(%reason, "payment declined");

                return Err(CheckoutError::PaymentDeclined(reason));
            }
        };

        if let Err(source) = storefront.record_order(&order) {
            return Err(CheckoutError::NotRecorded {
                pending: Box::new(PendingOrder { order }),
                source,
            });
        }

        self.state = CheckoutState::Idle;

        info!(status = %order.status, total = order.total, "placed order");

        if let Some(callback) = self.on_complete.as_mut() {
            callback(&order);
        }

        Ok(order)
    }

    /// Give up on a pending order without recording it and return to
    /// [`CheckoutState::Idle`]. The unrecorded order is handed back.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotInFlight`] if `pending` is not the order being placed.
    pub fn abandon(&mut self, pending: PendingOrder) -> Result<Order, CheckoutError> {
        match &self.state {
            CheckoutState::Processing { order_id } if *order_id == pending.order.id => {
                self.state = CheckoutState::Idle;

                Ok(pending.order)
            }
            CheckoutState::Processing { .. } | CheckoutState::Idle => Err(CheckoutError::NotInFlight),
        }
    }

    /// Submit, wait for the gateway and record the order.
    ///
    /// # Errors
    ///
    /// Returns any error of [`CheckoutFlow::submit`] or [`CheckoutFlow::complete`].
    pub async fn place_order<S: Storage, G: PaymentGateway>(
        &mut self,
        storefront: &mut Storefront<'_, S>,
        form: &CheckoutForm,
        gateway: &G,
    ) -> Result<Order, CheckoutError> {
        let pending = self.submit(storefront, form)?;

        let outcome = gateway.process(pending.order()).await;

        self.complete(storefront, pending, outcome)
    }
}
