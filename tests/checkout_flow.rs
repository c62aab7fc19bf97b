//! Integration tests for placing orders through the simulated gateway

use std::time::Duration;

use rand::{SeedableRng, rngs::StdRng};
use testresult::TestResult;
use tokio::time::Instant;

use shopease::{
    catalog::Catalog,
    checkout::{
        CheckoutError, CheckoutFlow,
        form::{CardDetails, CheckoutForm},
        order::{OrderStatus, PaymentMethod},
        payment::{PaymentGateway, PaymentOutcome, SimulatedGateway},
    },
    pricing::ShippingPolicy,
    storage::{StateStore, Storage, memory::MemoryStorage},
    storefront::Storefront,
};

fn form(catalog: &Catalog<'_>, payment: PaymentMethod) -> CheckoutForm {
    let mut form = CheckoutForm::prefilled(catalog.users().first());

    form.payment = payment;

    if payment == PaymentMethod::Card {
        form.card = Some(CardDetails {
            number: "4111 1111 1111 1111".to_string(),
            expiry: "12/30".to_string(),
            cvv: "123".to_string(),
        });
    }

    form
}

fn flow<'f>() -> CheckoutFlow<'f> {
    CheckoutFlow::with_rng(StdRng::seed_from_u64(9))
}

#[tokio::test(start_paused = true)]
async fn cod_order_is_confirmed_and_clears_cart() -> TestResult {
    let catalog = Catalog::bundled()?;
    let mut storefront = Storefront::open(&catalog, StateStore::new(MemoryStorage::new()));

    storefront.add_to_cart("P001", 2)?;

    let order = flow()
        .place_order(
            &mut storefront,
            &form(&catalog, PaymentMethod::Cod),
            &SimulatedGateway::default(),
        )
        .await?;

    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.subtotal, 179_800);
    assert_eq!(order.shipping, 0);
    assert_eq!(order.total, 179_800);
    assert_eq!(order.customer.name, "Rahul Sharma");
    assert_eq!(storefront.cart_count(), 0);
    assert_eq!(storefront.store().backend().get("shop_cart")?, None);
    assert_eq!(storefront.last_order(), Some(order.clone()));
    assert_eq!(storefront.orders(), [order]);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn card_order_confirms_after_gateway_delay() -> TestResult {
    let catalog = Catalog::bundled()?;
    let mut storefront = Storefront::open(&catalog, StateStore::new(MemoryStorage::new()));
    let gateway = SimulatedGateway::new(Duration::from_millis(1300));
    let mut flow = flow();

    storefront.add_to_cart("P003", 1)?;

    let form = form(&catalog, PaymentMethod::Card);
    let pending = flow.submit(&storefront, &form)?;

    assert_eq!(pending.order().status, OrderStatus::PaymentPending);
    assert!(flow.is_processing());

    let started = Instant::now();
    let outcome = gateway.process(pending.order()).await;

    assert!(started.elapsed() >= Duration::from_millis(1300));

    let order = flow.complete(&mut storefront, pending, outcome)?;

    assert_eq!(order.status, OrderStatus::Confirmed);
    assert!(!flow.is_processing());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn upi_order_stays_payment_pending() -> TestResult {
    let catalog = Catalog::bundled()?;
    let mut storefront = Storefront::open(&catalog, StateStore::new(MemoryStorage::new()));

    storefront.add_to_cart("P007", 1)?;

    let order = flow()
        .place_order(
            &mut storefront,
            &form(&catalog, PaymentMethod::Upi),
            &SimulatedGateway::default(),
        )
        .await?;

    assert_eq!(order.status, OrderStatus::PaymentPending);
    assert_eq!(
        storefront.last_order().map(|order| order.status),
        Some(OrderStatus::PaymentPending)
    );

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn empty_cart_never_produces_an_order() -> TestResult {
    let catalog = Catalog::bundled()?;
    let mut storefront = Storefront::open(&catalog, StateStore::new(MemoryStorage::new()));

    let result = flow()
        .place_order(
            &mut storefront,
            &form(&catalog, PaymentMethod::Cod),
            &SimulatedGateway::default(),
        )
        .await;

    assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    assert!(storefront.orders().is_empty());
    assert_eq!(storefront.store().backend().get("shop_orders")?, None);
    assert_eq!(storefront.store().backend().get("shop_last_order")?, None);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn shipping_charged_at_or_below_threshold() -> TestResult {
    let catalog = Catalog::bundled()?;
    let mut storefront = Storefront::open(&catalog, StateStore::new(MemoryStorage::new()));
    let mut flow = flow().with_shipping(ShippingPolicy::new(1000, 40));

    storefront.add_to_cart("P007", 1)?;

    let order = flow
        .place_order(
            &mut storefront,
            &form(&catalog, PaymentMethod::Cod),
            &SimulatedGateway::default(),
        )
        .await?;

    assert_eq!(order.subtotal, 69_900);
    assert_eq!(order.shipping, 4_000);
    assert_eq!(order.total, 73_900);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn orders_accumulate_most_recent_first() -> TestResult {
    let catalog = Catalog::bundled()?;
    let mut storefront = Storefront::open(&catalog, StateStore::new(MemoryStorage::new()));
    let mut flow = flow();
    let gateway = SimulatedGateway::new(Duration::from_millis(10));
    let form = form(&catalog, PaymentMethod::Cod);

    storefront.add_to_cart("P001", 1)?;
    let first = flow.place_order(&mut storefront, &form, &gateway).await?;

    storefront.add_to_cart("P002", 1)?;
    let second = flow.place_order(&mut storefront, &form, &gateway).await?;

    let ids: Vec<_> = storefront.orders().into_iter().map(|order| order.id).collect();

    assert_ne!(first.id, second.id);
    assert_eq!(ids, [second.id.clone(), first.id]);
    assert_eq!(storefront.last_order().map(|order| order.id), Some(second.id));

    Ok(())
}

#[test]
fn invalid_card_is_rejected_before_processing() -> TestResult {
    let catalog = Catalog::bundled()?;
    let mut storefront = Storefront::open(&catalog, StateStore::new(MemoryStorage::new()));
    let mut flow = flow();

    storefront.add_to_cart("P001", 1)?;

    let mut without_card = form(&catalog, PaymentMethod::Card);

    without_card.card = None;

    assert!(matches!(
        flow.submit(&storefront, &without_card),
        Err(CheckoutError::Invalid(_))
    ));
    assert!(!flow.is_processing());

    let declined = {
        let pending = flow.submit(&storefront, &form(&catalog, PaymentMethod::Card))?;

        flow.complete(
            &mut storefront,
            pending,
            PaymentOutcome::Declined("card expired".to_string()),
        )
    };

    assert!(matches!(declined, Err(CheckoutError::PaymentDeclined(_))));
    assert_eq!(storefront.cart_count(), 1);

    Ok(())
}
