//! Integration tests for file-backed persistence across storefront sessions

use std::fs;

use testresult::TestResult;

use shopease::prelude::*;

#[test]
fn cart_round_trips_through_files() -> TestResult {
    let dir = tempfile::tempdir()?;
    let catalog = Catalog::bundled()?;

    let mut storefront =
        Storefront::open(&catalog, StateStore::new(FileStorage::open(dir.path())?));

    storefront.add_to_cart("P001", 2)?;
    storefront.add_to_cart("P005", 1)?;
    storefront.add_to_cart("P001", 1)?;

    let saved = storefront.cart().lines().to_vec();

    drop(storefront);

    let reopened = Storefront::open(&catalog, StateStore::new(FileStorage::open(dir.path())?));

    assert_eq!(reopened.cart().lines(), saved.as_slice());
    assert_eq!(
        saved,
        [
            CartLine {
                id: "P001".to_string(),
                qty: 3
            },
            CartLine {
                id: "P005".to_string(),
                qty: 1
            },
        ]
    );

    Ok(())
}

#[test]
fn hand_edited_cart_is_normalized_on_load() -> TestResult {
    let dir = tempfile::tempdir()?;
    let catalog = Catalog::bundled()?;

    fs::write(
        dir.path().join("shop_cart.json"),
        r#"[{"id":"P001","qty":250},{"id":"P002","qty":-1},{"id":"P001","qty":1}]"#,
    )?;

    let storefront = Storefront::open(&catalog, StateStore::new(FileStorage::open(dir.path())?));

    assert_eq!(
        storefront.cart().lines(),
        [CartLine {
            id: "P001".to_string(),
            qty: 99
        }]
    );

    Ok(())
}

#[test]
fn truncated_files_fall_back_to_defaults() -> TestResult {
    let dir = tempfile::tempdir()?;
    let catalog = Catalog::bundled()?;

    fs::write(dir.path().join("shop_wishlist.json"), r#"["P001", "P0"#)?;
    fs::write(dir.path().join("shop_orders.json"), "")?;

    let storefront = Storefront::open(&catalog, StateStore::new(FileStorage::open(dir.path())?));

    assert!(storefront.wishlist().is_empty());
    assert!(storefront.orders().is_empty());

    Ok(())
}

#[test]
fn user_is_stored_as_null_when_signed_out() -> TestResult {
    let dir = tempfile::tempdir()?;
    let catalog = Catalog::bundled()?;

    let mut storefront =
        Storefront::open(&catalog, StateStore::new(FileStorage::open(dir.path())?));

    storefront.set_user(catalog.users().first().cloned())?;

    let user: Option<User> = storefront.store().load(StoreKey::User, None);

    assert_eq!(user.and_then(|user| user.id), Some("U001".to_string()));

    storefront.set_user(None)?;

    assert_eq!(fs::read_to_string(dir.path().join("shop_user.json"))?, "null");

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn placed_order_is_readable_by_a_new_session() -> TestResult {
    let dir = tempfile::tempdir()?;
    let catalog = Catalog::bundled()?;

    let mut storefront =
        Storefront::open(&catalog, StateStore::new(FileStorage::open(dir.path())?));

    storefront.set_user(catalog.users().get(1).cloned())?;
    storefront.add_to_cart("P009", 2)?;

    let form = CheckoutForm::prefilled(storefront.user());
    let order = CheckoutFlow::new()
        .place_order(&mut storefront, &form, &SimulatedGateway::default())
        .await?;

    drop(storefront);

    assert!(!dir.path().join("shop_cart.json").exists());

    let reopened = Storefront::open(&catalog, StateStore::new(FileStorage::open(dir.path())?));

    assert!(reopened.cart().is_empty());
    assert_eq!(reopened.last_order(), Some(order.clone()));
    assert_eq!(reopened.orders(), [order.clone()]);
    assert_eq!(reopened.user().and_then(|user| user.name.clone()), Some("Sneha Patel".to_string()));

    let raw = fs::read_to_string(dir.path().join("shop_last_order.json"))?;
    let parsed: Order = serde_json::from_str(&raw)?;

    assert_eq!(parsed.customer.name, "Sneha Patel");
    assert!(raw.contains(r#""paymentMethod":"cod""#));
    assert!(raw.contains(r#""status":"Confirmed""#));

    Ok(())
}
