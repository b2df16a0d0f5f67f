//! Hosted-payment bridge: session creation, the return redirect in all
//! three outcomes, and the cancel page.

use httpmock::prelude::*;

use tavola_storefront::orders::OrderDraft;
use tavola_storefront::payment::{PaymentError, PaymentOutcome};
use tavola_storefront::store::keys;

use tavola_integration_tests::{TestContext, order_json};

/// Drive cart → order → checkout session against the mock backend,
/// returning the created order's id.
async fn checkout_to_pending(ctx: &mut TestContext) -> String {
    ctx.log_in("buyer@example.com");
    ctx.add_sample_item();

    ctx.server.mock(|when, then| {
        when.method(POST).path("/orders-create/");
        then.status(201)
            .header("content-type", "application/json")
            .body(order_json("ord_1", "pending"));
    });
    ctx.server.mock(|when, then| {
        when.method(POST).path("/payment/checkout/create/");
        then.status(200)
            .header("content-type", "application/json")
            .body(
                r#"{
                    "checkout_url": "https://checkout.stripe.com/c/pay/cs_test_abc",
                    "session_id": "cs_test_abc",
                    "payment_id": "pay_1"
                }"#,
            );
    });

    let order = ctx.shop.place_order(&OrderDraft::pickup()).await.unwrap();
    let redirect = ctx.shop.begin_checkout(&order).await.unwrap();
    assert!(redirect.checkout_url.starts_with("https://checkout.stripe.com/"));
    order.id.into_inner()
}

// ============================================================================
// Session creation
// ============================================================================

#[tokio::test]
async fn checkout_session_parks_pending_record() {
    let mut ctx = TestContext::start();
    checkout_to_pending(&mut ctx).await;

    let pending = ctx.store.get(keys::PENDING_PAYMENT).unwrap().unwrap();
    assert!(pending.contains("cs_test_abc"));
    assert!(pending.contains("ord_1"));
}

#[tokio::test]
async fn missing_checkout_url_is_a_distinct_failure() {
    let mut ctx = TestContext::start();
    ctx.log_in("buyer@example.com");
    ctx.add_sample_item();

    ctx.server.mock(|when, then| {
        when.method(POST).path("/orders-create/");
        then.status(201)
            .header("content-type", "application/json")
            .body(order_json("ord_1", "pending"));
    });
    ctx.server.mock(|when, then| {
        when.method(POST).path("/payment/checkout/create/");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"session_id": "cs_no_url"}"#);
    });

    let order = ctx.shop.place_order(&OrderDraft::pickup()).await.unwrap();
    let err = ctx.shop.begin_checkout(&order).await.unwrap_err();

    assert!(matches!(err, PaymentError::MissingCheckoutUrl));
    assert_eq!(err.to_string(), "no checkout URL received");
}

// ============================================================================
// Return flow
// ============================================================================

#[tokio::test]
async fn verified_return_clears_cart_and_pending() {
    let mut ctx = TestContext::start();
    checkout_to_pending(&mut ctx).await;
    // Order creation emptied the cart; refill it to prove verification
    // (not order creation) performs the final clear.
    ctx.add_sample_item();

    let verify = ctx.server.mock(|when, then| {
        when.method(POST)
            .path("/payment/checkout/verify/")
            .json_body_includes(r#"{"session_id": "cs_test_abc", "order_id": "ord_1"}"#);
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"status": "verified"}"#);
    });

    let outcome = ctx
        .shop
        .finish_checkout("session_id=cs_test_abc&success=true")
        .await;

    verify.assert();
    assert_eq!(
        outcome,
        PaymentOutcome::Success {
            order_id: "ord_1".into(),
        }
    );
    assert!(ctx.shop.cart().is_empty());
    assert_eq!(ctx.store.get(keys::PENDING_PAYMENT).unwrap(), None);
}

#[tokio::test]
async fn session_id_recovered_from_pending_when_url_lacks_it() {
    let mut ctx = TestContext::start();
    checkout_to_pending(&mut ctx).await;

    let verify = ctx.server.mock(|when, then| {
        when.method(POST).path("/payment/checkout/verify/");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"status": "success"}"#);
    });

    let outcome = ctx.shop.finish_checkout("success=true").await;

    verify.assert();
    assert_eq!(outcome.status(), tavola_core::PaymentStatus::Success);
}

#[tokio::test]
async fn rejected_verification_retains_pending_record() {
    let mut ctx = TestContext::start();
    checkout_to_pending(&mut ctx).await;
    ctx.add_sample_item();

    ctx.server.mock(|when, then| {
        when.method(POST).path("/payment/checkout/verify/");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"status": "failed", "message": "charge declined"}"#);
    });

    let outcome = ctx
        .shop
        .finish_checkout("session_id=cs_test_abc&success=true")
        .await;

    assert_eq!(
        outcome,
        PaymentOutcome::Failed {
            message: "charge declined".to_string(),
        }
    );
    // Nothing cleared: the user can retry or contact support.
    assert_eq!(ctx.shop.cart().total_items(), 1);
    assert!(ctx.store.get(keys::PENDING_PAYMENT).unwrap().is_some());
}

#[tokio::test]
async fn url_only_fallback_never_calls_verify() {
    // No pending record in the store at all; the URL alone claims success.
    let mut ctx = TestContext::start();
    ctx.add_sample_item();

    let verify = ctx.server.mock(|when, then| {
        when.method(POST).path("/payment/checkout/verify/");
        then.status(200).body(r#"{"status": "verified"}"#);
    });

    let outcome = ctx
        .shop
        .finish_checkout("session_id=cs_orphan&success=true")
        .await;

    verify.assert_hits(0);
    assert_eq!(outcome, PaymentOutcome::SuccessUnverified { order_id: None });
    assert!(ctx.shop.cart().is_empty());
}

// ============================================================================
// Cancel flow
// ============================================================================

#[tokio::test]
async fn cancel_page_leaves_everything_for_retry() {
    let mut ctx = TestContext::start();
    checkout_to_pending(&mut ctx).await;
    ctx.add_sample_item();

    let shown = ctx.shop.payment().cancelled_payment().unwrap();
    assert_eq!(shown.order_id.as_str(), "ord_1");
    assert_eq!(shown.order_number.as_deref(), Some("1042"));

    // Reading for display mutated nothing.
    assert_eq!(ctx.shop.cart().total_items(), 1);
    assert!(ctx.store.get(keys::PENDING_PAYMENT).unwrap().is_some());
}
