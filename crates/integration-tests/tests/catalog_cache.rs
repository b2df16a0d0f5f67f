//! Catalog reads: lenient wire decoding and the read-through cache.

use httpmock::prelude::*;

use tavola_core::ProductId;
use tavola_storefront::query::ProductFilter;

use tavola_integration_tests::TestContext;

#[tokio::test]
async fn unfiltered_product_list_is_cached() {
    let ctx = TestContext::start();

    let list = ctx.server.mock(|when, then| {
        when.method(GET).path("/products/");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"[{"id": "prod_1", "name": "Margherita", "price": "9.50"}]"#);
    });

    let first = ctx.shop.catalog().products(None).await.unwrap();
    let second = ctx.shop.catalog().products(None).await.unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    list.assert_hits(1);
}

#[tokio::test]
async fn filtered_queries_bypass_the_cache() {
    let ctx = TestContext::start();

    let filtered = ctx.server.mock(|when, then| {
        when.method(GET)
            .path("/products/")
            .query_param("category", "cat_pizza");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"[{"id": "prod_1", "name": "Margherita", "price": "9.50"}]"#);
    });

    let filter = ProductFilter {
        category: Some("cat_pizza".into()),
        search: None,
        available_only: false,
    };
    ctx.shop.catalog().products(Some(&filter)).await.unwrap();
    ctx.shop.catalog().products(Some(&filter)).await.unwrap();

    filtered.assert_hits(2);
}

#[tokio::test]
async fn malformed_price_decodes_as_zero() {
    // The backend occasionally emits non-numeric price fields; the decoder
    // treats them as zero rather than failing the whole listing.
    let ctx = TestContext::start();

    ctx.server.mock(|when, then| {
        when.method(GET).path("/products/");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"[{"id": "prod_1", "name": "Margherita", "price": {"broken": true}}]"#);
    });

    let products = ctx.shop.catalog().products(None).await.unwrap();
    assert_eq!(products.first().unwrap().price, rust_decimal::Decimal::ZERO);
}

#[tokio::test]
async fn invalidation_forces_a_refetch() {
    let ctx = TestContext::start();

    let detail = ctx.server.mock(|when, then| {
        when.method(GET).path("/products/prod_1/");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"id": "prod_1", "name": "Margherita", "price": "9.50"}"#);
    });

    let id = ProductId::new("prod_1");
    ctx.shop.catalog().product(&id).await.unwrap();
    ctx.shop.catalog().product(&id).await.unwrap();
    detail.assert_hits(1);

    ctx.shop.catalog().invalidate_product(&id).await;
    ctx.shop.catalog().product(&id).await.unwrap();
    detail.assert_hits(2);
}
