//! Catalog reads: categories and products, cached in memory.
//!
//! Caches categories and unfiltered product lists using `moka` (5-minute
//! TTL). Filtered queries go straight to the backend.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use tavola_core::ProductId;

use crate::api::types::{Category, Product};
use crate::api::{ApiClient, ApiError};
use crate::query::ProductFilter;

const CACHE_TTL: Duration = Duration::from_secs(300);

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Categories(Arc<Vec<Category>>),
    Products(Arc<Vec<Product>>),
    Product(Arc<Product>),
}

/// Catalog client with a read-through cache in front of the backend.
#[derive(Clone)]
pub struct CatalogClient {
    api: ApiClient,
    cache: Cache<String, CacheValue>,
}

impl CatalogClient {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();
        Self { api, cache }
    }

    /// Fetch all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Arc<Vec<Category>>, ApiError> {
        let cache_key = "categories".to_string();

        if let Some(CacheValue::Categories(categories)) = self.cache.get(&cache_key).await {
            debug!("cache hit for categories");
            return Ok(categories);
        }

        let categories = Arc::new(self.api.categories().await?);
        self.cache
            .insert(cache_key, CacheValue::Categories(Arc::clone(&categories)))
            .await;
        Ok(categories)
    }

    /// Fetch products, optionally filtered server-side.
    ///
    /// Only the unfiltered listing is cached; a constrained filter always
    /// goes to the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, filter))]
    pub async fn products(
        &self,
        filter: Option<&ProductFilter>,
    ) -> Result<Arc<Vec<Product>>, ApiError> {
        let unfiltered = filter.is_none_or(ProductFilter::is_empty);
        let cache_key = "products".to_string();

        if unfiltered
            && let Some(CacheValue::Products(products)) = self.cache.get(&cache_key).await
        {
            debug!("cache hit for products");
            return Ok(products);
        }

        let products = Arc::new(self.api.products(filter).await?);
        if unfiltered {
            self.cache
                .insert(cache_key, CacheValue::Products(Arc::clone(&products)))
                .await;
        }
        Ok(products)
    }

    /// Fetch one product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product(&self, product_id: &ProductId) -> Result<Arc<Product>, ApiError> {
        let cache_key = format!("product:{product_id}");

        if let Some(CacheValue::Product(product)) = self.cache.get(&cache_key).await {
            debug!("cache hit for product");
            return Ok(product);
        }

        let product = Arc::new(self.api.product(product_id.as_str()).await?);
        self.cache
            .insert(cache_key, CacheValue::Product(Arc::clone(&product)))
            .await;
        Ok(product)
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate a cached product.
    pub async fn invalidate_product(&self, product_id: &ProductId) {
        self.cache.invalidate(&format!("product:{product_id}")).await;
    }

    /// Invalidate all cached catalog data.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}
