//! Integration tests for Shopfront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog_view` - View controller scenarios over the mock source
//! - `http_source` - HTTP product source against an in-process API
//!
//! This crate also provides the shared fixtures: product builders and a
//! small product API served by `axum` on an ephemeral local port.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rust_decimal::Decimal;
use shopfront_core::{Product, ProductId, Rating};
use url::Url;

/// Build a product with the fields the engine filters and sorts on.
#[must_use]
pub fn product(id: i64, price: i64, category: &str, brand: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        description: format!("{brand} {category}"),
        category: category.to_string(),
        brand: brand.to_string(),
        price: Decimal::from(price),
        sales: 0,
        rating: Rating::default(),
        create_time: String::new(),
        image: None,
        stock: None,
    }
}

/// Products with the given prices, IDs starting at 1.
#[must_use]
pub fn priced(prices: &[i64]) -> Vec<Product> {
    prices
        .iter()
        .zip(1..)
        .map(|(&price, id)| product(id, price, "general", "Acme"))
        .collect()
}

/// Prices of `products`, in order.
#[must_use]
pub fn prices(products: &[&Product]) -> Vec<Decimal> {
    products.iter().map(|p| p.price).collect()
}

/// Decimal values of `values`, in order.
#[must_use]
pub fn decimals(values: &[i64]) -> Vec<Decimal> {
    values.iter().copied().map(Decimal::from).collect()
}

// =============================================================================
// Test product API
// =============================================================================

/// How the test API answers.
#[derive(Debug, Clone, Default)]
pub struct ApiBehavior {
    /// Bearer token every request must carry.
    pub required_token: Option<String>,
    /// Answer the list route with this status and body instead of products.
    pub list_failure: Option<(StatusCode, String)>,
}

#[derive(Clone)]
struct ApiState {
    products: Arc<Vec<Product>>,
    behavior: Arc<ApiBehavior>,
}

impl ApiState {
    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        let Some(token) = &self.behavior.required_token else {
            return Ok(());
        };
        let expected = format!("Bearer {token}");
        let given = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        if given == Some(expected.as_str()) {
            Ok(())
        } else {
            Err((StatusCode::UNAUTHORIZED, "missing or wrong token").into_response())
        }
    }
}

async fn list_products(State(state): State<ApiState>, headers: HeaderMap) -> Response {
    if let Err(denied) = state.authorize(&headers) {
        return denied;
    }
    if let Some((status, body)) = &state.behavior.list_failure {
        return (*status, body.clone()).into_response();
    }
    Json(state.products.as_ref().clone()).into_response()
}

async fn product_by_id(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(denied) = state.authorize(&headers) {
        return denied;
    }
    state
        .products
        .iter()
        .find(|p| p.id.as_i64() == id)
        .map_or_else(
            || (StatusCode::NOT_FOUND, "no such product").into_response(),
            |p| Json(p.clone()).into_response(),
        )
}

async fn search_products(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(denied) = state.authorize(&headers) {
        return denied;
    }
    let keyword = params.get("keyword").cloned().unwrap_or_default();
    let hits: Vec<Product> = state
        .products
        .iter()
        .filter(|p| p.name.contains(&keyword) || p.description.contains(&keyword))
        .cloned()
        .collect();
    Json(hits).into_response()
}

/// Router for the test API, mounted under `/api`.
pub fn api_router(products: Vec<Product>, behavior: ApiBehavior) -> Router {
    let state = ApiState {
        products: Arc::new(products),
        behavior: Arc::new(behavior),
    };
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/search", get(search_products))
        .route("/api/products/{id}", get(product_by_id))
        .with_state(state)
}

/// Serve `router` on an ephemeral local port and return its base URL.
///
/// # Errors
///
/// Returns an error if no local port can be bound.
pub async fn serve(router: Router) -> std::io::Result<Url> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Url::parse(&format!("http://{addr}/api"))
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
}

/// Serve the test API over `products`.
///
/// # Errors
///
/// Returns an error if no local port can be bound.
pub async fn spawn_api(products: Vec<Product>, behavior: ApiBehavior) -> std::io::Result<Url> {
    serve(api_router(products, behavior)).await
}
