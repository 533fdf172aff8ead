//! # Product Routes
//!
//! CRUD + search for products. Products are the one resource with a
//! physical delete; see `mercado_db::repository::product`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;
use mercado_core::validation::{validate_price_cents, validate_required, validate_search_query};
use mercado_core::Product;
use mercado_db::repository::product::{NewProduct, ProductPatch};

/// Product DTO (Data Transfer Object) for API responses.
///
/// Decouples the internal domain model from the wire contract and
/// handles the camelCase rename for JSON consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub brand: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        ProductDto {
            id: p.id,
            name: p.name,
            description: p.description,
            price_cents: p.price_cents,
            brand: p.brand,
            created_at: p.created_at,
            updated_at: p.updated_at,
            deleted_at: p.deleted_at,
        }
    }
}

/// Creation payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub brand: String,
}

/// Update payload; omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub brand: Option<String>,
}

/// Routes for the product resource.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/search/{query}", get(search_products))
}

async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductDto>>, ApiError> {
    let products = state.db.products().list().await?;
    Ok(Json(products.into_iter().map(ProductDto::from).collect()))
}

/// A missing id yields an empty (null) body, not an error.
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<ProductDto>>, ApiError> {
    let product = state.db.products().get_by_id(&id).await?;
    Ok(Json(product.map(ProductDto::from)))
}

async fn search_products(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Result<Json<Vec<ProductDto>>, ApiError> {
    let query = validate_search_query(&query)?;
    let products = state.db.products().search(&query).await?;
    Ok(Json(products.into_iter().map(ProductDto::from).collect()))
}

async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductDto>), ApiError> {
    debug!(name = %req.name, "create_product");

    validate_required("name", &req.name)?;
    validate_required("description", &req.description)?;
    validate_required("brand", &req.brand)?;
    validate_price_cents(req.price_cents)?;

    let product = state
        .db
        .products()
        .create(NewProduct {
            name: req.name,
            description: req.description,
            price_cents: req.price_cents,
            brand: req.brand,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductDto>, ApiError> {
    debug!(id = %id, "update_product");

    if let Some(price_cents) = req.price_cents {
        validate_price_cents(price_cents)?;
    }

    let product = state
        .db
        .products()
        .update(
            &id,
            ProductPatch {
                name: req.name,
                description: req.description,
                price_cents: req.price_cents,
                brand: req.brand,
            },
        )
        .await?;

    Ok(Json(product.into()))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductDto>, ApiError> {
    debug!(id = %id, "delete_product");
    let product = state.db.products().delete(&id).await?;
    Ok(Json(product.into()))
}
