//! # Sale Routes
//!
//! Sales are created whole — header plus line items — and every read
//! returns the nested representation: the customer and each line item
//! with its product. Updates touch only the customer and the sale date;
//! line items are immutable.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::routes::customer::CustomerDto;
use crate::routes::product::ProductDto;
use crate::state::AppState;
use mercado_core::validation::{validate_quantity, validate_required, validate_search_query};
use mercado_core::{SaleLineView, SaleView};
use mercado_db::repository::sale::{NewSale, NewSaleLine, SaleUpdate};

/// One sale line item with its embedded product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleProductDto {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub product: ProductDto,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<SaleLineView> for SaleProductDto {
    fn from(view: SaleLineView) -> Self {
        SaleProductDto {
            id: view.line.id,
            sale_id: view.line.sale_id,
            product_id: view.line.product_id,
            quantity: view.line.quantity,
            product: view.product.into(),
            created_at: view.line.created_at,
            updated_at: view.line.updated_at,
            deleted_at: view.line.deleted_at,
        }
    }
}

/// A sale with its customer and line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub customer_id: String,
    pub sale_date: DateTime<Utc>,
    pub customer: CustomerDto,
    pub sale_products: Vec<SaleProductDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<SaleView> for SaleDto {
    fn from(view: SaleView) -> Self {
        SaleDto {
            id: view.sale.id,
            name: view.sale.name,
            description: view.sale.description,
            customer_id: view.sale.customer_id,
            sale_date: view.sale.sale_date,
            customer: view.customer.into(),
            sale_products: view.products.into_iter().map(SaleProductDto::from).collect(),
            created_at: view.sale.created_at,
            updated_at: view.sale.updated_at,
            deleted_at: view.sale.deleted_at,
        }
    }
}

/// One line item of the creation payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleProductRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// Creation payload: header fields plus line items, inserted atomically.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    pub name: String,
    pub description: String,
    pub customer_id: String,
    pub sale_date: DateTime<Utc>,
    pub sale_products: Vec<CreateSaleProductRequest>,
}

/// Update payload. Only the customer and the sale date are updatable.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSaleRequest {
    pub customer_id: Option<String>,
    pub sale_date: Option<DateTime<Utc>>,
}

/// Routes for the sale resource.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sales).post(create_sale))
        .route("/{id}", get(get_sale).put(update_sale).delete(delete_sale))
        .route("/search/{query}", get(search_sales))
}

async fn list_sales(State(state): State<AppState>) -> Result<Json<Vec<SaleDto>>, ApiError> {
    let sales = state.db.sales().list().await?;
    Ok(Json(sales.into_iter().map(SaleDto::from).collect()))
}

async fn get_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<SaleDto>>, ApiError> {
    let sale = state.db.sales().get_by_id(&id).await?;
    Ok(Json(sale.map(SaleDto::from)))
}

async fn search_sales(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Result<Json<Vec<SaleDto>>, ApiError> {
    let query = validate_search_query(&query)?;
    let sales = state.db.sales().search(&query).await?;
    Ok(Json(sales.into_iter().map(SaleDto::from).collect()))
}

async fn create_sale(
    State(state): State<AppState>,
    Json(req): Json<CreateSaleRequest>,
) -> Result<(StatusCode, Json<SaleDto>), ApiError> {
    debug!(name = %req.name, lines = req.sale_products.len(), "create_sale");

    validate_required("name", &req.name)?;
    validate_required("description", &req.description)?;
    validate_required("customerId", &req.customer_id)?;
    for line in &req.sale_products {
        validate_required("productId", &line.product_id)?;
        validate_quantity(line.quantity)?;
    }

    let sale = state
        .db
        .sales()
        .create(NewSale {
            name: req.name,
            description: req.description,
            customer_id: req.customer_id,
            sale_date: req.sale_date,
            products: req
                .sale_products
                .into_iter()
                .map(|line| NewSaleLine {
                    product_id: line.product_id,
                    quantity: line.quantity,
                })
                .collect(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(sale.into())))
}

async fn update_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSaleRequest>,
) -> Result<Json<SaleDto>, ApiError> {
    debug!(id = %id, "update_sale");

    let sale = state
        .db
        .sales()
        .update(
            &id,
            SaleUpdate {
                customer_id: req.customer_id,
                sale_date: req.sale_date,
            },
        )
        .await?;

    Ok(Json(sale.into()))
}

async fn delete_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SaleDto>, ApiError> {
    debug!(id = %id, "delete_sale");
    let sale = state.db.sales().delete(&id).await?;
    Ok(Json(sale.into()))
}
