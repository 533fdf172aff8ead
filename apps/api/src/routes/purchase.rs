//! # Purchase Routes
//!
//! Purchases restock previously sold units: the creation payload names a
//! supplier and a set of sale line items, and the whole request is
//! rejected with 409 if any of those items already belongs to a live
//! purchase.
//!
//! There is no update route. Purchase mutation is create + delete only
//! (the legacy system never grew an update path, and no contract is
//! assumed beyond that).
//!
//! The wire key `PurchaseSaleProducts` is kept verbatim from the legacy
//! format, capital P included.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::routes::product::ProductDto;
use crate::routes::supplier::SupplierDto;
use crate::state::AppState;
use mercado_core::validation::{validate_required, validate_search_query};
use mercado_core::{PurchaseLineView, PurchaseView, Sale};
use mercado_db::repository::purchase::NewPurchase;

/// Sale header as embedded in purchase line items (no customer, no
/// line items of its own).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleSummaryDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub customer_id: String,
    pub sale_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Sale> for SaleSummaryDto {
    fn from(s: Sale) -> Self {
        SaleSummaryDto {
            id: s.id,
            name: s.name,
            description: s.description,
            customer_id: s.customer_id,
            sale_date: s.sale_date,
            created_at: s.created_at,
            updated_at: s.updated_at,
            deleted_at: s.deleted_at,
        }
    }
}

/// The sale line item a purchase line points at, with its product and —
/// on list/search reads — its parent sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasedSaleProductDto {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub product: ProductDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale: Option<SaleSummaryDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// One purchase line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseSaleProductDto {
    pub id: String,
    pub purchase_id: String,
    pub sale_product_id: String,
    pub sale_product: PurchasedSaleProductDto,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<PurchaseLineView> for PurchaseSaleProductDto {
    fn from(view: PurchaseLineView) -> Self {
        PurchaseSaleProductDto {
            id: view.line.id,
            purchase_id: view.line.purchase_id,
            sale_product_id: view.line.sale_product_id,
            sale_product: PurchasedSaleProductDto {
                id: view.sale_product.id,
                sale_id: view.sale_product.sale_id,
                product_id: view.sale_product.product_id,
                quantity: view.sale_product.quantity,
                product: view.product.into(),
                sale: view.sale.map(SaleSummaryDto::from),
                created_at: view.sale_product.created_at,
                updated_at: view.sale_product.updated_at,
                deleted_at: view.sale_product.deleted_at,
            },
            created_at: view.line.created_at,
            updated_at: view.line.updated_at,
            deleted_at: view.line.deleted_at,
        }
    }
}

/// A purchase with its supplier and line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub supplier_id: String,
    pub supplier: SupplierDto,
    #[serde(rename = "PurchaseSaleProducts")]
    pub purchase_sale_products: Vec<PurchaseSaleProductDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<PurchaseView> for PurchaseDto {
    fn from(view: PurchaseView) -> Self {
        PurchaseDto {
            id: view.purchase.id,
            name: view.purchase.name,
            description: view.purchase.description,
            supplier_id: view.purchase.supplier_id,
            supplier: view.supplier.into(),
            purchase_sale_products: view
                .lines
                .into_iter()
                .map(PurchaseSaleProductDto::from)
                .collect(),
            created_at: view.purchase.created_at,
            updated_at: view.purchase.updated_at,
            deleted_at: view.purchase.deleted_at,
        }
    }
}

/// One line of the creation payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseSaleProductRequest {
    pub sale_product_id: String,
}

/// Creation payload: supplier plus the sale line items to restock.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseRequest {
    pub name: String,
    pub description: String,
    pub supplier_id: String,
    #[serde(rename = "PurchaseSaleProducts")]
    pub purchase_sale_products: Vec<CreatePurchaseSaleProductRequest>,
}

/// Routes for the purchase resource.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_purchases).post(create_purchase))
        .route("/{id}", get(get_purchase).delete(delete_purchase))
        .route("/search/{query}", get(search_purchases))
}

async fn list_purchases(
    State(state): State<AppState>,
) -> Result<Json<Vec<PurchaseDto>>, ApiError> {
    let purchases = state.db.purchases().list().await?;
    Ok(Json(purchases.into_iter().map(PurchaseDto::from).collect()))
}

async fn get_purchase(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<PurchaseDto>>, ApiError> {
    let purchase = state.db.purchases().get_by_id(&id).await?;
    Ok(Json(purchase.map(PurchaseDto::from)))
}

async fn search_purchases(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Result<Json<Vec<PurchaseDto>>, ApiError> {
    let query = validate_search_query(&query)?;
    let purchases = state.db.purchases().search(&query).await?;
    Ok(Json(purchases.into_iter().map(PurchaseDto::from).collect()))
}

async fn create_purchase(
    State(state): State<AppState>,
    Json(req): Json<CreatePurchaseRequest>,
) -> Result<(StatusCode, Json<PurchaseDto>), ApiError> {
    debug!(
        name = %req.name,
        lines = req.purchase_sale_products.len(),
        "create_purchase"
    );

    validate_required("name", &req.name)?;
    validate_required("description", &req.description)?;
    validate_required("supplierId", &req.supplier_id)?;
    for line in &req.purchase_sale_products {
        validate_required("saleProductId", &line.sale_product_id)?;
    }

    let purchase = state
        .db
        .purchases()
        .create(NewPurchase {
            name: req.name,
            description: req.description,
            supplier_id: req.supplier_id,
            sale_product_ids: req
                .purchase_sale_products
                .into_iter()
                .map(|line| line.sale_product_id)
                .collect(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(purchase.into())))
}

async fn delete_purchase(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PurchaseDto>, ApiError> {
    debug!(id = %id, "delete_purchase");
    let purchase = state.db.purchases().delete(&id).await?;
    Ok(Json(purchase.into()))
}
