//! # Supplier Routes
//!
//! CRUD + search for suppliers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;
use mercado_core::validation::{validate_required, validate_search_query};
use mercado_core::Supplier;
use mercado_db::repository::supplier::{NewSupplier, SupplierPatch};

/// Supplier DTO for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cnpj: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Supplier> for SupplierDto {
    fn from(s: Supplier) -> Self {
        SupplierDto {
            id: s.id,
            name: s.name,
            email: s.email,
            phone: s.phone,
            cnpj: s.cnpj,
            address: s.address,
            created_at: s.created_at,
            updated_at: s.updated_at,
            deleted_at: s.deleted_at,
        }
    }
}

/// Creation payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cnpj: String,
    pub address: String,
}

/// Update payload; omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSupplierRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cnpj: Option<String>,
    pub address: Option<String>,
}

/// Routes for the supplier resource.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_suppliers).post(create_supplier))
        .route(
            "/{id}",
            get(get_supplier)
                .put(update_supplier)
                .delete(delete_supplier),
        )
        .route("/search/{query}", get(search_suppliers))
}

async fn list_suppliers(
    State(state): State<AppState>,
) -> Result<Json<Vec<SupplierDto>>, ApiError> {
    let suppliers = state.db.suppliers().list().await?;
    Ok(Json(suppliers.into_iter().map(SupplierDto::from).collect()))
}

async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<SupplierDto>>, ApiError> {
    let supplier = state.db.suppliers().get_by_id(&id).await?;
    Ok(Json(supplier.map(SupplierDto::from)))
}

async fn search_suppliers(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Result<Json<Vec<SupplierDto>>, ApiError> {
    let query = validate_search_query(&query)?;
    let suppliers = state.db.suppliers().search(&query).await?;
    Ok(Json(suppliers.into_iter().map(SupplierDto::from).collect()))
}

async fn create_supplier(
    State(state): State<AppState>,
    Json(req): Json<CreateSupplierRequest>,
) -> Result<(StatusCode, Json<SupplierDto>), ApiError> {
    debug!(name = %req.name, "create_supplier");

    validate_required("name", &req.name)?;
    validate_required("email", &req.email)?;
    validate_required("phone", &req.phone)?;
    validate_required("cnpj", &req.cnpj)?;
    validate_required("address", &req.address)?;

    let supplier = state
        .db
        .suppliers()
        .create(NewSupplier {
            name: req.name,
            email: req.email,
            phone: req.phone,
            cnpj: req.cnpj,
            address: req.address,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(supplier.into())))
}

async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSupplierRequest>,
) -> Result<Json<SupplierDto>, ApiError> {
    debug!(id = %id, "update_supplier");

    let supplier = state
        .db
        .suppliers()
        .update(
            &id,
            SupplierPatch {
                name: req.name,
                email: req.email,
                phone: req.phone,
                cnpj: req.cnpj,
                address: req.address,
            },
        )
        .await?;

    Ok(Json(supplier.into()))
}

async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SupplierDto>, ApiError> {
    debug!(id = %id, "delete_supplier");
    let supplier = state.db.suppliers().delete(&id).await?;
    Ok(Json(supplier.into()))
}
