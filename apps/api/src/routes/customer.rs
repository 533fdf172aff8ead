//! # Customer Routes
//!
//! CRUD + search for customers. Creation enforces identity uniqueness
//! (cpf_or_cnpj, email) among live customers and answers 409 on a clash.

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
use mercado_core::Customer;
use mercado_db::repository::customer::{CustomerPatch, NewCustomer};

/// Customer DTO for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    pub id: String,
    pub name: String,
    pub cpf_or_cnpj: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Customer> for CustomerDto {
    fn from(c: Customer) -> Self {
        CustomerDto {
            id: c.id,
            name: c.name,
            cpf_or_cnpj: c.cpf_or_cnpj,
            email: c.email,
            phone: c.phone,
            created_at: c.created_at,
            updated_at: c.updated_at,
            deleted_at: c.deleted_at,
        }
    }
}

/// Creation payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    pub name: String,
    pub cpf_or_cnpj: String,
    pub email: String,
    pub phone: String,
}

/// Update payload; omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub cpf_or_cnpj: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Routes for the customer resource.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route(
            "/{id}",
            get(get_customer)
                .put(update_customer)
                .delete(delete_customer),
        )
        .route("/search/{query}", get(search_customers))
}

async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomerDto>>, ApiError> {
    let customers = state.db.customers().list().await?;
    Ok(Json(customers.into_iter().map(CustomerDto::from).collect()))
}

async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<CustomerDto>>, ApiError> {
    let customer = state.db.customers().get_by_id(&id).await?;
    Ok(Json(customer.map(CustomerDto::from)))
}

async fn search_customers(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Result<Json<Vec<CustomerDto>>, ApiError> {
    let query = validate_search_query(&query)?;
    let customers = state.db.customers().search(&query).await?;
    Ok(Json(customers.into_iter().map(CustomerDto::from).collect()))
}

async fn create_customer(
    State(state): State<AppState>,
    Json(req): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerDto>), ApiError> {
    debug!(cpf_or_cnpj = %req.cpf_or_cnpj, "create_customer");

    validate_required("name", &req.name)?;
    validate_required("cpfOrCnpj", &req.cpf_or_cnpj)?;
    validate_required("email", &req.email)?;
    validate_required("phone", &req.phone)?;

    let customer = state
        .db
        .customers()
        .create(NewCustomer {
            name: req.name,
            cpf_or_cnpj: req.cpf_or_cnpj,
            email: req.email,
            phone: req.phone,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(customer.into())))
}

async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCustomerRequest>,
) -> Result<Json<CustomerDto>, ApiError> {
    debug!(id = %id, "update_customer");

    let customer = state
        .db
        .customers()
        .update(
            &id,
            CustomerPatch {
                name: req.name,
                cpf_or_cnpj: req.cpf_or_cnpj,
                email: req.email,
                phone: req.phone,
            },
        )
        .await?;

    Ok(Json(customer.into()))
}

async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CustomerDto>, ApiError> {
    debug!(id = %id, "delete_customer");
    let customer = state.db.customers().delete(&id).await?;
    Ok(Json(customer.into()))
}
