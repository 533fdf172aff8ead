//! # Routes Module
//!
//! One module per resource, merged under `/api/v1`, uniform verb
//! mapping:
//!
//! ```text
//! GET    /api/v1/{resource}                 list
//! GET    /api/v1/{resource}/{id}            get by id
//! GET    /api/v1/{resource}/search/{query}  substring search by name
//! POST   /api/v1/{resource}                 create
//! PUT    /api/v1/{resource}/{id}            update
//! DELETE /api/v1/{resource}/{id}            delete (soft, except product)
//! ```
//!
//! Resources: product, customer, supplier, sale, purchase (purchase has
//! no PUT). Plus `GET /health` for liveness probes.

pub mod customer;
pub mod product;
pub mod purchase;
pub mod sale;
pub mod supplier;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1/product", product::router())
        .nest("/api/v1/customer", customer::router())
        .nest("/api/v1/supplier", supplier::router())
        .nest("/api/v1/sale", sale::router())
        .nest("/api/v1/purchase", purchase::router())
        // The legacy frontend is served from another origin; CORS is
        // wide open just like the system this replaces.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness probe: 200 when the store answers a trivial query.
async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.db.health_check().await {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE")
    }
}

// =============================================================================
// Router-level Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use mercado_db::{Database, DbConfig};

    async fn test_app() -> Router {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        router(AppState::new(db))
    }

    /// Drives one request through the router and decodes the response.
    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&value).unwrap())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    async fn create_supplier(app: &Router) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/api/v1/supplier",
            Some(json!({
                "name": "Supplier Inc.",
                "email": "contact@supplier.com",
                "phone": "+5511999999999",
                "cnpj": "12.345.678/0001-99",
                "address": "123 Supplier St"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    async fn create_customer(app: &Router) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/api/v1/customer",
            Some(json!({
                "name": "Ellie Williams",
                "cpfOrCnpj": "391.945.720-03",
                "email": "ellie@example.com",
                "phone": "(84) 9 9110-6666"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    async fn create_product(app: &Router) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/api/v1/product",
            Some(json!({
                "name": "Headset Kraken",
                "description": "7.1 surround headset",
                "priceCents": 50000,
                "brand": "Razer"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    /// Creates a one-line sale and returns (sale_id, sale_product_id).
    async fn create_sale(app: &Router, customer_id: &str, product_id: &str) -> (String, String) {
        let (status, body) = send(
            app,
            "POST",
            "/api/v1/sale",
            Some(json!({
                "name": "October sale",
                "description": "one headset, quantity two",
                "customerId": customer_id,
                "saleDate": "2023-10-29T12:00:00Z",
                "saleProducts": [{"productId": product_id, "quantity": 2}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        (
            body["id"].as_str().unwrap().to_string(),
            body["saleProducts"][0]["id"].as_str().unwrap().to_string(),
        )
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app().await;
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("OK".to_string()));
    }

    #[tokio::test]
    async fn test_product_crud_flow() {
        let app = test_app().await;
        let id = create_product(&app).await;

        let (status, body) = send(&app, "GET", &format!("/api/v1/product/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Headset Kraken");
        assert_eq!(body["priceCents"], 50000);

        // Missing id answers 200 with an empty body, not an error.
        let (status, body) = send(&app, "GET", "/api/v1/product/missing", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/v1/product/{id}"),
            Some(json!({"priceCents": 45000})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["priceCents"], 45000);
        assert_eq!(body["brand"], "Razer");

        let (status, _) = send(&app, "DELETE", &format!("/api/v1/product/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, listed) = send(&app, "GET", "/api/v1/product", None).await;
        assert_eq!(listed.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_create_product_rejects_negative_price() {
        let app = test_app().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/product",
            Some(json!({
                "name": "Broken",
                "description": "negative price",
                "priceCents": -1,
                "brand": "Nope"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_duplicate_customer_identity_is_conflict() {
        let app = test_app().await;
        create_customer(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/customer",
            Some(json!({
                "name": "Impostor",
                "cpfOrCnpj": "391.945.720-03",
                "email": "other@example.com",
                "phone": "(84) 9 0000-0000"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CONFLICT");
        assert!(body["message"].as_str().unwrap().contains("cpfOrCnpj"));
    }

    #[tokio::test]
    async fn test_sale_round_trip_and_soft_delete() {
        let app = test_app().await;
        let customer_id = create_customer(&app).await;
        let product_id = create_product(&app).await;
        let (sale_id, _) = create_sale(&app, &customer_id, &product_id).await;

        let (status, body) = send(&app, "GET", &format!("/api/v1/sale/{sale_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["customer"]["name"], "Ellie Williams");
        assert_eq!(body["saleProducts"][0]["quantity"], 2);
        assert_eq!(body["saleProducts"][0]["product"]["id"], product_id.as_str());

        let (status, body) = send(&app, "DELETE", &format!("/api/v1/sale/{sale_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["deletedAt"].is_null());

        // Gone from default reads afterwards.
        let (status, body) = send(&app, "GET", &format!("/api/v1/sale/{sale_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);
        let (_, listed) = send(&app, "GET", "/api/v1/sale", None).await;
        assert_eq!(listed.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_update_missing_sale_is_404() {
        let app = test_app().await;
        let (status, body) = send(
            &app,
            "PUT",
            "/api/v1/sale/missing",
            Some(json!({"customerId": null, "saleDate": null})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_purchase_end_to_end_with_conflict() {
        let app = test_app().await;
        let supplier_id = create_supplier(&app).await;
        let customer_id = create_customer(&app).await;
        let product_id = create_product(&app).await;
        let (sale_id, sale_product_id) = create_sale(&app, &customer_id, &product_id).await;

        let purchase_payload = json!({
            "name": "Restock",
            "description": "restock the sold headset",
            "supplierId": supplier_id,
            "PurchaseSaleProducts": [{"saleProductId": sale_product_id}]
        });

        let (status, body) =
            send(&app, "POST", "/api/v1/purchase", Some(purchase_payload.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["supplier"]["name"], "Supplier Inc.");
        assert_eq!(
            body["PurchaseSaleProducts"][0]["saleProduct"]["product"]["name"],
            "Headset Kraken"
        );

        // Same sale line item again: the whole request is rejected and
        // the message names the product and the originating sale.
        let (status, body) = send(&app, "POST", "/api/v1/purchase", Some(purchase_payload)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CONFLICT");
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("Headset Kraken"));
        assert!(message.contains(&sale_id));
    }

    #[tokio::test]
    async fn test_purchase_list_embeds_sale() {
        let app = test_app().await;
        let supplier_id = create_supplier(&app).await;
        let customer_id = create_customer(&app).await;
        let product_id = create_product(&app).await;
        let (sale_id, sale_product_id) = create_sale(&app, &customer_id, &product_id).await;

        send(
            &app,
            "POST",
            "/api/v1/purchase",
            Some(json!({
                "name": "Restock",
                "description": "restock",
                "supplierId": supplier_id,
                "PurchaseSaleProducts": [{"saleProductId": sale_product_id}]
            })),
        )
        .await;

        let (status, listed) = send(&app, "GET", "/api/v1/purchase", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            listed[0]["PurchaseSaleProducts"][0]["saleProduct"]["sale"]["id"],
            sale_id.as_str()
        );

        // Detail reads leave the parent sale out.
        let purchase_id = listed[0]["id"].as_str().unwrap();
        let (_, fetched) = send(&app, "GET", &format!("/api/v1/purchase/{purchase_id}"), None).await;
        assert!(fetched["PurchaseSaleProducts"][0]["saleProduct"]
            .get("sale")
            .is_none());
    }

    #[tokio::test]
    async fn test_deleting_purchase_allows_repurchase() {
        let app = test_app().await;
        let supplier_id = create_supplier(&app).await;
        let customer_id = create_customer(&app).await;
        let product_id = create_product(&app).await;
        let (_, sale_product_id) = create_sale(&app, &customer_id, &product_id).await;

        let payload = json!({
            "name": "Restock",
            "description": "restock",
            "supplierId": supplier_id,
            "PurchaseSaleProducts": [{"saleProductId": sale_product_id}]
        });

        let (_, created) = send(&app, "POST", "/api/v1/purchase", Some(payload.clone())).await;
        let purchase_id = created["id"].as_str().unwrap();

        let (status, _) =
            send(&app, "DELETE", &format!("/api/v1/purchase/{purchase_id}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, "POST", "/api/v1/purchase", Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED);
    }
}
