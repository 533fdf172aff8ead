//! # Domain Types
//!
//! Core domain types used throughout mercado.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐               │
//! │  │   Product    │  │   Customer   │  │   Supplier   │               │
//! │  │  ──────────  │  │  ──────────  │  │  ──────────  │               │
//! │  │  name        │  │  cpf_or_cnpj │  │  cnpj        │               │
//! │  │  price_cents │  │  email       │  │  address     │               │
//! │  │  brand       │  │  phone       │  │  ...         │               │
//! │  └──────────────┘  └──────────────┘  └──────────────┘               │
//! │                                                                     │
//! │  Sale ──── owns ───► SaleProduct ──── references ───► Product       │
//! │    │                      ▲                                         │
//! │    └── references Customer │ at most one live reference             │
//! │                            │                                        │
//! │  Purchase ─ owns ─► PurchaseSaleProduct                             │
//! │    │                                                                │
//! │    └── references Supplier                                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every entity carries `id` (UUID v4 as TEXT), `created_at`/`updated_at`,
//! and `deleted_at` — a NULL `deleted_at` marks a live row. Products are
//! removed physically instead; their `deleted_at` column exists but only
//! the search path filters on it (a preserved quirk of the legacy data).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product that can appear in sale line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Free-text description.
    pub description: String,

    /// Price in cents (smallest currency unit). Never negative.
    pub price_cents: i64,

    /// Manufacturer brand.
    pub brand: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Returns the price as a Money value.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer that sales are registered against.
///
/// `cpf_or_cnpj` and `email` are unique among live (non-deleted)
/// customers; the repository checks both before inserting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,

    /// National tax identifier (CPF or CNPJ), stored as opaque text.
    pub cpf_or_cnpj: String,

    pub email: String,
    pub phone: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Supplier
// =============================================================================

/// A supplier that purchases are placed with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,

    /// Corporate tax identifier, stored as opaque text.
    pub cnpj: String,

    pub address: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Sale
// =============================================================================

/// A sale header row. Line items live in [`SaleProduct`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub name: String,
    pub description: String,

    /// Customer this sale was made to.
    pub customer_id: String,

    /// When the sale occurred (business date, not row creation time).
    pub sale_date: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A sale line item: one product and its quantity.
///
/// Line items are immutable once created; a sale's composition never
/// changes after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleProduct {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,

    /// Units sold. Always positive.
    pub quantity: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Purchase
// =============================================================================

/// A purchase header row. Line items live in [`PurchaseSaleProduct`].
///
/// Purchases have no update path: they are created whole and can only be
/// soft-deleted afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Purchase {
    pub id: String,
    pub name: String,
    pub description: String,

    /// Supplier this purchase was placed with.
    pub supplier_id: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A purchase line item referencing exactly one sale line item.
///
/// At most one live row may reference a given `sale_product_id` across
/// all live purchases ("this sold unit has been restocked once").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseSaleProduct {
    pub id: String,
    pub purchase_id: String,
    pub sale_product_id: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Read Views (nested representations)
// =============================================================================

/// A sale line together with its product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLineView {
    pub line: SaleProduct,
    pub product: Product,
}

/// A sale with its customer and line items, as returned by every sale
/// read and write operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleView {
    pub sale: Sale,
    pub customer: Customer,
    pub products: Vec<SaleLineView>,
}

/// A purchase line with its sale line item and product.
///
/// `sale` is populated on list/search reads only; detail reads leave it
/// empty (the legacy wire format does the same).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseLineView {
    pub line: PurchaseSaleProduct,
    pub sale_product: SaleProduct,
    pub product: Product,
    pub sale: Option<Sale>,
}

/// A purchase with its supplier and line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseView {
    pub purchase: Purchase,
    pub supplier: Supplier,
    pub lines: Vec<PurchaseLineView>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_product() -> Product {
        let now = Utc::now();
        Product {
            id: "p1".to_string(),
            name: "Headset Kraken".to_string(),
            description: "7.1 surround headset".to_string(),
            price_cents: 50_000,
            brand: "Razer".to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_product_price_as_money() {
        let product = sample_product();
        assert_eq!(product.price(), Money::from_cents(50_000));
    }

    #[test]
    fn test_product_serde_round_trip() {
        let product = sample_product();
        let json = serde_json::to_string(&product).unwrap();
        let back: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, product.id);
        assert_eq!(back.price_cents, product.price_cents);
        assert!(back.deleted_at.is_none());
    }
}
