//! # mercado-db: Database Layer for Mercado
//!
//! This crate provides database access for the mercado backend.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Mercado Data Flow                            │
//! │                                                                     │
//! │  HTTP handler (GET /api/v1/sale)                                    │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌───────────────────────────────────────────────────────────────┐  │
//! │  │                   mercado-db (THIS CRATE)                     │  │
//! │  │                                                               │  │
//! │  │   ┌─────────────┐   ┌───────────────┐   ┌─────────────────┐  │  │
//! │  │   │  Database   │   │ Repositories  │   │   Migrations    │  │  │
//! │  │   │  (pool.rs)  │   │ product.rs    │   │   (embedded)    │  │  │
//! │  │   │             │   │ customer.rs   │   │                 │  │  │
//! │  │   │ SqlitePool  │◄──│ supplier.rs   │   │ 001_initial_…   │  │  │
//! │  │   │ ReadPolicy  │   │ sale.rs       │   │ 002_purchase_…  │  │  │
//! │  │   │             │   │ purchase.rs   │   │                 │  │  │
//! │  │   └─────────────┘   └───────────────┘   └─────────────────┘  │  │
//! │  │                                                               │  │
//! │  └───────────────────────────────────────────────────────────────┘  │
//! │       │                                                             │
//! │       ▼                                                             │
//! │                       SQLite Database                               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation, configuration and [`pool::ReadPolicy`]
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (one per aggregate)

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, ReadPolicy};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::product::ProductRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::sale::SaleRepository;
pub use repository::supplier::SupplierRepository;
