//! # mercado-core: Pure Domain Layer for Mercado
//!
//! Domain types and rules for the mercado business-management backend,
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Mercado Architecture                          │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                    apps/api (Axum)                            │ │
//! │  │   /api/v1/product  /customer  /supplier  /sale  /purchase     │ │
//! │  └──────────────────────────────┬────────────────────────────────┘ │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐ │
//! │  │              ★ mercado-core (THIS CRATE) ★                    │ │
//! │  │                                                               │ │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                 │ │
//! │  │   │   types   │  │   money   │  │ validation│                 │ │
//! │  │   │  Product  │  │   Money   │  │   rules   │                 │ │
//! │  │   │  Sale ... │  │  (cents)  │  │   checks  │                 │ │
//! │  │   └───────────┘  └───────────┘  └───────────┘                 │ │
//! │  │                                                               │ │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │ │
//! │  └──────────────────────────────┬────────────────────────────────┘ │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐ │
//! │  │                  mercado-db (Database Layer)                  │ │
//! │  │          SQLite queries, migrations, repositories             │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (Product, Customer, Sale, Purchase, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Validation error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic - same input = same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are in cents (i64)
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::ValidationError;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length accepted for name-like text fields.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length accepted for a search query.
pub const MAX_QUERY_LEN: usize = 100;
