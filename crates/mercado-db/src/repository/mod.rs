//! # Repository Module
//!
//! Database repository implementations for mercado.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                               │
//! │                                                                     │
//! │  HTTP handler                                                       │
//! │       │                                                             │
//! │       │  db.sales().get_by_id(&id)                                  │
//! │       ▼                                                             │
//! │  SaleRepository                                                     │
//! │  ├── list(&self)                                                    │
//! │  ├── get_by_id(&self, id)                                           │
//! │  ├── search(&self, query)                                           │
//! │  ├── create(&self, input)      ← transactional with line items      │
//! │  └── ...                                                            │
//! │       │                                                             │
//! │       │  SQL query                                                  │
//! │       ▼                                                             │
//! │  SQLite Database                                                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product CRUD and search (hard delete)
//! - [`customer::CustomerRepository`] - Customer CRUD with identity checks
//! - [`supplier::SupplierRepository`] - Supplier CRUD
//! - [`sale::SaleRepository`] - Sales with nested line items
//! - [`purchase::PurchaseRepository`] - Purchases with the at-most-once rule

pub mod customer;
pub mod product;
pub mod purchase;
pub mod sale;
pub mod supplier;
