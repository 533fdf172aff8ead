//! # Validation Module
//!
//! Input validation rules for mercado.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: HTTP handler (Rust)                                       │
//! │  ├── Type validation (deserialization)                              │
//! │  └── THIS MODULE: field rules                                       │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: Database (SQLite)                                         │
//! │  ├── NOT NULL / CHECK constraints                                   │
//! │  ├── Partial unique index (purchase lines)                          │
//! │  └── Foreign key constraints                                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::{MAX_NAME_LEN, MAX_QUERY_LEN};

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most [`MAX_NAME_LEN`] characters
///
/// ## Example
/// ```rust
/// use mercado_core::validation::validate_required;
///
/// assert!(validate_required("name", "Ellie Williams").is_ok());
/// assert!(validate_required("name", "   ").is_err());
/// ```
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// An empty query is valid: substring search with an empty needle
/// matches every row, so search degenerates to list-all.
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a product price in cents. Zero is allowed, negatives are not.
pub fn validate_price_cents(price_cents: i64) -> ValidationResult<()> {
    if price_cents < 0 {
        return Err(ValidationError::Negative {
            field: "priceCents".to_string(),
        });
    }
    Ok(())
}

/// Validates a sale line item quantity. Must be strictly positive.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_accepts_normal_values() {
        assert!(validate_required("name", "Supplier Inc.").is_ok());
    }

    #[test]
    fn test_required_rejects_empty_and_whitespace() {
        assert!(validate_required("name", "").is_err());
        assert!(validate_required("name", "  \t ").is_err());
    }

    #[test]
    fn test_required_rejects_overlong_values() {
        let long = "a".repeat(MAX_NAME_LEN + 1);
        assert!(validate_required("name", &long).is_err());
    }

    #[test]
    fn test_search_query_trims() {
        assert_eq!(validate_search_query("  kraken ").unwrap(), "kraken");
        assert_eq!(validate_search_query("").unwrap(), "");
    }

    #[test]
    fn test_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(50_000).is_ok());
        assert!(validate_price_cents(-1).is_err());
    }

    #[test]
    fn test_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }
}
