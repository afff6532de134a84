//! Identifier shape checks.
//!
//! The catalog hands out author and project identifiers in the canonical
//! 8-4-4-4-12 hexadecimal group layout. Decoded responses occasionally carry
//! trailing columns that are not identifiers at all, so callers filter with
//! [`is_canonical_id`] before echoing values back to the server.
//!
//! ```
//! use seco_core::ident::is_canonical_id;
//!
//! assert!(is_canonical_id("0af1d147-b483-76a7-9e14-7f6828b94a60"));
//! assert!(!is_canonical_id("0af1d147b48376a79e147f6828b94a60"));
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// Regex for the 8-4-4-4-12 hexadecimal group layout.
static CANONICAL_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("Invalid canonical id regex")
});

/// Returns true if `value` is shaped like a canonical identifier.
///
/// Only the layout is checked; version and variant nibbles are not.
pub fn is_canonical_id(value: &str) -> bool {
    CANONICAL_ID_REGEX.is_match(value)
}
