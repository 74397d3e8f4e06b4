//! Pagination constants and helpers.
//!
//! This module lives in `core` (zero internal deps) so it can be used by
//! both the repository layer and the HTTP handlers.

/// Default number of rows per page for listings.
pub const DEFAULT_LIST_LIMIT: i64 = 20;

/// Maximum number of rows per page for listings.
pub const MAX_LIST_LIMIT: i64 = 100;

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_when_missing() {
        assert_eq!(clamp_limit(None, 20, 100), 20);
    }

    #[test]
    fn limit_clamped_to_max() {
        assert_eq!(clamp_limit(Some(500), 20, 100), 100);
    }

    #[test]
    fn limit_clamped_to_at_least_one() {
        assert_eq!(clamp_limit(Some(0), 20, 100), 1);
        assert_eq!(clamp_limit(Some(-5), 20, 100), 1);
    }

    #[test]
    fn offset_clamped_to_non_negative() {
        assert_eq!(clamp_offset(None), 0);
        assert_eq!(clamp_offset(Some(-1)), 0);
        assert_eq!(clamp_offset(Some(40)), 40);
    }
}
