//! Session identity derivation
//!
//! Servers with duplicate-login protection reject a reconnect that reuses
//! the identity of a half-dead previous session. Every connection attempt
//! therefore derives a fresh identity from the configured base name plus a
//! short uniqueness suffix.

use chrono::Utc;

/// Derive a collision-resistant identity for one connection attempt.
///
/// The suffix is the last four digits of the current millisecond clock,
/// zero-padded, so consecutive attempts land on different names.
pub fn derive_identity(base: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    format!("{}_{:04}", base, millis.rem_euclid(10_000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_keeps_base_prefix() {
        let id = derive_identity("AIBot");
        assert!(id.starts_with("AIBot_"));
    }

    #[test]
    fn test_identity_suffix_is_four_digits() {
        let id = derive_identity("AIBot");
        let suffix = id.rsplit('_').next().unwrap();
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }
}
