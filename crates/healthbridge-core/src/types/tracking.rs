//! Human-readable tracking code generation.
//!
//! Donations and requests each carry a short unique code that users quote
//! when coordinating a handoff (e.g. `DON-4K7QZP2M`).

use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of the random suffix.
const SUFFIX_LEN: usize = 8;

/// Generate a tracking code with the given prefix, e.g. `DON` or `REQ`.
///
/// The suffix is uppercase alphanumeric; uniqueness is enforced by the
/// database column constraint, not by this generator.
pub fn generate(prefix: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect();
    format!("{prefix}-{suffix}")
}

/// Tracking code prefix for donations.
pub const DONATION_PREFIX: &str = "DON";

/// Tracking code prefix for medicine requests.
pub const REQUEST_PREFIX: &str = "REQ";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_format() {
        let code = generate(DONATION_PREFIX);
        assert!(code.starts_with("DON-"));
        assert_eq!(code.len(), 4 + SUFFIX_LEN);
        assert!(
            code[4..]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_generate_varies() {
        let a = generate(REQUEST_PREFIX);
        let b = generate(REQUEST_PREFIX);
        // Collisions in an 8-char alphanumeric suffix are vanishingly rare.
        assert_ne!(a, b);
    }
}
