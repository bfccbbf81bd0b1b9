//! Hash algorithm prioritization.
//! See https://www.w3.org/TR/SRI/#dfn-getprioritizedhashfunction-a-b

use crate::algorithm::HashAlgorithm;

/// Signature of a prioritization policy: given two identifiers, return the preferred
/// algorithm, or `None` for "no preference".
pub type PrioritizeFn = fn(&str, &str) -> Option<HashAlgorithm>;

/// Return the stronger of `a` and `b`, or `None` when they are identical or both unsupported.
///
/// An unsupported identifier is never preferred over a supported one. Among supported
/// identifiers the lexicographically greater name wins, which for the fixed set
/// sha256 < sha384 < sha512 is ascending strength.
pub fn get_prioritized_hash_algorithm(a: &str, b: &str) -> Option<HashAlgorithm> {
    if a == b {
        return None;
    }

    let (alg_a, alg_b) = match (HashAlgorithm::from_name(a), HashAlgorithm::from_name(b)) {
        (None, other) | (other, None) => return other,
        (Some(x), Some(y)) => (x, y),
    };

    if a < b {
        Some(alg_b)
    } else {
        Some(alg_a)
    }
}
