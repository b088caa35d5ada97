//! Deterministic variant assignment
//!
//! Maps an identity to one of an experiment's weighted variants by hashing
//! the identity together with the experiment ID. No assignment record is
//! persisted: the same inputs always land in the same variant, so repeated
//! requests see a stable experience with zero server-side state.
//!
//! The flip side of that tradeoff: changing a variant's `traffic_weight` or
//! reordering variants after activation silently re-partitions some fraction
//! of already-assigned identities. Weights are therefore frozen once an
//! experiment leaves draft (see [`crate::experiment::Experiment::start`]).

use crate::experiment::Variant;
use crate::{Error, Result};

/// Hash an assignment key into a non-negative 32-bit bucket value.
///
/// Iterates the key's UTF-16 code units, accumulating
/// `h = h * 31 + unit` with wrapping 32-bit signed arithmetic, then takes the
/// absolute value. Not collision-resistant; only needs to be uniform and
/// stable.
///
/// ```
/// use reparto::assign::bucket_hash;
///
/// // 'a' = 97, 'b' = 98: 97 * 31 + 98 = 3105
/// assert_eq!(bucket_hash("ab"), 3105);
/// assert_eq!(bucket_hash(""), 0);
/// ```
#[must_use]
pub fn bucket_hash(key: &str) -> u32 {
    let mut hash: i32 = 0;
    for unit in key.encode_utf16() {
        hash = hash.wrapping_mul(31).wrapping_add(i32::from(unit));
    }
    hash.unsigned_abs()
}

/// Assign an identity to one of the experiment's variants.
///
/// The key concatenates `identity` and `experiment_id`, so the same identity
/// gets independent, uncorrelated assignments across different experiments.
/// The hashed key selects a bucket in `[0, total_weight)`; the variants are
/// walked in order and the first one whose cumulative weight exceeds the
/// bucket wins. A zero-weight variant can never win.
///
/// Pure and referentially transparent: no I/O, no clock, no randomness.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] if `variants` is empty or every traffic
/// weight is zero.
pub fn assign_variant<'a>(
    identity: &str,
    experiment_id: &str,
    variants: &'a [Variant],
) -> Result<&'a Variant> {
    if variants.is_empty() {
        return Err(Error::InvalidConfig(
            "experiment has no variants".to_string(),
        ));
    }
    let total_weight: u64 = variants
        .iter()
        .map(|v| u64::from(v.traffic_weight()))
        .sum();
    if total_weight == 0 {
        return Err(Error::InvalidConfig(
            "all variant traffic weights are zero".to_string(),
        ));
    }

    let key = format!("{identity}{experiment_id}");
    let bucket = u64::from(bucket_hash(&key)) % total_weight;

    let mut cumulative = 0u64;
    for variant in variants {
        cumulative += u64::from(variant.traffic_weight());
        if bucket < cumulative {
            return Ok(variant);
        }
    }

    // Unreachable while the weights sum to total_weight; defined fallback
    // rather than an error.
    Ok(&variants[0])
}
