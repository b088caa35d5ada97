//! Two-proportion significance testing
//!
//! Pooled z-test over two variants' view/conversion counters, with a rational
//! approximation of the standard normal CDF for the p-value. Everything here
//! is a pure function of the four input integers: safe to call repeatedly and
//! concurrently, and two calls with identical counters return bit-identical
//! results.

use serde::{Deserialize, Serialize};

use crate::experiment::Variant;
use crate::{Error, Result};

/// Two-tailed z threshold for 95% confidence.
const Z_95: f64 = 1.96;

/// Counter snapshot for one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantStats {
    /// Unique exposures.
    pub views: u64,
    /// Qualifying conversion events. Expected to satisfy
    /// `conversions <= views`, but that is the event-ingestion caller's
    /// responsibility, not enforced here.
    pub conversions: u64,
}

impl VariantStats {
    /// Create a stats snapshot from raw counters.
    #[must_use]
    pub const fn new(views: u64, conversions: u64) -> Self {
        Self { views, conversions }
    }

    /// Observed conversion rate, or zero when unexposed.
    #[must_use]
    pub fn conversion_rate(&self) -> f64 {
        if self.views == 0 {
            0.0
        } else {
            self.conversions as f64 / self.views as f64
        }
    }
}

impl From<&Variant> for VariantStats {
    fn from(variant: &Variant) -> Self {
        Self::new(variant.views(), variant.conversions())
    }
}

/// Outcome of a significance evaluation.
///
/// A derived view, computed on demand and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignificanceResult {
    /// Absolute z statistic. Direction-less: which variant is ahead is the
    /// caller's concern.
    pub z_score: f64,
    /// Two-tailed p-value in `[0, 1]`.
    pub p_value: f64,
    /// `(1 - p_value) * 100`, in `[0, 100]`.
    pub confidence_pct: f64,
    /// `true` iff `z_score` strictly exceeds the 95% two-tailed threshold.
    pub significant: bool,
}

/// Standard normal cumulative distribution function.
///
/// Zelen-Severo rational approximation (Abramowitz & Stegun 26.2.17),
/// absolute error around `7.5e-8`. Adequate for UI-facing confidence
/// displays, not for regulated statistical reporting.
#[must_use]
pub fn normal_cdf(x: f64) -> f64 {
    let t = 1.0 / (1.0 + 0.2316419 * x.abs());
    let d = 0.3989423 * (-x * x / 2.0).exp();
    let prob =
        d * t * (0.3193815 + t * (-0.3565638 + t * (1.781478 + t * (-1.821256 + t * 1.330274))));
    if x > 0.0 {
        1.0 - prob
    } else {
        prob
    }
}

/// Compare two variants' conversion rates with a pooled two-proportion z-test.
///
/// The variance is pooled under the null hypothesis that both variants share
/// one true rate. A zero pooled standard error (possible when every counter
/// converted, or none did) is treated as "no detectable effect" and yields
/// `z = 0`, not an error.
///
/// ```
/// use reparto::stats::{evaluate, VariantStats};
///
/// let control = VariantStats::new(1240, 234);
/// let treatment = VariantStats::new(1198, 289);
/// let result = evaluate(&control, &treatment).unwrap();
/// assert!(result.significant);
/// assert!(result.z_score > 3.0);
/// ```
///
/// # Errors
///
/// Returns [`Error::InsufficientSample`] if either variant has zero views.
pub fn evaluate(a: &VariantStats, b: &VariantStats) -> Result<SignificanceResult> {
    if a.views == 0 || b.views == 0 {
        return Err(Error::InsufficientSample(
            "both variants need at least one recorded view".to_string(),
        ));
    }

    let rate_a = a.conversion_rate();
    let rate_b = b.conversion_rate();
    let pooled_rate = (a.conversions + b.conversions) as f64 / (a.views + b.views) as f64;
    let standard_error = (pooled_rate
        * (1.0 - pooled_rate)
        * (1.0 / a.views as f64 + 1.0 / b.views as f64))
        .sqrt();

    let z_score = if standard_error == 0.0 {
        0.0
    } else {
        (rate_a - rate_b).abs() / standard_error
    };

    // The CDF approximation can overshoot by a hair near z = 0; clamp so the
    // p-value stays a probability.
    let p_value = (2.0 * (1.0 - normal_cdf(z_score))).clamp(0.0, 1.0);

    Ok(SignificanceResult {
        z_score,
        p_value,
        confidence_pct: (1.0 - p_value) * 100.0,
        significant: is_significant(z_score),
    })
}

/// Strict 95% two-tailed cut: exactly 1.96 is not significant.
fn is_significant(z_score: f64) -> bool {
    z_score > Z_95
}
