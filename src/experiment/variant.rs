//! Variant - one arm of an experiment

use serde::{Deserialize, Serialize};

/// One arm of an experiment a subject may be assigned to.
///
/// `traffic_weight` is the variant's relative share of assignment
/// probability; weights need not sum to 100. The counters only ever move
/// upward and are incremented by the event-ingestion path, once per unique
/// exposure or qualifying conversion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Variant {
    id: String,
    name: String,
    traffic_weight: u32,
    views: u64,
    conversions: u64,
}

impl Variant {
    /// Create a new variant with zeroed counters.
    ///
    /// # Arguments
    ///
    /// * `id` - Unique within the experiment, stable for its lifetime
    /// * `name` - Display label
    /// * `traffic_weight` - Relative share of traffic (may be zero)
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, traffic_weight: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            traffic_weight,
            views: 0,
            conversions: 0,
        }
    }

    /// Create a builder for a variant with pre-seeded counters.
    #[must_use]
    pub fn builder(
        id: impl Into<String>,
        name: impl Into<String>,
        traffic_weight: u32,
    ) -> VariantBuilder {
        VariantBuilder::new(id, name, traffic_weight)
    }

    /// Get the variant ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the display label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the relative traffic weight.
    #[must_use]
    pub const fn traffic_weight(&self) -> u32 {
        self.traffic_weight
    }

    /// Get the exposure count.
    #[must_use]
    pub const fn views(&self) -> u64 {
        self.views
    }

    /// Get the conversion count.
    #[must_use]
    pub const fn conversions(&self) -> u64 {
        self.conversions
    }

    /// Observed conversion rate in `[0, 1]`, or zero when unexposed.
    #[must_use]
    pub fn conversion_rate(&self) -> f64 {
        if self.views == 0 {
            0.0
        } else {
            self.conversions as f64 / self.views as f64
        }
    }

    /// Record one unique exposure.
    pub fn record_view(&mut self) {
        self.views += 1;
    }

    /// Record one qualifying conversion.
    pub fn record_conversion(&mut self) {
        self.conversions += 1;
    }
}

/// Builder for `Variant`.
#[derive(Debug)]
pub struct VariantBuilder {
    id: String,
    name: String,
    traffic_weight: u32,
    views: u64,
    conversions: u64,
}

impl VariantBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, traffic_weight: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            traffic_weight,
            views: 0,
            conversions: 0,
        }
    }

    /// Pre-seed the exposure counter (useful for deserialization/testing).
    #[must_use]
    pub const fn views(mut self, views: u64) -> Self {
        self.views = views;
        self
    }

    /// Pre-seed the conversion counter.
    #[must_use]
    pub const fn conversions(mut self, conversions: u64) -> Self {
        self.conversions = conversions;
        self
    }

    /// Build the `Variant`.
    #[must_use]
    pub fn build(self) -> Variant {
        Variant {
            id: self.id,
            name: self.name,
            traffic_weight: self.traffic_weight,
            views: self.views,
            conversions: self.conversions,
        }
    }
}
