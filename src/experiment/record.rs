//! Experiment - root entity and lifecycle state machine

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

use super::Variant;

/// Lifecycle status of an experiment.
///
/// `Completed` is terminal; there is no transition out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperimentStatus {
    /// Created but not yet receiving traffic. Variants may still change.
    Draft,
    /// Receiving traffic. Variant weights are frozen.
    Active,
    /// Finished, with or without a declared winner.
    Completed,
}

impl fmt::Display for ExperimentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// Experiment root entity.
///
/// Holds the ordered variant list, display metadata, and lifecycle
/// timestamps. Exposure counters live on the variants; significance results
/// are computed on demand and never stored here.
///
/// The named transitions [`start`](Self::start), [`stop`](Self::stop), and
/// [`declare_winner`](Self::declare_winner) are all-or-nothing: every
/// precondition is checked before any field changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Experiment {
    id: String,
    name: String,
    description: Option<String>,
    kind: Option<String>,
    status: ExperimentStatus,
    variants: Vec<Variant>,
    metrics: Vec<String>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    winner: Option<String>,
    improvement: Option<f64>,
}

impl Experiment {
    /// Create a new draft experiment with the given variants.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, variants: Vec<Variant>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            kind: None,
            status: ExperimentStatus::Draft,
            variants,
            metrics: Vec::new(),
            start_date: None,
            end_date: None,
            winner: None,
            improvement: None,
        }
    }

    /// Create a builder for constructing an experiment with optional fields.
    #[must_use]
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> ExperimentBuilder {
        ExperimentBuilder::new(id, name)
    }

    /// Get the experiment ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the display description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Get the experiment kind (e.g. "pricing", "ui", "feature"), if any.
    /// Opaque display metadata.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Get the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ExperimentStatus {
        self.status
    }

    /// Get the ordered variant list.
    #[must_use]
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Get the tracked metric identifiers. Opaque to the engine.
    #[must_use]
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    /// Get the start timestamp, if the experiment has started.
    #[must_use]
    pub const fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    /// Get the end timestamp, if the experiment has completed.
    #[must_use]
    pub const fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    /// Get the declared winner's variant ID, if one was declared.
    #[must_use]
    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    /// Get the improvement percentage recorded alongside the winner.
    #[must_use]
    pub const fn improvement(&self) -> Option<f64> {
        self.improvement
    }

    /// Look up a variant by ID.
    #[must_use]
    pub fn variant(&self, variant_id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id() == variant_id)
    }

    /// Add a variant. Allowed only while the experiment is in draft:
    /// changing the variant set after activation would silently re-partition
    /// previously-assigned identities.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] unless the status is `Draft`.
    pub fn add_variant(&mut self, variant: Variant) -> Result<()> {
        if self.status != ExperimentStatus::Draft {
            return Err(Error::InvalidTransition {
                action: "add a variant to",
                status: self.status,
            });
        }
        self.variants.push(variant);
        Ok(())
    }

    /// Record one exposure against a variant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VariantNotFound`] for an unknown variant ID.
    pub fn record_view(&mut self, variant_id: &str) -> Result<()> {
        self.variant_mut(variant_id)?.record_view();
        Ok(())
    }

    /// Record one conversion against a variant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VariantNotFound`] for an unknown variant ID.
    pub fn record_conversion(&mut self, variant_id: &str) -> Result<()> {
        self.variant_mut(variant_id)?.record_conversion();
        Ok(())
    }

    /// Start the experiment: `draft → active`, sets `start_date`.
    ///
    /// Validates the variant configuration first, so an experiment can never
    /// go active in a state that `assign_variant` would reject. Variant
    /// counters are untouched; pre-seeded values are retained.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] unless the status is `Draft`, or
    /// [`Error::InvalidConfig`] if there are fewer than two variants or every
    /// traffic weight is zero.
    pub fn start(&mut self) -> Result<()> {
        if self.status != ExperimentStatus::Draft {
            return Err(Error::InvalidTransition {
                action: "start",
                status: self.status,
            });
        }
        self.validate_config()?;
        self.status = ExperimentStatus::Active;
        self.start_date = Some(Utc::now());
        Ok(())
    }

    /// Stop the experiment: `active → completed`, sets `end_date`.
    ///
    /// The winner stays unset; declaring one is a separate, explicit action.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] unless the status is `Active`.
    pub fn stop(&mut self) -> Result<()> {
        if self.status != ExperimentStatus::Active {
            return Err(Error::InvalidTransition {
                action: "stop",
                status: self.status,
            });
        }
        self.status = ExperimentStatus::Completed;
        self.end_date = Some(Utc::now());
        Ok(())
    }

    /// Declare a winner: `active → completed`, sets `winner`, `improvement`,
    /// and `end_date`.
    ///
    /// Any variant is accepted regardless of significance; gating on a
    /// significance check is a caller affordance, not an engine invariant,
    /// so operators can override.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] unless the status is `Active`, or
    /// [`Error::VariantNotFound`] for an unknown variant ID.
    pub fn declare_winner(&mut self, variant_id: &str, improvement_pct: f64) -> Result<()> {
        if self.status != ExperimentStatus::Active {
            return Err(Error::InvalidTransition {
                action: "declare a winner for",
                status: self.status,
            });
        }
        if self.variant(variant_id).is_none() {
            return Err(Error::VariantNotFound(variant_id.to_string()));
        }
        self.winner = Some(variant_id.to_string());
        self.improvement = Some(improvement_pct);
        self.status = ExperimentStatus::Completed;
        self.end_date = Some(Utc::now());
        Ok(())
    }

    fn variant_mut(&mut self, variant_id: &str) -> Result<&mut Variant> {
        self.variants
            .iter_mut()
            .find(|v| v.id() == variant_id)
            .ok_or_else(|| Error::VariantNotFound(variant_id.to_string()))
    }

    fn validate_config(&self) -> Result<()> {
        if self.variants.len() < 2 {
            return Err(Error::InvalidConfig(
                "an experiment needs at least two variants".to_string(),
            ));
        }
        let total_weight: u64 = self
            .variants
            .iter()
            .map(|v| u64::from(v.traffic_weight()))
            .sum();
        if total_weight == 0 {
            return Err(Error::InvalidConfig(
                "all variant traffic weights are zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for `Experiment`.
#[derive(Debug)]
pub struct ExperimentBuilder {
    id: String,
    name: String,
    description: Option<String>,
    kind: Option<String>,
    variants: Vec<Variant>,
    metrics: Vec<String>,
}

impl ExperimentBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            kind: None,
            variants: Vec::new(),
            metrics: Vec::new(),
        }
    }

    /// Set the display description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the experiment kind (opaque display metadata).
    #[must_use]
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Append a variant.
    #[must_use]
    pub fn variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }

    /// Append a tracked metric identifier.
    #[must_use]
    pub fn metric(mut self, metric: impl Into<String>) -> Self {
        self.metrics.push(metric.into());
        self
    }

    /// Build the `Experiment` in draft status.
    #[must_use]
    pub fn build(self) -> Experiment {
        Experiment {
            id: self.id,
            name: self.name,
            description: self.description,
            kind: self.kind,
            status: ExperimentStatus::Draft,
            variants: self.variants,
            metrics: self.metrics,
            start_date: None,
            end_date: None,
            winner: None,
            improvement: None,
        }
    }
}
