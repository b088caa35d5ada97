//! Experiment lifecycle controller
//!
//! A thin orchestrator over an injected [`ExperimentStore`] plus the two pure
//! functions ([`crate::assign::assign_variant`], [`crate::stats::evaluate`]).
//! It owns no state of its own, so isolation and testability come for free:
//! every operation is a store round-trip plus pure computation.

use tracing::{debug, info};

use serde::{Deserialize, Serialize};

use crate::assign::assign_variant;
use crate::stats::{evaluate, SignificanceResult, VariantStats};
use crate::{Error, Result};

use super::{Experiment, ExperimentStatus, ExperimentStore};

/// One active-experiment membership for an identity: which variant the
/// identity would see, with display names attached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Enrollment {
    /// The experiment the identity is enrolled in.
    pub experiment_id: String,
    /// Display name of that experiment.
    pub experiment_name: String,
    /// The assigned variant.
    pub variant_id: String,
    /// Display label of the assigned variant.
    pub variant_name: String,
}

/// Drives the `draft → active → completed` lifecycle and exposes assignment
/// and significance over stored experiments.
///
/// Transitions go through [`ExperimentStore::update`], so per-experiment
/// serialization is inherited from the store backend. The controller never
/// auto-stops an experiment on reaching significance; declaring a winner is
/// always an explicit operator action.
pub struct ExperimentController<S> {
    store: S,
}

impl<S: ExperimentStore> ExperimentController<S> {
    /// Create a controller over the given store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Persist a new experiment. Experiments enter the lifecycle in draft.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if the record is not in draft
    /// status, or a store error.
    pub fn create(&self, experiment: Experiment) -> Result<()> {
        if experiment.status() != ExperimentStatus::Draft {
            return Err(Error::InvalidTransition {
                action: "create",
                status: experiment.status(),
            });
        }
        info!(experiment_id = experiment.id(), "experiment created");
        self.store.save(experiment)
    }

    /// Start an experiment (`draft → active`).
    ///
    /// # Errors
    ///
    /// See [`Experiment::start`]; also [`Error::ExperimentNotFound`].
    pub fn start(&self, experiment_id: &str) -> Result<()> {
        self.store.update(experiment_id, Experiment::start)?;
        info!(experiment_id, "experiment started");
        Ok(())
    }

    /// Stop an experiment (`active → completed`) without declaring a winner.
    ///
    /// # Errors
    ///
    /// See [`Experiment::stop`]; also [`Error::ExperimentNotFound`].
    pub fn stop(&self, experiment_id: &str) -> Result<()> {
        self.store.update(experiment_id, Experiment::stop)?;
        info!(experiment_id, "experiment stopped");
        Ok(())
    }

    /// Declare a winner (`active → completed`).
    ///
    /// Accepts any variant regardless of significance; callers typically gate
    /// this on [`significance`](Self::significance) as a UI affordance, but
    /// the engine allows operator override.
    ///
    /// # Errors
    ///
    /// See [`Experiment::declare_winner`]; also
    /// [`Error::ExperimentNotFound`].
    pub fn declare_winner(
        &self,
        experiment_id: &str,
        variant_id: &str,
        improvement_pct: f64,
    ) -> Result<()> {
        self.store.update(experiment_id, |experiment| {
            experiment.declare_winner(variant_id, improvement_pct)
        })?;
        info!(experiment_id, variant_id, improvement_pct, "winner declared");
        Ok(())
    }

    /// Assign an identity to a variant of an active experiment.
    ///
    /// Deterministic: the same identity always gets the same variant for as
    /// long as the experiment stays active.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] unless the experiment is active,
    /// [`Error::ExperimentNotFound`] for an unknown ID, or
    /// [`Error::InvalidConfig`] from the assignment preconditions.
    pub fn assign(&self, identity: &str, experiment_id: &str) -> Result<String> {
        let experiment = self.store.get(experiment_id)?;
        if experiment.status() != ExperimentStatus::Active {
            return Err(Error::InvalidTransition {
                action: "assign traffic to",
                status: experiment.status(),
            });
        }
        let variant = assign_variant(identity, experiment_id, experiment.variants())?;
        debug!(
            identity,
            experiment_id,
            variant_id = variant.id(),
            "variant assigned"
        );
        Ok(variant.id().to_string())
    }

    /// Record one exposure. Event-ingestion entry point; increments are
    /// serialized per experiment by the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExperimentNotFound`] or [`Error::VariantNotFound`].
    pub fn record_view(&self, experiment_id: &str, variant_id: &str) -> Result<()> {
        self.store
            .update(experiment_id, |experiment| experiment.record_view(variant_id))
    }

    /// Record one conversion. Event-ingestion entry point.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExperimentNotFound`] or [`Error::VariantNotFound`].
    pub fn record_conversion(&self, experiment_id: &str, variant_id: &str) -> Result<()> {
        self.store.update(experiment_id, |experiment| {
            experiment.record_conversion(variant_id)
        })
    }

    /// Evaluate significance between the experiment's first two variants,
    /// the pair the comparison view renders. Callers needing a different
    /// pair can call [`crate::stats::evaluate`] directly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] with fewer than two variants,
    /// [`Error::InsufficientSample`] if either variant has zero views, or
    /// [`Error::ExperimentNotFound`].
    pub fn significance(&self, experiment_id: &str) -> Result<SignificanceResult> {
        let experiment = self.store.get(experiment_id)?;
        let (a, b) = Self::comparison_pair(&experiment)?;
        for variant in [a, b] {
            if variant.views() == 0 {
                return Err(Error::InsufficientSample(format!(
                    "variant '{}' has no recorded views",
                    variant.id()
                )));
            }
        }
        evaluate(&VariantStats::from(a), &VariantStats::from(b))
    }

    /// Which of the first two variants is ahead on conversion rate, with the
    /// leader's relative improvement over the other in percent. This is the
    /// value an operator passes to [`declare_winner`](Self::declare_winner);
    /// the engine does not gate on it.
    ///
    /// Improvement is zero when the trailing rate is zero (no meaningful
    /// baseline).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] with fewer than two variants, or
    /// [`Error::ExperimentNotFound`].
    pub fn leading_variant(&self, experiment_id: &str) -> Result<(String, f64)> {
        let experiment = self.store.get(experiment_id)?;
        let (a, b) = Self::comparison_pair(&experiment)?;

        let (leader, trailer) = if b.conversion_rate() > a.conversion_rate() {
            (b, a)
        } else {
            (a, b)
        };
        let improvement_pct = if trailer.conversion_rate() == 0.0 {
            0.0
        } else {
            (leader.conversion_rate() - trailer.conversion_rate()) / trailer.conversion_rate()
                * 100.0
        };
        Ok((leader.id().to_string(), improvement_pct))
    }

    /// Assignments for an identity across every active experiment.
    ///
    /// # Errors
    ///
    /// Store errors only: active experiments are validated at `start`, so
    /// assignment itself cannot fail here.
    pub fn enrollments(&self, identity: &str) -> Result<Vec<Enrollment>> {
        let mut enrollments = Vec::new();
        for experiment in self.store.list()? {
            if experiment.status() != ExperimentStatus::Active {
                continue;
            }
            let variant = assign_variant(identity, experiment.id(), experiment.variants())?;
            enrollments.push(Enrollment {
                experiment_id: experiment.id().to_string(),
                experiment_name: experiment.name().to_string(),
                variant_id: variant.id().to_string(),
                variant_name: variant.name().to_string(),
            });
        }
        Ok(enrollments)
    }

    fn comparison_pair(experiment: &Experiment) -> Result<(&super::Variant, &super::Variant)> {
        match experiment.variants() {
            [a, b, ..] => Ok((a, b)),
            _ => Err(Error::InvalidConfig(
                "significance comparison needs at least two variants".to_string(),
            )),
        }
    }
}
