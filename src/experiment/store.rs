//! Experiment store - repository boundary and in-memory backend

use dashmap::DashMap;

use crate::{Error, Result};

use super::Experiment;

/// Key-addressed repository for experiment records.
///
/// The engine treats persistence as an external concern; this trait is the
/// whole contract. Implementations must serialize writes to the same
/// experiment so two concurrent lifecycle transitions cannot both win.
pub trait ExperimentStore: Send + Sync {
    /// Fetch one experiment by ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExperimentNotFound`] for an unknown ID.
    fn get(&self, experiment_id: &str) -> Result<Experiment>;

    /// All experiments, in no particular order.
    ///
    /// # Errors
    ///
    /// Backend-dependent; the in-memory store never fails.
    fn list(&self) -> Result<Vec<Experiment>>;

    /// Insert or replace an experiment record.
    ///
    /// # Errors
    ///
    /// Backend-dependent; the in-memory store never fails.
    fn save(&self, experiment: Experiment) -> Result<()>;

    /// Read-modify-write one experiment atomically.
    ///
    /// The default implementation is get-apply-save, which is only atomic if
    /// the backend serializes access; backends with real concurrency should
    /// override it with a locked in-place update, as
    /// [`MemoryExperimentStore`] does. If `apply` fails, nothing is written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExperimentNotFound`] for an unknown ID, or whatever
    /// `apply` returns.
    fn update<R>(
        &self,
        experiment_id: &str,
        apply: impl FnOnce(&mut Experiment) -> Result<R>,
    ) -> Result<R>
    where
        Self: Sized,
    {
        let mut experiment = self.get(experiment_id)?;
        let out = apply(&mut experiment)?;
        self.save(experiment)?;
        Ok(out)
    }
}

/// In-memory store backed by a lock-free concurrent hashmap.
///
/// The default backend - records are lost on process restart. `DashMap`'s
/// per-shard locks serialize updates to the same experiment, which is the
/// single-writer guarantee the lifecycle transitions rely on.
///
/// # Example
///
/// ```rust
/// use reparto::experiment::{Experiment, ExperimentStore, MemoryExperimentStore, Variant};
///
/// # fn main() -> reparto::Result<()> {
/// let store = MemoryExperimentStore::new();
/// store.save(Experiment::new(
///     "exp-001",
///     "Onboarding Flow",
///     vec![
///         Variant::new("A", "Single Page", 50),
///         Variant::new("B", "Multi-Step", 50),
///     ],
/// ))?;
/// assert_eq!(store.get("exp-001")?.name(), "Onboarding Flow");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryExperimentStore {
    experiments: DashMap<String, Experiment>,
}

impl MemoryExperimentStore {
    /// Create a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            experiments: DashMap::with_capacity(capacity),
        }
    }

    /// Get the number of stored experiments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    /// Remove all experiments.
    pub fn clear(&self) {
        self.experiments.clear();
    }
}

impl ExperimentStore for MemoryExperimentStore {
    fn get(&self, experiment_id: &str) -> Result<Experiment> {
        self.experiments
            .get(experiment_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::ExperimentNotFound(experiment_id.to_string()))
    }

    fn list(&self) -> Result<Vec<Experiment>> {
        Ok(self
            .experiments
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn save(&self, experiment: Experiment) -> Result<()> {
        self.experiments
            .insert(experiment.id().to_string(), experiment);
        Ok(())
    }

    fn update<R>(
        &self,
        experiment_id: &str,
        apply: impl FnOnce(&mut Experiment) -> Result<R>,
    ) -> Result<R> {
        // get_mut holds the shard lock for the duration of `apply`, so
        // concurrent transitions on one experiment are serialized.
        let mut entry = self
            .experiments
            .get_mut(experiment_id)
            .ok_or_else(|| Error::ExperimentNotFound(experiment_id.to_string()))?;
        apply(entry.value_mut())
    }
}
