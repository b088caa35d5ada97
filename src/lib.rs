//! # Reparto: Experiment Assignment & Significance Engine
//!
//! Reparto is the statistical core of an A/B testing system: it assigns
//! identities to weighted experiment variants deterministically (no persisted
//! assignment records) and decides whether an observed conversion-rate
//! difference between two variants is statistically significant.
//!
//! ## Design
//!
//! - **Pure leaf functions**: [`assign::assign_variant`] and
//!   [`stats::evaluate`] have no I/O, no clock, and no randomness. Identical
//!   inputs always produce identical outputs, which is what keeps a user's
//!   variant stable across requests without server-side state.
//! - **Thin orchestration**: [`experiment::ExperimentController`] drives the
//!   `draft → active → completed` lifecycle over an injected
//!   [`experiment::ExperimentStore`], calling the two pure functions.
//!
//! ## Example
//!
//! ```rust
//! use reparto::experiment::{Experiment, ExperimentController, MemoryExperimentStore, Variant};
//!
//! # fn main() -> reparto::Result<()> {
//! let controller = ExperimentController::new(MemoryExperimentStore::new());
//!
//! let experiment = Experiment::builder("exp-001", "New Pricing Model")
//!     .description("Test $4.99 vs $5.99 basic tier pricing")
//!     .variant(Variant::new("A", "Control ($5.99)", 50))
//!     .variant(Variant::new("B", "Test ($4.99)", 50))
//!     .build();
//! controller.create(experiment)?;
//! controller.start("exp-001")?;
//!
//! // The same identity always lands in the same variant.
//! let variant_id = controller.assign("user-42", "exp-001")?;
//! assert_eq!(controller.assign("user-42", "exp-001")?, variant_id);
//!
//! controller.record_view("exp-001", &variant_id)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod assign;
pub mod error;
pub mod experiment;
pub mod stats;

pub use error::{Error, Result};
