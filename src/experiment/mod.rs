//! Experiment records, storage boundary, and lifecycle controller
//!
//! ## Schema Overview
//!
//! ```text
//! Experiment (1) ──< Variant (N, ordered)
//! ```
//!
//! Counters live on the variants; [`crate::stats::SignificanceResult`] is
//! derived on demand and never stored.
//!
//! ## Usage
//!
//! ```rust
//! use reparto::experiment::{Experiment, ExperimentStatus, Variant};
//!
//! let mut experiment = Experiment::new(
//!     "exp-001",
//!     "CTA Button Color",
//!     vec![
//!         Variant::new("A", "Purple Button", 50),
//!         Variant::new("B", "Green Button", 50),
//!     ],
//! );
//!
//! experiment.start().unwrap();
//! experiment.declare_winner("B", 7.9).unwrap();
//! assert_eq!(experiment.status(), ExperimentStatus::Completed);
//! ```

mod controller;
mod record;
mod store;
mod variant;

pub use controller::{Enrollment, ExperimentController};
pub use record::{Experiment, ExperimentBuilder, ExperimentStatus};
pub use store::{ExperimentStore, MemoryExperimentStore};
pub use variant::{Variant, VariantBuilder};
