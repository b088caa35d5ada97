//! Lifecycle state machine and controller integration tests
//!
//! Covers every transition in the draft → active → completed table, the
//! rejections from incompatible states, and the controller operating over
//! the in-memory store.

use reparto::experiment::{
    Experiment, ExperimentController, ExperimentStatus, ExperimentStore, MemoryExperimentStore,
    Variant,
};
use reparto::Error;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn two_variant_experiment(id: &str) -> Experiment {
    Experiment::builder(id, "Onboarding Flow")
        .description("Single page vs multi-step onboarding")
        .kind("feature")
        .metric("completion_rate")
        .variant(Variant::new("A", "Single Page", 50))
        .variant(Variant::new("B", "Multi-Step", 50))
        .build()
}

// =============================================================================
// State machine on the record itself
// =============================================================================

#[test]
fn test_declare_winner_scenario() {
    let mut experiment = two_variant_experiment("exp-001");

    experiment.start().unwrap();
    experiment.declare_winner("B", 7.9).unwrap();

    assert_eq!(experiment.status(), ExperimentStatus::Completed);
    assert_eq!(experiment.winner(), Some("B"));
    assert_eq!(experiment.improvement(), Some(7.9));
    assert!(experiment.start_date().is_some());
    assert!(experiment.end_date().is_some());

    // Completed is terminal.
    assert!(matches!(
        experiment.start(),
        Err(Error::InvalidTransition {
            action: "start",
            status: ExperimentStatus::Completed,
        })
    ));
}

#[test]
fn test_stop_without_winner() {
    let mut experiment = two_variant_experiment("exp-002");
    experiment.start().unwrap();
    experiment.stop().unwrap();

    assert_eq!(experiment.status(), ExperimentStatus::Completed);
    assert!(experiment.winner().is_none());
    assert!(experiment.end_date().is_some());
}

#[test]
fn test_rejected_transitions() {
    let mut draft = two_variant_experiment("exp-003");
    assert!(matches!(
        draft.stop(),
        Err(Error::InvalidTransition { action: "stop", .. })
    ));
    assert!(matches!(
        draft.declare_winner("A", 0.0),
        Err(Error::InvalidTransition { .. })
    ));

    let mut active = two_variant_experiment("exp-004");
    active.start().unwrap();
    assert!(matches!(
        active.start(),
        Err(Error::InvalidTransition {
            status: ExperimentStatus::Active,
            ..
        })
    ));

    let mut completed = two_variant_experiment("exp-005");
    completed.start().unwrap();
    completed.stop().unwrap();
    assert!(matches!(completed.stop(), Err(Error::InvalidTransition { .. })));
    assert!(matches!(
        completed.declare_winner("A", 0.0),
        Err(Error::InvalidTransition { .. })
    ));
}

#[test]
fn test_start_validates_configuration() {
    let mut no_weight = Experiment::new(
        "exp-006",
        "Broken",
        vec![Variant::new("A", "Zero", 0), Variant::new("B", "Zero", 0)],
    );
    assert!(matches!(no_weight.start(), Err(Error::InvalidConfig(_))));

    let mut lone = Experiment::new("exp-007", "Lonely", vec![Variant::new("A", "Only", 100)]);
    assert!(matches!(lone.start(), Err(Error::InvalidConfig(_))));
}

#[test]
fn test_preseeded_counters_survive_start() {
    let mut experiment = Experiment::builder("exp-008", "Seeded")
        .variant(Variant::builder("A", "Control", 50).views(10).build())
        .variant(Variant::new("B", "Treatment", 50))
        .build();
    experiment.start().unwrap();
    assert_eq!(experiment.variant("A").unwrap().views(), 10);
}

#[test]
fn test_experiment_serialization_round_trip() {
    let mut experiment = two_variant_experiment("exp-009");
    experiment.start().unwrap();

    let json = serde_json::to_string(&experiment).expect("serialization failed");
    assert!(json.contains("\"status\":\"active\""));

    let back: Experiment = serde_json::from_str(&json).expect("deserialization failed");
    assert_eq!(back, experiment);
}

// =============================================================================
// Controller over the in-memory store
// =============================================================================

#[test]
fn test_controller_full_lifecycle() {
    init_tracing();

    let controller = ExperimentController::new(MemoryExperimentStore::new());
    controller.create(two_variant_experiment("exp-100")).unwrap();
    controller.start("exp-100").unwrap();

    // Event ingestion: assign, then count exposures and conversions.
    for i in 0..200 {
        let identity = format!("user-{i}");
        let variant_id = controller.assign(&identity, "exp-100").unwrap();
        controller.record_view("exp-100", &variant_id).unwrap();
        if i % 4 == 0 {
            controller.record_conversion("exp-100", &variant_id).unwrap();
        }
    }

    let experiment = controller.store().get("exp-100").unwrap();
    let total_views: u64 = experiment.variants().iter().map(Variant::views).sum();
    let total_conversions: u64 = experiment.variants().iter().map(Variant::conversions).sum();
    assert_eq!(total_views, 200);
    assert_eq!(total_conversions, 50);

    // Similar rates on both sides: no detectable winner expected.
    let result = controller.significance("exp-100").unwrap();
    assert!(result.p_value >= 0.0 && result.p_value <= 1.0);

    controller.declare_winner("exp-100", "B", 7.9).unwrap();
    let done = controller.store().get("exp-100").unwrap();
    assert_eq!(done.status(), ExperimentStatus::Completed);
    assert_eq!(done.winner(), Some("B"));
    assert!(matches!(
        controller.start("exp-100"),
        Err(Error::InvalidTransition { .. })
    ));
}

#[test]
fn test_controller_assignment_is_stable() {
    let controller = ExperimentController::new(MemoryExperimentStore::new());
    controller.create(two_variant_experiment("exp-101")).unwrap();
    controller.start("exp-101").unwrap();

    let first = controller.assign("user-42", "exp-101").unwrap();
    for _ in 0..20 {
        assert_eq!(controller.assign("user-42", "exp-101").unwrap(), first);
    }
}

#[test]
fn test_controller_unknown_experiment() {
    let controller = ExperimentController::new(MemoryExperimentStore::new());
    assert!(matches!(
        controller.start("exp-999"),
        Err(Error::ExperimentNotFound(_))
    ));
    assert!(matches!(
        controller.assign("user-1", "exp-999"),
        Err(Error::ExperimentNotFound(_))
    ));
}

#[test]
fn test_controller_unknown_variant_counter() {
    let controller = ExperimentController::new(MemoryExperimentStore::new());
    controller.create(two_variant_experiment("exp-102")).unwrap();
    assert!(matches!(
        controller.record_view("exp-102", "Z"),
        Err(Error::VariantNotFound(_))
    ));
}

#[test]
fn test_controller_significance_needs_exposures() {
    let controller = ExperimentController::new(MemoryExperimentStore::new());
    controller.create(two_variant_experiment("exp-103")).unwrap();
    controller.start("exp-103").unwrap();

    // Fresh counters: evaluating an unexposed variant is a caller error the
    // engine rejects rather than dividing by zero.
    assert!(matches!(
        controller.significance("exp-103"),
        Err(Error::InsufficientSample(_))
    ));
}

#[test]
fn test_enrollments_cover_active_experiments_only() {
    let controller = ExperimentController::new(MemoryExperimentStore::new());
    controller.create(two_variant_experiment("exp-104")).unwrap();
    controller.create(two_variant_experiment("exp-105")).unwrap();
    controller.create(two_variant_experiment("exp-106")).unwrap();
    controller.start("exp-104").unwrap();
    controller.start("exp-105").unwrap();
    // exp-106 stays in draft.

    let enrollments = controller.enrollments("user-42").unwrap();
    assert_eq!(enrollments.len(), 2);
    for enrollment in &enrollments {
        assert_ne!(enrollment.experiment_id, "exp-106");
        assert!(!enrollment.variant_name.is_empty());
        assert_eq!(enrollment.experiment_name, "Onboarding Flow");
    }
}
