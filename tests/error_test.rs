//! Tests for error types

use reparto::experiment::ExperimentStatus;
use reparto::Error;

#[test]
fn test_invalid_config_error() {
    let error = Error::InvalidConfig("experiment has no variants".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Invalid experiment configuration"));
    assert!(error_str.contains("Fix the variant list"));
}

#[test]
fn test_insufficient_sample_error() {
    let error = Error::InsufficientSample("variant 'B' has no recorded views".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Insufficient sample"));
    assert!(error_str.contains("variant 'B'"));
    assert!(error_str.contains("Wait for more traffic"));
}

#[test]
fn test_invalid_transition_error() {
    let error = Error::InvalidTransition {
        action: "start",
        status: ExperimentStatus::Active,
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("cannot start"));
    assert!(error_str.contains("active state"));
}

#[test]
fn test_experiment_not_found_error() {
    let error = Error::ExperimentNotFound("exp-999".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Experiment not found"));
    assert!(error_str.contains("exp-999"));
}

#[test]
fn test_variant_not_found_error() {
    let error = Error::VariantNotFound("Z".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Variant not found"));
    assert!(error_str.contains("Z"));
}
