use fms_core::FmsError;
use fms_mp::ReductionConfig;

#[test]
fn missing_fields_take_defaults() {
    let config: ReductionConfig = serde_yaml::from_str("fidelity_threshold: 1.0e-6\n").unwrap();
    assert_eq!(config.fidelity_threshold, 1e-6);
    assert_eq!(config.condition_threshold, 1e7);
    assert_eq!(config.pinv_rcond, ReductionConfig::default().pinv_rcond);
    config.validate().unwrap();
}

#[test]
fn non_positive_threshold_is_rejected() {
    let config: ReductionConfig = serde_yaml::from_str("condition_threshold: -1.0\n").unwrap();
    let err = config.validate().unwrap_err();
    assert!(matches!(err, FmsError::Config(_)));
    assert_eq!(err.info().code, "reduction-threshold");
    assert!(!err.is_fatal());
}
