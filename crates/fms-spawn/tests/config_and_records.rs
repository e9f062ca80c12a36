use fms_spawn::SpawnConfig;

#[test]
fn partial_yaml_keeps_remaining_defaults() {
    let yaml = "coupling_threshold: 0.05\nmax_forward_steps: 200\n";
    let config: SpawnConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.coupling_threshold, 0.05);
    assert_eq!(config.max_forward_steps, 200);
    assert_eq!(config.population_threshold, 0.1);
    assert_eq!(config.bundle_overlap_threshold, 0.7);
    config.validate().unwrap();
}

#[test]
fn zero_step_budget_is_rejected() {
    let config = SpawnConfig {
        max_forward_steps: 0,
        ..SpawnConfig::default()
    };
    assert_eq!(config.validate().unwrap_err().info().code, "spawn-budget");
}

#[test]
fn negative_threshold_is_rejected() {
    let config = SpawnConfig {
        population_threshold: -0.1,
        ..SpawnConfig::default()
    };
    let err = config.validate().unwrap_err();
    assert_eq!(err.info().code, "spawn-threshold");
    assert_eq!(
        err.info().context.get("field").map(String::as_str),
        Some("population_threshold")
    );
}

#[test]
fn spawn_records_serialise_to_json() {
    let record = fms_spawn::SpawnRecord {
        parent_label: 0,
        child_label: 3,
        parent_state: 0,
        child_state: 1,
        trigger_time: 1.0,
        spawn_time: 1.5,
        exit_time: 2.0,
        bundle_overlap: 0.1,
        child_position: vec![0.2],
        child_momentum: vec![-1.0],
    };
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["child_label"], 3);
    assert_eq!(json["spawn_time"], 1.5);
}
