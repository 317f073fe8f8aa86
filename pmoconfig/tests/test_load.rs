use pmoconfig::Config;

#[test]
fn test_load_config_creates_file_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let dir_str = dir.path().to_str().unwrap();

    let config = Config::load_config(dir_str).unwrap();
    assert_eq!(config.directory(), Some(dir_str));
    assert_eq!(config.get_frame_interval_ms().unwrap(), 50);

    // La configuration fusionnée est sauvegardée dans config.yaml
    let saved = std::fs::read_to_string(dir.path().join("config.yaml")).unwrap();
    assert!(saved.contains("frame_interval_ms"));
}

#[test]
fn test_load_config_merges_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.yaml"),
        "engine:\n  frame_interval_ms: 5\ncache:\n  fill_mode: unguarded\n",
    )
    .unwrap();

    let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
    assert_eq!(config.get_frame_interval_ms().unwrap(), 5);
    assert_eq!(config.get_processor_latency_ms().unwrap(), 10);
    assert_eq!(config.get_string_or(&["cache", "fill_mode"], "guarded"), "unguarded");
}

#[test]
fn test_setters_persist_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let dir_str = dir.path().to_str().unwrap();

    let config = Config::load_config(dir_str).unwrap();
    config.set_processor_latency_ms(0).unwrap();

    let reloaded = Config::load_config(dir_str).unwrap();
    assert_eq!(reloaded.get_processor_latency_ms().unwrap(), 0);
}

#[test]
fn test_env_override_applies_to_in_memory_config() {
    std::env::set_var("PMOMEDIA_CONFIG__ENVTEST__PROGRESS", "42");
    let config = Config::in_memory();
    let value = config.get_value(&["envtest", "progress"]).unwrap();
    assert_eq!(value.as_u64(), Some(42));
    std::env::remove_var("PMOMEDIA_CONFIG__ENVTEST__PROGRESS");
}
