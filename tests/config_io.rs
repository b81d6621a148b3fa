use std::io::Write;
use tempfile::NamedTempFile;
use voidmaw::config::SimConfig;

#[test]
fn defaults_cover_every_section() {
    let config = SimConfig::default();
    assert_eq!(config.field.width, 1280.0);
    assert_eq!(config.field.height, 720.0);
    assert_eq!(config.physics.gravity, [0.0, 0.0]);
    assert_eq!(config.sandbox.max_operations, 500_000);
    assert_eq!(config.scenery.count, 24);
}

#[test]
fn partial_file_falls_back_per_field() {
    let mut file = NamedTempFile::new().expect("temp config");
    write!(file, r#"{{ "field": {{ "width": 800.0 }}, "sandbox": {{ "max_operations": 9000 }} }}"#)
        .expect("write config");

    let config = SimConfig::load(file.path()).expect("config should parse");
    assert_eq!(config.field.width, 800.0);
    assert_eq!(config.field.height, 720.0, "missing fields keep their defaults");
    assert_eq!(config.sandbox.max_operations, 9000);
    assert_eq!(config.scenery.count, 24);
}

#[test]
fn missing_file_reports_an_error_and_load_or_default_recovers() {
    assert!(SimConfig::load("definitely/not/here.json").is_err());
    let config = SimConfig::load_or_default("definitely/not/here.json");
    assert_eq!(config.field.width, 1280.0);
}
