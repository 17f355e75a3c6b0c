use layer_color_panel::settings::{GroupColorPolicy, Settings};
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let s = Settings::load(path.to_str().unwrap()).unwrap();
    assert_eq!(s, Settings::default());
    let retry = s.retry_policy();
    assert_eq!(retry.attempts, 3);
    assert_eq!(retry.backoff, Duration::from_millis(100));
}

#[test]
fn save_and_load_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let s = Settings {
        debug_logging: true,
        query_backoff_ms: 250,
        group_color_policy: GroupColorPolicy::Descendants,
        toggle_command_name: "Hide by color".into(),
        ..Settings::default()
    };

    s.save(path.to_str().unwrap()).unwrap();
    let loaded = Settings::load(path.to_str().unwrap()).unwrap();
    assert_eq!(loaded, s);
}

#[test]
fn corrupt_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, b"not json").unwrap();

    assert!(Settings::load(path.to_str().unwrap()).is_err());
}
