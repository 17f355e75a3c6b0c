use std::{fs, thread::sleep, time::Duration};

use tempfile::tempdir;

#[test]
fn writes_log_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("panel.log");

    layer_color_panel::logging::init(true, Some(path.clone()));
    tracing::info!("panel ready");

    sleep(Duration::from_millis(100));

    assert!(path.exists(), "log file was not created");
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("panel ready"));
}
