use std::{thread::sleep, time::Duration};

use tempfile::tempdir;

#[test]
fn init_without_file_creates_no_log() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("panel.log");

    layer_color_panel::logging::init(false, None);
    tracing::info!("panel ready");

    sleep(Duration::from_millis(100));

    assert!(!path.exists(), "log file should not be created");
    assert!(fs_is_empty(dir.path()));
}

fn fs_is_empty(dir: &std::path::Path) -> bool {
    std::fs::read_dir(dir).map(|mut d| d.next().is_none()).unwrap_or(false)
}
