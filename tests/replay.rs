use futures::executor::block_on;
use layer_color_panel::command::{self, PanelCommand};
use layer_color_panel::memory_host::{MemoryDocument, MemoryHost};
use layer_color_panel::{LayerId, Panel, Settings};
use tempfile::tempdir;

fn demo_document() -> MemoryDocument {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/poster.json");
    MemoryDocument::load(path).expect("load demo document")
}

fn replay(panel: &Panel<MemoryHost>, script: &[&str]) {
    for line in script {
        let cmd = PanelCommand::parse(line).unwrap();
        block_on(command::run(panel, &cmd, |ids| panel.host().select(ids)));
    }
}

#[test]
fn demo_document_loads_with_defaults() {
    let doc = demo_document();
    assert_eq!(doc.selection, vec![LayerId(6)]);
    let clouds = doc.find(LayerId(3)).unwrap();
    assert!(clouds.visible);
    assert_eq!(clouds.color, None);
    assert!(!doc.find(LayerId(8)).unwrap().visible);
}

#[test]
fn scripted_session_updates_the_document() {
    let panel = Panel::new(MemoryHost::new(demo_document()), &Settings::default());

    replay(
        &panel,
        &["toggle:red", "select:3", "assign:blue", "solo:blue", "toggle:green"],
    );

    let host = panel.dispose();
    assert_eq!(host.is_visible(LayerId(2)), Some(false));
    assert_eq!(host.is_visible(LayerId(5)), Some(false));
    assert_eq!(host.layer(LayerId(3)).unwrap().color.as_deref(), Some("blue"));
    assert_eq!(host.is_visible(LayerId(3)), Some(true));
    assert_eq!(host.is_visible(LayerId(4)), Some(true));
    assert_eq!(host.is_visible(LayerId(6)), Some(false));
    assert_eq!(host.is_visible(LayerId(8)), Some(true), "green shown again after solo");
}

#[test]
fn document_survives_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.json");
    let doc = demo_document();

    doc.save(path.to_str().unwrap()).unwrap();
    assert_eq!(MemoryDocument::load(path.to_str().unwrap()).unwrap(), doc);
}
