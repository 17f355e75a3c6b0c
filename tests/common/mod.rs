#![allow(dead_code)]

use layer_color_panel::memory_host::{MemoryDocument, MemoryHost, MemoryLayer};
use layer_color_panel::states::Affordance;
use layer_color_panel::ColorLabel;
use std::cell::RefCell;
use std::io::Write;
use std::sync::{Arc, Mutex};

pub use layer_color_panel::memory_host::yield_now;

/// Affordance that remembers every state it was asked to show.
#[derive(Default)]
pub struct RecordingAffordance {
    pub shown: RefCell<Vec<bool>>,
}

impl RecordingAffordance {
    pub fn last(&self) -> Option<bool> {
        self.shown.borrow().last().copied()
    }
}

impl Affordance for RecordingAffordance {
    fn show(&self, visible: bool) {
        self.shown.borrow_mut().push(visible);
    }
}

/// Leaves colored red, none, blue, red under a single group.
///
/// ids: group 1; leaves 2 (red), 3 (none), 4 (blue), 5 (red)
pub fn four_leaf_document() -> MemoryDocument {
    MemoryDocument::new(
        "poster.psd",
        vec![
            MemoryLayer::group(
                1,
                "Artwork",
                vec![
                    MemoryLayer::leaf(2, "Sky", ColorLabel::Red),
                    MemoryLayer::leaf(3, "Clouds", ColorLabel::NoColor),
                ],
            ),
            MemoryLayer::leaf(4, "Title", ColorLabel::Blue),
            MemoryLayer::leaf(5, "Sun", ColorLabel::Red),
        ],
    )
}

pub fn four_leaf_host() -> MemoryHost {
    MemoryHost::new(four_leaf_document())
}

/// In-memory sink for log output.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with warnings and errors captured into the returned buffer.
pub fn with_captured_warnings<R>(f: impl FnOnce() -> R) -> (R, String) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs.contents())
}
