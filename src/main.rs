use layer_color_panel::command::{self, PanelCommand};
use layer_color_panel::memory_host::{MemoryDocument, MemoryHost, MemoryLayer};
use layer_color_panel::settings::Settings;
use layer_color_panel::{logging, ColorLabel, Panel};
use std::path::PathBuf;

const USAGE: &str = "usage: layer_color_panel [--settings <file>] <document.json> <command>...\n\
                     commands: toggle:<color> solo:<color> assign:<color> select:<id>[,<id>...]";

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1).peekable();
    let mut settings_path = String::from("settings.json");
    if args.peek().map(String::as_str) == Some("--settings") {
        args.next();
        settings_path = args
            .next()
            .ok_or_else(|| anyhow::anyhow!("--settings needs a path\n{USAGE}"))?;
    }
    let document_path = args.next().ok_or_else(|| anyhow::anyhow!(USAGE))?;
    let commands = args
        .map(|a| PanelCommand::parse(&a))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let settings = Settings::load(&settings_path)?;
    logging::init(settings.debug_logging, settings.log_file.as_ref().map(PathBuf::from));

    let document = MemoryDocument::load(&document_path)?;
    tracing::info!(document = %document.name, commands = commands.len(), "replaying panel commands");

    let panel = Panel::new(MemoryHost::new(document), &settings);
    pollster::block_on(async {
        for cmd in &commands {
            command::run(&panel, cmd, |ids| panel.host().select(ids)).await;
        }
    });

    let host = panel.dispose();
    if let Some(doc) = host.document() {
        println!("{}", doc.name);
        for layer in &doc.layers {
            print_layer(layer, 1);
        }
    }
    println!();
    for tx in host.transactions() {
        println!("{} ({} changes)", tx.label, tx.mutations.len());
    }
    Ok(())
}

fn print_layer(layer: &MemoryLayer, depth: usize) {
    let eye = if layer.visible { "o" } else { "-" };
    let color = match layer.color.as_deref() {
        None => ColorLabel::NoColor.label(),
        Some(token) => ColorLabel::from_token(token).map_or(token, |c| c.label()),
    };
    println!(
        "{:indent$}[{eye}] {} {} ({color})",
        "",
        layer.id,
        layer.name,
        indent = depth * 2
    );
    for child in &layer.children {
        print_layer(child, depth + 1);
    }
}
