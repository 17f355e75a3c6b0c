use crate::color::ColorLabel;
use crate::host::{HostGateway, LayerId};
use crate::panel::{Modifiers, Panel};

/// A scripted panel interaction, written as `verb:argument`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCommand {
    /// `toggle:<color>`: plain click.
    Toggle(ColorLabel),
    /// `solo:<color>`: alt-click.
    Solo(ColorLabel),
    /// `assign:<color>`: shift-click.
    Assign(ColorLabel),
    /// `select:<id>[,<id>...]`: change the host selection.
    Select(Vec<LayerId>),
}

impl PanelCommand {
    pub fn parse(input: &str) -> anyhow::Result<Self> {
        let (verb, arg) = input
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("expected `verb:argument`, got '{input}'"))?;
        let color = || {
            ColorLabel::parse(arg).ok_or_else(|| anyhow::anyhow!("unknown color '{arg}'"))
        };
        match verb.trim() {
            "toggle" => Ok(PanelCommand::Toggle(color()?)),
            "solo" => Ok(PanelCommand::Solo(color()?)),
            "assign" => Ok(PanelCommand::Assign(color()?)),
            "select" => {
                let ids = arg
                    .split(',')
                    .filter(|s| !s.trim().is_empty())
                    .map(|s| s.trim().parse::<u64>().map(LayerId))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(PanelCommand::Select(ids))
            }
            other => anyhow::bail!("unknown command '{other}'"),
        }
    }

    /// Modifiers of the click this command stands for, if it is a click.
    pub fn modifiers(&self) -> Option<(ColorLabel, Modifiers)> {
        match *self {
            PanelCommand::Toggle(c) => Some((c, Modifiers::NONE)),
            PanelCommand::Solo(c) => Some((c, Modifiers::ALT)),
            PanelCommand::Assign(c) => Some((c, Modifiers::SHIFT)),
            PanelCommand::Select(_) => None,
        }
    }
}

/// Replay a click command against `panel`. Selection changes go through
/// `select`, since only the host owns the selection.
pub async fn run<H: HostGateway>(
    panel: &Panel<H>,
    command: &PanelCommand,
    select: impl FnOnce(&[LayerId]),
) {
    match command {
        PanelCommand::Select(ids) => select(ids),
        other => {
            if let Some((color, mods)) = other.modifiers() {
                panel.click(color, mods).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clicks() {
        assert_eq!(
            PanelCommand::parse("toggle:red").unwrap(),
            PanelCommand::Toggle(ColorLabel::Red)
        );
        assert_eq!(
            PanelCommand::parse("solo:grain").unwrap(),
            PanelCommand::Solo(ColorLabel::Green)
        );
        assert_eq!(
            PanelCommand::parse("assign:none").unwrap(),
            PanelCommand::Assign(ColorLabel::NoColor)
        );
    }

    #[test]
    fn parses_selection() {
        assert_eq!(
            PanelCommand::parse("select:3, 5").unwrap(),
            PanelCommand::Select(vec![LayerId(3), LayerId(5)])
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(PanelCommand::parse("toggle").is_err());
        assert!(PanelCommand::parse("toggle:teal").is_err());
        assert!(PanelCommand::parse("hide:red").is_err());
        assert!(PanelCommand::parse("select:x").is_err());
    }
}
