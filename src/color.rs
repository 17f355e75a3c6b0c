use serde::{Deserialize, Serialize};

/// Label colors the host lets a user attach to a layer.
///
/// `NoColor` is the sentinel meaning "no color assigned". It is distinct from
/// every concrete label and only ever matches layers whose color is unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColorLabel {
    #[serde(rename = "none")]
    NoColor,
    #[serde(rename = "red")]
    Red,
    #[serde(rename = "orange")]
    Orange,
    #[serde(rename = "yellowColor")]
    Yellow,
    #[serde(rename = "grain")]
    Green,
    #[serde(rename = "seafoam")]
    Seafoam,
    #[serde(rename = "blue")]
    Blue,
    #[serde(rename = "indigo")]
    Indigo,
    #[serde(rename = "magenta")]
    Magenta,
    #[serde(rename = "fuchsia")]
    Fuchsia,
    #[serde(rename = "violet")]
    Violet,
    #[serde(rename = "gray")]
    Gray,
}

impl ColorLabel {
    /// Every label in panel order.
    pub const ALL: [ColorLabel; 12] = [
        ColorLabel::NoColor,
        ColorLabel::Red,
        ColorLabel::Orange,
        ColorLabel::Yellow,
        ColorLabel::Green,
        ColorLabel::Seafoam,
        ColorLabel::Blue,
        ColorLabel::Indigo,
        ColorLabel::Magenta,
        ColorLabel::Fuchsia,
        ColorLabel::Violet,
        ColorLabel::Gray,
    ];

    /// Token the host uses for this label in layer metadata.
    pub fn token(self) -> &'static str {
        match self {
            ColorLabel::NoColor => "none",
            ColorLabel::Red => "red",
            ColorLabel::Orange => "orange",
            ColorLabel::Yellow => "yellowColor",
            ColorLabel::Green => "grain",
            ColorLabel::Seafoam => "seafoam",
            ColorLabel::Blue => "blue",
            ColorLabel::Indigo => "indigo",
            ColorLabel::Magenta => "magenta",
            ColorLabel::Fuchsia => "fuchsia",
            ColorLabel::Violet => "violet",
            ColorLabel::Gray => "gray",
        }
    }

    /// Name shown next to the swatch.
    pub fn label(self) -> &'static str {
        match self {
            ColorLabel::NoColor => "No color",
            ColorLabel::Red => "Red",
            ColorLabel::Orange => "Orange",
            ColorLabel::Yellow => "Yellow",
            ColorLabel::Green => "Green",
            ColorLabel::Seafoam => "Seafoam",
            ColorLabel::Blue => "Blue",
            ColorLabel::Indigo => "Indigo",
            ColorLabel::Magenta => "Magenta",
            ColorLabel::Fuchsia => "Fuchsia",
            ColorLabel::Violet => "Violet",
            ColorLabel::Gray => "Gray",
        }
    }

    /// Style class of the panel swatch.
    pub fn class(self) -> &'static str {
        match self {
            ColorLabel::NoColor => "no-color",
            ColorLabel::Yellow => "yellow",
            ColorLabel::Green => "green",
            other => other.token(),
        }
    }

    pub fn is_sentinel(self) -> bool {
        self == ColorLabel::NoColor
    }

    /// Parse a concrete label from a host metadata token.
    ///
    /// The sentinel is not a metadata value, so `"none"` yields `None` here.
    pub fn from_token(token: &str) -> Option<Self> {
        ColorLabel::ALL
            .into_iter()
            .filter(|c| !c.is_sentinel())
            .find(|c| c.token() == token)
    }

    /// Parse user input: a host token or a style class, case-insensitive.
    pub fn parse(input: &str) -> Option<Self> {
        let needle = input.trim().to_lowercase();
        ColorLabel::ALL.into_iter().find(|c| {
            c.token().to_lowercase() == needle || c.class() == needle
        })
    }

    /// Whether a layer carrying `color` belongs to this label's group.
    pub fn matches(self, color: &LayerColor) -> bool {
        match (self, color) {
            (ColorLabel::NoColor, LayerColor::Unset) => true,
            (ColorLabel::NoColor, _) => false,
            (wanted, LayerColor::Label(have)) => wanted == *have,
            _ => false,
        }
    }
}

impl std::fmt::Display for ColorLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Last observed color of a layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerColor {
    /// The host reports no color for the layer.
    Unset,
    Label(ColorLabel),
    /// An explicit token that is not a known concrete label.
    Unrecognized(String),
}

impl LayerColor {
    /// Map the color token from layer metadata.
    pub fn from_metadata(token: Option<&str>) -> Self {
        match token {
            None => LayerColor::Unset,
            Some(t) => match ColorLabel::from_token(t) {
                Some(c) => LayerColor::Label(c),
                None => LayerColor::Unrecognized(t.to_string()),
            },
        }
    }

    /// The cached value after a label was assigned.
    pub fn assigned(label: ColorLabel) -> Self {
        if label.is_sentinel() {
            LayerColor::Unset
        } else {
            LayerColor::Label(label)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_matches_only_unset() {
        assert!(ColorLabel::NoColor.matches(&LayerColor::Unset));
        assert!(!ColorLabel::NoColor.matches(&LayerColor::from_metadata(Some("none"))));
        assert!(!ColorLabel::NoColor.matches(&LayerColor::Label(ColorLabel::Red)));
    }

    #[test]
    fn concrete_labels_need_exact_match() {
        assert!(ColorLabel::Red.matches(&LayerColor::Label(ColorLabel::Red)));
        assert!(!ColorLabel::Red.matches(&LayerColor::Label(ColorLabel::Blue)));
        assert!(!ColorLabel::Red.matches(&LayerColor::Unset));
    }

    #[test]
    fn parse_accepts_tokens_and_classes() {
        assert_eq!(ColorLabel::parse("grain"), Some(ColorLabel::Green));
        assert_eq!(ColorLabel::parse("Green"), Some(ColorLabel::Green));
        assert_eq!(ColorLabel::parse("yellowColor"), Some(ColorLabel::Yellow));
        assert_eq!(ColorLabel::parse("no-color"), Some(ColorLabel::NoColor));
        assert_eq!(ColorLabel::parse("teal"), None);
    }

    #[test]
    fn every_label_has_distinct_names() {
        let labels: std::collections::HashSet<_> =
            ColorLabel::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(labels.len(), ColorLabel::ALL.len());
        assert_eq!(ColorLabel::Green.label(), "Green");
        assert_eq!(ColorLabel::Yellow.label(), "Yellow");
        assert_eq!(ColorLabel::NoColor.label(), "No color");
    }

    #[test]
    fn serde_uses_host_tokens() {
        let json = serde_json::to_string(&ColorLabel::Yellow).unwrap();
        assert_eq!(json, "\"yellowColor\"");
        let back: ColorLabel = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(back, ColorLabel::NoColor);
    }
}
