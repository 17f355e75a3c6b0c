use crate::color::ColorLabel;
use std::collections::HashMap;

/// UI element showing the open/closed eye of one color group.
pub trait Affordance {
    fn show(&self, visible: bool);
}

/// Affordance for colors with no bound UI element.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAffordance;

impl Affordance for NoopAffordance {
    fn show(&self, _visible: bool) {}
}

/// Displayed visibility per color. Colors never touched read as visible.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ColorStates {
    states: HashMap<ColorLabel, bool>,
}

impl ColorStates {
    pub fn visibility(&self, color: ColorLabel) -> bool {
        self.states.get(&color).copied().unwrap_or(true)
    }

    pub fn set_visibility(&mut self, color: ColorLabel, visible: bool) {
        self.states.insert(color, visible);
    }

    /// Displayed state of every color, in panel order.
    pub fn snapshot(&self) -> Vec<(ColorLabel, bool)> {
        ColorLabel::ALL
            .into_iter()
            .map(|c| (c, self.visibility(c)))
            .collect()
    }
}
