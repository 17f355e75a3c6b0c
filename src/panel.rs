use crate::color::ColorLabel;
use crate::coordinator::Coordinator;
use crate::host::HostGateway;
use crate::settings::Settings;
use crate::states::{Affordance, NoopAffordance};
use crate::toggle::AssignReport;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Modifier keys held during a click on a color group.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Modifiers {
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        alt: false,
        shift: false,
    };
    pub const ALT: Modifiers = Modifiers {
        alt: true,
        shift: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        alt: false,
        shift: true,
    };
}

/// What a click on a color group resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    Toggle,
    Solo,
    AssignColor,
}

impl ClickAction {
    pub fn from_modifiers(mods: Modifiers) -> Self {
        if mods.shift {
            ClickAction::AssignColor
        } else if mods.alt {
            ClickAction::Solo
        } else {
            ClickAction::Toggle
        }
    }
}

#[derive(Debug, Default, Clone)]
struct SoloState {
    color: Option<ColorLabel>,
    /// Displayed states captured when solo mode was entered.
    saved: Vec<(ColorLabel, bool)>,
}

/// The color-group panel: click dispatch, displayed state and solo mode on
/// top of a [`Coordinator`].
pub struct Panel<H> {
    coordinator: Coordinator<H>,
    affordances: RefCell<HashMap<ColorLabel, Rc<dyn Affordance>>>,
    solo: RefCell<SoloState>,
}

impl<H: HostGateway> Panel<H> {
    pub fn new(host: H, settings: &Settings) -> Self {
        tracing::info!(colors = ColorLabel::ALL.len(), "layer color panel initialised");
        Self {
            coordinator: Coordinator::new(host, settings),
            affordances: RefCell::new(HashMap::new()),
            solo: RefCell::new(SoloState::default()),
        }
    }

    pub fn coordinator(&self) -> &Coordinator<H> {
        &self.coordinator
    }

    pub fn host(&self) -> &H {
        self.coordinator.host()
    }

    /// Attach the UI element for `color` and show its current state.
    pub fn bind(&self, color: ColorLabel, affordance: Rc<dyn Affordance>) {
        affordance.show(self.visibility(color));
        self.affordances.borrow_mut().insert(color, affordance);
    }

    fn affordance(&self, color: ColorLabel) -> Rc<dyn Affordance> {
        self.affordances
            .borrow()
            .get(&color)
            .cloned()
            .unwrap_or_else(|| Rc::new(NoopAffordance))
    }

    pub fn visibility(&self, color: ColorLabel) -> bool {
        self.coordinator.states().visibility(color)
    }

    pub fn is_solo(&self) -> bool {
        self.solo.borrow().color.is_some()
    }

    pub fn solo_color(&self) -> Option<ColorLabel> {
        self.solo.borrow().color
    }

    pub async fn click(&self, color: ColorLabel, mods: Modifiers) {
        let action = ClickAction::from_modifiers(mods);
        tracing::debug!(%color, ?action, "color group clicked");
        match action {
            ClickAction::Toggle => self.toggle(color).await,
            ClickAction::Solo => self.solo(color).await,
            ClickAction::AssignColor => {
                self.assign(color).await;
            }
        }
    }

    /// Flip the displayed state of `color` and queue the change.
    pub async fn toggle(&self, color: ColorLabel) {
        let next = !self.visibility(color);
        self.show(color, next);
        self.coordinator
            .request(color, next, self.affordance(color))
            .await;
    }

    /// Show only `color`, or restore the previous states when `color` is
    /// already soloed.
    pub async fn solo(&self, color: ColorLabel) {
        let targets: Vec<(ColorLabel, bool)> = {
            let mut solo = self.solo.borrow_mut();
            if solo.color == Some(color) {
                tracing::debug!(%color, "leaving solo mode");
                solo.color = None;
                std::mem::take(&mut solo.saved)
            } else {
                if solo.color.is_none() {
                    solo.saved = self.coordinator.states().snapshot();
                }
                tracing::debug!(%color, "entering solo mode");
                solo.color = Some(color);
                ColorLabel::ALL
                    .into_iter()
                    .map(|c| (c, c == color))
                    .collect()
            }
        };

        for (c, visible) in targets {
            if self.visibility(c) != visible {
                self.show(c, visible);
                self.coordinator.submit(c, visible, self.affordance(c));
            }
        }
        self.coordinator.drain().await;
    }

    /// Set `color` on every selected layer.
    pub async fn assign(&self, color: ColorLabel) -> AssignReport {
        let report = self.coordinator.assign_color(color).await;
        tracing::info!(
            %color,
            updated = report.updated.len(),
            failed = report.failed.len(),
            "color assigned to selection"
        );
        report
    }

    fn show(&self, color: ColorLabel, visible: bool) {
        self.coordinator.set_visibility(color, visible);
        self.affordance(color).show(visible);
    }

    /// Forget every cached layer color, e.g. after the active document changed.
    pub fn reset(&self) {
        self.coordinator.reset();
        tracing::debug!("layer color cache cleared");
    }

    pub fn dispose(self) -> H {
        tracing::info!("layer color panel disposed");
        self.coordinator.dispose()
    }
}
