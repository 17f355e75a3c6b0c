pub mod cache;
pub mod color;
pub mod command;
pub mod coordinator;
pub mod host;
pub mod logging;
pub mod memory_host;
pub mod panel;
pub mod settings;
pub mod states;
pub mod toggle;
pub mod traverse;

pub use color::{ColorLabel, LayerColor};
pub use coordinator::Coordinator;
pub use host::{HostError, HostGateway, LayerId};
pub use panel::{Modifiers, Panel};
pub use settings::Settings;
