//! Seam between the panel and the editor that owns the document.
//!
//! The panel never creates or destroys layers. It reads metadata, flips the
//! visibility flag and sets the color label, always through [`HostGateway`].

use crate::color::ColorLabel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Session-stable layer identifier assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub u64);

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One node of the layer tree as the host exposes it.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerNode {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    pub children: Vec<LayerNode>,
}

impl LayerNode {
    /// A layer with children is a group and is never toggled directly.
    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Snapshot of the active document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub name: String,
    /// Top-level layers in document order.
    pub layers: Vec<LayerNode>,
    /// Currently selected layers.
    pub selection: Vec<LayerId>,
}

impl Document {
    /// Find a node anywhere in the tree.
    pub fn find(&self, id: LayerId) -> Option<&LayerNode> {
        let mut stack: Vec<&LayerNode> = self.layers.iter().rev().collect();
        while let Some(node) = stack.pop() {
            if node.id == id {
                return Some(node);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }
}

/// Result of a metadata query.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerMetadata {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    /// Raw color token. `None` when the host reports no color.
    pub color: Option<String>,
}

/// A single state change applied inside a host transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Visibility { layer: LayerId, visible: bool },
    Color { layer: LayerId, color: ColorLabel },
}

impl Mutation {
    pub fn layer(&self) -> LayerId {
        match self {
            Mutation::Visibility { layer, .. } | Mutation::Color { layer, .. } => *layer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("no active document")]
    NoDocument,
    #[error("metadata query for layer {layer} failed: {reason}")]
    Query { layer: LayerId, reason: String },
    #[error("host rejected change to layer {layer}: {reason}")]
    Rejected { layer: LayerId, reason: String },
    #[error("transaction '{label}' failed: {reason}")]
    Transaction { label: String, reason: String },
}

/// Handle passed to a transaction body.
pub trait Mutator {
    fn mutate(&mut self, mutation: Mutation) -> Result<(), HostError>;
}

/// Commands the hosting editor provides to the panel.
///
/// All futures run on the host's single cooperative thread, so none of them
/// need to be `Send`.
#[allow(async_fn_in_trait)]
pub trait HostGateway {
    fn active_document(&self) -> Option<Document>;

    /// Fetch metadata for one layer. May fail transiently.
    async fn query(&self, layer: LayerId) -> Result<LayerMetadata, HostError>;

    /// Run `body` exclusively against the document. The host applies every
    /// mutation the body made or none of them.
    async fn run_atomic(
        &self,
        label: &str,
        body: &mut (dyn FnMut(&mut dyn Mutator) + '_),
    ) -> Result<(), HostError>;

    /// Suspend the caller for `duration`.
    async fn delay(&self, duration: Duration);
}

impl<H: HostGateway> HostGateway for &H {
    fn active_document(&self) -> Option<Document> {
        (**self).active_document()
    }

    async fn query(&self, layer: LayerId) -> Result<LayerMetadata, HostError> {
        (**self).query(layer).await
    }

    async fn run_atomic(
        &self,
        label: &str,
        body: &mut (dyn FnMut(&mut dyn Mutator) + '_),
    ) -> Result<(), HostError> {
        (**self).run_atomic(label, body).await
    }

    async fn delay(&self, duration: Duration) {
        (**self).delay(duration).await
    }
}
