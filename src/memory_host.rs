//! In-memory [`HostGateway`] over an owned layer tree.
//!
//! Every host call yields once before completing so concurrent callers
//! interleave the way they do against a real editor. Faults can be armed per
//! layer or per transaction label, and every committed transaction is kept in
//! a journal for inspection.

use crate::color::ColorLabel;
use crate::host::{
    Document, HostError, HostGateway, LayerId, LayerMetadata, LayerNode, Mutation, Mutator,
};
use futures::lock::Mutex;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

fn default_visible() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryLayer {
    pub id: LayerId,
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Host color token, `None` for no color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MemoryLayer>,
}

impl MemoryLayer {
    pub fn leaf(id: u64, name: &str, color: ColorLabel) -> Self {
        Self {
            id: LayerId(id),
            name: name.into(),
            visible: true,
            color: (!color.is_sentinel()).then(|| color.token().to_string()),
            children: Vec::new(),
        }
    }

    /// Leaf carrying a raw color token.
    pub fn with_token(id: u64, name: &str, token: &str) -> Self {
        Self {
            id: LayerId(id),
            name: name.into(),
            visible: true,
            color: Some(token.into()),
            children: Vec::new(),
        }
    }

    pub fn group(id: u64, name: &str, children: Vec<MemoryLayer>) -> Self {
        Self {
            id: LayerId(id),
            name: name.into(),
            visible: true,
            color: None,
            children,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    fn to_node(&self) -> LayerNode {
        LayerNode {
            id: self.id,
            name: self.name.clone(),
            visible: self.visible,
            children: self.children.iter().map(MemoryLayer::to_node).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryDocument {
    pub name: String,
    pub layers: Vec<MemoryLayer>,
    #[serde(default)]
    pub selection: Vec<LayerId>,
}

impl MemoryDocument {
    pub fn new(name: &str, layers: Vec<MemoryLayer>) -> Self {
        Self {
            name: name.into(),
            layers,
            selection: Vec::new(),
        }
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn find(&self, id: LayerId) -> Option<&MemoryLayer> {
        let mut stack: Vec<&MemoryLayer> = self.layers.iter().rev().collect();
        while let Some(layer) = stack.pop() {
            if layer.id == id {
                return Some(layer);
            }
            stack.extend(layer.children.iter().rev());
        }
        None
    }

    pub fn find_mut(&mut self, id: LayerId) -> Option<&mut MemoryLayer> {
        let mut stack: Vec<&mut MemoryLayer> = self.layers.iter_mut().rev().collect();
        while let Some(layer) = stack.pop() {
            if layer.id == id {
                return Some(layer);
            }
            stack.extend(layer.children.iter_mut().rev());
        }
        None
    }

    fn apply(&mut self, mutation: &Mutation) {
        let Some(layer) = self.find_mut(mutation.layer()) else {
            return;
        };
        match *mutation {
            Mutation::Visibility { visible, .. } => layer.visible = visible,
            Mutation::Color { color, .. } => {
                layer.color = (!color.is_sentinel()).then(|| color.token().to_string());
            }
        }
    }

    fn snapshot(&self) -> Document {
        Document {
            name: self.name.clone(),
            layers: self.layers.iter().map(MemoryLayer::to_node).collect(),
            selection: self.selection.clone(),
        }
    }
}

/// A committed host transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub label: String,
    pub mutations: Vec<Mutation>,
}

/// Completes on its second poll, waking itself in between.
pub struct YieldNow(bool);

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

pub fn yield_now() -> YieldNow {
    YieldNow(false)
}

struct Staging<'a> {
    doc: &'a MemoryDocument,
    rejected: &'a HashSet<LayerId>,
    staged: Vec<Mutation>,
}

impl Mutator for Staging<'_> {
    fn mutate(&mut self, mutation: Mutation) -> Result<(), HostError> {
        let layer = mutation.layer();
        if self.rejected.contains(&layer) {
            return Err(HostError::Rejected {
                layer,
                reason: "layer is locked".into(),
            });
        }
        if self.doc.find(layer).is_none() {
            return Err(HostError::Rejected {
                layer,
                reason: "no such layer".into(),
            });
        }
        self.staged.push(mutation);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    document: RefCell<Option<MemoryDocument>>,
    queries: RefCell<HashMap<LayerId, usize>>,
    query_faults: RefCell<HashMap<LayerId, usize>>,
    transaction_faults: RefCell<Vec<String>>,
    rejected: RefCell<HashSet<LayerId>>,
    journal: RefCell<Vec<TransactionRecord>>,
    delays: RefCell<Vec<Duration>>,
    transaction: Mutex<()>,
}

impl MemoryHost {
    pub fn new(document: MemoryDocument) -> Self {
        Self {
            document: RefCell::new(Some(document)),
            ..Self::default()
        }
    }

    /// A host with no open document.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn open(&self, document: MemoryDocument) {
        *self.document.borrow_mut() = Some(document);
    }

    pub fn close(&self) {
        *self.document.borrow_mut() = None;
    }

    pub fn document(&self) -> Option<MemoryDocument> {
        self.document.borrow().clone()
    }

    pub fn select(&self, layers: &[LayerId]) {
        if let Some(doc) = self.document.borrow_mut().as_mut() {
            doc.selection = layers.to_vec();
        }
    }

    pub fn layer(&self, id: LayerId) -> Option<MemoryLayer> {
        self.document.borrow().as_ref()?.find(id).cloned()
    }

    pub fn is_visible(&self, id: LayerId) -> Option<bool> {
        self.layer(id).map(|l| l.visible)
    }

    /// Change a layer's color outside the panel, as another tool would.
    pub fn recolor(&self, id: LayerId, token: Option<&str>) {
        if let Some(layer) = self
            .document
            .borrow_mut()
            .as_mut()
            .and_then(|d| d.find_mut(id))
        {
            layer.color = token.map(str::to_string);
        }
    }

    /// Make the next `count` queries for `layer` fail.
    pub fn fail_queries(&self, layer: LayerId, count: usize) {
        self.query_faults.borrow_mut().insert(layer, count);
    }

    /// Fail every transaction whose label contains `label`.
    pub fn fail_transactions(&self, label: &str) {
        self.transaction_faults.borrow_mut().push(label.into());
    }

    /// Reject every mutation targeting `layer`.
    pub fn reject_layer(&self, layer: LayerId) {
        self.rejected.borrow_mut().insert(layer);
    }

    pub fn query_count(&self, layer: LayerId) -> usize {
        self.queries.borrow().get(&layer).copied().unwrap_or(0)
    }

    pub fn total_queries(&self) -> usize {
        self.queries.borrow().values().sum()
    }

    pub fn transactions(&self) -> Vec<TransactionRecord> {
        self.journal.borrow().clone()
    }

    /// Committed transactions whose label contains `label`.
    pub fn transactions_labelled(&self, label: &str) -> Vec<TransactionRecord> {
        self.journal
            .borrow()
            .iter()
            .filter(|t| t.label.contains(label))
            .cloned()
            .collect()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.borrow().clone()
    }

    /// Whether a transaction currently holds the document.
    pub fn in_transaction(&self) -> bool {
        self.transaction.try_lock().is_none()
    }
}

impl HostGateway for MemoryHost {
    fn active_document(&self) -> Option<Document> {
        self.document.borrow().as_ref().map(MemoryDocument::snapshot)
    }

    async fn query(&self, layer: LayerId) -> Result<LayerMetadata, HostError> {
        yield_now().await;
        *self.queries.borrow_mut().entry(layer).or_insert(0) += 1;

        {
            let mut faults = self.query_faults.borrow_mut();
            if let Some(left) = faults.get_mut(&layer).filter(|n| **n > 0) {
                *left -= 1;
                return Err(HostError::Query {
                    layer,
                    reason: "host busy".into(),
                });
            }
        }

        let doc = self.document.borrow();
        let doc = doc.as_ref().ok_or(HostError::NoDocument)?;
        let found = doc.find(layer).ok_or_else(|| HostError::Query {
            layer,
            reason: "no such layer".into(),
        })?;
        Ok(LayerMetadata {
            id: found.id,
            name: found.name.clone(),
            visible: found.visible,
            color: found.color.clone(),
        })
    }

    async fn run_atomic(
        &self,
        label: &str,
        body: &mut (dyn FnMut(&mut dyn Mutator) + '_),
    ) -> Result<(), HostError> {
        let _held = self.transaction.lock().await;
        yield_now().await;
        self.commit(label, body)
    }

    async fn delay(&self, duration: Duration) {
        self.delays.borrow_mut().push(duration);
        yield_now().await;
    }
}

impl MemoryHost {
    fn commit(
        &self,
        label: &str,
        body: &mut (dyn FnMut(&mut dyn Mutator) + '_),
    ) -> Result<(), HostError> {
        let staged = {
            let doc = self.document.borrow();
            let doc = doc.as_ref().ok_or(HostError::NoDocument)?;
            let rejected = self.rejected.borrow();
            let mut staging = Staging {
                doc,
                rejected: &rejected,
                staged: Vec::new(),
            };
            body(&mut staging);
            staging.staged
        };

        if self
            .transaction_faults
            .borrow()
            .iter()
            .any(|f| label.contains(f.as_str()))
        {
            return Err(HostError::Transaction {
                label: label.into(),
                reason: "document is busy".into(),
            });
        }

        if let Some(doc) = self.document.borrow_mut().as_mut() {
            for mutation in &staged {
                doc.apply(mutation);
            }
        }
        self.journal.borrow_mut().push(TransactionRecord {
            label: label.into(),
            mutations: staged,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::task::noop_waker_ref;
    use futures::FutureExt;

    fn shadowed() -> MemoryDocument {
        // Id 7 appears twice; the group's child comes first in document order.
        MemoryDocument::new(
            "dup.psd",
            vec![
                MemoryLayer::group(1, "Group", vec![MemoryLayer::leaf(7, "Inner", ColorLabel::Red)]),
                MemoryLayer::leaf(7, "Outer", ColorLabel::Blue),
            ],
        )
    }

    #[test]
    fn find_walks_in_document_order() {
        let mut doc = shadowed();
        assert_eq!(doc.find(LayerId(7)).map(|l| l.name.as_str()), Some("Inner"));
        assert_eq!(doc.find_mut(LayerId(7)).map(|l| l.name.clone()), Some("Inner".into()));
        assert_eq!(
            doc.snapshot().find(LayerId(7)).map(|n| n.name.as_str()),
            Some("Inner")
        );
    }

    #[test]
    fn dropped_transaction_releases_the_document() {
        let host = MemoryHost::new(shadowed());
        let mut cx = Context::from_waker(noop_waker_ref());
        let mut body = |m: &mut dyn Mutator| {
            let _ = m.mutate(Mutation::Visibility { layer: LayerId(1), visible: false });
        };

        let mut tx = Box::pin(host.run_atomic("first", &mut body));
        assert!(tx.poll_unpin(&mut cx).is_pending());
        assert!(host.in_transaction());
        drop(tx);
        assert!(!host.in_transaction());

        let mut body = |m: &mut dyn Mutator| {
            let _ = m.mutate(Mutation::Visibility { layer: LayerId(1), visible: false });
        };
        assert!(futures::executor::block_on(host.run_atomic("second", &mut body)).is_ok());
        let labels: Vec<String> = host.transactions().into_iter().map(|t| t.label).collect();
        assert_eq!(labels, vec!["second".to_string()]);
        assert_eq!(host.is_visible(LayerId(1)), Some(false));
    }
}
