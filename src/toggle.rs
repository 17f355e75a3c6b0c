//! Host operations issued by the panel: the per-color visibility toggle and
//! color assignment to the selection.

use crate::cache::LayerColorCache;
use crate::color::{ColorLabel, LayerColor};
use crate::host::{Document, HostError, HostGateway, LayerId, Mutation, Mutator};
use crate::settings::GroupColorPolicy;
use crate::traverse::{leaves, Leaves};

/// Outcome of one full-tree toggle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ToggleReport {
    /// Leaves whose color matched the request.
    pub matched: usize,
    /// Leaves the host accepted the visibility change for.
    pub applied: usize,
    /// Leaves skipped because their color was unknown or the change was rejected.
    pub skipped: usize,
}

/// Show or hide every leaf layer labelled `color`.
///
/// Matching leaves are changed inside a single host transaction. Per-leaf
/// failures are logged and skipped; only a failure of the transaction itself
/// is returned.
pub async fn toggle_layers_by_color<H: HostGateway>(
    host: &H,
    cache: &LayerColorCache,
    command_name: &str,
    color: ColorLabel,
    visible: bool,
) -> Result<ToggleReport, HostError> {
    let Some(doc) = host.active_document() else {
        tracing::info!(%color, "no active document; toggle skipped");
        return Ok(ToggleReport::default());
    };

    let mut report = ToggleReport::default();
    let mut targets: Vec<LayerId> = Vec::new();
    for leaf in leaves(&doc) {
        cache.invalidate(leaf.id);
        match cache.get_color(host, leaf.id).await {
            Some(found) if color.matches(&found) => targets.push(leaf.id),
            Some(_) => {}
            None => {
                tracing::debug!(layer = %leaf.id, name = %leaf.name, "skipping leaf with unknown color");
                report.skipped += 1;
            }
        }
    }
    report.matched = targets.len();

    let label = format!("{command_name}: {color}");
    let mut applied = 0;
    let mut rejected = 0;
    host.run_atomic(&label, &mut |tx: &mut dyn Mutator| {
        applied = 0;
        rejected = 0;
        for &layer in &targets {
            match tx.mutate(Mutation::Visibility { layer, visible }) {
                Ok(()) => applied += 1,
                Err(e) => {
                    tracing::error!(%layer, error = %e, "failed to change layer visibility");
                    rejected += 1;
                }
            }
        }
    })
    .await?;

    report.applied = applied;
    report.skipped += rejected;
    tracing::debug!(
        %color,
        visible,
        matched = report.matched,
        applied = report.applied,
        "visibility toggled"
    );
    Ok(report)
}

/// Outcome of a color assignment.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AssignReport {
    pub updated: Vec<LayerId>,
    pub failed: Vec<LayerId>,
}

/// Set `color` on every selected layer, each in its own host transaction.
pub async fn assign_color<H: HostGateway>(
    host: &H,
    cache: &LayerColorCache,
    command_name: &str,
    policy: GroupColorPolicy,
    color: ColorLabel,
) -> AssignReport {
    let mut report = AssignReport::default();
    let Some(doc) = host.active_document() else {
        tracing::info!(%color, "no active document; color assignment skipped");
        return report;
    };
    if doc.selection.is_empty() {
        tracing::info!(%color, "no layers selected; color assignment skipped");
        return report;
    }

    let label = format!("{command_name}: {color}");
    for layer in assignment_targets(&doc, policy) {
        let mut accepted = false;
        let result = host
            .run_atomic(&label, &mut |tx: &mut dyn Mutator| {
                accepted = match tx.mutate(Mutation::Color { layer, color }) {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::error!(%layer, error = %e, "failed to set layer color");
                        false
                    }
                };
            })
            .await;
        match result {
            Ok(()) if accepted => {
                cache.store(layer, LayerColor::assigned(color));
                report.updated.push(layer);
            }
            Ok(()) => {
                cache.invalidate(layer);
                report.failed.push(layer);
            }
            Err(e) => {
                tracing::error!(%layer, error = %e, "color assignment transaction failed");
                cache.invalidate(layer);
                report.failed.push(layer);
            }
        }
    }
    report
}

/// Layers a color assignment touches under `policy`, without duplicates.
pub fn assignment_targets(doc: &Document, policy: GroupColorPolicy) -> Vec<LayerId> {
    let mut targets: Vec<LayerId> = Vec::new();
    let mut push = |id: LayerId| {
        if !targets.contains(&id) {
            targets.push(id);
        }
    };
    for &id in &doc.selection {
        push(id);
        if policy == GroupColorPolicy::Descendants {
            if let Some(node) = doc.find(id).filter(|n| n.is_group()) {
                for leaf in Leaves::new(&node.children) {
                    push(leaf.id);
                }
            }
        }
    }
    targets
}
