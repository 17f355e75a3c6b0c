use crate::color::LayerColor;
use crate::host::{HostGateway, LayerId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

/// Bounded retry for host metadata queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(100),
        }
    }
}

/// Memoized layer colors keyed by layer id.
///
/// An absent entry means the color is unknown and must be queried. A stored
/// [`LayerColor::Unset`] is a known "no color" result.
#[derive(Debug, Default)]
pub struct LayerColorCache {
    colors: RefCell<HashMap<LayerId, LayerColor>>,
    retry: RetryPolicy,
}

impl LayerColorCache {
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            colors: RefCell::new(HashMap::new()),
            retry,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Color of `layer`, querying the host when it is not cached.
    ///
    /// Returns `None` when the host query keeps failing. Callers must treat
    /// that as unknown, never as "no color".
    pub async fn get_color<H: HostGateway>(&self, host: &H, layer: LayerId) -> Option<LayerColor> {
        if let Some(color) = self.peek(layer) {
            return Some(color);
        }

        let attempts = self.retry.attempts.max(1);
        let mut attempt = 1;
        let metadata = loop {
            match host.query(layer).await {
                Ok(meta) => break meta,
                Err(e) if attempt < attempts => {
                    tracing::debug!(%layer, attempt, error = %e, "layer query failed; retrying");
                    attempt += 1;
                    host.delay(self.retry.backoff).await;
                }
                Err(e) => {
                    tracing::warn!(%layer, attempts, error = %e, "color lookup failed");
                    return None;
                }
            }
        };

        let color = LayerColor::from_metadata(metadata.color.as_deref());
        self.colors.borrow_mut().insert(layer, color.clone());
        Some(color)
    }

    /// Cached color without touching the host.
    pub fn peek(&self, layer: LayerId) -> Option<LayerColor> {
        self.colors.borrow().get(&layer).cloned()
    }

    pub fn store(&self, layer: LayerId, color: LayerColor) {
        self.colors.borrow_mut().insert(layer, color);
    }

    pub fn invalidate(&self, layer: LayerId) {
        self.colors.borrow_mut().remove(&layer);
    }

    pub fn clear(&self) {
        self.colors.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.colors.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.borrow().is_empty()
    }
}
