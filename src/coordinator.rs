//! Coalesces bursts of visibility requests into one host transaction per color.
//!
//! Requests land in a [`PendingRequests`] map keyed by color, so a newer
//! request for a color replaces the older one. A single drain loop, guarded by
//! [`RunFlag`], repeatedly takes the whole map and runs one full-tree toggle per
//! color concurrently on the current thread until the map stays empty.

use crate::cache::LayerColorCache;
use crate::color::ColorLabel;
use crate::host::HostGateway;
use crate::settings::{GroupColorPolicy, Settings};
use crate::states::{Affordance, ColorStates};
use crate::toggle::{self, AssignReport};
use futures::future::join_all;
use std::cell::{Cell, Ref, RefCell};
use std::collections::BTreeMap;
use std::future::Future;
use std::rc::Rc;

/// Desired end state for one color plus the element to roll back on failure.
#[derive(Clone)]
pub struct PendingRequest {
    pub visible: bool,
    pub affordance: Rc<dyn Affordance>,
}

impl std::fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequest")
            .field("visible", &self.visible)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct PendingRequests {
    entries: BTreeMap<ColorLabel, PendingRequest>,
}

impl PendingRequests {
    /// Record a request, replacing any pending one for the same color.
    /// Returns `true` when an older request was replaced.
    pub fn insert(&mut self, color: ColorLabel, request: PendingRequest) -> bool {
        self.entries.insert(color, request).is_some()
    }

    /// Remove and return every pending request.
    pub fn take(&mut self) -> Vec<(ColorLabel, PendingRequest)> {
        std::mem::take(&mut self.entries).into_iter().collect()
    }

    pub fn get(&self, color: ColorLabel) -> Option<&PendingRequest> {
        self.entries.get(&color)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Set while a drain loop is running.
#[derive(Debug, Default)]
pub struct RunFlag(Cell<bool>);

impl RunFlag {
    /// Claim the flag. `None` when another drain loop holds it.
    pub fn try_acquire(&self) -> Option<RunGuard<'_>> {
        if self.0.replace(true) {
            None
        } else {
            Some(RunGuard(self))
        }
    }

    pub fn is_set(&self) -> bool {
        self.0.get()
    }
}

/// Clears the [`RunFlag`] when dropped.
#[derive(Debug)]
pub struct RunGuard<'a>(&'a RunFlag);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0 .0.set(false);
    }
}

pub struct Coordinator<H> {
    host: H,
    cache: LayerColorCache,
    pending: RefCell<PendingRequests>,
    running: RunFlag,
    states: RefCell<ColorStates>,
    toggle_command_name: String,
    assign_command_name: String,
    group_color_policy: GroupColorPolicy,
}

impl<H: HostGateway> Coordinator<H> {
    pub fn new(host: H, settings: &Settings) -> Self {
        Self {
            host,
            cache: LayerColorCache::new(settings.retry_policy()),
            pending: RefCell::new(PendingRequests::default()),
            running: RunFlag::default(),
            states: RefCell::new(ColorStates::default()),
            toggle_command_name: settings.toggle_command_name.clone(),
            assign_command_name: settings.assign_command_name.clone(),
            group_color_policy: settings.group_color_policy,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn cache(&self) -> &LayerColorCache {
        &self.cache
    }

    pub fn states(&self) -> Ref<'_, ColorStates> {
        self.states.borrow()
    }

    pub fn set_visibility(&self, color: ColorLabel, visible: bool) {
        self.states.borrow_mut().set_visibility(color, visible);
    }

    pub fn is_draining(&self) -> bool {
        self.running.is_set()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Desired state currently queued for `color`, if any.
    pub fn pending_for(&self, color: ColorLabel) -> Option<bool> {
        self.pending.borrow().get(color).map(|r| r.visible)
    }

    /// Queue a request without starting a drain.
    pub fn submit(&self, color: ColorLabel, visible: bool, affordance: Rc<dyn Affordance>) {
        let replaced = self
            .pending
            .borrow_mut()
            .insert(color, PendingRequest { visible, affordance });
        tracing::debug!(%color, visible, replaced, "toggle request queued");
    }

    /// Queue a request and drain unless a drain is already running.
    ///
    /// The request is recorded before this returns, so requests issued before
    /// the returned future is first polled coalesce with it.
    pub fn request(
        &self,
        color: ColorLabel,
        visible: bool,
        affordance: Rc<dyn Affordance>,
    ) -> impl Future<Output = ()> + '_ {
        self.submit(color, visible, affordance);
        self.drain()
    }

    /// Process pending requests until none are left.
    ///
    /// Returns immediately when another drain loop is active; that loop picks
    /// up whatever is pending before it finishes.
    pub async fn drain(&self) {
        let Some(_guard) = self.running.try_acquire() else {
            tracing::trace!("drain already in progress");
            return;
        };

        let mut cycle = 0usize;
        loop {
            let batch = self.pending.borrow_mut().take();
            if batch.is_empty() {
                break;
            }
            cycle += 1;
            tracing::debug!(cycle, colors = batch.len(), "draining toggle requests");
            join_all(
                batch
                    .into_iter()
                    .map(|(color, request)| self.apply(color, request)),
            )
            .await;
        }
    }

    async fn apply(&self, color: ColorLabel, request: PendingRequest) {
        let result = toggle::toggle_layers_by_color(
            &self.host,
            &self.cache,
            &self.toggle_command_name,
            color,
            request.visible,
        )
        .await;
        if let Err(e) = result {
            tracing::error!(%color, visible = request.visible, error = %e, "toggle failed; rolling back");
            request.affordance.show(!request.visible);
            self.set_visibility(color, !request.visible);
        }
    }

    /// Set `color` on the current selection.
    pub async fn assign_color(&self, color: ColorLabel) -> AssignReport {
        toggle::assign_color(
            &self.host,
            &self.cache,
            &self.assign_command_name,
            self.group_color_policy,
            color,
        )
        .await
    }

    /// Drop every cached color.
    pub fn reset(&self) {
        self.cache.clear();
    }

    /// Release panel state. Pending requests are discarded.
    pub fn dispose(self) -> H {
        let dropped = self.pending.borrow().len();
        self.pending.borrow_mut().clear();
        self.cache.clear();
        tracing::debug!(dropped, "coordinator disposed");
        self.host
    }
}
