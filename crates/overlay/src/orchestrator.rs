//! # Overlay Orchestrator
//!
//! Owns the overlay stack and the per-kind presentation defaults. Every
//! public call becomes a [`PendingCall`]; before a render target is attached
//! calls wait in a FIFO queue, afterwards they execute immediately.
//!
//! State sits behind one short mutex. It is never held across an await or
//! while user callbacks run: callbacks and timer spawns are collected as
//! effects and run after the lock is released, so they may call back in.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::OverlayConfig;
use crate::error::{OverlayError, OverlayResult};
use crate::kind::{OverlayId, OverlayKind};
use crate::options::{
    Callback, DrawerOptions, ModalOptions, OverlayOptions, OverlayRequest, ToastOptions,
};
use crate::presentation::{Presentation, PresentationUpdate, StyleMap};
use crate::target::{OverlayView, RenderTarget};

/// Read-only view of one active overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlaySummary {
    pub id: OverlayId,
    pub kind: OverlayKind,
    pub tag: Option<String>,
}

enum PendingCall<C> {
    Show(OverlayId, OverlayRequest<C>),
    Hide(Option<OverlayId>),
    HideLatest(OverlayKind),
    HideAll,
    HideKind(OverlayKind),
    Complete(OverlayId),
    Configure(OverlayKind, PresentationUpdate),
    MaskClicked,
}

enum Effect {
    Run(Callback),
    Expire(OverlayId, Duration),
}

struct Entry {
    id: OverlayId,
    options: OverlayOptions,
    presentation: Arc<Presentation>,
    /// Show order; a replacement counts as a fresh show
    shown: u64,
}

impl Entry {
    fn kind(&self) -> OverlayKind {
        self.options.kind()
    }

    fn summary(&self) -> OverlaySummary {
        OverlaySummary {
            id: self.id,
            kind: self.kind(),
            tag: self.options.tag().map(str::to_owned),
        }
    }
}

struct State<C> {
    stack: Vec<Entry>,
    pending: VecDeque<PendingCall<C>>,
    target: Option<Box<dyn RenderTarget<C>>>,
    modal: Arc<Presentation>,
    drawer: Arc<Presentation>,
    toast: Arc<Presentation>,
    toast_duration: Duration,
    shows: u64,
}

struct Inner<C> {
    state: Mutex<State<C>>,
    ready: watch::Sender<bool>,
    next_id: AtomicU64,
}

/// Cloneable handle to the overlay registry
pub struct Overlays<C> {
    inner: Arc<Inner<C>>,
}

impl<C> Clone for Overlays<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C: Send + 'static> Default for Overlays<C> {
    fn default() -> Self {
        Self::new(OverlayConfig::default())
    }
}

impl<C: Send + 'static> Overlays<C> {
    pub fn new(config: OverlayConfig) -> Self {
        let (ready, _) = watch::channel(false);
        let state = State {
            stack: Vec::new(),
            pending: VecDeque::new(),
            target: None,
            modal: Arc::new(config.modal.clone()),
            drawer: Arc::new(config.drawer.clone()),
            toast: Arc::new(config.toast.clone()),
            toast_duration: config.toast_duration(),
            shows: 0,
        };

        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                ready,
                next_id: AtomicU64::new(1),
            }),
        }
    }

    // ------------------------------------------------------------------
    // Readiness
    // ------------------------------------------------------------------

    /// Attach the render target and replay every queued call in order.
    ///
    /// Resolves readiness exactly once. If replayed calls fail to render,
    /// the whole queue is still replayed and the first failure is returned.
    pub fn attach(&self, target: Box<dyn RenderTarget<C>>) -> OverlayResult<()> {
        let mut effects = Vec::new();
        let mut first_error = None;

        {
            let mut state = self.lock();
            if state.target.is_some() {
                return Err(OverlayError::AlreadyAttached);
            }
            state.target = Some(target);

            let queued = state.pending.len();
            while let Some(call) = state.pending.pop_front() {
                if let Err(e) = state.execute(call, &mut effects) {
                    first_error.get_or_insert(e);
                }
            }
            info!(queued, "Render target attached");

            // Flip readiness while still locked so no call can slip into
            // the queue after it has been drained
            self.inner.ready.send_replace(true);
        }

        self.run_effects(effects);
        first_error.map_or(Ok(()), Err)
    }

    pub fn is_ready(&self) -> bool {
        *self.inner.ready.borrow()
    }

    /// Wait until a render target has been attached
    pub async fn ready(&self) {
        let mut rx = self.inner.ready.subscribe();
        // The sender lives as long as `self`, so this cannot fail
        let _ = rx.wait_for(|ready| *ready).await;
    }

    // ------------------------------------------------------------------
    // Overlay operations
    // ------------------------------------------------------------------

    /// Register an overlay and return its id.
    ///
    /// The id is allocated immediately, even when the call is queued. A
    /// unique request replaces the active overlay of its kind with the same
    /// tag in place, and a drawer always replaces the active drawer; the
    /// new id takes over that stack position.
    pub fn show(&self, request: OverlayRequest<C>) -> OverlayResult<OverlayId> {
        let id = OverlayId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.submit(PendingCall::Show(id, request))?;
        Ok(id)
    }

    pub fn show_modal(&self, content: C, options: ModalOptions) -> OverlayResult<OverlayId> {
        self.show(OverlayRequest::modal(content, options))
    }

    pub fn show_drawer(&self, content: C, options: DrawerOptions) -> OverlayResult<OverlayId> {
        self.show(OverlayRequest::drawer(content, options))
    }

    pub fn show_toast(&self, content: C, options: ToastOptions) -> OverlayResult<OverlayId> {
        self.show(OverlayRequest::toast(content, options))
    }

    /// Hide an overlay, or the most recently shown one when `id` is `None`.
    /// An overlay replaced in place counts as shown at replacement time,
    /// even though it keeps its lower stack position. Hiding something
    /// already gone is a no-op.
    pub fn hide(&self, id: Option<OverlayId>) {
        self.submit_infallible(PendingCall::Hide(id));
    }

    /// Hide the most recently shown overlay of one kind
    pub fn hide_latest(&self, kind: OverlayKind) {
        self.submit_infallible(PendingCall::HideLatest(kind));
    }

    pub fn hide_all(&self) {
        self.submit_infallible(PendingCall::HideAll);
    }

    pub fn hide_kind(&self, kind: OverlayKind) {
        self.submit_infallible(PendingCall::HideKind(kind));
    }

    /// Fire the overlay's `on_success` callback and hide it
    pub fn complete(&self, id: OverlayId) {
        self.submit_infallible(PendingCall::Complete(id));
    }

    /// Hide the topmost overlay if its presentation allows mask dismissal
    pub fn mask_clicked(&self) {
        self.submit_infallible(PendingCall::MaskClicked);
    }

    // ------------------------------------------------------------------
    // Presentation defaults
    // ------------------------------------------------------------------

    pub fn configure(&self, kind: OverlayKind, update: PresentationUpdate) {
        self.submit_infallible(PendingCall::Configure(kind, update));
    }

    pub fn set_mask_style(&self, kind: OverlayKind, style: StyleMap) {
        self.configure(kind, PresentationUpdate::MaskStyle(style));
    }

    pub fn set_mask_class_name(&self, kind: OverlayKind, class_name: Option<String>) {
        self.configure(kind, PresentationUpdate::MaskClassName(class_name));
    }

    pub fn set_mask_closable(&self, kind: OverlayKind, closable: bool) {
        self.configure(kind, PresentationUpdate::MaskClosable(closable));
    }

    pub fn set_list_style(&self, kind: OverlayKind, style: StyleMap) {
        self.configure(kind, PresentationUpdate::ListStyle(style));
    }

    pub fn set_list_class_name(&self, kind: OverlayKind, class_name: Option<String>) {
        self.configure(kind, PresentationUpdate::ListClassName(class_name));
    }

    pub fn set_item_wrapper_style(&self, kind: OverlayKind, style: StyleMap) {
        self.configure(kind, PresentationUpdate::ItemWrapperStyle(style));
    }

    pub fn set_item_wrapper_class_name(&self, kind: OverlayKind, class_name: Option<String>) {
        self.configure(kind, PresentationUpdate::ItemWrapperClassName(class_name));
    }

    pub fn set_animated_size(&self, kind: OverlayKind, animated: bool) {
        self.configure(kind, PresentationUpdate::AnimatedSize(animated));
    }

    /// Current defaults for a kind, as the next `show` would snapshot them
    pub fn presentation(&self, kind: OverlayKind) -> Presentation {
        self.lock().presentation_mut(kind).as_ref().clone()
    }

    // ------------------------------------------------------------------
    // Read-only views
    // ------------------------------------------------------------------

    /// Active overlays, bottom to top
    pub fn snapshot(&self) -> Vec<OverlaySummary> {
        self.lock().stack.iter().map(Entry::summary).collect()
    }

    /// Active overlays of one kind, bottom to top
    pub fn active(&self, kind: OverlayKind) -> Vec<OverlaySummary> {
        self.lock()
            .stack
            .iter()
            .filter(|entry| entry.kind() == kind)
            .map(Entry::summary)
            .collect()
    }

    pub fn contains(&self, id: OverlayId) -> bool {
        self.lock().stack.iter().any(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.lock().stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().stack.is_empty()
    }

    /// Calls waiting for a render target
    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, State<C>> {
        // A panicking render target must not wedge every later caller
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn submit(&self, call: PendingCall<C>) -> OverlayResult<()> {
        let mut effects = Vec::new();
        let result = {
            let mut state = self.lock();
            if state.target.is_none() {
                debug!("Render target not ready, queueing overlay call");
                state.pending.push_back(call);
                return Ok(());
            }
            state.execute(call, &mut effects)
        };

        self.run_effects(effects);
        result
    }

    fn submit_infallible(&self, call: PendingCall<C>) {
        // Only `Show` can fail to render
        if let Err(e) = self.submit(call) {
            warn!("Unexpected overlay failure: {}", e);
        }
    }

    fn run_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Run(callback) => callback(),
                Effect::Expire(id, after) => self.schedule_expiry(id, after),
            }
        }
    }

    fn schedule_expiry(&self, id: OverlayId, after: Duration) {
        let Ok(handle) = Handle::try_current() else {
            warn!(%id, "No tokio runtime, toast will not expire on its own");
            return;
        };

        let inner: Weak<Inner<C>> = Arc::downgrade(&self.inner);
        handle.spawn(async move {
            tokio::time::sleep(after).await;
            if let Some(inner) = inner.upgrade() {
                debug!(%id, "Toast expired");
                Overlays { inner }.hide(Some(id));
            }
        });
    }
}

impl<C> State<C> {
    fn presentation_mut(&mut self, kind: OverlayKind) -> &mut Arc<Presentation> {
        match kind {
            OverlayKind::Modal => &mut self.modal,
            OverlayKind::Drawer => &mut self.drawer,
            OverlayKind::Toast => &mut self.toast,
        }
    }

    fn execute(&mut self, call: PendingCall<C>, effects: &mut Vec<Effect>) -> OverlayResult<()> {
        match call {
            PendingCall::Show(id, request) => return self.show(id, request, effects),
            PendingCall::Hide(id) => {
                let index = match id {
                    Some(id) => self.stack.iter().position(|entry| entry.id == id),
                    None => self.latest(|_| true),
                };
                self.close(index, effects);
            }
            PendingCall::HideLatest(kind) => {
                let index = self.latest(|entry| entry.kind() == kind);
                self.close(index, effects);
            }
            PendingCall::HideAll => {
                while !self.stack.is_empty() {
                    self.close(Some(self.stack.len() - 1), effects);
                }
            }
            PendingCall::HideKind(kind) => {
                while let Some(index) = self.stack.iter().rposition(|entry| entry.kind() == kind) {
                    self.close(Some(index), effects);
                }
            }
            PendingCall::Complete(id) => {
                if let Some(index) = self.stack.iter().position(|entry| entry.id == id) {
                    let entry = self.remove(index);
                    if let Some(on_success) = entry.options.hooks().on_success.clone() {
                        effects.push(Effect::Run(on_success));
                    }
                }
            }
            PendingCall::Configure(kind, update) => {
                // Entries shown earlier share the old Arc and keep their snapshot
                Arc::make_mut(self.presentation_mut(kind)).apply(update);
            }
            PendingCall::MaskClicked => {
                let closable = self
                    .stack
                    .last()
                    .is_some_and(|entry| entry.presentation.mask_closable);
                if closable {
                    self.close(self.stack.len().checked_sub(1), effects);
                }
            }
        }
        Ok(())
    }

    fn show(
        &mut self,
        id: OverlayId,
        request: OverlayRequest<C>,
        effects: &mut Vec<Effect>,
    ) -> OverlayResult<()> {
        let OverlayRequest { content, options } = request;
        let kind = options.kind();
        let presentation = self.presentation_mut(kind).clone();

        let replace_at = if options.unique() {
            self.stack
                .iter()
                .position(|entry| entry.kind() == kind && entry.options.tag() == options.tag())
        } else {
            None
        };

        let Some(target) = self.target.as_mut() else {
            // execute only runs once a target is attached
            return Ok(());
        };
        self.shows += 1;
        let shown = self.shows;

        let view = OverlayView {
            id,
            content,
            options: &options,
            presentation: &presentation,
        };

        match replace_at {
            Some(index) => {
                let previous = self.stack[index].id;
                if let Err(e) = target.replace(previous, view) {
                    warn!(%id, %previous, "Overlay replacement failed to render: {}", e);
                    // The old overlay is gone from screen, so it closes
                    self.close(Some(index), effects);
                    return Err(OverlayError::ContentRenderFailure {
                        id,
                        reason: e.to_string(),
                    });
                }
                debug!(%id, %previous, %kind, "Overlay replaced in place");
                self.stack[index] = Entry {
                    id,
                    options,
                    presentation,
                    shown,
                };
            }
            None => {
                if let Err(e) = target.mount(view) {
                    warn!(%id, %kind, "Overlay failed to render: {}", e);
                    return Err(OverlayError::ContentRenderFailure {
                        id,
                        reason: e.to_string(),
                    });
                }
                debug!(%id, %kind, "Overlay shown");
                self.stack.push(Entry {
                    id,
                    options,
                    presentation,
                    shown,
                });
            }
        }

        if let Some(entry) = self.stack.iter().find(|entry| entry.id == id) {
            if let OverlayOptions::Toast(toast) = &entry.options {
                let after = toast.duration.unwrap_or(self.toast_duration);
                if !after.is_zero() {
                    effects.push(Effect::Expire(id, after));
                }
            }
        }

        Ok(())
    }

    /// Index of the most recently shown entry matching `filter`
    fn latest(&self, filter: impl Fn(&Entry) -> bool) -> Option<usize> {
        self.stack
            .iter()
            .enumerate()
            .filter(|(_, entry)| filter(entry))
            .max_by_key(|(_, entry)| entry.shown)
            .map(|(index, _)| index)
    }

    /// Remove the overlay at `index`, if any, and queue its `on_close`
    fn close(&mut self, index: Option<usize>, effects: &mut Vec<Effect>) {
        let Some(index) = index else {
            return;
        };
        let entry = self.remove(index);
        if let Some(on_close) = entry.options.hooks().on_close.clone() {
            effects.push(Effect::Run(on_close));
        }
    }

    fn remove(&mut self, index: usize) -> Entry {
        let entry = self.stack.remove(index);
        if let Some(target) = self.target.as_mut() {
            target.unmount(entry.id);
        }
        debug!(id = %entry.id, kind = %entry.kind(), "Overlay hidden");
        entry
    }
}
