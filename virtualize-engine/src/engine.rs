use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use virtualize::{AnchorState, Dom, Edge, ScrollTarget, Sentinels, VirtualizeOptions};

use crate::bundle::ObserverBundle;
use crate::{HostHandle, IntersectionEntry, Observe, Result, VirtualizeError, VirtualizeHost};

/// The engine facade: one live instance per [`HostHandle`].
///
/// This type does not talk to any platform directly. Adapters drive it by:
/// - calling `initialize` / `set_sticky_bottom` / `dispose` on behalf of the host
/// - forwarding observer events (`on_scroll`, `on_intersection`, ...) tagged with the handle
/// - calling `tick(now_ms)` for timers and `animation_frame(now_ms)` once per frame
///
/// Events and calls for unknown handles are ignored.
pub struct Virtualize<D: Dom, O> {
    dom: D,
    observers: O,
    bundles: BTreeMap<HostHandle, ObserverBundle<D::Node>>,
}

impl<D, O> Virtualize<D, O>
where
    D: Dom,
    O: Observe<D::Node>,
{
    pub fn new(dom: D, observers: O) -> Self {
        Self {
            dom,
            observers,
            bundles: BTreeMap::new(),
        }
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn observers(&self) -> &O {
        &self.observers
    }

    pub fn observers_mut(&mut self) -> &mut O {
        &mut self.observers
    }

    pub fn into_parts(self) -> (D, O) {
        (self.dom, self.observers)
    }

    /// Starts an instance bracketed by `before`/`after`.
    ///
    /// Resolves the scroll container, disables native overflow anchoring on it, captures the
    /// initial anchor and subscribes every observer. A handle can only be initialized again
    /// after it was disposed.
    pub fn initialize(
        &mut self,
        handle: HostHandle,
        host: impl VirtualizeHost + 'static,
        before: D::Node,
        after: D::Node,
        options: VirtualizeOptions,
    ) -> Result<()> {
        if self.bundles.contains_key(&handle) {
            vwarn!(%handle, "initialize: handle already initialized");
            return Err(VirtualizeError::AlreadyInitialized(handle));
        }
        let bundle = ObserverBundle::attach(
            &mut self.dom,
            &mut self.observers,
            handle,
            Box::new(host),
            Sentinels::new(before, after),
            options,
        );
        self.bundles.insert(handle, bundle);
        Ok(())
    }

    pub fn set_sticky_bottom(&mut self, handle: HostHandle, enabled: bool) {
        if let Some(bundle) = self.bundles.get_mut(&handle) {
            vdebug!(%handle, enabled, "set_sticky_bottom");
            bundle.set_sticky_bottom(enabled);
        }
    }

    /// Disconnects every observer and releases the host. Safe to call repeatedly.
    pub fn dispose(&mut self, handle: HostHandle) {
        if let Some(bundle) = self.bundles.remove(&handle) {
            bundle.detach(&mut self.observers);
        }
    }

    pub fn is_initialized(&self, handle: HostHandle) -> bool {
        self.bundles.contains_key(&handle)
    }

    pub fn options(&self, handle: HostHandle) -> Option<&VirtualizeOptions> {
        self.bundles.get(&handle).map(ObserverBundle::options)
    }

    pub fn anchor_state(&self, handle: HostHandle) -> Option<&AnchorState> {
        self.bundles.get(&handle).map(ObserverBundle::anchor_state)
    }

    pub fn scroll_target(&self, handle: HostHandle) -> Option<&ScrollTarget<D::Node>> {
        self.bundles.get(&handle).map(ObserverBundle::scroll_target)
    }

    /// Whether the instance is itself moving the scroll position right now.
    pub fn is_adjusting(&self, handle: HostHandle) -> bool {
        self.bundles
            .get(&handle)
            .is_some_and(ObserverBundle::is_adjusting)
    }

    /// The scroll target scrolled (by the user or anyone else).
    pub fn on_scroll(&mut self, handle: HostHandle) {
        if let Some(bundle) = self.bundles.get_mut(&handle) {
            bundle.on_scroll(&self.dom);
        }
    }

    /// A batch of visibility changes for the sentinels.
    pub fn on_intersection(
        &mut self,
        handle: HostHandle,
        entries: Vec<IntersectionEntry<D::Node>>,
        now_ms: u64,
    ) {
        if let Some(bundle) = self.bundles.get_mut(&handle) {
            bundle.on_intersection(entries, now_ms);
        }
    }

    /// Attributes of a sentinel changed (typically its placeholder size).
    pub fn on_sentinel_attributes_changed(&mut self, handle: HostHandle, edge: Edge) {
        if let Some(bundle) = self.bundles.get_mut(&handle) {
            bundle.on_sentinel_attributes_changed(&mut self.dom, &mut self.observers, edge);
        }
    }

    /// One or more watched items changed size.
    pub fn on_items_resized(&mut self, handle: HostHandle, now_ms: u64) {
        if let Some(bundle) = self.bundles.get_mut(&handle) {
            bundle.on_items_resized(&mut self.dom, now_ms);
        }
    }

    /// The list container's children or subtree changed.
    pub fn on_subtree_mutated(&mut self, handle: HostHandle) {
        if let Some(bundle) = self.bundles.get_mut(&handle) {
            bundle.on_subtree_mutated();
        }
    }

    /// Fires due timers of every instance.
    pub fn tick(&mut self, now_ms: u64) {
        for bundle in self.bundles.values_mut() {
            bundle.tick(&mut self.dom, now_ms);
        }
    }

    /// Runs one animation frame for every instance.
    pub fn animation_frame(&mut self, now_ms: u64) {
        for bundle in self.bundles.values_mut() {
            bundle.animation_frame(&mut self.dom, &mut self.observers, now_ms);
        }
    }

    /// The earliest timer deadline across all instances.
    pub fn next_deadline(&self) -> Option<u64> {
        self.bundles
            .values()
            .filter_map(ObserverBundle::next_deadline)
            .min()
    }

    /// Whether any instance waits for an animation frame (e.g. a deferred mutation restore).
    pub fn has_pending_frames(&self) -> bool {
        self.bundles.values().any(ObserverBundle::has_pending_frames)
    }

    /// Whether a subtree mutation of this instance is waiting for layout to settle.
    pub fn is_mutation_pending(&self, handle: HostHandle) -> bool {
        self.bundles
            .get(&handle)
            .is_some_and(ObserverBundle::is_mutation_pending)
    }
}

impl<D, O> core::fmt::Debug for Virtualize<D, O>
where
    D: Dom,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let handles: Vec<_> = self.bundles.keys().copied().collect();
        f.debug_struct("Virtualize")
            .field("handles", &handles)
            .finish_non_exhaustive()
    }
}
