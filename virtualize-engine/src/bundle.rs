use alloc::boxed::Box;
use alloc::vec::Vec;

use virtualize::geometry::{find_scroll_container, is_table_like};
use virtualize::{
    AnchorState, Display, Dom, Edge, Restore, ScrollAnchorTracker, ScrollTarget, Sentinels,
    VirtualizeOptions,
};

use crate::reactivity::{ReactivityWatcher, watch_rendered_items};
use crate::scheduler::Scheduler;
use crate::visibility::{VisibilityWatcher, rearm};
use crate::{HostHandle, IntersectionEntry, Observe, VirtualizeHost, Watch};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TimerTask {
    /// Process the buffered visibility batch.
    FlushVisibility,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FrameTask {
    /// Restore+capture after the leading sentinel changed.
    LeadingSentinelCycle,
    MutationFirstFrame,
    /// Restore+capture after a subtree mutation, then re-watch item sizes.
    MutationSecondFrame,
}

pub(crate) type TaskScheduler = Scheduler<TimerTask, FrameTask>;

/// Everything one live instance owns: observers' state, the resolved scroll target, the anchor
/// tracker, its pending work and the host it reports to.
///
/// Dropping a bundle drops its pending timers and frames, so nothing runs against a disposed
/// instance.
pub(crate) struct ObserverBundle<N> {
    handle: HostHandle,
    host: Box<dyn VirtualizeHost>,
    sentinels: Sentinels<N>,
    container: Option<N>,
    scroll_target: ScrollTarget<N>,
    options: VirtualizeOptions,
    tracker: ScrollAnchorTracker,
    visibility: VisibilityWatcher<N>,
    reactivity: ReactivityWatcher,
    scheduler: TaskScheduler,
}

impl<N: Clone + PartialEq + core::fmt::Debug> ObserverBundle<N> {
    pub(crate) fn attach<D, O>(
        dom: &mut D,
        observers: &mut O,
        handle: HostHandle,
        host: Box<dyn VirtualizeHost>,
        sentinels: Sentinels<N>,
        options: VirtualizeOptions,
    ) -> Self
    where
        D: Dom<Node = N>,
        O: Observe<N>,
    {
        let container = find_scroll_container(dom, &sentinels.before);
        let scroll_target = ScrollTarget::from_container(container.clone());
        dom.disable_overflow_anchor(&scroll_target);

        let table_parent = dom.parent_element(&sentinels.after);
        if is_table_like(dom, table_parent.as_ref()) {
            dom.set_display(&sentinels.before, Display::TableRow);
            dom.set_display(&sentinels.after, Display::TableRow);
        }

        let mut tracker = ScrollAnchorTracker::new(options.thresholds, options.timings);
        tracker.capture(dom, &scroll_target, &sentinels);

        observers.listen_scroll(handle, &scroll_target);
        watch_rendered_items(dom, observers, handle, &sentinels);
        if let Some(list) = dom.parent_element(&sentinels.before) {
            observers.observe_subtree(handle, &list);
        }
        for edge in [Edge::Leading, Edge::Trailing] {
            let sentinel = sentinels.get(edge);
            observers.observe_intersection(handle, sentinel, container.as_ref(), options.root_margin);
        }
        for edge in [Edge::Leading, Edge::Trailing] {
            observers.observe_attributes(handle, edge, sentinels.get(edge));
        }

        vdebug!(
            %handle,
            document_scroll = container.is_none(),
            root_margin = options.root_margin,
            sticky_bottom = options.sticky_bottom,
            "attach"
        );
        Self {
            handle,
            host,
            sentinels,
            container,
            scroll_target,
            options,
            tracker,
            visibility: VisibilityWatcher::default(),
            reactivity: ReactivityWatcher::default(),
            scheduler: TaskScheduler::default(),
        }
    }

    pub(crate) fn detach<O: Observe<N>>(self, observers: &mut O) {
        for watch in Watch::ALL {
            observers.disconnect(self.handle, watch);
        }
        vdebug!(handle = %self.handle, "detach");
    }

    pub(crate) fn set_sticky_bottom(&mut self, enabled: bool) {
        self.options.sticky_bottom = enabled;
    }

    pub(crate) fn options(&self) -> &VirtualizeOptions {
        &self.options
    }

    pub(crate) fn anchor_state(&self) -> &AnchorState {
        self.tracker.state()
    }

    pub(crate) fn is_adjusting(&self) -> bool {
        self.tracker.is_adjusting()
    }

    pub(crate) fn scroll_target(&self) -> &ScrollTarget<N> {
        &self.scroll_target
    }

    fn update_anchor<D: Dom<Node = N>>(&mut self, dom: &mut D, now_ms: u64) -> Restore {
        let restored = self.tracker.update(
            dom,
            &self.scroll_target,
            &self.sentinels,
            self.options.sticky_bottom,
            now_ms,
        );
        vtrace!(handle = %self.handle, ?restored, "anchor cycle");
        restored
    }

    pub(crate) fn on_scroll<D: Dom<Node = N>>(&mut self, dom: &D) {
        if self.tracker.is_adjusting() {
            return;
        }
        self.tracker.capture(dom, &self.scroll_target, &self.sentinels);
    }

    pub(crate) fn on_items_resized<D: Dom<Node = N>>(&mut self, dom: &mut D, now_ms: u64) {
        if self.tracker.is_adjusting() {
            return;
        }
        self.update_anchor(dom, now_ms);
    }

    pub(crate) fn on_subtree_mutated(&mut self) {
        let adjusting = self.tracker.is_adjusting();
        self.reactivity
            .on_subtree_mutated(adjusting, &mut self.scheduler);
    }

    pub(crate) fn on_intersection(&mut self, entries: Vec<IntersectionEntry<N>>, now_ms: u64) {
        let throttle_ms = self.options.timings.visibility_throttle_ms;
        self.visibility
            .on_entries(entries, &mut self.scheduler, now_ms, throttle_ms);
    }

    pub(crate) fn on_sentinel_attributes_changed<D, O>(
        &mut self,
        dom: &mut D,
        observers: &mut O,
        edge: Edge,
    ) where
        D: Dom<Node = N>,
        O: Observe<N>,
    {
        rearm(
            dom,
            observers,
            self.handle,
            edge,
            self.sentinels.get(edge),
            self.container.as_ref(),
            self.options.root_margin,
        );
        if edge == Edge::Leading && !self.tracker.is_adjusting() {
            self.scheduler.request_frame(FrameTask::LeadingSentinelCycle);
        }
    }

    /// Runs the frame callbacks requested before this frame.
    pub(crate) fn animation_frame<D, O>(&mut self, dom: &mut D, observers: &mut O, now_ms: u64)
    where
        D: Dom<Node = N>,
        O: Observe<N>,
    {
        for task in self.scheduler.take_frame() {
            match task {
                FrameTask::LeadingSentinelCycle => {
                    self.update_anchor(dom, now_ms);
                }
                FrameTask::MutationFirstFrame => self.reactivity.on_first_frame(&mut self.scheduler),
                FrameTask::MutationSecondFrame => {
                    self.reactivity.on_second_frame();
                    if self.tracker.is_adjusting() {
                        continue;
                    }
                    self.update_anchor(dom, now_ms);
                    watch_rendered_items(dom, observers, self.handle, &self.sentinels);
                }
            }
        }
    }

    /// Fires due timers and advances the tracker's adjusting phase.
    pub(crate) fn tick<D: Dom<Node = N>>(&mut self, dom: &mut D, now_ms: u64) {
        self.tracker.tick(dom, &self.scroll_target, now_ms);
        for task in self.scheduler.take_due(now_ms) {
            match task {
                TimerTask::FlushVisibility => {
                    self.visibility
                        .flush(dom, &self.sentinels, self.host.as_mut());
                }
            }
        }
    }

    pub(crate) fn next_deadline(&self) -> Option<u64> {
        match (self.tracker.next_deadline(), self.scheduler.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub(crate) fn has_pending_frames(&self) -> bool {
        self.scheduler.has_frames()
    }

    pub(crate) fn is_mutation_pending(&self) -> bool {
        self.reactivity.is_mutation_pending()
    }
}
