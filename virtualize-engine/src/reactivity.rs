use alloc::vec::Vec;

use virtualize::{Dom, RenderedItems, Sentinels};

use crate::bundle::{FrameTask, TaskScheduler};
use crate::{HostHandle, Observe};

/// Tracks the double-frame deferral of subtree mutations.
#[derive(Debug, Default)]
pub(crate) struct ReactivityWatcher {
    mutation_pending: bool,
}

impl ReactivityWatcher {
    /// Schedules a restore two frames out unless one is pending or the tracker is adjusting.
    pub(crate) fn on_subtree_mutated(&mut self, adjusting: bool, scheduler: &mut TaskScheduler) {
        if adjusting || self.mutation_pending {
            return;
        }
        self.mutation_pending = true;
        scheduler.request_frame(FrameTask::MutationFirstFrame);
    }

    pub(crate) fn on_first_frame(&self, scheduler: &mut TaskScheduler) {
        scheduler.request_frame(FrameTask::MutationSecondFrame);
    }

    pub(crate) fn on_second_frame(&mut self) {
        self.mutation_pending = false;
    }

    pub(crate) fn is_mutation_pending(&self) -> bool {
        self.mutation_pending
    }
}

/// Points the size watch at exactly the items currently rendered.
pub(crate) fn watch_rendered_items<D, O>(
    dom: &D,
    observers: &mut O,
    handle: HostHandle,
    sentinels: &Sentinels<D::Node>,
) where
    D: Dom,
    O: Observe<D::Node>,
{
    let items: Vec<D::Node> = RenderedItems::new(dom, sentinels).collect();
    vtrace!(%handle, items = items.len(), "watch item sizes");
    observers.observe_item_sizes(handle, &items);
}
