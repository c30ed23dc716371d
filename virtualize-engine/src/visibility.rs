use alloc::vec::Vec;
use core::{fmt, mem};

use virtualize::geometry::needs_table_row;
use virtualize::{Display, Dom, Edge, Sentinels, measure};

use crate::bundle::{TaskScheduler, TimerTask};
use crate::{HostHandle, IntersectionEntry, Observe, SentinelVisible, VirtualizeHost, Watch};

/// Turns sentinel visibility into host notifications, throttled on the trailing edge.
#[derive(Debug)]
pub(crate) struct VisibilityWatcher<N> {
    pending: Vec<IntersectionEntry<N>>,
    flush_scheduled: bool,
}

impl<N> Default for VisibilityWatcher<N> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            flush_scheduled: false,
        }
    }
}

impl<N: Clone + PartialEq + fmt::Debug> VisibilityWatcher<N> {
    /// Buffers the latest batch; only the last batch of a burst is processed.
    pub(crate) fn on_entries(
        &mut self,
        entries: Vec<IntersectionEntry<N>>,
        scheduler: &mut TaskScheduler,
        now_ms: u64,
        throttle_ms: u64,
    ) {
        self.pending = entries;
        if self.flush_scheduled {
            return;
        }
        self.flush_scheduled = true;
        scheduler.set_timeout(now_ms, throttle_ms, TimerTask::FlushVisibility);
    }

    /// Notifies the host for every intersecting sentinel in the buffered batch.
    pub(crate) fn flush<D: Dom<Node = N>>(
        &mut self,
        dom: &D,
        sentinels: &Sentinels<N>,
        host: &mut dyn VirtualizeHost,
    ) {
        self.flush_scheduled = false;
        for entry in mem::take(&mut self.pending) {
            if !entry.is_intersecting {
                continue;
            }
            let Some(edge) = sentinels.edge_of(&entry.target) else {
                vwarn!(node = ?entry.target, "flush: entry for an unknown element");
                continue;
            };
            // A collapsed trailing sentinel is not meaningfully visible.
            if edge == Edge::Trailing && dom.offset_height(&sentinels.after) <= 0.0 {
                continue;
            }

            let event = SentinelVisible {
                penetration_offset: match edge {
                    Edge::Leading => entry.intersection_rect.top - entry.bounding_rect.top,
                    Edge::Trailing => entry.bounding_rect.bottom - entry.intersection_rect.bottom,
                },
                gap_between_sentinels: dom.range_height(&sentinels.before, &sentinels.after),
                viewport_size: entry.root_bounds.map(|r| r.height()),
                measurements: measure(dom, sentinels).collect(),
            };
            vdebug!(
                ?edge,
                offset = event.penetration_offset,
                gap = event.gap_between_sentinels,
                items = event.measurements.len(),
                "sentinel visible"
            );
            match edge {
                Edge::Leading => host.on_leading_sentinel_visible(event),
                Edge::Trailing => host.on_trailing_sentinel_visible(event),
            }
        }
    }
}

/// Re-arms visibility for a sentinel whose attributes changed.
///
/// A resized placeholder does not always produce a fresh intersection event on its own.
pub(crate) fn rearm<D, O>(
    dom: &mut D,
    observers: &mut O,
    handle: HostHandle,
    edge: Edge,
    sentinel: &D::Node,
    root: Option<&D::Node>,
    root_margin: f64,
) where
    D: Dom,
    O: Observe<D::Node>,
{
    if needs_table_row(dom, sentinel) {
        // Restyling is itself an attribute change; keep it out of our own feed.
        observers.disconnect(handle, Watch::SentinelAttributes(edge));
        dom.set_display(sentinel, Display::TableRow);
        observers.observe_attributes(handle, edge, sentinel);
    }
    observers.unobserve_intersection(handle, sentinel);
    observers.observe_intersection(handle, sentinel, root, root_margin);
}
