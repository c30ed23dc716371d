use alloc::string::String;

use crate::geometry::container_rect;
use crate::measure::{ITEM_INDEX_ATTRIBUTE, RenderedItems, find_item};
use crate::{AnchorThresholds, Dom, ScrollTarget, Sentinels, Timings};

/// The last captured scroll position, expressed relative to an item rather than in pixels.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnchorState {
    /// `data-index` of the topmost (at least partially) visible item.
    pub anchor_index: Option<String>,
    /// Distance from the anchor's top edge to the viewport's top edge.
    pub anchor_offset: f64,
    pub scroll_height: f64,
    pub was_at_bottom: bool,
}

impl AnchorState {
    fn clear_anchor(&mut self) {
        self.anchor_index = None;
        self.anchor_offset = 0.0;
    }
}

/// Whether the tracker is itself moving the scroll position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Adjusting(Settle),
}

/// What ends the current `Adjusting` phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Settle {
    /// A stick-to-bottom write, re-checked at `at_ms` for height rendered as a side effect.
    Recheck { at_ms: u64 },
    /// Back to `Idle` at `at_ms`.
    Release { at_ms: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriftCause {
    /// Large content growth while the anchor moved down: items were prepended.
    InsertedAbove,
    /// The anchor moved without net growth: an item changed its own size.
    ItemResized,
}

/// Result of [`ScrollAnchorTracker::restore`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Restore {
    /// The tracker was adjusting; the attempt was dropped.
    Suppressed,
    StuckToBottom { scroll_top: f64 },
    Compensated { delta: f64, cause: DriftCause },
    NoAnchor,
    /// The anchor item is no longer rendered.
    AnchorLost,
    WithinNoise,
    /// The drift matched neither cause and was left alone.
    Ambiguous { delta: f64 },
}

/// Keeps the user's visual position stable across mutations above or inside the viewport.
///
/// Drive it with [`Self::update`] whenever the list may have changed, [`Self::capture`] on user
/// scrolls, and [`Self::tick`] from the timer loop so adjusting phases settle.
#[derive(Clone, Debug, Default)]
pub struct ScrollAnchorTracker {
    state: AnchorState,
    phase: Phase,
    thresholds: AnchorThresholds,
    timings: Timings,
}

impl ScrollAnchorTracker {
    pub fn new(thresholds: AnchorThresholds, timings: Timings) -> Self {
        Self {
            state: AnchorState::default(),
            phase: Phase::Idle,
            thresholds,
            timings,
        }
    }

    pub fn state(&self) -> &AnchorState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_adjusting(&self) -> bool {
        matches!(self.phase, Phase::Adjusting(_))
    }

    /// When [`Self::tick`] next has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        match self.phase {
            Phase::Idle => None,
            Phase::Adjusting(Settle::Recheck { at_ms } | Settle::Release { at_ms }) => Some(at_ms),
        }
    }

    /// Records the current scroll height, bottom proximity and anchor item.
    pub fn capture<D: Dom>(
        &mut self,
        dom: &D,
        target: &ScrollTarget<D::Node>,
        sentinels: &Sentinels<D::Node>,
    ) {
        let metrics = dom.scroll_metrics(target);
        self.state.scroll_height = metrics.scroll_height;
        self.state.was_at_bottom =
            metrics.distance_from_bottom() <= self.thresholds.at_bottom_tolerance;

        if metrics.scroll_top == 0.0 {
            self.state.clear_anchor();
            return;
        }

        match find_anchor(dom, target, sentinels) {
            Some((index, offset)) => {
                self.state.anchor_index = Some(index);
                self.state.anchor_offset = offset;
            }
            None => self.state.clear_anchor(),
        }
        vtrace!(
            anchor = ?self.state.anchor_index,
            offset = self.state.anchor_offset,
            scroll_height = self.state.scroll_height,
            at_bottom = self.state.was_at_bottom,
            "capture"
        );
    }

    /// Compensates for drift since the last capture, writing `scroll_top` if needed.
    pub fn restore<D: Dom>(
        &mut self,
        dom: &mut D,
        target: &ScrollTarget<D::Node>,
        sentinels: &Sentinels<D::Node>,
        sticky_bottom: bool,
        now_ms: u64,
    ) -> Restore {
        if self.is_adjusting() {
            vtrace!("restore: adjusting, dropped");
            return Restore::Suppressed;
        }

        dom.flush_layout(target);
        let metrics = dom.scroll_metrics(target);
        let height_delta = metrics.scroll_height - self.state.scroll_height;

        if sticky_bottom && self.state.was_at_bottom && height_delta > 0.0 {
            let scroll_top = metrics.bottom_aligned();
            dom.set_scroll_top(target, scroll_top);
            self.phase = Phase::Adjusting(Settle::Recheck {
                at_ms: now_ms.saturating_add(self.timings.sticky_recheck_ms),
            });
            vdebug!(height_delta, scroll_top, "restore: stick to bottom");
            return Restore::StuckToBottom { scroll_top };
        }

        let Some(anchor_index) = self.state.anchor_index.as_deref() else {
            return Restore::NoAnchor;
        };
        let Some(anchor) = find_item(dom, sentinels, anchor_index) else {
            vtrace!(anchor = anchor_index, "restore: anchor virtualized away");
            return Restore::AnchorLost;
        };

        let container = container_rect(dom, target.element());
        let offset = dom.bounding_rect(&anchor).top - container.top;
        let delta = offset - self.state.anchor_offset;
        if delta.abs() <= self.thresholds.noise_floor {
            return Restore::WithinNoise;
        }

        let t = &self.thresholds;
        let cause = if height_delta > t.min_scroll_height_change && delta > t.min_anchor_adjustment
        {
            DriftCause::InsertedAbove
        } else if height_delta <= t.min_scroll_height_change {
            DriftCause::ItemResized
        } else {
            vtrace!(delta, height_delta, "restore: ambiguous drift left alone");
            return Restore::Ambiguous { delta };
        };

        dom.set_scroll_top(target, metrics.scroll_top + delta);
        self.phase = Phase::Adjusting(Settle::Release {
            at_ms: now_ms.saturating_add(self.timings.adjust_settle_ms),
        });
        vdebug!(delta, height_delta, ?cause, "restore: compensated");
        Restore::Compensated { delta, cause }
    }

    /// One restore+capture cycle.
    pub fn update<D: Dom>(
        &mut self,
        dom: &mut D,
        target: &ScrollTarget<D::Node>,
        sentinels: &Sentinels<D::Node>,
        sticky_bottom: bool,
        now_ms: u64,
    ) -> Restore {
        let restored = self.restore(dom, target, sentinels, sticky_bottom, now_ms);
        self.capture(dom, target, sentinels);
        restored
    }

    /// Advances the adjusting phase: runs the stick-to-bottom re-check and releases the guard.
    pub fn tick<D: Dom>(&mut self, dom: &mut D, target: &ScrollTarget<D::Node>, now_ms: u64) {
        loop {
            match self.phase {
                Phase::Adjusting(Settle::Recheck { at_ms }) if now_ms >= at_ms => {
                    let metrics = dom.scroll_metrics(target);
                    if metrics.distance_from_bottom() > self.thresholds.sticky_settle_tolerance {
                        let scroll_top = metrics.bottom_aligned();
                        vdebug!(scroll_top, "tick: stick to bottom again");
                        dom.set_scroll_top(target, scroll_top);
                    }
                    self.phase = Phase::Adjusting(Settle::Release {
                        at_ms: at_ms.saturating_add(self.timings.adjust_settle_ms),
                    });
                }
                Phase::Adjusting(Settle::Release { at_ms }) if now_ms >= at_ms => {
                    self.phase = Phase::Idle;
                }
                _ => return,
            }
        }
    }
}

/// The first rendered item whose bottom edge lies below the viewport's top edge.
fn find_anchor<D: Dom>(
    dom: &D,
    target: &ScrollTarget<D::Node>,
    sentinels: &Sentinels<D::Node>,
) -> Option<(String, f64)> {
    let container = container_rect(dom, target.element());
    RenderedItems::new(dom, sentinels).find_map(|item| {
        let rect = dom.bounding_rect(&item);
        if rect.bottom <= container.top {
            return None;
        }
        let index = dom.attribute(&item, ITEM_INDEX_ATTRIBUTE)?;
        Some((index, rect.top - container.top))
    })
}
