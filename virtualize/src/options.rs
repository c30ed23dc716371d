/// Thresholds used to tell layout noise, item resizes and insertions apart.
///
/// The defaults are empirical; dense or sparse layouts may want different values.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnchorThresholds {
    /// Total content growth above which a change counts as an insertion.
    pub min_scroll_height_change: f64,
    /// Anchor displacement above which growth is attributed to content inserted above.
    pub min_anchor_adjustment: f64,
    /// Anchor displacement at or below this is ignored.
    pub noise_floor: f64,
    /// Distance from the bottom at or below which the view counts as "at bottom".
    pub at_bottom_tolerance: f64,
    /// Distance from the bottom tolerated after a stick-to-bottom correction.
    pub sticky_settle_tolerance: f64,
}

impl Default for AnchorThresholds {
    fn default() -> Self {
        Self {
            min_scroll_height_change: 50.0,
            min_anchor_adjustment: 30.0,
            noise_floor: 1.0,
            at_bottom_tolerance: 5.0,
            sticky_settle_tolerance: 1.0,
        }
    }
}

/// Delays (milliseconds) of the engine's timers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timings {
    /// How long the tracker stays `Adjusting` after a scroll write.
    pub adjust_settle_ms: u64,
    /// Delay before re-checking a stick-to-bottom correction.
    pub sticky_recheck_ms: u64,
    /// Trailing-edge throttle window for visibility notifications.
    pub visibility_throttle_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            adjust_settle_ms: 100,
            sticky_recheck_ms: 50,
            visibility_throttle_ms: 50,
        }
    }
}

/// Per-instance configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualizeOptions {
    /// Proximity margin (px) around the scroll viewport for sentinel visibility.
    pub root_margin: f64,
    /// Keep the view pinned to the bottom edge while content grows.
    pub sticky_bottom: bool,
    pub thresholds: AnchorThresholds,
    pub timings: Timings,
}

impl Default for VirtualizeOptions {
    fn default() -> Self {
        Self {
            root_margin: 50.0,
            sticky_bottom: false,
            thresholds: AnchorThresholds::default(),
            timings: Timings::default(),
        }
    }
}

impl VirtualizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_margin(mut self, root_margin: f64) -> Self {
        self.root_margin = root_margin;
        self
    }

    pub fn with_sticky_bottom(mut self, sticky_bottom: bool) -> Self {
        self.sticky_bottom = sticky_bottom;
        self
    }

    pub fn with_thresholds(mut self, thresholds: AnchorThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }
}
