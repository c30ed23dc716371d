//! A headless, sentinel-driven virtualization core.
//!
//! For observer wiring, timers and the per-handle lifecycle, see the `virtualize-engine` crate.
//!
//! A virtualized list renders only a window of items between two sentinel elements. This crate
//! provides the parts that only need read/write access to the element tree:
//!
//! - geometry helpers (scroll container discovery, transform scale, table detection)
//! - measurement of the rendered window
//! - a scroll-anchor tracker that keeps the visible content still when items are inserted above
//!   or resized, and optionally keeps the view pinned to the bottom
//!
//! It is UI-agnostic. The platform layer implements [`Dom`] and forwards its events.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod anchor;
mod dom;
pub mod geometry;
mod measure;
mod options;
mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;


pub use anchor::{AnchorState, DriftCause, Phase, Restore, ScrollAnchorTracker, Settle};
pub use dom::Dom;
pub use measure::{
    ITEM_INDEX_ATTRIBUTE, Measurements, RenderedItems, START_INDEX_ATTRIBUTE, find_item, measure,
};
pub use options::{AnchorThresholds, Timings, VirtualizeOptions};
pub use types::{
    Display, Edge, ElementKind, ItemMeasurement, Overflow, Rect, ScrollMetrics, ScrollTarget,
    Sentinels,
};
