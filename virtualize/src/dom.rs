use alloc::string::String;
use core::fmt;

use crate::{Display, ElementKind, Overflow, Rect, ScrollMetrics, ScrollTarget};

/// Read/write access to the element tree the virtualized list lives in.
///
/// The engine never holds UI objects beyond opaque `Node` handles. An adapter implements this
/// trait over its platform (a browser DOM through bindings, a retained-mode widget tree, or the
/// in-memory [`crate::testing::TreeDom`]).
///
/// All geometry is viewport-relative and expressed in CSS pixels, like
/// `getBoundingClientRect()`.
pub trait Dom {
    type Node: Clone + PartialEq + fmt::Debug;

    fn parent_element(&self, node: &Self::Node) -> Option<Self::Node>;

    /// `true` for the document element and the body: ancestor walks stop here.
    fn is_document_root(&self, node: &Self::Node) -> bool;

    fn next_element_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn overflow_y(&self, node: &Self::Node) -> Overflow;

    /// Computed `transform` (e.g. `"matrix(0.5, 0, 0, 0.5, 0, 0)"`), or `None` for `none`.
    fn transform(&self, node: &Self::Node) -> Option<String>;

    fn element_kind(&self, node: &Self::Node) -> ElementKind;

    fn display(&self, node: &Self::Node) -> Display;

    fn set_display(&mut self, node: &Self::Node, display: Display);

    fn bounding_rect(&self, node: &Self::Node) -> Rect;

    /// Layout height ignoring transforms (`offsetHeight`).
    fn offset_height(&self, node: &Self::Node) -> f64;

    /// Height of the top-level viewport (`window.innerHeight`).
    fn viewport_height(&self) -> f64;

    fn scroll_metrics(&self, target: &ScrollTarget<Self::Node>) -> ScrollMetrics;

    fn set_scroll_top(&mut self, target: &ScrollTarget<Self::Node>, scroll_top: f64);

    /// Turns off the platform's own scroll anchoring (`overflow-anchor: none`).
    fn disable_overflow_anchor(&mut self, target: &ScrollTarget<Self::Node>);

    /// Bounding height of everything strictly between `start` and `end`.
    fn range_height(&self, start: &Self::Node, end: &Self::Node) -> f64;

    /// Forces pending layout to be applied before the next geometry read.
    fn flush_layout(&self, target: &ScrollTarget<Self::Node>) {
        let _ = target;
    }
}
