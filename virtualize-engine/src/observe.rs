use virtualize::{Edge, Rect, ScrollTarget};

use crate::HostHandle;

/// One of the subscriptions an instance holds while it is alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Watch {
    /// Visibility of both sentinels.
    Intersection,
    /// Attribute changes of one sentinel.
    SentinelAttributes(Edge),
    /// Size changes of the rendered items.
    ItemSizes,
    /// Child-list and deep subtree changes of the list container.
    Subtree,
    /// Scroll events of the scroll target.
    Scroll,
}

impl Watch {
    pub const ALL: [Watch; 6] = [
        Watch::Intersection,
        Watch::SentinelAttributes(Edge::Leading),
        Watch::SentinelAttributes(Edge::Trailing),
        Watch::ItemSizes,
        Watch::Subtree,
        Watch::Scroll,
    ];
}

/// A visibility change reported by the platform for an observed sentinel.
#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionEntry<N> {
    pub target: N,
    pub is_intersecting: bool,
    pub bounding_rect: Rect,
    pub intersection_rect: Rect,
    /// The observation root's rect (viewport extended by the root margin), if known.
    pub root_bounds: Option<Rect>,
}

/// The subscription side of the platform.
///
/// The platform delivers the resulting events back through the matching `Virtualize::on_*`
/// entry point, tagged with the same handle.
pub trait Observe<N> {
    /// Starts reporting visibility of `target` within `root` (`None`: the top-level viewport)
    /// grown by `root_margin` pixels on every side.
    fn observe_intersection(
        &mut self,
        handle: HostHandle,
        target: &N,
        root: Option<&N>,
        root_margin: f64,
    );

    fn unobserve_intersection(&mut self, handle: HostHandle, target: &N);

    fn observe_attributes(&mut self, handle: HostHandle, edge: Edge, sentinel: &N);

    /// Replaces the set of items watched for size changes.
    fn observe_item_sizes(&mut self, handle: HostHandle, items: &[N]);

    fn observe_subtree(&mut self, handle: HostHandle, container: &N);

    fn listen_scroll(&mut self, handle: HostHandle, target: &ScrollTarget<N>);

    fn disconnect(&mut self, handle: HostHandle, watch: Watch);
}
