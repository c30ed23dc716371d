use crate::*;

use alloc::vec;
use alloc::vec::Vec;
use std::cell::RefCell;
use std::rc::Rc;

use virtualize::testing::{NodeId, TreeDom};
use virtualize::{
    Display, Dom, Edge, ElementKind, ITEM_INDEX_ATTRIBUTE, Rect, START_INDEX_ATTRIBUTE,
    ScrollTarget, VirtualizeOptions,
};

const H: HostHandle = HostHandle(7);
const VIEWPORT: f64 = 400.0;
const ROW: f64 = 40.0;

#[derive(Clone, Debug, PartialEq)]
enum Call {
    ObserveIntersection(NodeId, Option<NodeId>, f64),
    UnobserveIntersection(NodeId),
    ObserveAttributes(Edge, NodeId),
    ObserveItemSizes(Vec<NodeId>),
    ObserveSubtree(NodeId),
    ListenScroll(ScrollTarget<NodeId>),
    Disconnect(Watch),
}

#[derive(Debug, Default)]
struct Recorder {
    calls: Vec<(HostHandle, Call)>,
}

impl Recorder {
    fn calls_for(&self, handle: HostHandle) -> Vec<Call> {
        self.calls
            .iter()
            .filter(|(h, _)| *h == handle)
            .map(|(_, c)| c.clone())
            .collect()
    }

    fn last_item_sizes(&self) -> Option<Vec<NodeId>> {
        self.calls.iter().rev().find_map(|(_, c)| match c {
            Call::ObserveItemSizes(items) => Some(items.clone()),
            _ => None,
        })
    }
}

impl Observe<NodeId> for Recorder {
    fn observe_intersection(
        &mut self,
        handle: HostHandle,
        target: &NodeId,
        root: Option<&NodeId>,
        root_margin: f64,
    ) {
        self.calls.push((
            handle,
            Call::ObserveIntersection(*target, root.copied(), root_margin),
        ));
    }

    fn unobserve_intersection(&mut self, handle: HostHandle, target: &NodeId) {
        self.calls.push((handle, Call::UnobserveIntersection(*target)));
    }

    fn observe_attributes(&mut self, handle: HostHandle, edge: Edge, sentinel: &NodeId) {
        self.calls
            .push((handle, Call::ObserveAttributes(edge, *sentinel)));
    }

    fn observe_item_sizes(&mut self, handle: HostHandle, items: &[NodeId]) {
        self.calls
            .push((handle, Call::ObserveItemSizes(items.to_vec())));
    }

    fn observe_subtree(&mut self, handle: HostHandle, container: &NodeId) {
        self.calls.push((handle, Call::ObserveSubtree(*container)));
    }

    fn listen_scroll(&mut self, handle: HostHandle, target: &ScrollTarget<NodeId>) {
        self.calls.push((handle, Call::ListenScroll(target.clone())));
    }

    fn disconnect(&mut self, handle: HostHandle, watch: Watch) {
        self.calls.push((handle, Call::Disconnect(watch)));
    }
}

type Events = Rc<RefCell<Vec<(Edge, SentinelVisible)>>>;

struct RecordingHost(Events);

impl VirtualizeHost for RecordingHost {
    fn on_leading_sentinel_visible(&mut self, event: SentinelVisible) {
        self.0.borrow_mut().push((Edge::Leading, event));
    }

    fn on_trailing_sentinel_visible(&mut self, event: SentinelVisible) {
        self.0.borrow_mut().push((Edge::Trailing, event));
    }
}

struct Fixture {
    engine: Virtualize<TreeDom, Recorder>,
    scroller: NodeId,
    list: NodeId,
    before: NodeId,
    after: NodeId,
    items: Vec<NodeId>,
    events: Events,
}

impl Fixture {
    fn new(count: usize) -> Self {
        Self::build(count, |_, _| {})
    }

    fn build(count: usize, customize: impl FnOnce(&mut TreeDom, NodeId)) -> Self {
        let mut dom = TreeDom::new(800.0);
        let body = dom.body();
        let scroller = dom.append_scroller(body, VIEWPORT);
        let list = dom.append(scroller, None);
        let before = dom.append(list, Some(0.0));
        dom.set_attribute(before, START_INDEX_ATTRIBUTE, 0);
        let mut items = Vec::new();
        for i in 0..count {
            let item = dom.append(list, Some(ROW));
            dom.set_attribute(item, ITEM_INDEX_ATTRIBUTE, i);
            items.push(item);
        }
        let after = dom.append(list, Some(0.0));
        customize(&mut dom, list);
        Self {
            engine: Virtualize::new(dom, Recorder::default()),
            scroller,
            list,
            before,
            after,
            items,
            events: Events::default(),
        }
    }

    fn init(&mut self, options: VirtualizeOptions) {
        let host = RecordingHost(Rc::clone(&self.events));
        self.engine
            .initialize(H, host, self.before, self.after, options)
            .expect("fresh handle");
    }

    fn target(&self) -> ScrollTarget<NodeId> {
        ScrollTarget::Element(self.scroller)
    }

    /// A user scroll: move, then deliver the scroll event.
    fn user_scroll(&mut self, scroll_top: f64) {
        let target = self.target();
        self.engine.dom_mut().set_scroll_top(&target, scroll_top);
        self.engine.on_scroll(H);
    }

    fn scroll_top(&self) -> f64 {
        self.engine.dom().scroll_metrics(&self.target()).scroll_top
    }

    fn distance_from_bottom(&self) -> f64 {
        self.engine
            .dom()
            .scroll_metrics(&self.target())
            .distance_from_bottom()
    }

    fn screen_offset(&self, item: NodeId) -> f64 {
        let dom = self.engine.dom();
        dom.bounding_rect(&item).top - dom.bounding_rect(&self.scroller).top
    }

    fn insert_rows_before(&mut self, reference: NodeId, first_index: i64, n: usize) -> Vec<NodeId> {
        let dom = self.engine.dom_mut();
        (0..n)
            .map(|i| {
                let row = dom.insert_before(reference, Some(ROW));
                dom.set_attribute(row, ITEM_INDEX_ATTRIBUTE, first_index + i as i64);
                row
            })
            .collect()
    }

    fn prepend_rows(&mut self, first_index: i64, n: usize) -> Vec<NodeId> {
        let first = self.items[0];
        self.insert_rows_before(first, first_index, n)
    }

    fn append_rows(&mut self, first_index: i64, n: usize) -> Vec<NodeId> {
        let after = self.after;
        self.insert_rows_before(after, first_index, n)
    }

    /// Delivers a subtree mutation and runs the two frames it waits for.
    fn mutate_and_settle(&mut self, now_ms: u64) {
        self.engine.on_subtree_mutated(H);
        self.engine.animation_frame(now_ms);
        self.engine.animation_frame(now_ms + 16);
    }

    fn leading_entry(&self, penetration: f64) -> IntersectionEntry<NodeId> {
        IntersectionEntry {
            target: self.before,
            is_intersecting: true,
            bounding_rect: Rect::new(-penetration, -penetration),
            intersection_rect: Rect::new(0.0, 0.0),
            root_bounds: Some(Rect::new(-50.0, 450.0)),
        }
    }

    fn trailing_entry(&self, penetration: f64) -> IntersectionEntry<NodeId> {
        IntersectionEntry {
            target: self.after,
            is_intersecting: true,
            bounding_rect: Rect::new(300.0, 420.0 + penetration),
            intersection_rect: Rect::new(300.0, 420.0),
            root_bounds: None,
        }
    }
}

#[test]
fn initialize_subscribes_every_observer() {
    let mut f = Fixture::new(3);
    f.init(VirtualizeOptions::default().with_root_margin(80.0));

    assert!(f.engine.is_initialized(H));
    assert!(!f.engine.dom().overflow_anchor_enabled(&f.target()));
    assert_eq!(f.engine.scroll_target(H), Some(&f.target()));
    assert_eq!(
        f.engine.observers().calls_for(H),
        vec![
            Call::ListenScroll(f.target()),
            Call::ObserveItemSizes(f.items.clone()),
            Call::ObserveSubtree(f.list),
            Call::ObserveIntersection(f.before, Some(f.scroller), 80.0),
            Call::ObserveIntersection(f.after, Some(f.scroller), 80.0),
            Call::ObserveAttributes(Edge::Leading, f.before),
            Call::ObserveAttributes(Edge::Trailing, f.after),
        ]
    );
}

#[test]
fn initialize_in_document_scroll_uses_viewport() {
    let mut dom = TreeDom::new(600.0);
    let body = dom.body();
    let list = dom.append(body, None);
    let before = dom.append(list, Some(0.0));
    let after = dom.append(list, Some(0.0));
    let mut engine = Virtualize::new(dom, Recorder::default());
    let events = Events::default();

    engine
        .initialize(
            H,
            RecordingHost(events),
            before,
            after,
            VirtualizeOptions::default(),
        )
        .expect("fresh handle");

    assert_eq!(engine.scroll_target(H), Some(&ScrollTarget::Document));
    assert!(!engine.dom().overflow_anchor_enabled(&ScrollTarget::Document));
    assert!(
        engine
            .observers()
            .calls_for(H)
            .contains(&Call::ObserveIntersection(before, None, 50.0))
    );
}

#[test]
fn initialize_styles_table_sentinels_as_rows() {
    let mut f = Fixture::build(2, |dom, list| dom.set_kind(list, ElementKind::TableSection));
    f.init(VirtualizeOptions::default());
    assert_eq!(f.engine.dom().display(&f.before), Display::TableRow);
    assert_eq!(f.engine.dom().display(&f.after), Display::TableRow);
}

#[test]
fn initialize_twice_requires_dispose() {
    let mut f = Fixture::new(3);
    f.init(VirtualizeOptions::default());

    let again = f.engine.initialize(
        H,
        RecordingHost(Events::default()),
        f.before,
        f.after,
        VirtualizeOptions::default(),
    );
    assert_eq!(again, Err(VirtualizeError::AlreadyInitialized(H)));

    f.engine.dispose(H);
    f.init(VirtualizeOptions::default());
    assert!(f.engine.is_initialized(H));
}

#[test]
fn dispose_disconnects_once() {
    let mut f = Fixture::new(3);
    f.init(VirtualizeOptions::default());
    f.engine.dispose(H);

    let disconnects: Vec<Call> = f
        .engine
        .observers()
        .calls_for(H)
        .into_iter()
        .filter(|c| matches!(c, Call::Disconnect(_)))
        .collect();
    let expected: Vec<Call> = Watch::ALL.into_iter().map(Call::Disconnect).collect();
    assert_eq!(disconnects, expected);
    assert!(!f.engine.is_initialized(H));

    let logged = f.engine.observers().calls.len();
    f.engine.dispose(H);
    f.engine.dispose(HostHandle(99));
    assert_eq!(f.engine.observers().calls.len(), logged);
}

#[test]
fn unknown_handles_are_ignored() {
    let mut f = Fixture::new(3);
    f.engine.set_sticky_bottom(H, true);
    f.engine.on_scroll(H);
    f.engine.on_items_resized(H, 0);
    f.engine.on_subtree_mutated(H);
    f.engine.on_sentinel_attributes_changed(H, Edge::Leading);
    let entry = f.leading_entry(10.0);
    f.engine.on_intersection(H, vec![entry], 0);
    f.engine.tick(1_000);
    f.engine.animation_frame(1_000);

    assert!(f.engine.options(H).is_none());
    assert!(f.engine.observers().calls.is_empty());
    assert!(f.events.borrow().is_empty());
}

#[test]
fn set_sticky_bottom_updates_in_place() {
    let mut f = Fixture::new(3);
    f.init(VirtualizeOptions::default());
    assert_eq!(f.engine.options(H).map(|o| o.sticky_bottom), Some(false));
    f.engine.set_sticky_bottom(H, true);
    assert_eq!(f.engine.options(H).map(|o| o.sticky_bottom), Some(true));
}

#[test]
fn visibility_burst_is_throttled_to_last_batch() {
    let mut f = Fixture::new(5);
    f.init(VirtualizeOptions::default());

    for i in 0..10u64 {
        let entry = f.leading_entry(i as f64 * 10.0);
        f.engine.on_intersection(H, vec![entry], i);
    }
    assert_eq!(f.engine.next_deadline(), Some(50));
    f.engine.tick(49);
    assert!(f.events.borrow().is_empty());

    f.engine.tick(50);
    let events = f.events.borrow();
    assert_eq!(events.len(), 1);
    let (edge, event) = &events[0];
    assert_eq!(*edge, Edge::Leading);
    assert_eq!(event.penetration_offset, 90.0);
    assert_eq!(event.viewport_size, Some(500.0));
}

#[test]
fn visibility_reports_measurements_and_gap() {
    let mut f = Fixture::new(5);
    f.engine
        .dom_mut()
        .set_attribute(f.before, START_INDEX_ATTRIBUTE, 10);
    f.engine.dom_mut().set_height(f.after, Some(120.0));
    f.engine.dom_mut().set_height(f.items[1], Some(75.0));
    f.init(VirtualizeOptions::default());

    let entry = f.trailing_entry(35.0);
    f.engine.on_intersection(H, vec![entry], 0);
    f.engine.tick(50);

    let events = f.events.borrow();
    assert_eq!(events.len(), 1);
    let (edge, event) = &events[0];
    assert_eq!(*edge, Edge::Trailing);
    assert_eq!(event.penetration_offset, 35.0);
    assert_eq!(event.gap_between_sentinels, 4.0 * ROW + 75.0);
    assert_eq!(event.viewport_size, None);
    let indexes: Vec<i64> = event.measurements.iter().map(|m| m.index).collect();
    assert_eq!(indexes, [10, 11, 12, 13, 14]);
    assert_eq!(event.measurements[1].height, 75.0);
}

#[test]
fn visibility_skips_hidden_and_collapsed_sentinels() {
    let mut f = Fixture::new(5);
    f.init(VirtualizeOptions::default());

    let mut hidden = f.leading_entry(10.0);
    hidden.is_intersecting = false;
    // The trailing sentinel has zero height.
    let collapsed = f.trailing_entry(10.0);
    f.engine.on_intersection(H, vec![hidden, collapsed], 0);
    f.engine.tick(100);
    assert!(f.events.borrow().is_empty());
    assert_eq!(f.engine.next_deadline(), None);
}

#[test]
fn visibility_ignores_entries_for_other_elements() {
    let mut f = Fixture::new(5);
    f.init(VirtualizeOptions::default());

    let mut stray = f.leading_entry(10.0);
    stray.target = f.items[2];
    f.engine.on_intersection(H, vec![stray], 0);
    f.engine.tick(50);
    assert!(f.events.borrow().is_empty());

    let entry = f.leading_entry(10.0);
    f.engine.on_intersection(H, vec![entry], 60);
    f.engine.tick(110);
    assert_eq!(f.events.borrow().len(), 1);
}

#[test]
fn visibility_flush_reports_both_sentinels() {
    let mut f = Fixture::new(2);
    f.engine.dom_mut().set_height(f.after, Some(10.0));
    f.init(VirtualizeOptions::default());

    let batch = vec![f.leading_entry(5.0), f.trailing_entry(7.0)];
    f.engine.on_intersection(H, batch, 0);
    f.engine.tick(50);

    let edges: Vec<Edge> = f.events.borrow().iter().map(|(e, _)| *e).collect();
    assert_eq!(edges, [Edge::Leading, Edge::Trailing]);
}

#[test]
fn dispose_drops_pending_notifications() {
    let mut f = Fixture::new(5);
    f.init(VirtualizeOptions::default());
    let entry = f.leading_entry(10.0);
    f.engine.on_intersection(H, vec![entry], 0);
    f.engine.dispose(H);
    f.engine.tick(1_000);
    assert!(f.events.borrow().is_empty());
}

#[test]
fn sentinel_attribute_change_rearms_intersection() {
    let mut f = Fixture::new(5);
    f.init(VirtualizeOptions::default());
    let logged = f.engine.observers().calls.len();

    f.engine.on_sentinel_attributes_changed(H, Edge::Trailing);
    assert_eq!(
        f.engine.observers().calls_for(H)[logged..],
        [
            Call::UnobserveIntersection(f.after),
            Call::ObserveIntersection(f.after, Some(f.scroller), 50.0),
        ]
    );
    // Only the leading sentinel schedules an anchor cycle.
    assert!(!f.engine.has_pending_frames());
}

#[test]
fn sentinel_attribute_change_restores_table_row() {
    let mut f = Fixture::build(2, |dom, list| dom.set_kind(list, ElementKind::TableSection));
    f.init(VirtualizeOptions::default());
    let logged = f.engine.observers().calls.len();

    f.engine.dom_mut().set_display(&f.after, Display::Unset);
    f.engine.on_sentinel_attributes_changed(H, Edge::Trailing);

    assert_eq!(f.engine.dom().display(&f.after), Display::TableRow);
    assert_eq!(
        f.engine.observers().calls_for(H)[logged..],
        [
            Call::Disconnect(Watch::SentinelAttributes(Edge::Trailing)),
            Call::ObserveAttributes(Edge::Trailing, f.after),
            Call::UnobserveIntersection(f.after),
            Call::ObserveIntersection(f.after, Some(f.scroller), 50.0),
        ]
    );
}

#[test]
fn leading_sentinel_change_reanchors_next_frame() {
    let mut f = Fixture::new(50);
    f.init(VirtualizeOptions::default());
    f.user_scroll(500.0);
    let anchor = f.items[12];
    let before = f.screen_offset(anchor);

    f.prepend_rows(-5, 5);
    f.engine.on_sentinel_attributes_changed(H, Edge::Leading);
    assert!(f.engine.has_pending_frames());
    assert_eq!(f.scroll_top(), 500.0);

    f.engine.animation_frame(16);
    assert_eq!(f.scroll_top(), 700.0);
    assert!((f.screen_offset(anchor) - before).abs() < 5.0);
    assert!(f.engine.is_adjusting(H));

    f.engine.tick(116);
    assert!(!f.engine.is_adjusting(H));
}

#[test]
fn mutation_restores_after_two_frames() {
    let mut f = Fixture::new(50);
    f.init(VirtualizeOptions::default());
    f.user_scroll(500.0);
    let anchor = f.items[12];
    let before = f.screen_offset(anchor);

    let added = f.prepend_rows(-5, 5);
    f.engine.on_subtree_mutated(H);
    f.engine.on_subtree_mutated(H);
    assert!(f.engine.is_mutation_pending(H));

    f.engine.animation_frame(0);
    assert_eq!(f.scroll_top(), 500.0);
    f.engine.animation_frame(16);
    assert_eq!(f.scroll_top(), 700.0);
    assert!((f.screen_offset(anchor) - before).abs() < 5.0);
    assert!(!f.engine.is_mutation_pending(H));
    assert!(!f.engine.has_pending_frames());

    let watched = f.engine.observers().last_item_sizes().unwrap_or_default();
    assert_eq!(watched.len(), 55);
    assert_eq!(watched[..5], added[..]);
}

#[test]
fn mutation_without_layout_change_does_not_move() {
    let mut f = Fixture::new(50);
    f.init(VirtualizeOptions::default());
    f.user_scroll(321.0);

    f.mutate_and_settle(0);
    assert!((f.scroll_top() - 321.0).abs() < 1.0);
    assert!(!f.engine.is_adjusting(H));
}

#[test]
fn mutation_is_ignored_while_adjusting() {
    let mut f = Fixture::new(50);
    f.init(VirtualizeOptions::default());
    f.user_scroll(500.0);

    f.engine.dom_mut().set_height(f.items[2], Some(ROW + 20.0));
    f.engine.on_items_resized(H, 0);
    assert!(f.engine.is_adjusting(H));

    f.engine.on_subtree_mutated(H);
    assert!(!f.engine.is_mutation_pending(H));
    assert!(!f.engine.has_pending_frames());
}

#[test]
fn resize_above_anchor_is_compensated_immediately() {
    let mut f = Fixture::new(50);
    f.init(VirtualizeOptions::default());
    f.user_scroll(500.0);
    let last_visible = f.items[22];
    let before = f.screen_offset(last_visible);

    f.engine.dom_mut().set_height(f.items[3], Some(ROW + 45.0));
    f.engine.on_items_resized(H, 0);
    assert_eq!(f.scroll_top(), 545.0);
    assert!((f.screen_offset(last_visible) - before).abs() < 5.0);
}

#[test]
fn scroll_events_during_adjustment_are_not_captured() {
    let mut f = Fixture::new(50);
    f.init(VirtualizeOptions::default());
    f.user_scroll(500.0);
    f.engine.dom_mut().set_height(f.items[3], Some(ROW + 20.0));
    f.engine.on_items_resized(H, 0);
    let captured = f.engine.anchor_state(H).cloned();

    // The platform reports the engine's own write, then the user nudges the view.
    f.user_scroll(900.0);
    assert_eq!(f.engine.anchor_state(H).cloned(), captured);

    f.engine.tick(100);
    f.engine.on_scroll(H);
    assert_ne!(f.engine.anchor_state(H).cloned(), captured);
}

#[test]
fn sticky_bottom_follows_appends() {
    let mut f = Fixture::new(50);
    f.init(VirtualizeOptions::default().with_sticky_bottom(true));
    f.user_scroll(f64::MAX);
    assert!(f.engine.anchor_state(H).is_some_and(|s| s.was_at_bottom));

    f.append_rows(50, 3);
    f.mutate_and_settle(1_000);
    assert!(f.distance_from_bottom() <= 1.0);
    assert!(f.engine.is_adjusting(H));

    // Scrolling down made the host render one more row.
    f.append_rows(53, 1);
    assert_eq!(f.engine.next_deadline(), Some(1_066));
    f.engine.tick(1_066);
    assert!(f.distance_from_bottom() <= 1.0);
    assert!(f.engine.is_adjusting(H));

    f.engine.tick(1_166);
    assert!(!f.engine.is_adjusting(H));
    assert_eq!(f.engine.next_deadline(), None);
}

#[test]
fn sticky_bottom_can_be_enabled_later() {
    let mut f = Fixture::new(50);
    f.init(VirtualizeOptions::default());
    f.user_scroll(f64::MAX);
    f.engine.set_sticky_bottom(H, true);

    f.append_rows(50, 4);
    f.mutate_and_settle(0);
    assert!(f.distance_from_bottom() <= 1.0);
}

#[test]
fn sticky_bottom_waits_for_user_at_bottom() {
    let mut f = Fixture::new(50);
    f.init(VirtualizeOptions::default().with_sticky_bottom(true));
    f.user_scroll(800.0);

    f.append_rows(50, 4);
    f.mutate_and_settle(0);
    assert_eq!(f.scroll_top(), 800.0);
}

#[test]
fn non_sticky_append_at_bottom_stays_put() {
    let mut f = Fixture::new(50);
    f.init(VirtualizeOptions::default());
    f.user_scroll(f64::MAX);
    let scroll_top = f.scroll_top();
    let last = f.items[49];
    let before = f.screen_offset(last);

    f.append_rows(50, 5);
    f.mutate_and_settle(0);
    assert_eq!(f.scroll_top(), scroll_top);
    assert!((f.screen_offset(last) - before).abs() < 5.0);
    assert!(f.distance_from_bottom() > 50.0);
}

#[test]
fn prepend_at_top_shows_new_items() {
    let mut f = Fixture::new(50);
    f.init(VirtualizeOptions::default());

    let added = f.prepend_rows(-5, 5);
    f.mutate_and_settle(0);
    assert_eq!(f.scroll_top(), 0.0);
    assert_eq!(f.screen_offset(added[0]), 0.0);
}

#[test]
fn instances_are_independent() {
    let mut f = Fixture::new(10);
    f.init(VirtualizeOptions::default());

    let other = HostHandle(8);
    let dom = f.engine.dom_mut();
    let body = dom.body();
    let scroller = dom.append_scroller(body, 200.0);
    let list = dom.append(scroller, None);
    let before = dom.append(list, Some(0.0));
    let after = dom.append(list, Some(0.0));
    let other_events = Events::default();
    f.engine
        .initialize(
            other,
            RecordingHost(Rc::clone(&other_events)),
            before,
            after,
            VirtualizeOptions::default(),
        )
        .expect("fresh handle");

    let entry = f.leading_entry(3.0);
    f.engine.on_intersection(H, vec![entry], 0);
    f.engine.dispose(other);
    f.engine.tick(50);
    assert_eq!(f.events.borrow().len(), 1);
    assert!(other_events.borrow().is_empty());
    assert!(f.engine.is_initialized(H));
}
