use std::cell::RefCell;
use std::rc::Rc;

use virtualize::testing::{NodeId, TreeDom};
use virtualize::{
    Dom, Edge, ITEM_INDEX_ATTRIBUTE, START_INDEX_ATTRIBUTE, ScrollTarget, VirtualizeOptions,
};
use virtualize_engine::{
    HostHandle, Observe, SentinelVisible, Virtualize, VirtualizeHost, Watch,
};

// A chat log: new messages arrive at the bottom while the user sits there, and older history
// is loaded above when the leading sentinel comes into view.
//
// The adapter flow is typically:
// 1) forward platform observer callbacks to `Virtualize::on_*`
// 2) let the host change the rendered window when a sentinel becomes visible
// 3) drive `animation_frame` and `tick` from the event loop

const CHAT: HostHandle = HostHandle(1);
const ROW: f64 = 24.0;

/// Subscriptions are printed; this demo delivers events by hand.
struct PrintObservers;

impl Observe<NodeId> for PrintObservers {
    fn observe_intersection(
        &mut self,
        handle: HostHandle,
        target: &NodeId,
        _root: Option<&NodeId>,
        root_margin: f64,
    ) {
        println!("{handle}: watch visibility of {target:?} (margin {root_margin}px)");
    }

    fn unobserve_intersection(&mut self, _handle: HostHandle, _target: &NodeId) {}

    fn observe_attributes(&mut self, handle: HostHandle, edge: Edge, _sentinel: &NodeId) {
        println!("{handle}: watch {edge:?} sentinel attributes");
    }

    fn observe_item_sizes(&mut self, handle: HostHandle, items: &[NodeId]) {
        println!("{handle}: watch sizes of {} messages", items.len());
    }

    fn observe_subtree(&mut self, handle: HostHandle, _container: &NodeId) {
        println!("{handle}: watch list mutations");
    }

    fn listen_scroll(&mut self, handle: HostHandle, target: &ScrollTarget<NodeId>) {
        println!("{handle}: listen for scroll on {target:?}");
    }

    fn disconnect(&mut self, handle: HostHandle, watch: Watch) {
        println!("{handle}: disconnect {watch:?}");
    }
}

/// Records that older history was requested; the main loop renders it.
struct ChatHost {
    wants_older: Rc<RefCell<bool>>,
}

impl VirtualizeHost for ChatHost {
    fn on_leading_sentinel_visible(&mut self, event: SentinelVisible) {
        println!(
            "leading sentinel visible: {} messages rendered, {}px",
            event.measurements.len(),
            event.gap_between_sentinels
        );
        *self.wants_older.borrow_mut() = true;
    }

    fn on_trailing_sentinel_visible(&mut self, _event: SentinelVisible) {}
}

fn render_message(dom: &mut TreeDom, reference: NodeId, index: i64) -> NodeId {
    let message = dom.insert_before(reference, Some(ROW));
    dom.set_attribute(message, ITEM_INDEX_ATTRIBUTE, index);
    message
}

fn main() {
    let mut dom = TreeDom::new(600.0);
    let body = dom.body();
    let scroller = dom.append_scroller(body, 240.0);
    let list = dom.append(scroller, None);
    let before = dom.append(list, Some(0.0));
    let after = dom.append(list, Some(0.0));
    dom.set_attribute(before, START_INDEX_ATTRIBUTE, 100);
    let mut first = None;
    for i in 100..130 {
        let message = render_message(&mut dom, after, i);
        first.get_or_insert(message);
    }
    let target = ScrollTarget::Element(scroller);
    dom.set_scroll_top(&target, f64::MAX);

    let wants_older = Rc::new(RefCell::new(false));
    let mut engine = Virtualize::new(dom, PrintObservers);
    let host = ChatHost {
        wants_older: Rc::clone(&wants_older),
    };
    if let Err(err) = engine.initialize(
        CHAT,
        host,
        before,
        after,
        VirtualizeOptions::default().with_sticky_bottom(true),
    ) {
        eprintln!("{err}");
        return;
    }

    // Three new messages arrive while the user reads the latest one.
    let mut now = 0;
    for i in 130..133 {
        render_message(engine.dom_mut(), after, i);
        engine.on_subtree_mutated(CHAT);
        engine.animation_frame(now);
        engine.animation_frame(now + 16);
        now += 200;
        engine.tick(now);
        let metrics = engine.dom().scroll_metrics(&target);
        println!(
            "message {i}: scroll_top={} distance_from_bottom={}",
            metrics.scroll_top,
            metrics.distance_from_bottom()
        );
    }

    // The user scrolls to the top; the leading sentinel comes into view.
    engine.dom_mut().set_scroll_top(&target, 10.0);
    engine.on_scroll(CHAT);
    let entry = virtualize_engine::IntersectionEntry {
        target: before,
        is_intersecting: true,
        bounding_rect: engine.dom().bounding_rect(&before),
        intersection_rect: engine.dom().bounding_rect(&before),
        root_bounds: Some(engine.dom().bounding_rect(&scroller)),
    };
    engine.on_intersection(CHAT, vec![entry], now);
    now += 50;
    engine.tick(now);

    let older = wants_older.replace(false).then_some(first).flatten();
    if let Some(first) = older {
        let dom = engine.dom_mut();
        for i in 80..100 {
            render_message(dom, first, i);
        }
        dom.set_attribute(before, START_INDEX_ATTRIBUTE, 80);
        engine.on_sentinel_attributes_changed(CHAT, Edge::Leading);
        engine.animation_frame(now);
        println!(
            "loaded 20 older messages: scroll_top={}",
            engine.dom().scroll_metrics(&target).scroll_top
        );
    }

    engine.dispose(CHAT);
}
