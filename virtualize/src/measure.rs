use crate::geometry::cumulative_scale;
use crate::{Dom, ItemMeasurement, Sentinels};

/// Attribute on the leading sentinel holding the virtual index of the first rendered item.
pub const START_INDEX_ATTRIBUTE: &str = "data-virtualize-start";

/// Attribute on every rendered item holding its own virtual index.
pub const ITEM_INDEX_ATTRIBUTE: &str = "data-index";

/// Iterates over the elements strictly between the two sentinels, in document order.
pub struct RenderedItems<'a, D: Dom> {
    dom: &'a D,
    next: Option<D::Node>,
    end: &'a D::Node,
}

impl<'a, D: Dom> RenderedItems<'a, D> {
    pub fn new(dom: &'a D, sentinels: &'a Sentinels<D::Node>) -> Self {
        Self {
            dom,
            next: dom.next_element_sibling(&sentinels.before),
            end: &sentinels.after,
        }
    }
}

impl<D: Dom> Iterator for RenderedItems<'_, D> {
    type Item = D::Node;

    fn next(&mut self) -> Option<D::Node> {
        let current = self.next.take()?;
        if current == *self.end {
            return None;
        }
        self.next = self.dom.next_element_sibling(&current);
        Some(current)
    }
}

/// Lazily measures the rendered items.
///
/// Produced fresh on every visibility/reactivity trigger: item identity may change between
/// triggers, so measurements are never cached.
pub struct Measurements<'a, D: Dom> {
    dom: &'a D,
    items: RenderedItems<'a, D>,
    next_index: i64,
    scale: f64,
}

impl<D: Dom> Iterator for Measurements<'_, D> {
    type Item = ItemMeasurement;

    fn next(&mut self) -> Option<ItemMeasurement> {
        let item = self.items.next()?;
        let height = self.dom.bounding_rect(&item).height() / self.scale;
        let index = self.next_index;
        self.next_index = self.next_index.saturating_add(1);
        Some(ItemMeasurement { index, height })
    }
}

/// Measures every item between the sentinels, compensating for ancestor scale transforms.
///
/// Indexes start at the leading sentinel's [`START_INDEX_ATTRIBUTE`] (0 when absent).
pub fn measure<'a, D: Dom>(dom: &'a D, sentinels: &'a Sentinels<D::Node>) -> Measurements<'a, D> {
    let start = dom
        .attribute(&sentinels.before, START_INDEX_ATTRIBUTE)
        .map(|raw| parse_leading_int(&raw))
        .unwrap_or(0);
    let mut scale = cumulative_scale(dom, &sentinels.before);
    if !(scale.is_finite() && scale != 0.0) {
        vwarn!(scale, "measure: degenerate scale factor, ignoring");
        scale = 1.0;
    }
    Measurements {
        dom,
        items: RenderedItems::new(dom, sentinels),
        next_index: start,
        scale,
    }
}

/// Finds the rendered item whose [`ITEM_INDEX_ATTRIBUTE`] equals `index`.
pub fn find_item<D: Dom>(dom: &D, sentinels: &Sentinels<D::Node>, index: &str) -> Option<D::Node> {
    RenderedItems::new(dom, sentinels)
        .find(|item| dom.attribute(item, ITEM_INDEX_ATTRIBUTE).as_deref() == Some(index))
}

/// Parses a leading base-10 integer (`"12"`, `" -3"`, `"7px"`); anything else is 0.
pub(crate) fn parse_leading_int(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut value = 0i64;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add((b - b'0') as i64);
    }
    if negative { -value } else { value }
}
