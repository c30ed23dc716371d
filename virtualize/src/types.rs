/// A viewport-relative rectangle along the scroll axis (CSS pixels).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// The rendered height of one item, indexed by its position in the virtual list.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemMeasurement {
    pub index: i64,
    /// Height in unscaled CSS pixels.
    pub height: f64,
}

/// Scroll geometry of a scroll target.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn distance_from_bottom(&self) -> f64 {
        self.scroll_height - self.scroll_top - self.client_height
    }

    /// The `scroll_top` that aligns the viewport with the end of the content.
    pub fn bottom_aligned(&self) -> f64 {
        self.scroll_height - self.client_height
    }
}

/// The element whose `scrollTop` the engine reads and writes.
///
/// `Document` stands for the top-level viewport (the document element).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScrollTarget<N> {
    Element(N),
    Document,
}

impl<N> ScrollTarget<N> {
    pub fn from_container(container: Option<N>) -> Self {
        match container {
            Some(node) => Self::Element(node),
            None => Self::Document,
        }
    }

    pub fn element(&self) -> Option<&N> {
        match self {
            Self::Element(node) => Some(node),
            Self::Document => None,
        }
    }
}

/// Computed `overflow-y`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Clip,
    Scroll,
    Auto,
}

/// Inline `display` style. `Unset` means no inline value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Display {
    #[default]
    Unset,
    Block,
    Table,
    TableRowGroup,
    TableRow,
    Other,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ElementKind {
    Table,
    /// `thead`, `tbody` or `tfoot`.
    TableSection,
    #[default]
    Other,
}

/// Which of the two sentinels bracketing the rendered window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Edge {
    Leading,
    Trailing,
}

/// The two marker elements bracketing the rendered items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sentinels<N> {
    pub before: N,
    pub after: N,
}

impl<N> Sentinels<N> {
    pub fn new(before: N, after: N) -> Self {
        Self { before, after }
    }

    pub fn get(&self, edge: Edge) -> &N {
        match edge {
            Edge::Leading => &self.before,
            Edge::Trailing => &self.after,
        }
    }

    pub fn edge_of(&self, node: &N) -> Option<Edge>
    where
        N: PartialEq,
    {
        if *node == self.before {
            Some(Edge::Leading)
        } else if *node == self.after {
            Some(Edge::Trailing)
        } else {
            None
        }
    }
}
