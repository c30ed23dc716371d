//! An in-memory element tree with a simple block layout.
//!
//! Every element stacks its children vertically. An element's outer height is its fixed height
//! when set, otherwise the sum of its children. Elements whose `overflow-y` is not `visible`
//! scroll their content. Transforms scale reported heights only; positions stay unscaled.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::geometry::matrix_scale_x;
use crate::{Display, Dom, ElementKind, Overflow, Rect, ScrollMetrics, ScrollTarget};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Clone, Debug, Default)]
struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: ElementKind,
    display: Display,
    overflow_y: Overflow,
    transform: Option<String>,
    attributes: Vec<(String, String)>,
    height: Option<f64>,
    scroll_top: f64,
    overflow_anchor: bool,
}

#[derive(Clone, Debug)]
pub struct TreeDom {
    nodes: Vec<NodeData>,
    html: NodeId,
    body: NodeId,
    viewport_height: f64,
    document_scroll_top: f64,
    document_overflow_anchor: bool,
    scroll_writes: usize,
}

impl TreeDom {
    pub fn new(viewport_height: f64) -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            html: NodeId(0),
            body: NodeId(0),
            viewport_height,
            document_scroll_top: 0.0,
            document_overflow_anchor: true,
            scroll_writes: 0,
        };
        dom.html = dom.alloc(None);
        dom.body = dom.alloc(Some(dom.html));
        dom.nodes[dom.html.0].children.push(dom.body);
        dom
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    fn alloc(&mut self, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            parent,
            overflow_anchor: true,
            ..NodeData::default()
        });
        id
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    /// Appends an element with a fixed height (or `None` to size to its children).
    pub fn append(&mut self, parent: NodeId, height: Option<f64>) -> NodeId {
        let id = self.alloc(Some(parent));
        self.node_mut(id).height = height;
        self.node_mut(parent).children.push(id);
        id
    }

    /// Appends a scroll container with a fixed viewport height.
    pub fn append_scroller(&mut self, parent: NodeId, height: f64) -> NodeId {
        let id = self.append(parent, Some(height));
        self.node_mut(id).overflow_y = Overflow::Auto;
        id
    }

    /// Inserts an element right before `reference` in its parent (appends to the body when
    /// `reference` is detached).
    pub fn insert_before(&mut self, reference: NodeId, height: Option<f64>) -> NodeId {
        let Some(parent) = self.node(reference).parent else {
            return self.append(self.body, height);
        };
        let id = self.alloc(Some(parent));
        self.node_mut(id).height = height;
        let siblings = &mut self.node_mut(parent).children;
        let at = siblings.iter().position(|&c| c == reference).unwrap_or(siblings.len());
        siblings.insert(at, id);
        id
    }

    pub fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|&c| c != id);
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn set_height(&mut self, id: NodeId, height: Option<f64>) {
        self.node_mut(id).height = height;
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl ToString) {
        let value = value.to_string();
        let attrs = &mut self.node_mut(id).attributes;
        match attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => attrs.push((name.to_string(), value)),
        }
    }

    pub fn set_overflow_y(&mut self, id: NodeId, overflow: Overflow) {
        self.node_mut(id).overflow_y = overflow;
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Option<&str>) {
        self.node_mut(id).transform = transform.map(|t| t.to_string());
    }

    pub fn set_kind(&mut self, id: NodeId, kind: ElementKind) {
        self.node_mut(id).kind = kind;
    }

    pub fn overflow_anchor_enabled(&self, target: &ScrollTarget<NodeId>) -> bool {
        match target {
            ScrollTarget::Element(id) => self.node(*id).overflow_anchor,
            ScrollTarget::Document => self.document_overflow_anchor,
        }
    }

    /// Number of `scroll_top` writes so far.
    pub fn scroll_writes(&self) -> usize {
        self.scroll_writes
    }

    pub fn outer_height(&self, id: NodeId) -> f64 {
        let node = self.node(id);
        node.height.unwrap_or_else(|| self.content_height(id))
    }

    fn content_height(&self, id: NodeId) -> f64 {
        self.node(id)
            .children
            .iter()
            .map(|&c| self.outer_height(c))
            .sum()
    }

    fn scrolls(&self, id: NodeId) -> bool {
        self.node(id).overflow_y != Overflow::Visible
    }

    fn top(&self, id: NodeId) -> f64 {
        let Some(parent) = self.node(id).parent else {
            return -self.document_scroll_top;
        };
        let mut top = self.top(parent);
        if self.scrolls(parent) {
            top -= self.node(parent).scroll_top;
        }
        for &sibling in &self.node(parent).children {
            if sibling == id {
                break;
            }
            top += self.outer_height(sibling);
        }
        top
    }

    fn scale(&self, id: NodeId) -> f64 {
        let mut scale = 1.0;
        let mut current = Some(id);
        while let Some(n) = current {
            if let Some(factor) = self.node(n).transform.as_deref().and_then(matrix_scale_x) {
                scale *= factor;
            }
            current = self.node(n).parent;
        }
        scale
    }
}

impl Dom for TreeDom {
    type Node = NodeId;

    fn parent_element(&self, node: &NodeId) -> Option<NodeId> {
        self.node(*node).parent
    }

    fn is_document_root(&self, node: &NodeId) -> bool {
        *node == self.html || *node == self.body
    }

    fn next_element_sibling(&self, node: &NodeId) -> Option<NodeId> {
        let parent = self.node(*node).parent?;
        let siblings = &self.node(parent).children;
        let at = siblings.iter().position(|c| c == node)?;
        siblings.get(at + 1).copied()
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.node(*node)
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn overflow_y(&self, node: &NodeId) -> Overflow {
        self.node(*node).overflow_y
    }

    fn transform(&self, node: &NodeId) -> Option<String> {
        self.node(*node).transform.clone()
    }

    fn element_kind(&self, node: &NodeId) -> ElementKind {
        self.node(*node).kind
    }

    fn display(&self, node: &NodeId) -> Display {
        self.node(*node).display
    }

    fn set_display(&mut self, node: &NodeId, display: Display) {
        self.node_mut(*node).display = display;
    }

    fn bounding_rect(&self, node: &NodeId) -> Rect {
        let top = self.top(*node);
        Rect::new(top, top + self.outer_height(*node) * self.scale(*node))
    }

    fn offset_height(&self, node: &NodeId) -> f64 {
        self.outer_height(*node)
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn scroll_metrics(&self, target: &ScrollTarget<NodeId>) -> ScrollMetrics {
        match target {
            ScrollTarget::Element(id) => {
                let client_height = self.outer_height(*id);
                ScrollMetrics {
                    scroll_top: self.node(*id).scroll_top,
                    scroll_height: self.content_height(*id).max(client_height),
                    client_height,
                }
            }
            ScrollTarget::Document => ScrollMetrics {
                scroll_top: self.document_scroll_top,
                scroll_height: self.content_height(self.html).max(self.viewport_height),
                client_height: self.viewport_height,
            },
        }
    }

    fn set_scroll_top(&mut self, target: &ScrollTarget<NodeId>, scroll_top: f64) {
        let max = self.scroll_metrics(target).bottom_aligned().max(0.0);
        let clamped = scroll_top.clamp(0.0, max);
        self.scroll_writes += 1;
        match target {
            ScrollTarget::Element(id) => self.node_mut(*id).scroll_top = clamped,
            ScrollTarget::Document => self.document_scroll_top = clamped,
        }
    }

    fn disable_overflow_anchor(&mut self, target: &ScrollTarget<NodeId>) {
        match target {
            ScrollTarget::Element(id) => self.node_mut(*id).overflow_anchor = false,
            ScrollTarget::Document => self.document_overflow_anchor = false,
        }
    }

    fn range_height(&self, start: &NodeId, end: &NodeId) -> f64 {
        let start_bottom = self.top(*start) + self.outer_height(*start);
        (self.top(*end) - start_bottom).max(0.0)
    }
}
