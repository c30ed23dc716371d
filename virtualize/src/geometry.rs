//! Stateless helpers over the element tree.

use crate::{Display, Dom, ElementKind, Overflow, Rect};

/// Finds the nearest element (starting at `node` itself) whose `overflow-y` is not `visible`.
///
/// Returns `None` once the walk reaches the document root: the top-level viewport scrolls in
/// that case, and the unbounded body must not be treated as the scroll region.
pub fn find_scroll_container<D: Dom>(dom: &D, node: &D::Node) -> Option<D::Node> {
    let mut current = Some(node.clone());
    while let Some(el) = current {
        if dom.is_document_root(&el) {
            return None;
        }
        if dom.overflow_y(&el) != Overflow::Visible {
            return Some(el);
        }
        current = dom.parent_element(&el);
    }
    None
}

/// The visible band of the scroll container; `[0, viewport height]` for the document.
pub fn container_rect<D: Dom>(dom: &D, container: Option<&D::Node>) -> Rect {
    match container {
        Some(el) => dom.bounding_rect(el),
        None => Rect::new(0.0, dom.viewport_height()),
    }
}

/// Product of the horizontal scale of every 2D transform from `node` up to the document root.
pub fn cumulative_scale<D: Dom>(dom: &D, node: &D::Node) -> f64 {
    let mut scale = 1.0;
    let mut current = Some(node.clone());
    while let Some(el) = current {
        if dom.is_document_root(&el) {
            break;
        }
        if let Some(factor) = dom.transform(&el).as_deref().and_then(matrix_scale_x) {
            scale *= factor;
        }
        current = dom.parent_element(&el);
    }
    scale
}

/// Extracts the `a` component of a CSS `matrix(a, b, c, d, e, f)` value.
///
/// `matrix3d(...)` and anything unparsable yield `None`.
pub fn matrix_scale_x(transform: &str) -> Option<f64> {
    let args = transform.trim().strip_prefix("matrix(")?;
    let first = args.split([',', ')']).next()?;
    first.trim().parse::<f64>().ok()
}

/// Whether sentinels under `parent` must render as table rows to keep table layout intact.
pub fn is_table_like<D: Dom>(dom: &D, parent: Option<&D::Node>) -> bool {
    let Some(parent) = parent else {
        return false;
    };
    let display = dom.display(parent);
    match dom.element_kind(parent) {
        ElementKind::Table if display == Display::Unset => true,
        ElementKind::TableSection if display == Display::Unset => true,
        _ => matches!(display, Display::Table | Display::TableRowGroup),
    }
}

/// Whether `sentinel` sits in a table context but is not yet styled as a table row.
pub fn needs_table_row<D: Dom>(dom: &D, sentinel: &D::Node) -> bool {
    let parent = dom.parent_element(sentinel);
    is_table_like(dom, parent.as_ref()) && dom.display(sentinel) != Display::TableRow
}
