// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout measurement seam.
//!
//! The engine never computes layout. Whenever it needs a fresh rectangle it
//! asks a [`Measure`] implementation supplied by the host, passing the opaque
//! element handle recorded at registration.

use kurbo::Rect;

/// Layout provider supplied by the UI binding.
pub trait Measure {
    /// Opaque handle to a rendered element.
    type Element;

    /// Measure `element` in document-absolute coordinates.
    ///
    /// Return `None` when the element cannot be measured right now (for example
    /// it is detached); the engine then keeps the previously cached layout.
    fn measure(&self, element: &Self::Element) -> Option<Rect>;
}

/// Measurer whose elements are their own rectangles.
///
/// Useful for hosts that already know absolute bounds, and for tests. Moving an
/// element means replacing its handle through
/// [`SpatialNavigation::update_mutable_fields`](crate::SpatialNavigation::update_mutable_fields).
#[derive(Copy, Clone, Debug, Default)]
pub struct StaticMeasure;

impl Measure for StaticMeasure {
    type Element = Rect;

    fn measure(&self, element: &Rect) -> Option<Rect> {
        Some(*element)
    }
}

/// Offset metrics of one element relative to its offset parent.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Offsets {
    /// Horizontal offset from the offset parent.
    pub left: f64,
    /// Vertical offset from the offset parent.
    pub top: f64,
    /// Rendered width.
    pub width: f64,
    /// Rendered height.
    pub height: f64,
    /// Horizontal scroll position of this element's own content.
    pub scroll_left: f64,
    /// Vertical scroll position of this element's own content.
    pub scroll_top: f64,
}

/// Resolve `node` into document coordinates.
///
/// `ancestors` is the chain of offset parents from nearest to the document
/// root. Each contributes its offset minus its scroll position. A zero height
/// (for example an element clipped by a collapsed overflow container) is
/// reported as 1 so that edge comparisons never degenerate.
pub fn document_rect<I>(node: Offsets, ancestors: I) -> Rect
where
    I: IntoIterator<Item = Offsets>,
{
    let mut left = node.left;
    let mut top = node.top;
    for parent in ancestors {
        left += parent.left - parent.scroll_left;
        top += parent.top - parent.scroll_top;
    }
    let height = if node.height > 0.0 { node.height } else { 1.0 };
    Rect::new(left, top, left + node.width, top + height)
}

/// Clamp a measured rectangle so its height is at least 1.
pub(crate) fn normalize(rect: Rect) -> Rect {
    let rect = rect.abs();
    if rect.height() > 0.0 {
        rect
    } else {
        Rect::new(rect.x0, rect.y0, rect.x1, rect.y0 + 1.0)
    }
}
