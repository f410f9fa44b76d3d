//! Geometry primitives shared by the store, the gesture engine, and hit-testing.
//!
//! All coordinates are CSS pixels relative to the canvas surface's top-left
//! corner unless a name says otherwise (`client_*` values are viewport
//! coordinates straight from DOM events).

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

/// A point in canvas or client space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height of a box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Snapshot of the canvas surface's layout box.
///
/// `left` / `top` are in client (viewport) coordinates and are only used to
/// translate drop positions; `width` / `height` bound every element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasRect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// A rectangle at the client origin, handy for tests and headless hosts.
    #[must_use]
    pub fn sized(width: f64, height: f64) -> Self {
        Self { left: 0.0, top: 0.0, width, height }
    }

    /// Convert a client-space point to canvas space, rounded to whole pixels
    /// and floored at the canvas origin.
    #[must_use]
    pub fn to_canvas(&self, client: Point) -> Point {
        Point {
            x: (client.x - self.left).round().max(0.0),
            y: (client.y - self.top).round().max(0.0),
        }
    }

    /// Centre of the canvas in canvas space.
    #[must_use]
    pub fn center(&self) -> Point {
        Point { x: self.width / 2.0, y: self.height / 2.0 }
    }
}

/// Saturating clamp of `value` into `[min, max]`.
///
/// Unlike [`f64::clamp`] this never panics: when `min > max` (an element
/// larger than the canvas) the result is `min`, pinning the element to the
/// canvas origin.
#[must_use]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// Read the current layout box of the canvas surface.
///
/// Returns a zero rectangle when the surface is not mounted yet.
#[must_use]
pub fn canvas_rect(surface: Option<&web_sys::Element>) -> CanvasRect {
    let Some(surface) = surface else {
        return CanvasRect::default();
    };
    let rect = surface.get_bounding_client_rect();
    CanvasRect {
        left: rect.left(),
        top: rect.top(),
        width: rect.width(),
        height: rect.height(),
    }
}
