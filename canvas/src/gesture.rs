//! Transient gesture state: what an in-progress drag, resize, or rotate knows.
//!
//! A `GestureRecord` is created when a gesture begins, rewritten by every
//! pointer update, and removed when the gesture ends or is abandoned. It
//! carries the committed geometry snapshot taken at the start, the clamped
//! offset proposed so far, and the `LivePreview` a renderer should show
//! instead of the committed element while the gesture runs.
//!
//! Records live in a `GestureTable` keyed by element id. Nothing in here is
//! ever persisted.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use std::collections::HashMap;

use crate::doc::{Element, ElementId};
use crate::geom::{CanvasRect, Size};

/// Which pipeline a gesture belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize,
    Rotate,
}

/// Geometry shown while a gesture is active. Never committed directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LivePreview {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotate: f64,
    /// Scaled font size for text resizes; `None` for photos.
    pub font_size: Option<f64>,
}

/// Working values for one active gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureRecord {
    pub kind: GestureKind,
    /// Committed x at the start of the gesture.
    pub start_x: f64,
    /// Committed y at the start of the gesture.
    pub start_y: f64,
    /// Box width at the start of the gesture (measured or stored).
    pub start_width: f64,
    /// Box height at the start of the gesture (measured or stored).
    pub start_height: f64,
    /// Rotation at the start of the gesture.
    pub start_rotate: f64,
    /// Font size at the start of a text gesture.
    pub start_font: Option<f64>,
    /// Clamped horizontal offset from `start_x`.
    pub tx: f64,
    /// Clamped vertical offset from `start_y`.
    pub ty: f64,
    /// Canvas rectangle seen by the most recent begin/update.
    pub bounds: CanvasRect,
    /// Set by the first update; ending an untouched gesture commits nothing.
    pub updated: bool,
    pub preview: LivePreview,
}

impl GestureRecord {
    /// Snapshot `element` as the starting point of a `kind` gesture.
    ///
    /// `measured` is the rendered box reported by the host; without it the
    /// element's stored (or estimated) size is used.
    #[must_use]
    pub fn begin(kind: GestureKind, element: &Element, measured: Option<Size>, bounds: CanvasRect) -> Self {
        let size = measured.unwrap_or_else(|| element.size());
        let start_font = element.font_size();
        Self {
            kind,
            start_x: element.x,
            start_y: element.y,
            start_width: size.width,
            start_height: size.height,
            start_rotate: element.rotate,
            start_font,
            tx: 0.0,
            ty: 0.0,
            bounds,
            updated: false,
            preview: LivePreview {
                x: element.x,
                y: element.y,
                width: size.width,
                height: size.height,
                rotate: element.rotate,
                font_size: start_font,
            },
        }
    }
}

/// Active gesture records keyed by element id.
#[derive(Debug, Default)]
pub struct GestureTable {
    records: HashMap<ElementId, GestureRecord>,
}

impl GestureTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `record` for `id`, replacing any previous record.
    pub fn insert(&mut self, id: ElementId, record: GestureRecord) -> Option<GestureRecord> {
        self.records.insert(id, record)
    }

    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&GestureRecord> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut GestureRecord> {
        self.records.get_mut(id)
    }

    /// Remove and return the record for `id`.
    pub fn take(&mut self, id: &ElementId) -> Option<GestureRecord> {
        self.records.remove(id)
    }

    /// Drop every record. Returns how many were discarded.
    pub fn clear(&mut self) -> usize {
        let n = self.records.len();
        self.records.clear();
        n
    }

    #[must_use]
    pub fn is_active(&self, id: &ElementId) -> bool {
        self.records.contains_key(id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
