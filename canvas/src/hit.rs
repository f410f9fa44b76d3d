#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::doc::{ElementId, ElementStore};
use crate::geom::Point;

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub element_id: ElementId,
    /// Position of the element in paint order.
    pub index: usize,
}

/// Find the top-most element whose box contains `at` (canvas space).
///
/// Boxes are axis-aligned; rotation is ignored, matching the bounds the
/// gesture engine clamps against. Edges count as inside.
#[must_use]
pub fn hit_test(at: Point, store: &ElementStore) -> Option<Hit> {
    store
        .elements()
        .iter()
        .enumerate()
        .rev()
        .find(|(_, el)| {
            let size = el.size();
            at.x >= el.x && at.x <= el.x + size.width && at.y >= el.y && at.y <= el.y + size.height
        })
        .map(|(index, el)| Hit { element_id: el.id, index })
}
