//! Render views: the geometry a painter should show for each element.
//!
//! While a gesture is active on an element, its [`LivePreview`] wins over the
//! committed values; otherwise the committed element is shown as-is. Hosts
//! never inspect gesture state themselves.
//!
//! The same inline-CSS builder backs the static export in [`crate::export`],
//! which always works from committed views.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::doc::{Element, ElementBody, ElementStore, FontStyle};
use crate::gesture::{GestureKind, GestureRecord, GestureTable, LivePreview};

/// Resolved geometry of one element for painting.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementView<'a> {
    pub element: &'a Element,
    pub x: f64,
    pub y: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotate: f64,
    /// Effective font size for text; `None` for photos.
    pub font_size: Option<f64>,
    pub selected: bool,
    /// True while a gesture preview is being shown instead of committed state.
    pub live: bool,
}

impl<'a> ElementView<'a> {
    /// View of the committed element.
    #[must_use]
    pub fn committed(element: &'a Element) -> Self {
        Self {
            element,
            x: element.x,
            y: element.y,
            width: element.width,
            height: element.height,
            rotate: element.rotate,
            font_size: element.font_size(),
            selected: false,
            live: false,
        }
    }

    fn with_preview(element: &'a Element, rec: &GestureRecord) -> Self {
        let LivePreview { x, y, width, height, rotate, font_size } = rec.preview;
        let mut view = Self { live: true, ..Self::committed(element) };
        match rec.kind {
            GestureKind::Drag => {
                view.x = x;
                view.y = y;
            }
            GestureKind::Resize => {
                view.x = x;
                view.y = y;
                view.width = Some(width);
                view.height = Some(height);
                view.font_size = font_size;
            }
            GestureKind::Rotate => view.rotate = rotate,
        }
        view
    }

    /// Inline CSS positioning and styling this element inside the canvas.
    #[must_use]
    pub fn style(&self) -> String {
        let mut css = format!("position:absolute; left:{}px; top:{}px;", self.x, self.y);
        if let Some(w) = self.width {
            css.push_str(&format!(" width:{w}px;"));
        }
        if let Some(h) = self.height {
            css.push_str(&format!(" height:{h}px;"));
        }
        css.push_str(&format!(" transform: rotate({}deg);", self.rotate));

        if let ElementBody::Text(text) = &self.element.body {
            let font_size = self.font_size.unwrap_or(text.font_size);
            let italic = if text.font_style == FontStyle::Italic { "italic" } else { "normal" };
            let weight = if text.font_style == FontStyle::Bold { "bold" } else { "normal" };
            css.push_str(&format!(
                " font-size:{font_size}px; color:{}; font-style:{italic}; font-weight:{weight}; font-family: {}; letter-spacing:{}px; white-space: pre-wrap;",
                text.color, text.font_family, text.letter_spacing
            ));
        }
        css
    }
}

/// Views for every element in paint order.
#[must_use]
pub fn views<'a>(store: &'a ElementStore, gestures: &GestureTable) -> Vec<ElementView<'a>> {
    let selected = store.selected_id();
    store
        .elements()
        .iter()
        .map(|el| {
            let mut view = match gestures.get(&el.id) {
                Some(rec) => ElementView::with_preview(el, rec),
                None => ElementView::committed(el),
            };
            view.selected = selected == Some(el.id);
            view
        })
        .collect()
}
