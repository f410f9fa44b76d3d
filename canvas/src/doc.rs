//! Document model: placed elements, their attributes, and the ordered store.
//!
//! This module defines what sits on the certificate (`Element`, with its
//! text or photo `ElementBody`), a sparse-update type for attribute edits and
//! gesture commits (`ElementPatch`), single-key edits coming from the
//! attribute panel (`Attribute`), and the store that owns the committed
//! elements plus the selection (`ElementStore`).
//!
//! The store is the single source of committed truth. Gesture previews never
//! land here; only [`crate::engine::EngineCore`] commits do.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::consts::{
    DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE_PX, DEFAULT_PHOTO_SIZE_PX, DEFAULT_TEXT_COLOR, DEFAULT_TEXT_VALUE,
    GLYPH_ADVANCE_RATIO, LINE_HEIGHT_RATIO, MIN_EDIT_FONT_SIZE_PX,
};
use crate::geom::{Point, Size};

/// Unique identifier for a placed element.
pub type ElementId = Uuid;

/// Reads a stored element id.
///
/// Designs saved by the earlier browser designer carry a millisecond
/// timestamp instead of a UUID. Those map onto a fixed UUID so the same
/// design reloads with the same ids.
fn stored_id<'de, D: Deserializer<'de>>(de: D) -> Result<ElementId, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StoredId {
        Uuid(Uuid),
        Timestamp(u64),
    }

    Ok(match StoredId::deserialize(de)? {
        StoredId::Uuid(id) => id,
        StoredId::Timestamp(ms) => Uuid::from_u64_pair(0, ms),
    })
}

/// The kind of a placed element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Text,
    Photo,
}

/// Font face variant offered by the attribute panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Bold,
}

/// Rendering attributes of a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    /// Displayed text. May contain `#{name}` variable markers.
    pub value: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// CSS color string.
    pub color: String,
    #[serde(default)]
    pub font_style: FontStyle,
    /// CSS font-family list.
    pub font_family: String,
    /// Extra spacing between glyphs in pixels.
    #[serde(default)]
    pub letter_spacing: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            value: DEFAULT_TEXT_VALUE.to_owned(),
            font_size: DEFAULT_FONT_SIZE_PX,
            color: DEFAULT_TEXT_COLOR.to_owned(),
            font_style: FontStyle::Normal,
            font_family: DEFAULT_FONT_FAMILY.to_owned(),
            letter_spacing: 0.0,
        }
    }
}

/// Kind-specific payload of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementBody {
    Text(TextStyle),
    Photo {
        /// Resolved URL of the uploaded asset.
        src: String,
    },
}

/// An element as held in the store and in browser storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier for this element.
    #[serde(deserialize_with = "stored_id")]
    pub id: ElementId,
    /// Left edge relative to the canvas origin.
    pub x: f64,
    /// Top edge relative to the canvas origin.
    pub y: f64,
    /// Box width. Always set for photos; text leaves it empty until resized.
    #[serde(default)]
    pub width: Option<f64>,
    /// Box height. Always set for photos; text leaves it empty until resized.
    #[serde(default)]
    pub height: Option<f64>,
    /// Clockwise rotation in degrees around the box centre.
    #[serde(default)]
    pub rotate: f64,
    #[serde(flatten)]
    pub body: ElementBody,
}

impl Element {
    /// A default text field at `at`.
    #[must_use]
    pub fn text(at: Point) -> Self {
        Self::text_with(at, TextStyle::default())
    }

    /// A text element carrying a `#{name}` variable marker.
    #[must_use]
    pub fn variable(name: &str, at: Point) -> Self {
        Self::text_with(at, TextStyle { value: format!("#{{{name}}}"), ..TextStyle::default() })
    }

    /// A text element with explicit styling.
    #[must_use]
    pub fn text_with(at: Point, style: TextStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            x: at.x,
            y: at.y,
            width: None,
            height: None,
            rotate: 0.0,
            body: ElementBody::Text(style),
        }
    }

    /// A default-sized photo with its top-left at `at`.
    #[must_use]
    pub fn photo(src: impl Into<String>, at: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            x: at.x,
            y: at.y,
            width: Some(DEFAULT_PHOTO_SIZE_PX),
            height: Some(DEFAULT_PHOTO_SIZE_PX),
            rotate: 0.0,
            body: ElementBody::Photo { src: src.into() },
        }
    }

    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self.body {
            ElementBody::Text(_) => ElementKind::Text,
            ElementBody::Photo { .. } => ElementKind::Photo,
        }
    }

    /// Text attributes, if this is a text element.
    #[must_use]
    pub fn text_style(&self) -> Option<&TextStyle> {
        match &self.body {
            ElementBody::Text(style) => Some(style),
            ElementBody::Photo { .. } => None,
        }
    }

    #[must_use]
    pub fn font_size(&self) -> Option<f64> {
        self.text_style().map(|s| s.font_size)
    }

    /// Effective box size.
    ///
    /// Stored dimensions win. Text without a stored box is estimated from its
    /// font metrics; a photo missing dimensions falls back to the default
    /// photo size.
    #[must_use]
    pub fn size(&self) -> Size {
        let fallback = match &self.body {
            ElementBody::Text(style) => estimate_text_size(style),
            ElementBody::Photo { .. } => Size::new(DEFAULT_PHOTO_SIZE_PX, DEFAULT_PHOTO_SIZE_PX),
        };
        Size::new(self.width.unwrap_or(fallback.width), self.height.unwrap_or(fallback.height))
    }

    /// Merge a sparse update. Text-only fields are ignored on photos and
    /// `src` is ignored on text.
    pub fn apply(&mut self, patch: &ElementPatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(w) = patch.width {
            self.width = Some(w);
        }
        if let Some(h) = patch.height {
            self.height = Some(h);
        }
        if let Some(r) = patch.rotate {
            self.rotate = r;
        }
        match &mut self.body {
            ElementBody::Text(style) => {
                if let Some(ref value) = patch.value {
                    style.value.clone_from(value);
                }
                if let Some(size) = patch.font_size {
                    style.font_size = size;
                }
                if let Some(ref color) = patch.color {
                    style.color.clone_from(color);
                }
                if let Some(font_style) = patch.font_style {
                    style.font_style = font_style;
                }
                if let Some(ref family) = patch.font_family {
                    style.font_family.clone_from(family);
                }
                if let Some(spacing) = patch.letter_spacing {
                    style.letter_spacing = spacing;
                }
            }
            ElementBody::Photo { src } => {
                if let Some(ref new_src) = patch.src {
                    src.clone_from(new_src);
                }
            }
        }
    }
}

/// Rough box for unmeasured text: one glyph advance per character on the
/// longest line, one line box per line.
fn estimate_text_size(style: &TextStyle) -> Size {
    let lines = style.value.split('\n');
    let (count, longest) = lines.fold((0_usize, 0_usize), |(n, max), line| (n + 1, max.max(line.chars().count())));
    #[allow(clippy::cast_precision_loss)]
    let (count, longest) = (count.max(1) as f64, longest as f64);
    Size::new(
        longest * (style.font_size * GLYPH_ADVANCE_RATIO + style.letter_spacing),
        count * style.font_size * LINE_HEIGHT_RATIO,
    )
}

/// Sparse update for an element. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

/// A single attribute edit from the element panel.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Value(String),
    FontSize(f64),
    Color(String),
    FontStyle(FontStyle),
    FontFamily(String),
    LetterSpacing(f64),
    Src(String),
}

impl From<Attribute> for ElementPatch {
    fn from(attr: Attribute) -> Self {
        match attr {
            Attribute::Value(v) => Self { value: Some(v), ..Self::default() },
            Attribute::FontSize(size) => Self { font_size: Some(whole_px(size, MIN_EDIT_FONT_SIZE_PX)), ..Self::default() },
            Attribute::Color(c) => Self { color: Some(c), ..Self::default() },
            Attribute::FontStyle(s) => Self { font_style: Some(s), ..Self::default() },
            Attribute::FontFamily(f) => Self { font_family: Some(f), ..Self::default() },
            Attribute::LetterSpacing(s) => Self { letter_spacing: Some(whole_px(s, f64::MIN)), ..Self::default() },
            Attribute::Src(s) => Self { src: Some(s), ..Self::default() },
        }
    }
}

/// Truncates toward zero like the panel's number inputs. Non-numeric input
/// reads as 0 and the result never drops below `floor`.
fn whole_px(raw: f64, floor: f64) -> f64 {
    let whole = if raw.is_finite() { raw.trunc() } else { 0.0 };
    whole.max(floor)
}

/// Ordered store of committed elements plus the current selection.
///
/// The selection is tracked by id so it survives removals of other
/// elements; [`ElementStore::selected_index`] derives the index on demand.
#[derive(Debug, Default)]
pub struct ElementStore {
    elements: Vec<Element>,
    selected: Option<ElementId>,
}

impl ElementStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element and select it. Returns its index.
    pub fn add(&mut self, element: Element) -> usize {
        self.selected = Some(element.id);
        self.elements.push(element);
        self.elements.len() - 1
    }

    /// Remove an element by id, returning it if it was present. Clears the
    /// selection when the removed element was selected.
    pub fn remove(&mut self, id: &ElementId) -> Option<Element> {
        let index = self.index_of(id)?;
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        Some(self.elements.remove(index))
    }

    /// Merge `patch` into the element with `id`. Returns false if it doesn't exist.
    pub fn update_attribute(&mut self, id: &ElementId, patch: &ElementPatch) -> bool {
        let Some(element) = self.elements.iter_mut().find(|e| e.id == *id) else {
            return false;
        };
        element.apply(patch);
        true
    }

    /// Replace every element. A selection pointing at an element that is no
    /// longer present is dropped.
    pub fn replace_all(&mut self, elements: Vec<Element>) {
        self.elements = elements;
        if let Some(id) = self.selected {
            if self.index_of(&id).is_none() {
                self.selected = None;
            }
        }
    }

    /// Select by index; `None` or an out-of-range index clears the selection.
    /// Returns the resulting selected index.
    pub fn select(&mut self, index: Option<usize>) -> Option<usize> {
        self.selected = index.and_then(|i| self.elements.get(i)).map(|e| e.id);
        self.selected_index()
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<ElementId> {
        self.selected
    }

    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        self.selected.and_then(|id| self.index_of(&id))
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Element> {
        self.selected.and_then(|id| self.get(&id))
    }

    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == *id)
    }

    #[must_use]
    pub fn index_of(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == *id)
    }

    /// All elements in paint order (first is bottom-most).
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
