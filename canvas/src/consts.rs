//! Shared numeric constants for the canvas crate.

// ── Sizes ───────────────────────────────────────────────────────

/// Smallest width/height an element may have once a resize is committed.
pub const MIN_ELEMENT_SIZE_PX: f64 = 20.0;

/// Smallest width/height shown while a resize is still in progress.
pub const MIN_PREVIEW_SIZE_PX: f64 = 10.0;

/// Floor for the proportionally scaled font size of a text resize.
pub const MIN_FONT_SIZE_PX: f64 = 6.0;

/// Floor for a font size typed into the attribute editor.
pub const MIN_EDIT_FONT_SIZE_PX: f64 = 1.0;

// ── Defaults for new elements ───────────────────────────────────

/// Side length of a freshly placed photo.
pub const DEFAULT_PHOTO_SIZE_PX: f64 = 120.0;

/// Top-left of a text field added from the toolbar.
pub const DEFAULT_TEXT_X: f64 = 120.0;
pub const DEFAULT_TEXT_Y: f64 = 80.0;

pub const DEFAULT_FONT_SIZE_PX: f64 = 24.0;
pub const DEFAULT_TEXT_VALUE: &str = "New Text";
pub const DEFAULT_TEXT_COLOR: &str = "#000000";
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";

// ── Text metrics ────────────────────────────────────────────────

/// Average glyph advance as a fraction of the font size, used when a text
/// element has no measured box.
pub const GLYPH_ADVANCE_RATIO: f64 = 0.6;

/// Line box height as a multiple of the font size.
pub const LINE_HEIGHT_RATIO: f64 = 1.2;

// ── Export ──────────────────────────────────────────────────────

/// Width of the exported certificate box.
pub const EXPORT_CANVAS_WIDTH_PX: u32 = 1000;

/// Height of the exported certificate box.
pub const EXPORT_CANVAS_HEIGHT_PX: u32 = 700;
