use tracing::{debug, info, warn};

use crate::consts::{DEFAULT_PHOTO_SIZE_PX, DEFAULT_TEXT_X, DEFAULT_TEXT_Y, MIN_ELEMENT_SIZE_PX, MIN_FONT_SIZE_PX, MIN_PREVIEW_SIZE_PX};
use crate::doc::{Attribute, Element, ElementId, ElementPatch, ElementStore};
use crate::geom::{self, CanvasRect, Point, Size, clamp};
use crate::gesture::{GestureKind, GestureRecord, GestureTable, LivePreview};
use crate::hit;
use crate::persist::{LocalStorage, Persistence, StoreError};
use crate::registry::{Registry, Variable};
use crate::render::{self, ElementView};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from engine calls for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    ElementAdded { index: usize, element: Element },
    ElementUpdated { id: ElementId, fields: ElementPatch },
    ElementRemoved { id: ElementId },
    ElementsCleared,
    SelectionChanged(Option<usize>),
    /// Visual-only update while a gesture is active. Nothing was committed.
    PreviewChanged { id: ElementId, preview: LivePreview },
    /// A gesture was abandoned; the host should drop any visual overrides.
    PreviewDiscarded { id: ElementId },
    TemplateChanged(Option<String>),
    RegistryChanged,
}

/// What the user dragged from the sidebar onto the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropPayload {
    /// A background template asset name.
    Template(String),
    /// A photo asset name.
    Photo(String),
    /// A variable name, dropped as a `#{name}` text element.
    Variable(String),
}

/// Runtime settings for the designer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesignerConfig {
    /// Base URL of the asset service; uploads are served from `{asset_base}/uploads/`.
    pub asset_base: String,
}

impl DesignerConfig {
    #[must_use]
    pub fn new(asset_base: impl Into<String>) -> Self {
        Self { asset_base: asset_base.into() }
    }

    /// Public URL of an uploaded asset.
    #[must_use]
    pub fn asset_url(&self, file: &str) -> String {
        format!("{}/uploads/{file}", self.asset_base.trim_end_matches('/'))
    }
}

/// Core engine state: all logic that doesn't depend on the DOM.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
/// Every call that needs canvas bounds takes a freshly read [`CanvasRect`].
#[derive(Default)]
pub struct EngineCore {
    pub store: ElementStore,
    pub gestures: GestureTable,
    pub registry: Registry,
    pub template: Option<String>,
    pub config: DesignerConfig,
    persistence: Option<Persistence>,
    /// Most recent failed write, kept until the host takes it.
    persist_error: Option<StoreError>,
}

impl EngineCore {
    #[must_use]
    pub fn new(config: DesignerConfig) -> Self {
        Self { config, ..Self::default() }
    }

    /// Create an engine hydrated from `persistence`, which is then mirrored on
    /// every commit.
    #[must_use]
    pub fn with_persistence(config: DesignerConfig, persistence: Persistence) -> Self {
        let mut store = ElementStore::new();
        store.replace_all(persistence.load_elements());
        let registry = persistence.load_registry();
        let template = persistence.load_template();
        info!(
            elements = store.len(),
            templates = registry.templates().len(),
            photos = registry.photos().len(),
            variables = registry.variables().len(),
            "designer state restored"
        );
        Self {
            store,
            gestures: GestureTable::new(),
            registry,
            template,
            config,
            persistence: Some(persistence),
            persist_error: None,
        }
    }

    /// The attached persistence port, if any.
    #[must_use]
    pub fn persistence(&self) -> Option<&Persistence> {
        self.persistence.as_ref()
    }

    /// Take the last persistence failure since the previous call.
    ///
    /// Commits keep their in-memory effect when a write fails. Hosts whose
    /// store is the only copy of the design check this after each call.
    pub fn take_persist_error(&mut self) -> Option<StoreError> {
        self.persist_error.take()
    }

    // --- Persistence mirroring ---

    fn record_persist_result(&mut self, what: &'static str, result: Result<(), StoreError>) {
        if let Err(err) = result {
            warn!(what, error = %err, "failed to persist");
            self.persist_error = Some(err);
        }
    }

    fn mirror_elements(&mut self) {
        let Some(p) = self.persistence.as_mut() else {
            return;
        };
        let result = p.save_elements(self.store.elements());
        self.record_persist_result("elements", result);
    }

    fn mirror_template(&mut self) {
        let Some(p) = self.persistence.as_mut() else {
            return;
        };
        let result = p.save_template(self.template.as_deref());
        self.record_persist_result("template", result);
    }

    fn mirror_registry(&mut self) {
        let Some(p) = self.persistence.as_mut() else {
            return;
        };
        let result = p.save_registry(&self.registry);
        self.record_persist_result("registry", result);
    }

    /// Discard every active gesture without committing.
    fn abandon_gestures(&mut self) -> Option<ElementId> {
        if self.gestures.is_empty() {
            return None;
        }
        let id = self.store.selected_id().filter(|id| self.gestures.is_active(id));
        let dropped = self.gestures.clear();
        if dropped > 0 {
            debug!(dropped, "abandoned unfinished gesture");
        }
        id
    }

    // --- Element store ---

    /// Append an element and select it.
    pub fn add_element(&mut self, element: Element) -> Action {
        self.abandon_gestures();
        let index = self.store.add(element.clone());
        self.mirror_elements();
        debug!(id = %element.id, index, kind = ?element.kind(), "element added");
        Action::ElementAdded { index, element }
    }

    /// Add a default text field from the toolbar.
    pub fn add_text(&mut self) -> Action {
        self.add_element(Element::text(Point::new(DEFAULT_TEXT_X, DEFAULT_TEXT_Y)))
    }

    /// Add a gallery photo centred on the canvas.
    pub fn add_photo(&mut self, bounds: CanvasRect, file: &str) -> Action {
        let half = DEFAULT_PHOTO_SIZE_PX / 2.0;
        let center = bounds.center();
        let at = Point::new((center.x - half).round(), (center.y - half).round());
        let src = self.config.asset_url(file);
        self.add_element(Element::photo(src, at))
    }

    /// Handle a drop from the sidebar at a client-space position.
    pub fn drop_item(&mut self, bounds: CanvasRect, client: Point, payload: DropPayload) -> Action {
        let at = bounds.to_canvas(client);
        match payload {
            DropPayload::Template(file) => {
                let url = self.config.asset_url(&file);
                self.set_template(Some(url))
            }
            DropPayload::Photo(file) => {
                let src = self.config.asset_url(&file);
                self.add_element(Element::photo(src, at))
            }
            DropPayload::Variable(name) => self.add_element(Element::variable(&name, at)),
        }
    }

    /// Remove an element by id. Any gesture on it is abandoned.
    pub fn remove_element(&mut self, id: &ElementId) -> Action {
        if self.gestures.take(id).is_some() {
            debug!(%id, "abandoned gesture on removed element");
        }
        if self.store.remove(id).is_none() {
            return Action::None;
        }
        self.mirror_elements();
        Action::ElementRemoved { id: *id }
    }

    /// Apply a single attribute edit from the element panel.
    pub fn set_attribute(&mut self, id: &ElementId, attr: Attribute) -> Action {
        let fields = ElementPatch::from(attr);
        if !self.store.update_attribute(id, &fields) {
            return Action::None;
        }
        self.mirror_elements();
        Action::ElementUpdated { id: *id, fields }
    }

    /// Remove every element.
    pub fn clear(&mut self) -> Action {
        self.abandon_gestures();
        self.store.replace_all(Vec::new());
        self.mirror_elements();
        Action::ElementsCleared
    }

    /// Replace every element, e.g. with a design loaded from elsewhere.
    pub fn load(&mut self, elements: Vec<Element>) -> Action {
        self.abandon_gestures();
        self.store.replace_all(elements);
        self.mirror_elements();
        Action::SelectionChanged(self.store.selected_index())
    }

    /// Select by index (or clear with `None`). Changing the selection abandons
    /// any active gesture.
    pub fn select(&mut self, index: Option<usize>) -> Action {
        let before = self.store.selected_id();
        let target = index.and_then(|i| self.store.elements().get(i)).map(|e| e.id);
        if before != target {
            self.abandon_gestures();
        }
        Action::SelectionChanged(self.store.select(index))
    }

    /// Handle a click at a canvas-space point: select what is under it.
    pub fn click(&mut self, at: Point) -> Action {
        let index = hit::hit_test(at, &self.store).map(|h| h.index);
        self.select(index)
    }

    // --- Template / registry ---

    /// Set or clear the background image URL.
    pub fn set_template(&mut self, template: Option<String>) -> Action {
        self.template = template;
        self.mirror_template();
        Action::TemplateChanged(self.template.clone())
    }

    pub fn add_template_asset(&mut self, file: &str) -> Action {
        if !self.registry.add_template(file) {
            return Action::None;
        }
        self.mirror_registry();
        Action::RegistryChanged
    }

    pub fn add_photo_asset(&mut self, file: &str) -> Action {
        if !self.registry.add_photo(file) {
            return Action::None;
        }
        self.mirror_registry();
        Action::RegistryChanged
    }

    pub fn add_variable(&mut self, variable: Variable) -> Action {
        if !self.registry.add_variable(variable) {
            return Action::None;
        }
        self.mirror_registry();
        Action::RegistryChanged
    }

    // --- Gestures: begin ---

    /// Start dragging the selected element.
    pub fn begin_drag(&mut self, bounds: CanvasRect, measured: Option<Size>) -> Action {
        self.begin(GestureKind::Drag, bounds, measured)
    }

    /// Start resizing the selected element.
    pub fn begin_resize(&mut self, bounds: CanvasRect, measured: Option<Size>) -> Action {
        self.begin(GestureKind::Resize, bounds, measured)
    }

    /// Start rotating the selected element.
    pub fn begin_rotate(&mut self, bounds: CanvasRect) -> Action {
        self.begin(GestureKind::Rotate, bounds, None)
    }

    fn begin(&mut self, kind: GestureKind, bounds: CanvasRect, measured: Option<Size>) -> Action {
        let Some(element) = self.store.selected() else {
            return Action::None;
        };
        let id = element.id;
        let record = GestureRecord::begin(kind, element, measured, bounds);
        let preview = record.preview;
        self.abandon_gestures();
        self.gestures.insert(id, record);
        debug!(%id, ?kind, "gesture started");
        Action::PreviewChanged { id, preview }
    }

    /// Active record of `kind` on the selected element.
    fn active(&mut self, kind: GestureKind) -> Option<(ElementId, &mut GestureRecord)> {
        let id = self.store.selected_id()?;
        let record = self.gestures.get_mut(&id)?;
        if record.kind != kind {
            return None;
        }
        Some((id, record))
    }

    // --- Gestures: update ---

    /// Propose a drag offset from the gesture start. The box is clamped inside
    /// the canvas (rotation is not considered) and shown as a preview only.
    pub fn drag_to(&mut self, bounds: CanvasRect, tx_raw: f64, ty_raw: f64) -> Action {
        let Some((id, rec)) = self.active(GestureKind::Drag) else {
            return Action::None;
        };
        let left = clamp(rec.start_x + tx_raw, 0.0, (bounds.width - rec.start_width).floor());
        let top = clamp(rec.start_y + ty_raw, 0.0, (bounds.height - rec.start_height).floor());
        rec.tx = left - rec.start_x;
        rec.ty = top - rec.start_y;
        rec.bounds = bounds;
        rec.updated = true;
        rec.preview.x = left;
        rec.preview.y = top;
        Action::PreviewChanged { id, preview: rec.preview }
    }

    /// Propose a new box from a resize handle. `tx` / `ty` move the top-left
    /// when a north or west handle is dragged.
    pub fn resize_to(&mut self, bounds: CanvasRect, width: f64, height: f64, tx: f64, ty: f64) -> Action {
        let Some((id, rec)) = self.active(GestureKind::Resize) else {
            return Action::None;
        };
        let (left, width, tx) = fit_leading_edge(rec.start_x, width, tx);
        let (top, height, ty) = fit_leading_edge(rec.start_y, height, ty);
        let width = width.min(bounds.width - left).max(MIN_PREVIEW_SIZE_PX);
        let height = height.min(bounds.height - top).max(MIN_PREVIEW_SIZE_PX);

        let font_size = match rec.start_font {
            Some(start_font) if rec.start_height > 0.0 => {
                Some((start_font * (height / rec.start_height)).max(MIN_FONT_SIZE_PX))
            }
            other => other,
        };

        rec.tx = tx;
        rec.ty = ty;
        rec.bounds = bounds;
        rec.updated = true;
        rec.preview = LivePreview { x: left, y: top, width, height, rotate: rec.preview.rotate, font_size };
        Action::PreviewChanged { id, preview: rec.preview }
    }

    /// Propose an absolute rotation in degrees. Unbounded, no clamping.
    pub fn rotate_to(&mut self, angle: f64) -> Action {
        let Some((id, rec)) = self.active(GestureKind::Rotate) else {
            return Action::None;
        };
        rec.updated = true;
        rec.preview.rotate = angle;
        Action::PreviewChanged { id, preview: rec.preview }
    }

    // --- Gestures: end / cancel ---

    /// Commit the active gesture on the selected element as a single merge.
    pub fn end_gesture(&mut self) -> Action {
        let Some(id) = self.store.selected_id() else {
            return Action::None;
        };
        let Some(rec) = self.gestures.take(&id) else {
            return Action::None;
        };
        if !rec.updated {
            debug!(%id, kind = ?rec.kind, "gesture ended without movement");
            return Action::PreviewDiscarded { id };
        }
        let fields = commit_fields(&rec);
        if !self.store.update_attribute(&id, &fields) {
            return Action::None;
        }
        self.mirror_elements();
        debug!(%id, kind = ?rec.kind, "gesture committed");
        Action::ElementUpdated { id, fields }
    }

    /// Abandon the active gesture without committing anything.
    pub fn cancel_gesture(&mut self) -> Action {
        match self.abandon_gestures() {
            Some(id) => Action::PreviewDiscarded { id },
            None => Action::None,
        }
    }

    // --- Queries ---

    /// The currently selected index, if any.
    #[must_use]
    pub fn selection(&self) -> Option<usize> {
        self.store.selected_index()
    }

    /// Look up an element by id.
    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.store.get(id)
    }

    /// Per-element render views, preview-aware.
    #[must_use]
    pub fn views(&self) -> Vec<ElementView<'_>> {
        render::views(&self.store, &self.gestures)
    }
}

/// Keep the leading edge of a resized box on the canvas by shrinking the
/// span by however far the edge overshoots the origin.
///
/// Returns `(edge, span, offset)`.
fn fit_leading_edge(start: f64, span: f64, offset: f64) -> (f64, f64, f64) {
    let edge = start + offset;
    if edge < 0.0 {
        return (0.0, span + edge, -start);
    }
    (edge, span, offset)
}

/// Fit a committed span into `[0, limit]`, moving the origin back if the
/// size floor pushed the far edge out.
fn fit_span(origin: f64, span: f64, limit: f64) -> (f64, f64) {
    let span = span.min(limit.floor()).max(MIN_ELEMENT_SIZE_PX);
    (clamp(origin, 0.0, (limit - span).floor()), span)
}

/// The single merge a finished gesture commits.
fn commit_fields(rec: &GestureRecord) -> ElementPatch {
    let x = (rec.start_x + rec.tx).round();
    let y = (rec.start_y + rec.ty).round();
    match rec.kind {
        GestureKind::Drag => ElementPatch { x: Some(x), y: Some(y), ..ElementPatch::default() },
        GestureKind::Resize => {
            let (x, width) = fit_span(x, rec.preview.width.round(), rec.bounds.width);
            let (y, height) = fit_span(y, rec.preview.height.round(), rec.bounds.height);
            ElementPatch {
                x: Some(x),
                y: Some(y),
                width: Some(width),
                height: Some(height),
                font_size: rec.preview.font_size.map(f64::round),
                ..ElementPatch::default()
            }
        }
        GestureKind::Rotate => ElementPatch { rotate: Some(rec.preview.rotate), ..ElementPatch::default() },
    }
}

/// The full designer engine. Wraps `EngineCore` and owns the DOM surface.
///
/// Each gesture and drop call reads the surface rectangle fresh, since the
/// page layout may change between events.
pub struct Engine {
    surface: Option<web_sys::Element>,
    pub core: EngineCore,
}

impl Engine {
    /// Create an engine bound to the given surface element.
    #[must_use]
    pub fn new(surface: Option<web_sys::Element>, core: EngineCore) -> Self {
        Self { surface, core }
    }

    /// Create an engine mirrored into `window.localStorage`. Falls back to an
    /// unpersisted engine when storage is unavailable.
    #[must_use]
    pub fn in_browser(surface: Option<web_sys::Element>, config: DesignerConfig) -> Self {
        let core = match LocalStorage::open() {
            Some(storage) => EngineCore::with_persistence(config, Persistence::new(storage)),
            None => {
                warn!("local storage unavailable; designer state will not persist");
                EngineCore::new(config)
            }
        };
        Self::new(surface, core)
    }

    /// Attach (or replace) the surface once it is mounted.
    pub fn mount(&mut self, surface: web_sys::Element) {
        self.surface = Some(surface);
    }

    /// Current rectangle of the surface; zero when unmounted.
    #[must_use]
    pub fn canvas_rect(&self) -> CanvasRect {
        geom::canvas_rect(self.surface.as_ref())
    }

    // --- Surface events ---

    pub fn on_drop(&mut self, client: Point, payload: DropPayload) -> Action {
        let bounds = self.canvas_rect();
        self.core.drop_item(bounds, client, payload)
    }

    pub fn on_click(&mut self, client: Point) -> Action {
        let bounds = self.canvas_rect();
        let at = Point::new(client.x - bounds.left, client.y - bounds.top);
        self.core.click(at)
    }

    pub fn add_photo(&mut self, file: &str) -> Action {
        let bounds = self.canvas_rect();
        self.core.add_photo(bounds, file)
    }

    // --- Gestures ---

    pub fn begin_drag(&mut self, measured: Option<Size>) -> Action {
        let bounds = self.canvas_rect();
        self.core.begin_drag(bounds, measured)
    }

    pub fn drag_to(&mut self, tx_raw: f64, ty_raw: f64) -> Action {
        let bounds = self.canvas_rect();
        self.core.drag_to(bounds, tx_raw, ty_raw)
    }

    pub fn begin_resize(&mut self, measured: Option<Size>) -> Action {
        let bounds = self.canvas_rect();
        self.core.begin_resize(bounds, measured)
    }

    pub fn resize_to(&mut self, width: f64, height: f64, tx: f64, ty: f64) -> Action {
        let bounds = self.canvas_rect();
        self.core.resize_to(bounds, width, height, tx, ty)
    }

    pub fn begin_rotate(&mut self) -> Action {
        let bounds = self.canvas_rect();
        self.core.begin_rotate(bounds)
    }

    pub fn rotate_to(&mut self, angle: f64) -> Action {
        self.core.rotate_to(angle)
    }

    pub fn end_gesture(&mut self) -> Action {
        self.core.end_gesture()
    }

    pub fn cancel_gesture(&mut self) -> Action {
        self.core.cancel_gesture()
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn selection(&self) -> Option<usize> {
        self.core.selection()
    }

    #[must_use]
    pub fn views(&self) -> Vec<ElementView<'_>> {
        self.core.views()
    }
}
