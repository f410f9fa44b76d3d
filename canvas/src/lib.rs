//! Certificate canvas: element store and interactive transform engine.
//!
//! This crate is compiled to WebAssembly and runs in the browser next to the
//! designer page. It owns everything with real invariants: the ordered list
//! of placed elements, the single selection, and the drag/resize/rotate
//! gesture pipelines that turn pointer movement into clamped geometry. The
//! host page wires DOM events into [`engine::Engine`], paints the
//! [`render::ElementView`]s it gets back, and never edits geometry itself.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Element types and the ordered [`doc::ElementStore`] |
//! | [`gesture`] | Transient per-gesture records and live previews |
//! | [`geom`] | Points, sizes, canvas rectangle, clamping |
//! | [`hit`] | Click hit-testing against element boxes |
//! | [`render`] | Resolved per-element views and inline CSS |
//! | [`export`] | Static HTML export of the committed design |
//! | [`persist`] | Key/value persistence port and its adapters |
//! | [`registry`] | Template/photo galleries and variable list |
//! | [`consts`] | Shared numeric constants (minimum sizes, defaults) |

pub mod consts;
pub mod doc;
pub mod engine;
pub mod export;
pub mod geom;
pub mod gesture;
pub mod hit;
pub mod persist;
pub mod registry;
pub mod render;
