//! Persistence port: mirrors committed state into a key/value store.
//!
//! DESIGN
//! ======
//! The engine calls [`Persistence`] after every committed mutation; the
//! store layer itself never writes. Backends implement [`KeyValueStore`]:
//! [`MemoryStore`] for tests and headless hosts, [`LocalStorage`] in the
//! browser, and the CLI brings its own file-backed store.
//!
//! ERROR HANDLING
//! ==============
//! Loading never fails. A missing key, an unreadable backend, or malformed
//! JSON all recover as an empty collection (logged at `warn`). Inside a
//! readable element list, entries that don't parse are skipped one by one so
//! the rest of the design survives. Writes return [`StoreError`]; in-memory
//! state is kept either way.

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use wasm_bindgen::JsValue;

use crate::doc::Element;
use crate::registry::{Registry, Variable};

/// Committed elements.
pub const ELEMENTS_KEY: &str = "cert-elements";
/// Selected background image URL (plain string, not JSON).
pub const TEMPLATE_KEY: &str = "cert-template";
/// Background templates offered in the sidebar.
pub const TEMPLATE_GALLERY_KEY: &str = "template-gallery";
/// Photos offered in the sidebar.
pub const PHOTO_GALLERY_KEY: &str = "photo-gallery";
/// Named variables offered as drag sources.
pub const VARIABLES_KEY: &str = "cert-variables";

/// Errors produced by persistence backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend failed: {0}")]
    Backend(String),
    #[error("failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A string key/value store.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend rejects the write.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value, for hydrating tests and fixtures.
    #[must_use]
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Browser `window.localStorage` backend.
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// Open the page's local storage. `None` outside a browser or when the
    /// user agent denies access.
    #[must_use]
    pub fn open() -> Option<Self> {
        let window = web_sys::window()?;
        match window.local_storage() {
            Ok(Some(storage)) => Some(Self { storage }),
            Ok(None) => None,
            Err(err) => {
                warn!(error = ?err, "local storage unavailable");
                None
            }
        }
    }
}

fn js_error(err: JsValue) -> StoreError {
    StoreError::Backend(format!("{err:?}"))
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage.get_item(key).map_err(js_error)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage.set_item(key, value).map_err(js_error)
    }
}

/// Typed access to persisted designer state over any [`KeyValueStore`].
pub struct Persistence {
    backend: Box<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self { backend: Box::new(backend) }
    }

    /// Raw stored value for `key`, if readable.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "storage read failed");
                None
            }
        }
    }

    fn load_json<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let Some(raw) = self.raw(key) else {
            return T::default();
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "malformed persisted state; starting empty");
                T::default()
            }
        }
    }

    fn save_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(value)?;
        self.backend.set(key, &encoded)?;
        debug!(key, bytes = encoded.len(), "persisted");
        Ok(())
    }

    /// Stored elements in paint order. Unreadable entries are skipped.
    #[must_use]
    pub fn load_elements(&self) -> Vec<Element> {
        let entries: Vec<serde_json::Value> = self.load_json(ELEMENTS_KEY);
        let total = entries.len();
        let elements: Vec<Element> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(element) => Some(element),
                Err(err) => {
                    warn!(index, error = %err, "skipping unreadable stored element");
                    None
                }
            })
            .collect();
        if elements.len() < total {
            warn!(kept = elements.len(), total, "recovered partial element list");
        }
        elements
    }

    /// # Errors
    ///
    /// Returns a [`StoreError`] if encoding or the backend write fails.
    pub fn save_elements(&mut self, elements: &[Element]) -> Result<(), StoreError> {
        self.save_json(ELEMENTS_KEY, elements)
    }

    /// Selected background URL; an empty stored string means none.
    #[must_use]
    pub fn load_template(&self) -> Option<String> {
        self.raw(TEMPLATE_KEY).filter(|t| !t.is_empty())
    }

    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend write fails.
    pub fn save_template(&mut self, template: Option<&str>) -> Result<(), StoreError> {
        self.backend.set(TEMPLATE_KEY, template.unwrap_or(""))
    }

    #[must_use]
    pub fn load_registry(&self) -> Registry {
        let templates: Vec<String> = self.load_json(TEMPLATE_GALLERY_KEY);
        let photos: Vec<String> = self.load_json(PHOTO_GALLERY_KEY);
        let variables: Vec<Variable> = self.load_json(VARIABLES_KEY);
        Registry::from_parts(templates, photos, variables)
    }

    /// # Errors
    ///
    /// Returns the first [`StoreError`] hit while writing the three lists.
    pub fn save_registry(&mut self, registry: &Registry) -> Result<(), StoreError> {
        self.save_json(TEMPLATE_GALLERY_KEY, registry.templates())?;
        self.save_json(PHOTO_GALLERY_KEY, registry.photos())?;
        self.save_json(VARIABLES_KEY, registry.variables())
    }
}
