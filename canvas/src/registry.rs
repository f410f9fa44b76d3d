//! Drag sources: template gallery, photo gallery, and named variables.
//!
//! The remote service owns the canonical lists; this is the local mirror the
//! sidebar renders from and the persistence port saves.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use serde::{Deserialize, Serialize};

/// A named placeholder that can be dropped onto the canvas as `#{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Server-side id, absent for variables created offline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Variable name without the marker braces.
    #[serde(rename = "variable")]
    pub name: String,
}

impl Variable {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { id: None, name: name.into() }
    }
}

/// Local mirror of the gallery and variable lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    templates: Vec<String>,
    photos: Vec<String>,
    variables: Vec<Variable>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_parts(templates: Vec<String>, photos: Vec<String>, variables: Vec<Variable>) -> Self {
        Self { templates, photos, variables }
    }

    /// Append a background template. Returns false if it was already listed.
    pub fn add_template(&mut self, asset: impl Into<String>) -> bool {
        push_unique(&mut self.templates, asset.into())
    }

    /// Append a photo. Returns false if it was already listed.
    pub fn add_photo(&mut self, asset: impl Into<String>) -> bool {
        push_unique(&mut self.photos, asset.into())
    }

    /// Append a variable. Blank names and duplicates are rejected.
    pub fn add_variable(&mut self, variable: Variable) -> bool {
        let name = variable.name.trim();
        if name.is_empty() || self.variables.iter().any(|v| v.name == name) {
            return false;
        }
        self.variables.push(Variable { name: name.to_owned(), ..variable });
        true
    }

    /// Replace the variable list with a fresh server listing.
    pub fn set_variables(&mut self, variables: Vec<Variable>) {
        self.variables = variables;
    }

    #[must_use]
    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    #[must_use]
    pub fn photos(&self) -> &[String] {
        &self.photos
    }

    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }
}

fn push_unique(list: &mut Vec<String>, item: String) -> bool {
    if item.is_empty() || list.contains(&item) {
        return false;
    }
    list.push(item);
    true
}
