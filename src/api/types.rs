//! Wire types for the certificate REST service and the pure helpers that
//! build requests and read responses.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use canvas::registry::Variable;

/// Errors from talking to the certificate service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request never produced a response.
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API response error: status {status}")]
    Response { status: u16, body: String },

    /// The response body was not what the endpoint promises.
    #[error("API response parse failed: {0}")]
    Parse(String),

    /// Upload succeeded but no stored file name came back.
    #[error("upload returned no stored file name")]
    MissingStoredName,

    /// Template titles must not be blank.
    #[error("certificate title is required")]
    EmptyTitle,

    #[error("I/O error on {path}: {source}")]
    Io { path: String, source: std::io::Error },

    #[error("timestamp formatting failed: {0}")]
    Timestamp(#[from] time::error::Format),
}

// =============================================================================
// REQUESTS
// =============================================================================

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct GalleryImageRequest<'a> {
    pub img_path: &'a str,
    /// `1` for background templates, `0` for photos.
    pub is_background: u8,
    pub title: &'a str,
    pub createdon: &'a str,
    pub createdby: &'a str,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct VariableRequest<'a> {
    pub variable: &'a str,
    pub createdon: &'a str,
    pub createdby: &'a str,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct TemplateRequest<'a> {
    /// Always `null`: the service assigns ids.
    pub id: Option<i64>,
    pub title: &'a str,
    pub templatetext: &'a str,
    pub createdby: &'a str,
    pub createdon: &'a str,
}

/// Name an upload is sent under: a fresh uuid prefix keeps repeated
/// uploads of the same file distinct.
#[must_use]
pub fn upload_name(id: Uuid, original: &str) -> String {
    format!("{id}-{original}")
}

/// Trimmed title, or [`ApiError::EmptyTitle`] when nothing is left.
///
/// # Errors
///
/// Returns [`ApiError::EmptyTitle`] for blank input.
pub fn validate_title(raw: &str) -> Result<&str, ApiError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ApiError::EmptyTitle);
    }
    Ok(title)
}

// =============================================================================
// RESPONSES
// =============================================================================

/// `{ "Data": [...] }` envelope used by the list endpoints. A missing or
/// `null` list reads as empty.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Listing<T> {
    #[serde(rename = "Data", default)]
    data: Option<Vec<T>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GalleryImage {
    pub img_path: String,
    #[serde(default)]
    pub is_background: i64,
}

/// Uploaded images split by role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gallery {
    pub templates: Vec<String>,
    pub photos: Vec<String>,
}

impl Gallery {
    /// Partition images into templates (`is_background == 1`) and photos
    /// (`0`). Other flags are dropped.
    #[must_use]
    pub fn split(images: Vec<GalleryImage>) -> Self {
        let mut gallery = Self::default();
        for image in images {
            match image.is_background {
                1 => gallery.templates.push(image.img_path),
                0 => gallery.photos.push(image.img_path),
                _ => {}
            }
        }
        gallery
    }
}

fn parse_listing<T: for<'de> Deserialize<'de>>(body: &str) -> Result<Vec<T>, ApiError> {
    let listing: Listing<T> = serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))?;
    Ok(listing.data.unwrap_or_default())
}

/// Read the `certificate_images` listing.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] when the body is not a listing.
pub fn parse_images(body: &str) -> Result<Gallery, ApiError> {
    parse_listing(body).map(Gallery::split)
}

/// Read the `certificate_variables` listing.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] when the body is not a listing.
pub fn parse_variables(body: &str) -> Result<Vec<Variable>, ApiError> {
    parse_listing(body)
}

/// Stored file name from an upload response: the first string of a JSON
/// array.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] for non-JSON bodies and
/// [`ApiError::MissingStoredName`] when no usable name is present.
pub fn stored_name(body: &str) -> Result<String, ApiError> {
    let names: Vec<serde_json::Value> = serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))?;
    names
        .first()
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or(ApiError::MissingStoredName)
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
