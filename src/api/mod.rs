//! HTTP client for the certificate REST service.
//!
//! Every call carries the `APIKEY` query parameter. Failures are returned as
//! [`ApiError`] and logged; nothing is retried.

pub mod types;

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};
use uuid::Uuid;

use canvas::registry::Variable;

use crate::config::ApiConfig;
pub use types::{ApiError, Gallery};
use types::{GalleryImageRequest, TemplateRequest, VariableRequest};

/// Search text sent with listing requests.
const DEFAULT_SEARCH: &str = "q";

pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client cannot be
    /// constructed.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }

    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{path}", self.config.base_url)
    }

    async fn post_json(&self, path: &str, body: &impl Serialize) -> Result<String, ApiError> {
        let response = self
            .http
            .post(self.endpoint(path))
            .query(&[("APIKEY", self.config.api_key.as_str())])
            .json(body)
            .send()
            .await?;
        read_body(response).await
    }

    async fn get(&self, path: &str, search: &str) -> Result<String, ApiError> {
        let response = self
            .http
            .get(self.endpoint(path))
            .query(&[("APIKEY", self.config.api_key.as_str()), ("searchtext", search)])
            .send()
            .await?;
        read_body(response).await
    }

    /// Upload a local file. Returns the name the service stored it under.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Io`] if the file cannot be read, or any transport,
    /// status, or parse error from the upload.
    pub async fn upload(&self, path: &Path) -> Result<String, ApiError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ApiError::Io { path: path.display().to_string(), source })?;
        let original = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().to_string());
        let name = types::upload_name(Uuid::new_v4(), &original);
        let size = bytes.len();

        let form = Form::new().part("file", Part::bytes(bytes).file_name(name.clone()));
        let response = self
            .http
            .post(self.endpoint("FileAPI/UploadFiles"))
            .query(&[("APIKEY", self.config.api_key.as_str())])
            .multipart(form)
            .send()
            .await?;
        let stored = types::stored_name(&read_body(response).await?)?;
        info!(upload = %name, %stored, bytes = size, "file uploaded");
        Ok(stored)
    }

    /// Record an uploaded image in the gallery.
    ///
    /// # Errors
    ///
    /// Returns any transport or status error.
    pub async fn register_image(&self, stored: &str, background: bool) -> Result<(), ApiError> {
        let createdon = timestamp()?;
        let body = GalleryImageRequest {
            img_path: stored,
            is_background: u8::from(background),
            title: stored,
            createdon: &createdon,
            createdby: &self.config.created_by,
        };
        self.post_json("gallery_image", &body).await?;
        debug!(%stored, background, "gallery image registered");
        Ok(())
    }

    /// Fetch the image gallery, split into templates and photos.
    ///
    /// # Errors
    ///
    /// Returns any transport, status, or parse error.
    pub async fn images(&self) -> Result<Gallery, ApiError> {
        let body = self.get("certificate_images", DEFAULT_SEARCH).await?;
        let gallery = types::parse_images(&body)?;
        debug!(templates = gallery.templates.len(), photos = gallery.photos.len(), "gallery fetched");
        Ok(gallery)
    }

    /// Fetch the variable list.
    ///
    /// # Errors
    ///
    /// Returns any transport, status, or parse error.
    pub async fn variables(&self) -> Result<Vec<Variable>, ApiError> {
        let body = self.get("certificate_variables", DEFAULT_SEARCH).await?;
        types::parse_variables(&body)
    }

    /// Create a variable.
    ///
    /// # Errors
    ///
    /// Returns any transport or status error.
    pub async fn add_variable(&self, name: &str) -> Result<(), ApiError> {
        let createdon = timestamp()?;
        let body = VariableRequest { variable: name, createdon: &createdon, createdby: &self.config.created_by };
        self.post_json("gallery_variables", &body).await?;
        info!(variable = name, "variable created");
        Ok(())
    }

    /// Save an exported certificate under `title`. Blank titles are
    /// rejected before any request is made.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EmptyTitle`], or any transport or status error.
    pub async fn save_template(&self, title: &str, html: &str) -> Result<(), ApiError> {
        let title = types::validate_title(title)?;
        let createdon = timestamp()?;
        let body = TemplateRequest {
            id: None,
            title,
            templatetext: html,
            createdby: &self.config.created_by,
            createdon: &createdon,
        };
        self.post_json("Certificate_Template", &body).await?;
        info!(title, bytes = html.len(), "certificate template saved");
        Ok(())
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::Response { status: status.as_u16(), body });
    }
    Ok(body)
}

fn timestamp() -> Result<String, ApiError> {
    Ok(OffsetDateTime::now_utc().format(&Rfc3339)?)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
