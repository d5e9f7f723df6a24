use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
};

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// An image received from a multipart form, not yet hosted.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn validate(&self) -> AppResult<()> {
        if self.bytes.is_empty() {
            return Err(AppError::Validation("Image file is empty".into()));
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(AppError::Validation("Image file exceeds 5MB".into()));
        }
        if !self.content_type.starts_with("image/") {
            return Err(AppError::Validation(format!(
                "Unsupported image type {}",
                self.content_type
            )));
        }
        Ok(())
    }
}

/// External image host. Only the URL it returns is persisted.
#[derive(Clone)]
pub enum ImageStore {
    Disabled,
    Remote(RemoteImageStore),
}

#[derive(Clone)]
pub struct RemoteImageStore {
    client: reqwest::Client,
    upload_url: String,
    upload_preset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HostedImage {
    secure_url: Option<String>,
    url: Option<String>,
}

impl ImageStore {
    pub fn from_config(config: &AppConfig) -> Self {
        match &config.image_upload_url {
            Some(url) => ImageStore::Remote(RemoteImageStore {
                client: reqwest::Client::new(),
                upload_url: url.clone(),
                upload_preset: config.image_upload_preset.clone(),
            }),
            None => ImageStore::Disabled,
        }
    }

    pub async fn upload(&self, image: ImageUpload) -> AppResult<String> {
        image.validate()?;
        match self {
            ImageStore::Disabled => Err(AppError::Validation(
                "Image uploads are not configured; provide imageUrl instead".into(),
            )),
            ImageStore::Remote(remote) => remote.upload(image).await,
        }
    }
}

impl RemoteImageStore {
    async fn upload(&self, image: ImageUpload) -> AppResult<String> {
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(|e| AppError::Validation(format!("Invalid image type: {e}")))?;

        let mut form = Form::new().part("file", part);
        if let Some(preset) = &self.upload_preset {
            form = form.text("upload_preset", preset.clone());
        }

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Upload(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Upload(format!(
                "image host responded with {}",
                response.status()
            )));
        }

        let hosted: HostedImage = response
            .json()
            .await
            .map_err(|e| AppError::Upload(e.to_string()))?;

        let url = hosted
            .secure_url
            .or(hosted.url)
            .ok_or_else(|| AppError::Upload("image host returned no url".into()))?;
        tracing::info!(%url, "image uploaded");
        Ok(url)
    }
}
