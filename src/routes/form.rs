use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Multipart, Path, Request},
    http::{header::CONTENT_TYPE, request::Parts},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{
    error::AppError,
    images::ImageUpload,
};

/// Multipart field carrying an uploaded image.
pub const IMAGE_FIELD: &str = "imageFile";

/// Request body accepted either as JSON or as `multipart/form-data`.
///
/// Text fields of a multipart form are collected into a JSON object and
/// deserialized into `T`; the `imageFile` field, if present, becomes `image`.
#[derive(Debug)]
pub struct Payload<T> {
    pub data: T,
    pub image: Option<ImageUpload>,
}

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state).await?;
            return read_form(multipart).await;
        }

        let Json(data) = Json::<T>::from_request(req, state).await?;
        Ok(Self { data, image: None })
    }
}

/// `Json<T>` whose rejections are reported in the API error envelope.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        Ok(Self(data))
    }
}

/// `Path<T>` whose rejections are reported in the API error envelope.
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

async fn read_form<T: DeserializeOwned>(mut multipart: Multipart) -> Result<Payload<T>, AppError> {
    let mut fields = Map::new();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read form field: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == IMAGE_FIELD {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read image: {e}")))?;
            // Browsers send an empty part when no file was chosen.
            if !bytes.is_empty() {
                image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid value for {name}: {e}")))?;
        fields.insert(name, Value::String(text));
    }

    let data = serde_json::from_value(Value::Object(fields))
        .map_err(|e| AppError::Validation(format!("Invalid form data: {e}")))?;
    Ok(Payload { data, image })
}
