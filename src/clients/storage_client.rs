//! Cliente de object storage para pruebas de entrega
//!
//! Las firmas y fotos llegan como base64 (o data URL) en el body y se suben
//! al bucket `job-photos`. Se devuelve la URL pública del objeto.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::config::business::JOB_PHOTOS_BUCKET;
use crate::utils::errors::{AppError, AppResult};

#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Sube `bytes` a `path` dentro del bucket y devuelve la URL pública
    async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> AppResult<String>;
}

/// URL pública de un objeto del bucket de fotos
pub fn public_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/storage/v1/object/public/{}/{}",
        base_url.trim_end_matches('/'),
        JOB_PHOTOS_BUCKET,
        path
    )
}

/// Imagen ya decodificada, lista para subir
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub content_type: String,
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

/// Decodifica `data:image/png;base64,....` o base64 plano (se asume PNG)
pub fn decode_image(field: &str, raw: &str) -> AppResult<DecodedImage> {
    let raw = raw.trim();
    let (content_type, payload) = match raw.strip_prefix("data:") {
        Some(rest) => {
            let (meta, data) = rest
                .split_once(',')
                .ok_or_else(|| AppError::BadRequest(format!("{} is not a valid data URL", field)))?;
            let content_type = meta.strip_suffix(";base64").ok_or_else(|| {
                AppError::BadRequest(format!("{} must be base64 encoded", field))
            })?;
            (content_type.to_string(), data)
        }
        None => ("image/png".to_string(), raw),
    };

    let extension = match content_type.as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        other => {
            return Err(AppError::BadRequest(format!(
                "{} has unsupported content type '{}'",
                field, other
            )))
        }
    };

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| AppError::BadRequest(format!("{} is not valid base64: {}", field, e)))?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest(format!("{} is empty", field)));
    }

    Ok(DecodedImage { content_type, extension, bytes })
}

/// Object storage HTTP (API compatible con Supabase Storage)
pub struct HttpObjectStorage {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpObjectStorage {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl PhotoStorage for HttpObjectStorage {
    async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> AppResult<String> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, JOB_PHOTOS_BUCKET, path);
        debug!("📤 Subiendo {} bytes a {}", bytes.len(), url);

        let mut request = self
            .client
            .post(&url)
            .header("content-type", content_type)
            .header("x-upsert", "true")
            .body(bytes);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key).header("apikey", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("storage upload failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("❌ Storage respondió {}: {}", status, body);
            return Err(AppError::ExternalApi(format!("storage upload returned {}", status)));
        }

        info!("✅ Objeto subido: {}", path);
        Ok(public_url(&self.base_url, path))
    }
}

/// Storage en memoria para `STORE_BACKEND=memory` y tests
#[derive(Clone, Default)]
pub struct MemoryPhotoStorage {
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryPhotoStorage {
    pub const BASE_URL: &'static str = "memory://storage";

    pub fn new() -> Self {
        Self::default()
    }

    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl PhotoStorage for MemoryPhotoStorage {
    async fn upload(&self, path: &str, _content_type: &str, bytes: Vec<u8>) -> AppResult<String> {
        self.objects.write().await.insert(path.to_string(), bytes);
        Ok(public_url(Self::BASE_URL, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_layout() {
        assert_eq!(
            public_url("https://xyz.supabase.co/", "job/1/signature.png"),
            "https://xyz.supabase.co/storage/v1/object/public/job-photos/job/1/signature.png"
        );
    }

    #[test]
    fn test_decode_data_url() {
        let image = decode_image("signature", "data:image/jpeg;base64,aGVsbG8=").unwrap();
        assert_eq!(image.content_type, "image/jpeg");
        assert_eq!(image.extension, "jpg");
        assert_eq!(image.bytes, b"hello".to_vec());
    }

    #[test]
    fn test_decode_plain_base64_defaults_to_png() {
        let image = decode_image("photo", "aGVsbG8=").unwrap();
        assert_eq!(image.extension, "png");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_image("photo", "not base64 !!").is_err());
        assert!(decode_image("photo", "data:text/plain;base64,aGVsbG8=").is_err());
        assert!(decode_image("photo", "").is_err());
    }

    #[tokio::test]
    async fn test_memory_storage_keeps_objects() {
        let storage = MemoryPhotoStorage::new();
        let url = storage.upload("a/b.png", "image/png", vec![1, 2, 3]).await.unwrap();
        assert!(url.ends_with("/job-photos/a/b.png"));
        assert_eq!(storage.object_count().await, 1);
    }
}
