use std::path::{Path, PathBuf};

use tracing::instrument;

use crate::error::ApiError;

const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Local directory that receives uploaded dish images.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    public_url: String,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `bytes` under a fresh random name carrying the lowercased
    /// original extension and returns the public URL of the stored file.
    /// Extensions outside [`SUPPORTED_FORMATS`] are rejected.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String, ApiError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .filter(|ext| !ext.is_empty())
            .ok_or_else(|| {
                ApiError::BadRequest("Arquivo sem extensão não é suportado".to_string())
            })?;

        if !SUPPORTED_FORMATS.contains(&extension.as_str()) {
            return Err(ApiError::BadRequest(format!(
                "Formato não suportado: {extension}. Suportados: png, jpg, jpeg, webp"
            )));
        }

        let stored_name = format!("{}.{}", uuid::Uuid::new_v4().simple(), extension);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ApiError::InternalError(format!("image dir: {e}")))?;
        tokio::fs::write(self.dir.join(&stored_name), bytes)
            .await
            .map_err(|e| ApiError::InternalError(format!("image write: {e}")))?;

        tracing::info!(%stored_name, "image stored");
        Ok(format!("{}/{}", self.public_url, stored_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_lowercases_extension() {
        let dir = tempfile::tempdir().unwrap();
        let images = ImageStore::new(dir.path(), "/images/");

        let url = images.save("prato.PNG", b"fake-png").await.unwrap();
        assert!(url.starts_with("/images/"));
        assert!(url.ends_with(".png"));

        let stored = url.trim_start_matches("/images/");
        let bytes = std::fs::read(dir.path().join(stored)).unwrap();
        assert_eq!(bytes, b"fake-png");
    }

    #[tokio::test]
    async fn test_save_requires_extension() {
        let dir = tempfile::tempdir().unwrap();
        let images = ImageStore::new(dir.path(), "/images");
        assert!(matches!(
            images.save("sem-extensao", b"x").await,
            Err(ApiError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_save_rejects_non_image_formats() {
        let dir = tempfile::tempdir().unwrap();
        let images = ImageStore::new(dir.path(), "/images");

        for name in ["evil.html", "evil.svg", "evil.HTM", "script.js"] {
            assert!(
                matches!(
                    images.save(name, b"<script>alert(1)</script>").await,
                    Err(ApiError::BadRequest(_))
                ),
                "{name} should be rejected"
            );
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
