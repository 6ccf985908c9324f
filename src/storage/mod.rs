//! Remote image hosting and the local scratch files that feed it.

use std::path::Path;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::domain::product::ProductImage;

pub mod cloudinary;
pub mod scratch;

pub type StorageResult<T> = Result<T, StorageError>;

/// Errors produced by an [`ImageStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no local file path provided")]
    MissingLocalPath,
    #[error("no public id provided")]
    MissingPublicId,
    #[error("failed to read local file: {0}")]
    Io(#[from] std::io::Error),
    #[error("image store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("image store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("image store returned unexpected result `{0}`")]
    UnexpectedResult(String),
}

/// How the remote store should classify an uploaded file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResourceType {
    /// Let the store detect the type from the file contents.
    #[default]
    Auto,
    Image,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Image => "image",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Destination folder; the store's configured default when `None`.
    pub folder: Option<String>,
    pub resource_type: ResourceType,
}

impl UploadOptions {
    /// Upload into the default folder with automatic type detection.
    pub fn auto() -> Self {
        Self::default()
    }

    pub fn folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }
}

/// Fields reported back by the store after an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedImage {
    pub secure_url: Option<String>,
    pub public_id: Option<String>,
}

impl UploadedImage {
    pub fn new(secure_url: impl Into<String>, public_id: impl Into<String>) -> Self {
        Self {
            secure_url: Some(secure_url.into()),
            public_id: Some(public_id.into()),
        }
    }

    /// The product image, if the store yielded both a URL and an id.
    pub fn into_product_image(self) -> Option<ProductImage> {
        let secure_url = self.secure_url.filter(|value| !value.is_empty())?;
        let public_id = self.public_id.filter(|value| !value.is_empty())?;
        Some(ProductImage {
            secure_url,
            public_id,
        })
    }
}

/// Remote object store that hosts product images.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Upload the file at `local_path`.
    ///
    /// Implementations remove the local file once the attempt finishes,
    /// whether it succeeded or not.
    async fn upload(&self, local_path: &Path, options: UploadOptions)
    -> StorageResult<UploadedImage>;

    /// Delete a previously uploaded image by its public id.
    async fn delete(&self, public_id: &str) -> StorageResult<()>;
}
