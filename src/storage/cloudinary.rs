use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::config::{CloudinaryConfig, SignatureAlgorithm};
use crate::storage::scratch::ScratchFile;
use crate::storage::{
    ImageStore, ResourceType, StorageError, StorageResult, UploadOptions, UploadedImage,
};

/// [`ImageStore`] backed by the Cloudinary upload API.
#[derive(Debug, Clone)]
pub struct CloudinaryStore {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    public_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> StorageResult<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, resource_type: ResourceType, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.cloud_name,
            resource_type.as_str(),
            action
        )
    }

    fn sign(&self, params: &[(&str, &str)]) -> String {
        sign_params(
            params,
            &self.config.api_secret,
            self.config.signature_algorithm,
        )
    }

    async fn upload_file(
        &self,
        local_path: &Path,
        options: UploadOptions,
    ) -> StorageResult<UploadedImage> {
        let bytes = tokio::fs::read(local_path).await?;
        let file_name = local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let folder = options
            .folder
            .unwrap_or_else(|| self.config.folder.clone());
        let timestamp = unix_timestamp();
        let signature = self.sign(&[
            ("folder", folder.as_str()),
            ("timestamp", timestamp.as_str()),
        ]);

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder)
            .text("signature", signature)
            .text(
                "signature_algorithm",
                self.config.signature_algorithm.as_str(),
            );

        let response = self
            .client
            .post(self.endpoint(options.resource_type, "upload"))
            .multipart(form)
            .send()
            .await?;

        let body: UploadResponse = read_json(response).await?;
        Ok(UploadedImage {
            secure_url: body.secure_url,
            public_id: body.public_id,
        })
    }
}

#[async_trait]
impl ImageStore for CloudinaryStore {
    async fn upload(
        &self,
        local_path: &Path,
        options: UploadOptions,
    ) -> StorageResult<UploadedImage> {
        if local_path.as_os_str().is_empty() {
            log::warn!("No local file path provided for image upload");
            return Err(StorageError::MissingLocalPath);
        }

        // The local copy is single-use: drop it whatever the outcome.
        let _scratch = ScratchFile::new(local_path);

        match self.upload_file(local_path, options).await {
            Ok(uploaded) => {
                log::info!(
                    "Image uploaded to cloudinary: {}",
                    uploaded.secure_url.as_deref().unwrap_or("<no url>")
                );
                Ok(uploaded)
            }
            Err(err) => {
                log::error!("Cloudinary image upload failed: {err}");
                Err(err)
            }
        }
    }

    async fn delete(&self, public_id: &str) -> StorageResult<()> {
        if public_id.trim().is_empty() {
            log::error!("Cloudinary image delete called without a public id");
            return Err(StorageError::MissingPublicId);
        }

        let timestamp = unix_timestamp();
        let signature = self.sign(&[
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
        ]);
        let params = [
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.config.api_key.as_str()),
            ("signature", signature.as_str()),
            (
                "signature_algorithm",
                self.config.signature_algorithm.as_str(),
            ),
        ];

        let outcome = async {
            let response = self
                .client
                .post(self.endpoint(ResourceType::Image, "destroy"))
                .form(&params)
                .send()
                .await?;
            let body: DestroyResponse = read_json(response).await?;
            check_destroy_result(&body.result)
        }
        .await;

        match outcome {
            Ok(()) => {
                log::info!("Image deleted from cloudinary: {public_id}");
                Ok(())
            }
            Err(err) => {
                log::error!("Cloudinary image delete failed for ID {public_id}: {err}");
                Err(err)
            }
        }
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> StorageResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|body| body.error.message)
        .unwrap_or(text);

    Err(StorageError::Rejected {
        status: status.as_u16(),
        message,
    })
}

fn check_destroy_result(result: &str) -> StorageResult<()> {
    if result == "ok" {
        Ok(())
    } else {
        Err(StorageError::UnexpectedResult(result.to_string()))
    }
}

fn unix_timestamp() -> String {
    chrono::Utc::now().timestamp().to_string()
}

/// Sign request parameters the way Cloudinary expects: non-empty pairs sorted
/// by key, joined as `k=v&k=v`, with the API secret appended before hashing.
pub fn sign_params(
    params: &[(&str, &str)],
    api_secret: &str,
    algorithm: SignatureAlgorithm,
) -> String {
    let mut pairs: Vec<&(&str, &str)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));

    let payload = pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    match algorithm {
        SignatureAlgorithm::Sha1 => hex_digest::<Sha1>(&payload, api_secret),
        SignatureAlgorithm::Sha256 => hex_digest::<Sha256>(&payload, api_secret),
    }
}

fn hex_digest<D: Digest>(payload: &str, api_secret: &str) -> String {
    let mut hasher = D::new();
    hasher.update(payload.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}
