use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::CloudinaryConfig;
use crate::types::CampgroundError;

/// Trait for image host implementations
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Deletes a hosted image by filename. Deleting an image the host no longer has
    /// is a success.
    async fn destroy(&self, filename: &str) -> Result<(), CampgroundError>;
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Client for the Cloudinary upload API
pub struct CloudinaryImageHost {
    client: Client,
    destroy_url: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryImageHost {
    /// Create a new Cloudinary client
    pub fn new(config: &CloudinaryConfig) -> Result<Self, CampgroundError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| {
                CampgroundError::ExternalService(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            destroy_url: format!(
                "{}/v1_1/{}/image/destroy",
                config.base_url.trim_end_matches('/'),
                config.cloud_name
            ),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    /// Signs request parameters: sorted `key=value` pairs joined by `&`, followed by
    /// the API secret, hashed with SHA-256.
    fn sign(&self, params: &[(&str, String)]) -> String {
        let mut sorted: Vec<&(&str, String)> = params.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let to_sign = sorted
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl ImageHost for CloudinaryImageHost {
    async fn destroy(&self, filename: &str) -> Result<(), CampgroundError> {
        debug!("Destroying hosted image {}", filename);

        let signed = [
            ("public_id", filename.to_string()),
            ("timestamp", Utc::now().timestamp().to_string()),
        ];
        let signature = self.sign(&signed);

        let mut form: Vec<(&str, String)> = signed.to_vec();
        form.push(("api_key", self.api_key.clone()));
        form.push(("signature", signature));
        form.push(("signature_algorithm", "sha256".to_string()));

        let response = self
            .client
            .post(&self.destroy_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                CampgroundError::ExternalService(format!("Image deletion request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(CampgroundError::ExternalService(format!(
                "Image host returned HTTP {} for {}",
                response.status(),
                filename
            )));
        }

        let body: DestroyResponse = response.json().await.map_err(|e| {
            CampgroundError::ExternalService(format!("Failed to parse image host response: {}", e))
        })?;

        match body.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(CampgroundError::ExternalService(format!(
                "Image host could not delete {}: {}",
                filename, other
            ))),
        }
    }
}

/// Mock image host for development/testing. Holds no per-call state.
#[derive(Default)]
pub struct MockImageHost {
    failing: HashSet<String>,
}

impl MockImageHost {
    /// Image host that deletes everything successfully
    pub fn new() -> Self {
        Self::default()
    }

    /// Image host that fails to delete the listed filenames
    pub fn failing_on<I, S>(filenames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            failing: filenames.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl ImageHost for MockImageHost {
    async fn destroy(&self, filename: &str) -> Result<(), CampgroundError> {
        info!("🖼️ [MOCK IMAGE HOST] Destroy: {}", filename);

        if self.failing.contains(filename) {
            return Err(CampgroundError::ExternalService(format!(
                "Mock failure deleting {}",
                filename
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> CloudinaryImageHost {
        CloudinaryImageHost::new(&CloudinaryConfig::new("demo", "key", "secret")).unwrap()
    }

    #[test]
    fn test_destroy_url() {
        assert_eq!(
            host().destroy_url,
            "https://api.cloudinary.com/v1_1/demo/image/destroy"
        );
    }

    #[test]
    fn test_signature_ignores_parameter_order() {
        let host = host();
        let forward = host.sign(&[
            ("public_id", "YelpCamp/abc".to_string()),
            ("timestamp", "1700000000".to_string()),
        ]);
        let reversed = host.sign(&[
            ("timestamp", "1700000000".to_string()),
            ("public_id", "YelpCamp/abc".to_string()),
        ]);

        assert_eq!(forward, reversed);
        assert_eq!(forward.len(), 64);
        assert!(forward.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_signature_depends_on_secret() {
        let other = CloudinaryImageHost::new(&CloudinaryConfig::new("demo", "key", "other"))
            .unwrap();
        let params = [("public_id", "YelpCamp/abc".to_string())];

        assert_ne!(host().sign(&params), other.sign(&params));
    }

    #[tokio::test]
    async fn test_mock_fails_only_on_listed_files() {
        let host = MockImageHost::failing_on(["bad.jpg"]);

        assert!(host.destroy("good.jpg").await.is_ok());
        assert!(matches!(
            host.destroy("bad.jpg").await,
            Err(CampgroundError::ExternalService(_))
        ));
        assert!(host.destroy("good.jpg").await.is_ok());
    }
}
