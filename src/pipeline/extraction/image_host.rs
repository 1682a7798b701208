use base64::Engine as _;
use serde::Deserialize;

use super::types::ImageHost;
use super::AnalysisError;

/// imgbb upload client. The recognition service only accepts images by URL.
pub struct ImgbbHost {
    upload_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl ImgbbHost {
    pub fn new(upload_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, AnalysisError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AnalysisError::HttpClient(e.to_string()))?;

        Ok(Self {
            upload_url: upload_url.to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        })
    }
}

/// Response body from `/1/upload`.
#[derive(Deserialize)]
struct UploadResponse {
    data: Option<UploadData>,
}

#[derive(Deserialize)]
struct UploadData {
    url: String,
}

fn extract_url(response: UploadResponse) -> Result<String, AnalysisError> {
    response
        .data
        .map(|d| d.url)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AnalysisError::MissingContent("no data.url in upload response".into()))
}

impl ImageHost for ImgbbHost {
    fn upload(&self, image_bytes: &[u8]) -> Result<String, AnalysisError> {
        let _span = tracing::info_span!("image_upload", image_size = image_bytes.len()).entered();

        let encoded = base64::engine::general_purpose::STANDARD.encode(image_bytes);
        let response = self
            .client
            .post(&self.upload_url)
            .query(&[("key", self.api_key.as_str())])
            .form(&[("image", encoded.as_str())])
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    AnalysisError::ImageHostUnavailable(self.upload_url.clone())
                } else if e.is_timeout() {
                    AnalysisError::HttpClient(format!(
                        "Upload timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    AnalysisError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AnalysisError::ImageHostError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: UploadResponse = response
            .json()
            .map_err(|e| AnalysisError::MissingContent(e.to_string()))?;
        let url = extract_url(parsed)?;
        tracing::debug!(url = %url, "Image hosted");
        Ok(url)
    }
}

/// Mock image host for testing. Returns a fixed URL or a fixed failure.
pub struct MockImageHost {
    url: Option<String>,
}

impl MockImageHost {
    pub fn new(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
        }
    }

    /// A host that is never reachable.
    pub fn unavailable() -> Self {
        Self { url: None }
    }
}

impl ImageHost for MockImageHost {
    fn upload(&self, image_bytes: &[u8]) -> Result<String, AnalysisError> {
        if image_bytes.is_empty() {
            return Err(AnalysisError::ImageHostError {
                status: 400,
                body: "empty upload".into(),
            });
        }
        self.url
            .clone()
            .ok_or_else(|| AnalysisError::ImageHostUnavailable("mock://image-host".into()))
    }
}
