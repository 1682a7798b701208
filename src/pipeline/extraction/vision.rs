//! Recognition client for OpenAI-compatible chat-completions endpoints.
//!
//! The drawing is passed by public URL (see [`super::image_host`]) as an
//! `image_url` content part next to the text instruction. Only the first
//! choice's `message.content` is returned; the caller never sees transport
//! details.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::types::RecognitionClient;
use super::AnalysisError;

/// Image detail level requested from the service. Drawings need fine print.
const IMAGE_DETAIL: &str = "high";

/// Production recognition client.
pub struct OpenAiVisionClient {
    api_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OpenAiVisionClient {
    pub fn new(
        api_url: &str,
        api_key: &str,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, AnalysisError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AnalysisError::HttpClient(e.to_string()))?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Request body for `/chat/completions`.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: MessageContent<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
    detail: &'a str,
}

/// Response body from `/chat/completions`.
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

fn build_request<'a>(
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    image_url: &'a str,
) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(system),
            },
            ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image_url,
                            detail: IMAGE_DETAIL,
                        },
                    },
                ]),
            },
        ],
    }
}

/// First choice's text content, or `MissingContent`.
fn extract_content(response: ChatResponse) -> Result<String, AnalysisError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| AnalysisError::MissingContent("no choices[0].message.content".into()))
}

impl RecognitionClient for OpenAiVisionClient {
    fn recognize(
        &self,
        system: &str,
        prompt: &str,
        image_url: &str,
    ) -> Result<String, AnalysisError> {
        let _span = tracing::info_span!("recognize", model = %self.model).entered();
        let start = std::time::Instant::now();

        let url = format!("{}/chat/completions", self.api_url);
        let body = build_request(&self.model, system, prompt, image_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    AnalysisError::RecognitionUnavailable(self.api_url.clone())
                } else if e.is_timeout() {
                    AnalysisError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    AnalysisError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AnalysisError::RecognitionError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| AnalysisError::MissingContent(e.to_string()))?;
        let content = extract_content(parsed)?;

        tracing::info!(
            elapsed_ms = %start.elapsed().as_millis(),
            content_len = content.len(),
            "Recognition response received"
        );
        Ok(content)
    }
}

/// Mock recognition client for testing.
///
/// Returns scripted responses in call order; once the script runs out the
/// last response repeats. Prompts are recorded for inspection.
pub struct MockRecognitionClient {
    responses: Vec<String>,
    fail_from_call: Option<usize>,
    calls: Mutex<Vec<String>>,
}

impl MockRecognitionClient {
    pub fn new(response: &str) -> Self {
        Self {
            responses: vec![response.to_string()],
            fail_from_call: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Responses for successive calls.
    pub fn scripted(responses: &[&str]) -> Self {
        Self {
            responses: responses.iter().map(|r| r.to_string()).collect(),
            fail_from_call: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call from the `n`th (0-based) on fails with a 503.
    pub fn failing_from(mut self, n: usize) -> Self {
        self.fail_from_call = Some(n);
        self
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl RecognitionClient for MockRecognitionClient {
    fn recognize(
        &self,
        _system: &str,
        prompt: &str,
        _image_url: &str,
    ) -> Result<String, AnalysisError> {
        let index = match self.calls.lock() {
            Ok(mut calls) => {
                calls.push(prompt.to_string());
                calls.len() - 1
            }
            Err(_) => 0,
        };

        if self.fail_from_call.is_some_and(|n| index >= n) {
            return Err(AnalysisError::RecognitionError {
                status: 503,
                body: "service unavailable".into(),
            });
        }

        let response = self
            .responses
            .get(index)
            .or_else(|| self.responses.last())
            .cloned()
            .unwrap_or_default();
        Ok(response)
    }
}
