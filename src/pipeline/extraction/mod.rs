pub mod types;
pub mod prompt;
pub mod image_host;
pub mod vision;
pub mod analyzer;

pub use types::*;
pub use prompt::*;
pub use image_host::*;
pub use vision::*;
pub use analyzer::*;

use thiserror::Error;

/// Failures of the external collaborators. The normalization core itself
/// never fails; only these reach the caller.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Image host is not reachable at {0}")]
    ImageHostUnavailable(String),

    #[error("Image host returned error (status {status}): {body}")]
    ImageHostError { status: u16, body: String },

    #[error("Recognition service is not reachable at {0}")]
    RecognitionUnavailable(String),

    #[error("Recognition service returned error (status {status}): {body}")]
    RecognitionError { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Service response carried no usable content: {0}")]
    MissingContent(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    /// Which collaborator failed, for logs and CLI output.
    pub fn upstream(&self) -> &'static str {
        match self {
            Self::ImageHostUnavailable(_) | Self::ImageHostError { .. } => "image_host",
            Self::RecognitionUnavailable(_) | Self::RecognitionError { .. } => "recognition",
            Self::HttpClient(_) | Self::MissingContent(_) => "transport",
            Self::Io(_) => "io",
        }
    }
}
