use serde::Serialize;
use uuid::Uuid;

use super::AnalysisError;
use crate::pipeline::structuring::{ParameterKey, ParameterRecord};

/// Final result of analyzing one drawing.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub analysis_id: Uuid,
    pub record: ParameterRecord,
    /// Critical keys still `NA` after any focused re-query.
    pub critical_missing: Vec<ParameterKey>,
    /// Critical keys filled by a focused re-query.
    pub requeried: Vec<ParameterKey>,
}

/// An upstream collaborator failed. The fallback is the record produced from
/// empty input, still defaulted, so derivable fields are not lost.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct UpstreamFailure {
    #[source]
    pub error: AnalysisError,
    pub fallback: Analysis,
}

/// Hosts image bytes and returns a publicly reachable URL.
pub trait ImageHost {
    fn upload(&self, image_bytes: &[u8]) -> Result<String, AnalysisError>;
}

/// Vision-language recognition service (allows mocking).
pub trait RecognitionClient {
    /// Send the instructions and an image reference, return the answer's text content.
    fn recognize(
        &self,
        system: &str,
        prompt: &str,
        image_url: &str,
    ) -> Result<String, AnalysisError>;
}
