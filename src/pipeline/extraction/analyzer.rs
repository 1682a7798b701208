use uuid::Uuid;

use super::image_host::ImgbbHost;
use super::prompt::{
    build_extraction_prompt, focused_prompt, focused_system_prompt, EXTRACTION_SYSTEM_PROMPT,
};
use super::types::{Analysis, ImageHost, RecognitionClient, UpstreamFailure};
use super::vision::OpenAiVisionClient;
use super::AnalysisError;
use crate::pipeline::structuring::{
    audit_critical_fields, merge_focused_result, parse_focused_response, rederive_defaults,
    run_extraction_cycle, ParameterKey, ParameterRecord,
};
use crate::pipeline_config::AnalyzerConfig;

/// Analyzes cylinder drawings end to end:
/// upload → recognize → normalize → (focused re-query → re-derive defaults) → result
pub struct DrawingAnalyzer {
    image_host: Box<dyn ImageHost + Send + Sync>,
    recognizer: Box<dyn RecognitionClient + Send + Sync>,
    focused_requery: bool,
}

impl DrawingAnalyzer {
    pub fn new(
        image_host: Box<dyn ImageHost + Send + Sync>,
        recognizer: Box<dyn RecognitionClient + Send + Sync>,
        focused_requery: bool,
    ) -> Self {
        Self {
            image_host,
            recognizer,
            focused_requery,
        }
    }

    /// Production analyzer with imgbb hosting and an OpenAI-compatible recognizer.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, AnalysisError> {
        let image_host = ImgbbHost::new(
            &config.image_host_url,
            &config.image_host_key,
            config.timeout_secs,
        )?;
        let recognizer = OpenAiVisionClient::new(
            &config.api_url,
            &config.api_key,
            &config.model,
            config.timeout_secs,
        )?;
        Ok(Self::new(
            Box::new(image_host),
            Box::new(recognizer),
            config.focused_requery,
        ))
    }

    /// Analyze one drawing image.
    ///
    /// Image-host or recognition failure is fatal for the run: the returned
    /// [`UpstreamFailure`] carries the classified error and a fallback record
    /// built from empty input. Focused re-query failures are logged and skipped.
    pub fn analyze(&self, image_bytes: &[u8]) -> Result<Analysis, UpstreamFailure> {
        let analysis_id = Uuid::new_v4();
        let _span = tracing::info_span!(
            "analyze_drawing",
            analysis_id = %analysis_id,
            image_size = image_bytes.len(),
        )
        .entered();
        let start = std::time::Instant::now();

        let image_url = self
            .image_host
            .upload(image_bytes)
            .map_err(|e| fail(analysis_id, e))?;

        let prompt = build_extraction_prompt();
        let content = self
            .recognizer
            .recognize(EXTRACTION_SYSTEM_PROMPT, &prompt, &image_url)
            .map_err(|e| fail(analysis_id, e))?;

        let outcome = run_extraction_cycle(&content);
        let mut record = outcome.record;
        let mut requeried = Vec::new();

        if self.focused_requery {
            for &key in &outcome.critical_missing {
                if self.requery(key, &image_url, &mut record) {
                    requeried.push(key);
                }
            }
        }
        if !requeried.is_empty() {
            let defaulted = rederive_defaults(&mut record, &outcome.defaulted);
            tracing::debug!(defaulted = ?defaulted, "Defaults re-derived after focused re-query");
        }
        let critical_missing = audit_critical_fields(&record);

        tracing::info!(
            elapsed_ms = %start.elapsed().as_millis(),
            resolved = record.resolved_count(),
            requeried = requeried.len(),
            critical_missing = critical_missing.len(),
            "Drawing analysis complete"
        );

        Ok(Analysis {
            analysis_id,
            record,
            critical_missing,
            requeried,
        })
    }

    /// One focused query for `key`; merges on success. Returns whether the record changed.
    fn requery(
        &self,
        key: ParameterKey,
        image_url: &str,
        record: &mut ParameterRecord,
    ) -> bool {
        let Some(prompt) = focused_prompt(key) else {
            return false;
        };
        let system = focused_system_prompt(key);

        match self.recognizer.recognize(&system, prompt, image_url) {
            Ok(response) => {
                let Some(value) = parse_focused_response(&response) else {
                    tracing::debug!(parameter = %key, "Focused re-query found nothing");
                    return false;
                };
                let merged = merge_focused_result(record, key, &value);
                tracing::debug!(parameter = %key, merged, "Focused re-query answered");
                merged
            }
            Err(e) => {
                tracing::warn!(parameter = %key, error = %e, "Focused re-query failed, skipping");
                false
            }
        }
    }
}

/// Build the failure result: the cycle still runs on empty input so the
/// derivable defaults survive.
fn fail(analysis_id: Uuid, error: AnalysisError) -> UpstreamFailure {
    tracing::error!(
        analysis_id = %analysis_id,
        upstream = error.upstream(),
        error = %error,
        "Upstream failure, falling back to defaults"
    );
    let outcome = run_extraction_cycle("");
    UpstreamFailure {
        error,
        fallback: Analysis {
            analysis_id,
            record: outcome.record,
            critical_missing: outcome.critical_missing,
            requeried: Vec::new(),
        },
    }
}
