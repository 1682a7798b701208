use serde::Serialize;

use super::audit::audit_critical_fields;
use super::defaults::apply_conservative_defaults;
use super::fluid::{canonicalize_fluid, classify_fluid};
use super::parser::{clean_value, parse_recognition_response};
use super::types::{ParameterKey, ParameterRecord, ParameterValue};

/// Where one record-production cycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Empty,
    Parsed,
    FluidResolved,
    Defaulted,
    Audited,
}

/// One pass over one raw answer:
/// parse → resolve fluid → apply defaults → audit.
///
/// Each stage runs exactly once and in order. The cycle owns its record
/// until [`ExtractionCycle::finish`] hands it out.
#[derive(Debug)]
pub struct ExtractionCycle<'a> {
    raw_text: &'a str,
    state: PipelineState,
    record: ParameterRecord,
    defaulted: Vec<ParameterKey>,
    critical_missing: Vec<ParameterKey>,
}

/// Terminal output of a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleOutcome {
    pub record: ParameterRecord,
    /// Keys synthesized by the default stage rather than read from the answer.
    pub defaulted: Vec<ParameterKey>,
    /// Critical keys still `NA`; non-empty means a focused re-query is warranted.
    pub critical_missing: Vec<ParameterKey>,
}

impl CycleOutcome {
    pub fn needs_requery(&self) -> bool {
        !self.critical_missing.is_empty()
    }
}

impl<'a> ExtractionCycle<'a> {
    pub fn new(raw_text: &'a str) -> Self {
        Self {
            raw_text,
            state: PipelineState::Empty,
            record: ParameterRecord::new(),
            defaulted: Vec::new(),
            critical_missing: Vec::new(),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn record(&self) -> &ParameterRecord {
        &self.record
    }

    /// Run the next stage. Returns `false` once the cycle is already audited.
    pub fn step(&mut self) -> bool {
        self.state = match self.state {
            PipelineState::Empty => {
                self.record = parse_recognition_response(self.raw_text);
                PipelineState::Parsed
            }
            PipelineState::Parsed => {
                let fluid = classify_fluid(self.raw_text, &self.record);
                self.record.set(ParameterKey::Fluid, fluid);
                PipelineState::FluidResolved
            }
            PipelineState::FluidResolved => {
                self.defaulted = apply_conservative_defaults(&mut self.record);
                PipelineState::Defaulted
            }
            PipelineState::Defaulted => {
                self.critical_missing = audit_critical_fields(&self.record);
                PipelineState::Audited
            }
            PipelineState::Audited => return false,
        };
        true
    }

    /// Run all remaining stages and hand out the audited record.
    pub fn finish(mut self) -> CycleOutcome {
        while self.step() {}
        CycleOutcome {
            record: self.record,
            defaulted: self.defaulted,
            critical_missing: self.critical_missing,
        }
    }
}

/// Run one full cycle over a raw answer. Never fails: empty or unusable text
/// still yields a defaulted, audited record.
pub fn run_extraction_cycle(raw_text: &str) -> CycleOutcome {
    let _span = tracing::debug_span!("extraction_cycle", text_len = raw_text.len()).entered();
    let outcome = ExtractionCycle::new(raw_text).finish();
    tracing::debug!(
        resolved = outcome.record.resolved_count(),
        critical_missing = outcome.critical_missing.len(),
        "Extraction cycle complete"
    );
    outcome
}

/// Reduce a focused re-query answer to a single value.
///
/// Takes the last non-empty line, keeps what follows its first colon (if
/// any), strips brackets, and rejects "no information" phrases.
pub fn parse_focused_response(response: &str) -> Option<String> {
    let line = response.lines().rev().map(str::trim).find(|l| !l.is_empty())?;
    let value = match line.split_once(':') {
        Some((_, value)) => value,
        None => line,
    };
    clean_value(value)
}

/// Merge a focused re-query result into an audited record.
///
/// Overwrites `NA` only; a resolved value is never replaced. FLUID results
/// are canonicalized the same way as a stated fluid. Returns whether the
/// record changed.
pub fn merge_focused_result(record: &mut ParameterRecord, key: ParameterKey, value: &str) -> bool {
    if !record.is_na(key) {
        return false;
    }
    let Some(cleaned) = clean_value(value) else {
        return false;
    };
    let merged = if key == ParameterKey::Fluid {
        canonicalize_fluid(&cleaned)
    } else {
        cleaned
    };
    record.set(key, ParameterValue::Text(merged));
    true
}
