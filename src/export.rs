//! Output surface: a record as ordered `(Parameter, Value)` rows.

use thiserror::Error;

use crate::pipeline::structuring::ParameterRecord;

pub const CSV_HEADER: [&str; 2] = ["Parameter", "Value"];

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV encoding error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// `(parameter, value)` pairs in canonical order, `NA` for unresolved.
pub fn record_rows(record: &ParameterRecord) -> Vec<(&'static str, String)> {
    record
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str().to_string()))
        .collect()
}

/// CSV with header `Parameter,Value`, one row per parameter.
pub fn record_to_csv(record: &ParameterRecord) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for (parameter, value) in record_rows(record) {
        writer.write_record([parameter, value.as_str()])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Aligned two-column text for terminals.
pub fn record_to_table(record: &ParameterRecord) -> String {
    let rows = record_rows(record);
    let width = rows
        .iter()
        .map(|(p, _)| p.len())
        .chain(std::iter::once(CSV_HEADER[0].len()))
        .max()
        .unwrap_or(0);

    let mut out = format!("{:<width$}  {}\n", CSV_HEADER[0], CSV_HEADER[1]);
    out.push_str(&format!("{}  {}\n", "-".repeat(width), "-".repeat(CSV_HEADER[1].len())));
    for (parameter, value) in rows {
        out.push_str(&format!("{parameter:<width$}  {value}\n"));
    }
    out
}

pub fn record_to_json(record: &ParameterRecord) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(record)?)
}
