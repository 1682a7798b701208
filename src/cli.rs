//! Command-line surface for `cylscan`.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use thiserror::Error;

use crate::config;
use crate::export::{record_to_csv, record_to_json, record_to_table, ExportError};
use crate::pipeline::extraction::{AnalysisError, DrawingAnalyzer, UpstreamFailure};
use crate::pipeline::structuring::{run_extraction_cycle, ParameterKey, ParameterRecord};
use crate::pipeline_config::{AnalyzerConfig, ConfigError};

#[derive(Parser, Debug)]
#[command(name = "cylscan")]
#[command(about = "Extract cylinder design parameters from drawing images", long_about = None)]
#[command(version = config::APP_VERSION)]
pub struct Cli {
    /// Output format
    #[arg(long, value_enum, global = true, env = "CYLSCAN_FORMAT", default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a drawing image against the live services
    Analyze {
        /// Drawing image (JPEG or PNG)
        image: PathBuf,

        /// Skip the focused re-query of missing critical parameters
        #[arg(long)]
        no_requery: bool,

        /// Override the configured vision model
        #[arg(long)]
        model: Option<String>,
    },

    /// Normalize an already captured recognition answer (no network)
    Parse {
        /// Text file holding the raw answer
        response_file: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Csv,
    Json,
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Analysis setup failed: {0}")]
    Setup(#[from] AnalysisError),

    #[error("Upstream {} failure: {}", .0.error.upstream(), .0.error)]
    Upstream(Box<UpstreamFailure>),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Cannot write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Run one command, writing the rendered record to `out`.
///
/// On an upstream failure the fallback record is written first, then the
/// failure is returned so the caller can exit non-zero.
pub fn execute(cli: &Cli, out: &mut impl Write) -> Result<(), CliError> {
    match &cli.command {
        Command::Analyze {
            image,
            no_requery,
            model,
        } => {
            let bytes = read_input(image)?;
            let mut analyzer_config = AnalyzerConfig::from_env()?;
            if *no_requery {
                analyzer_config = analyzer_config.with_focused_requery(false);
            }
            if let Some(model) = model {
                analyzer_config = analyzer_config.with_model(model);
            }
            tracing::debug!(config = ?analyzer_config, "Analyzer configured");

            let analyzer = DrawingAnalyzer::from_config(&analyzer_config)?;
            match analyzer.analyze(&bytes) {
                Ok(analysis) => write_record(
                    out,
                    cli.format,
                    &analysis.record,
                    &analysis.critical_missing,
                ),
                Err(failure) => {
                    write_record(
                        out,
                        cli.format,
                        &failure.fallback.record,
                        &failure.fallback.critical_missing,
                    )?;
                    Err(CliError::Upstream(Box::new(failure)))
                }
            }
        }
        Command::Parse { response_file } => {
            let bytes = read_input(response_file)?;
            let text = String::from_utf8_lossy(&bytes);
            let outcome = run_extraction_cycle(&text);
            write_record(out, cli.format, &outcome.record, &outcome.critical_missing)
        }
    }
}

fn read_input(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })
}

fn write_record(
    out: &mut impl Write,
    format: OutputFormat,
    record: &ParameterRecord,
    critical_missing: &[ParameterKey],
) -> Result<(), CliError> {
    match format {
        OutputFormat::Text => {
            out.write_all(record_to_table(record).as_bytes())?;
            if !critical_missing.is_empty() {
                let names: Vec<&str> = critical_missing.iter().map(|k| k.as_str()).collect();
                writeln!(out, "\nCritical parameters missing: {}", names.join(", "))?;
            }
        }
        OutputFormat::Csv => out.write_all(record_to_csv(record)?.as_bytes())?,
        OutputFormat::Json => writeln!(out, "{}", record_to_json(record)?)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("cylscan-{}-{name}", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn run_parse(format: OutputFormat, contents: &str) -> String {
        let path = temp_file("answer.txt", contents);
        let cli = Cli {
            format,
            command: Command::Parse {
                response_file: path.clone(),
            },
        };
        let mut out = Vec::new();
        execute(&cli, &mut out).unwrap();
        std::fs::remove_file(path).ok();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_arguments() {
        let cli = Cli::try_parse_from([
            "cylscan",
            "analyze",
            "d.jpg",
            "--no-requery",
            "--format",
            "csv",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Csv);
        match cli.command {
            Command::Analyze {
                image,
                no_requery,
                model,
            } => {
                assert_eq!(image, PathBuf::from("d.jpg"));
                assert!(no_requery);
                assert!(model.is_none());
            }
            Command::Parse { .. } => panic!("expected analyze"),
        }
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["cylscan", "--format", "xml", "parse", "a.txt"]).is_err());
    }

    #[test]
    fn parse_command_prints_csv() {
        let out = run_parse(OutputFormat::Csv, "BORE DIAMETER: 50\nFLUID: air\nMOUNTING: Clevis");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Parameter,Value");
        assert_eq!(lines[1], "CYLINDER ACTION,SINGLE ACTING");
        assert_eq!(lines[10], "FLUID,AIR");
    }

    #[test]
    fn parse_command_text_lists_missing_critical_fields() {
        let out = run_parse(OutputFormat::Text, "STROKE LENGTH: 200");
        assert!(out.contains("STROKE LENGTH"));
        assert!(out.contains("Critical parameters missing: BORE DIAMETER, FLUID, MOUNTING"));
    }

    #[test]
    fn parse_command_json() {
        let out = run_parse(OutputFormat::Json, "REVISION: C");
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["REVISION"], "C");
        assert_eq!(value["BORE DIAMETER"], "NA");
    }

    #[test]
    fn missing_input_file_is_reported() {
        let cli = Cli {
            format: OutputFormat::Text,
            command: Command::Parse {
                response_file: PathBuf::from("/nonexistent/cylscan/answer.txt"),
            },
        };
        let err = execute(&cli, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CliError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/cylscan/answer.txt"));
    }
}
