//! JSON output formatter for machine-readable results.

use super::formatter::Detection;
use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use carch_core::ExtractionReport;
use carch_core::creation::CreationReport;
use serde::Serialize;
use std::io::Write;
use std::io::{self};

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct DetectionOutput {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn detection_outputs(detections: &[Detection]) -> Vec<DetectionOutput> {
    detections
        .iter()
        .map(|(path, result)| DetectionOutput {
            path: path.display().to_string(),
            format: result.as_ref().ok().map(ToString::to_string),
            error: result.as_ref().err().map(ToString::to_string),
        })
        .collect()
}

impl OutputFormatter for JsonFormatter {
    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()> {
        #[derive(Serialize)]
        struct ExtractionOutput {
            destination: String,
            format: Option<String>,
            files_extracted: usize,
            directories_created: usize,
            symlinks_created: usize,
            bytes_written: u64,
            duration_ms: u128,
        }

        let data = ExtractionOutput {
            destination: report.destination.display().to_string(),
            format: report.format.map(|f| f.to_string()),
            files_extracted: report.files_extracted,
            directories_created: report.directories_created,
            symlinks_created: report.symlinks_created,
            bytes_written: report.bytes_written,
            duration_ms: report.duration.as_millis(),
        };

        let output = JsonOutput::success("extract", data);
        Self::output(&output)
    }

    fn format_creation_result(&self, report: &CreationReport) -> Result<()> {
        #[derive(Serialize)]
        struct CreationOutput {
            output_path: String,
            files_added: u64,
            directories_skipped: u64,
            bytes_written: u64,
            bytes_compressed: u64,
            compression_ratio: f64,
            compression_percentage: f64,
            sources_deleted: u64,
            duration_ms: u128,
            warnings: Vec<String>,
        }

        let data = CreationOutput {
            output_path: report.output_path.display().to_string(),
            files_added: report.files_added,
            directories_skipped: report.directories_skipped,
            bytes_written: report.bytes_written,
            bytes_compressed: report.bytes_compressed,
            compression_ratio: report.compression_ratio(),
            compression_percentage: report.compression_percentage(),
            sources_deleted: report.sources_deleted,
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        };

        let output = JsonOutput::success("create", data);
        Self::output(&output)
    }

    fn format_detections(&self, detections: &[Detection]) -> Result<()> {
        let data = detection_outputs(detections);
        let failed = detections.iter().filter(|(_, r)| r.is_err()).count();
        if failed == 0 {
            Self::output(&JsonOutput::success("detect", data))
        } else {
            Self::output(&JsonOutput::partial(
                "detect",
                data,
                format!("{failed} file(s) could not be identified"),
            ))
        }
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}
