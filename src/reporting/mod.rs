// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Scan Reporting
 * CSV and JSON export of a finished scan, plus the console table
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

pub mod csv;
pub mod table;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::types::ScanReport;

pub use self::csv::CsvReportGenerator;
pub use table::{print_report, render_table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    /// `.json` means JSON, everything else is CSV
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Csv,
        }
    }
}

pub fn generate(report: &ScanReport, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Csv => CsvReportGenerator::new().generate(&report.results),
        OutputFormat::Json => {
            serde_json::to_vec_pretty(report).context("Failed to serialize scan report")
        }
    }
}

pub fn write_report(report: &ScanReport, path: &Path) -> Result<()> {
    let format = OutputFormat::from_path(path);
    let data = generate(report, format)?;

    std::fs::write(path, data)
        .with_context(|| format!("Failed to write results to {}", path.display()))?;

    info!("Results written to {} ({:?})", path.display(), format);
    Ok(())
}
