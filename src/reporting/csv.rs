// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::Result;
use csv::Writer;

use crate::types::DomainScanResult;

pub const CSV_HEADER: [&str; 6] = ["Domain", "Cname", "Provider", "Vulnerable", "TakenOver", "Response"];

pub struct CsvReportGenerator;

impl CsvReportGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, results: &[DomainScanResult]) -> Result<Vec<u8>> {
        let mut wtr = Writer::from_writer(vec![]);

        wtr.write_record(CSV_HEADER)?;

        for result in results {
            wtr.write_record([
                result.domain.as_str(),
                result.resolved_cname.as_str(),
                result.provider.as_str(),
                &result.is_vulnerable.to_string(),
                &result.is_taken_over.to_string(),
                result.evidence.as_str(),
            ])?;
        }

        let data = wtr.into_inner()?;
        Ok(data)
    }
}

impl Default for CsvReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}
