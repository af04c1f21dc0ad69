// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use crate::types::{DomainFailure, DomainScanResult, ScanReport};

const HEADERS: [&str; 6] = ["Domain", "Cname", "Provider", "Vulnerable", "Taken Over", "Response"];

/// Rows worth showing: a provider match, or anything with evidence
pub fn displayable(result: &DomainScanResult) -> bool {
    (!result.resolved_cname.is_empty() && !result.provider.is_empty()) || !result.evidence.is_empty()
}

fn row(result: &DomainScanResult) -> [String; 6] {
    [
        result.domain.clone(),
        result.resolved_cname.clone(),
        result.provider.clone(),
        result.is_vulnerable.to_string(),
        result.is_taken_over.to_string(),
        result.evidence.clone(),
    ]
}

/// Render results as a bordered text table
pub fn render_table(results: &[DomainScanResult]) -> String {
    let rows: Vec<[String; 6]> = results.iter().filter(|r| displayable(r)).map(row).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let separator = {
        let mut line = String::from("+");
        for width in &widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line
    };

    let format_row = |cells: &[&str]| {
        let mut line = String::from("|");
        for (cell, width) in cells.iter().zip(widths.iter()) {
            line.push_str(&format!(" {:<width$} |", cell, width = *width));
        }
        line
    };

    let mut out = Vec::with_capacity(rows.len() + 4);
    out.push(separator.clone());
    out.push(format_row(&HEADERS.map(str::to_uppercase).iter().map(String::as_str).collect::<Vec<_>>()));
    out.push(separator.clone());
    for row in &rows {
        out.push(format_row(&row.iter().map(String::as_str).collect::<Vec<_>>()));
    }
    out.push(separator);

    out.join("\n")
}

fn print_failures(failures: &[DomainFailure]) {
    if failures.is_empty() {
        return;
    }

    println!();
    println!("{}", "-".repeat(60));
    println!("FAILED DOMAINS: {}", failures.len());
    println!("{}", "-".repeat(60));

    for failure in failures {
        let tag = if failure.not_found { "[NO CNAME]" } else { "[ERROR]   " };
        println!("{} {}: {}", tag, failure.domain, failure.error);
    }
}

pub fn print_report(report: &ScanReport) {
    println!("{}", render_table(&report.results));
    print_failures(&report.failures);

    println!();
    println!(
        "Scanned {} domains in {:.2}s, {} vulnerable, {} taken over",
        report.domains_scanned,
        report.duration.as_secs_f64(),
        report.vulnerable().count(),
        report.taken_over().count()
    );
}
