// report.rs - Detection results output
// Purpose: Persist per-target detections (JSON + text summary) and print a console summary

use crate::path_detector::{Detection, StopReason};
use anyhow::{Context, Result};
use chrono::Utc;
use colored::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetReport {
    pub target: String,
    pub scanned_at: String,
    pub detected_paths: Vec<String>,
    pub failed_count: usize,
    pub success_count: usize,
    pub stop: StopReason,
}

impl TargetReport {
    pub fn new(target: &str, detection: Detection) -> Self {
        Self {
            target: target.to_string(),
            scanned_at: Utc::now().to_rfc3339(),
            detected_paths: detection.urls,
            failed_count: detection.failed_count,
            success_count: detection.success_count,
            stop: detection.stop,
        }
    }
}

fn stop_note(stop: StopReason) -> Option<&'static str> {
    match stop {
        StopReason::CatalogExhausted => None,
        StopReason::FailureThreshold => Some("stopped early: too many failed requests"),
        StopReason::SuccessThreshold => Some("results discarded: too many matches (catch-all responder?)"),
        StopReason::InvalidBaseUrl => Some("skipped: invalid url"),
    }
}

/// Save reports as JSON, plus a `.txt` summary next to it
pub fn save_detections_to_file(reports: &[TargetReport], output_file: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(reports)
        .context("Failed to serialize detection results")?;
    fs::write(output_file, json)
        .context(format!("Failed to write detections to {:?}", output_file))?;

    let txt_file = output_file.with_extension("txt");
    let mut file = File::create(&txt_file)
        .context(format!("Failed to create detections text file: {:?}", txt_file))?;

    let total: usize = reports.iter().map(|r| r.detected_paths.len()).sum();
    writeln!(file, "=== SENSITIVE PATH DETECTION RESULTS ===")?;
    writeln!(file, "Targets scanned: {}", reports.len())?;
    writeln!(file, "Paths detected: {}", total)?;

    for report in reports {
        writeln!(file)?;
        writeln!(file, "Target: {}", report.target)?;
        if let Some(note) = stop_note(report.stop) {
            writeln!(file, "  ({})", note)?;
        }
        for url in &report.detected_paths {
            writeln!(file, "  - {}", url)?;
        }
    }

    Ok(())
}

pub fn display_summary(reports: &[TargetReport]) {
    println!("\n{}", "═══════════════════════════════════════════════════════════════".yellow().bold());
    println!("{}", "  SENSITIVE PATH DETECTION SUMMARY".yellow().bold());
    println!("{}", "═══════════════════════════════════════════════════════════════".yellow().bold());

    let vulnerable: Vec<_> = reports.iter().filter(|r| !r.detected_paths.is_empty()).collect();
    println!("{}", format!("Targets scanned: {}", reports.len()).cyan());
    println!("{}", format!("Targets with exposed paths: {}", vulnerable.len()).green());
    println!();

    for report in reports {
        if let Some(note) = stop_note(report.stop) {
            println!("{}", format!("  [!] {} - {}", report.target, note).yellow());
        }
    }

    for report in vulnerable {
        println!("{}", report.target.red().bold());
        for url in &report.detected_paths {
            println!("{}", format!("     • {}", url).cyan());
        }
        println!();
    }

    println!("{}", "═══════════════════════════════════════════════════════════════".yellow().bold());
}
