// main.rs - PathProbe - Sensitive Path Detection
// Purpose: Probe one or more targets for exposed management endpoints
//          (Spring Boot actuator, jolokia, API docs, ...) using a path -> signature catalog

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use pathprobe::report::{self, TargetReport};
use pathprobe::{PathCatalog, PathDetector, ProxyConfig, ProxyManager, RequestSettings};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// PathProbe - Sensitive path detection
#[derive(Parser, Debug)]
#[command(
    name = "pathprobe",
    version,
    about = "Detect exposed management endpoints by path and response signature",
    long_about = r#"
PathProbe requests every catalog path under each target and reports the
paths whose response body contains the expected signature.

EXAMPLES:

  Single target with the built-in Spring Boot catalog:
    pathprobe -u http://10.0.0.5:8080/

  Targets from a file, custom catalog, JSON report:
    pathprobe -f targets.txt -p paths.json -o results.json

  Through an HTTP proxy (checked before the scan starts):
    pathprobe -u https://example.com/ --proxy http://127.0.0.1:8080

CATALOG FORMAT:

  A JSON object mapping path to signature, probed in file order:
    {"actuator": "_links", "actuator/beans": "beans"}
"#
)]
struct Args {
    /// Target base URL (e.g., http://example.com:8080/)
    #[arg(short, long, value_name = "URL", help_heading = "Target Options")]
    url: Option<String>,

    /// File containing target URLs (one per line, # for comments)
    #[arg(short, long, value_name = "FILE", help_heading = "Target Options")]
    file: Option<PathBuf>,

    /// JSON path catalog; the built-in catalog is used when omitted
    #[arg(short, long, value_name = "FILE", help_heading = "Detection Options")]
    paths: Option<PathBuf>,

    /// Proxy for http and https traffic (e.g., http://127.0.0.1:8080)
    #[arg(long, value_name = "URL", help_heading = "Network Options")]
    proxy: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10, value_name = "SECS", help_heading = "Network Options")]
    timeout: u64,

    /// Write results as JSON (a .txt summary is written alongside)
    #[arg(short, long, value_name = "FILE", help_heading = "Output Options")]
    output: Option<PathBuf>,

    /// Log every probe (overrides RUST_LOG)
    #[arg(short, long, help_heading = "Output Options")]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    print_banner();

    let targets = collect_targets(&args)?;

    let catalog = match &args.paths {
        Some(path) => PathCatalog::from_json_file(path)
            .context(format!("Failed to load path catalog: {}", path.display()))?,
        None => PathCatalog::builtin(),
    };

    println!("{}", format!("[*] Targets: {}", targets.len()).cyan());
    println!("{}", format!("[*] Catalog paths: {}", catalog.len()).cyan());

    let settings = RequestSettings::default().with_timeout(Duration::from_secs(args.timeout));
    let proxy = args.proxy.as_deref().map(ProxyConfig::all);
    if let Some(ref p) = proxy {
        println!("{}", format!("[*] Checking proxy {}", p).cyan());
    }
    let manager = ProxyManager::with_settings(proxy, settings)
        .context("Proxy check failed; fix --proxy or run without it")?;
    let detector = PathDetector::new(catalog, &manager);

    let pb = ProgressBar::new(targets.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("=>-"),
    );

    let mut reports = Vec::with_capacity(targets.len());
    for target in &targets {
        pb.set_message(target.clone());
        let detection = detector.scan(target);
        for url in &detection.urls {
            pb.println(format!("    [!] Exposed: {}", url).green().bold().to_string());
        }
        reports.push(TargetReport::new(target, detection));
        pb.inc(1);
    }
    pb.finish_and_clear();

    report::display_summary(&reports);

    if let Some(output) = &args.output {
        report::save_detections_to_file(&reports, output)?;
        println!("{}", format!("[+] Results saved to {}", output.display()).green());
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("pathprobe=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pathprobe=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_banner() {
    println!("{}", "═══════════════════════════════════════════════════════════════".cyan().bold());
    println!("{}", "  PathProbe - Sensitive Path Detection".white().bold());
    println!("{}", "═══════════════════════════════════════════════════════════════\n".cyan().bold());
}

/// Targets from --url and --file, in that order, without blanks or comments
fn collect_targets(args: &Args) -> Result<Vec<String>> {
    let mut targets = Vec::new();

    if let Some(url) = &args.url {
        targets.push(url.trim().to_string());
    }

    if let Some(file_path) = &args.file {
        let file = File::open(file_path)
            .context(format!("Failed to open file: {}", file_path.display()))?;
        let reader = BufReader::new(file);

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.context(format!("Failed to read line {} from file", line_num + 1))?;
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            targets.push(trimmed.to_string());
        }
    }

    if targets.is_empty() {
        bail!("No targets given: use --url or --file");
    }
    Ok(targets)
}
