//! geotrace: forensic metadata, geolocation and integrity reports for image files.
//!
//! Reports are written to stdout (or export files); logs go to stderr.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{debug, error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use geotrace_core::{hash_file, Error, ForensicReport};
use geotrace_geocode::GeocodeConfig;
use geotrace_report::{export, CancelFlag, ExportFormat, ReportBuilder};

#[derive(Parser, Debug)]
#[command(name = "geotrace")]
#[command(author, version, about = "Forensic EXIF, GPS and integrity analysis for images")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze one or more image files
    Analyze(AnalyzeArgs),

    /// Re-hash an evidence file and compare it with a saved JSON report
    Verify {
        /// Evidence file to check
        path: PathBuf,

        /// JSON report previously exported for this file
        #[arg(short, long)]
        report: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct AnalyzeArgs {
    /// Image files to analyze
    #[arg(required = true, num_args = 1..)]
    paths: Vec<PathBuf>,

    /// Report format printed to stdout: "json" or "text"
    #[arg(short, long, default_value = "text")]
    format: ExportFormat,

    /// Write the JSON report here (a directory when analyzing several files)
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Write the text report here (a directory when analyzing several files)
    #[arg(long, value_name = "PATH")]
    txt: Option<PathBuf>,

    /// Do not print reports to stdout
    #[arg(short, long)]
    quiet: bool,

    /// Reverse-geocoding timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Skip reverse geocoding
    #[arg(long)]
    no_geocode: bool,

    /// Nominatim-compatible reverse endpoint
    #[arg(long, value_name = "URL")]
    geocode_url: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = init_tracing();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "geotrace failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Analyze(args) => cmd_analyze(args).await,
        Commands::Verify { path, report } => cmd_verify(&path, &report),
    }
}

/// Tracing to stderr, configured from the environment:
///
///   LOG_FORMAT - "json" or "text" (default: "text")
///   LOG_FILE   - path to log file (optional, daily rotation)
///   LOG_ANSI   - "true"/"false" override ANSI colors
///   RUST_LOG   - standard env filter (default: "geotrace=info")
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "geotrace=info,geotrace_core=info,geotrace_geocode=info,geotrace_report=info".into()
    });
    let registry = tracing_subscriber::registry().with(env_filter);

    let guard = if let Some(ref path) = log_file {
        let path = Path::new(path);
        let file_dir = path.parent().unwrap_or(Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("geotrace.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false)); // no ANSI in files
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    debug!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stderr)"),
        "Logging initialized"
    );
    guard
}

fn geocode_config(args: &AnalyzeArgs) -> anyhow::Result<GeocodeConfig> {
    let mut config = GeocodeConfig::from_env().context("invalid geocode configuration")?;
    if args.no_geocode {
        config.enabled = false;
    }
    if let Some(url) = &args.geocode_url {
        config.base_url = url.clone();
    }
    if let Some(secs) = args.timeout {
        config.timeout_secs = secs;
    }
    config.validate().context("invalid geocode configuration")?;
    Ok(config)
}

async fn cmd_analyze(args: AnalyzeArgs) -> anyhow::Result<ExitCode> {
    let config = geocode_config(&args)?;
    let cancel = CancelFlag::new();
    let builder = ReportBuilder::from_config(&config)?.with_cancel_flag(cancel.clone());

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let batch = args.paths.len() > 1;
    for dir in [&args.json, &args.txt].into_iter().flatten() {
        if batch {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create output directory {}", dir.display()))?;
        }
    }

    let mut outputs = ExportPaths::new(batch);
    let mut analyzed = 0usize;
    let mut failures = 0usize;
    for path in &args.paths {
        let report = match builder.build(path).await {
            Ok(report) => {
                analyzed += 1;
                report
            }
            Err(e @ Error::Cancelled(_)) => {
                warn!(error = %e, "Stopping batch");
                eprintln!("{}: {}", path.display(), e);
                failures += 1;
                break;
            }
            Err(e) => {
                eprintln!("{}: {:#}", path.display(), anyhow::Error::from(e));
                failures += 1;
                continue;
            }
        };

        if let Err(e) = emit(&args, &report, path, &mut outputs) {
            error!(file_path = %path.display(), error = %e, "Cannot export report");
            eprintln!("{}: {:#}", path.display(), e);
            failures += 1;
        }
    }

    info!(
        analyzed,
        failed = failures,
        "Batch complete"
    );
    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Print and write the exports requested for one report.
fn emit(
    args: &AnalyzeArgs,
    report: &ForensicReport,
    input: &Path,
    outputs: &mut ExportPaths,
) -> anyhow::Result<()> {
    if !args.quiet {
        println!("{}", export::render(report, args.format)?);
    }
    if let Some(target) = &args.json {
        export::write_to(report, ExportFormat::Json, &outputs.claim(target, input, "json"))?;
    }
    if let Some(target) = &args.txt {
        export::write_to(report, ExportFormat::Text, &outputs.claim(target, input, "txt"))?;
    }
    Ok(())
}

/// Export file names for one run.
///
/// A single input writes to the target itself. In a batch the target is a
/// directory and each report becomes `<input file name>.<ext>`; inputs
/// sharing a file name get `<input file name>-2.<ext>`, `-3`, ... so no
/// report of this run replaces another.
struct ExportPaths {
    batch: bool,
    claimed: HashSet<PathBuf>,
}

impl ExportPaths {
    fn new(batch: bool) -> Self {
        Self {
            batch,
            claimed: HashSet::new(),
        }
    }

    fn claim(&mut self, target: &Path, input: &Path, ext: &str) -> PathBuf {
        if !self.batch {
            return target.to_path_buf();
        }
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report".to_string());

        let mut candidate = target.join(format!("{}.{}", name, ext));
        let mut n = 2;
        while self.claimed.contains(&candidate) {
            candidate = target.join(format!("{}-{}.{}", name, n, ext));
            n += 1;
        }
        if n > 2 {
            debug!(
                file_path = %input.display(),
                export_path = %candidate.display(),
                "Export name already used in this run"
            );
        }
        self.claimed.insert(candidate.clone());
        candidate
    }
}

fn cmd_verify(path: &Path, report_path: &Path) -> anyhow::Result<ExitCode> {
    let json = std::fs::read_to_string(report_path)
        .with_context(|| format!("cannot read report {}", report_path.display()))?;
    let report = export::from_json(&json)?;

    if !path.is_file() {
        bail!("{} is not a regular file", path.display());
    }
    let current = hash_file(path)?;
    let recorded = report.hashes();

    for ((label, then), (_, now)) in recorded.entries().into_iter().zip(current.entries()) {
        let status = if then.eq_ignore_ascii_case(now) {
            "OK"
        } else {
            "MISMATCH"
        };
        println!("{:<8}{:<10}{}", label, status, now);
    }

    if recorded.matches(&current) {
        info!(file_path = %path.display(), "Evidence matches recorded digests");
        println!("Integrity verified");
        Ok(ExitCode::SUCCESS)
    } else {
        warn!(file_path = %path.display(), "Evidence does not match recorded digests");
        println!("Integrity check FAILED");
        Ok(ExitCode::FAILURE)
    }
}
