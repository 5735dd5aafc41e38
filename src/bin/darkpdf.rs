//! CLI binary for darkpdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use darkpdf::convert::{read_input, write_output};
use darkpdf::{
    inspect_with, ConversionConfig, ConversionOutcome, ConversionPipeline,
    ConversionProgressCallback, FailureLog, FileFailureLog, PdfiumBackend, ProgressCallback,
    SelectionError, TracingFailureLog,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per page.
struct CliProgressCallback {
    bar: ProgressBar,
    page_started: Mutex<Option<Instant>>,
    skipped: AtomicUsize,
}

impl CliProgressCallback {
    /// Starts as a spinner; `on_conversion_start` turns it into a bar.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_started: Mutex::new(None),
            skipped: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Darkening");
        self.bar.reset_eta();
    }

    /// Clear the bar if the pipeline never reached `on_conversion_complete`.
    fn abandon(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total: usize) {
        self.activate_bar(total);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total} pages…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _position: usize, _total: usize) {
        if let Ok(mut started) = self.page_started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, position: usize, total: usize) {
        let elapsed_ms = self
            .page_started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.bar.println(format!(
            "  {} Page {:>3}  {}  {}",
            green("✓"),
            page_num,
            dim(&format!("[{position}/{total}]")),
            dim(&format!("{:.2}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_page_skipped(&self, notice: &SelectionError) {
        self.bar
            .println(format!("  {} {}", yellow("⚠"), yellow(&notice.to_string())));
        if matches!(notice, SelectionError::PageIndexOutOfRange { .. }) {
            self.skipped.fetch_add(1, Ordering::SeqCst);
            self.bar.inc(1);
        }
    }

    fn on_conversion_complete(&self, total: usize, converted: usize) {
        self.bar.finish_and_clear();
        let skipped = self.skipped.load(Ordering::SeqCst);
        if skipped == 0 {
            eprintln!(
                "{} {} pages converted",
                green("✔"),
                bold(&converted.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages converted  ({} out of range)",
                cyan("⚠"),
                bold(&converted.to_string()),
                total,
                yellow(&skipped.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion (writes dark_paper.pdf next to the input)
  darkpdf paper.pdf

  # Choose the output path
  darkpdf paper.pdf -o night.pdf

  # Warm eye-care tint, selected pages only
  darkpdf --eye-care --pages 1-5,9 paper.pdf

  # Sharper raster
  darkpdf --scale 2.5 slides.pdf

  # Page count and sizes only
  darkpdf --inspect-only paper.pdf

  # Machine-readable stats; non-zero exit if the original was returned
  darkpdf --json --strict paper.pdf

PAGE SPECS:
  all          every page (default)
  5            a single page (1-based)
  3-15         an inclusive range
  1,3,5-7      any comma-separated mix, in the given order

  Unparsable specs fall back to every page. Pages past the end are skipped.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to an existing libpdfium (skips discovery)
  DARKPDF_THEME           Default theme
  DARKPDF_PAGES           Default page spec
  DARKPDF_FAILURE_LOG     Append fallback reports to this file
  RUST_LOG                Override the log filter
"#;

/// Convert PDF files to a dark-mode reading variant.
#[derive(Parser, Debug)]
#[command(
    name = "darkpdf",
    version,
    about = "Convert PDF files to a dark-mode reading variant",
    long_about = "Rasterise every selected page, invert it to a pure-black background, \
optionally warm it with an eye-care tint, and rebuild a PDF with the original page sizes. \
If anything fails after the input is opened, the original document is written unchanged.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input PDF file.
    input: PathBuf,

    /// Output path. Default: dark_<input name> next to the input.
    #[arg(short, long, env = "DARKPDF_OUTPUT")]
    output: Option<PathBuf>,

    /// Theme identifier. Only `pure-black` changes colours.
    #[arg(long, env = "DARKPDF_THEME", default_value = "pure-black")]
    theme: String,

    /// Composite a warm amber tint at 8% opacity over every page.
    #[arg(long, env = "DARKPDF_EYE_CARE")]
    eye_care: bool,

    /// Page selection: all, 5, 3-15, or 1,3,5-7.
    #[arg(long, env = "DARKPDF_PAGES", default_value = "all")]
    pages: String,

    /// Raster zoom, pixels per point (0.25–4.0).
    #[arg(long, env = "DARKPDF_SCALE", default_value_t = 1.5)]
    scale: f32,

    /// Skip lopdf compaction of the output.
    #[arg(long, env = "DARKPDF_NO_COMPACT")]
    no_compact: bool,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "DARKPDF_PASSWORD")]
    password: Option<String>,

    /// Append fallback reports to this file instead of the log stream.
    #[arg(long, env = "DARKPDF_FAILURE_LOG")]
    failure_log: Option<PathBuf>,

    /// Print page count and sizes only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Print a JSON report on stdout.
    #[arg(long, env = "DARKPDF_JSON")]
    json: bool,

    /// Exit with status 2 when the original document had to be returned.
    #[arg(long, env = "DARKPDF_STRICT")]
    strict: bool,

    /// Disable progress bar.
    #[arg(long, env = "DARKPDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DARKPDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DARKPDF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let input = read_input(&cli.input)
        .await
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let password = cli.password.clone();
        let info = tokio::task::spawn_blocking(move || {
            let backend = PdfiumBackend::bind()?;
            inspect_with(&backend, &input, password.as_deref())
        })
        .await
        .context("Inspect task panicked")?
        .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialize info")?
            );
        } else {
            println!("File:   {}", cli.input.display());
            println!("Pages:  {}", info.page_count);
            for (i, size) in info.page_sizes.iter().enumerate() {
                println!("  {:>4}  {:.1} × {:.1} pt", i + 1, size.width, size.height);
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    // ── Build config ─────────────────────────────────────────────────────
    let config = build_config(&cli)?;
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));

    let failure_log: Arc<dyn FailureLog> = match cli.failure_log {
        Some(ref path) => Arc::new(FileFailureLog::new(path)),
        None => Arc::new(TracingFailureLog),
    };
    let progress = show_progress.then(CliProgressCallback::new_dynamic);

    // ── Run conversion ───────────────────────────────────────────────────
    let outcome = {
        let progress: Option<ProgressCallback> =
            progress.clone().map(|p| p as Arc<dyn ConversionProgressCallback>);
        let config = config.clone();
        tokio::task::spawn_blocking(move || {
            let mut pipeline =
                ConversionPipeline::new(PdfiumBackend::bind()?).with_failure_log(failure_log);
            if let Some(cb) = progress {
                pipeline = pipeline.with_progress(cb);
            }
            pipeline.run(&input, &config)
        })
        .await
        .context("Conversion task panicked")?
    };
    if let Some(ref p) = progress {
        p.abandon();
    }
    let outcome = outcome.context("Conversion failed")?;

    write_output(&output_path, outcome.bytes())
        .await
        .context("Failed to write output")?;

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        println!("{}", report_json(&outcome, &output_path)?);
    } else if !cli.quiet {
        match &outcome {
            ConversionOutcome::Converted { stats, .. } => eprintln!(
                "{}  {}/{} pages  {} → {}  {}ms  →  {}",
                green("✔"),
                stats.converted_pages,
                stats.selected_pages,
                dim(&format_bytes(stats.input_bytes)),
                dim(&format_bytes(stats.output_bytes)),
                stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            ),
            ConversionOutcome::FellBack { error, .. } => eprintln!(
                "{}  conversion failed ({})  original written to {}",
                yellow("⚠"),
                error,
                bold(&output_path.display().to_string()),
            ),
        }
    }

    if cli.strict && !outcome.is_converted() {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .theme_id(&cli.theme)
        .eye_care(cli.eye_care)
        .pages(cli.pages.clone())
        .scale(cli.scale)
        .compact(!cli.no_compact);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }

    builder.build().context("Invalid configuration")
}

/// `dir/paper.pdf` → `dir/dark_paper.pdf`.
fn default_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());
    input.with_file_name(format!("dark_{name}"))
}

fn report_json(outcome: &ConversionOutcome, output_path: &Path) -> Result<String> {
    let report = match outcome {
        ConversionOutcome::Converted { stats, .. } => serde_json::json!({
            "converted": true,
            "output": output_path,
            "stats": stats,
        }),
        ConversionOutcome::FellBack { error, .. } => serde_json::json!({
            "converted": false,
            "output": output_path,
            "error": error,
        }),
    };
    serde_json::to_string_pretty(&report).context("Failed to serialise report")
}

fn format_bytes(n: usize) -> String {
    const KB: f64 = 1024.0;
    let n = n as f64;
    if n >= KB * KB {
        format!("{:.1} MB", n / (KB * KB))
    } else if n >= KB {
        format!("{:.1} KB", n / KB)
    } else {
        format!("{n} B")
    }
}
