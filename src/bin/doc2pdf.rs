//! CLI binary for doc2pdf.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` and prints one status line per fallback step.
//! Run with no arguments it converts the default files in the current
//! directory.

use anyhow::{Context, Result};
use clap::Parser;
use doc2pdf::{
    convert, AttemptFailure, ConversionConfig, ConversionProgressCallback, Doc2PdfError,
    ProgressCallback, SetupOptions, Strategy,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── Status output ────────────────────────────────────────────────────────────

/// Prints one line per chain event on stderr and shows a download bar while
/// the PDF engine is being installed.
struct CliStatus {
    doc_tool: String,
    html: PathBuf,
    markdown: PathBuf,
    download: Mutex<Option<ProgressBar>>,
}

impl CliStatus {
    fn new(config: &ConversionConfig) -> Arc<Self> {
        Arc::new(Self {
            doc_tool: config.doc_tool.clone(),
            html: config.html_path.clone(),
            markdown: config.markdown_path.clone(),
            download: Mutex::new(None),
        })
    }

    fn download_bar() -> ProgressBar {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("PDF engine");
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    }
}

impl ConversionProgressCallback for CliStatus {
    fn on_conversion_start(&self, strategies: &[Strategy]) {
        let source = first_source(strategies, &self.html, &self.markdown);
        eprintln!("🔄 Creating PDF from {}...", bold(&source.display().to_string()));
    }

    fn on_strategy_start(&self, strategy: Strategy) {
        match strategy {
            Strategy::Browser => {}
            Strategy::DocTool => eprintln!("{}", dim(&format!("Trying {}...", self.doc_tool))),
            Strategy::Manual => eprintln!("{}", dim("Drawing a simple text PDF...")),
        }
    }

    fn on_browser_located(&self, browser: &Path) {
        eprintln!("Using {} to convert HTML to PDF...", browser.display());
    }

    fn on_engine_install_start(&self) {
        eprintln!("{} PDF engine not available. Installing...", red("❌"));
        if let Ok(mut slot) = self.download.lock() {
            *slot = Some(Self::download_bar());
        }
    }

    fn on_engine_download_progress(&self, downloaded: u64, total: Option<u64>) {
        if let Ok(slot) = self.download.lock() {
            if let Some(bar) = slot.as_ref() {
                if let Some(t) = total {
                    if bar.length().unwrap_or(0) != t {
                        bar.set_length(t);
                    }
                }
                bar.set_position(downloaded);
            }
        }
    }

    fn on_engine_install_complete(&self, success: bool) {
        if let Ok(mut slot) = self.download.lock() {
            if let Some(bar) = slot.take() {
                if success {
                    bar.finish_with_message("ready ✓");
                } else {
                    bar.abandon();
                }
            }
        }
    }

    fn on_strategy_success(&self, strategy: Strategy, _output: &Path) {
        let line = match strategy {
            Strategy::Browser => "PDF created successfully!".to_string(),
            Strategy::DocTool => format!("PDF created successfully using {}!", self.doc_tool),
            Strategy::Manual => "Simple PDF created successfully!".to_string(),
        };
        eprintln!("{} {}", green("✅"), line);
    }

    fn on_strategy_failure(&self, strategy: Strategy, failure: &AttemptFailure) {
        let line = match (strategy, failure) {
            (Strategy::Browser, AttemptFailure::NotFound { .. }) => {
                "Chrome/Chromium not found. Trying alternative method...".to_string()
            }
            (Strategy::Browser, f) => format!("Error creating PDF: {f}"),
            (Strategy::DocTool, AttemptFailure::NotFound { tool }) => {
                format!("{tool} not found. Creating a simple text-based PDF...")
            }
            (Strategy::DocTool, AttemptFailure::ToolFailed { tool, stderr, .. }) => {
                format!("{tool} error: {stderr}")
            }
            (_, f) => f.to_string(),
        };
        eprintln!("{} {}", red("❌"), line);
    }

    fn on_conversion_complete(&self, succeeded: Option<Strategy>) {
        if succeeded.is_some() {
            eprintln!("🎉 PDF creation completed!");
        } else {
            eprintln!(
                "{} Failed to create PDF. Please try manual conversion.",
                red("❌")
            );
        }
    }
}

/// The file the first strategy in the chain reads.
fn first_source<'a>(strategies: &[Strategy], html: &'a Path, markdown: &'a Path) -> &'a Path {
    match strategies.first() {
        Some(Strategy::Browser) => html,
        _ => markdown,
    }
}

// ── CLI definition ───────────────────────────────────────────────────────────

const AFTER_HELP: &str = r#"STRATEGIES (tried in this order, first success wins):
  browser   headless Chrome/Chromium: --print-to-pdf of the HTML file
  doc-tool  pandoc <markdown> -o <output>
  manual    built-in plain-text renderer (PDFium), one line per source line

EXAMPLES:
  # Convert the default files in the current directory
  doc2pdf

  # Explicit inputs and output
  doc2pdf --html notes.html --markdown notes.md -o notes.pdf

  # Never launch a browser; give pandoc 30 seconds
  doc2pdf --skip browser --timeout 30

  # Machine-readable report of every attempt
  doc2pdf --json > report.json

ENVIRONMENT VARIABLES:
  DOC2PDF_PDFIUM_PATH   Path to an existing libpdfium; skips the download
  DOC2PDF_CACHE_DIR     Override the pdfium cache directory

  When no PDFium library is found the manual renderer downloads it once
  (~30 MB) into ~/.cache/doc2pdf/. Use --no-install to forbid that.

EXIT STATUS:
  0  a strategy produced the PDF
  1  every strategy failed
  2  invalid arguments or configuration
"#;

/// Convert an HTML or Markdown document to PDF with the best tool available.
#[derive(Parser, Debug)]
#[command(
    name = "doc2pdf",
    version,
    about = "Convert an HTML or Markdown document to PDF with the best tool available",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// HTML source printed by the browser strategy.
    #[arg(long, env = "DOC2PDF_HTML", default_value = doc2pdf::config::DEFAULT_HTML)]
    html: PathBuf,

    /// Markdown source used by the doc-tool and manual strategies.
    #[arg(long, env = "DOC2PDF_MARKDOWN", default_value = doc2pdf::config::DEFAULT_MARKDOWN)]
    markdown: PathBuf,

    /// Output PDF path (overwritten).
    #[arg(short, long, env = "DOC2PDF_OUTPUT", default_value = doc2pdf::config::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Title line drawn by the manual renderer.
    #[arg(long, env = "DOC2PDF_TITLE", default_value = doc2pdf::config::DEFAULT_TITLE)]
    title: String,

    /// Browser executable to try before the built-in candidates.
    #[arg(long, env = "DOC2PDF_BROWSER")]
    browser: Option<PathBuf>,

    /// Document converter command.
    #[arg(long, env = "DOC2PDF_DOC_TOOL", default_value = doc2pdf::config::DEFAULT_DOC_TOOL)]
    doc_tool: String,

    /// Per-process timeout in seconds for the browser and the doc tool.
    #[arg(long, env = "DOC2PDF_TIMEOUT", default_value_t = 120,
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Leave a strategy out of the chain (repeatable).
    #[arg(long, value_enum)]
    skip: Vec<StrategyArg>,

    /// Never download the PDF engine; fail the manual strategy instead.
    #[arg(long, env = "DOC2PDF_NO_INSTALL")]
    no_install: bool,

    /// Existing pdfium library for the manual renderer.
    #[arg(long, env = "DOC2PDF_PDFIUM_PATH")]
    pdfium_path: Option<PathBuf>,

    /// Print the conversion report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOC2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress status lines; only the final error is printed.
    #[arg(short, long, env = "DOC2PDF_QUIET", conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum StrategyArg {
    Browser,
    DocTool,
    Manual,
}

impl From<StrategyArg> for Strategy {
    fn from(v: StrategyArg) -> Self {
        match v {
            StrategyArg::Browser => Strategy::Browser,
            StrategyArg::DocTool => Strategy::DocTool,
            StrategyArg::Manual => Strategy::Manual,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Status lines are the user-facing output; library logs stay quiet
    // unless asked for.
    let filter = if cli.verbose { "debug" } else { "error" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", red("✘"));
            ExitCode::from(2)
        }
    }
}

async fn run(cli: &Cli) -> Result<ExitCode> {
    let config = build_config(cli)?;

    match convert(&config).await {
        Ok(report) => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("Failed to serialise report")?
                );
            }
            if !cli.quiet {
                eprintln!(
                    "📄 File: {}  {}",
                    bold(&report.output.display().to_string()),
                    dim(&format!(
                        "via {} · {} fallback(s) · {}ms",
                        report.strategy,
                        report.fallbacks(),
                        report.total_duration_ms
                    )),
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(Doc2PdfError::AllStrategiesFailed { attempts }) => {
            if cli.json {
                let value = serde_json::json!({
                    "output": config.output_path,
                    "strategy": null,
                    "attempts": attempts,
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&value).context("Failed to serialise report")?
                );
            }
            if cli.quiet {
                eprintln!(
                    "{} {}",
                    red("✘"),
                    Doc2PdfError::AllStrategiesFailed { attempts }
                );
            }
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e).context("Conversion failed"),
    }
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let mut engine = SetupOptions::from_env();
    if let Some(ref path) = cli.pdfium_path {
        engine.library_path = Some(path.clone());
    }

    let mut builder = ConversionConfig::builder()
        .html(&cli.html)
        .markdown(&cli.markdown)
        .output(&cli.output)
        .title(&cli.title)
        .doc_tool(&cli.doc_tool)
        .process_timeout_secs(cli.timeout)
        .auto_install(!cli.no_install)
        .engine(engine);

    if let Some(ref browser) = cli.browser {
        builder = builder.browser(browser);
    }
    for &s in &cli.skip {
        builder = builder.skip(s.into());
    }

    let mut config = builder.build().context("Invalid configuration")?;

    if !cli.quiet {
        config.progress_callback = Some(CliStatus::new(&config) as ProgressCallback);
    }

    Ok(config)
}
