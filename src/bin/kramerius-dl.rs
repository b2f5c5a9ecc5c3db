//! CLI binary for kramerius-dl.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `DownloadConfig` and renders progress.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use kramerius_dl::{
    download, CliPdfTools, DownloadConfig, DownloadProgressCallback, PdfTools, ProgressCallback,
    DEFAULT_BASE_URL,
};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
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

fn kib(bytes: u64) -> String {
    format!("{:.0} KiB", bytes as f64 / 1024.0)
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one batch-level progress bar plus a per-batch
/// byte counter in the bar message. The pipeline is sequential, so events
/// arrive strictly in order; the mutexes only satisfy the `Sync` bound.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Window of the batch currently downloading, for the byte message.
    current_window: Mutex<(u32, u32)>,
    /// Start time of the current batch, for the per-batch elapsed line.
    batch_started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    /// Create a callback whose bar length is set by `on_download_start`
    /// once the batch count is known.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        // Spinner only until we know how many batches there will be.
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            current_window: Mutex::new((0, 0)),
            batch_started: Mutex::new(None),
        })
    }

    /// Switch to the full progress-bar style once `total` is known.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>2}/{len} batches  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Downloading");
    }
}

impl DownloadProgressCallback for CliProgressCallback {
    fn on_detect_start(&self) {
        self.bar.set_message("detecting page range…");
    }

    fn on_range_resolved(&self, start: u32, end: u32, detected: bool) {
        let source = if detected { "detected" } else { "requested" };
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Pages {start}-{end} ({source})"))
        ));
    }

    fn on_download_start(&self, total_batches: usize) {
        self.activate_bar(total_batches);
    }

    fn on_batch_start(&self, _index: usize, _total: usize, first_page: u32, last_page: u32) {
        *self.current_window.lock().unwrap() = (first_page, last_page);
        *self.batch_started.lock().unwrap() = Some(Instant::now());
        self.bar.set_message(format!("pages {first_page}-{last_page}"));
    }

    fn on_batch_progress(&self, _index: usize, bytes_downloaded: u64) {
        let (first, last) = *self.current_window.lock().unwrap();
        self.bar
            .set_message(format!("pages {first}-{last}  {}", kib(bytes_downloaded)));
    }

    fn on_batch_complete(&self, index: usize, total: usize, bytes: u64) {
        let elapsed_ms = self
            .batch_started
            .lock()
            .unwrap()
            .take()
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);
        let (first, last) = *self.current_window.lock().unwrap();

        self.bar.println(format!(
            "  {} Batch {:>2}/{:<2}  pages {:>4}-{:<4}  {:<9}  {}",
            green("✓"),
            index + 1,
            total,
            first,
            last,
            dim(&kib(bytes)),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_merge_start(&self, artifact_count: usize) {
        self.bar.set_prefix("Merging");
        self.bar.set_message(format!("{artifact_count} batches"));
    }

    fn on_download_complete(&self, _total_batches: usize, _total_bytes: u64) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Download a whole document; the page range is scraped off its detail page
  kramerius-dl 23022 dejiny.pdf

  # Explicit page range
  kramerius-dl --from 12 --to 47 23022 excerpt.pdf

  # Different Kramerius instance, smaller batches
  kramerius-dl --url http://kramerius.mzk.cz/kramerius/ --limit 10 4242 out.pdf

  # JSON run summary (for scripting)
  kramerius-dl --json --quiet 23022 out.pdf

REQUIRED TOOLS:
  pdftk      strips the server's spurious leading page from every batch
  pdfunite   merges the batches into the final PDF (poppler-utils)

  Both are discovered on PATH; override with --pdftk / --pdfunite.
"#;

/// Download paginated scanned documents from Kramerius servers as one PDF.
#[derive(Parser, Debug)]
#[command(
    name = "kramerius-dl",
    version,
    about = "Download paginated scanned documents from Kramerius servers as one PDF",
    long_about = "Download a scanned document from a Kramerius digital-library instance. \
The valid page range is scraped from the document's detail page unless --from and --to \
are both given; pages are fetched in bounded batches and merged into a single PDF.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Document identifier on the Kramerius instance.
    id: String,

    /// Path of the merged output PDF.
    output: PathBuf,

    /// First page to download (detected from the detail page when omitted).
    #[arg(long, value_name = "PAGE")]
    from: Option<u32>,

    /// Last page to download (detected from the detail page when omitted).
    #[arg(long, value_name = "PAGE")]
    to: Option<u32>,

    /// Base URL of the Kramerius instance.
    #[arg(long, env = "KRAMERIUS_URL", default_value = DEFAULT_BASE_URL)]
    url: String,

    /// Maximum pages in one downloaded batch.
    #[arg(long, env = "KRAMERIUS_LIMIT", default_value_t = 20)]
    limit: u32,

    /// Per-request timeout in seconds (no timeout when omitted).
    #[arg(long, env = "KRAMERIUS_TIMEOUT", value_name = "SECS")]
    timeout: Option<u64>,

    /// Explicit path to the pdftk binary.
    #[arg(long, env = "KRAMERIUS_PDFTK", value_name = "PATH")]
    pdftk: Option<PathBuf>,

    /// Explicit path to the pdfunite binary.
    #[arg(long, env = "KRAMERIUS_PDFUNITE", value_name = "PATH")]
    pdfunite: Option<PathBuf>,

    /// Print a JSON run summary to stdout instead of human-readable lines.
    #[arg(long)]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "KRAMERIUS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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

    // ── External tools ───────────────────────────────────────────────────
    let tools: Arc<dyn PdfTools> = Arc::new(
        CliPdfTools::with_overrides(cli.pdftk.clone(), cli.pdfunite.clone())
            .context("External PDF tools unavailable")?,
    );

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn DownloadProgressCallback>)
    } else {
        None
    };

    let mut builder = DownloadConfig::builder()
        .base_url(cli.url.clone())
        .limit(cli.limit)
        .tools(tools);
    if let Some(from) = cli.from {
        builder = builder.from(from);
    }
    if let Some(to) = cli.to {
        builder = builder.to(to);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.timeout_secs(secs);
    }
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run the pipeline ─────────────────────────────────────────────────
    let result = download(&cli.id, &cli.output, &config)
        .await
        .context("Download failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialise run summary")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  pages {}-{}  {} batches  {}  {}ms  →  {}",
            green("✔"),
            result.range.start,
            result.range.end,
            result.stats.batches,
            dim(&kib(result.stats.bytes_downloaded)),
            result.stats.total_duration_ms,
            bold(&cli.output.display().to_string()),
        );
    }

    Ok(())
}
