use clap::Parser;
use colored::Colorize;
use depthscan::{
    results::total_matches, ConfigOverrides, FileReport, ProgressEvent, ScanStats, SearchConfig,
    SearchError, Searcher,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::{io, path::PathBuf, time::Duration};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, SearchError>;

/// Search a directory tree, deepest folders first, for lines matching a
/// wildcard pattern
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Wildcard pattern each line must match (e.g. "*TODO*")
    text_pattern: Option<String>,

    /// Root directory to search in [default: .]
    #[arg(short = 'd', long)]
    root: Option<PathBuf>,

    /// File-name wildcard to include (can be specified multiple times)
    #[arg(short = 'i', long = "include")]
    include: Vec<String>,

    /// Full-path wildcard to exclude (can be specified multiple times)
    #[arg(short = 'x', long = "exclude")]
    exclude: Vec<String>,

    /// Skip files larger than this many bytes
    #[arg(long)]
    max_file_size: Option<u64>,

    /// Longest snippet to print, in characters (0 for whole lines)
    #[arg(long)]
    max_snippet: Option<usize>,

    /// Retry files without a byte-order mark as UTF-8, then UTF-16LE
    #[arg(long, overrides_with = "no_encoding_fallback")]
    encoding_fallback: bool,

    /// Never retry with another encoding, even if configured to
    #[arg(long, overrides_with = "encoding_fallback")]
    no_encoding_fallback: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Show only statistics, not matches
    #[arg(short, long)]
    stats: bool,

    /// Show a spinner while searching
    #[arg(long)]
    progress: bool,

    /// Configuration file layered over the default locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Only the values actually given on the command line
    fn overrides(&self) -> ConfigOverrides {
        let non_empty = |patterns: &Vec<String>| (!patterns.is_empty()).then(|| patterns.clone());
        let allow_encoding_fallback = if self.encoding_fallback {
            Some(true)
        } else if self.no_encoding_fallback {
            Some(false)
        } else {
            None
        };

        ConfigOverrides {
            root_path: self.root.clone(),
            include_patterns: non_empty(&self.include),
            exclude_patterns: non_empty(&self.exclude),
            text_pattern: self.text_pattern.clone(),
            max_file_size_bytes: self.max_file_size,
            max_snippet_chars: self.max_snippet,
            allow_encoding_fallback,
            log_level: self.log_level.clone(),
        }
    }
}

fn main() -> Result<()> {
    run()
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = SearchConfig::load_from(cli.config.as_deref())?.merge_with_cli(cli.overrides());
    config.validate()?;
    setup_logging(&config.log_level);
    debug!("Effective configuration: {:?}", config);

    let spinner = cli.progress.then(new_spinner);
    let on_event = |event: &ProgressEvent<'_>| {
        let Some(spinner) = &spinner else {
            return;
        };
        match event {
            ProgressEvent::DirectoryEntered { path, .. } => {
                spinner.set_message(path.display().to_string());
            }
            ProgressEvent::FileScanned { .. } => spinner.inc(1),
            ProgressEvent::Warning { .. } => {}
        }
    };

    let searcher = Searcher::new().with_progress(&on_event);
    let reports = searcher.search_config(&config)?;
    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }

    let stats = searcher.metrics().get_stats();
    info!(
        "Reporting {} matches from {} files",
        total_matches(&reports),
        reports.len()
    );
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports).map_err(io::Error::from)?);
    } else {
        print_search_results(&reports, &stats, cli.stats);
    }
    Ok(())
}

fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn new_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{elapsed}] {pos} files  {wide_msg}")
    {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_search_results(reports: &[FileReport], stats: &ScanStats, stats_only: bool) {
    if stats_only {
        println!(
            "Found {} matches in {} files",
            total_matches(reports),
            reports.len()
        );
        println!(
            "Scanned {} of {} files ({} too large, {} unreadable)",
            stats.files_scanned,
            stats.files_discovered,
            stats.files_skipped_oversize,
            stats.read_failures
        );
        if stats.fallback_passes > 0 {
            println!(
                "Encoding fallback recovered {} of {} files",
                stats.fallback_successes, stats.fallback_passes
            );
        }
        return;
    }

    for report in reports {
        println!(
            "\n{} [{}, {}]",
            report.path.display().to_string().blue(),
            report.encoding,
            report.newline
        );
        for line in &report.lines {
            println!("{}: {}", line.line_number.to_string().green(), line.snippet);
        }
    }

    println!(
        "\nFound {} matches in {} files",
        total_matches(reports),
        reports.len()
    );
}
