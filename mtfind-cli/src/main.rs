use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use mtfind::{Corpus, EncodingMode, SearchConfig, SearchError, WildcardSearch};
use std::io::{self, BufWriter, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Exit code for bad arguments or a missing or unreadable input
const EXIT_INPUT: u8 = 1;
/// Exit code for an empty pattern
const EXIT_EMPTY_PATTERN: u8 = 2;

#[derive(Parser)]
#[command(author, version, about = "Multi-threaded wildcard search", long_about = None)]
struct Cli {
    /// File to search
    #[arg(required_unless_present = "print_config")]
    file: Option<PathBuf>,

    /// Pattern to search for; the wildcard matches exactly one character
    #[arg(required_unless_present = "print_config")]
    pattern: Option<String>,

    /// Scan on a single thread
    #[arg(long)]
    sequential: bool,

    /// Maximum number of worker threads
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Characters per work unit
    #[arg(long)]
    threshold: Option<NonZeroUsize>,

    /// Allow more workers than work units
    #[arg(long)]
    no_clamp: bool,

    /// Wildcard character
    #[arg(short = 'w', long)]
    wildcard: Option<char>,

    /// How to handle invalid UTF-8 sequences (failfast|lossy)
    #[arg(long)]
    encoding: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Log search statistics
    #[arg(short, long)]
    stats: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Match count followed by `line column text` rows
    Text,
    /// JSON array of match records
    Json,
}

impl Cli {
    fn search_config(&self) -> SearchConfig {
        let defaults = SearchConfig::default();
        let encoding_mode = match self.encoding.as_deref().map(str::to_lowercase).as_deref() {
            Some("lossy") => EncodingMode::Lossy,
            _ => EncodingMode::FailFast,
        };

        SearchConfig {
            wildcard: self.wildcard.unwrap_or(defaults.wildcard),
            threshold_size: self.threshold.unwrap_or(defaults.threshold_size),
            thread_count: self.threads,
            clamp_workers: !self.no_clamp,
            encoding_mode,
            log_level: self.log_level.clone().unwrap_or(defaults.log_level),
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(EXIT_INPUT);
        }
    };
    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<SearchError>() {
        Some(SearchError::InvalidPattern(_)) => EXIT_EMPTY_PATTERN,
        _ => EXIT_INPUT,
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let mut config =
        SearchConfig::load_from(cli.config.as_deref())?.merge_with_cli(cli.search_config());
    if cli.stats && config.log_level == "warn" {
        config.log_level = "info".to_string();
    }
    init_logging(&config.log_level);
    debug!("Effective configuration: {:?}", config);

    if cli.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(ExitCode::SUCCESS);
    }

    let (Some(file), Some(pattern)) = (cli.file.as_deref(), cli.pattern.as_deref()) else {
        return Err(SearchError::config_error("a file and a pattern are required").into());
    };
    let corpus = Corpus::load(file, config.encoding_mode)?;
    if pattern.is_empty() {
        return Err(SearchError::invalid_pattern("pattern is empty").into());
    }

    let mut search = WildcardSearch::with_config(&corpus, pattern, &config);
    if cli.sequential {
        search.search_sequential();
    } else {
        search.search();
    }

    if cli.stats {
        if let Some(stats) = search.stats() {
            stats.log_stats();
        }
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match cli.format {
        Format::Text => search.print(&mut out)?,
        Format::Json => {
            let records: Vec<_> = search.records().collect();
            serde_json::to_writer_pretty(&mut out, &records)?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    Ok(ExitCode::SUCCESS)
}
