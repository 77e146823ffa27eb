use config::{Config as ConfigBuilder, File};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;

use crate::errors::SearchResult;

/// Characters per work unit when deciding between sequential and parallel scans
pub const DEFAULT_THRESHOLD_SIZE: usize = 1_000_000;

/// The pattern character that matches any single character
pub const DEFAULT_WILDCARD: char = '?';

/// Per-directory configuration file
const LOCAL_CONFIG_FILE: &str = ".mtfind.yaml";

/// Worker count used when the available parallelism cannot be detected
const FALLBACK_WORKERS: usize = 2;

static HARDWARE_THREADS: Lazy<NonZeroUsize> = Lazy::new(|| {
    std::thread::available_parallelism()
        .unwrap_or_else(|_| NonZeroUsize::new(FALLBACK_WORKERS).unwrap_or(NonZeroUsize::MIN))
});

/// How to treat bytes that are not valid UTF-8 when loading a corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingMode {
    /// Refuse to load the file
    #[default]
    FailFast,
    /// Replace invalid sequences with U+FFFD
    Lossy,
}

/// Configuration for the search engine.
///
/// # Configuration Locations
///
/// Sources are merged in order of increasing precedence:
/// 1. Global `$CONFIG_DIR/mtfind/config.yaml`
/// 2. Local `.mtfind.yaml` in the current directory
/// 3. Custom file passed via `--config`
///
/// Command-line flags are applied last through [`SearchConfig::merge_with_cli`].
///
/// # Configuration Format
///
/// ```yaml
/// # Pattern character matching exactly one arbitrary character
/// wildcard: "?"
///
/// # Characters per work unit; parallel scans start above 1.5 units
/// threshold_size: 1000000
///
/// # Upper bound on worker threads (default: available parallelism)
/// thread_count: 8
///
/// # Never run more workers than there are work units
/// clamp_workers: true
///
/// # failfast | lossy
/// encoding_mode: failfast
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "warn"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Wildcard marker inside patterns
    pub wildcard: char,

    /// Characters per work unit
    pub threshold_size: NonZeroUsize,

    /// Worker limit; `None` uses the available parallelism
    pub thread_count: Option<NonZeroUsize>,

    /// Clamp the worker count to the number of work units
    pub clamp_workers: bool,

    /// Handling of invalid UTF-8 in input files
    pub encoding_mode: EncodingMode,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

fn default_threshold_size() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_THRESHOLD_SIZE).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            wildcard: DEFAULT_WILDCARD,
            threshold_size: default_threshold_size(),
            thread_count: None,
            clamp_workers: true,
            encoding_mode: EncodingMode::default(),
            log_level: default_log_level(),
        }
    }
}

impl SearchConfig {
    /// Loads configuration from the default locations
    pub fn load() -> SearchResult<Self> {
        Self::load_from(None)
    }

    /// Loads configuration from the default locations plus an optional explicit file.
    ///
    /// An explicit file that does not exist is an error; the default locations are
    /// skipped when absent.
    pub fn load_from(config_path: Option<&Path>) -> SearchResult<Self> {
        Self::load_layered(Path::new("."), config_path)
    }

    /// Same as [`SearchConfig::load_from`], reading the local `.mtfind.yaml` from `local_dir`
    pub(crate) fn load_layered(
        local_dir: &Path,
        config_path: Option<&Path>,
    ) -> SearchResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let defaults = [
            dirs::config_dir().map(|p| p.join("mtfind/config.yaml")),
            Some(local_dir.join(LOCAL_CONFIG_FILE)),
        ];
        for path in defaults.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Merges CLI arguments with configuration file values.
    ///
    /// CLI values that differ from the defaults take precedence.
    pub fn merge_with_cli(mut self, cli_config: SearchConfig) -> Self {
        let defaults = SearchConfig::default();

        if cli_config.wildcard != defaults.wildcard {
            self.wildcard = cli_config.wildcard;
        }
        if cli_config.threshold_size != defaults.threshold_size {
            self.threshold_size = cli_config.threshold_size;
        }
        if cli_config.thread_count.is_some() {
            self.thread_count = cli_config.thread_count;
        }
        if !cli_config.clamp_workers {
            self.clamp_workers = false;
        }
        if cli_config.encoding_mode != defaults.encoding_mode {
            self.encoding_mode = cli_config.encoding_mode;
        }
        if cli_config.log_level != defaults.log_level {
            self.log_level = cli_config.log_level;
        }
        self
    }

    /// Upper bound on worker threads for a parallel search
    pub fn worker_limit(&self) -> NonZeroUsize {
        self.thread_count.unwrap_or(*HARDWARE_THREADS)
    }

    /// Renders the effective configuration as YAML
    pub fn to_yaml(&self) -> SearchResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
