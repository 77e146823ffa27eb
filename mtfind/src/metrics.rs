use std::fmt;
use std::time::Duration;
use tracing::info;

/// How a completed search was executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Sequential,
    Parallel,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Sequential => f.write_str("sequential"),
            SearchMode::Parallel => f.write_str("parallel"),
        }
    }
}

/// Statistics about one completed search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchStats {
    pub mode: SearchMode,
    /// Characters in the corpus
    pub total_chars: usize,
    /// Work units the corpus was rounded to
    pub work_units: usize,
    /// Workers dispatched (1 for a sequential scan)
    pub workers: usize,
    /// Matches reported by the workers before merging
    pub candidates: usize,
    /// Candidates the merge dropped as margin duplicates
    pub discarded: usize,
    /// Matches in the final result
    pub matches: usize,
    pub elapsed: Duration,
}

impl SearchStats {
    /// Logs the statistics at info level
    pub fn log_stats(&self) {
        info!(
            "Search stats:\n\
             Mode: {}\n\
             Characters: {} ({} work units)\n\
             Workers: {}\n\
             Candidates/discarded: {}/{}\n\
             Matches: {}\n\
             Elapsed: {}",
            self.mode,
            self.total_chars,
            self.work_units,
            self.workers,
            self.candidates,
            self.discarded,
            self.matches,
            humantime::format_duration(self.elapsed)
        );
    }
}
