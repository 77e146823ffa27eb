use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::fmt;
use std::io::{self, Write};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::matcher::Pattern;
use super::merge::{merge_partitions, Merged};
use super::partition::{work_units, ExecutionPlan, OffsetIndex, Partition};
use super::worker::scan_partition;
use crate::config::SearchConfig;
use crate::corpus::Corpus;
use crate::metrics::{SearchMode, SearchStats};
use crate::results::{Match, MatchRecord};

/// Wildcard search over a borrowed corpus.
///
/// The search runs at most once per instance; later calls return the stored
/// result. Two instances compare equal when their match lists are identical,
/// which is how sequential and parallel runs are checked against each other.
#[derive(Debug, Clone)]
pub struct WildcardSearch<'a> {
    corpus: Option<&'a Corpus>,
    pattern: Pattern,
    config: SearchConfig,
    matches: Vec<Match>,
    stats: Option<SearchStats>,
    searched: bool,
}

impl<'a> WildcardSearch<'a> {
    /// Creates a search with the default configuration
    pub fn new(corpus: impl Into<Option<&'a Corpus>>, pattern: &str) -> Self {
        Self::with_config(corpus, pattern, &SearchConfig::default())
    }

    pub fn with_config(
        corpus: impl Into<Option<&'a Corpus>>,
        pattern: &str,
        config: &SearchConfig,
    ) -> Self {
        Self {
            corpus: corpus.into(),
            pattern: Pattern::with_wildcard(pattern, config.wildcard),
            config: config.clone(),
            matches: Vec::new(),
            stats: None,
            searched: false,
        }
    }

    /// Runs the search, in parallel when the corpus is large enough
    pub fn search(&mut self) -> &[Match] {
        self.run(true)
    }

    /// Runs the search on the calling thread only
    pub fn search_sequential(&mut self) -> &[Match] {
        self.run(false)
    }

    fn run(&mut self, parallel: bool) -> &[Match] {
        let corpus = match self.corpus {
            Some(corpus) if !self.pattern.is_empty() && !self.searched => corpus,
            _ => {
                debug!("Search skipped: no corpus, empty pattern, or already searched");
                return &self.matches;
            }
        };

        let started = Instant::now();
        let total = corpus.total_chars();
        let plan = if parallel {
            ExecutionPlan::for_corpus(total, self.pattern.len(), &self.config)
        } else {
            ExecutionPlan::Sequential
        };

        let (mode, workers, merged) = match plan {
            ExecutionPlan::Sequential => {
                (SearchMode::Sequential, 1, self.scan_sequential(corpus))
            }
            ExecutionPlan::Parallel(partitions) => {
                let parts = self.scan_parallel(corpus, &partitions);
                (
                    SearchMode::Parallel,
                    partitions.len(),
                    merge_partitions(parts, self.pattern.len()),
                )
            }
        };

        self.matches = merged.matches;
        self.searched = true;

        let stats = SearchStats {
            mode,
            total_chars: total,
            work_units: work_units(total, self.config.threshold_size),
            workers,
            candidates: merged.candidates,
            discarded: merged.discarded,
            matches: self.matches.len(),
            elapsed: started.elapsed(),
        };
        info!(
            "Search complete. Found {} matches in {} lines ({} mode)",
            stats.matches,
            corpus.len(),
            stats.mode
        );
        self.stats = Some(stats);

        &self.matches
    }

    fn scan_sequential(&self, corpus: &Corpus) -> Merged {
        let mut matches = Vec::new();
        for (line, chars) in corpus.lines().enumerate() {
            matches.extend(
                self.pattern
                    .find_in_line(chars)
                    .into_iter()
                    .map(|column| Match::new(line, column)),
            );
        }
        Merged {
            candidates: matches.len(),
            discarded: 0,
            matches,
        }
    }

    /// Runs one worker per partition and waits for all of them.
    ///
    /// Results come back in partition order.
    fn scan_parallel(&self, corpus: &Corpus, partitions: &[Partition]) -> Vec<Vec<Match>> {
        let index = OffsetIndex::build(corpus);
        let pattern = &self.pattern;
        let scan_all = || {
            partitions
                .par_iter()
                .map(|&partition| scan_partition(corpus, pattern, &index, partition))
                .collect::<Vec<_>>()
        };

        match ThreadPoolBuilder::new()
            .num_threads(partitions.len())
            .thread_name(|i| format!("mtfind-worker-{}", i))
            .build()
        {
            Ok(pool) => pool.install(scan_all),
            Err(e) => {
                warn!("Failed to build worker pool, using the global pool: {}", e);
                scan_all()
            }
        }
    }

    /// Matches found so far, ordered by line then column
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn is_searched(&self) -> bool {
        self.searched
    }

    /// Statistics of the completed search
    pub fn stats(&self) -> Option<&SearchStats> {
        self.stats.as_ref()
    }

    /// Matches as 1-based records carrying the matched text
    pub fn records(&self) -> impl Iterator<Item = MatchRecord> + '_ {
        let width = self.pattern.len();
        self.corpus.into_iter().flat_map(move |corpus| {
            self.matches.iter().map(move |m| MatchRecord {
                line: m.line + 1,
                column: m.column + 1,
                text: corpus.excerpt(m.line, m.column, width),
            })
        })
    }

    /// Writes the match count followed by one `line column text` row per match
    pub fn print<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        write!(sink, "{}", self)
    }
}

impl PartialEq for WildcardSearch<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.matches == other.matches
    }
}

impl Eq for WildcardSearch<'_> {}

impl fmt::Display for WildcardSearch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.corpus.is_none() {
            return Ok(());
        }
        writeln!(f, "{}", self.matches.len())?;
        for record in self.records() {
            writeln!(f, "{}", record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    /// Forces parallel plans on small inputs
    fn tiny_threshold(threshold: usize, threads: usize) -> SearchConfig {
        SearchConfig {
            threshold_size: NonZeroUsize::new(threshold).unwrap(),
            thread_count: NonZeroUsize::new(threads),
            ..SearchConfig::default()
        }
    }

    #[test]
    fn test_report_format() {
        let corpus = Corpus::from_lines(["xbadxmadxhadx"]);
        let mut search = WildcardSearch::new(&corpus, "?ad");
        search.search();

        let mut out = Vec::new();
        search.print(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "3\n1 2 bad\n1 6 mad\n1 10 had\n"
        );
        assert_eq!(search.to_string(), "3\n1 2 bad\n1 6 mad\n1 10 had\n");
    }

    #[test]
    fn test_search_is_idempotent() {
        let corpus = Corpus::from_lines(["abab", "ab"]);
        let mut search = WildcardSearch::new(&corpus, "ab");
        let first = search.search().to_vec();
        assert!(search.is_searched());
        let second = search.search_sequential().to_vec();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_degenerate_inputs_are_no_ops() {
        let corpus = Corpus::from_lines(["abc"]);

        let mut empty_pattern = WildcardSearch::new(&corpus, "");
        assert!(empty_pattern.search().is_empty());
        assert!(!empty_pattern.is_searched());
        assert!(empty_pattern.stats().is_none());

        let mut no_corpus = WildcardSearch::new(None::<&Corpus>, "abc");
        assert!(no_corpus.search().is_empty());
        let mut out = Vec::new();
        no_corpus.print(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_parallel_plan_is_used_above_threshold() {
        let corpus = Corpus::from_lines(["one ad", "two ad", "three ad", "four ad"]);
        let config = tiny_threshold(4, 3);
        let mut parallel = WildcardSearch::with_config(&corpus, "?ad", &config);
        parallel.search();

        let stats = parallel.stats().unwrap();
        assert_eq!(stats.mode, SearchMode::Parallel);
        assert_eq!(stats.workers, 3);
        assert_eq!(stats.matches, 4);

        let mut sequential = WildcardSearch::with_config(&corpus, "?ad", &config);
        sequential.search_sequential();
        assert_eq!(sequential.stats().unwrap().mode, SearchMode::Sequential);
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_seams_inside_a_single_line() {
        let line = "aa".repeat(50);
        let corpus = Corpus::from_lines([line.as_str()]);
        for threads in 2..8 {
            let config = tiny_threshold(5, threads);
            let mut parallel = WildcardSearch::with_config(&corpus, "aaa", &config);
            parallel.search();
            let mut sequential = WildcardSearch::with_config(&corpus, "aaa", &config);
            sequential.search_sequential();
            assert_eq!(parallel, sequential, "threads = {}", threads);
        }
    }

    #[test]
    fn test_custom_wildcard_in_report() {
        let corpus = Corpus::from_lines(["a?c abc"]);
        let config = SearchConfig {
            wildcard: '*',
            ..SearchConfig::default()
        };
        let mut search = WildcardSearch::with_config(&corpus, "a*c", &config);
        search.search();
        assert_eq!(search.to_string(), "2\n1 1 a?c\n1 5 abc\n");
    }

    #[test]
    fn test_records() {
        let corpus = Corpus::from_lines(["", "zz God, said zz"]);
        let mut search = WildcardSearch::new(&corpus, "God? s??d");
        search.search();
        let records: Vec<_> = search.records().collect();
        assert_eq!(
            records,
            vec![MatchRecord {
                line: 2,
                column: 4,
                text: "God, said".to_string()
            }]
        );
    }
}
