use std::num::NonZeroUsize;
use tracing::debug;

use crate::config::SearchConfig;
use crate::corpus::Corpus;

/// Work units at or below this count are scanned sequentially
const SEQUENTIAL_UNITS: usize = 1;

/// Prefix sums of line lengths, mapping global character offsets to lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetIndex {
    ends: Vec<usize>,
}

impl OffsetIndex {
    pub fn build(corpus: &Corpus) -> Self {
        let mut total = 0;
        let ends = corpus
            .lines()
            .map(|line| {
                total += line.len();
                total
            })
            .collect();
        Self { ends }
    }

    /// Number of lines covered
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// Total characters in the corpus
    pub fn total(&self) -> usize {
        self.ends.last().copied().unwrap_or(0)
    }

    /// Global offset of the first character of `line`
    pub fn line_start(&self, line: usize) -> usize {
        if line == 0 {
            0
        } else {
            self.ends[line - 1]
        }
    }

    /// Global offset one past the last character of `line`
    pub fn line_end(&self, line: usize) -> usize {
        self.ends[line]
    }

    /// The first line whose cumulative offset strictly exceeds `offset`.
    ///
    /// Returns `len()` when `offset` is at or past the end of the corpus.
    pub fn line_of(&self, offset: usize) -> usize {
        self.ends.partition_point(|&end| end <= offset)
    }
}

/// A half-open range `[lower, upper)` of global offsets assigned to one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub lower: usize,
    pub upper: usize,
}

/// How a search will be executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionPlan {
    /// Scan every line on the calling thread
    Sequential,
    /// Scan the given ranges concurrently, one worker each
    Parallel(Vec<Partition>),
}

impl ExecutionPlan {
    /// Decides the execution mode for `total` characters and a pattern of `margin` characters
    pub fn for_corpus(total: usize, margin: usize, config: &SearchConfig) -> Self {
        let units = work_units(total, config.threshold_size);
        if units <= SEQUENTIAL_UNITS {
            debug!(
                "{} characters make {} work unit(s), scanning sequentially",
                total, units
            );
            return ExecutionPlan::Sequential;
        }

        let mut workers = config.worker_limit().get();
        if config.clamp_workers {
            workers = workers.min(units);
        }

        let partitions = split(total, workers, margin);
        debug!(
            "{} characters make {} work units, dispatching {} workers",
            total,
            units,
            partitions.len()
        );
        ExecutionPlan::Parallel(partitions)
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self, ExecutionPlan::Parallel(_))
    }
}

/// `total / threshold` rounded to the nearest integer, halves rounding up
pub fn work_units(total: usize, threshold: NonZeroUsize) -> usize {
    let threshold = threshold.get();
    total / threshold + usize::from(total % threshold >= threshold - threshold / 2)
}

/// Splits `[0, total)` into `workers` blocks, widening interior boundaries by `margin`
pub fn split(total: usize, workers: usize, margin: usize) -> Vec<Partition> {
    let workers = workers.max(1);
    let block = total / workers;
    (0..workers)
        .map(|i| {
            let lower = if i == 0 {
                0
            } else {
                (block * i).saturating_sub(margin)
            };
            let upper = if i == workers - 1 {
                total
            } else {
                (block * (i + 1) + margin).min(total)
            };
            Partition { lower, upper }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn threshold(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_offset_index() {
        let corpus = Corpus::from_lines(["abc", "", "defg", "h"]);
        let index = OffsetIndex::build(&corpus);
        assert_eq!(index.len(), 4);
        assert_eq!(index.total(), 8);
        assert_eq!(index.line_start(0), 0);
        assert_eq!(index.line_start(2), 3);
        assert_eq!(index.line_end(2), 7);

        assert_eq!(index.line_of(0), 0);
        assert_eq!(index.line_of(2), 0);
        // Offset 3 starts line 2; the empty line 1 is skipped
        assert_eq!(index.line_of(3), 2);
        assert_eq!(index.line_of(7), 3);
        assert_eq!(index.line_of(8), 4);
    }

    #[test]
    fn test_work_units_round_to_nearest() {
        let million = threshold(1_000_000);
        assert_eq!(work_units(0, million), 0);
        assert_eq!(work_units(499_999, million), 0);
        assert_eq!(work_units(500_000, million), 1);
        assert_eq!(work_units(1_499_999, million), 1);
        assert_eq!(work_units(1_500_000, million), 2);
        assert_eq!(work_units(2_400_000, million), 2);
        assert_eq!(work_units(2_500_000, million), 3);

        assert_eq!(work_units(4, threshold(3)), 1);
        assert_eq!(work_units(5, threshold(3)), 2);
        assert_eq!(work_units(7, threshold(1)), 7);
    }

    #[test]
    fn test_split_adds_margins_at_interior_seams() {
        let partitions = split(100, 4, 3);
        assert_eq!(
            partitions,
            vec![
                Partition { lower: 0, upper: 28 },
                Partition { lower: 22, upper: 53 },
                Partition { lower: 47, upper: 78 },
                Partition { lower: 72, upper: 100 },
            ]
        );
    }

    #[test]
    fn test_split_single_worker_covers_everything() {
        assert_eq!(split(42, 1, 5), vec![Partition { lower: 0, upper: 42 }]);
    }

    #[test]
    fn test_split_clamps_tiny_blocks() {
        let partitions = split(5, 4, 3);
        assert_eq!(partitions[1], Partition { lower: 0, upper: 5 });
        assert!(partitions.iter().all(|p| p.lower <= p.upper && p.upper <= 5));
    }

    #[test]
    fn test_plan_below_threshold_is_sequential() {
        let config = SearchConfig::default();
        assert_eq!(
            ExecutionPlan::for_corpus(1_499_999, 3, &config),
            ExecutionPlan::Sequential
        );
    }

    #[test]
    fn test_plan_clamps_workers_to_units() {
        let config = SearchConfig {
            thread_count: NonZeroUsize::new(16),
            ..SearchConfig::default()
        };
        match ExecutionPlan::for_corpus(3_000_000, 3, &config) {
            ExecutionPlan::Parallel(partitions) => assert_eq!(partitions.len(), 3),
            plan => panic!("expected a parallel plan, got {:?}", plan),
        }

        let unclamped = SearchConfig {
            clamp_workers: false,
            ..config
        };
        match ExecutionPlan::for_corpus(3_000_000, 3, &unclamped) {
            ExecutionPlan::Parallel(partitions) => assert_eq!(partitions.len(), 16),
            plan => panic!("expected a parallel plan, got {:?}", plan),
        }
    }

    #[test]
    fn test_plan_respects_worker_limit() {
        let config = SearchConfig {
            thread_count: NonZeroUsize::new(2),
            ..SearchConfig::default()
        };
        let plan = ExecutionPlan::for_corpus(10_000_000, 4, &config);
        assert_eq!(
            plan,
            ExecutionPlan::Parallel(vec![
                Partition {
                    lower: 0,
                    upper: 5_000_004
                },
                Partition {
                    lower: 4_999_996,
                    upper: 10_000_000
                },
            ])
        );
    }
}
