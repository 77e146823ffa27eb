use tracing::trace;

use super::matcher::{Overlap, Pattern};
use super::partition::{OffsetIndex, Partition};
use crate::corpus::Corpus;
use crate::results::Match;

/// Scans one partition of the corpus.
///
/// Matches are reported when all of their characters lie inside the partition.
/// A line the partition enters part-way through is scanned with overlapping
/// candidates, since the greedy alignment on that line depends on text the
/// worker never sees; the merge step keeps exactly the sequential picks.
/// Lines seen from their first character are scanned greedily.
pub(crate) fn scan_partition(
    corpus: &Corpus,
    pattern: &Pattern,
    index: &OffsetIndex,
    partition: Partition,
) -> Vec<Match> {
    let mut matches = Vec::new();
    let mut line = index.line_of(partition.lower);

    while line < index.len() {
        let start = index.line_start(line);
        if start >= partition.upper {
            break;
        }

        let from = partition.lower.max(start) - start;
        let to = index.line_end(line).min(partition.upper) - start;
        let overlap = if from > 0 {
            Overlap::Allow
        } else {
            Overlap::Reject
        };

        pattern.scan_window(corpus.line(line), from, to, overlap, |column| {
            matches.push(Match::new(line, column))
        });
        line += 1;
    }

    trace!(
        "Partition [{}, {}) produced {} candidates",
        partition.lower,
        partition.upper,
        matches.len()
    );
    matches
}
