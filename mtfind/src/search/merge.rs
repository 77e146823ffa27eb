use crate::results::Match;

/// Outcome of merging per-worker results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Merged {
    pub matches: Vec<Match>,
    pub candidates: usize,
    pub discarded: usize,
}

/// Concatenates worker results in worker order, dropping every candidate that
/// overlaps the last accepted match on the same line.
///
/// A candidate sorting before the last accepted match is dropped as well: a
/// margin can straddle a line break, so the next worker may report lines the
/// previous one already finished.
pub(crate) fn merge_partitions(parts: Vec<Vec<Match>>, width: usize) -> Merged {
    let candidates = parts.iter().map(Vec::len).sum();
    let mut matches: Vec<Match> = Vec::with_capacity(candidates);

    for candidate in parts.into_iter().flatten() {
        let duplicate = matches
            .last()
            .is_some_and(|last| candidate < *last || last.overlaps(&candidate, width));
        if !duplicate {
            matches.push(candidate);
        }
    }

    Merged {
        discarded: candidates - matches.len(),
        candidates,
        matches,
    }
}
