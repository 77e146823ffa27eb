use crate::config::DEFAULT_WILDCARD;

/// One position of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    /// Matches exactly this character
    Literal(char),
    /// Matches exactly one arbitrary character
    Any,
}

impl Symbol {
    #[inline]
    fn accepts(self, c: char) -> bool {
        match self {
            Symbol::Literal(expected) => expected == c,
            Symbol::Any => true,
        }
    }
}

/// A wildcard pattern: literal characters plus single-character wildcards.
///
/// The pattern length is the length of every match it reports and the
/// shortest line it can match in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    symbols: Vec<Symbol>,
}

/// Whether the scan may report a match that overlaps the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Overlap {
    /// Resume right after a reported match (greedy leftmost)
    Reject,
    /// Resume one past the start of a reported match
    Allow,
}

/// Outcome of feeding one character to a [`Scanner`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// The candidate still matches and needs more characters
    Scanning,
    /// The candidate starting at the given column is complete
    Matched(usize),
    /// The candidate failed; scanning restarts at the next start column
    Mismatched,
}

/// Two-cursor attempt-and-restart state machine.
///
/// `backup` is the start of the current candidate and `pos` the next character
/// to examine; `pos - backup` pattern symbols have matched so far.
struct Scanner<'p> {
    symbols: &'p [Symbol],
    overlap: Overlap,
    backup: usize,
    pos: usize,
}

impl<'p> Scanner<'p> {
    fn new(symbols: &'p [Symbol], origin: usize, overlap: Overlap) -> Self {
        Self {
            symbols,
            overlap,
            backup: origin,
            pos: origin,
        }
    }

    /// Whether a candidate at `backup` still fits before `end`
    #[inline]
    fn can_complete(&self, end: usize) -> bool {
        self.backup + self.symbols.len() <= end
    }

    #[inline]
    fn step(&mut self, c: char) -> Step {
        let matched = self.pos - self.backup;
        if !self.symbols[matched].accepts(c) {
            self.backup += 1;
            self.pos = self.backup;
            return Step::Mismatched;
        }

        if matched + 1 < self.symbols.len() {
            self.pos += 1;
            return Step::Scanning;
        }

        let start = self.backup;
        self.backup = match self.overlap {
            Overlap::Reject => self.pos + 1,
            Overlap::Allow => start + 1,
        };
        self.pos = self.backup;
        Step::Matched(start)
    }
}

impl Pattern {
    /// Parses `text` using the default `?` wildcard
    pub fn new(text: &str) -> Self {
        Self::with_wildcard(text, DEFAULT_WILDCARD)
    }

    /// Parses `text`, treating every `wildcard` character as [`Symbol::Any`]
    pub fn with_wildcard(text: &str, wildcard: char) -> Self {
        let symbols = text
            .chars()
            .map(|c| {
                if c == wildcard {
                    Symbol::Any
                } else {
                    Symbol::Literal(c)
                }
            })
            .collect();
        Self { symbols }
    }

    /// Pattern length in characters
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Start columns of all non-overlapping, leftmost-greedy matches in `line`
    pub fn find_in_line(&self, line: &[char]) -> Vec<usize> {
        let mut starts = Vec::new();
        self.scan_window(line, 0, line.len(), Overlap::Reject, |start| {
            starts.push(start)
        });
        starts
    }

    /// Scans `line[from..to]`, reporting the start column of each match.
    ///
    /// Every reported match lies entirely inside the window.
    pub(crate) fn scan_window(
        &self,
        line: &[char],
        from: usize,
        to: usize,
        overlap: Overlap,
        mut emit: impl FnMut(usize),
    ) {
        if self.is_empty() || to > line.len() || to.saturating_sub(from) < self.len() {
            return;
        }

        let mut scanner = Scanner::new(&self.symbols, from, overlap);
        while scanner.can_complete(to) {
            match scanner.step(line[scanner.pos]) {
                Step::Matched(start) => emit(start),
                Step::Scanning | Step::Mismatched => {}
            }
        }
    }
}
