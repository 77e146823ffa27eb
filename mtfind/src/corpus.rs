use memmap2::Mmap;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, trace, warn};

use crate::config::EncodingMode;
use crate::errors::{SearchError, SearchResult};

const BUFFER_CAPACITY: usize = 65536;
pub(crate) const LARGE_FILE_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB

/// Immutable, ordered sequence of text lines.
///
/// Lines are stored as decoded `char`s so that columns and pattern lengths are
/// counted in characters and a match never splits a multi-byte sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    lines: Vec<Box<[char]>>,
}

impl Corpus {
    /// Builds a corpus with one entry per item
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            lines: lines
                .into_iter()
                .map(|line| line.as_ref().chars().collect())
                .collect(),
        }
    }

    /// Splits `text` into lines the way `str::lines` does
    pub fn from_text(text: &str) -> Self {
        Self::from_lines(text.lines())
    }

    /// Reads a corpus from disk.
    ///
    /// Files at or above 10MB are memory mapped instead of being read into a buffer.
    pub fn load(path: &Path, encoding_mode: EncodingMode) -> SearchResult<Self> {
        let file = File::open(path).map_err(|e| SearchError::from_io(e, path))?;
        let size = file
            .metadata()
            .map_err(|e| SearchError::from_io(e, path))?
            .len();

        let corpus = if size >= LARGE_FILE_THRESHOLD {
            trace!("Memory mapping {} ({} bytes)", path.display(), size);
            // SAFETY: the mapping is only read while decoding below and dropped right after.
            let mmap = unsafe { Mmap::map(&file) }.map_err(SearchError::IoError)?;
            Self::from_text(&decode_bytes(&mmap, path, encoding_mode)?)
        } else {
            trace!("Buffered read of {} ({} bytes)", path.display(), size);
            let mut reader = BufReader::with_capacity(BUFFER_CAPACITY, file);
            let mut bytes = Vec::with_capacity(size as usize);
            reader.read_to_end(&mut bytes)?;
            Self::from_text(&decode_bytes(&bytes, path, encoding_mode)?)
        };

        debug!(
            "Loaded {} lines ({} characters) from {}",
            corpus.len(),
            corpus.total_chars(),
            path.display()
        );
        Ok(corpus)
    }

    /// Number of lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Characters of line `index`
    pub fn line(&self, index: usize) -> &[char] {
        &self.lines[index]
    }

    pub fn lines(&self) -> impl ExactSizeIterator<Item = &[char]> + '_ {
        self.lines.iter().map(|line| &line[..])
    }

    /// Sum of all line lengths, in characters
    pub fn total_chars(&self) -> usize {
        self.lines.iter().map(|line| line.len()).sum()
    }

    /// The `len` characters of line `line` starting at `column`, clipped to the line end
    pub fn excerpt(&self, line: usize, column: usize, len: usize) -> String {
        let chars = self.line(line);
        let start = column.min(chars.len());
        let end = column.saturating_add(len).min(chars.len());
        chars[start..end].iter().collect()
    }
}

fn decode_bytes<'b>(
    bytes: &'b [u8],
    path: &Path,
    encoding_mode: EncodingMode,
) -> SearchResult<Cow<'b, str>> {
    match encoding_mode {
        EncodingMode::FailFast => std::str::from_utf8(bytes)
            .map(Cow::Borrowed)
            .map_err(|e| SearchError::encoding_error(path, e)),
        EncodingMode::Lossy => {
            let text = String::from_utf8_lossy(bytes);
            if let Cow::Owned(_) = text {
                warn!("Invalid UTF-8 replaced in file: {}", path.display());
            }
            Ok(text)
        }
    }
}
