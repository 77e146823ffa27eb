/// Partition-and-merge wildcard matching.
///
/// A search runs in one of two modes:
///
/// 1. **Sequential**: every line is scanned on the calling thread with the
///    greedy leftmost matcher in [`matcher`].
/// 2. **Parallel**: the corpus is viewed as one run of global character
///    offsets, split into ranges that overlap by the pattern length
///    ([`partition`]). Each range is scanned by its own worker ([`worker`])
///    on a dedicated rayon pool, and the per-worker lists are merged in range
///    order ([`merge`]) into exactly the sequential result.
///
/// The parallel mode only kicks in when the corpus rounds to more than one
/// work unit (1,000,000 characters by default):
/// ```rust,ignore
/// let corpus = Corpus::load(path, EncodingMode::FailFast)?;
/// let mut search = WildcardSearch::new(&corpus, "God? s??d");
/// search.search();
/// print!("{}", search);
/// ```
pub mod engine;
pub mod matcher;
pub(crate) mod merge;
pub mod partition;
pub(crate) mod worker;

pub use engine::WildcardSearch;
pub use matcher::{Pattern, Symbol};
pub use partition::{ExecutionPlan, OffsetIndex, Partition};
