pub mod config;
pub mod corpus;
pub mod errors;
pub mod metrics;
pub mod results;
pub mod search;

pub use config::{EncodingMode, SearchConfig};
pub use corpus::Corpus;
pub use errors::{SearchError, SearchResult};
pub use metrics::{SearchMode, SearchStats};
pub use results::{Match, MatchRecord};
pub use search::{Pattern, WildcardSearch};
