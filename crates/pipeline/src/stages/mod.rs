//! The standard pipeline stages.

mod backoff;
mod drain;
mod enrich;
mod filter;
mod sanitize;
mod sink;
mod useragent;

pub use backoff::BackoffGuard;
pub use drain::OfflineDrain;
pub use enrich::{DependencyScanner, LanguageDetector, ProjectDetector};
pub use filter::{FileExistenceFilter, PatternFilter};
pub use sanitize::Sanitizer;
pub use sink::ApiSink;
pub use useragent::UserAgentStamp;
