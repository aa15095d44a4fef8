//! Composite research pipelines.
//!
//! Each module chains upstream clients into a multi-stage flow with its own
//! fallbacks and partial-failure policy: error translation, API-doc
//! discovery, structured HTML extraction, changelog analysis, and
//! technology comparison.

pub mod api_docs;
pub mod changelog;
pub mod compare;
pub mod error_translate;
pub mod extract;

pub use api_docs::{ApiDoc, DocDiscoverer};
pub use changelog::{Changelog, ChangelogEngine, Release, UpgradeDifficulty};
pub use compare::{Comparator, ComparisonMatrix, TechCategory};
pub use error_translate::{ErrorParser, Framework, Language, ParsedError};
pub use extract::{ExtractKind, Extractor, ExtractionResult, ListData, TableData};
