//! Mushaf reader core
//!
//! Page indices, page resolution and full-text search over the Quran corpus,
//! plus the application state and bookmark storage used by the front-end.

pub mod error;
pub mod normalize;
pub mod corpus;
pub mod display;
pub mod resolver;
pub mod index;
pub mod search;
pub mod fetch;
pub mod bookmarks;
pub mod config;
pub mod state;

pub use error::{DataLoadError, MushafError};
pub use normalize::normalize;
pub use corpus::{Chapter, Corpus, RevelationPlace, Verse, DIVISION_COUNT, TOTAL_PAGES};
pub use display::{HeaderInfo, PageAssets};
pub use resolver::PageResolver;
pub use index::{ChapterIndexEntry, DivisionIndexEntry, Indices, PageRecord};
pub use search::{SearchEngine, SearchOutcome, SearchResult, SearchResults, MAX_SEARCH_RESULTS, MIN_QUERY_CHARS};
pub use fetch::CorpusSource;
pub use bookmarks::{Bookmark, BookmarkStore, MAX_BOOKMARKS};
pub use config::ReaderConfig;
pub use state::{Catalog, PageLocation, PageView, ReaderState};
