//! Application state management

use crate::bookmarks::{Bookmark, BookmarkStore};
use crate::corpus::Corpus;
use crate::display::{chapter_label, is_valid_page, to_arabic_digits, HeaderInfo, PageAssets};
use crate::error::{DataLoadError, MushafError};
use crate::fetch::CorpusSource;
use crate::index::Indices;
use crate::resolver::PageResolver;
use crate::search::{SearchEngine, SearchOutcome};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Everything derived from one loaded corpus
pub struct Catalog {
    pub corpus: Arc<Corpus>,
    pub indices: Indices,
    pub search: SearchEngine,
}

impl Catalog {
    pub fn build(corpus: Corpus) -> Self {
        let corpus = Arc::new(corpus);
        let indices = Indices::build(&corpus);
        let search = SearchEngine::new(Arc::clone(&corpus));

        tracing::info!(
            chapters = corpus.chapters().len(),
            verses = corpus.verse_count(),
            divisions = indices.divisions().len(),
            "catalog built"
        );

        Self { corpus, indices, search }
    }

    pub fn resolver(&self) -> PageResolver<'_> {
        PageResolver::new(Some(&self.indices))
    }
}

/// Where a page sits in the mushaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLocation {
    pub page: u32,
    pub chapter: Option<String>,
    pub division: Option<u8>,
}

/// Everything the viewer needs to show one page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageView {
    pub page: u32,
    /// Every chapter with verses on the page
    pub chapters: Vec<String>,
    pub division: Option<u8>,
    pub header: HeaderInfo,
    pub assets: PageAssets,
}

/// Application state shared by every request.
///
/// Constructed once at startup; the catalog slot stays empty until the
/// corpus finishes loading and is swapped wholesale on reload.
pub struct ReaderState {
    catalog: RwLock<Option<Arc<Catalog>>>,
    pub bookmarks: BookmarkStore,
}

impl ReaderState {
    pub fn new(bookmarks: BookmarkStore) -> Self {
        Self {
            catalog: RwLock::new(None),
            bookmarks,
        }
    }

    pub fn catalog(&self) -> Option<Arc<Catalog>> {
        match self.catalog.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Helper to get the catalog or return error if not loaded yet
    pub fn require_catalog(&self) -> Result<Arc<Catalog>, MushafError> {
        self.catalog().ok_or_else(|| {
            MushafError::CorpusNotReady("Corpus data has not finished loading".to_string())
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.catalog().is_some()
    }

    pub fn install(&self, catalog: Catalog) {
        let catalog = Arc::new(catalog);
        match self.catalog.write() {
            Ok(mut guard) => *guard = Some(catalog),
            Err(poisoned) => *poisoned.into_inner() = Some(catalog),
        }
    }

    /// Fetch, parse and index the corpus, then swap it in.
    ///
    /// On failure the previous catalog (if any) stays in place and the reader
    /// keeps working with page numbers only.
    pub async fn load(&self, source: &CorpusSource, expected_sha256: Option<&str>) -> Result<(), DataLoadError> {
        match Corpus::load(source, expected_sha256).await {
            Ok(corpus) => {
                self.install(Catalog::build(corpus));
                tracing::info!(source = %source, "corpus loaded");
                Ok(())
            }
            Err(e) => {
                tracing::error!(source = %source, "failed to load corpus: {}", e);
                Err(e)
            }
        }
    }

    pub fn locate(&self, page: u32) -> PageLocation {
        let catalog = self.catalog();
        let resolver = match &catalog {
            Some(catalog) => catalog.resolver(),
            None => PageResolver::bootstrap(),
        };

        PageLocation {
            page,
            chapter: resolver.chapter_for_page(page).map(str::to_string),
            division: resolver.division_for_page(page),
        }
    }

    pub fn header(&self, page: u32) -> HeaderInfo {
        let location = self.locate(page);
        HeaderInfo::new(page, location.chapter.as_deref(), location.division)
    }

    pub fn page_view(&self, page: u32) -> Result<PageView, MushafError> {
        if !is_valid_page(page) {
            return Err(MushafError::InvalidPage(page));
        }

        let location = self.locate(page);
        let chapters = match self.catalog() {
            Some(catalog) => catalog
                .indices
                .page(page)
                .map(|record| record.chapters.clone())
                .unwrap_or_default(),
            None => location.chapter.iter().cloned().collect(),
        };

        Ok(PageView {
            page,
            chapters,
            division: location.division,
            header: HeaderInfo::new(page, location.chapter.as_deref(), location.division),
            assets: PageAssets::for_page(page),
        })
    }

    pub fn search(&self, query: &str, offset: usize, limit: usize) -> Result<SearchOutcome, MushafError> {
        let catalog = self.require_catalog()?;
        Ok(catalog.search.search_paged(query, offset, limit))
    }

    /// Bookmark `page` with its current chapter and division labels
    pub fn bookmark_page(&self, page: u32) -> Result<Bookmark, MushafError> {
        let location = self.locate(page);
        let chapter = location.chapter.as_deref().map(chapter_label);
        let division = location.division.map(|d| to_arabic_digits(d as u32));
        self.bookmarks.save_bookmark(page, chapter.as_deref(), division.as_deref())
    }
}
