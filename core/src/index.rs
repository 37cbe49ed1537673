//! Navigational indices derived from the corpus: by chapter, by division, by page

use crate::corpus::{Corpus, RevelationPlace, DIVISION_COUNT, TOTAL_PAGES};
use crate::display::{division_label, division_range_label};
use crate::resolver::{locate, PageRange};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterIndexEntry {
    pub id: u32,
    pub name: String,
    pub alt_name: String,
    pub revelation_place: RevelationPlace,
    pub verse_count: usize,
    pub start_page: u32,
    pub end_page: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivisionIndexEntry {
    pub id: u8,
    pub name: String,
    pub start_page: u32,
    pub end_page: u32,
    pub page_range: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub page: u32,
    /// Names of chapters with verses on this page, in corpus order
    pub chapters: Vec<String>,
    pub division: Option<u8>,
}

impl PageRange for ChapterIndexEntry {
    fn start_page(&self) -> u32 {
        self.start_page
    }
    fn end_page(&self) -> u32 {
        self.end_page
    }
}

impl PageRange for DivisionIndexEntry {
    fn start_page(&self) -> u32 {
        self.start_page
    }
    fn end_page(&self) -> u32 {
        self.end_page
    }
}

/// Immutable snapshot of all three indices.
///
/// Rebuilt wholesale when the corpus changes, never mutated.
#[derive(Debug, Clone)]
pub struct Indices {
    chapters: Vec<ChapterIndexEntry>,
    divisions: Vec<DivisionIndexEntry>,
    pages: Vec<PageRecord>,
    chapters_sorted: bool,
    divisions_sorted: bool,
}

impl Indices {
    /// Build all indices in a single pass over the corpus verses.
    pub fn build(corpus: &Corpus) -> Self {
        let chapters: Vec<ChapterIndexEntry> = corpus
            .chapters()
            .iter()
            .map(|c| ChapterIndexEntry {
                id: c.id,
                name: c.name.clone(),
                alt_name: c.alt_name.clone(),
                revelation_place: c.revelation_place,
                verse_count: c.verses.len(),
                start_page: c.start_page,
                end_page: c.end_page,
            })
            .collect();

        // Slot 0 unused so division and page ids index directly
        let mut division_bounds: Vec<Option<(u32, u32)>> = vec![None; DIVISION_COUNT as usize + 1];
        let mut page_chapters: Vec<Vec<u32>> = vec![Vec::new(); TOTAL_PAGES as usize + 1];

        for (chapter, verse) in corpus.verses() {
            let bounds = division_bounds[verse.division as usize].get_or_insert((verse.page, verse.page));
            bounds.1 = verse.page;

            let on_page = &mut page_chapters[verse.page as usize];
            if !on_page.contains(&chapter.id) {
                on_page.push(chapter.id);
            }
        }

        let divisions: Vec<DivisionIndexEntry> = division_bounds
            .iter()
            .enumerate()
            .filter_map(|(id, bounds)| {
                let (start_page, end_page) = (*bounds)?;
                Some(DivisionIndexEntry {
                    id: id as u8,
                    name: division_label(id as u8),
                    start_page,
                    end_page,
                    page_range: division_range_label(start_page, end_page),
                })
            })
            .collect();

        if divisions.len() < DIVISION_COUNT as usize {
            tracing::warn!(found = divisions.len(), "corpus does not cover every division");
        }

        let divisions_sorted = is_monotone(&divisions);
        let names: HashMap<u32, &str> = chapters.iter().map(|c| (c.id, c.name.as_str())).collect();

        let pages = (1..=TOTAL_PAGES)
            .map(|page| PageRecord {
                page,
                chapters: page_chapters[page as usize]
                    .iter()
                    .filter_map(|id| names.get(id).map(|name| name.to_string()))
                    .collect(),
                division: locate(&divisions, divisions_sorted, page).map(|d| d.id),
            })
            .collect();

        Self {
            chapters_sorted: is_monotone(&chapters),
            chapters,
            divisions,
            pages,
            divisions_sorted,
        }
    }

    pub fn chapters(&self) -> &[ChapterIndexEntry] {
        &self.chapters
    }

    pub fn divisions(&self) -> &[DivisionIndexEntry] {
        &self.divisions
    }

    pub fn pages(&self) -> &[PageRecord] {
        &self.pages
    }

    pub fn page(&self, page: u32) -> Option<&PageRecord> {
        page.checked_sub(1).and_then(|idx| self.pages.get(idx as usize))
    }

    pub fn chapter_for_page(&self, page: u32) -> Option<&ChapterIndexEntry> {
        locate(&self.chapters, self.chapters_sorted, page)
    }

    pub fn division_for_page(&self, page: u32) -> Option<&DivisionIndexEntry> {
        locate(&self.divisions, self.divisions_sorted, page)
    }
}

/// True when both start and end pages are non-decreasing across entries
fn is_monotone<T: PageRange>(entries: &[T]) -> bool {
    entries.windows(2).all(|w| {
        w[0].start_page() <= w[1].start_page() && w[0].end_page() <= w[1].end_page()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::tests::sample_corpus;

    #[test]
    fn test_chapter_index() {
        let indices = Indices::build(&sample_corpus());
        let chapters = indices.chapters();
        assert_eq!(chapters.len(), 3);
        assert_eq!((chapters[0].start_page, chapters[0].end_page), (1, 1));
        assert_eq!((chapters[1].start_page, chapters[1].end_page), (2, 3));
        assert_eq!(chapters[1].verse_count, 3);
    }

    #[test]
    fn test_division_index() {
        let indices = Indices::build(&sample_corpus());
        let divisions = indices.divisions();
        assert_eq!(divisions.len(), 2);
        assert_eq!((divisions[0].start_page, divisions[0].end_page), (1, 2));
        assert_eq!((divisions[1].start_page, divisions[1].end_page), (3, 3));
        assert_eq!(divisions[1].name, "الجزء ٢");
        assert_eq!(divisions[0].page_range, "من الصفحة 1 إلى 2");
    }

    #[test]
    fn test_page_index_shared_page() {
        let indices = Indices::build(&sample_corpus());
        assert_eq!(indices.pages().len(), TOTAL_PAGES as usize);

        let page3 = indices.page(3).unwrap();
        assert_eq!(page3.chapters, vec!["البقرة".to_string(), "آل عمران".to_string()]);
        assert_eq!(page3.division, Some(2));

        let page1 = indices.page(1).unwrap();
        assert_eq!(page1.chapters, vec!["الفاتحة".to_string()]);
        assert_eq!(page1.division, Some(1));
    }

    #[test]
    fn test_page_index_uncovered_page() {
        let indices = Indices::build(&sample_corpus());
        let page = indices.page(400).unwrap();
        assert!(page.chapters.is_empty());
        assert_eq!(page.division, None);
        assert!(indices.page(0).is_none());
        assert!(indices.page(605).is_none());
    }

    #[test]
    fn test_boundary_page_resolves_to_first_chapter() {
        let indices = Indices::build(&sample_corpus());
        assert_eq!(indices.chapter_for_page(3).unwrap().id, 2);
    }
}
