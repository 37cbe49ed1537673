//! Page number -> containing chapter / division

use crate::index::Indices;

/// Chapter shown for page 1 while the corpus is still loading
pub const BOOTSTRAP_CHAPTER: &str = "الفاتحة";

/// Division shown for page 1 while the corpus is still loading
pub const BOOTSTRAP_DIVISION: u8 = 1;

/// An index entry covering an inclusive page range
pub trait PageRange {
    fn start_page(&self) -> u32;
    fn end_page(&self) -> u32;

    fn contains_page(&self, page: u32) -> bool {
        self.start_page() <= page && page <= self.end_page()
    }
}

/// First entry whose range contains `page`.
///
/// When `sorted` (start and end pages non-decreasing) the first entry with
/// `end_page >= page` is the only candidate, found by binary search.
/// Otherwise falls back to a linear scan; both agree on sorted input.
pub fn locate<T: PageRange>(entries: &[T], sorted: bool, page: u32) -> Option<&T> {
    if sorted {
        let idx = entries.partition_point(|e| e.end_page() < page);
        entries.get(idx).filter(|e| e.contains_page(page))
    } else {
        entries.iter().find(|e| e.contains_page(page))
    }
}

/// Resolves pages against the loaded indices, or against the bootstrap
/// convention when nothing has loaded yet.
#[derive(Debug, Clone, Copy)]
pub struct PageResolver<'a> {
    indices: Option<&'a Indices>,
}

impl<'a> PageResolver<'a> {
    pub fn new(indices: Option<&'a Indices>) -> Self {
        Self { indices }
    }

    /// Resolver with no corpus behind it
    pub fn bootstrap() -> Self {
        Self { indices: None }
    }

    pub fn is_loaded(&self) -> bool {
        self.indices.is_some()
    }

    pub fn chapter_for_page(&self, page: u32) -> Option<&'a str> {
        match self.indices {
            Some(indices) => indices.chapter_for_page(page).map(|c| c.name.as_str()),
            None if page == 1 => Some(BOOTSTRAP_CHAPTER),
            None => None,
        }
    }

    pub fn division_for_page(&self, page: u32) -> Option<u8> {
        match self.indices {
            Some(indices) => indices.division_for_page(page).map(|d| d.id),
            None if page == 1 => Some(BOOTSTRAP_DIVISION),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::tests::sample_corpus;
    use crate::corpus::{Corpus, TOTAL_PAGES};
    use serde_json::json;

    struct Span(u32, u32);

    impl PageRange for Span {
        fn start_page(&self) -> u32 {
            self.0
        }
        fn end_page(&self) -> u32 {
            self.1
        }
    }

    #[test]
    fn test_locate_sorted_matches_linear() {
        let spans = vec![Span(1, 1), Span(2, 49), Span(49, 76), Span(77, 106), Span(106, 106)];
        for page in 0..=110 {
            let fast = locate(&spans, true, page).map(|s| (s.0, s.1));
            let slow = locate(&spans, false, page).map(|s| (s.0, s.1));
            assert_eq!(fast, slow, "page {}", page);
        }
        assert_eq!(locate(&spans, true, 49).map(|s| s.0), Some(2));
        assert!(locate(&spans, true, 107).is_none());
    }

    #[test]
    fn test_bootstrap_page_one_only() {
        let resolver = PageResolver::bootstrap();
        assert!(!resolver.is_loaded());
        assert_eq!(resolver.chapter_for_page(1), Some(BOOTSTRAP_CHAPTER));
        assert_eq!(resolver.division_for_page(1), Some(1));
        assert_eq!(resolver.chapter_for_page(2), None);
        assert_eq!(resolver.division_for_page(2), None);
    }

    #[test]
    fn test_resolves_loaded_pages() {
        let indices = Indices::build(&sample_corpus());
        let resolver = PageResolver::new(Some(&indices));

        assert_eq!(resolver.chapter_for_page(1), Some("الفاتحة"));
        assert_eq!(resolver.chapter_for_page(2), Some("البقرة"));
        assert_eq!(resolver.division_for_page(3), Some(2));
        assert_eq!(resolver.chapter_for_page(0), None);
        assert_eq!(resolver.chapter_for_page(TOTAL_PAGES + 1), None);
        assert_eq!(resolver.division_for_page(500), None);
    }

    /// One chapter per stretch of pages, covering all 604 pages and 30 divisions.
    fn full_span_corpus() -> Corpus {
        let mut chapters = Vec::new();
        let mut page = 1u32;
        let mut id = 1u32;
        while page <= TOTAL_PAGES {
            let last = (page + 6).min(TOTAL_PAGES);
            let verses: Vec<_> = (page..=last)
                .enumerate()
                .map(|(i, p)| {
                    let division = (((p - 1) / 20) + 1).min(30);
                    json!({ "positionInChapter": i + 1, "text": "نص", "page": p, "division": division })
                })
                .collect();
            chapters.push(json!({
                "id": id, "name": format!("سورة-{}", id), "altName": "", "revelationPlace": "Meccan",
                "verses": verses
            }));
            // overlap the next chapter with this one's last page
            page = if last == TOTAL_PAGES { last + 1 } else { last };
            id += 1;
        }
        let doc = json!({ "chapters": chapters });
        Corpus::from_json(doc.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn test_every_page_resolves_to_containing_chapter() {
        let indices = Indices::build(&full_span_corpus());
        let resolver = PageResolver::new(Some(&indices));

        for page in 1..=TOTAL_PAGES {
            let entry = indices.chapter_for_page(page).expect("chapter for page");
            assert!(entry.start_page <= page && page <= entry.end_page);
            assert!(resolver.chapter_for_page(page).is_some());
        }
    }

    #[test]
    fn test_divisions_are_contiguous_and_exhaustive() {
        let indices = Indices::build(&full_span_corpus());
        let divisions = indices.divisions();
        assert_eq!(divisions.len(), 30);
        assert_eq!(divisions[0].start_page, 1);
        assert_eq!(divisions[29].end_page, TOTAL_PAGES);
        for pair in divisions.windows(2) {
            assert_eq!(pair[0].end_page + 1, pair[1].start_page);
        }
        for page in 1..=TOTAL_PAGES {
            assert!(indices.division_for_page(page).is_some(), "page {} uncovered", page);
        }
    }
}
