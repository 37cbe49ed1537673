//! Corpus model: chapters, verses and their page/division annotations

use crate::error::DataLoadError;
use crate::fetch::{fetch_with, CorpusSource};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Number of pages in the Madani mushaf layout
pub const TOTAL_PAGES: u32 = 604;

/// Number of juz divisions
pub const DIVISION_COUNT: u8 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevelationPlace {
    Meccan,
    Medinan,
}

impl RevelationPlace {
    /// Accepts both the English classification and the transliterated city names.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "meccan" | "makkah" | "makki" | "mecca" => Some(RevelationPlace::Meccan),
            "medinan" | "madinah" | "madani" | "medina" => Some(RevelationPlace::Medinan),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    /// 1-based position within the owning chapter
    pub position: u32,
    pub text: String,
    pub page: u32,
    pub division: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub id: u32,
    pub name: String,
    pub alt_name: String,
    pub revelation_place: RevelationPlace,
    /// Page of the first verse
    pub start_page: u32,
    /// Page of the last verse
    pub end_page: u32,
    pub verses: Vec<Verse>,
}

/// The loaded text, immutable after construction.
///
/// Chapters are held in id order and verses in recitation order; every
/// chapter has at least one verse.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    chapters: Vec<Chapter>,
    skipped_verses: usize,
}

// === Source document ===
//
// Accepts `{ chapters: [...] }` and the alquran.cloud layout
// `{ data: { surahs: [{ number, englishName, revelationType, ayahs: [...] }] } }`.

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(alias = "surahs")]
    chapters: Vec<RawChapter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChapter {
    #[serde(alias = "number")]
    id: Option<u32>,
    name: Option<String>,
    #[serde(alias = "englishName")]
    alt_name: Option<String>,
    #[serde(alias = "revelationType")]
    revelation_place: Option<String>,
    #[serde(alias = "ayahs", default)]
    verses: Vec<RawVerse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVerse {
    #[serde(alias = "numberInSurah")]
    position_in_chapter: Option<u32>,
    text: Option<String>,
    page: Option<u32>,
    #[serde(alias = "juz")]
    division: Option<u32>,
}

impl Corpus {
    /// Parse a corpus document.
    ///
    /// Chapter-level problems (missing id or name, duplicate ids) fail the
    /// whole load. A revelation place other than Meccan reads as Medinan. Verse records with a missing or
    /// out-of-range page or division are skipped and counted.
    pub fn from_json(bytes: &[u8]) -> Result<Self, DataLoadError> {
        let mut value: serde_json::Value = serde_json::from_slice(bytes)?;

        let envelope = value.get_mut("data").map(serde_json::Value::take);
        if let Some(data) = envelope {
            value = data;
        }

        let document: RawDocument = serde_json::from_value(value)?;
        Self::from_raw(document)
    }

    /// Fetch and parse the corpus; nothing is returned unless both succeed.
    ///
    /// A downloaded document only refreshes the cached copy once it parses.
    pub async fn load(source: &CorpusSource, expected_sha256: Option<&str>) -> Result<Self, DataLoadError> {
        fetch_with(source, expected_sha256, Self::from_json).await
    }

    fn from_raw(document: RawDocument) -> Result<Self, DataLoadError> {
        let mut chapters = Vec::with_capacity(document.chapters.len());
        let mut seen_ids = HashSet::new();
        let mut skipped_verses = 0;

        for (ordinal, raw) in document.chapters.into_iter().enumerate() {
            let id = raw.id.filter(|id| *id > 0).ok_or_else(|| {
                DataLoadError::Malformed(format!("chapter #{} has no id", ordinal + 1))
            })?;
            let name = raw
                .name
                .filter(|n| !n.trim().is_empty())
                .ok_or_else(|| DataLoadError::Malformed(format!("chapter {} has no name", id)))?;
            let revelation_place = match raw.revelation_place.as_deref() {
                Some(value) => RevelationPlace::parse(value).unwrap_or_else(|| {
                    tracing::warn!(chapter = id, value, "unknown revelation place, reading as Medinan");
                    RevelationPlace::Medinan
                }),
                None => RevelationPlace::Medinan,
            };

            if !seen_ids.insert(id) {
                return Err(DataLoadError::Malformed(format!("duplicate chapter id {}", id)));
            }

            let mut verses = Vec::with_capacity(raw.verses.len());
            for (idx, raw_verse) in raw.verses.into_iter().enumerate() {
                match Self::verse_from_raw(raw_verse, idx) {
                    Some(verse) => verses.push(verse),
                    None => {
                        tracing::warn!(chapter = id, record = idx + 1, "skipping malformed verse record");
                        skipped_verses += 1;
                    }
                }
            }

            let (Some(first), Some(last)) = (verses.first(), verses.last()) else {
                tracing::warn!(chapter = id, "dropping chapter with no usable verses");
                continue;
            };
            let (start_page, end_page) = (first.page, last.page);

            chapters.push(Chapter {
                id,
                name: name.trim().to_string(),
                alt_name: raw.alt_name.unwrap_or_default(),
                revelation_place,
                start_page,
                end_page,
                verses,
            });
        }

        if chapters.is_empty() {
            return Err(DataLoadError::Empty);
        }

        chapters.sort_by_key(|c| c.id);

        if skipped_verses > 0 {
            tracing::warn!(skipped_verses, "corpus loaded with skipped verse records");
        }

        Ok(Self { chapters, skipped_verses })
    }

    /// Returns `None` when a required annotation is missing or out of range.
    fn verse_from_raw(raw: RawVerse, idx: usize) -> Option<Verse> {
        let page = raw.page.filter(|p| (1..=TOTAL_PAGES).contains(p))?;
        let division = raw
            .division
            .filter(|d| (1..=DIVISION_COUNT as u32).contains(d))? as u8;
        let text = raw.text?;
        let position = raw.position_in_chapter.unwrap_or(idx as u32 + 1);

        Some(Verse { position, text, page, division })
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter(&self, id: u32) -> Option<&Chapter> {
        self.chapters
            .binary_search_by_key(&id, |c| c.id)
            .ok()
            .map(|idx| &self.chapters[idx])
    }

    /// All verses in canonical order, paired with their chapter
    pub fn verses(&self) -> impl Iterator<Item = (&Chapter, &Verse)> {
        self.chapters
            .iter()
            .flat_map(|chapter| chapter.verses.iter().map(move |verse| (chapter, verse)))
    }

    pub fn verse_count(&self) -> usize {
        self.chapters.iter().map(|c| c.verses.len()).sum()
    }

    /// Number of verse records dropped by the malformed-record policy
    pub fn skipped_verses(&self) -> usize {
        self.skipped_verses
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// A small three-chapter corpus spanning pages 1..=3 and divisions 1..=2.
    pub(crate) fn sample_document() -> serde_json::Value {
        json!({
            "chapters": [
                {
                    "id": 1, "name": "الفاتحة", "altName": "Al-Faatiha", "revelationPlace": "Meccan",
                    "verses": [
                        { "positionInChapter": 1, "text": "بِسْمِ اللَّهِ الرَّحْمَٰنِ الرَّحِيمِ", "page": 1, "division": 1 },
                        { "positionInChapter": 2, "text": "الْحَمْدُ لِلَّهِ رَبِّ الْعَالَمِينَ", "page": 1, "division": 1 }
                    ]
                },
                {
                    "id": 2, "name": "البقرة", "altName": "Al-Baqara", "revelationPlace": "Medinan",
                    "verses": [
                        { "positionInChapter": 1, "text": "الٓمٓ", "page": 2, "division": 1 },
                        { "positionInChapter": 2, "text": "ذَٰلِكَ الْكِتَابُ لَا رَيْبَ ۛ فِيهِ ۛ هُدًى لِّلْمُتَّقِينَ", "page": 2, "division": 1 },
                        { "positionInChapter": 3, "text": "وَإِذْ قَالَ رَبُّكَ لِلْمَلَائِكَةِ", "page": 3, "division": 2 }
                    ]
                },
                {
                    "id": 3, "name": "آل عمران", "altName": "Aal-i-Imraan", "revelationPlace": "Medinan",
                    "verses": [
                        { "positionInChapter": 1, "text": "الٓمٓ", "page": 3, "division": 2 },
                        { "positionInChapter": 2, "text": "اللَّهُ لَا إِلَٰهَ إِلَّا هُوَ الْحَيُّ الْقَيُّومُ", "page": 3, "division": 2 }
                    ]
                }
            ]
        })
    }

    pub(crate) fn sample_corpus() -> Corpus {
        Corpus::from_json(sample_document().to_string().as_bytes()).unwrap()
    }

    #[test]
    fn test_loads_chapters_in_order() {
        let corpus = sample_corpus();
        let ids: Vec<u32> = corpus.chapters().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(corpus.verse_count(), 7);
        assert_eq!(corpus.skipped_verses(), 0);

        let baqara = corpus.chapter(2).unwrap();
        assert_eq!(baqara.start_page, 2);
        assert_eq!(baqara.end_page, 3);
        assert_eq!(baqara.revelation_place, RevelationPlace::Medinan);
    }

    #[test]
    fn test_accepts_upstream_layout() {
        let doc = json!({
            "code": 200,
            "data": {
                "surahs": [{
                    "number": 108, "name": "الكوثر", "englishName": "Al-Kawthar",
                    "revelationType": "Meccan",
                    "ayahs": [
                        { "number": 6205, "numberInSurah": 1, "text": "إِنَّآ أَعْطَيْنَٰكَ ٱلْكَوْثَرَ", "juz": 30, "page": 602 }
                    ]
                }]
            }
        });
        let corpus = Corpus::from_json(doc.to_string().as_bytes()).unwrap();
        let chapter = corpus.chapter(108).unwrap();
        assert_eq!(chapter.alt_name, "Al-Kawthar");
        assert_eq!(chapter.revelation_place, RevelationPlace::Meccan);
        assert_eq!(chapter.verses[0].division, 30);
        assert_eq!(chapter.verses[0].page, 602);
    }

    #[test]
    fn test_skips_malformed_verses() {
        let doc = json!({
            "chapters": [{
                "id": 1, "name": "الفاتحة", "altName": "", "revelationPlace": "Meccan",
                "verses": [
                    { "positionInChapter": 1, "text": "a", "page": 1, "division": 1 },
                    { "positionInChapter": 2, "text": "b", "division": 1 },
                    { "positionInChapter": 3, "text": "c", "page": 700, "division": 1 },
                    { "positionInChapter": 4, "text": "d", "page": 1, "division": 31 },
                    { "positionInChapter": 5, "text": "e", "page": 1 }
                ]
            }]
        });
        let corpus = Corpus::from_json(doc.to_string().as_bytes()).unwrap();
        assert_eq!(corpus.verse_count(), 1);
        assert_eq!(corpus.skipped_verses(), 4);
    }

    #[test]
    fn test_missing_chapter_name_fails_load() {
        let doc = json!({
            "chapters": [{ "id": 1, "revelationPlace": "Meccan", "verses": [] }]
        });
        let err = Corpus::from_json(doc.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, DataLoadError::Malformed(_)));
    }

    #[test]
    fn test_duplicate_chapter_id_fails_load() {
        let verse = json!({ "positionInChapter": 1, "text": "a", "page": 1, "division": 1 });
        let doc = json!({
            "chapters": [
                { "id": 1, "name": "x", "revelationPlace": "Meccan", "verses": [verse.clone()] },
                { "id": 1, "name": "y", "revelationPlace": "Meccan", "verses": [verse] }
            ]
        });
        let err = Corpus::from_json(doc.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, DataLoadError::Malformed(_)));
    }

    #[test]
    fn test_invalid_json_fails_load() {
        let err = Corpus::from_json(b"{ not json").unwrap_err();
        assert!(matches!(err, DataLoadError::Parse(_)));

        let err = Corpus::from_json(b"{\"chapters\": []}").unwrap_err();
        assert!(matches!(err, DataLoadError::Empty));
    }

    #[test]
    fn test_revelation_place_parse() {
        assert_eq!(RevelationPlace::parse("Meccan"), Some(RevelationPlace::Meccan));
        assert_eq!(RevelationPlace::parse("madinah"), Some(RevelationPlace::Medinan));
        assert_eq!(RevelationPlace::parse("unknown"), None);
    }

    #[test]
    fn test_revelation_place_defaults_to_medinan() {
        let verse = json!({ "positionInChapter": 1, "text": "x", "page": 1, "division": 1 });
        let doc = json!({
            "chapters": [
                { "id": 1, "name": "x", "revelationPlace": "somewhere", "verses": [verse.clone()] },
                { "id": 2, "name": "y", "verses": [verse] }
            ]
        });
        let corpus = Corpus::from_json(doc.to_string().as_bytes()).unwrap();
        assert_eq!(corpus.chapters().len(), 2);
        assert!(corpus
            .chapters()
            .iter()
            .all(|c| c.revelation_place == RevelationPlace::Medinan));
    }

    #[tokio::test]
    async fn test_unparseable_download_keeps_cached_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("quran_data.json");
        let cached = sample_document().to_string();
        std::fs::write(&cache, &cached).unwrap();

        let url = crate::fetch::tests::serve_once(b"<html>maintenance</html>".to_vec()).await;
        let source = CorpusSource::Url { url, cache_path: Some(cache.clone()) };
        let corpus = Corpus::load(&source, None).await.unwrap();

        assert_eq!(corpus.chapters().len(), 3);
        assert_eq!(std::fs::read_to_string(&cache).unwrap(), cached);
    }

    #[tokio::test]
    async fn test_parsed_download_refreshes_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("quran_data.json");
        std::fs::write(&cache, "{}").unwrap();

        let body = sample_document().to_string();
        let url = crate::fetch::tests::serve_once(body.clone().into_bytes()).await;
        let source = CorpusSource::Url { url, cache_path: Some(cache.clone()) };
        Corpus::load(&source, None).await.unwrap();

        assert_eq!(std::fs::read_to_string(&cache).unwrap(), body);
    }
}
