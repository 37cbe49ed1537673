//! Display strings and asset identifiers handed to the front-end

use crate::corpus::{RevelationPlace, TOTAL_PAGES};
use serde::{Deserialize, Serialize};

/// Placeholder shown when a page has no known chapter or division
pub const MISSING_LABEL: &str = "---";

const ARABIC_DIGITS: [char; 10] = ['٠', '١', '٢', '٣', '٤', '٥', '٦', '٧', '٨', '٩'];

/// Render a number with Eastern Arabic digits: `12` -> `"١٢"`
pub fn to_arabic_digits(n: u32) -> String {
    n.to_string()
        .chars()
        .filter_map(|d| d.to_digit(10).map(|v| ARABIC_DIGITS[v as usize]))
        .collect()
}

pub fn chapter_label(name: &str) -> String {
    format!("سورة {}", name)
}

pub fn division_label(id: u8) -> String {
    format!("الجزء {}", to_arabic_digits(id as u32))
}

pub fn division_range_label(start_page: u32, end_page: u32) -> String {
    format!("من الصفحة {} إلى {}", start_page, end_page)
}

pub fn page_label(page: u32) -> String {
    format!("صفحة {}", page)
}

pub fn revelation_label(place: RevelationPlace) -> &'static str {
    match place {
        RevelationPlace::Meccan => "مكية",
        RevelationPlace::Medinan => "مدنية",
    }
}

pub fn is_valid_page(page: u32) -> bool {
    (1..=TOTAL_PAGES).contains(&page)
}

pub fn clamp_page(page: i64) -> u32 {
    page.clamp(1, TOTAL_PAGES as i64) as u32
}

/// Primary page image; pages are static assets keyed purely by number
pub fn page_image_path(page: u32) -> String {
    format!("images/{}.webp", page)
}

pub fn page_image_fallback_path(page: u32) -> String {
    format!("images/{}.jpg", page)
}

/// Recitation audio for a page, zero-padded to three digits
pub fn audio_resource(page: u32) -> String {
    format!("audio/Page{:03}.mp3", page)
}

/// Header line shown above the page viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderInfo {
    pub chapter: String,
    pub division: String,
    pub page: String,
}

impl HeaderInfo {
    pub fn new(page: u32, chapter: Option<&str>, division: Option<u8>) -> Self {
        Self {
            chapter: chapter.map(chapter_label).unwrap_or_else(|| MISSING_LABEL.to_string()),
            division: division.map(division_label).unwrap_or_else(|| MISSING_LABEL.to_string()),
            page: page_label(page),
        }
    }
}

/// Asset identifiers for a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageAssets {
    pub image: String,
    pub image_fallback: String,
    pub audio: String,
}

impl PageAssets {
    pub fn for_page(page: u32) -> Self {
        Self {
            image: page_image_path(page),
            image_fallback: page_image_fallback_path(page),
            audio: audio_resource(page),
        }
    }
}
