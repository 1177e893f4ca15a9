//! Data models for scraped listings and tracked books.

use crate::amazon::selectors::text;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A book by a tracked author, as scraped or as persisted.
///
/// The serialized keys follow the existing author files, so files written by
/// earlier versions of the tracker load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Tracked author the book was found for
    #[serde(alias = "producer")]
    pub author: String,
    /// Book title, unique within one author's known books
    pub title: String,
    /// Series name, empty when the book is standalone
    #[serde(default)]
    pub series: String,
    /// Position in the series ("2 of 5"), empty when standalone
    #[serde(rename = "bookInSeries", alias = "seriesPosition", default)]
    pub series_position: String,
    /// Cover image URL without the rendering segment
    #[serde(default)]
    pub cover_url: String,
    /// "Available instantly", a date like "March 4, 2025", or empty
    #[serde(default)]
    pub release_date: String,
    /// Day the book was last found new or changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<NaiveDate>,
}

impl Book {
    /// Creates a freshly scraped book with no series, cover or update date.
    pub fn new(
        author: impl Into<String>,
        title: impl Into<String>,
        release_date: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            title: title.into(),
            series: String::new(),
            series_position: String::new(),
            cover_url: String::new(),
            release_date: release_date.into(),
            last_update: None,
        }
    }

    /// Returns true if both describe the same listing, ignoring `last_update`.
    pub fn same_listing(&self, other: &Book) -> bool {
        self.author == other.author
            && self.title == other.title
            && self.series == other.series
            && self.series_position == other.series_position
            && self.cover_url == other.cover_url
            && self.release_date == other.release_date
    }

    /// Copies the fields of `other` into this book.
    ///
    /// A missing `last_update` on `other` keeps the current one.
    pub fn update_from(&mut self, other: &Book) {
        self.author.clone_from(&other.author);
        self.title.clone_from(&other.title);
        self.series.clone_from(&other.series);
        self.series_position.clone_from(&other.series_position);
        self.cover_url.clone_from(&other.cover_url);
        self.release_date.clone_from(&other.release_date);
        if other.last_update.is_some() {
            self.last_update = other.last_update;
        }
    }

    /// One notification/log line: "<title> - <release date>".
    pub fn summary_line(&self) -> String {
        format!("{} - {}", self.title, self.release_date)
    }
}

/// Raw content of one search result, before filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Non-blank text nodes of the metadata block, in document order
    pub text_nodes: Vec<String>,
    /// `src` of the cover image from the paired image block
    pub cover_src: Option<String>,
}

impl Listing {
    /// Creates a listing from its text nodes and optional cover source.
    pub fn new(text_nodes: Vec<String>, cover_src: Option<String>) -> Self {
        Self { text_nodes, cover_src }
    }

    /// First text node of the block, which Amazon renders as the title.
    pub fn title(&self) -> Option<&str> {
        self.text_nodes.first().map(String::as_str)
    }

    /// Returns true if any text node contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.text_nodes.iter().any(|node| node.contains(needle))
    }

    /// Release info: the instant marker if present, else the first date.
    pub fn release_date(&self) -> Option<String> {
        if self.contains(text::AVAILABLE_INSTANTLY) {
            return Some(text::AVAILABLE_INSTANTLY.to_string());
        }

        self.text_nodes
            .iter()
            .find_map(|node| text::RELEASE_DATE.find(node))
            .map(|m| m.as_str().to_string())
    }

    /// Series position and name from a "Book N of M: Series" node.
    pub fn series(&self) -> Option<(String, String)> {
        self.text_nodes.iter().find_map(|node| {
            text::SERIES
                .captures(node)
                .map(|caps| (caps[1].to_string(), caps[2].trim().to_string()))
        })
    }

    /// Cover URL with the rendering segment removed.
    pub fn cover_url(&self) -> String {
        self.cover_src.as_deref().map(strip_rendering_segment).unwrap_or_default()
    }
}

/// Removes the `W/<variant>/.../images/` rendering segment from a cover URL,
/// whatever the variant.
///
/// `https://m.media-amazon.com/images/W/IMAGERENDERING_521856-T1/images/I/71x.jpg`
/// becomes `https://m.media-amazon.com/images/I/71x.jpg`.
pub fn strip_rendering_segment(src: &str) -> String {
    const IMAGES: &str = "images/";

    // Keep the slash in front of `W/`
    let Some(start) = src.find(text::IMAGE_CACHE_PREFIX).map(|pos| pos + 1) else {
        return src.to_string();
    };

    match src[start..].rfind(IMAGES) {
        Some(offset) => {
            let end = start + offset + IMAGES.len();
            format!("{}{}", &src[..start], &src[end..])
        }
        None => src.to_string(),
    }
}
