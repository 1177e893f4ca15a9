//! CSS selectors and text patterns for Amazon HTML parsing.
//!
//! This file contains everything the parser matches against in Amazon pages.
//! Update this file when Amazon changes their HTML structure.
//!
//! **Update process**: When parsing fails, capture HTML sample,
//! update selectors, and add test fixture.

use regex_lite::Regex;
use scraper::Selector;
use std::sync::LazyLock;

/// Selectors for Kindle search results pages.
///
/// Each result is split over two sibling columns: the left one holds the
/// cover, the right one the title, contributors, format and release info.
/// The n-th metadata block belongs to the n-th image block.
pub mod search {
    use super::*;

    /// Right-hand column with the textual metadata of one result.
    pub static BOOK_BLOCK: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "div.sg-col.sg-col-4-of-12.sg-col-8-of-16.sg-col-12-of-20.sg-col-12-of-24.s-list-col-right",
        )
        .unwrap()
    });

    /// Left-hand column holding the cover of one result.
    pub static IMAGE_BLOCK: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "div.sg-col.sg-col-4-of-12.sg-col-4-of-16.sg-col-4-of-20.sg-col-4-of-24.s-list-col-left",
        )
        .unwrap()
    });

    /// Cover image inside an image block.
    pub static COVER: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("img.s-image").unwrap());

    /// Any image with a source, used when the cover lacks its usual class.
    pub static ANY_IMAGE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("img[src]").unwrap());
}

/// Selectors for detecting error/captcha pages.
pub mod errors {
    use super::*;

    /// CAPTCHA form.
    pub static CAPTCHA: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "form[action*='validateCaptcha'], \
             img[src*='captcha']",
        )
        .unwrap()
    });
}

/// Literal markers and patterns matched against the text of a result block.
pub mod text {
    use super::*;

    /// Release marker for books that can be read right now.
    pub const AVAILABLE_INSTANTLY: &str = "Available instantly";

    /// Format marker of audiobook editions.
    pub const AUDIOBOOK: &str = "Audible Audiobook";

    /// Body text of the page served to clients Amazon considers bots.
    pub const AUTOMATED_ACCESS: &str = "To discuss automated access to Amazon data please contact api-services-support@amazon.com.";

    /// Path prefix of the cache segment selecting a rendering variant of a
    /// cover, e.g. `/W/IMAGERENDERING_521856-T1/` or `/W/WEBP_402378-T2/`.
    pub const IMAGE_CACHE_PREFIX: &str = "/W/";

    /// Long-form release date, e.g. "March 4, 2025".
    pub static RELEASE_DATE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"\b(January|February|March|April|May|June|July|August|September|October|November|December) +\d{1,2}, +\d{4}\b",
        )
        .unwrap()
    });

    /// Series line, e.g. "Book 2 of 3: The Farseer Trilogy".
    pub static SERIES: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"Book (\d{1,3} of \d{1,3}): (.+)").unwrap());
}
