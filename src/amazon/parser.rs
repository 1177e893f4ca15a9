//! HTML parser for Amazon Kindle search results.

use crate::amazon::models::{Book, Listing};
use crate::amazon::selectors::{errors, search, text};
use crate::filters::FilterChain;
use scraper::{ElementRef, Html};
use tracing::{debug, trace, warn};

/// What became of one result block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    /// The block is a relevant book.
    Parsed(Book),
    /// The block was left out, with the reason.
    Skipped(String),
}

/// Parser turning an author's search results page into books.
pub struct Parser {
    author: String,
    filters: FilterChain,
}

impl Parser {
    /// Creates a new parser for the given author.
    pub fn new(author: impl Into<String>) -> Self {
        let author = author.into();
        let filters = FilterChain::for_author(author.clone());
        Self { author, filters }
    }

    /// Parses search results HTML into the books that pass the filters.
    ///
    /// Never fails: blocks that cannot be read are skipped.
    pub fn parse_search(&self, html: &str) -> Vec<Book> {
        let document = Html::parse_document(html);

        if is_blocked(&document) {
            warn!("Search page for {} is a bot-check page, no results parsed", self.author);
            return Vec::new();
        }

        let images: Vec<ElementRef> = document.select(&search::IMAGE_BLOCK).collect();
        let mut books = Vec::new();

        for (index, block) in document.select(&search::BOOK_BLOCK).enumerate() {
            match self.parse_block(block, images.get(index).copied()) {
                BlockOutcome::Parsed(book) => {
                    trace!("Parsed book: {} - {}", book.title, book.release_date);
                    books.push(book);
                }
                BlockOutcome::Skipped(reason) => {
                    trace!("Skipping result {}: {}", index, reason);
                }
            }
        }

        debug!("Parsed {} books for {} from {} result images", books.len(), self.author, images.len());

        books
    }

    /// Parses one metadata block together with its paired image block.
    pub fn parse_block(&self, block: ElementRef, image: Option<ElementRef>) -> BlockOutcome {
        let listing = Listing::new(text_nodes(block), image.and_then(cover_src));

        let Some(title) = listing.title() else {
            return BlockOutcome::Skipped("no title".to_string());
        };

        if let Some(rejected_by) = self.filters.rejection(&listing) {
            return BlockOutcome::Skipped(format!("{} ({})", title, rejected_by));
        }

        let Some(release_date) = listing.release_date() else {
            return BlockOutcome::Skipped(format!("{} (no release date)", title));
        };

        let mut book = Book::new(self.author.as_str(), title, release_date);
        if let Some((position, series)) = listing.series() {
            book.series = series;
            book.series_position = position;
        }
        book.cover_url = listing.cover_url();

        BlockOutcome::Parsed(book)
    }
}

/// Extracts the relevant books by `author` from a search results page.
pub fn extract(author: &str, html: &str) -> Vec<Book> {
    Parser::new(author).parse_search(html)
}

/// Returns true if the page is Amazon's automated-access or CAPTCHA page.
pub fn is_blocked_page(html: &str) -> bool {
    html.contains(text::AUTOMATED_ACCESS) || is_blocked(&Html::parse_document(html))
}

fn is_blocked(document: &Html) -> bool {
    document.select(&errors::CAPTCHA).next().is_some()
        || document.root_element().text().any(|t| t.contains(text::AUTOMATED_ACCESS))
}

/// Non-blank text nodes of an element, trimmed, with no-break spaces normalized.
fn text_nodes(element: ElementRef) -> Vec<String> {
    element
        .text()
        .map(|t| t.replace('\u{a0}', " ").trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// `src` of the cover image in an image block.
fn cover_src(image_block: ElementRef) -> Option<String> {
    image_block
        .select(&search::COVER)
        .next()
        .or_else(|| image_block.select(&search::ANY_IMAGE).next())
        .and_then(|img| img.value().attr("src"))
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOK_CLASS: &str =
        "sg-col sg-col-4-of-12 sg-col-8-of-16 sg-col-12-of-20 sg-col-12-of-24 s-list-col-right";
    const IMAGE_CLASS: &str =
        "sg-col sg-col-4-of-12 sg-col-4-of-16 sg-col-4-of-20 sg-col-4-of-24 s-list-col-left";

    fn image_block(src: &str) -> String {
        format!(
            r#"<div class="{}"><img class="s-image" src="{}" srcset="{} 1x"></div>"#,
            IMAGE_CLASS, src, src
        )
    }

    fn book_block(lines: &[&str]) -> String {
        let spans: String = lines.iter().map(|l| format!("<span>{}</span>", l)).collect();
        format!(r#"<div class="{}"><h2>{}</h2></div>"#, BOOK_CLASS, spans)
    }

    fn result(image: Option<&str>, lines: &[&str]) -> String {
        let image = image.map(image_block).unwrap_or_default();
        format!(r#"<div class="s-result-item">{}{}</div>"#, image, book_block(lines))
    }

    fn page(results: &[String]) -> String {
        format!("<html><body>{}</body></html>", results.concat())
    }

    #[test]
    fn test_parse_instant_result() {
        let html = page(&[result(
            Some("https://m.media-amazon.com/images/I/1.jpg"),
            &["Assassin's Apprentice", "by", "Robin Hobb", "Kindle Edition", "Available instantly"],
        )]);

        let books = extract("Robin Hobb", &html);
        assert_eq!(books.len(), 1);

        let book = &books[0];
        assert_eq!(book.author, "Robin Hobb");
        assert_eq!(book.title, "Assassin's Apprentice");
        assert_eq!(book.release_date, "Available instantly");
        assert_eq!(book.cover_url, "https://m.media-amazon.com/images/I/1.jpg");
        assert!(book.series.is_empty());
        assert!(book.last_update.is_none());
    }

    #[test]
    fn test_parse_series_and_date() {
        let html = page(&[result(
            None,
            &[
                "Golden Fool",
                "Book 2 of 3: The Tawny Man Trilogy",
                "by Robin Hobb",
                "Kindle Edition",
                "January 1, 2030",
            ],
        )]);

        let books = extract("Robin Hobb", &html);
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].series, "The Tawny Man Trilogy");
        assert_eq!(books[0].series_position, "2 of 3");
        assert_eq!(books[0].release_date, "January 1, 2030");
    }

    #[test]
    fn test_cover_rendering_segment_stripped() {
        let html = page(&[result(
            Some("https://m.media-amazon.com/images/W/IMAGERENDERING_521856-T1/images/I/71x._AC_UY218_.jpg"),
            &["Fool's Quest", "by Robin Hobb", "Available instantly"],
        )]);

        let books = extract("Robin Hobb", &html);
        assert_eq!(books[0].cover_url, "https://m.media-amazon.com/images/I/71x._AC_UY218_.jpg");
    }

    #[test]
    fn test_fewer_images_than_books() {
        let html = format!(
            "<html><body>{}{}{}</body></html>",
            image_block("https://m.media-amazon.com/images/I/1.jpg"),
            book_block(&["First", "by Robin Hobb", "Available instantly"]),
            book_block(&["Second", "by Robin Hobb", "March 4, 2027"]),
        );

        let books = extract("Robin Hobb", &html);
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].cover_url, "https://m.media-amazon.com/images/I/1.jpg");
        assert_eq!(books[1].title, "Second");
        assert!(books[1].cover_url.is_empty());
    }

    #[test]
    fn test_image_without_src() {
        let html = format!(
            r#"<html><body><div class="{}"><img class="s-image"></div>{}</body></html>"#,
            IMAGE_CLASS,
            book_block(&["First", "by Robin Hobb", "Available instantly"]),
        );

        let books = extract("Robin Hobb", &html);
        assert_eq!(books.len(), 1);
        assert!(books[0].cover_url.is_empty());
    }

    #[test]
    fn test_filtered_results_skipped() {
        let html = page(&[
            result(None, &["Audio", "by Robin Hobb", "Audible Audiobook", "Available instantly"]),
            result(None, &["Other", "by Someone Else", "Available instantly"]),
            result(None, &["Paper", "by Robin Hobb", "Paperback"]),
        ]);

        assert!(extract("Robin Hobb", &html).is_empty());
    }

    #[test]
    fn test_parse_block_outcomes() {
        let html = Html::parse_document(&format!(
            "<html><body>{}{}</body></html>",
            book_block(&[]),
            book_block(&["Other", "by Someone Else", "Available instantly"]),
        ));
        let parser = Parser::new("Robin Hobb");
        let blocks: Vec<_> = html.select(&search::BOOK_BLOCK).collect();

        assert_eq!(parser.parse_block(blocks[0], None), BlockOutcome::Skipped("no title".to_string()));
        match parser.parse_block(blocks[1], None) {
            BlockOutcome::Skipped(reason) => assert!(reason.starts_with("Other")),
            other => panic!("expected skip, got {:?}", other),
        }
    }

    #[test]
    fn test_no_break_spaces_normalized() {
        let html = page(&[result(None, &["Title", "by Robin&nbsp;Hobb", "March&nbsp;4, 2027"])]);

        let books = extract("Robin Hobb", &html);
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].release_date, "March 4, 2027");
    }

    #[test]
    fn test_empty_page() {
        assert!(extract("Robin Hobb", "<html><body></body></html>").is_empty());
        assert!(extract("Robin Hobb", "").is_empty());
    }

    #[test]
    fn test_blocked_pages() {
        let marker = format!("<html><body><p>{}</p></body></html>", text::AUTOMATED_ACCESS);
        assert!(is_blocked_page(&marker));

        let captcha = r#"<html><body><form action="/errors/validateCaptcha"></form></body></html>"#;
        assert!(is_blocked_page(captcha));
        assert!(extract("Robin Hobb", captcha).is_empty());

        assert!(!is_blocked_page("<html><body><h1>Results</h1></body></html>"));
    }
}
