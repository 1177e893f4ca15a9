//! Author name filtering.

use super::Filter;
use crate::amazon::Listing;

/// Keeps listings whose text names the tracked author.
///
/// The match is a case-sensitive substring search over every text node, so
/// "by Robin Hobb" and "Robin Hobb (Author)" both qualify.
pub struct AuthorFilter {
    author: String,
}

impl AuthorFilter {
    /// Creates a new author filter.
    pub fn new(author: impl Into<String>) -> Self {
        Self { author: author.into() }
    }
}

impl Filter for AuthorFilter {
    fn matches(&self, listing: &Listing) -> bool {
        listing.contains(&self.author)
    }

    fn description(&self) -> String {
        format!("Author: {}", self.author)
    }
}
