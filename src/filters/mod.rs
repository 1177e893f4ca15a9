//! Relevance filtering of search result listings with composable filters.

pub mod author;
pub mod edition;
pub mod release;

use crate::amazon::Listing;

pub use author::AuthorFilter;
pub use edition::AudiobookFilter;
pub use release::ReleaseFilter;

/// Trait for filtering listings.
pub trait Filter: Send + Sync {
    /// Returns true if the listing passes the filter.
    fn matches(&self, listing: &Listing) -> bool;

    /// Returns a description of this filter.
    fn description(&self) -> String;
}

/// A chain of filters that must all pass.
pub struct FilterChain {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterChain {
    /// Creates an empty filter chain.
    pub fn new() -> Self {
        Self { filters: Vec::new() }
    }

    /// The chain that decides whether a listing is a book by `author`:
    /// the author is named, a release is announced, and it is not an audiobook.
    pub fn for_author(author: impl Into<String>) -> Self {
        let mut chain = Self::new();
        chain.add(AuthorFilter::new(author)).add(ReleaseFilter).add(AudiobookFilter);
        chain
    }

    /// Adds a filter to the chain.
    pub fn add(&mut self, filter: impl Filter + 'static) -> &mut Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Returns the description of the first filter the listing fails.
    pub fn rejection(&self, listing: &Listing) -> Option<String> {
        self.filters.iter().find(|f| !f.matches(listing)).map(|f| f.description())
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}
