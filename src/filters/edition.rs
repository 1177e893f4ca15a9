//! Edition format filtering.

use super::Filter;
use crate::amazon::selectors::text;
use crate::amazon::Listing;

/// Drops audiobook editions.
pub struct AudiobookFilter;

impl Filter for AudiobookFilter {
    fn matches(&self, listing: &Listing) -> bool {
        !listing.contains(text::AUDIOBOOK)
    }

    fn description(&self) -> String {
        format!("Not an {}", text::AUDIOBOOK)
    }
}
