//! Release announcement filtering.

use super::Filter;
use crate::amazon::Listing;

/// Keeps listings that are available now or carry a long-form release date.
pub struct ReleaseFilter;

impl Filter for ReleaseFilter {
    fn matches(&self, listing: &Listing) -> bool {
        listing.release_date().is_some()
    }

    fn description(&self) -> String {
        "Has release date or instant availability".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_listing(nodes: &[&str]) -> Listing {
        Listing::new(nodes.iter().map(|s| s.to_string()).collect(), None)
    }

    #[test]
    fn test_instant_availability() {
        assert!(ReleaseFilter.matches(&make_listing(&["Title", "Available instantly"])));
    }

    #[test]
    fn test_long_form_date() {
        assert!(ReleaseFilter.matches(&make_listing(&["Title", "Oct 3, 2026", "October 3, 2026"])));
    }

    #[test]
    fn test_no_release_info() {
        assert!(!ReleaseFilter.matches(&make_listing(&["Title", "Oct 3, 2026"])));
        assert!(!ReleaseFilter.matches(&make_listing(&["Title", "Currently unavailable"])));
    }
}
