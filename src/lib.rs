//! amz-book-tracker - Watches Amazon Kindle search results for new books
//!
//! Scrapes each tracked author's newest Kindle listings, compares them with
//! the books seen on earlier runs and sends a Pushover message about
//! anything new or changed.

pub mod amazon;
pub mod config;
pub mod error;
pub mod filters;
pub mod tracker;

pub use amazon::models::{Book, Listing};
pub use config::{Config, Credentials, LogLevel};
pub use error::TrackerError;
pub use tracker::{AuthorEntry, AuthorSelection, KnownBooks, RunSummary, Tracker};
