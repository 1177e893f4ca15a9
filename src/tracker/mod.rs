//! Author tracking: author list, known books, change detection, notification.

pub mod authors;
pub mod diff;
pub mod notify;
pub mod run;
pub mod store;

pub use authors::{load_authors, AuthorEntry, AuthorSelection};
pub use diff::{diff, merge};
pub use notify::{notify, Notifier, PushoverClient};
pub use run::{RunSummary, Tracker};
pub use store::KnownBooks;
