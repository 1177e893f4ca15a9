//! Detection of new or changed books, and folding them into the known set.

use crate::amazon::Book;
use crate::tracker::store::KnownBooks;
use chrono::NaiveDate;
use tracing::info;

/// Returns the fresh books with no identical counterpart among the known ones,
/// each stamped with `today` as its last update.
///
/// Books are compared on every field except `last_update`, so a known title
/// whose release date or cover changed comes back as changed. Output keeps
/// the order of `fresh`.
pub fn diff(author: &str, fresh: &[Book], known: &KnownBooks, today: NaiveDate) -> Vec<Book> {
    let changed: Vec<Book> = fresh
        .iter()
        .filter(|book| !known.iter().any(|k| k.same_listing(book)))
        .map(|book| Book { last_update: Some(today), ..book.clone() })
        .collect();

    if changed.is_empty() {
        info!("No new books or updates found for author: {}", author);
    } else {
        info!(
            "Found new or updated books for author: {}\nBooks: {}",
            author,
            changed.iter().map(Book::summary_line).collect::<Vec<_>>().join("\n")
        );
    }

    changed
}

/// Folds changed books into the known set by title.
///
/// A known title has its fields updated in place; an unknown one is added.
pub fn merge(mut known: KnownBooks, changed: &[Book]) -> KnownBooks {
    for book in changed {
        known.upsert(book);
    }
    known
}
