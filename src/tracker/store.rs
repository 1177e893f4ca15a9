//! Per-author known books, persisted as a JSON array sorted by title.

use crate::amazon::Book;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Books already seen for one author, keyed by title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownBooks {
    books: BTreeMap<String, Book>,
}

impl KnownBooks {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the known books from `path`.
    ///
    /// A missing or unreadable file means nothing is known yet, so this
    /// returns an empty set instead of an error.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!("No known books at {}: {}", path.display(), e);
                return Self::new();
            }
        };

        match serde_json::from_str::<Vec<Book>>(&content) {
            Ok(books) => books.into_iter().collect(),
            Err(e) => {
                warn!("Ignoring unreadable author file {}: {}", path.display(), e);
                Self::new()
            }
        }
    }

    /// Writes the books to `path` as a pretty-printed JSON array sorted by title.
    ///
    /// The file is written next to the target and renamed over it, so an
    /// interrupted save leaves the previous file intact.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create folder: {}", dir.display()))?;

        let mut file = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        file.write_all(&self.to_json()?)?;
        file.write_all(b"\n")?;
        file.as_file().sync_all()?;
        file.persist(path).with_context(|| format!("Failed to write {}", path.display()))?;

        debug!("Saved {} books to {}", self.len(), path.display());
        Ok(())
    }

    fn to_json(&self) -> Result<Vec<u8>> {
        let books: Vec<&Book> = self.books.values().collect();
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        books.serialize(&mut serializer).context("Failed to serialize books")?;
        Ok(buf)
    }

    /// Inserts a new book, or updates the fields of the one with the same title.
    pub fn upsert(&mut self, book: &Book) {
        match self.books.get_mut(&book.title) {
            Some(known) => known.update_from(book),
            None => {
                self.books.insert(book.title.clone(), book.clone());
            }
        }
    }

    /// Looks up a book by title.
    pub fn get(&self, title: &str) -> Option<&Book> {
        self.books.get(title)
    }

    /// Iterates over the books in title order.
    pub fn iter(&self) -> impl Iterator<Item = &Book> {
        self.books.values()
    }

    /// Returns the number of known books.
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Returns true if no books are known.
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

impl FromIterator<Book> for KnownBooks {
    fn from_iter<I: IntoIterator<Item = Book>>(iter: I) -> Self {
        let books = iter.into_iter().map(|book| (book.title.clone(), book)).collect();
        Self { books }
    }
}
