//! Author list loading from CSV.

use crate::amazon::client::search_url;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// A tracked author and the search page polled for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorEntry {
    pub author: String,
    pub url: String,
}

impl AuthorEntry {
    /// Creates an entry with the search URL derived from the storefront.
    pub fn new(author: impl Into<String>, storefront_url: &str) -> Self {
        let author = author.into();
        let url = search_url(storefront_url, &author);
        Self { author, url }
    }

    /// Location of this author's known-books file inside `folder`.
    pub fn file_path(&self, folder: &Path) -> PathBuf {
        folder.join(format!("{}.json", self.author.replace(' ', "_")))
    }
}

#[derive(Debug, Deserialize)]
struct AuthorRow {
    author: String,
}

/// Reads the author list; only the `author` column is used.
pub fn load_authors(path: &Path, storefront_url: &str) -> Result<Vec<AuthorEntry>> {
    info!("Parsing the data from the author-list file: {}", path.display());

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open author list: {}", path.display()))?;

    let mut entries = Vec::new();
    for row in reader.deserialize::<AuthorRow>() {
        let row = row.with_context(|| format!("Failed to parse author list: {}", path.display()))?;
        if row.author.is_empty() {
            continue;
        }
        entries.push(AuthorEntry::new(row.author, storefront_url));
    }

    Ok(entries)
}

/// Which authors a run checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorSelection {
    All,
    Named(String),
}

impl AuthorSelection {
    /// Parses the CLI value; `all` selects every author.
    pub fn parse(value: &str) -> Self {
        if value == "all" {
            AuthorSelection::All
        } else {
            AuthorSelection::Named(value.to_string())
        }
    }

    /// Returns the entries this selection covers, in list order.
    ///
    /// A named author matches exactly; only the first matching row is used.
    pub fn pick<'a>(&self, entries: &'a [AuthorEntry]) -> Vec<&'a AuthorEntry> {
        match self {
            AuthorSelection::All => entries.iter().collect(),
            AuthorSelection::Named(name) => {
                entries.iter().find(|e| &e.author == name).into_iter().collect()
            }
        }
    }
}
