//! Checks tracked authors one after another for new or changed books.

use crate::amazon::{extract, Book, Storefront};
use crate::error::TrackerError;
use crate::tracker::authors::{AuthorEntry, AuthorSelection};
use crate::tracker::diff::{diff, merge};
use crate::tracker::notify::{notify, Notifier};
use crate::tracker::store::KnownBooks;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Counts for one run over the author list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Authors whose page was checked, successfully or not
    pub checked: usize,
    /// Authors with at least one new or changed book
    pub with_changes: usize,
    /// Authors whose check failed
    pub failed: usize,
}

/// Polls authors' search pages and reports what is new.
pub struct Tracker<S, N> {
    storefront: S,
    notifier: Option<N>,
    authors_folder: PathBuf,
    dry_run: bool,
}

impl<S: Storefront, N: Notifier> Tracker<S, N> {
    /// Creates a tracker storing known books under `authors_folder`.
    ///
    /// Without a notifier, changes are saved but nobody is told.
    pub fn new(storefront: S, notifier: Option<N>, authors_folder: impl Into<PathBuf>) -> Self {
        Self { storefront, notifier, authors_folder: authors_folder.into(), dry_run: false }
    }

    /// In a dry run changes are only logged: nothing is saved or sent.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Checks the selected authors in list order.
    ///
    /// A failing author is logged and does not stop the others.
    pub async fn run(&self, authors: &[AuthorEntry], selection: &AuthorSelection) -> RunSummary {
        let today = Local::now().date_naive();
        let mut summary = RunSummary::default();

        let picked = selection.pick(authors);
        if let AuthorSelection::Named(name) = selection {
            if picked.is_empty() {
                error!("{}", TrackerError::AuthorNotFound(name.clone()));
            }
        }

        for entry in picked {
            summary.checked += 1;
            match self.check_author(entry, today).await {
                Ok(changed) if !changed.is_empty() => summary.with_changes += 1,
                Ok(_) => {}
                Err(e) => {
                    summary.failed += 1;
                    error!("Checking author {} failed: {:#}", entry.author, e);
                }
            }
        }

        info!(
            "Checked {} authors: {} with changes, {} failed",
            summary.checked, summary.with_changes, summary.failed
        );
        summary
    }

    /// Fetches one author's page and returns the books new or changed since
    /// the last run, saving and notifying unless this is a dry run.
    pub async fn check_author(&self, entry: &AuthorEntry, today: NaiveDate) -> Result<Vec<Book>> {
        info!("Start looking for new books for author: {}", entry.author);
        debug!("Downloading the HTML code from {}", entry.url);

        let html = self.storefront.fetch(&entry.url).await?;
        let fresh = extract(&entry.author, &html);

        let path = entry.file_path(&self.authors_folder);
        let known = KnownBooks::load(&path);
        let changed = diff(&entry.author, &fresh, &known, today);

        if changed.is_empty() {
            return Ok(changed);
        }

        if self.dry_run {
            info!("Dry run: not saving {} or sending a notification", path.display());
            return Ok(changed);
        }

        merge(known, &changed)
            .save(&path)
            .with_context(|| format!("Failed to update author file for {}", entry.author))?;

        if let Some(notifier) = &self.notifier {
            notify(notifier, &entry.author, &changed).await;
        }

        Ok(changed)
    }
}
