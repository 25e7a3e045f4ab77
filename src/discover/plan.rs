//! The download plan: what to fetch and where each file lands.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use url::Url;

use crate::extract::DocumentRef;

/// Directory used when the regulation kind could not be inferred.
pub const UNSORTED_DIR: &str = "Unsorted";

/// Directory used when the year or number is missing under a known kind.
pub const MISC_DIR: &str = "Lainnya";

/// One document scheduled for download.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedDocument {
    /// The document to fetch.
    pub document: DocumentRef,
    /// The directory the file will be written into.
    pub target_dir: PathBuf,
}

/// Ordered, URL-deduplicated set of planned documents.
///
/// The first occurrence of a URL wins; later sightings (the same document
/// linked from several listing pages) are dropped with their metadata.
/// Read-only once discovery hands it to the engine.
#[derive(Debug, Default)]
pub struct DownloadPlan {
    entries: Vec<PlannedDocument>,
    seen: HashSet<Url>,
}

impl DownloadPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a planned document unless its URL is already present.
    ///
    /// Returns whether the entry was added.
    pub fn push(&mut self, planned: PlannedDocument) -> bool {
        if !self.seen.insert(planned.document.url.clone()) {
            return false;
        }
        self.entries.push(planned);
        true
    }

    /// Number of planned documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the plan is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the plan in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &PlannedDocument> {
        self.entries.iter()
    }
}

/// Computes the target directory for a document under the archive root:
/// `<root>/<KIND>/<year>/Nomor <number>/`.
///
/// Missing metadata degrades a level at a time: no number puts the file
/// under `Lainnya` within its year, no year under `<KIND>/Lainnya`, and an
/// unrecognized kind under `Unsorted`.
#[must_use]
pub fn target_dir_for(root: &Path, document: &DocumentRef) -> PathBuf {
    let Some(kind) = document.kind else {
        return root.join(UNSORTED_DIR);
    };
    let Some(year) = document.year else {
        return root.join(kind.code()).join(MISC_DIR);
    };
    match document.number {
        Some(number) => root
            .join(kind.code())
            .join(year.to_string())
            .join(format!("Nomor {number}")),
        None => root.join(kind.code()).join(year.to_string()).join(MISC_DIR),
    }
}
