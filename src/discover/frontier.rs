//! The listing-page frontier.
//!
//! An explicit queue of listing URLs with per-entry state, plus a visited
//! set so pagination cycles (page N linking back to page 1) terminate.

use std::collections::{HashMap, VecDeque};

use url::Url;

/// Lifecycle of one frontier entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    /// Queued, not yet fetched.
    Pending,
    /// Handed out for fetching.
    Fetching,
    /// Fetched and extracted; may still advertise a next page.
    Extracted,
    /// Done: extraction finished with no next page, or the fetch failed.
    Exhausted,
}

/// Queue of listing pages still to process.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<Url>,
    states: HashMap<Url, PageState>,
}

impl Frontier {
    /// Creates an empty frontier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a listing URL unless it has been seen before.
    ///
    /// Returns whether the URL was accepted. A URL already in any state
    /// is refused, which is what terminates pagination loops.
    pub fn enqueue(&mut self, url: Url) -> bool {
        if self.states.contains_key(&url) {
            return false;
        }
        self.states.insert(url.clone(), PageState::Pending);
        self.queue.push_back(url);
        true
    }

    /// Pops the next pending URL and marks it as being fetched.
    pub fn next(&mut self) -> Option<Url> {
        let url = self.queue.pop_front()?;
        self.states.insert(url.clone(), PageState::Fetching);
        Some(url)
    }

    /// Records that a page was fetched and its links extracted.
    pub fn mark_extracted(&mut self, url: &Url) {
        self.states.insert(url.clone(), PageState::Extracted);
    }

    /// Records that a page is finished for good.
    pub fn mark_exhausted(&mut self, url: &Url) {
        self.states.insert(url.clone(), PageState::Exhausted);
    }

    /// The recorded state of a URL, if it ever entered the frontier.
    #[must_use]
    pub fn state(&self, url: &Url) -> Option<PageState> {
        self.states.get(url).copied()
    }

    /// Number of URLs still pending.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Whether any work remains.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.queue.is_empty()
    }
}
