//! Listing-page discovery: walks the search results page by page and
//! builds the download plan.
//!
//! Discovery is deliberately sequential with a politeness delay between
//! fetches. The catalog is one shared government host; the concurrency
//! budget is spent on document downloads, not on hammering the search
//! endpoint.

mod frontier;
mod plan;

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use url::Url;

pub use frontier::{Frontier, PageState};
pub use plan::{DownloadPlan, MISC_DIR, PlannedDocument, UNSORTED_DIR, target_dir_for};

use crate::catalog::{RegulationKind, RegulationQuery, StatusFilter, build_listing_url_with_base};
use crate::download::{DownloadError, HttpClient};
use crate::extract::{self, DocumentRef};

/// Errors that abort discovery outright.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The very first request could not reach the host at all.
    ///
    /// Later per-page failures are logged and skipped; only a dead host
    /// on entry makes the whole run pointless.
    #[error("catalog host unreachable at {url}: {source}")]
    HostUnreachable {
        /// The seed URL that failed.
        url: String,
        /// The transport failure.
        #[source]
        source: DownloadError,
    },
}

/// Sequential frontier walker producing a [`DownloadPlan`].
pub struct Discovery {
    client: HttpClient,
    output_root: PathBuf,
    request_delay: Duration,
    cancel: CancellationToken,
}

impl Discovery {
    /// Creates a discovery walker writing plan targets under
    /// `output_root`.
    #[must_use]
    pub fn new(
        client: HttpClient,
        output_root: PathBuf,
        request_delay: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            output_root,
            request_delay,
            cancel,
        }
    }

    /// Walks every seed and its pagination chain into a download plan.
    ///
    /// Pages that fail to fetch or parse after the first are logged and
    /// skipped; the plan keeps whatever was found. Cancellation stops
    /// further frontier fetches.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::HostUnreachable`] when the first request
    /// fails at the transport level.
    #[instrument(skip(self, seeds), fields(seeds = seeds.len()))]
    pub async fn run(&self, seeds: Vec<Url>) -> Result<DownloadPlan, DiscoveryError> {
        let mut frontier = Frontier::new();
        for seed in seeds {
            frontier.enqueue(seed);
        }

        let mut plan = DownloadPlan::new();
        let mut first_request = true;
        let mut pages = 0usize;

        while let Some(url) = frontier.next() {
            if self.cancel.is_cancelled() {
                warn!(pages, "cancelled, stopping discovery");
                break;
            }
            if !first_request && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            match self.client.fetch_page(&url).await {
                Ok(html) => {
                    first_request = false;
                    pages += 1;
                    let page = extract::extract(&url, &html);
                    frontier.mark_extracted(&url);
                    let context = ListingContext::from_listing_url(&url);
                    for mut document in page.documents {
                        context.fill_missing(&mut document);
                        self.add_to_plan(&mut plan, document);
                    }
                    match page.next_page {
                        Some(next) => {
                            if !frontier.enqueue(next) {
                                frontier.mark_exhausted(&url);
                            }
                        }
                        None => frontier.mark_exhausted(&url),
                    }
                }
                Err(error) => {
                    if first_request && is_transport_failure(&error) {
                        return Err(DiscoveryError::HostUnreachable {
                            url: url.to_string(),
                            source: error,
                        });
                    }
                    first_request = false;
                    warn!(url = %url, error = %error, "listing page failed, skipping");
                    frontier.mark_exhausted(&url);
                }
            }
        }

        info!(pages, documents = plan.len(), "discovery finished");
        Ok(plan)
    }

    /// Folds one extracted document into the plan with its target
    /// directory.
    fn add_to_plan(&self, plan: &mut DownloadPlan, document: DocumentRef) -> bool {
        let target_dir = target_dir_for(&self.output_root, &document);
        plan.push(PlannedDocument {
            document,
            target_dir,
        })
    }

    /// Plans direct document URLs without any listing traversal.
    #[must_use]
    pub fn plan_direct(&self, documents: Vec<DocumentRef>) -> DownloadPlan {
        let mut plan = DownloadPlan::new();
        for document in documents {
            self.add_to_plan(&mut plan, document);
        }
        plan
    }
}

/// Query facts recovered from a listing URL's own search parameters.
///
/// Documents whose slugs lack kind/year/number inherit them from the
/// search that produced the page; pagination links preserve the search
/// parameters, so the context survives across pages.
#[derive(Debug, Clone, Copy, Default)]
struct ListingContext {
    kind: Option<RegulationKind>,
    year: Option<u16>,
    number: Option<u32>,
}

impl ListingContext {
    fn from_listing_url(url: &Url) -> Self {
        let mut context = Self::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "PeraturanSearch[jenis_peraturan_id]" => {
                    context.kind = value.parse::<u8>().ok().and_then(RegulationKind::from_id);
                }
                "PeraturanSearch[tahun]" => {
                    context.year = value.parse::<u16>().ok();
                }
                "PeraturanSearch[nomor]" => {
                    context.number = value.parse::<u32>().ok().filter(|n| *n > 0);
                }
                _ => {}
            }
        }
        context
    }

    fn fill_missing(&self, document: &mut DocumentRef) {
        if document.kind.is_none() {
            document.kind = self.kind;
        }
        if document.year.is_none() {
            document.year = self.year;
        }
        if document.number.is_none() {
            document.number = self.number;
        }
    }
}

fn is_transport_failure(error: &DownloadError) -> bool {
    matches!(
        error,
        DownloadError::Transport { .. } | DownloadError::Timeout { .. }
    )
}

/// The single seed for one query.
#[must_use]
pub fn seed_from_query(base: &str, query: &RegulationQuery) -> Url {
    build_listing_url_with_base(base, query)
}

/// The kinds × years cross-product of seeds for comprehensive harvesting.
///
/// Queries that fail validation (none can, with a sane year range) are
/// silently dropped.
#[must_use]
pub fn comprehensive_seeds(
    base: &str,
    kinds: &[RegulationKind],
    years: RangeInclusive<u16>,
    status: StatusFilter,
) -> Vec<Url> {
    let mut seeds = Vec::new();
    for kind in kinds {
        for year in years.clone() {
            if let Ok(query) = RegulationQuery::new(Some(*kind), Some(year), None, status) {
                seeds.push(build_listing_url_with_base(base, &query));
            }
        }
    }
    seeds
}
