//! HTML link extraction for catalog listing pages.
//!
//! A listing page is ordinary server-rendered HTML; the extractor pulls
//! every anchor that resolves to the catalog's file-serving endpoint and
//! the pagination control pointing at the next page. It is deliberately
//! tolerant: garbage input yields an empty page, never an error.

use std::collections::HashSet;

use scraper::{Html, Selector};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::catalog::RegulationKind;
use crate::catalog::url::document_ref_from_files_url;

/// A single discoverable document found on a listing page or given as a
/// direct URL.
///
/// Identity is the normalized absolute URL (fragment stripped); the
/// metadata fields are best-effort and do not participate in equality.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRef {
    /// Absolute, fragment-free URL of the document file.
    pub url: Url,
    /// Regulation kind inferred from the file slug, when recognizable.
    pub kind: Option<RegulationKind>,
    /// Promulgation year inferred from the file slug.
    pub year: Option<u16>,
    /// Regulation number inferred from the file slug.
    pub number: Option<u32>,
    /// Human-readable title, usually the anchor text.
    pub title: Option<String>,
}

impl PartialEq for DocumentRef {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for DocumentRef {}

impl std::hash::Hash for DocumentRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

/// The structured result of extracting one listing page.
#[derive(Debug, Clone)]
pub struct ListingPage {
    /// The page this was extracted from.
    pub source_url: Url,
    /// Document links in top-to-bottom page order, deduplicated.
    pub documents: Vec<DocumentRef>,
    /// The next pagination page, if the page advertises one.
    pub next_page: Option<Url>,
}

impl ListingPage {
    fn empty(source_url: Url) -> Self {
        Self {
            source_url,
            documents: Vec::new(),
            next_page: None,
        }
    }
}

/// Labels recognized as "next page" on pagination anchors.
const NEXT_LABELS: &[&str] = &["»", "next", "selanjutnya"];

/// Extracts document links and the next-page control from listing HTML.
///
/// Relative hrefs resolve against `base`. Within-page duplicates coalesce
/// to the first occurrence, preserving page order. Never fails: content
/// that parses to nothing useful yields an empty [`ListingPage`].
#[must_use]
pub fn extract(base: &Url, html: &str) -> ListingPage {
    let document = Html::parse_document(html);

    let Ok(anchor_selector) = Selector::parse("a[href]") else {
        return ListingPage::empty(base.clone());
    };

    let mut seen: HashSet<Url> = HashSet::new();
    let mut documents = Vec::new();
    for anchor in document.select(&anchor_selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base.join(href) else {
            continue;
        };
        let Some(mut doc) = document_ref_from_files_url(&resolved) else {
            continue;
        };
        if !seen.insert(doc.url.clone()) {
            continue;
        }
        let text = anchor.text().collect::<String>();
        let text = text.trim();
        if !text.is_empty() {
            doc.title = Some(text.to_string());
        }
        documents.push(doc);
    }

    let next_page = find_next_page(&document, base);
    debug!(
        source = %base,
        documents = documents.len(),
        has_next = next_page.is_some(),
        "extracted listing page"
    );

    ListingPage {
        source_url: base.clone(),
        documents,
        next_page,
    }
}

/// Locates the next-page link, trying the explicit `rel=next` forms before
/// falling back to labelled pagination anchors.
fn find_next_page(document: &Html, base: &Url) -> Option<Url> {
    for selector in ["link[rel=\"next\"]", "a[rel=\"next\"]", "li.next a"] {
        if let Ok(sel) = Selector::parse(selector)
            && let Some(element) = document.select(&sel).next()
            && let Some(href) = element.value().attr("href")
            && let Ok(url) = base.join(href)
        {
            return Some(url);
        }
    }

    let anchor_selector = Selector::parse("a[href]").ok()?;
    for anchor in document.select(&anchor_selector) {
        let text = anchor.text().collect::<String>();
        let label = text.trim().to_lowercase();
        if NEXT_LABELS.contains(&label.as_str())
            && let Some(href) = anchor.value().attr("href")
            && let Ok(url) = base.join(href)
        {
            return Some(url);
        }
    }
    None
}
