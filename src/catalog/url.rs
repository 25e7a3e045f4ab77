//! Listing-URL construction and direct-document-URL recognition.
//!
//! The search endpoint takes exactly six `PeraturanSearch[...]` parameters
//! in a fixed order; the bracketed names are percent-encoded byte-for-byte
//! and empty values are serialized as empty strings, never omitted.

use url::Url;

use super::error::CatalogError;
use super::kind::RegulationKind;
use super::query::RegulationQuery;
use crate::extract::DocumentRef;

/// Base URL of the public catalog.
pub const CATALOG_BASE_URL: &str = "https://peraturan.go.id";

/// Path prefix of the catalog's file-serving endpoint.
const FILES_PREFIX: &str = "/files/";

/// Extensions recognized as downloadable documents.
pub const DOCUMENT_EXTENSIONS: &[&str] = &[".pdf", ".doc", ".docx"];

/// Builds the canonical listing URL for a query against the public catalog.
///
/// Deterministic and pure: the same query always yields the same URL.
#[must_use]
pub fn build_listing_url(query: &RegulationQuery) -> Url {
    build_listing_url_with_base(CATALOG_BASE_URL, query)
}

/// Builds a listing URL against an explicit base (used by tests and by
/// discovery when pointed at a mirror).
///
/// # Panics
///
/// Panics if `base` is not a parseable absolute URL; the only non-test
/// caller passes the [`CATALOG_BASE_URL`] constant.
#[must_use]
#[allow(clippy::expect_used)]
pub fn build_listing_url_with_base(base: &str, query: &RegulationQuery) -> Url {
    let kind_id = query
        .kind()
        .map(|k| k.id().to_string())
        .unwrap_or_default();
    let number = query.number().map(|n| n.to_string()).unwrap_or_default();
    let year = query.year().map(|y| y.to_string()).unwrap_or_default();
    let status = urlencoding::encode(query.status().as_param()).into_owned();

    // Fixed parameter order; the bracketed names must appear exactly as the
    // host expects, so the query string is assembled by hand rather than
    // through a serializer that might reorder or re-encode.
    let url = format!(
        "{base}/cari?\
         PeraturanSearch%5Bjenis_peraturan_id%5D={kind_id}\
         &PeraturanSearch%5Btentang%5D=\
         &PeraturanSearch%5Bnomor%5D={number}\
         &PeraturanSearch%5Btahun%5D={year}\
         &PeraturanSearch%5Bpemrakarsa_id%5D=\
         &PeraturanSearch%5Bstatus%5D={status}",
        base = base.trim_end_matches('/'),
    );
    Url::parse(&url).expect("listing URL is built from validated parts")
}

/// Validates and decomposes a direct document URL on the catalog host.
///
/// Recognizes `https://peraturan.go.id/files/<slug>.pdf` (and .doc/.docx)
/// and extracts kind/number/year heuristically from the slug tokens.
/// Missing tokens leave the corresponding fields unset rather than failing.
///
/// # Errors
///
/// Returns [`CatalogError::NotADirectDocumentUrl`] when the URL does not
/// parse, is not on the catalog host, or does not match the files pattern.
pub fn parse_direct_document_url(url: &str) -> Result<DocumentRef, CatalogError> {
    let parsed =
        Url::parse(url).map_err(|_| CatalogError::not_a_direct_document_url(url))?;
    let catalog_host = Url::parse(CATALOG_BASE_URL)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string));
    if parsed.host_str().map(str::to_string) != catalog_host {
        return Err(CatalogError::not_a_direct_document_url(url));
    }
    document_ref_from_files_url(&parsed)
        .ok_or_else(|| CatalogError::not_a_direct_document_url(url))
}

/// Builds a [`DocumentRef`] from any URL matching the `/files/<slug>.<ext>`
/// pattern, regardless of host. Used by the link extractor, where the base
/// host is whatever page was fetched.
pub(crate) fn document_ref_from_files_url(url: &Url) -> Option<DocumentRef> {
    let path = url.path();
    let filename = path.strip_prefix(FILES_PREFIX)?;
    if filename.is_empty() || filename.contains('/') {
        return None;
    }
    let lower = filename.to_ascii_lowercase();
    let ext = DOCUMENT_EXTENSIONS.iter().find(|e| lower.ends_with(*e))?;
    let slug = &filename[..filename.len() - ext.len()];

    let (kind, number, year) = regulation_facts_from_slug(slug);
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    Some(DocumentRef {
        url: normalized,
        kind,
        year,
        number,
        title: None,
    })
}

/// Extracts (kind, number, year) from a hyphenated slug such as
/// `uu-no-2-tahun-2024`.
///
/// Heuristics, each independent:
/// - the leading token is matched against the known kind codes;
/// - the token after a literal `no` that parses as a positive integer is
///   the number;
/// - the 4-digit token after a literal `tahun` is the year.
pub(crate) fn regulation_facts_from_slug(
    slug: &str,
) -> (Option<RegulationKind>, Option<u32>, Option<u16>) {
    let tokens: Vec<&str> = slug.split('-').filter(|t| !t.is_empty()).collect();

    let kind = tokens.first().and_then(|t| RegulationKind::from_code(t));

    let mut number = None;
    let mut year = None;
    for window in tokens.windows(2) {
        match window[0] {
            "no" if number.is_none() => {
                number = window[1].parse::<u32>().ok().filter(|n| *n > 0);
            }
            "tahun" if year.is_none() => {
                if window[1].len() == 4 {
                    year = window[1].parse::<u16>().ok();
                }
            }
            _ => {}
        }
    }

    (kind, number, year)
}

/// Turns a file slug into a human-readable display title:
/// `uu-no-2-tahun-2024` becomes `UU No. 2 Tahun 2024`.
///
/// Short alphabetic tokens (kind codes) are upper-cased, longer tokens are
/// capitalized, and the literal `no` becomes `No.`.
#[must_use]
pub fn display_title_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|t| !t.is_empty())
        .map(|token| {
            if token == "no" {
                "No.".to_string()
            } else if token.chars().all(|c| c.is_ascii_digit()) {
                token.to_string()
            } else if token.len() <= 3 {
                token.to_ascii_uppercase()
            } else {
                let mut chars = token.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
