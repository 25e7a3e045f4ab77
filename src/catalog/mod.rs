//! Catalog model for peraturan.go.id: regulation kinds, search queries,
//! and the fixed listing/direct-document URL formats.
//!
//! The catalog exposes two URL surfaces:
//! - a search endpoint (`/cari`) taking a fixed, ordered set of six
//!   `PeraturanSearch[...]` parameters, and
//! - a file-serving endpoint (`/files/<slug>.pdf`) whose slugs embed the
//!   regulation kind, number, and year.
//!
//! # Example
//!
//! ```
//! use peraturan_dl::catalog::{RegulationKind, RegulationQuery, StatusFilter, build_listing_url};
//!
//! let query = RegulationQuery::new(Some(RegulationKind::Uu), Some(2024), Some(1), StatusFilter::Active)
//!     .unwrap();
//! let url = build_listing_url(&query);
//! assert!(url.as_str().contains("PeraturanSearch%5Btahun%5D=2024"));
//! ```

mod error;
mod kind;
mod query;
pub(crate) mod url;

pub use error::CatalogError;
pub use kind::RegulationKind;
pub use query::{RegulationQuery, StatusFilter};
pub use url::{
    CATALOG_BASE_URL, DOCUMENT_EXTENSIONS, build_listing_url, build_listing_url_with_base,
    display_title_from_slug, parse_direct_document_url,
};
