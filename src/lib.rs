//! peraturan-dl core library
//!
//! Discovers and retrieves the document files referenced by the public
//! Indonesian legal-document catalog at peraturan.go.id, organizing them
//! under a deterministic `<KIND>/<year>/Nomor <number>/` tree while
//! preserving each document's authentic filename.
//!
//! # Architecture
//!
//! - [`catalog`] - regulation kinds, search queries, listing/direct URL formats
//! - [`extract`] - HTML link extraction from listing pages
//! - [`discover`] - frontier walking and download-plan construction
//! - [`download`] - HTTP client, filename resolution, retry, workers, engine
//! - [`config`] - JSON-file configuration with defaults

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod catalog;
pub mod config;
pub mod discover;
pub mod download;
pub mod extract;

// Re-export commonly used types
pub use catalog::{
    CATALOG_BASE_URL, CatalogError, RegulationKind, RegulationQuery, StatusFilter,
    build_listing_url, parse_direct_document_url,
};
pub use config::{ConfigError, HarvestConfig};
pub use discover::{
    Discovery, DiscoveryError, DownloadPlan, Frontier, PageState, PlannedDocument, target_dir_for,
};
pub use download::{
    BatchSummary, DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS, DownloadEngine, DownloadError,
    DownloadMode, DownloadOutcome, DownloadStatus, DownloadWorker, EngineError, FailureType,
    HttpClient, RetryDecision, RetryPolicy, classify_error,
};
pub use extract::{DocumentRef, ListingPage, extract};
