//! Document retrieval: HTTP client, filename resolution, retry policy,
//! per-document workers, and the bounded-concurrency batch engine.
//!
//! The engine executes a read-only [`crate::discover::DownloadPlan`];
//! everything here reports per-document outcomes instead of failing the
//! batch.

pub(crate) mod client;
mod engine;
mod error;
pub(crate) mod filename;
pub(crate) mod retry;
pub(crate) mod worker;

pub use client::HttpClient;
pub use engine::{
    BatchSummary, DEFAULT_CONCURRENCY, DownloadEngine, EngineError, FailureDetail,
    MAX_CONCURRENCY, MIN_CONCURRENCY,
};
pub use error::DownloadError;
pub use filename::{FilenameSource, ResolvedFilename, disambiguate, resolve_filename};
pub use retry::{
    DEFAULT_MAX_ATTEMPTS, FailureType, RetryDecision, RetryPolicy, classify_error,
    retry_after_duration,
};
pub use worker::{DownloadMode, DownloadOutcome, DownloadStatus, DownloadWorker, SkipReason};
