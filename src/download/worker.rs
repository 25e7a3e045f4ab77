//! Per-document download execution.
//!
//! A worker takes one planned document through the skip checks, the retry
//! loop, and the streamed write. Failures are folded into the returned
//! outcome; a worker never aborts the batch.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::header::CONTENT_DISPOSITION;
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

use super::client::HttpClient;
use super::error::DownloadError;
use super::filename::{ResolvedFilename, claim_unique_path, resolve_filename};
use super::retry::{FailureType, RetryDecision, RetryPolicy, classify_error, retry_after_duration};
use crate::discover::PlannedDocument;
use crate::extract::DocumentRef;

/// Suffix appended to in-progress files; renamed away on completion.
const PART_PREFIX: char = '.';
const PART_SUFFIX: &str = ".part";

/// Whether downloads touch the network at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    /// Normal operation: fetch and persist documents.
    Real,
    /// Dry run: report what would be downloaded without any network or
    /// disk I/O.
    Demo,
}

/// Why a document was skipped rather than downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// The target file already exists with a non-zero size.
    ExistingFile,
}

/// Terminal status of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DownloadStatus {
    /// The document was fetched and persisted.
    Success,
    /// Nothing was fetched.
    Skipped(SkipReason),
    /// All attempts failed; the reason is the final error rendered.
    Failed(String),
}

/// The result of processing one planned document.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadOutcome {
    /// The document this outcome describes.
    pub document: DocumentRef,
    /// How processing ended.
    pub status: DownloadStatus,
    /// Where the file sits (or would sit, for skips and demo runs).
    pub final_path: Option<PathBuf>,
    /// Bytes written to disk; zero for skips and failures.
    pub bytes_written: u64,
    /// Attempts made, at least 1; a pre-fetch skip counts as one.
    pub attempts: u32,
}

/// Executes single-document downloads with skip checks and retries.
#[derive(Debug, Clone)]
pub struct DownloadWorker {
    client: HttpClient,
    policy: RetryPolicy,
    mode: DownloadMode,
}

impl DownloadWorker {
    /// Creates a worker over a shared client.
    #[must_use]
    pub fn new(client: HttpClient, policy: RetryPolicy, mode: DownloadMode) -> Self {
        Self {
            client,
            policy,
            mode,
        }
    }

    /// Processes one planned document to a terminal outcome.
    ///
    /// Never returns an error: failures are reported in the outcome so one
    /// document cannot take the batch down with it.
    #[instrument(skip(self, planned), fields(url = %planned.document.url))]
    pub async fn download(&self, planned: &PlannedDocument) -> DownloadOutcome {
        let document = &planned.document;
        // Predicted name from URL/metadata alone, before any network I/O.
        let predicted = resolve_filename(None, &document.url, document);
        let predicted_path = planned.target_dir.join(&predicted.name);

        if self.mode == DownloadMode::Demo {
            info!(path = %predicted_path.display(), "demo: would download");
            return DownloadOutcome {
                document: document.clone(),
                status: DownloadStatus::Success,
                final_path: Some(predicted_path),
                bytes_written: 0,
                attempts: 1,
            };
        }

        if file_present(&predicted_path) {
            debug!(path = %predicted_path.display(), "already on disk, skipping");
            return DownloadOutcome {
                document: document.clone(),
                status: DownloadStatus::Skipped(SkipReason::ExistingFile),
                final_path: Some(predicted_path),
                bytes_written: 0,
                attempts: 1,
            };
        }

        let mut attempt: u32 = 1;
        loop {
            match self.fetch_and_store(planned, &predicted).await {
                Ok(FetchResult::Stored { path, bytes }) => {
                    info!(path = %path.display(), bytes, attempt, "downloaded");
                    return DownloadOutcome {
                        document: document.clone(),
                        status: DownloadStatus::Success,
                        final_path: Some(path),
                        bytes_written: bytes,
                        attempts: attempt,
                    };
                }
                Ok(FetchResult::AlreadyPresent { path }) => {
                    debug!(path = %path.display(), "resolved name already on disk");
                    return DownloadOutcome {
                        document: document.clone(),
                        status: DownloadStatus::Skipped(SkipReason::ExistingFile),
                        final_path: Some(path),
                        bytes_written: 0,
                        attempts: attempt,
                    };
                }
                Err(error) => {
                    let failure = classify_error(&error);
                    match self.policy.should_retry(failure, attempt) {
                        RetryDecision::Retry {
                            delay,
                            attempt: next,
                        } => {
                            let delay = server_suggested_delay(&error, failure)
                                .map_or(delay, |suggested| delay.max(suggested));
                            warn!(
                                attempt,
                                delay_ms = delay.as_millis() as u64,
                                error = %error,
                                "attempt failed, retrying"
                            );
                            tokio::time::sleep(delay).await;
                            attempt = next;
                        }
                        RetryDecision::DoNotRetry { reason } => {
                            warn!(attempt, error = %error, reason, "giving up");
                            return DownloadOutcome {
                                document: document.clone(),
                                status: DownloadStatus::Failed(error.to_string()),
                                final_path: None,
                                bytes_written: 0,
                                attempts: attempt,
                            };
                        }
                    }
                }
            }
        }
    }

    /// One fetch attempt: GET, resolve the final name, stream to a partial
    /// file, rename into place.
    async fn fetch_and_store(
        &self,
        planned: &PlannedDocument,
        predicted: &ResolvedFilename,
    ) -> Result<FetchResult, DownloadError> {
        let document = &planned.document;
        let response = self.client.get(&document.url).await?;

        let disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let resolved = resolve_filename(disposition.as_deref(), &document.url, document);

        fs::create_dir_all(&planned.target_dir)
            .await
            .map_err(|e| DownloadError::io(&planned.target_dir, e))?;

        // Another run (or worker) may have produced this exact file in the
        // meantime. A matching predicted name means it is this document;
        // a server-supplied name that collides is claimed atomically with
        // a numeric suffix, so concurrent workers never share a target.
        let (final_path, claimed) = if resolved.name == predicted.name {
            let path = planned.target_dir.join(&resolved.name);
            if file_present(&path) {
                return Ok(FetchResult::AlreadyPresent { path });
            }
            (path, false)
        } else {
            let path = claim_unique_path(&planned.target_dir, &resolved.name)
                .await
                .map_err(|e| DownloadError::io(&planned.target_dir, e))?;
            (path, true)
        };

        match stream_to_file(response, &final_path, document.url.as_str()).await {
            Ok(bytes) => Ok(FetchResult::Stored {
                path: final_path,
                bytes,
            }),
            Err(error) => {
                // A claimed placeholder must not survive a failed attempt,
                // or the next attempt would suffix around it.
                if claimed && let Err(cleanup) = fs::remove_file(&final_path).await {
                    debug!(
                        path = %final_path.display(),
                        error = %cleanup,
                        "placeholder cleanup failed"
                    );
                }
                Err(error)
            }
        }
    }
}

enum FetchResult {
    Stored { path: PathBuf, bytes: u64 },
    AlreadyPresent { path: PathBuf },
}

/// Streams a response body into a uniquely named `.part` file next to the
/// target, verifies it is non-empty, and renames it into place. The
/// partial file is removed on every failure path so nothing half-written
/// ever sits under the real name.
async fn stream_to_file(
    response: reqwest::Response,
    final_path: &Path,
    url: &str,
) -> Result<u64, DownloadError> {
    let part_path = partial_path(final_path);
    let result = write_body(response, &part_path, url).await;
    match result {
        Ok(bytes) => {
            fs::rename(&part_path, final_path)
                .await
                .map_err(|e| DownloadError::io(final_path, e))?;
            Ok(bytes)
        }
        Err(error) => {
            if let Err(cleanup) = fs::remove_file(&part_path).await {
                debug!(path = %part_path.display(), error = %cleanup, "partial cleanup failed");
            }
            Err(error)
        }
    }
}

async fn write_body(
    response: reqwest::Response,
    part_path: &Path,
    url: &str,
) -> Result<u64, DownloadError> {
    let mut file = fs::File::create(part_path)
        .await
        .map_err(|e| DownloadError::io(part_path, e))?;

    let mut bytes_written: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(url)
            } else {
                DownloadError::transport(url, e)
            }
        })?;
        file.write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(part_path, e))?;
        bytes_written += chunk.len() as u64;
    }
    file.flush()
        .await
        .map_err(|e| DownloadError::io(part_path, e))?;

    if bytes_written == 0 {
        return Err(DownloadError::empty_document(url));
    }
    Ok(bytes_written)
}

/// `dir/name.pdf` → `dir/.name.pdf.<token>.part`; the random token keeps
/// concurrent workers' in-progress files apart.
fn partial_path(final_path: &Path) -> PathBuf {
    let name = final_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let token: u32 = rand::random();
    final_path.with_file_name(format!("{PART_PREFIX}{name}.{token:08x}{PART_SUFFIX}"))
}

fn file_present(path: &Path) -> bool {
    std::fs::metadata(path).is_ok_and(|m| m.is_file() && m.len() > 0)
}

/// For rate-limited failures, the server's Retry-After parsed into a
/// duration.
fn server_suggested_delay(
    error: &DownloadError,
    failure: FailureType,
) -> Option<std::time::Duration> {
    if failure != FailureType::RateLimited {
        return None;
    }
    match error {
        DownloadError::ServerStatus {
            retry_after: Some(value),
            ..
        } => retry_after_duration(value),
        _ => None,
    }
}
