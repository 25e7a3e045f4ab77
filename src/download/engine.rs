//! Batch execution over a download plan.
//!
//! The engine spawns one task per planned document, bounded by a
//! semaphore, and aggregates outcomes over an mpsc channel into a single
//! receiver. Workers never share mutable state.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use super::worker::{DownloadOutcome, DownloadStatus, DownloadWorker};
use crate::discover::DownloadPlan;

/// Lowest accepted concurrency.
pub const MIN_CONCURRENCY: usize = 1;

/// Highest accepted concurrency; the catalog is a single shared host.
pub const MAX_CONCURRENCY: usize = 100;

/// Default concurrent downloads.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Errors from engine configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Concurrency outside the accepted range.
    #[error("concurrency {value} outside {MIN_CONCURRENCY}..={MAX_CONCURRENCY}")]
    InvalidConcurrency {
        /// The rejected value.
        value: usize,
    },
}

/// One failed document in the batch summary.
#[derive(Debug, Clone, Serialize)]
pub struct FailureDetail {
    /// The document URL.
    pub url: String,
    /// The final error, rendered.
    pub reason: String,
    /// Attempts made before giving up.
    pub attempts: u32,
}

/// Immutable result of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    /// Documents downloaded.
    pub succeeded: usize,
    /// Documents skipped as already present.
    pub skipped: usize,
    /// Documents that exhausted their attempts.
    pub failed: usize,
    /// Total bytes written across the batch.
    pub total_bytes: u64,
    /// Wall-clock batch duration in milliseconds.
    pub elapsed_ms: u64,
    /// Per-document failure details.
    pub failures: Vec<FailureDetail>,
}

impl BatchSummary {
    /// Total documents accounted for.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }
}

/// Semaphore-bounded executor over a read-only [`DownloadPlan`].
pub struct DownloadEngine {
    worker: DownloadWorker,
    concurrency: usize,
    cancel: CancellationToken,
}

impl DownloadEngine {
    /// Creates an engine with validated concurrency.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] outside
    /// 1..=[`MAX_CONCURRENCY`].
    pub fn new(
        worker: DownloadWorker,
        concurrency: usize,
        cancel: CancellationToken,
    ) -> Result<Self, EngineError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(EngineError::InvalidConcurrency { value: concurrency });
        }
        Ok(Self {
            worker,
            concurrency,
            cancel,
        })
    }

    /// Runs the whole plan to completion and summarizes the outcomes.
    ///
    /// Cancellation stops the scheduling of further workers; in-flight
    /// downloads run to completion and their outcomes still count.
    #[instrument(skip(self, plan), fields(documents = plan.len(), concurrency = self.concurrency))]
    pub async fn run(&self, plan: &DownloadPlan) -> BatchSummary {
        let started = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let (tx, mut rx) = mpsc::channel::<DownloadOutcome>(self.concurrency.max(1));

        let mut scheduled = 0usize;
        for planned in plan.iter().cloned() {
            // Acquiring before spawn keeps the scheduling loop itself
            // bounded. The biased select observes cancellation even while
            // waiting on a full semaphore, so no worker is scheduled after
            // the token fires.
            let permit = tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    warn!(scheduled, "cancelled, not scheduling remaining documents");
                    break;
                }
                permit = semaphore.clone().acquire_owned() => {
                    let Ok(permit) = permit else { break };
                    permit
                }
            };
            let worker = self.worker.clone();
            let tx = tx.clone();
            scheduled += 1;
            tokio::spawn(async move {
                let outcome = worker.download(&planned).await;
                // Release before the bounded send: the receiver drains
                // only after scheduling ends, and a held permit here
                // would starve the scheduling loop.
                drop(permit);
                let _ = tx.send(outcome).await;
            });
        }
        drop(tx);

        let mut summary = BatchSummary {
            succeeded: 0,
            skipped: 0,
            failed: 0,
            total_bytes: 0,
            elapsed_ms: 0,
            failures: Vec::new(),
        };
        while let Some(outcome) = rx.recv().await {
            match outcome.status {
                DownloadStatus::Success => {
                    summary.succeeded += 1;
                    summary.total_bytes += outcome.bytes_written;
                }
                DownloadStatus::Skipped(_) => summary.skipped += 1,
                DownloadStatus::Failed(reason) => {
                    summary.failed += 1;
                    summary.failures.push(FailureDetail {
                        url: outcome.document.url.to_string(),
                        reason,
                        attempts: outcome.attempts,
                    });
                }
            }
        }
        summary.elapsed_ms = started.elapsed().as_millis() as u64;

        info!(
            succeeded = summary.succeeded,
            skipped = summary.skipped,
            failed = summary.failed,
            total_bytes = summary.total_bytes,
            elapsed_ms = summary.elapsed_ms,
            "batch finished"
        );
        summary
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;
    use url::Url;
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::discover::PlannedDocument;
    use crate::download::client::HttpClient;
    use crate::download::retry::RetryPolicy;
    use crate::download::worker::DownloadMode;
    use crate::extract::DocumentRef;

    fn plan_of(server: &MockServer, dir: &std::path::Path, count: usize) -> DownloadPlan {
        let mut plan = DownloadPlan::new();
        for i in 0..count {
            plan.push(PlannedDocument {
                document: DocumentRef {
                    url: Url::parse(&format!(
                        "{}/files/uu-no-{i}-tahun-2024.pdf",
                        server.uri()
                    ))
                    .unwrap(),
                    kind: None,
                    year: None,
                    number: None,
                    title: None,
                },
                target_dir: dir.to_path_buf(),
            });
        }
        plan
    }

    fn engine(cancel: CancellationToken) -> DownloadEngine {
        let worker = DownloadWorker::new(
            HttpClient::new(),
            RetryPolicy::with_max_attempts(1),
            DownloadMode::Real,
        );
        DownloadEngine::new(worker, 4, cancel).unwrap()
    }

    #[test]
    fn test_engine_rejects_out_of_range_concurrency() {
        let worker = DownloadWorker::new(
            HttpClient::new(),
            RetryPolicy::default(),
            DownloadMode::Real,
        );
        let result = DownloadEngine::new(worker, 0, CancellationToken::new());
        assert_eq!(
            result.err(),
            Some(EngineError::InvalidConcurrency { value: 0 })
        );
        let worker = DownloadWorker::new(
            HttpClient::new(),
            RetryPolicy::default(),
            DownloadMode::Real,
        );
        assert!(DownloadEngine::new(worker, 101, CancellationToken::new()).is_err());
    }

    #[tokio::test]
    async fn test_engine_runs_whole_plan() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/files/.*\.pdf$"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"pdf!".to_vec()))
            .mount(&server)
            .await;
        let dir = TempDir::new().unwrap();
        let plan = plan_of(&server, dir.path(), 8);

        let summary = engine(CancellationToken::new()).run(&plan).await;

        assert_eq!(summary.succeeded, 8);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.total_bytes, 32);
        assert_eq!(summary.total(), 8);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 8);
    }

    #[tokio::test]
    async fn test_engine_one_failure_does_not_abort_others() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/files/uu-no-0-.*$"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/files/.*\.pdf$"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"pdf".to_vec()))
            .mount(&server)
            .await;
        let dir = TempDir::new().unwrap();
        let plan = plan_of(&server, dir.path(), 4);

        let summary = engine(CancellationToken::new()).run(&plan).await;

        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures.len(), 1);
        assert!(summary.failures[0].url.contains("uu-no-0"));
        assert!(summary.failures[0].reason.contains("500"));
    }

    #[tokio::test]
    async fn test_engine_second_run_skips_everything() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/files/.*\.pdf$"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"pdf".to_vec()))
            .mount(&server)
            .await;
        let dir = TempDir::new().unwrap();
        let plan = plan_of(&server, dir.path(), 5);

        let first = engine(CancellationToken::new()).run(&plan).await;
        assert_eq!(first.succeeded, 5);

        let second = engine(CancellationToken::new()).run(&plan).await;
        assert_eq!(second.succeeded, 0);
        assert_eq!(second.skipped, 5);
        assert_eq!(second.failed, 0);
    }

    #[tokio::test]
    async fn test_engine_concurrent_same_header_name_keeps_both_documents() {
        let server = MockServer::start().await;
        // Bodies large enough that both downloads overlap in flight.
        let body = vec![b'x'; 1 << 20];
        Mock::given(method("GET"))
            .and(path_regex(r"^/files/.*\.pdf$"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Disposition", "attachment; filename=\"salinan.pdf\"")
                    .set_body_bytes(body.clone()),
            )
            .mount(&server)
            .await;
        let dir = TempDir::new().unwrap();
        let plan = plan_of(&server, dir.path(), 2);

        let summary = engine(CancellationToken::new()).run(&plan).await;

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 0);
        let first = std::fs::read(dir.path().join("salinan.pdf")).unwrap();
        let second = std::fs::read(dir.path().join("salinan_2.pdf")).unwrap();
        assert_eq!(first.len(), body.len());
        assert_eq!(second.len(), body.len());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_engine_mid_run_cancel_keeps_finished_outcomes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/files/.*\.pdf$"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(std::time::Duration::from_millis(300))
                    .set_body_bytes(b"pdf".to_vec()),
            )
            .mount(&server)
            .await;
        let dir = TempDir::new().unwrap();
        let plan = plan_of(&server, dir.path(), 3);
        let cancel = CancellationToken::new();
        let worker = DownloadWorker::new(
            HttpClient::new(),
            RetryPolicy::with_max_attempts(1),
            DownloadMode::Real,
        );
        // Concurrency 1: the second document waits on the semaphore while
        // the first is still in flight.
        let engine = DownloadEngine::new(worker, 1, cancel.clone()).unwrap();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let summary = engine.run(&plan).await;

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.total(), 1);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_engine_pre_cancelled_schedules_nothing() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let plan = plan_of(&server, dir.path(), 5);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let summary = engine(cancel).run(&plan).await;

        assert_eq!(summary.total(), 0);
        assert_eq!(server.received_requests().await.unwrap().len(), 0);
    }

    #[test]
    fn test_summary_serializes_to_json() {
        let summary = BatchSummary {
            succeeded: 2,
            skipped: 1,
            failed: 1,
            total_bytes: 2048,
            elapsed_ms: 1500,
            failures: vec![FailureDetail {
                url: "https://peraturan.go.id/files/x.pdf".to_string(),
                reason: "HTTP 500".to_string(),
                attempts: 3,
            }],
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["succeeded"], 2);
        assert_eq!(json["failures"][0]["attempts"], 3);
    }
}
