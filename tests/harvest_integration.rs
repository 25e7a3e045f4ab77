//! End-to-end harvest: mock catalog -> discovery -> engine -> disk tree.

#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::time::Duration;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use peraturan_dl::{
    Discovery, DownloadEngine, DownloadMode, DownloadWorker, HttpClient, RetryPolicy,
};

async fn mock_catalog() -> MockServer {
    let server = MockServer::start().await;

    let listing_page_two = format!("{}/cari?page=2", server.uri());
    Mock::given(method("GET"))
        .and(path("/cari"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
                 <a href="/files/pp-no-7-tahun-2023.pdf">PP No. 7 Tahun 2023</a>
                 <a href="/files/uu-no-1-tahun-2024.pdf">duplicate of page one</a>
               </body></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cari"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<html><body>
                 <a href="/files/uu-no-1-tahun-2024.pdf">UU No. 1 Tahun 2024</a>
                 <a href="/files/uu-no-2-tahun-2024.docx">UU No. 2 Tahun 2024</a>
                 <a href="/profil">not a document</a>
                 <ul class="pagination"><li class="next"><a href="{listing_page_two}">&raquo;</a></li></ul>
               </body></html>"#
        )))
        .mount(&server)
        .await;

    for slug in [
        "uu-no-1-tahun-2024.pdf",
        "uu-no-2-tahun-2024.docx",
        "pp-no-7-tahun-2023.pdf",
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/files/{slug}")))
            .respond_with(
                ResponseTemplate::new(200).set_body_bytes(format!("body of {slug}").into_bytes()),
            )
            .mount(&server)
            .await;
    }

    server
}

fn harness(root: &Path, cancel: CancellationToken) -> (Discovery, DownloadEngine) {
    let client = HttpClient::new();
    let discovery = Discovery::new(
        client.clone(),
        root.to_path_buf(),
        Duration::ZERO,
        cancel.clone(),
    );
    let worker = DownloadWorker::new(client, RetryPolicy::default(), DownloadMode::Real);
    let engine = DownloadEngine::new(worker, 4, cancel).unwrap();
    (discovery, engine)
}

#[tokio::test]
async fn test_harvest_builds_the_expected_tree() {
    let server = mock_catalog().await;
    let out = TempDir::new().unwrap();
    let (discovery, engine) = harness(out.path(), CancellationToken::new());

    let seed = Url::parse(&format!("{}/cari", server.uri())).unwrap();
    let plan = discovery.run(vec![seed]).await.unwrap();
    assert_eq!(plan.len(), 3, "duplicate across pages must collapse");

    let summary = engine.run(&plan).await;
    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed, 0);

    let expected = [
        "UU/2024/Nomor 1/uu-no-1-tahun-2024.pdf",
        "UU/2024/Nomor 2/uu-no-2-tahun-2024.docx",
        "PP/2023/Nomor 7/pp-no-7-tahun-2023.pdf",
    ];
    for rel in expected {
        let file = out.path().join(rel);
        assert!(file.is_file(), "missing {rel}");
        assert!(std::fs::metadata(&file).unwrap().len() > 0);
    }
}

#[tokio::test]
async fn test_second_harvest_is_idempotent() {
    let server = mock_catalog().await;
    let out = TempDir::new().unwrap();

    let (discovery, engine) = harness(out.path(), CancellationToken::new());
    let seed = Url::parse(&format!("{}/cari", server.uri())).unwrap();
    let plan = discovery.run(vec![seed.clone()]).await.unwrap();
    let first = engine.run(&plan).await;
    assert_eq!(first.succeeded, 3);

    let requests_after_first = server.received_requests().await.unwrap().len();

    let (discovery, engine) = harness(out.path(), CancellationToken::new());
    let plan = discovery.run(vec![seed]).await.unwrap();
    let second = engine.run(&plan).await;
    assert_eq!(second.succeeded, 0);
    assert_eq!(second.skipped, 3);

    // The second run fetches listing pages only, never the documents.
    let document_requests = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .skip(requests_after_first)
        .filter(|r| r.url.path().starts_with("/files/"))
        .count();
    assert_eq!(document_requests, 0);
}

#[tokio::test]
async fn test_demo_harvest_touches_nothing() {
    let server = mock_catalog().await;
    let out = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    let client = HttpClient::new();
    let discovery = Discovery::new(
        client.clone(),
        out.path().to_path_buf(),
        Duration::ZERO,
        cancel.clone(),
    );
    let worker = DownloadWorker::new(client, RetryPolicy::default(), DownloadMode::Demo);
    let engine = DownloadEngine::new(worker, 4, cancel).unwrap();

    let seed = Url::parse(&format!("{}/cari", server.uri())).unwrap();
    let plan = discovery.run(vec![seed]).await.unwrap();
    let summary = engine.run(&plan).await;

    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.total_bytes, 0);
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    let document_requests = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path().starts_with("/files/"))
        .count();
    assert_eq!(document_requests, 0);
}

#[tokio::test]
async fn test_summary_serializes_with_failure_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cari"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<a href="/files/uu-no-9-tahun-2020.pdf">UU 9</a>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/uu-no-9-tahun-2020.pdf"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    let client = HttpClient::new();
    let discovery = Discovery::new(
        client.clone(),
        out.path().to_path_buf(),
        Duration::ZERO,
        cancel.clone(),
    );
    let worker = DownloadWorker::new(
        client,
        RetryPolicy::new(
            2,
            Duration::from_millis(1),
            Duration::from_millis(5),
            2.0,
        ),
        DownloadMode::Real,
    );
    let engine = DownloadEngine::new(worker, 2, cancel).unwrap();

    let seed = Url::parse(&format!("{}/cari", server.uri())).unwrap();
    let plan = discovery.run(vec![seed]).await.unwrap();
    let summary = engine.run(&plan).await;

    assert_eq!(summary.failed, 1);
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["failed"], 1);
    assert_eq!(json["failures"][0]["attempts"], 2);
    assert!(
        json["failures"][0]["reason"]
            .as_str()
            .unwrap()
            .contains("500")
    );
}
