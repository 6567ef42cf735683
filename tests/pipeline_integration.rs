//! End-to-end tests for processing one document against a mock book host.

use std::fs::File;
use std::path::Path;

use pagegrab_core::{
    DiscoveryStore, HttpClient, NoopObserver, PipelineError, PipelineOptions, PolitenessGate,
    process_document,
};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOC: &str = "book1";

async fn mount_landing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/books"))
        .and(query_param("id", DOC))
        .and(query_param("printsec", "frontcover"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Set-Cookie", "NID=abc; Path=/")
                .set_body_string(
                    r#"<html><h1 class="gb-volume-title">Test Book</h1></html>"#,
                ),
        )
        .mount(server)
        .await;
}

async fn mount_seed(server: &MockServer, page_count: usize, expected_calls: u64) {
    let uri = server.uri();
    let pages: Vec<String> = (0..page_count)
        .map(|n| format!(r#"{{"pid":"PP{}","src":"{uri}/content/{n}?id={DOC}"}}"#, n + 1))
        .collect();
    Mock::given(method("GET"))
        .and(path("/books"))
        .and(query_param("jscmd", "click3"))
        .and(query_param("pg", "PP1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(format!(r#"{{"page":[{}]}}"#, pages.join(","))),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_image(server: &MockServer, n: usize, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/content/{n}")))
        .and(query_param("w", "1280"))
        .and(header("cookie", "NID=abc"))
        .respond_with(response)
        .mount(server)
        .await;
}

fn png(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "image/png")
        .set_body_bytes(body.as_bytes().to_vec())
}

fn archive_entries(archive_path: &Path) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(File::open(archive_path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

async fn mount_five_pages_with_one_missing(server: &MockServer) {
    mount_landing(server).await;
    mount_seed(server, 5, 1).await;
    mount_image(server, 0, png("p0")).await;
    mount_image(
        server,
        1,
        ResponseTemplate::new(200)
            .insert_header("content-type", "image/jpeg")
            .set_body_bytes(b"p1".to_vec()),
    )
    .await;
    mount_image(server, 2, ResponseTemplate::new(404)).await;
    mount_image(server, 3, png("p3")).await;
    mount_image(server, 4, png("p4")).await;
}

#[tokio::test]
async fn test_one_missing_page_among_five_keeps_the_rest() {
    let server = MockServer::start().await;
    mount_five_pages_with_one_missing(&server).await;

    let temp = TempDir::new().unwrap();
    let options = PipelineOptions {
        output_dir: temp.path().to_path_buf(),
        cleanup: false,
        ..PipelineOptions::default()
    };
    let client = HttpClient::new(&server.uri()).unwrap();

    let report = process_document(
        &client,
        &PolitenessGate::disabled(),
        &NoopObserver,
        &options,
        DOC,
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.title, "Test Book");
    assert_eq!(report.pages_total, 5);
    assert_eq!(report.pages_saved, 4);
    assert_eq!(report.pages_skipped, 1);
    assert!(!report.resumed);
    assert!(report.discovery_complete);

    let page_dir = temp.path().join("Test Book");
    assert_eq!(report.page_dir, page_dir);
    for name in ["page0.png", "page1.jpg", "page3.png", "page4.png"] {
        assert!(page_dir.join(name).is_file(), "{name} should exist");
    }
    assert!(!page_dir.join("page2.png").exists());
    assert_eq!(std::fs::read(page_dir.join("page3.png")).unwrap(), b"p3");

    let archive_path = report.archive_path.unwrap();
    assert_eq!(archive_path, temp.path().join("Test Book.cbz"));
    assert_eq!(
        archive_entries(&archive_path),
        vec!["page0.png", "page1.jpg", "page3.png", "page4.png"]
    );

    let stored = DiscoveryStore::new(temp.path()).try_load(DOC).await.unwrap().unwrap();
    assert_eq!(stored.len(), 5);
}

#[tokio::test]
async fn test_cleanup_removes_pages_and_discovery_file() {
    let server = MockServer::start().await;
    mount_five_pages_with_one_missing(&server).await;

    let temp = TempDir::new().unwrap();
    let options = PipelineOptions {
        output_dir: temp.path().to_path_buf(),
        ..PipelineOptions::default()
    };
    let client = HttpClient::new(&server.uri()).unwrap();

    let report = process_document(
        &client,
        &PolitenessGate::disabled(),
        &NoopObserver,
        &options,
        DOC,
        None,
    )
    .await
    .unwrap();

    assert!(report.archive_path.as_deref().is_some_and(Path::is_file));
    assert!(!temp.path().join("Test Book").exists());
    assert!(!DiscoveryStore::new(temp.path()).path_for(DOC).exists());
}

#[tokio::test]
async fn test_stored_page_list_skips_discovery() {
    let server = MockServer::start().await;
    mount_landing(&server).await;
    mount_seed(&server, 5, 0).await;
    mount_image(&server, 7, png("seven")).await;
    mount_image(&server, 8, png("eight")).await;

    let temp = TempDir::new().unwrap();
    let store = DiscoveryStore::new(temp.path());
    let uri = server.uri();
    std::fs::write(
        store.path_for(DOC),
        format!("{uri}/content/7?id={DOC}\n\n{uri}/content/8?id={DOC}\n"),
    )
    .unwrap();

    let options = PipelineOptions {
        output_dir: temp.path().to_path_buf(),
        create_archive: false,
        ..PipelineOptions::default()
    };
    let client = HttpClient::new(&server.uri()).unwrap();

    let report = process_document(
        &client,
        &PolitenessGate::disabled(),
        &NoopObserver,
        &options,
        DOC,
        None,
    )
    .await
    .unwrap();

    assert!(report.resumed);
    assert_eq!(report.pages_total, 2);
    assert_eq!(report.pages_saved, 2);
    assert!(report.archive_path.is_none());
    let page_dir = temp.path().join("Test Book");
    assert_eq!(std::fs::read(page_dir.join("page0.png")).unwrap(), b"seven");
    assert_eq!(std::fs::read(page_dir.join("page1.png")).unwrap(), b"eight");
    assert!(store.path_for(DOC).is_file(), "no archive means no cleanup");
}

#[tokio::test]
async fn test_unexpected_content_type_is_skipped() {
    let server = MockServer::start().await;
    mount_landing(&server).await;
    mount_seed(&server, 2, 1).await;
    mount_image(&server, 0, png("p0")).await;
    mount_image(
        &server,
        1,
        ResponseTemplate::new(200)
            .insert_header("content-type", "text/html")
            .set_body_string("<html>captcha</html>"),
    )
    .await;

    let temp = TempDir::new().unwrap();
    let options = PipelineOptions {
        output_dir: temp.path().to_path_buf(),
        create_archive: false,
        ..PipelineOptions::default()
    };
    let client = HttpClient::new(&server.uri()).unwrap();

    let report = process_document(
        &client,
        &PolitenessGate::disabled(),
        &NoopObserver,
        &options,
        DOC,
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.pages_saved, 1);
    assert_eq!(report.pages_skipped, 1);
    let page_dir = temp.path().join("Test Book");
    assert!(page_dir.join("page0.png").is_file());
    assert_eq!(std::fs::read_dir(&page_dir).unwrap().count(), 1);
}

#[tokio::test]
async fn test_bootstrap_failure_aborts_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/books"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let options = PipelineOptions {
        output_dir: temp.path().join("out"),
        ..PipelineOptions::default()
    };
    let client = HttpClient::new(&server.uri()).unwrap();

    let result = process_document(
        &client,
        &PolitenessGate::disabled(),
        &NoopObserver,
        &options,
        DOC,
        None,
    )
    .await;

    assert!(matches!(result, Err(PipelineError::Bootstrap(_))));
    assert!(!temp.path().join("out").exists());
}

#[tokio::test]
async fn test_failed_seed_stores_nothing_and_next_run_rediscovers() {
    let server = MockServer::start().await;
    mount_landing(&server).await;
    Mock::given(method("GET"))
        .and(path("/books"))
        .and(query_param("jscmd", "click3"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let options = PipelineOptions {
        output_dir: temp.path().to_path_buf(),
        create_archive: false,
        ..PipelineOptions::default()
    };
    let client = HttpClient::new(&server.uri()).unwrap();
    let store = DiscoveryStore::new(temp.path());

    let first = process_document(
        &client,
        &PolitenessGate::disabled(),
        &NoopObserver,
        &options,
        DOC,
        None,
    )
    .await;

    assert!(matches!(first, Err(PipelineError::NoPages { .. })));
    assert!(!store.path_for(DOC).exists());

    server.reset().await;
    mount_landing(&server).await;
    mount_seed(&server, 2, 1).await;
    mount_image(&server, 0, png("p0")).await;
    mount_image(&server, 1, png("p1")).await;

    let second = process_document(
        &client,
        &PolitenessGate::disabled(),
        &NoopObserver,
        &options,
        DOC,
        None,
    )
    .await
    .unwrap();

    assert!(!second.resumed);
    assert_eq!(second.pages_total, 2);
    assert_eq!(second.pages_saved, 2);
}

#[tokio::test]
async fn test_empty_stored_page_list_is_rediscovered() {
    let server = MockServer::start().await;
    mount_landing(&server).await;
    mount_seed(&server, 1, 1).await;
    mount_image(&server, 0, png("p0")).await;

    let temp = TempDir::new().unwrap();
    let store = DiscoveryStore::new(temp.path());
    std::fs::write(store.path_for(DOC), "\n").unwrap();

    let options = PipelineOptions {
        output_dir: temp.path().to_path_buf(),
        create_archive: false,
        ..PipelineOptions::default()
    };
    let client = HttpClient::new(&server.uri()).unwrap();

    let report = process_document(
        &client,
        &PolitenessGate::disabled(),
        &NoopObserver,
        &options,
        DOC,
        None,
    )
    .await
    .unwrap();

    assert!(!report.resumed);
    assert_eq!(report.pages_saved, 1);
    assert_eq!(store.try_load(DOC).await.unwrap().unwrap().len(), 1);
}
