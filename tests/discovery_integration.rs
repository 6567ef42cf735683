//! Integration tests for page discovery over HTTP.

use pagegrab_core::{
    HttpClient, HttpNeighborSource, NeighborSource, NoopObserver, PolitenessGate, Session,
    StopReason, discover,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REFERER: &str = "http://books.test/books?id=book1&printsec=frontcover&hl=en";

async fn mount_neighbors(server: &MockServer, pivot: &str, body: String, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/books"))
        .and(query_param("id", "book1"))
        .and(query_param("jscmd", "click3"))
        .and(query_param("lpg", "PP1"))
        .and(query_param("pg", pivot))
        .and(header("cookie", "NID=abc; SID=xyz"))
        .and(header("referer", REFERER))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json")
                .set_body_string(body),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn source_for(server: &MockServer) -> HttpNeighborSource {
    HttpNeighborSource::new(
        HttpClient::new(&server.uri()).unwrap(),
        Session::new("NID=abc; SID=xyz", REFERER),
        "book1",
    )
}

#[tokio::test]
async fn test_http_source_parses_neighbor_payload() {
    let server = MockServer::start().await;
    mount_neighbors(
        &server,
        "PP1",
        r#"{"page":[{"pid":"PP1","src":"https://img/1"},{"pid":"PP2"}]}"#.to_string(),
        1,
    )
    .await;

    let entries = source_for(&server).fetch_neighbors("PP1").await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].page_id, "PP1");
    assert_eq!(entries[0].resource_url.as_deref(), Some("https://img/1"));
    assert!(!entries[1].is_resolved());
}

#[tokio::test]
async fn test_http_source_rejects_malformed_payload() {
    let server = MockServer::start().await;
    mount_neighbors(&server, "PP1", "<html>blocked</html>".to_string(), 1).await;

    let result = source_for(&server).fetch_neighbors("PP1").await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_discover_over_http_queries_frontier_until_resolved() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_neighbors(
        &server,
        "PP1",
        format!(
            r#"{{"page":[{{"pid":"PP1","src":"{uri}/img/1"}},{{"pid":"PP2","src":""}},{{"pid":"PP3"}}]}}"#
        ),
        1,
    )
    .await;
    mount_neighbors(
        &server,
        "PP2",
        format!(
            r#"{{"page":[{{"pid":"PP2","src":"{uri}/img/2"}},{{"pid":"PP3","src":"{uri}/img/3"}},{{"pid":"PP4","src":"{uri}/img/4"}}]}}"#
        ),
        1,
    )
    .await;
    mount_neighbors(&server, "PP3", r#"{"page":[]}"#.to_string(), 0).await;

    let outcome = discover(&source_for(&server), &PolitenessGate::disabled(), &NoopObserver).await;

    assert_eq!(outcome.stop, StopReason::Complete);
    assert_eq!(outcome.iterations, 1);
    let urls: Vec<&str> = outcome.map.resolved_urls().collect();
    assert_eq!(
        urls,
        vec![
            format!("{uri}/img/1"),
            format!("{uri}/img/2"),
            format!("{uri}/img/3"),
            format!("{uri}/img/4"),
        ]
    );
}

#[tokio::test]
async fn test_discover_over_http_seed_failure_yields_empty_map() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/books"))
        .and(query_param("jscmd", "click3"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = discover(&source_for(&server), &PolitenessGate::disabled(), &NoopObserver).await;

    assert!(outcome.map.is_empty());
    assert!(outcome.is_complete());
}
