//! GitHub source against a mocked REST API

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reposcope_core::{RepositoryFetcher, RetryConfig, ScopeError};
use reposcope_repo::{
    ApiClientConfig, DirectoryFilter, GitHubApiClient, GitHubFetcher, RepositorySelection,
};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn repo_json(name: &str, created_at: &str) -> serde_json::Value {
    json!({
        "name": name,
        "full_name": format!("octocat/{}", name),
        "description": null,
        "default_branch": "main",
        "created_at": created_at,
        "owner": { "login": "octocat" }
    })
}

fn client(server: &MockServer) -> GitHubApiClient {
    let config = ApiClientConfig::github(Some("secret".to_string())).with_base_url(&server.uri());
    GitHubApiClient::new(config).unwrap().with_retry(RetryConfig {
        max_attempts: 2,
        initial_delay_ms: 1,
        max_delay_ms: 5,
        backoff_multiplier: 1.0,
        jitter: false,
    })
}

async fn mount_repos(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .and(header("authorization", "token secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            repo_json("newer", "2023-05-01T00:00:00Z"),
            repo_json("older", "2019-01-01T00:00:00Z"),
            repo_json("empty", "2021-01-01T00:00:00Z"),
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_orders_by_creation_and_reads_lazily() {
    let server = MockServer::start().await;
    mount_repos(&server).await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/older/git/trees/main"))
        .and(query_param("recursive", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tree": [
                { "path": "app.py", "type": "blob", "size": 20 },
                { "path": "node_modules", "type": "tree" },
                { "path": "node_modules/x.js", "type": "blob", "size": 1 },
                { "path": "lib", "type": "commit" }
            ],
            "truncated": false
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/older/contents/app.py"))
        .and(query_param("ref", "main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": BASE64.encode("from flask import Flask\n"),
            "encoding": "base64"
        })))
        .mount(&server)
        .await;

    let fetcher = GitHubFetcher::new(
        client(&server),
        RepositorySelection::default(),
        DirectoryFilter::default(),
    );
    let sources = fetcher.fetch().await.unwrap();
    let names: Vec<&str> = sources
        .iter()
        .map(|s| s.descriptor().name.as_str())
        .collect();
    assert_eq!(names, vec!["older", "empty", "newer"]);

    let listing = sources[0].list_files().await.unwrap();
    let paths: Vec<&str> = listing.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["app.py"]);

    let content = sources[0].read_file("app.py").await.unwrap();
    assert_eq!(content, "from flask import Flask\n");
}

#[tokio::test]
async fn test_empty_repository_lists_nothing() {
    let server = MockServer::start().await;
    mount_repos(&server).await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/empty/git/trees/main"))
        .respond_with(ResponseTemplate::new(409).set_body_string("Git Repository is empty."))
        .mount(&server)
        .await;

    let fetcher = GitHubFetcher::new(
        client(&server),
        RepositorySelection {
            allow_list: Some(vec!["empty".to_string()]),
            limit: None,
        },
        DirectoryFilter::default(),
    );
    let sources = fetcher.fetch().await.unwrap();
    assert_eq!(sources.len(), 1);
    assert!(sources[0].list_files().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_listing_retries_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_repos(&server).await;

    let repositories = client(&server).list_user_repositories().await.unwrap();
    assert_eq!(repositories.len(), 3);
}

#[tokio::test]
async fn test_bad_token_is_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client(&server).list_user_repositories().await;
    assert!(matches!(result, Err(ScopeError::Authentication { .. })));
}

#[tokio::test]
async fn test_missing_token_never_calls_api() {
    let server = MockServer::start().await;
    let config = ApiClientConfig::github(None).with_base_url(&server.uri());
    let client = GitHubApiClient::new(config).unwrap();

    assert!(matches!(
        client.list_user_repositories().await,
        Err(ScopeError::Authentication { .. })
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}
