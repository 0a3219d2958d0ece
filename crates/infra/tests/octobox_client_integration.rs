//! HTTP behaviour of the Octobox client against a mock server.

mod support;

use octotriage_core::RemoteService;
use octotriage_domain::{FetchFilters, TriageError};
use serde_json::json;
use support::{client_for, TEST_TOKEN};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn notification_json(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "github_id": 1000 + id,
        "reason": "mention",
        "unread": true,
        "archived": false,
        "starred": false,
        "web_url": format!("https://github.com/octo/app/pull/{id}"),
        "updated_at": "2026-03-01T10:00:00Z",
        "subject": {"title": format!("Change {id}"), "type": "PullRequest", "state": "open", "author": "octocat"},
        "repo": {"id": 7, "name": "octo/app", "owner": "octo", "repo_url": "https://github.com/octo/app"}
    })
}

#[tokio::test]
async fn fetch_page_sends_auth_headers_and_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notifications.json"))
        .and(header("authorization", format!("Bearer {TEST_TOKEN}").as_str()))
        .and(header("x-octobox-api", "1"))
        .and(header("accept", "application/json"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "2"))
        .and(query_param("starred", "true"))
        .and(query_param("q", "repo:octo/app"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "notifications": [notification_json(1), notification_json(2)],
            "pagination": {"total_pages": 3}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&format!("{}/", server.uri()));
    let filters = FetchFilters {
        starred: Some(true),
        archived: None,
        query: Some("repo:octo/app".into()),
    };
    let page = client.fetch_page(2, &filters).await.expect("page");

    assert_eq!(page.notifications.len(), 2);
    assert_eq!((page.current_page, page.total_pages), (2, 3));
    assert!(!page.is_last());
}

#[tokio::test]
async fn malformed_payload_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notifications.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let err = client.fetch_page(1, &FetchFilters::default()).await.expect_err("bad body");
    assert!(matches!(err, TriageError::Parse(_)), "got {err:?}");
}

#[tokio::test]
async fn unauthorized_maps_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/profile.json"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let err = client.user_profile().await.expect_err("401");
    assert!(matches!(err, TriageError::Auth(_)), "got {err:?}");
}

#[tokio::test]
async fn syncing_status_reads_locked_as_running() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notifications/syncing.json"))
        .respond_with(ResponseTemplate::new(423))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/notifications/syncing.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    assert!(client.is_syncing().await.expect("first poll"));
    assert!(!client.is_syncing().await.expect("second poll"));
}

#[tokio::test]
async fn trigger_while_running_is_busy() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/notifications/sync.json"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let err = client.trigger_sync().await.expect_err("busy");
    assert!(err.is_busy(), "got {err:?}");
}

#[tokio::test]
async fn bulk_mutations_send_id_arrays_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/notifications/archive_selected.json"))
        .and(query_param("id[]", "3"))
        .and(query_param("id[]", "4"))
        .and(query_param("value", "false"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/notifications/mark_read_selected.json"))
        .and(query_param("id[]", "5"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/notifications/mute_selected.json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    client.unarchive(&[3, 4]).await.expect("unarchive");
    client.mark_read(&[5]).await.expect("mark read");

    let err = client.mute(&[6]).await.expect_err("server error");
    assert!(matches!(&err, TriageError::Network(msg) if msg.contains("500")), "got {err:?}");
}

#[tokio::test]
async fn star_posts_to_the_record_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/notifications/42/star.json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server.uri()).star(42).await.expect("star");
}

#[tokio::test]
async fn reads_pinned_searches_profile_and_unread_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/pinned_searches.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pinned_searches": [{"name": "Reviews", "query": "reason:review_requested", "count": 4}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/profile.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"user": {"id": 1, "github_login": "octocat"}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/notifications/unread_count.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 12})))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());

    let pinned = client.pinned_searches().await.expect("pinned");
    assert_eq!(pinned.len(), 1);
    assert_eq!(pinned[0].raw_query, "reason:review_requested");
    assert_eq!(pinned[0].remote_count, Some(4));

    let profile = client.user_profile().await.expect("profile");
    assert_eq!(profile.github_login.as_deref(), Some("octocat"));

    assert_eq!(client.unread_count().await.expect("count"), 12);
}
