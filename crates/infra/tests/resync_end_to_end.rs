//! Full resync through the real client and the real store.

mod support;

use std::sync::Arc;
use std::time::Duration;

use octotriage_core::{NotificationStore, ResyncConfig, ResyncCoordinator, ResyncOptions, SyncPhase};
use octotriage_domain::constants::NOTIFICATIONS_RESOURCE;
use octotriage_domain::ViewFilter;
use parking_lot::Mutex;
use serde_json::json;
use support::{client_for, DbHarness};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn payload(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "unread": true,
        "updated_at": format!("2026-03-01T{:02}:00:00Z", 12 - id),
        "subject": {"title": format!("Change {id}"), "type": "Issue", "state": "open"},
        "repo": {"name": "octo/app", "owner": "octo"}
    })
}

fn coordinator(harness: &DbHarness, server: &MockServer) -> ResyncCoordinator {
    let config = ResyncConfig {
        poll_interval: Duration::from_millis(5),
        poll_max_attempts: 3,
        cache_ttl: Duration::from_secs(300),
    };
    ResyncCoordinator::new(Arc::new(harness.store()), Arc::new(client_for(&server.uri())), config)
        .with_clock(Arc::new(harness.clock.clone()))
}

#[tokio::test(flavor = "multi_thread")]
async fn github_resync_replaces_the_cache() {
    let harness = DbHarness::new();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/notifications/sync.json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/notifications/syncing.json"))
        .respond_with(ResponseTemplate::new(423))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/notifications/syncing.json"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    for (page, ids) in [(1, vec![1, 2]), (2, vec![3])] {
        Mock::given(method("GET"))
            .and(path("/api/notifications.json"))
            .and(query_param("page", page.to_string().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "notifications": ids.iter().map(|id| payload(*id)).collect::<Vec<_>>(),
                "pagination": {"current_page": page, "total_pages": 2}
            })))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/api/pinned_searches.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"pinned_searches": []})))
        .mount(&server)
        .await;

    let store = harness.store();
    store.replace_all(&[support::record(99, "octo/old")]).await.expect("seed");

    let phases = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&phases);
    let outcome = coordinator(&harness, &server)
        .run(ResyncOptions::with_github(), move |phase| recorder.lock().push(phase))
        .await
        .expect("resync");

    assert_eq!(outcome.fetched, 3);
    assert_eq!(outcome.poll_attempts, 2);
    assert!(!outcome.remote_still_syncing);
    assert_eq!(outcome.pinned_searches, Some(Vec::new()));
    assert_eq!(outcome.facets.unread, 3);

    let inbox = store.load_view(ViewFilter::Inbox).await.expect("inbox");
    assert_eq!(inbox.iter().map(|n| n.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(store.last_sync(NOTIFICATIONS_RESOURCE).await.expect("status").is_some());

    let phases = phases.lock().clone();
    assert_eq!(phases.first(), Some(&SyncPhase::Triggering));
    assert_eq!(phases.last(), Some(&SyncPhase::Idle));
    assert!(phases.contains(&SyncPhase::Replacing { count: 3 }));
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_fetch_keeps_the_cache() {
    let harness = DbHarness::new();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notifications.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = harness.store();
    store.upsert(&[support::record(7, "octo/app")]).await.expect("seed");

    let result = coordinator(&harness, &server).run(ResyncOptions::refresh(), |_| {}).await;

    assert!(result.is_err());
    assert!(store.get(7).await.expect("get").is_some());
    assert!(store.last_sync(NOTIFICATIONS_RESOURCE).await.expect("status").is_none());
}
