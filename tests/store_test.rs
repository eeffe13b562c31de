//! RemoteStore behavior against a mock API: load/cache fallback, write
//! reconciliation, and the stale-response guard.

mod common;

use std::time::Duration;

use httpmock::Method::{DELETE, GET, POST, PUT};
use httpmock::MockServer;
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{
    media_json, media_page, offline_context, subscriber_json, subscribers_page, test_context,
    ticket_json, tickets_page,
};
use fooodis_admin::resources::subscriber::SubscriberStatus;
use fooodis_admin::resources::ticket::{ReplyOptions, TicketStatus};
use fooodis_admin::resources::media::UploadOptions;
use fooodis_admin::{AdminConfig, AdminContext, FilterCriteria, Severity};

#[tokio::test]
async fn load_replaces_collection_and_respects_limit() {
    let server = MockServer::start();
    let cache_dir = tempfile::tempdir().expect("tempdir");
    let (context, _) = test_context(&server, &cache_dir);

    // A misbehaving server answering with more rows than asked for.
    let rows: Vec<_> = (0..8)
        .map(|i| subscriber_json(&format!("s{i}"), &format!("user{i}@fooodis.com"), "active"))
        .collect();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/subscribers")
            .query_param("limit", "5")
            .query_param("offset", "0");
        then.status(200).json_body(subscribers_page(rows, 8));
    });

    let store = context.subscriber_store();
    let (items, stats) = store.load(&FilterCriteria::new(5)).await;

    assert_eq!(items.len(), 5);
    assert_eq!(items[0].email, "user0@fooodis.com");
    assert_eq!(stats.total, 8);
    assert_eq!(store.items().len(), 5);
}

#[tokio::test]
async fn failed_load_serves_cached_snapshot() {
    let server = MockServer::start();
    let cache_dir = tempfile::tempdir().expect("tempdir");
    let (context, _) = test_context(&server, &cache_dir);

    server.mock(|when, then| {
        when.method(GET).path("/api/subscribers");
        then.status(200).json_body(subscribers_page(
            vec![subscriber_json("s1", "a@b.com", "active")],
            1,
        ));
    });
    context
        .subscriber_store()
        .load(&FilterCriteria::new(20))
        .await;

    // Same cache dir, dead server: the snapshot must come back.
    let offline = offline_context(&cache_dir);
    let (items, stats) = offline
        .subscriber_store()
        .load(&FilterCriteria::new(20))
        .await;

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].email, "a@b.com");
    assert_eq!(stats.total, 1);
}

#[tokio::test]
async fn failed_load_without_snapshot_is_empty_with_zeroed_stats() {
    let cache_dir = tempfile::tempdir().expect("tempdir");
    let offline = offline_context(&cache_dir);

    let (items, stats) = offline.ticket_store().load(&FilterCriteria::new(20)).await;

    assert!(items.is_empty());
    assert_eq!(stats.total, 0);
    assert_eq!(stats.open, 0);
}

#[tokio::test]
async fn subscriber_create_prepends_and_bumps_active() {
    let server = MockServer::start();
    let cache_dir = tempfile::tempdir().expect("tempdir");
    let (context, sink) = test_context(&server, &cache_dir);

    server.mock(|when, then| {
        when.method(GET).path("/api/subscribers");
        then.status(200).json_body(subscribers_page(
            vec![subscriber_json("s1", "old@fooodis.com", "active")],
            1,
        ));
    });
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/api/subscribers")
            .json_body_partial(r#"{"email": "a@b.com"}"#);
        then.status(200).json_body(json!({
            "subscriber": subscriber_json("s2", "a@b.com", "active"),
            "existing": false,
            "reactivated": false,
            "message": "Subscriber added successfully"
        }));
    });

    let store = context.subscriber_store();
    store.load(&FilterCriteria::new(20)).await;
    let before = store.stats();

    let outcome = store
        .create(json!({"email": "a@b.com", "source": "manual"}))
        .await
        .expect("create succeeds");

    create.assert();
    assert!(!outcome.existing);
    let items = store.items();
    assert_eq!(items[0].email, "a@b.com");
    assert_eq!(items.len(), 2);
    assert_eq!(store.stats().active, before.active + 1);
    assert_eq!(store.stats().total, before.total + 1);

    let messages = sink.messages();
    assert_eq!(messages.last().unwrap().severity, Severity::Success);
    assert_eq!(messages.last().unwrap().message, "Subscriber added successfully");
}

#[tokio::test]
async fn duplicate_subscriber_create_leaves_collection_untouched() {
    let server = MockServer::start();
    let cache_dir = tempfile::tempdir().expect("tempdir");
    let (context, _) = test_context(&server, &cache_dir);

    server.mock(|when, then| {
        when.method(GET).path("/api/subscribers");
        then.status(200).json_body(subscribers_page(
            vec![subscriber_json("s1", "a@b.com", "active")],
            1,
        ));
    });
    server.mock(|when, then| {
        when.method(POST).path("/api/subscribers");
        then.status(200).json_body(json!({
            "subscriber": subscriber_json("s1", "a@b.com", "active"),
            "existing": true,
            "message": "Already subscribed"
        }));
    });

    let store = context.subscriber_store();
    store.load(&FilterCriteria::new(20)).await;

    let outcome = store
        .create(json!({"email": "a@b.com"}))
        .await
        .expect("idempotent create succeeds");

    assert!(outcome.existing);
    assert_eq!(store.items().len(), 1);
    assert_eq!(store.stats().total, 1);
}

#[tokio::test]
async fn failed_create_notifies_and_propagates() {
    let server = MockServer::start();
    let cache_dir = tempfile::tempdir().expect("tempdir");
    let (context, sink) = test_context(&server, &cache_dir);

    server.mock(|when, then| {
        when.method(POST).path("/api/subscribers");
        then.status(400).json_body(json!({"error": "Invalid email address"}));
    });

    let store = context.subscriber_store();
    let err = store
        .create(json!({"email": "not-an-email"}))
        .await
        .expect_err("server rejection must propagate");

    assert!(err.to_string().contains("Invalid email address"));
    assert!(store.items().is_empty());
    let messages = sink.messages();
    assert_eq!(messages.last().unwrap().severity, Severity::Error);
}

#[tokio::test]
async fn update_is_pessimistic_and_preserves_position() {
    let server = MockServer::start();
    let cache_dir = tempfile::tempdir().expect("tempdir");
    let (context, _) = test_context(&server, &cache_dir);

    server.mock(|when, then| {
        when.method(GET).path("/api/tickets");
        then.status(200).json_body(tickets_page(
            vec![
                ticket_json("t1", "TKT-001", "Broken image", "open"),
                ticket_json("t2", "TKT-002", "Billing question", "open"),
            ],
            2,
        ));
    });
    server.mock(|when, then| {
        when.method(PUT).path("/api/tickets/t2");
        then.status(200).json_body(json!({
            "success": true,
            "data": {"ticket": ticket_json("t2", "TKT-002", "Billing question", "resolved")}
        }));
    });

    let store = context.ticket_store();
    store.load(&FilterCriteria::new(20)).await;

    let updated = store
        .update("t2", json!({"status": "resolved"}))
        .await
        .expect("update succeeds");

    assert_eq!(updated.status, TicketStatus::Resolved);
    let items = store.items();
    // Position preserved, other fields untouched.
    assert_eq!(items[1].id, "t2");
    assert_eq!(items[1].status, TicketStatus::Resolved);
    assert_eq!(items[1].subject, "Billing question");
    assert_eq!(items[0].id, "t1");
    assert_eq!(items[0].status, TicketStatus::Open);
}

#[tokio::test]
async fn failed_update_leaves_local_state_untouched() {
    let server = MockServer::start();
    let cache_dir = tempfile::tempdir().expect("tempdir");
    let (context, sink) = test_context(&server, &cache_dir);

    server.mock(|when, then| {
        when.method(GET).path("/api/tickets");
        then.status(200)
            .json_body(tickets_page(vec![ticket_json("t1", "TKT-001", "Broken image", "open")], 1));
    });
    server.mock(|when, then| {
        when.method(PUT).path("/api/tickets/t1");
        then.status(500).json_body(json!({"error": "db write failed"}));
    });

    let store = context.ticket_store();
    store.load(&FilterCriteria::new(20)).await;

    let err = store
        .update("t1", json!({"status": "resolved"}))
        .await
        .expect_err("server failure must propagate");
    assert!(err.is_retryable());

    assert_eq!(store.items()[0].status, TicketStatus::Open);
    assert_eq!(sink.messages().last().unwrap().severity, Severity::Error);
}

#[tokio::test]
async fn remove_drops_record_and_decrements_stats() {
    let server = MockServer::start();
    let cache_dir = tempfile::tempdir().expect("tempdir");
    let (context, _) = test_context(&server, &cache_dir);

    server.mock(|when, then| {
        when.method(GET).path("/api/subscribers");
        then.status(200).json_body(subscribers_page(
            vec![
                subscriber_json("s1", "a@b.com", "active"),
                subscriber_json("s2", "x@y.com", "active"),
            ],
            2,
        ));
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE).path("/api/subscribers/s1");
        then.status(204);
    });

    let store = context.subscriber_store();
    store.load(&FilterCriteria::new(20)).await;

    store.remove("s1").await.expect("delete succeeds");

    delete.assert();
    let items = store.items();
    assert_eq!(items.len(), 1);
    assert!(items.iter().all(|s| s.id != "s1"));
    assert_eq!(store.stats().total, 1);
    assert_eq!(store.stats().active, 1);
}

#[tokio::test]
async fn overlapping_loads_resolve_last_issued_wins() {
    let server = MockServer::start();
    let cache_dir = tempfile::tempdir().expect("tempdir");
    let (context, _) = test_context(&server, &cache_dir);

    // The older request answers late; its result must be discarded.
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/subscribers")
            .query_param("offset", "0");
        then.status(200)
            .delay(Duration::from_millis(200))
            .json_body(subscribers_page(
                vec![subscriber_json("s1", "stale@fooodis.com", "active")],
                1,
            ));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/subscribers")
            .query_param("offset", "20");
        then.status(200).json_body(subscribers_page(
            vec![subscriber_json("s2", "fresh@fooodis.com", "active")],
            1,
        ));
    });

    let store = context.subscriber_store();

    let slow = {
        let store = store.clone();
        tokio::spawn(async move {
            store.load(&FilterCriteria::new(20)).await;
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut paged = FilterCriteria::new(20);
    paged.set_offset(20);
    store.load(&paged).await;

    slow.await.expect("slow load task");

    let items = store.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].email, "fresh@fooodis.com");
}

#[tokio::test]
async fn overlapping_failed_load_does_not_clobber_newer_state() {
    let server = MockServer::start();
    let scratch = tempfile::tempdir().expect("tempdir");
    // A plain file as the data dir: snapshots can neither persist nor load,
    // so a failed load has only the empty fallback to offer.
    let blocked = scratch.path().join("blocked");
    std::fs::write(&blocked, b"").expect("create file");
    let context = AdminContext::new(AdminConfig::new(server.base_url(), &blocked));

    server.mock(|when, then| {
        when.method(GET)
            .path("/api/subscribers")
            .query_param("offset", "0");
        then.status(500)
            .delay(Duration::from_millis(200))
            .json_body(json!({"error": "db unavailable"}));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/subscribers")
            .query_param("offset", "20");
        then.status(200).json_body(subscribers_page(
            vec![subscriber_json("s2", "fresh@fooodis.com", "active")],
            1,
        ));
    });

    let store = context.subscriber_store();

    let slow = {
        let store = store.clone();
        tokio::spawn(async move {
            store.load(&FilterCriteria::new(20)).await;
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut paged = FilterCriteria::new(20);
    paged.set_offset(20);
    store.load(&paged).await;

    slow.await.expect("slow load task");

    // The superseded failure must not wipe the newer page.
    let items = store.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].email, "fresh@fooodis.com");
    assert_eq!(store.stats().total, 1);
}

#[tokio::test]
async fn ticket_reply_posts_message_and_categories_fall_back() {
    let server = MockServer::start();
    let cache_dir = tempfile::tempdir().expect("tempdir");
    let (context, _) = test_context(&server, &cache_dir);

    let reply = server.mock(|when, then| {
        when.method(POST)
            .path("/api/tickets/TKT-001/messages")
            .json_body_partial(r#"{"author_type": "admin", "update_status": "resolved"}"#);
        then.status(200).json_body(json!({
            "success": true,
            "data": {"message": {
                "id": "m1",
                "content": "Fixed, please check.",
                "author_type": "admin",
                "author_name": "Support Team",
                "is_internal": false,
                "created_at": "2026-08-02T00:00:00Z"
            }}
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/tickets/categories");
        then.status(500).json_body(json!({"error": "unavailable"}));
    });

    let store = context.ticket_store();
    let message = store
        .reply(
            "TKT-001",
            "Fixed, please check.",
            ReplyOptions {
                resolve: true,
                ..Default::default()
            },
        )
        .await
        .expect("reply succeeds");

    reply.assert();
    assert_eq!(message.author_name, "Support Team");

    let categories = store.categories().await;
    assert_eq!(categories.len(), 5);
    assert_eq!(categories[0].id, "general");
}

#[tokio::test]
async fn media_upload_absorbs_new_file() {
    let server = MockServer::start();
    let cache_dir = tempfile::tempdir().expect("tempdir");
    let (context, _) = test_context(&server, &cache_dir);

    server.mock(|when, then| {
        when.method(GET).path("/api/media");
        then.status(200)
            .json_body(media_page(vec![media_json("m1", "old.jpg", "uploads")], 1));
    });
    let upload = server.mock(|when, then| {
        when.method(POST).path("/api/media");
        then.status(200)
            .json_body(json!({"media": media_json("m2", "pasta.jpg", "blog-images")}));
    });

    let store = context.media_store();
    store.load(&FilterCriteria::new(20)).await;

    let file = store
        .upload(
            "pasta.jpg",
            vec![0xff, 0xd8, 0xff],
            UploadOptions {
                folder: Some("blog-images".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("upload succeeds");

    upload.assert();
    assert_eq!(file.folder, "blog-images");
    let items = store.items();
    assert_eq!(items[0].id, "m2");
    assert_eq!(items.len(), 2);
    assert_eq!(store.stats().total, 2);
}

#[tokio::test]
async fn media_batch_remove_collects_failures() {
    let server = MockServer::start();
    let cache_dir = tempfile::tempdir().expect("tempdir");
    let (context, _) = test_context(&server, &cache_dir);

    server.mock(|when, then| {
        when.method(GET).path("/api/media");
        then.status(200).json_body(media_page(
            vec![
                media_json("m1", "a.jpg", "uploads"),
                media_json("m2", "b.jpg", "uploads"),
            ],
            2,
        ));
    });
    server.mock(|when, then| {
        when.method(DELETE).path("/api/media/m1");
        then.status(204);
    });
    server.mock(|when, then| {
        when.method(DELETE).path("/api/media/m2");
        then.status(404).json_body(json!({"error": "not found"}));
    });

    let store = context.media_store();
    store.load(&FilterCriteria::new(20)).await;

    let outcome = store
        .remove_batch(&["m1".to_string(), "m2".to_string()])
        .await;

    assert_eq!(outcome.deleted, vec!["m1".to_string()]);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].0, "m2");
    assert_eq!(store.items().len(), 1);
}

#[tokio::test]
async fn unsubscribe_is_a_status_update() {
    let server = MockServer::start();
    let cache_dir = tempfile::tempdir().expect("tempdir");
    let (context, _) = test_context(&server, &cache_dir);

    server.mock(|when, then| {
        when.method(GET).path("/api/subscribers");
        then.status(200).json_body(subscribers_page(
            vec![subscriber_json("s1", "a@b.com", "active")],
            1,
        ));
    });
    let update = server.mock(|when, then| {
        when.method(PUT)
            .path("/api/subscribers/s1")
            .json_body(json!({"status": "unsubscribed"}));
        then.status(200).json_body(json!({
            "subscriber": subscriber_json("s1", "a@b.com", "unsubscribed")
        }));
    });

    let store = context.subscriber_store();
    store.load(&FilterCriteria::new(20)).await;

    let subscriber = store.unsubscribe("s1").await.expect("unsubscribe succeeds");

    update.assert();
    assert_eq!(subscriber.status, SubscriberStatus::Unsubscribed);
    assert_eq!(store.items()[0].status, SubscriberStatus::Unsubscribed);
}
