mod common;

use axum::http::StatusCode;
use common::{SignedIn, TestApp};
use consulting_portal::db::models::Role;
use serial_test::serial;

fn ids(events: &serde_json::Value) -> Vec<String> {
    events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap().to_string())
        .collect()
}

async fn public_ids(app: &TestApp) -> Vec<String> {
    let resp = app.get("/api/public-events", None).await;
    resp.assert_status(StatusCode::OK);
    ids(&resp.json())
}

async fn admin_queue(app: &TestApp, admin: &SignedIn) -> serde_json::Value {
    let resp = app.get("/admin/public-events", Some(admin)).await;
    resp.assert_status(StatusCode::OK);
    resp.json()
}

// ─── Scenario A: create then approve ─────────────────────────────────────────

#[serial]
#[tokio::test]
async fn approved_event_moves_from_pending_to_public_listing() {
    let app = TestApp::new().await;
    let father = app.sign_up_as("dad@test.com", Role::Father).await;

    let later = app.create_public_event(&father, "Essay Clinic", "2025-10-15").await;
    let later_id = later["id"].as_str().unwrap();
    app.post(&format!("/admin/public-events/{later_id}/approve"), Some(&father), serde_json::json!({}))
        .await
        .assert_status(StatusCode::OK);

    let body = serde_json::json!({
        "title": "Info Night",
        "description": "Meet the counsellors.",
        "imageUrl": "https://example.com/info.png",
        "location": "Library",
        "time": "19:00",
        "date": "2025-09-01",
        "type": "Info Session",
    });
    let resp = app.post("/admin/public-events", Some(&father), body).await;
    resp.assert_status(StatusCode::OK);
    let event: serde_json::Value = resp.json();
    let id = event["id"].as_str().unwrap().to_string();
    assert_eq!(event["status"], "pending");

    let queue = admin_queue(&app, &father).await;
    assert!(ids(&queue["pending"]).contains(&id));
    assert!(!public_ids(&app).await.contains(&id));

    let resp = app
        .post(&format!("/admin/public-events/{id}/approve"), Some(&father), serde_json::json!({}))
        .await;
    resp.assert_status(StatusCode::OK);
    let approved: serde_json::Value = resp.json();
    assert_eq!(approved["status"], "approved");
    assert!(approved["rejectionReason"].is_null());

    // Ordered by date: Info Night (Sept) before Essay Clinic (Oct).
    assert_eq!(public_ids(&app).await, vec![id.clone(), later_id.to_string()]);
    let queue = admin_queue(&app, &father).await;
    assert!(!ids(&queue["pending"]).contains(&id));
    assert!(ids(&queue["historical"]).contains(&id));
}

// ─── Scenario B: reject needs a reason ───────────────────────────────────────

#[serial]
#[tokio::test]
async fn rejection_requires_reason_and_lands_in_history() {
    let app = TestApp::new().await;
    let father = app.sign_up_as("dad@test.com", Role::Father).await;
    let event = app.create_public_event(&father, "Visa Q&A", "2025-11-02").await;
    let id = event["id"].as_str().unwrap();

    let resp = app
        .post(&format!("/admin/public-events/{id}/reject"), Some(&father), serde_json::json!({"reason": ""}))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_code(), "validation_error");

    let queue = admin_queue(&app, &father).await;
    assert_eq!(ids(&queue["pending"]), vec![id.to_string()]);

    let resp = app
        .post(
            &format!("/admin/public-events/{id}/reject"),
            Some(&father),
            serde_json::json!({"reason": "Image too small"}),
        )
        .await;
    resp.assert_status(StatusCode::OK);

    let queue = admin_queue(&app, &father).await;
    assert!(queue["pending"].as_array().unwrap().is_empty());
    let historical = &queue["historical"][0];
    assert_eq!(historical["id"], id);
    assert_eq!(historical["status"], "rejected");
    assert_eq!(historical["rejectionReason"], "Image too small");
    assert!(public_ids(&app).await.is_empty());
}

// ─── Transition table over HTTP ──────────────────────────────────────────────

#[serial]
#[tokio::test]
async fn terminal_states_do_not_cross() {
    let app = TestApp::new().await;
    let father = app.sign_up_as("dad@test.com", Role::Father).await;
    let event = app.create_public_event(&father, "Workshop", "2025-09-09").await;
    let id = event["id"].as_str().unwrap();
    let approve = format!("/admin/public-events/{id}/approve");
    let reject = format!("/admin/public-events/{id}/reject");

    app.post(&approve, Some(&father), serde_json::json!({}))
        .await
        .assert_status(StatusCode::OK);
    // Approving again is a permitted no-op.
    app.post(&approve, Some(&father), serde_json::json!({}))
        .await
        .assert_status(StatusCode::OK);

    let resp = app
        .post(&reject, Some(&father), serde_json::json!({"reason": "Changed my mind"}))
        .await;
    resp.assert_status(StatusCode::CONFLICT);
    assert_eq!(resp.error_code(), "invalid_transition");
}

#[serial]
#[tokio::test]
async fn only_fathers_moderate() {
    let app = TestApp::new().await;
    let father = app.sign_up_as("dad@test.com", Role::Father).await;
    let root = app.sign_up_as("root@test.com", Role::Superadmin).await;
    let user = app.sign_up("user@test.com").await;

    // Superadmins may submit events but not judge them.
    let event = app.create_public_event(&root, "Open Day", "2025-09-20").await;
    let id = event["id"].as_str().unwrap();

    for caller in [&root, &user] {
        app.post(&format!("/admin/public-events/{id}/approve"), Some(caller), serde_json::json!({}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
        app.delete(&format!("/admin/public-events/{id}?confirm=true"), Some(caller))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    let queue = admin_queue(&app, &father).await;
    assert_eq!(queue["pending"][0]["status"], "pending");
}

#[serial]
#[tokio::test]
async fn delete_requires_confirmation() {
    let app = TestApp::new().await;
    let father = app.sign_up_as("dad@test.com", Role::Father).await;
    let event = app.create_public_event(&father, "Scholarship Talk", "2025-12-01").await;
    let id = event["id"].as_str().unwrap();

    let resp = app
        .delete(&format!("/admin/public-events/{id}"), Some(&father))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_code(), "confirmation_required");

    app.delete(&format!("/admin/public-events/{id}?confirm=true"), Some(&father))
        .await
        .assert_status(StatusCode::OK);
    app.delete(&format!("/admin/public-events/{id}?confirm=true"), Some(&father))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let queue = admin_queue(&app, &father).await;
    assert!(queue["pending"].as_array().unwrap().is_empty());
}

#[serial]
#[tokio::test]
async fn public_events_refuse_deadline_type() {
    let app = TestApp::new().await;
    let father = app.sign_up_as("dad@test.com", Role::Father).await;

    let body = serde_json::json!({
        "title": "Early Action",
        "description": "Deadline reminder.",
        "imageUrl": "https://example.com/d.png",
        "location": "Online",
        "time": "23:59",
        "date": "2025-11-01",
        "type": "Deadline",
    });
    let resp = app.post("/admin/public-events", Some(&father), body).await;
    resp.assert_status(StatusCode::BAD_REQUEST);
}

// ─── Public visibility ───────────────────────────────────────────────────────

#[serial]
#[tokio::test]
async fn public_listing_only_ever_shows_approved() {
    let app = TestApp::new().await;
    let father = app.sign_up_as("dad@test.com", Role::Father).await;

    let mut approved = Vec::new();
    for (n, date) in ["2025-09-03", "2025-09-01", "2025-09-02", "2025-09-04"].iter().enumerate() {
        let event = app.create_public_event(&father, &format!("Event {n}"), date).await;
        let id = event["id"].as_str().unwrap().to_string();
        match n {
            0 | 1 => {
                app.post(&format!("/admin/public-events/{id}/approve"), Some(&father), serde_json::json!({}))
                    .await
                    .assert_status(StatusCode::OK);
                approved.push((date.to_string(), id));
            }
            2 => {
                app.post(
                    &format!("/admin/public-events/{id}/reject"),
                    Some(&father),
                    serde_json::json!({"reason": "Duplicate"}),
                )
                .await
                .assert_status(StatusCode::OK);
            }
            _ => {}
        }
    }

    let listed: Vec<serde_json::Value> = app.get("/api/public-events", None).await.json();
    assert!(listed.iter().all(|e| e["status"] == "approved"));
    approved.sort();
    let expected: Vec<String> = approved.into_iter().map(|(_, id)| id).collect();
    let got: Vec<String> = listed.iter().map(|e| e["id"].as_str().unwrap().to_string()).collect();
    assert_eq!(got, expected);
}

#[serial]
#[tokio::test]
async fn public_stream_pushes_new_approvals() {
    let app = TestApp::new().await;
    let father = app.sign_up_as("dad@test.com", Role::Father).await;
    let event = app.create_public_event(&father, "Live Launch", "2025-09-30").await;
    let id = event["id"].as_str().unwrap();

    let mut live = app.stream("/api/public-events/stream", None).await;
    assert_eq!(live.next_json().await, serde_json::json!([]));

    app.post(&format!("/admin/public-events/{id}/approve"), Some(&father), serde_json::json!({}))
        .await
        .assert_status(StatusCode::OK);

    let snapshot = live.next_json().await;
    assert_eq!(snapshot[0]["id"], id);
}

// ─── Global events ───────────────────────────────────────────────────────────

#[serial]
#[tokio::test]
async fn global_events_are_admin_managed() {
    let app = TestApp::new().await;
    let root = app.sign_up_as("root@test.com", Role::Superadmin).await;
    let user = app.sign_up("user@test.com").await;

    let body = serde_json::json!({"title": "UCAS deadline", "type": "Deadline", "date": "2025-10-15"});
    app.post("/admin/global-events", Some(&user), body.clone())
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let resp = app.post("/admin/global-events", Some(&root), body).await;
    resp.assert_status(StatusCode::OK);
    let created: serde_json::Value = resp.json();
    assert_eq!(created["creatorEmail"], "root@test.com");

    let listed: Vec<serde_json::Value> = app.get("/api/global-events", Some(&user)).await.json();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["type"], "Deadline");

    let id = created["id"].as_str().unwrap();
    app.delete(&format!("/admin/global-events/{id}"), Some(&root))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    app.delete(&format!("/admin/global-events/{id}?confirm=true"), Some(&root))
        .await
        .assert_status(StatusCode::OK);

    let listed: Vec<serde_json::Value> = app.get("/api/global-events", Some(&user)).await.json();
    assert!(listed.is_empty());
}

#[serial]
#[tokio::test]
async fn global_event_streams_follow_admin_writes() {
    let app = TestApp::new().await;
    let root = app.sign_up_as("root@test.com", Role::Superadmin).await;
    let user = app.sign_up("user@test.com").await;

    let mut dashboard = app.stream("/api/global-events/stream", Some(&user)).await;
    let mut panel = app.stream("/admin/global-events/stream", Some(&root)).await;
    assert_eq!(dashboard.next_json().await, serde_json::json!([]));
    assert_eq!(panel.next_json().await, serde_json::json!([]));

    let body = serde_json::json!({"title": "Common App opens", "type": "Deadline", "date": "2025-08-01"});
    let created: serde_json::Value = app.post("/admin/global-events", Some(&root), body).await.json();

    assert_eq!(dashboard.next_json().await[0]["title"], "Common App opens");
    assert_eq!(panel.next_json().await[0]["id"], created["id"]);

    let id = created["id"].as_str().unwrap();
    app.delete(&format!("/admin/global-events/{id}?confirm=true"), Some(&root))
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(dashboard.next_json().await, serde_json::json!([]));
}
