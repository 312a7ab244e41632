mod common;

use axum::http::StatusCode;
use common::TestApp;
use consulting_portal::db::models::Role;
use consulting_portal::db::queries;
use serial_test::serial;

#[serial]
#[tokio::test]
async fn user_and_support_share_one_thread() {
    let app = TestApp::new().await;
    let ada = app.sign_up("ada.l@test.com").await;
    let root = app.sign_up_as("root@test.com", Role::Superadmin).await;

    let resp = app
        .post("/api/chat/messages", Some(&ada), serde_json::json!({"text": "Hi, I need help"}))
        .await;
    resp.assert_status(StatusCode::OK);
    let sent: serde_json::Value = resp.json();
    assert_eq!(sent["senderName"], "ada.l");
    assert_eq!(sent["conversationId"], ada.user_id.as_str());

    let thread = format!("/admin/conversations/{}/messages", ada.user_id);
    let resp = app
        .post(&thread, Some(&root), serde_json::json!({"text": "  Happy to help.  "}))
        .await;
    resp.assert_status(StatusCode::OK);
    let reply: serde_json::Value = resp.json();
    assert_eq!(reply["senderName"], "Support Team");
    assert_eq!(reply["text"], "Happy to help.");

    let mine: Vec<serde_json::Value> = app.get("/api/chat/messages", Some(&ada)).await.json();
    let texts: Vec<&str> = mine.iter().map(|m| m["text"].as_str().unwrap()).collect();
    assert_eq!(texts, ["Hi, I need help", "Happy to help."]);

    let admin_view: Vec<serde_json::Value> = app.get(&thread, Some(&root)).await.json();
    assert_eq!(admin_view.len(), 2);
    assert_eq!(admin_view[0]["senderId"], ada.user_id.as_str());
}

#[serial]
#[tokio::test]
async fn blank_messages_are_never_stored() {
    let app = TestApp::new().await;
    let ada = app.sign_up("ada@test.com").await;

    for text in ["", "   \n\t"] {
        let resp = app
            .post("/api/chat/messages", Some(&ada), serde_json::json!({"text": text}))
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(resp.error_code(), "validation_error");
    }

    let stored = queries::messages::list_conversation(&app.state.db, &ada.user_id)
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[serial]
#[tokio::test]
async fn conversations_are_private() {
    let app = TestApp::new().await;
    let ada = app.sign_up("ada@test.com").await;
    let bo = app.sign_up("bo@test.com").await;

    app.post("/api/chat/messages", Some(&ada), serde_json::json!({"text": "private"}))
        .await
        .assert_status(StatusCode::OK);

    let theirs: Vec<serde_json::Value> = app.get("/api/chat/messages", Some(&bo)).await.json();
    assert!(theirs.is_empty());

    app.get(&format!("/admin/conversations/{}/messages", ada.user_id), Some(&bo))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[serial]
#[tokio::test]
async fn admin_reply_needs_existing_user() {
    let app = TestApp::new().await;
    let dad = app.sign_up_as("dad@test.com", Role::Father).await;

    let resp = app
        .post(
            "/admin/conversations/nobody/messages",
            Some(&dad),
            serde_json::json!({"text": "Hello?"}),
        )
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(resp.error_code(), "user_not_found");
}

#[serial]
#[tokio::test]
async fn admin_stream_sees_user_messages() {
    let app = TestApp::new().await;
    let ada = app.sign_up("ada@test.com").await;
    let dad = app.sign_up_as("dad@test.com", Role::Father).await;

    let mut live = app
        .stream(&format!("/admin/conversations/{}/messages/stream", ada.user_id), Some(&dad))
        .await;
    assert_eq!(live.next_json().await, serde_json::json!([]));

    app.post("/api/chat/messages", Some(&ada), serde_json::json!({"text": "Anyone there?"}))
        .await
        .assert_status(StatusCode::OK);

    let snapshot = live.next_json().await;
    assert_eq!(snapshot[0]["text"], "Anyone there?");
}
