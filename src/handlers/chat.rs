use axum::{
    extract::{Path, State},
    response::{sse::Event, Sse},
    Json,
};
use futures_util::stream::Stream;
use serde::{Deserialize, Serialize};

use crate::auth::middleware::{AdminAuth, Caller, UserAuth};
use crate::db::models::Role;
use crate::db::pool::Db;
use crate::db::queries;
use crate::error::AppError;
use crate::feed::{ChangeFeed, Topic};
use crate::handlers::live;
use crate::AppState;

const SUPPORT_TEAM: &str = "Support Team";
const FALLBACK_SENDER: &str = "User";

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub conversation_id: String,
    pub text: String,
    pub sender_id: String,
    pub sender_name: String,
    pub created_at: String,
}

impl From<entity::message::Model> for MessageResponse {
    fn from(message: entity::message::Model) -> Self {
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            text: message.text,
            sender_id: message.sender_id,
            sender_name: message.sender_name,
            created_at: message.created_at.to_string(),
        }
    }
}

/// Display name stamped on a message.
fn sender_name(role: Role, email: &str) -> String {
    if role.is_admin() {
        return SUPPORT_TEAM.to_string();
    }
    match email.split('@').next() {
        Some(local) if !local.trim().is_empty() => local.to_string(),
        _ => FALLBACK_SENDER.to_string(),
    }
}

async fn conversation(db: &Db, conversation_id: &str) -> Result<Vec<MessageResponse>, AppError> {
    let messages = queries::messages::list_conversation(db, conversation_id).await?;
    Ok(messages.into_iter().map(MessageResponse::from).collect())
}

fn conversation_stream(
    state: &AppState,
    conversation_id: String,
) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    let db = state.db.clone();
    let topic = Topic::Conversation(conversation_id.clone());
    live(state.feed.snapshots(topic, move || {
        let db = db.clone();
        let conversation_id = conversation_id.clone();
        async move { conversation(&db, &conversation_id).await }
    }))
}

/// Appends to the conversation keyed by `conversation_id` (always the non-admin user's id).
async fn send(
    db: &Db,
    feed: &ChangeFeed,
    conversation_id: &str,
    sender: &Caller,
    text: &str,
) -> Result<MessageResponse, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("text: message cannot be empty".to_string()));
    }

    let name = sender_name(sender.role, &sender.email);
    let message = queries::messages::append(db, conversation_id, &sender.user_id, &name, text).await?;

    tracing::debug!(conversation_id, sender_id = %sender.user_id, "chat message appended");
    feed.publish(Topic::Conversation(conversation_id.to_string()));
    Ok(message.into())
}

// --- User side ---

pub async fn list_own(
    UserAuth(caller): UserAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    Ok(Json(conversation(&state.db, &caller.user_id).await?))
}

pub async fn stream_own(
    UserAuth(caller): UserAuth,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    conversation_stream(&state, caller.user_id)
}

pub async fn send_own(
    UserAuth(caller): UserAuth,
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let message = send(&state.db, &state.feed, &caller.user_id, &caller, &req.text).await?;
    Ok(Json(message))
}

// --- Admin side ---

pub async fn admin_list(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    Ok(Json(conversation(&state.db, &user_id).await?))
}

pub async fn admin_stream(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    conversation_stream(&state, user_id)
}

pub async fn admin_send(
    AdminAuth(admin): AdminAuth,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    queries::users::find_by_id(&state.db, &user_id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    let message = send(&state.db, &state.feed, &user_id, &admin, &req.text).await?;
    Ok(Json(message))
}
