use axum::{
    extract::{Path, Query, State},
    response::{sse::Event, Sse},
    Json,
};
use chrono::NaiveDate;
use futures_util::stream::Stream;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::middleware::{AdminAuth, AuthenticatedUser, FatherAuth};
use crate::db::models::EventType;
use crate::db::pool::Db;
use crate::db::queries::{self, events::Creator};
use crate::error::AppError;
use crate::feed::Topic;
use crate::handlers::{live, ConfirmQuery};
use crate::moderation::{self, ModerationAction};
use crate::AppState;

// --- Request / Response types ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGlobalEventRequest {
    #[validate(length(min = 1, max = 200, message = "is required"))]
    pub title: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalEventResponse {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub date: NaiveDate,
    pub creator_id: String,
    pub creator_email: String,
    pub created_at: String,
}

impl From<entity::global_event::Model> for GlobalEventResponse {
    fn from(event: entity::global_event::Model) -> Self {
        Self {
            id: event.id,
            title: event.title,
            event_type: event.event_type,
            date: event.date,
            creator_id: event.creator_id,
            creator_email: event.creator_email,
            created_at: event.created_at.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePublicEventRequest {
    #[validate(length(min = 1, max = 200, message = "is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 5000, message = "is required"))]
    pub description: String,
    #[validate(url(message = "must be a valid URL"))]
    pub image_url: String,
    #[validate(length(min = 1, max = 200, message = "is required"))]
    pub location: String,
    #[validate(length(min = 1, max = 50, message = "is required"))]
    pub time: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub event_type: String,
    #[validate(url(message = "must be a valid URL"))]
    pub registration_link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicEventResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub location: String,
    pub time: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub event_type: String,
    pub registration_link: Option<String>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub creator_id: String,
    pub creator_email: String,
    pub created_at: String,
}

impl From<entity::public_event::Model> for PublicEventResponse {
    fn from(event: entity::public_event::Model) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            image_url: event.image_url,
            location: event.location,
            time: event.time,
            date: event.date,
            event_type: event.event_type,
            registration_link: event.registration_link,
            status: event.status,
            rejection_reason: event.rejection_reason,
            creator_id: event.creator_id,
            creator_email: event.creator_email,
            created_at: event.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModerationQueueResponse {
    pub pending: Vec<PublicEventResponse>,
    pub historical: Vec<PublicEventResponse>,
}

async fn approved(db: &Db) -> Result<Vec<PublicEventResponse>, AppError> {
    let events = queries::events::list_approved(db).await?;
    Ok(events.into_iter().map(PublicEventResponse::from).collect())
}

async fn moderation_queue(db: &Db) -> Result<ModerationQueueResponse, AppError> {
    let partitioned = moderation::partition(queries::events::list_all_public(db).await?);
    Ok(ModerationQueueResponse {
        pending: partitioned.pending.into_iter().map(Into::into).collect(),
        historical: partitioned.historical.into_iter().map(Into::into).collect(),
    })
}

// --- Global events ---

async fn global(db: &Db) -> Result<Vec<GlobalEventResponse>, AppError> {
    let events = queries::events::list_global(db).await?;
    Ok(events.into_iter().map(GlobalEventResponse::from).collect())
}

fn global_stream(state: &AppState) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    let db = state.db.clone();
    live(state.feed.snapshots(Topic::GlobalEvents, move || {
        let db = db.clone();
        async move { global(&db).await }
    }))
}

pub async fn list_global(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<GlobalEventResponse>>, AppError> {
    Ok(Json(global(&state.db).await?))
}

pub async fn stream_global(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    global_stream(&state)
}

pub async fn admin_list_global(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<GlobalEventResponse>>, AppError> {
    Ok(Json(global(&state.db).await?))
}

pub async fn admin_stream_global(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    global_stream(&state)
}

pub async fn create_global(
    AdminAuth(admin): AdminAuth,
    State(state): State<AppState>,
    Json(req): Json<CreateGlobalEventRequest>,
) -> Result<Json<GlobalEventResponse>, AppError> {
    req.validate()?;
    let event_type: EventType = req.event_type.parse()?;

    let creator = Creator {
        id: &admin.user_id,
        email: &admin.email,
    };
    let event =
        queries::events::insert_global(&state.db, req.title.trim(), event_type, req.date, creator)
            .await?;

    tracing::info!(event_id = %event.id, by = %admin.user_id, "global event created");
    state.feed.publish(Topic::GlobalEvents);
    Ok(Json(event.into()))
}

pub async fn delete_global(
    AdminAuth(admin): AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !query.confirm {
        return Err(AppError::ConfirmationRequired);
    }
    queries::events::delete_global(&state.db, &id).await?;

    tracing::info!(event_id = %id, by = %admin.user_id, "global event deleted");
    state.feed.publish(Topic::GlobalEvents);
    Ok(Json(serde_json::json!({"status": "ok"})))
}

// --- Public events ---

pub async fn list_public(State(state): State<AppState>) -> Result<Json<Vec<PublicEventResponse>>, AppError> {
    Ok(Json(approved(&state.db).await?))
}

pub async fn stream_public(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    let db = state.db.clone();
    live(state.feed.snapshots(Topic::PublicEvents, move || {
        let db = db.clone();
        async move { approved(&db).await }
    }))
}

pub async fn create_public(
    AdminAuth(admin): AdminAuth,
    State(state): State<AppState>,
    Json(req): Json<CreatePublicEventRequest>,
) -> Result<Json<PublicEventResponse>, AppError> {
    req.validate()?;
    let event_type: EventType = req.event_type.parse()?;
    if !event_type.allowed_for_public() {
        return Err(AppError::Validation(format!(
            "type: '{}' is not allowed for public events",
            event_type.as_str()
        )));
    }

    let new_event = queries::events::NewPublicEvent {
        title: req.title.trim().to_string(),
        description: req.description.trim().to_string(),
        image_url: req.image_url,
        location: req.location.trim().to_string(),
        time: req.time.trim().to_string(),
        date: req.date,
        event_type,
        registration_link: req.registration_link.filter(|link| !link.trim().is_empty()),
    };
    let creator = Creator {
        id: &admin.user_id,
        email: &admin.email,
    };
    let event = queries::events::insert_public(&state.db, new_event, creator).await?;

    tracing::info!(event_id = %event.id, by = %admin.user_id, "public event submitted for review");
    state.feed.publish(Topic::PublicEvents);
    Ok(Json(event.into()))
}

pub async fn admin_list_public(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<ModerationQueueResponse>, AppError> {
    Ok(Json(moderation_queue(&state.db).await?))
}

pub async fn admin_stream_public(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    let db = state.db.clone();
    live(state.feed.snapshots(Topic::PublicEvents, move || {
        let db = db.clone();
        async move { moderation_queue(&db).await }
    }))
}

pub async fn approve(
    FatherAuth(father): FatherAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublicEventResponse>, AppError> {
    let event =
        moderation::moderate(&state.db, &state.feed, father.role, &id, ModerationAction::Approve)
            .await?;
    Ok(Json(event.into()))
}

pub async fn reject(
    FatherAuth(father): FatherAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RejectRequest>,
) -> Result<Json<PublicEventResponse>, AppError> {
    let action = ModerationAction::reject(&req.reason)?;
    let event = moderation::moderate(&state.db, &state.feed, father.role, &id, action).await?;
    Ok(Json(event.into()))
}

pub async fn delete_public(
    FatherAuth(father): FatherAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    moderation::delete(&state.db, &state.feed, father.role, &id, query.confirm).await?;
    Ok(Json(serde_json::json!({"status": "ok"})))
}
