use axum::{
    extract::{Path, State},
    response::{sse::Event, Sse},
    Json,
};
use chrono::NaiveDate;
use futures_util::stream::Stream;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::middleware::{AdminAuth, UserAuth};
use crate::db::models::ApplicationStatus;
use crate::db::pool::Db;
use crate::db::queries;
use crate::error::AppError;
use crate::feed::Topic;
use crate::handlers::live;
use crate::AppState;

// --- Request / Response types ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    #[validate(length(min = 1, max = 200, message = "is required"))]
    pub university: String,
    #[validate(length(min = 1, max = 200, message = "is required"))]
    pub program: String,
    pub due_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: String,
    pub user_id: String,
    pub university: String,
    pub program: String,
    pub status: String,
    pub due_date: NaiveDate,
    pub created_at: String,
}

impl From<entity::application::Model> for ApplicationResponse {
    fn from(application: entity::application::Model) -> Self {
        Self {
            id: application.id,
            user_id: application.user_id,
            university: application.university,
            program: application.program,
            status: application.status,
            due_date: application.due_date,
            created_at: application.created_at.to_string(),
        }
    }
}

/// Admin row: the application plus its owner's email.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminApplicationResponse {
    #[serde(flatten)]
    pub application: ApplicationResponse,
    pub user_email: String,
}

const UNKNOWN_OWNER: &str = "Unknown";

async fn mine(db: &Db, user_id: &str) -> Result<Vec<ApplicationResponse>, AppError> {
    let applications = queries::applications::list_by_user(db, user_id).await?;
    Ok(applications.into_iter().map(ApplicationResponse::from).collect())
}

async fn everyone(db: &Db) -> Result<Vec<AdminApplicationResponse>, AppError> {
    let rows = queries::applications::list_all_with_owner(db).await?;
    Ok(rows
        .into_iter()
        .map(|(application, owner)| AdminApplicationResponse {
            application: application.into(),
            user_email: owner.map_or_else(|| UNKNOWN_OWNER.to_string(), |user| user.email),
        })
        .collect())
}

// --- User handlers ---

pub async fn create(
    UserAuth(caller): UserAuth,
    State(state): State<AppState>,
    Json(req): Json<CreateApplicationRequest>,
) -> Result<Json<ApplicationResponse>, AppError> {
    req.validate()?;

    let application = queries::applications::insert(
        &state.db,
        &caller.user_id,
        req.university.trim(),
        req.program.trim(),
        req.due_date,
    )
    .await?;

    tracing::info!(application_id = %application.id, user_id = %caller.user_id, "application created");
    state.feed.publish(Topic::Applications);
    Ok(Json(application.into()))
}

pub async fn list_mine(
    UserAuth(caller): UserAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<ApplicationResponse>>, AppError> {
    Ok(Json(mine(&state.db, &caller.user_id).await?))
}

pub async fn stream_mine(
    UserAuth(caller): UserAuth,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    let db = state.db.clone();
    let user_id = caller.user_id;
    live(state.feed.snapshots(Topic::Applications, move || {
        let db = db.clone();
        let user_id = user_id.clone();
        async move { mine(&db, &user_id).await }
    }))
}

// --- Admin handlers ---

pub async fn list_all(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminApplicationResponse>>, AppError> {
    Ok(Json(everyone(&state.db).await?))
}

pub async fn stream_all(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    let db = state.db.clone();
    live(state.feed.snapshots(Topic::Applications, move || {
        let db = db.clone();
        async move { everyone(&db).await }
    }))
}

pub async fn update_status(
    AdminAuth(admin): AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ApplicationResponse>, AppError> {
    let status: ApplicationStatus = req.status.parse()?;
    let application = queries::applications::set_status(&state.db, &id, status).await?;

    tracing::info!(application_id = %id, status = status.as_str(), by = %admin.user_id, "application status changed");
    state.feed.publish(Topic::Applications);
    Ok(Json(application.into()))
}
