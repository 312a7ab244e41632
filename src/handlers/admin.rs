use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    response::{sse::Event, Sse},
    Json,
};
use futures_util::stream::Stream;
use serde::{Deserialize, Serialize};

use crate::auth::middleware::{AdminAuth, FatherAuth};
use crate::db::models::{ApplicationStatus, EventStatus, Role};
use crate::db::pool::Db;
use crate::db::queries;
use crate::error::AppError;
use crate::feed::Topic;
use crate::handlers::live;
use crate::AppState;

// --- Request / Response types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

impl From<entity::user::Model> for UserResponse {
    fn from(user: entity::user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            created_at: user.created_at.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub users: u64,
    pub applications: ApplicationStats,
    pub pending_public_events: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStats {
    pub total: u64,
    pub by_status: BTreeMap<&'static str, u64>,
}

// --- Handlers ---

async fn users(db: &Db) -> Result<Vec<UserResponse>, AppError> {
    let users = queries::users::list_all(db).await?;
    Ok(users.into_iter().map(UserResponse::from).collect())
}

pub async fn list_users(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    Ok(Json(users(&state.db).await?))
}

/// Every profile write publishes `users/{id}`, which also wakes this stream.
pub async fn stream_users(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    let db = state.db.clone();
    live(state.feed.snapshots(Topic::Users, move || {
        let db = db.clone();
        async move { users(&db).await }
    }))
}

pub async fn update_role(
    FatherAuth(father): FatherAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let role: Role = req.role.parse()?;
    let user = queries::users::set_role(&state.db, &id, role).await?;

    tracing::info!(user_id = %id, role = role.as_str(), by = %father.user_id, "role changed");
    state.feed.publish(Topic::User(id));
    Ok(Json(user.into()))
}

pub async fn stats(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, AppError> {
    let users = queries::users::count_all(&state.db).await?;
    let total = queries::applications::count_all(&state.db).await?;

    let mut by_status = BTreeMap::new();
    for status in ApplicationStatus::ALL {
        let count = queries::applications::count_by_status(&state.db, status).await?;
        by_status.insert(status.as_str(), count);
    }

    let pending_public_events =
        queries::events::count_public_by_status(&state.db, EventStatus::Pending).await?;

    Ok(Json(StatsResponse {
        users,
        applications: ApplicationStats { total, by_status },
        pending_public_events,
    }))
}
