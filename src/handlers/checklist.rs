use axum::{
    extract::{Path, State},
    response::{sse::Event, Sse},
    Json,
};
use futures_util::stream::Stream;
use serde::Serialize;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::pool::Db;
use crate::db::queries;
use crate::error::AppError;
use crate::feed::Topic;
use crate::handlers::live;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: String,
    pub text: String,
    pub uploaded: bool,
}

impl From<entity::task::Model> for TaskResponse {
    fn from(task: entity::task::Model) -> Self {
        Self {
            id: task.id,
            text: task.text,
            completed: task.completed,
        }
    }
}

impl From<entity::document::Model> for DocumentResponse {
    fn from(document: entity::document::Model) -> Self {
        Self {
            id: document.id,
            text: document.text,
            uploaded: document.uploaded,
        }
    }
}

async fn tasks(db: &Db, user_id: &str) -> Result<Vec<TaskResponse>, AppError> {
    let tasks = queries::checklist::list_tasks(db, user_id).await?;
    Ok(tasks.into_iter().map(TaskResponse::from).collect())
}

async fn documents(db: &Db, user_id: &str) -> Result<Vec<DocumentResponse>, AppError> {
    let documents = queries::checklist::list_documents(db, user_id).await?;
    Ok(documents.into_iter().map(DocumentResponse::from).collect())
}

pub async fn list_tasks(
    user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskResponse>>, AppError> {
    Ok(Json(tasks(&state.db, &user.user_id).await?))
}

pub async fn stream_tasks(
    user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    let db = state.db.clone();
    let user_id = user.user_id;
    live(state.feed.snapshots(Topic::Tasks(user_id.clone()), move || {
        let db = db.clone();
        let user_id = user_id.clone();
        async move { tasks(&db, &user_id).await }
    }))
}

pub async fn toggle_task(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, AppError> {
    let task = queries::checklist::toggle_task(&state.db, &user.user_id, &id).await?;
    state.feed.publish(Topic::Tasks(user.user_id));
    Ok(Json(task.into()))
}

pub async fn list_documents(
    user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<DocumentResponse>>, AppError> {
    Ok(Json(documents(&state.db, &user.user_id).await?))
}

pub async fn stream_documents(
    user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    let db = state.db.clone();
    let user_id = user.user_id;
    live(state.feed.snapshots(Topic::Documents(user_id.clone()), move || {
        let db = db.clone();
        let user_id = user_id.clone();
        async move { documents(&db, &user_id).await }
    }))
}

pub async fn toggle_document(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DocumentResponse>, AppError> {
    let document = queries::checklist::toggle_document(&state.db, &user.user_id, &id).await?;
    state.feed.publish(Topic::Documents(user.user_id));
    Ok(Json(document.into()))
}
