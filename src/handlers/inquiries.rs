use axum::{
    extract::State,
    response::{sse::Event, Sse},
    Json,
};
use futures_util::stream::Stream;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::middleware::{AdminAuth, AuthenticatedUser};
use crate::db::pool::Db;
use crate::db::queries::{self, inquiries::NewInquiry};
use crate::error::AppError;
use crate::feed::Topic;
use crate::handlers::live;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInquiryRequest {
    #[validate(length(min = 2, max = 100, message = "must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 10, max = 500, message = "must be between 10 and 500 characters"))]
    pub message: Option<String>,
    pub service: Option<String>,
    #[validate(length(min = 1, max = 100, message = "is required"))]
    pub source: String,
    /// Any extra form fields, stored as given.
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: Option<String>,
    pub service: Option<String>,
    pub source: String,
    pub fields: serde_json::Value,
    pub user_id: String,
    pub created_at: String,
}

impl From<entity::inquiry::Model> for InquiryResponse {
    fn from(inquiry: entity::inquiry::Model) -> Self {
        Self {
            fields: serde_json::from_str(&inquiry.fields)
                .unwrap_or_else(|_| serde_json::Value::Object(Default::default())),
            id: inquiry.id,
            name: inquiry.name,
            email: inquiry.email,
            message: inquiry.message,
            service: inquiry.service,
            source: inquiry.source,
            user_id: inquiry.user_id,
            created_at: inquiry.created_at.to_string(),
        }
    }
}

/// Accepts an inquiry from anyone; a valid bearer attaches the submitter's id.
pub async fn create(
    user: Option<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(req): Json<CreateInquiryRequest>,
) -> Result<Json<InquiryResponse>, AppError> {
    let message = req.message.map(|m| m.trim().to_string()).filter(|m| !m.is_empty());
    let req = CreateInquiryRequest {
        name: req.name.trim().to_string(),
        email: req.email.trim().to_string(),
        message,
        service: req.service.filter(|s| !s.trim().is_empty()),
        source: req.source.trim().to_string(),
        fields: req.fields,
    };
    req.validate()?;

    let inquiry = queries::inquiries::insert(
        &state.db,
        NewInquiry {
            name: req.name,
            email: req.email,
            message: req.message,
            service: req.service,
            source: req.source,
            fields: req.fields,
            user_id: user.map(|u| u.user_id),
        },
    )
    .await?;

    tracing::info!(inquiry_id = %inquiry.id, source = %inquiry.source, "inquiry received");
    state.feed.publish(Topic::Inquiries);
    Ok(Json(inquiry.into()))
}

async fn recent(db: &Db) -> Result<Vec<InquiryResponse>, AppError> {
    let inquiries = queries::inquiries::list_recent(db).await?;
    Ok(inquiries.into_iter().map(InquiryResponse::from).collect())
}

pub async fn list(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<InquiryResponse>>, AppError> {
    Ok(Json(recent(&state.db).await?))
}

pub async fn stream(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    let db = state.db.clone();
    live(state.feed.snapshots(Topic::Inquiries, move || {
        let db = db.clone();
        async move { recent(&db).await }
    }))
}
