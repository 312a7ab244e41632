use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};

use crate::db::pool::Db;
use crate::error::AppError;

pub const ANONYMOUS: &str = "anonymous";

#[derive(Debug, Clone)]
pub struct NewInquiry {
    pub name: String,
    pub email: String,
    pub message: Option<String>,
    pub service: Option<String>,
    pub source: String,
    pub fields: serde_json::Map<String, serde_json::Value>,
    pub user_id: Option<String>,
}

pub async fn insert(db: &Db, inquiry: NewInquiry) -> Result<entity::inquiry::Model, AppError> {
    let fields = serde_json::to_string(&inquiry.fields)
        .map_err(|e| AppError::Internal(format!("Failed to encode inquiry fields: {e}")))?;

    let model = entity::inquiry::ActiveModel {
        id: Set(uuid::Uuid::now_v7().to_string()),
        name: Set(inquiry.name),
        email: Set(inquiry.email),
        message: Set(inquiry.message),
        service: Set(inquiry.service),
        source: Set(inquiry.source),
        fields: Set(fields),
        user_id: Set(inquiry.user_id.unwrap_or_else(|| ANONYMOUS.to_string())),
        created_at: Set(chrono::Utc::now().naive_utc()),
    };
    Ok(model.insert(db).await?)
}

pub async fn list_recent(db: &Db) -> Result<Vec<entity::inquiry::Model>, AppError> {
    let inquiries = entity::inquiry::Entity::find()
        .order_by_desc(entity::inquiry::Column::CreatedAt)
        .order_by_desc(entity::inquiry::Column::Id)
        .all(db)
        .await?;
    Ok(inquiries)
}
