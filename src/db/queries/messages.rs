use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::db::pool::Db;
use crate::error::AppError;

/// Appends a message; `created_at` is stamped here, never by the sender.
pub async fn append(
    db: &Db,
    conversation_id: &str,
    sender_id: &str,
    sender_name: &str,
    text: &str,
) -> Result<entity::message::Model, AppError> {
    let message = entity::message::ActiveModel {
        id: Set(uuid::Uuid::now_v7().to_string()),
        conversation_id: Set(conversation_id.to_string()),
        text: Set(text.to_string()),
        sender_id: Set(sender_id.to_string()),
        sender_name: Set(sender_name.to_string()),
        created_at: Set(chrono::Utc::now().naive_utc()),
    };
    Ok(message.insert(db).await?)
}

pub async fn list_conversation(
    db: &Db,
    conversation_id: &str,
) -> Result<Vec<entity::message::Model>, AppError> {
    let messages = entity::message::Entity::find()
        .filter(entity::message::Column::ConversationId.eq(conversation_id))
        .order_by_asc(entity::message::Column::CreatedAt)
        .order_by_asc(entity::message::Column::Id)
        .all(db)
        .await?;
    Ok(messages)
}
