//! Starter tasks and documents. Both are owner-scoped boolean checklists.

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::db::pool::Db;
use crate::error::AppError;

pub async fn list_tasks(db: &Db, user_id: &str) -> Result<Vec<entity::task::Model>, AppError> {
    let tasks = entity::task::Entity::find()
        .filter(entity::task::Column::UserId.eq(user_id))
        .order_by_asc(entity::task::Column::CreatedAt)
        .order_by_asc(entity::task::Column::Id)
        .all(db)
        .await?;
    Ok(tasks)
}

pub async fn list_documents(db: &Db, user_id: &str) -> Result<Vec<entity::document::Model>, AppError> {
    let documents = entity::document::Entity::find()
        .filter(entity::document::Column::UserId.eq(user_id))
        .order_by_asc(entity::document::Column::CreatedAt)
        .order_by_asc(entity::document::Column::Id)
        .all(db)
        .await?;
    Ok(documents)
}

/// Flips `completed`. Another user's task is reported as missing.
pub async fn toggle_task(db: &Db, user_id: &str, id: &str) -> Result<entity::task::Model, AppError> {
    let task = entity::task::Entity::find_by_id(id)
        .filter(entity::task::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(AppError::TaskNotFound)?;

    let completed = !task.completed;
    let mut active: entity::task::ActiveModel = task.into();
    active.completed = Set(completed);
    Ok(active.update(db).await?)
}

/// Flips `uploaded`. Another user's document is reported as missing.
pub async fn toggle_document(
    db: &Db,
    user_id: &str,
    id: &str,
) -> Result<entity::document::Model, AppError> {
    let document = entity::document::Entity::find_by_id(id)
        .filter(entity::document::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(AppError::DocumentNotFound)?;

    let uploaded = !document.uploaded;
    let mut active: entity::document::ActiveModel = document.into();
    active.uploaded = Set(uploaded);
    Ok(active.update(db).await?)
}
