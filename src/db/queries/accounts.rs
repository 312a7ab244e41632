use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, SqlErr};

use crate::db::pool::Db;
use crate::error::AppError;

pub async fn find_by_email(db: &Db, email: &str) -> Result<Option<entity::account::Model>, AppError> {
    let account = entity::account::Entity::find()
        .filter(entity::account::Column::Email.eq(email))
        .one(db)
        .await?;
    Ok(account)
}

pub async fn insert(
    db: &Db,
    email: &str,
    password_hash: String,
) -> Result<entity::account::Model, AppError> {
    let account = entity::account::ActiveModel {
        id: Set(uuid::Uuid::now_v7().to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        created_at: Set(chrono::Utc::now().naive_utc()),
    };
    account.insert(db).await.map_err(|e| match e.sql_err() {
        // A registration for the same email committed first.
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::UserAlreadyExists,
        _ => e.into(),
    })
}
