use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};

use crate::db::models::ApplicationStatus;
use crate::db::pool::Db;
use crate::error::AppError;

pub async fn insert(
    db: &Db,
    user_id: &str,
    university: &str,
    program: &str,
    due_date: NaiveDate,
) -> Result<entity::application::Model, AppError> {
    let application = entity::application::ActiveModel {
        id: Set(uuid::Uuid::now_v7().to_string()),
        user_id: Set(user_id.to_string()),
        university: Set(university.to_string()),
        program: Set(program.to_string()),
        status: Set(ApplicationStatus::NotStarted.as_str().to_string()),
        due_date: Set(due_date),
        created_at: Set(chrono::Utc::now().naive_utc()),
    };
    Ok(application.insert(db).await?)
}

/// Any status may follow any other; there is no forward-only rule.
pub async fn set_status(
    db: &Db,
    id: &str,
    status: ApplicationStatus,
) -> Result<entity::application::Model, AppError> {
    let application = entity::application::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::ApplicationNotFound)?;

    let mut active: entity::application::ActiveModel = application.into();
    active.status = Set(status.as_str().to_string());
    active.update(db).await.map_err(|e| match e {
        DbErr::RecordNotUpdated => AppError::ApplicationNotFound,
        e => e.into(),
    })
}

pub async fn list_by_user(db: &Db, user_id: &str) -> Result<Vec<entity::application::Model>, AppError> {
    let applications = entity::application::Entity::find()
        .filter(entity::application::Column::UserId.eq(user_id))
        .order_by_asc(entity::application::Column::CreatedAt)
        .order_by_asc(entity::application::Column::Id)
        .all(db)
        .await?;
    Ok(applications)
}

/// Every application paired with its owner's profile, if the profile exists.
pub async fn list_all_with_owner(
    db: &Db,
) -> Result<Vec<(entity::application::Model, Option<entity::user::Model>)>, AppError> {
    let rows = entity::application::Entity::find()
        .find_also_related(entity::user::Entity)
        .order_by_asc(entity::application::Column::CreatedAt)
        .order_by_asc(entity::application::Column::Id)
        .all(db)
        .await?;
    Ok(rows)
}

pub async fn count_all(db: &Db) -> Result<u64, AppError> {
    Ok(entity::application::Entity::find().count(db).await?)
}

pub async fn count_by_status(db: &Db, status: ApplicationStatus) -> Result<u64, AppError> {
    let count = entity::application::Entity::find()
        .filter(entity::application::Column::Status.eq(status.as_str()))
        .count(db)
        .await?;
    Ok(count)
}
