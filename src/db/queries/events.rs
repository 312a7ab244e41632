use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::db::models::{EventStatus, EventType};
use crate::db::pool::Db;
use crate::error::AppError;

/// Who created an event.
#[derive(Debug, Clone)]
pub struct Creator<'a> {
    pub id: &'a str,
    pub email: &'a str,
}

#[derive(Debug, Clone)]
pub struct NewPublicEvent {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub location: String,
    pub time: String,
    pub date: NaiveDate,
    pub event_type: EventType,
    pub registration_link: Option<String>,
}

// --- Global events ---

pub async fn insert_global(
    db: &Db,
    title: &str,
    event_type: EventType,
    date: NaiveDate,
    creator: Creator<'_>,
) -> Result<entity::global_event::Model, AppError> {
    let event = entity::global_event::ActiveModel {
        id: Set(uuid::Uuid::now_v7().to_string()),
        title: Set(title.to_string()),
        event_type: Set(event_type.as_str().to_string()),
        date: Set(date),
        creator_id: Set(creator.id.to_string()),
        creator_email: Set(creator.email.to_string()),
        created_at: Set(chrono::Utc::now().naive_utc()),
    };
    Ok(event.insert(db).await?)
}

pub async fn list_global(db: &Db) -> Result<Vec<entity::global_event::Model>, AppError> {
    let events = entity::global_event::Entity::find()
        .order_by_asc(entity::global_event::Column::Date)
        .order_by_asc(entity::global_event::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(events)
}

pub async fn delete_global(db: &Db, id: &str) -> Result<(), AppError> {
    let result = entity::global_event::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::EventNotFound);
    }
    Ok(())
}

// --- Public events ---

pub async fn insert_public(
    db: &Db,
    event: NewPublicEvent,
    creator: Creator<'_>,
) -> Result<entity::public_event::Model, AppError> {
    let model = entity::public_event::ActiveModel {
        id: Set(uuid::Uuid::now_v7().to_string()),
        title: Set(event.title),
        description: Set(event.description),
        image_url: Set(event.image_url),
        location: Set(event.location),
        time: Set(event.time),
        date: Set(event.date),
        event_type: Set(event.event_type.as_str().to_string()),
        registration_link: Set(event.registration_link),
        status: Set(EventStatus::Pending.as_str().to_string()),
        rejection_reason: Set(None),
        creator_id: Set(creator.id.to_string()),
        creator_email: Set(creator.email.to_string()),
        created_at: Set(chrono::Utc::now().naive_utc()),
    };
    Ok(model.insert(db).await?)
}

pub async fn find_public(db: &Db, id: &str) -> Result<Option<entity::public_event::Model>, AppError> {
    Ok(entity::public_event::Entity::find_by_id(id).one(db).await?)
}

/// Approved events only, soonest first.
pub async fn list_approved(db: &Db) -> Result<Vec<entity::public_event::Model>, AppError> {
    let events = entity::public_event::Entity::find()
        .filter(entity::public_event::Column::Status.eq(EventStatus::Approved.as_str()))
        .order_by_asc(entity::public_event::Column::Date)
        .order_by_asc(entity::public_event::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(events)
}

/// Every event regardless of status, newest first.
pub async fn list_all_public(db: &Db) -> Result<Vec<entity::public_event::Model>, AppError> {
    let events = entity::public_event::Entity::find()
        .order_by_desc(entity::public_event::Column::CreatedAt)
        .order_by_desc(entity::public_event::Column::Id)
        .all(db)
        .await?;
    Ok(events)
}

pub async fn save_moderation(
    db: &Db,
    event: entity::public_event::Model,
    status: EventStatus,
    rejection_reason: Option<String>,
) -> Result<entity::public_event::Model, AppError> {
    let mut active: entity::public_event::ActiveModel = event.into();
    active.status = Set(status.as_str().to_string());
    active.rejection_reason = Set(rejection_reason);
    // Deleted since it was read.
    active.update(db).await.map_err(|e| match e {
        DbErr::RecordNotUpdated => AppError::EventNotFound,
        e => e.into(),
    })
}

pub async fn delete_public(db: &Db, id: &str) -> Result<(), AppError> {
    let result = entity::public_event::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::EventNotFound);
    }
    Ok(())
}

pub async fn count_public_by_status(db: &Db, status: EventStatus) -> Result<u64, AppError> {
    let count = entity::public_event::Entity::find()
        .filter(entity::public_event::Column::Status.eq(status.as_str()))
        .count(db)
        .await?;
    Ok(count)
}
