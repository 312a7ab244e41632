use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, DbErr, EntityTrait, PaginatorTrait, QueryOrder, Set, SqlErr, TransactionTrait,
};

use crate::db::models::Role;
use crate::db::pool::Db;
use crate::error::AppError;

pub const STARTER_TASKS: [&str; 3] = [
    "Complete initial consultation",
    "Draft personal statement",
    "Request recommendation letters",
];

pub const STARTER_DOCUMENTS: [&str; 3] = [
    "Passport & ID",
    "Academic Transcripts",
    "Language Test Scores",
];

pub async fn find_by_id(db: &Db, id: &str) -> Result<Option<entity::user::Model>, AppError> {
    Ok(entity::user::Entity::find_by_id(id).one(db).await?)
}

pub async fn list_all(db: &Db) -> Result<Vec<entity::user::Model>, AppError> {
    let users = entity::user::Entity::find()
        .order_by_asc(entity::user::Column::CreatedAt)
        .order_by_asc(entity::user::Column::Id)
        .all(db)
        .await?;
    Ok(users)
}

pub async fn count_all(db: &Db) -> Result<u64, AppError> {
    Ok(entity::user::Entity::find().count(db).await?)
}

pub async fn set_role(db: &Db, id: &str, role: Role) -> Result<entity::user::Model, AppError> {
    let user = find_by_id(db, id).await?.ok_or(AppError::UserNotFound)?;

    let mut active: entity::user::ActiveModel = user.into();
    active.role = Set(role.as_str().to_string());
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    // The profile can vanish between the lookup and the write.
    active.update(db).await.map_err(|e| match e {
        DbErr::RecordNotUpdated => AppError::UserNotFound,
        e => e.into(),
    })
}

/// Writes the profile and its starter checklist in one transaction.
///
/// Returns `false` without writing anything when the profile already exists.
/// Concurrent callers for the same id see exactly one `true`; the others get
/// `false`, never an error.
pub async fn create_with_starters(
    db: &Db,
    id: &str,
    email: &str,
    role: Role,
) -> Result<bool, AppError> {
    match insert_with_starters(db, id, email, role).await {
        Ok(created) => Ok(created),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            tracing::debug!(user_id = %id, "profile created concurrently");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

async fn insert_with_starters(db: &Db, id: &str, email: &str, role: Role) -> Result<bool, DbErr> {
    let txn = db.begin().await?;
    let now = chrono::Utc::now().naive_utc();

    // Must be the first statement: a read before it would make SQLite fail a
    // racing transaction's lock upgrade instead of waiting.
    let profile = entity::user::ActiveModel {
        id: Set(id.to_string()),
        email: Set(email.to_string()),
        role: Set(role.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let inserted = entity::user::Entity::insert(profile)
        .on_conflict(
            OnConflict::column(entity::user::Column::Id)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;
    if inserted == 0 {
        txn.rollback().await?;
        return Ok(false);
    }

    for text in STARTER_TASKS {
        entity::task::ActiveModel {
            id: Set(uuid::Uuid::now_v7().to_string()),
            user_id: Set(id.to_string()),
            text: Set(text.to_string()),
            completed: Set(false),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;
    }

    for text in STARTER_DOCUMENTS {
        entity::document::ActiveModel {
            id: Set(uuid::Uuid::now_v7().to_string()),
            user_id: Set(id.to_string()),
            text: Set(text.to_string()),
            uploaded: Set(false),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    Ok(true)
}
