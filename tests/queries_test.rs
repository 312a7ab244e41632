use consulting_portal::db::models::{EventStatus, EventType, Role};
use consulting_portal::db::{pool, queries};
use consulting_portal::error::AppError;
use migration::MigratorTrait;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

async fn file_db(dir: &tempfile::TempDir) -> pool::Db {
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("portal.db").display());
    let db = pool::connect(&url).await.expect("Failed to connect");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

async fn memory_db() -> pool::Db {
    let db = pool::connect("sqlite::memory:")
        .await
        .expect("Failed to connect");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

// ─── Profile creation ────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_profile_creation_writes_one_checklist() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_db(&dir).await;

    let attempts = (0..6).map(|_| {
        let db = db.clone();
        tokio::spawn(async move {
            queries::users::create_with_starters(&db, "ada", "ada@test.com", Role::User).await
        })
    });
    let results = futures_util::future::join_all(attempts).await;

    let created = results
        .into_iter()
        .map(|r| r.unwrap().expect("profile creation failed"))
        .filter(|created| *created)
        .count();
    assert_eq!(created, 1);

    assert_eq!(queries::users::count_all(&db).await.unwrap(), 1);
    let tasks = entity::task::Entity::find()
        .filter(entity::task::Column::UserId.eq("ada"))
        .count(&db)
        .await
        .unwrap();
    let documents = entity::document::Entity::find()
        .filter(entity::document::Column::UserId.eq("ada"))
        .count(&db)
        .await
        .unwrap();
    assert_eq!((tasks, documents), (3, 3));
}

#[tokio::test]
async fn existing_profile_is_left_alone() {
    let db = memory_db().await;

    assert!(queries::users::create_with_starters(&db, "ada", "ada@test.com", Role::Father)
        .await
        .unwrap());
    assert!(!queries::users::create_with_starters(&db, "ada", "other@test.com", Role::User)
        .await
        .unwrap());

    let profile = queries::users::find_by_id(&db, "ada").await.unwrap().unwrap();
    assert_eq!(profile.email, "ada@test.com");
    assert_eq!(profile.role, "father");
}

#[tokio::test]
async fn duplicate_account_email_is_a_conflict() {
    let db = memory_db().await;

    queries::accounts::insert(&db, "ada@test.com", "hash".to_string())
        .await
        .unwrap();
    let err = queries::accounts::insert(&db, "ada@test.com", "hash".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UserAlreadyExists), "got {err:?}");
}

// ─── Writes to rows deleted underneath ───────────────────────────────────────

#[tokio::test]
async fn moderating_a_deleted_event_is_not_found() {
    let db = memory_db().await;
    let creator = queries::events::Creator {
        id: "dad",
        email: "dad@test.com",
    };
    let event = queries::events::NewPublicEvent {
        title: "Info Night".to_string(),
        description: "Meet the counsellors.".to_string(),
        image_url: "https://example.com/info.png".to_string(),
        location: "Library".to_string(),
        time: "19:00".to_string(),
        date: chrono::NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
        event_type: EventType::InfoSession,
        registration_link: None,
    };
    let stored = queries::events::insert_public(&db, event, creator).await.unwrap();

    let read = queries::events::find_public(&db, &stored.id).await.unwrap().unwrap();
    queries::events::delete_public(&db, &stored.id).await.unwrap();

    let err = queries::events::save_moderation(&db, read, EventStatus::Approved, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::EventNotFound), "got {err:?}");
}

#[tokio::test]
async fn role_change_for_a_deleted_profile_is_not_found() {
    let db = memory_db().await;
    queries::users::create_with_starters(&db, "ada", "ada@test.com", Role::User)
        .await
        .unwrap();
    queries::users::set_role(&db, "ada", Role::Superadmin).await.unwrap();

    entity::user::Entity::delete_by_id("ada").exec(&db).await.unwrap();
    let err = queries::users::set_role(&db, "ada", Role::Father).await.unwrap_err();
    assert!(matches!(err, AppError::UserNotFound), "got {err:?}");
}

// ─── Inquiry ordering ────────────────────────────────────────────────────────

#[tokio::test]
async fn recent_inquiries_are_newest_first() {
    let db = memory_db().await;

    let mut ids = Vec::new();
    for name in ["First Parent", "Second Parent", "Third Parent"] {
        let inquiry = queries::inquiries::NewInquiry {
            name: name.to_string(),
            email: "parent@example.com".to_string(),
            message: None,
            service: None,
            source: "contact-page".to_string(),
            fields: serde_json::Map::new(),
            user_id: None,
        };
        ids.push(queries::inquiries::insert(&db, inquiry).await.unwrap().id);
    }

    let listed: Vec<String> = queries::inquiries::list_recent(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.id)
        .collect();
    ids.reverse();
    assert_eq!(listed, ids);
}
