pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_accounts;
mod m20261001_000002_create_users;
mod m20261001_000003_create_applications;
mod m20261001_000004_create_tasks;
mod m20261001_000005_create_documents;
mod m20261002_000006_create_global_events;
mod m20261002_000007_create_public_events;
mod m20261003_000008_create_messages;
mod m20261003_000009_create_inquiries;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_accounts::Migration),
            Box::new(m20261001_000002_create_users::Migration),
            Box::new(m20261001_000003_create_applications::Migration),
            Box::new(m20261001_000004_create_tasks::Migration),
            Box::new(m20261001_000005_create_documents::Migration),
            Box::new(m20261002_000006_create_global_events::Migration),
            Box::new(m20261002_000007_create_public_events::Migration),
            Box::new(m20261003_000008_create_messages::Migration),
            Box::new(m20261003_000009_create_inquiries::Migration),
        ]
    }
}
