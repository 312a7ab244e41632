use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PublicEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PublicEvents::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PublicEvents::Title).string_len(255).not_null())
                    .col(ColumnDef::new(PublicEvents::Description).text().not_null())
                    .col(ColumnDef::new(PublicEvents::ImageUrl).text().not_null())
                    .col(ColumnDef::new(PublicEvents::Location).string_len(255).not_null())
                    .col(ColumnDef::new(PublicEvents::Time).string_len(50).not_null())
                    .col(ColumnDef::new(PublicEvents::Date).date().not_null())
                    .col(ColumnDef::new(PublicEvents::EventType).string_len(20).not_null())
                    .col(ColumnDef::new(PublicEvents::RegistrationLink).text().null())
                    .col(
                        ColumnDef::new(PublicEvents::Status)
                            .string_len(10)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(PublicEvents::RejectionReason).text().null())
                    .col(ColumnDef::new(PublicEvents::CreatorId).string_len(36).not_null())
                    .col(ColumnDef::new(PublicEvents::CreatorEmail).string_len(255).not_null())
                    .col(
                        ColumnDef::new(PublicEvents::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Public listing filters on status and sorts by date
        manager
            .create_index(
                Index::create()
                    .name("idx-public_events-status-date")
                    .table(PublicEvents::Table)
                    .col(PublicEvents::Status)
                    .col(PublicEvents::Date)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PublicEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PublicEvents {
    Table,
    Id,
    Title,
    Description,
    ImageUrl,
    Location,
    Time,
    Date,
    EventType,
    RegistrationLink,
    Status,
    RejectionReason,
    CreatorId,
    CreatorEmail,
    CreatedAt,
}
