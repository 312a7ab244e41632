use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GlobalEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GlobalEvents::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GlobalEvents::Title).string_len(255).not_null())
                    .col(ColumnDef::new(GlobalEvents::EventType).string_len(20).not_null())
                    .col(ColumnDef::new(GlobalEvents::Date).date().not_null())
                    .col(ColumnDef::new(GlobalEvents::CreatorId).string_len(36).not_null())
                    .col(ColumnDef::new(GlobalEvents::CreatorEmail).string_len(255).not_null())
                    .col(
                        ColumnDef::new(GlobalEvents::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GlobalEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum GlobalEvents {
    Table,
    Id,
    Title,
    EventType,
    Date,
    CreatorId,
    CreatorEmail,
    CreatedAt,
}
