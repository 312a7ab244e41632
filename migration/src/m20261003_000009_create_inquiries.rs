use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Inquiries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Inquiries::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Inquiries::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Inquiries::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Inquiries::Message).text().null())
                    .col(ColumnDef::new(Inquiries::Service).string_len(255).null())
                    .col(ColumnDef::new(Inquiries::Source).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Inquiries::Fields)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .col(
                        ColumnDef::new(Inquiries::UserId)
                            .string_len(36)
                            .not_null()
                            .default("anonymous"),
                    )
                    .col(
                        ColumnDef::new(Inquiries::CreatedAt)
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
            .drop_table(Table::drop().table(Inquiries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Inquiries {
    Table,
    Id,
    Name,
    Email,
    Message,
    Service,
    Source,
    Fields,
    UserId,
    CreatedAt,
}
