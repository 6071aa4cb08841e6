use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ConfirmationCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConfirmationCodes::UserId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ConfirmationCodes::Code).string().not_null())
                    .col(
                        ColumnDef::new(ConfirmationCodes::IssuedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ConfirmationCodes::Table, ConfirmationCodes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ConfirmationCodes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ConfirmationCodes {
    Table,
    UserId,
    Code,
    IssuedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
