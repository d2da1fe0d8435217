use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `milestones` table and its columns.
#[derive(DeriveIden)]
enum Milestones {
    Table,
    Id,
    ContractId,
    Title,
    Description,
    Amount,
    Position,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Contracts {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Milestones::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Milestones::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Milestones::ContractId).uuid().not_null())
                    .col(ColumnDef::new(Milestones::Title).string().not_null())
                    .col(ColumnDef::new(Milestones::Description).text().null())
                    .col(ColumnDef::new(Milestones::Amount).double().not_null())
                    .col(ColumnDef::new(Milestones::Position).integer().not_null())
                    .col(ColumnDef::new(Milestones::Status).string().not_null())
                    .col(
                        ColumnDef::new(Milestones::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Milestones::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_milestones_contract_id")
                            .from(Milestones::Table, Milestones::ContractId)
                            .to(Contracts::Table, Contracts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Milestones are always read in order within their contract.
        manager
            .create_index(
                Index::create()
                    .name("idx_milestones_contract_position")
                    .table(Milestones::Table)
                    .col(Milestones::ContractId)
                    .col(Milestones::Position)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Milestones::Table).to_owned())
            .await
    }
}
