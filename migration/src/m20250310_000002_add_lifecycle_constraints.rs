use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Contracts {
    Table,
    ProjectId,
}

#[derive(DeriveIden)]
enum Milestones {
    Table,
    ContractId,
    Position,
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    PaymentIntentId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // A project is awarded to exactly one bid.
        manager
            .create_index(
                Index::create()
                    .name("uq_contracts_project_id")
                    .table(Contracts::Table)
                    .col(Contracts::ProjectId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Positions are unique per contract.
        manager
            .drop_index(
                Index::drop()
                    .name("idx_milestones_contract_position")
                    .table(Milestones::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("uq_milestones_contract_position")
                    .table(Milestones::Table)
                    .col(Milestones::ContractId)
                    .col(Milestones::Position)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_payment_intent_id")
                    .table(Payments::Table)
                    .col(Payments::PaymentIntentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_payments_payment_intent_id")
                    .table(Payments::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("uq_milestones_contract_position")
                    .table(Milestones::Table)
                    .to_owned(),
            )
            .await?;
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
        manager
            .drop_index(
                Index::drop()
                    .name("uq_contracts_project_id")
                    .table(Contracts::Table)
                    .to_owned(),
            )
            .await
    }
}
