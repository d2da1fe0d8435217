use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Projects {
    Table,
    ClientId,
    Status,
}

#[derive(DeriveIden)]
enum Bids {
    Table,
    ProjectId,
    FreelancerId,
}

#[derive(DeriveIden)]
enum Contracts {
    Table,
    ClientId,
    FreelancerId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Index on projects.client_id for "my projects" and bid ownership checks
        manager
            .create_index(
                Index::create()
                    .name("idx_projects_client_id")
                    .table(Projects::Table)
                    .col(Projects::ClientId)
                    .to_owned(),
            )
            .await?;

        // Index on projects.status for the open-projects listing
        manager
            .create_index(
                Index::create()
                    .name("idx_projects_status")
                    .table(Projects::Table)
                    .col(Projects::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bids_project_id")
                    .table(Bids::Table)
                    .col(Bids::ProjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bids_freelancer_id")
                    .table(Bids::Table)
                    .col(Bids::FreelancerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contracts_client_id")
                    .table(Contracts::Table)
                    .col(Contracts::ClientId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contracts_freelancer_id")
                    .table(Contracts::Table)
                    .col(Contracts::FreelancerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_projects_client_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_projects_status").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_bids_project_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_bids_freelancer_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_contracts_client_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_contracts_freelancer_id").to_owned())
            .await?;

        Ok(())
    }
}
