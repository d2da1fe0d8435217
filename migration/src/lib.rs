pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users_table;
mod m20250301_000002_create_projects_table;
mod m20250301_000003_create_bids_table;
mod m20250301_000004_create_contracts_table;
mod m20250301_000005_create_milestones_table;
mod m20250301_000006_create_payments_table;
mod m20250301_000007_create_notifications_table;
mod m20250301_000008_create_invoices_table;
mod m20250305_000001_add_indexes;
mod m20250310_000001_create_payment_attempts_table;
mod m20250310_000002_add_lifecycle_constraints;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users_table::Migration),
            Box::new(m20250301_000002_create_projects_table::Migration),
            Box::new(m20250301_000003_create_bids_table::Migration),
            Box::new(m20250301_000004_create_contracts_table::Migration),
            Box::new(m20250301_000005_create_milestones_table::Migration),
            Box::new(m20250301_000006_create_payments_table::Migration),
            Box::new(m20250301_000007_create_notifications_table::Migration),
            Box::new(m20250301_000008_create_invoices_table::Migration),
            Box::new(m20250305_000001_add_indexes::Migration),
            Box::new(m20250310_000001_create_payment_attempts_table::Migration),
            Box::new(m20250310_000002_add_lifecycle_constraints::Migration),
        ]
    }
}
