//! Migrator registering entity-specific migrations in dependency order.
//! Reference tables first, then `business`, then `license` (FK back to
//! business). Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_customer;
mod m20240301_000002_create_product;
mod m20240301_000003_create_business;
mod m20240301_000004_create_license;
mod m20240301_000005_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_customer::Migration),
            Box::new(m20240301_000002_create_product::Migration),
            Box::new(m20240301_000003_create_business::Migration),
            Box::new(m20240301_000004_create_license::Migration),
            // Indexes should always be applied last
            Box::new(m20240301_000005_add_indexes::Migration),
        ]
    }
}
