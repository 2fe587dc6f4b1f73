//! Create `customer` table.
//!
//! Reference directory joined into business listings by `customer_id`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customer::Table)
                    .if_not_exists()
                    .col(uuid(Customer::Id).primary_key())
                    .col(string_len(Customer::Name, 255).not_null())
                    .col(timestamp_with_time_zone(Customer::Created).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Customer::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Customer { Table, Id, Name, Created }
