//! Create `business` table with FKs to `customer` and `product`.
//!
//! The central record; includes the nullable license link and the
//! soft-delete timestamp.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Business::Table)
                    .if_not_exists()
                    .col(uuid(Business::Id).primary_key())
                    .col(string_len(Business::Name, 255).not_null())
                    .col(uuid(Business::CustomerId).not_null())
                    .col(uuid(Business::ProductId).not_null())
                    // Explicitly define nullable columns to avoid conflicting NULL/NOT NULL
                    .col(ColumnDef::new(Business::LicenseId).uuid().null())
                    .col(timestamp_with_time_zone(Business::Created).not_null())
                    .col(timestamp_with_time_zone(Business::Updated).not_null())
                    .col(
                        ColumnDef::new(Business::Removed)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_business_customer")
                            .from(Business::Table, Business::CustomerId)
                            .to(Customer::Table, Customer::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_business_product")
                            .from(Business::Table, Business::ProductId)
                            .to(Product::Table, Product::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Business::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Business { Table, Id, Name, CustomerId, ProductId, LicenseId, Created, Updated, Removed }

#[derive(DeriveIden)]
enum Customer { Table, Id }

#[derive(DeriveIden)]
enum Product { Table, Id }
