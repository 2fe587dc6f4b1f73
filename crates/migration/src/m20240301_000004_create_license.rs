//! Create `license` table with FK back to `business`.
//!
//! Licenses soft-delete independently of the business rows that link
//! them; the detail projection reads that state from `removed`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(License::Table)
                    .if_not_exists()
                    .col(uuid(License::Id).primary_key())
                    .col(ColumnDef::new(License::BusinessId).uuid().null())
                    .col(string_len(License::LicenseKey, 128).not_null())
                    .col(string_len(License::Status, 32).not_null())
                    .col(
                        ColumnDef::new(License::Issued)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(License::Expired)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(License::Removed)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_license_business")
                            .from(License::Table, License::BusinessId)
                            .to(Business::Table, Business::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(License::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum License { Table, Id, BusinessId, LicenseKey, Status, Issued, Expired, Removed }

#[derive(DeriveIden)]
enum Business { Table, Id }
