use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Business: every listing filters on removed and orders by created
        manager
            .create_index(
                Index::create()
                    .name("idx_business_removed")
                    .table(Business::Table)
                    .col(Business::Removed)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_business_created")
                    .table(Business::Table)
                    .col(Business::Created)
                    .to_owned(),
            )
            .await?;

        // Business: availability filter scans license_id IS NULL
        manager
            .create_index(
                Index::create()
                    .name("idx_business_license")
                    .table(Business::Table)
                    .col(Business::LicenseId)
                    .to_owned(),
            )
            .await?;

        // License: detail projection joins on business_id
        manager
            .create_index(
                Index::create()
                    .name("idx_license_business")
                    .table(License::Table)
                    .col(License::BusinessId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_business_removed").table(Business::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_business_created").table(Business::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_business_license").table(Business::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_license_business").table(License::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Business { Table, Removed, Created, LicenseId }

#[derive(DeriveIden)]
enum License { Table, BusinessId }
