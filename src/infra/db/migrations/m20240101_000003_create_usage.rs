//! Migration: searches and consultations.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_accounts::Users;
use super::m20240101_000002_create_ledger::{CreditBuckets, HourPools};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Searches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Searches::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Searches::Info).text().not_null())
                    .col(ColumnDef::new(Searches::CreditsUsed).integer().null())
                    .col(ColumnDef::new(Searches::Notes).text().null())
                    .col(
                        ColumnDef::new(Searches::State)
                            .string_len(20)
                            .not_null()
                            .default("Pendiente"),
                    )
                    .col(ColumnDef::new(Searches::BucketId).integer().null())
                    .col(ColumnDef::new(Searches::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(Searches::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Searches::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    // History outlives the bucket it was charged to
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_searches_bucket")
                            .from(Searches::Table, Searches::BucketId)
                            .to(CreditBuckets::Table, CreditBuckets::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_searches_user")
                            .from(Searches::Table, Searches::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_searches_user")
                    .table(Searches::Table)
                    .col(Searches::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Consultations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Consultations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Consultations::Hours).integer().not_null())
                    .col(ColumnDef::new(Consultations::Comments).text().null())
                    .col(ColumnDef::new(Consultations::Notes).text().null())
                    .col(
                        ColumnDef::new(Consultations::State)
                            .string_len(20)
                            .not_null()
                            .default("Pendiente"),
                    )
                    .col(ColumnDef::new(Consultations::PoolId).integer().not_null())
                    .col(ColumnDef::new(Consultations::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(Consultations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Consultations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_consultations_pool")
                            .from(Consultations::Table, Consultations::PoolId)
                            .to(HourPools::Table, HourPools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_consultations_user")
                            .from(Consultations::Table, Consultations::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Consultations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Searches::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Searches {
    Table,
    Id,
    Info,
    CreditsUsed,
    Notes,
    State,
    BucketId,
    UserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Consultations {
    Table,
    Id,
    Hours,
    Comments,
    Notes,
    State,
    PoolId,
    UserId,
    CreatedAt,
    UpdatedAt,
}
