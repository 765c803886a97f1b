//! Migration: credit buckets, hour pools and the purchases that fund them.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_accounts::{Plans, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CreditBuckets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CreditBuckets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CreditBuckets::UserId).integer().not_null())
                    .col(ColumnDef::new(CreditBuckets::Kind).string_len(20).not_null())
                    .col(ColumnDef::new(CreditBuckets::Quantity).integer().not_null())
                    .col(
                        ColumnDef::new(CreditBuckets::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CreditBuckets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_credit_buckets_user")
                            .from(CreditBuckets::Table, CreditBuckets::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .check(Expr::col(CreditBuckets::Quantity).gte(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_credit_buckets_user")
                    .table(CreditBuckets::Table)
                    .col(CreditBuckets::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CreditPurchases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CreditPurchases::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CreditPurchases::PaymentMethod)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CreditPurchases::Cost).double().not_null())
                    .col(ColumnDef::new(CreditPurchases::Notes).text().null())
                    .col(ColumnDef::new(CreditPurchases::BucketId).integer().not_null())
                    .col(
                        ColumnDef::new(CreditPurchases::PurchasedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_credit_purchases_bucket")
                            .from(CreditPurchases::Table, CreditPurchases::BucketId)
                            .to(CreditBuckets::Table, CreditBuckets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlanPurchases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlanPurchases::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PlanPurchases::PaymentMethod)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PlanPurchases::Notes).text().null())
                    .col(ColumnDef::new(PlanPurchases::AmountPaid).double().not_null())
                    .col(ColumnDef::new(PlanPurchases::PlanId).integer().not_null())
                    .col(ColumnDef::new(PlanPurchases::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(PlanPurchases::PurchasedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_plan_purchases_plan")
                            .from(PlanPurchases::Table, PlanPurchases::PlanId)
                            .to(Plans::Table, Plans::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_plan_purchases_user")
                            .from(PlanPurchases::Table, PlanPurchases::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(HourPools::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HourPools::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(HourPools::UserId).integer().not_null())
                    .col(ColumnDef::new(HourPools::TotalHours).integer().not_null())
                    .col(ColumnDef::new(HourPools::RemainingHours).integer().not_null())
                    .col(
                        ColumnDef::new(HourPools::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HourPools::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hour_pools_user")
                            .from(HourPools::Table, HourPools::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .check(Expr::col(HourPools::RemainingHours).gte(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_hour_pools_user")
                    .table(HourPools::Table)
                    .col(HourPools::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HourPools::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlanPurchases::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CreditPurchases::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CreditBuckets::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum CreditBuckets {
    Table,
    Id,
    UserId,
    Kind,
    Quantity,
    ExpiresAt,
    CreatedAt,
}

#[derive(Iden)]
enum CreditPurchases {
    Table,
    Id,
    PaymentMethod,
    Cost,
    Notes,
    BucketId,
    PurchasedAt,
}

#[derive(Iden)]
enum PlanPurchases {
    Table,
    Id,
    PaymentMethod,
    Notes,
    AmountPaid,
    PlanId,
    UserId,
    PurchasedAt,
}

#[derive(Iden)]
pub enum HourPools {
    Table,
    Id,
    UserId,
    TotalHours,
    RemainingHours,
    ExpiresAt,
    CreatedAt,
}
