//! Migration: companies and password reset tokens.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_accounts::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Companies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Companies::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Companies::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Companies::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Companies::TradeName).string_len(255).null())
                    .col(
                        ColumnDef::new(Companies::Cuit)
                            .string_len(13)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Companies::VatCondition).string_len(100).null())
                    .col(ColumnDef::new(Companies::CompanyType).string_len(100).null())
                    .col(ColumnDef::new(Companies::MainActivity).string_len(255).null())
                    .col(ColumnDef::new(Companies::StreetAddress).string_len(255).null())
                    .col(ColumnDef::new(Companies::City).string_len(100).null())
                    .col(ColumnDef::new(Companies::Province).string_len(100).null())
                    .col(ColumnDef::new(Companies::PostalCode).string_len(20).null())
                    .col(ColumnDef::new(Companies::UserId).integer().null())
                    .col(
                        ColumnDef::new(Companies::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_companies_user")
                            .from(Companies::Table, Companies::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PasswordResets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PasswordResets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PasswordResets::Token)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(PasswordResets::Email).string_len(255).not_null())
                    .col(
                        ColumnDef::new(PasswordResets::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PasswordResets::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(PasswordResets::Used)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_password_resets_user")
                            .from(PasswordResets::Table, PasswordResets::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PasswordResets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Companies::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Companies {
    Table,
    Id,
    Name,
    Email,
    TradeName,
    Cuit,
    VatCondition,
    CompanyType,
    MainActivity,
    StreetAddress,
    City,
    Province,
    PostalCode,
    UserId,
    Active,
}

#[derive(Iden)]
enum PasswordResets {
    Table,
    Id,
    Token,
    Email,
    ExpiresAt,
    UserId,
    Used,
}
