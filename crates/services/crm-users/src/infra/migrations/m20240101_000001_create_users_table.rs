//! Migration: Create the tenant-scoped users table.
//!
//! The unique index names are the contract used to classify duplicate
//! errors, see `repository::constraints`.

use sea_orm_migration::prelude::*;

use domain::{
    MAX_DNI_LENGTH, MAX_EMAIL_LENGTH, MAX_FIRST_NAME_LENGTH, MAX_LAST_NAME_LENGTH,
    MAX_PHONE_LENGTH, STATUS_ACTIVE,
};

use crate::repository::constraints::{
    USERS_TENANT_DNI, USERS_TENANT_EMAIL, USERS_TENANT_PHONE,
};

const IDX_USERS_TENANT_STATUS: &str = "idx_users_tenant_status";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::TenantId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Users::FirstName)
                            .string_len(MAX_FIRST_NAME_LENGTH as u32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::LastName)
                            .string_len(MAX_LAST_NAME_LENGTH as u32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::Dni)
                            .string_len(MAX_DNI_LENGTH as u32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Users::Gender).string_len(3).not_null())
                    .col(
                        ColumnDef::new(Users::Phone)
                            .string_len(MAX_PHONE_LENGTH as u32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(MAX_EMAIL_LENGTH as u32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Users::BirthDay).date().not_null())
                    .col(
                        ColumnDef::new(Users::Status)
                            .string_len(10)
                            .not_null()
                            .default(STATUS_ACTIVE),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Per-tenant uniqueness, soft-deleted rows included
        for (name, column) in [
            (USERS_TENANT_DNI, Users::Dni),
            (USERS_TENANT_EMAIL, Users::Email),
            (USERS_TENANT_PHONE, Users::Phone),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Users::Table)
                        .col(Users::TenantId)
                        .col(column)
                        .unique()
                        .to_owned(),
                )
                .await?;
        }

        // Tenant-scoped listing of active users
        manager
            .create_index(
                Index::create()
                    .name(IDX_USERS_TENANT_STATUS)
                    .table(Users::Table)
                    .col(Users::TenantId)
                    .col(Users::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    TenantId,
    FirstName,
    LastName,
    Dni,
    Gender,
    Phone,
    Email,
    BirthDay,
    Status,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
