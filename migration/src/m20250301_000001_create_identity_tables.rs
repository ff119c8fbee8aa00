use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::EmailNormalized).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::FirstName).string())
                    .col(ColumnDef::new(Users::LastName).string())
                    .col(ColumnDef::new(Users::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Users::IsStaff).boolean().not_null().default(false))
                    .col(ColumnDef::new(Users::IsSuperuser).boolean().not_null().default(false))
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Create profiles table (1:1 with users, phone globally unique)
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Profiles::UserId).string().not_null().primary_key())
                    .col(ColumnDef::new(Profiles::Phone).string().not_null().unique_key())
                    .col(ColumnDef::new(Profiles::RoleHint).string().not_null())
                    .col(ColumnDef::new(Profiles::IsApproved).boolean().not_null().default(false))
                    .col(ColumnDef::new(Profiles::ApprovedAt).big_integer())
                    .col(ColumnDef::new(Profiles::ApprovedBy).string())
                    .col(ColumnDef::new(Profiles::IsDeactivated).boolean().not_null().default(false))
                    .col(ColumnDef::new(Profiles::DeactivationReason).string())
                    .col(ColumnDef::new(Profiles::DeactivatedAt).big_integer())
                    .col(ColumnDef::new(Profiles::DeactivatedBy).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profiles_user_id")
                            .from(Profiles::Table, Profiles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create roles table
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Roles::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Roles::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Roles::Description).string())
                    .col(ColumnDef::new(Roles::IsSystem).boolean().not_null().default(false))
                    .col(ColumnDef::new(Roles::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Roles::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Create permissions catalog table
        manager
            .create_table(
                Table::create()
                    .table(Permissions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Permissions::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Permissions::AppLabel).string().not_null())
                    .col(ColumnDef::new(Permissions::Codename).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_permissions_label_codename")
                    .table(Permissions::Table)
                    .col(Permissions::AppLabel)
                    .col(Permissions::Codename)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create navigation_items table (self-referential tree)
        manager
            .create_table(
                Table::create()
                    .table(NavigationItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(NavigationItems::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(NavigationItems::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(NavigationItems::DisplayName).string().not_null())
                    .col(ColumnDef::new(NavigationItems::UrlName).string())
                    .col(ColumnDef::new(NavigationItems::ParentId).string())
                    .col(ColumnDef::new(NavigationItems::ItemOrder).integer().not_null().default(0))
                    .col(ColumnDef::new(NavigationItems::IsActive).boolean().not_null().default(true))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_navigation_items_parent_id")
                            .from(NavigationItems::Table, NavigationItems::ParentId)
                            .to(NavigationItems::Table, NavigationItems::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create role_permissions binding table
        manager
            .create_table(
                Table::create()
                    .table(RolePermissions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RolePermissions::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(RolePermissions::RoleId).string().not_null())
                    .col(ColumnDef::new(RolePermissions::AppLabel).string().not_null())
                    .col(ColumnDef::new(RolePermissions::Codename).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_role_permissions_role_id")
                            .from(RolePermissions::Table, RolePermissions::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_role_permissions_unique")
                    .table(RolePermissions::Table)
                    .col(RolePermissions::RoleId)
                    .col(RolePermissions::AppLabel)
                    .col(RolePermissions::Codename)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create role_navigation_items binding table
        manager
            .create_table(
                Table::create()
                    .table(RoleNavigationItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RoleNavigationItems::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(RoleNavigationItems::RoleId).string().not_null())
                    .col(ColumnDef::new(RoleNavigationItems::NavigationItemId).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_role_navigation_items_role_id")
                            .from(RoleNavigationItems::Table, RoleNavigationItems::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_role_navigation_items_item_id")
                            .from(RoleNavigationItems::Table, RoleNavigationItems::NavigationItemId)
                            .to(NavigationItems::Table, NavigationItems::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_role_navigation_items_unique")
                    .table(RoleNavigationItems::Table)
                    .col(RoleNavigationItems::RoleId)
                    .col(RoleNavigationItems::NavigationItemId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create role_assignments table with assigner provenance
        manager
            .create_table(
                Table::create()
                    .table(RoleAssignments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RoleAssignments::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(RoleAssignments::UserId).string().not_null())
                    .col(ColumnDef::new(RoleAssignments::RoleId).string().not_null())
                    .col(ColumnDef::new(RoleAssignments::AssignedAt).big_integer().not_null())
                    .col(ColumnDef::new(RoleAssignments::AssignedBy).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_role_assignments_user_id")
                            .from(RoleAssignments::Table, RoleAssignments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_role_assignments_role_id")
                            .from(RoleAssignments::Table, RoleAssignments::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_role_assignments_unique")
                    .table(RoleAssignments::Table)
                    .col(RoleAssignments::UserId)
                    .col(RoleAssignments::RoleId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_role_assignments_assigned_by")
                    .table(RoleAssignments::Table)
                    .col(RoleAssignments::AssignedBy)
                    .to_owned(),
            )
            .await?;

        // Create refresh_tokens table
        manager
            .create_table(
                Table::create()
                    .table(RefreshTokens::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RefreshTokens::TokenHash).string().not_null().primary_key())
                    .col(ColumnDef::new(RefreshTokens::UserId).string().not_null())
                    .col(ColumnDef::new(RefreshTokens::ExpiresAt).big_integer().not_null())
                    .col(ColumnDef::new(RefreshTokens::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(RefreshTokens::Revoked).boolean().not_null().default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_refresh_tokens_user_id")
                            .from(RefreshTokens::Table, RefreshTokens::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_refresh_tokens_user_id")
                    .table(RefreshTokens::Table)
                    .col(RefreshTokens::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_refresh_tokens_expires_at")
                    .table(RefreshTokens::Table)
                    .col(RefreshTokens::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        // Create reset_notifications table
        manager
            .create_table(
                Table::create()
                    .table(ResetNotifications::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ResetNotifications::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(ResetNotifications::RequesterId).string().not_null())
                    .col(ColumnDef::new(ResetNotifications::Title).string().not_null())
                    .col(ColumnDef::new(ResetNotifications::Message).string().not_null())
                    .col(ColumnDef::new(ResetNotifications::Metadata).string())
                    .col(ColumnDef::new(ResetNotifications::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(ResetNotifications::IsRead).boolean().not_null().default(false))
                    .col(ColumnDef::new(ResetNotifications::ReadBy).string())
                    .col(ColumnDef::new(ResetNotifications::ReadAt).big_integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reset_notifications_requester_id")
                            .from(ResetNotifications::Table, ResetNotifications::RequesterId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create properties table (the minimum the resolver needs for
        // ownership auto-grants and row filters)
        manager
            .create_table(
                Table::create()
                    .table(Properties::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Properties::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Properties::OwnerId).string().not_null())
                    .col(ColumnDef::new(Properties::Kind).string().not_null())
                    .col(ColumnDef::new(Properties::Name).string().not_null())
                    .col(ColumnDef::new(Properties::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Properties::IsApproved).boolean().not_null().default(false))
                    .col(ColumnDef::new(Properties::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_properties_owner_id")
                            .from(Properties::Table, Properties::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_properties_owner_id")
                    .table(Properties::Table)
                    .col(Properties::OwnerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Properties::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ResetNotifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RefreshTokens::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RoleAssignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RoleNavigationItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RolePermissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NavigationItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Permissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    EmailNormalized,
    PasswordHash,
    FirstName,
    LastName,
    IsActive,
    IsStaff,
    IsSuperuser,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Profiles {
    Table,
    UserId,
    Phone,
    RoleHint,
    IsApproved,
    ApprovedAt,
    ApprovedBy,
    IsDeactivated,
    DeactivationReason,
    DeactivatedAt,
    DeactivatedBy,
}

#[derive(DeriveIden)]
enum Roles {
    Table,
    Id,
    Name,
    Description,
    IsSystem,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Permissions {
    Table,
    Id,
    AppLabel,
    Codename,
}

#[derive(DeriveIden)]
enum NavigationItems {
    Table,
    Id,
    Name,
    DisplayName,
    UrlName,
    ParentId,
    ItemOrder,
    IsActive,
}

#[derive(DeriveIden)]
enum RolePermissions {
    Table,
    Id,
    RoleId,
    AppLabel,
    Codename,
}

#[derive(DeriveIden)]
enum RoleNavigationItems {
    Table,
    Id,
    RoleId,
    NavigationItemId,
}

#[derive(DeriveIden)]
enum RoleAssignments {
    Table,
    Id,
    UserId,
    RoleId,
    AssignedAt,
    AssignedBy,
}

#[derive(DeriveIden)]
enum RefreshTokens {
    Table,
    TokenHash,
    UserId,
    ExpiresAt,
    CreatedAt,
    Revoked,
}

#[derive(DeriveIden)]
enum ResetNotifications {
    Table,
    Id,
    RequesterId,
    Title,
    Message,
    Metadata,
    CreatedAt,
    IsRead,
    ReadBy,
    ReadAt,
}

#[derive(DeriveIden)]
enum Properties {
    Table,
    Id,
    OwnerId,
    Kind,
    Name,
    IsActive,
    IsApproved,
    CreatedAt,
}
