//! Tenant-scoped user repository with soft delete support.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sqlx, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet,
    QueryFilter, QueryOrder, RuntimeErr, Select, Set, SqlErr,
};

use domain::{DomainError, DomainResult, TenantId, User, UserFields, UserId, UserStatus};

use super::constraints::duplicate_error;
use super::entities::user::{self, ActiveModel, Entity as UserEntity};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Every operation is scoped to `tenant`: records owned by another tenant are
/// reported as `NotFound`, never returned or modified. Soft-deleted records
/// are invisible to all operations.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user owned by `tenant`
    async fn create(&self, tenant: TenantId, fields: UserFields) -> DomainResult<User>;

    /// Find active user by ID
    async fn get_by_id(&self, tenant: TenantId, id: UserId) -> DomainResult<User>;

    /// Find active user by identity number
    async fn get_by_identity(&self, tenant: TenantId, dni: &str) -> DomainResult<User>;

    /// List active users, most recently created first
    async fn list(&self, tenant: TenantId) -> DomainResult<Vec<User>>;

    /// Replace the attributes of an active user, keeping its tenant
    async fn update(&self, tenant: TenantId, id: UserId, fields: UserFields) -> DomainResult<User>;

    /// Soft delete an active user
    async fn delete(&self, tenant: TenantId, id: UserId) -> DomainResult<()>;
}

pub(super) fn require_id(id: UserId) -> DomainResult<()> {
    if id <= 0 {
        return Err(DomainError::invalid_argument("invalid user id"));
    }
    Ok(())
}

pub(super) fn require_identity(dni: &str) -> DomainResult<()> {
    if dni.is_empty() {
        return Err(DomainError::invalid_argument("dni cannot be empty"));
    }
    Ok(())
}

/// SeaORM implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Active rows of one tenant
    fn scoped(tenant: TenantId) -> Select<UserEntity> {
        UserEntity::find()
            .filter(user::Column::TenantId.eq(tenant.as_i64()))
            .filter(user::Column::Status.eq(UserStatus::Active.as_str()))
    }

    async fn find_one(&self, query: Select<UserEntity>) -> DomainResult<User> {
        query
            .one(&self.db)
            .await
            .map_err(storage_error)?
            .ok_or(DomainError::NotFound)
            .and_then(User::try_from)
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn create(&self, tenant: TenantId, fields: UserFields) -> DomainResult<User> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: NotSet,
            tenant_id: Set(tenant.as_i64()),
            first_name: Set(fields.first_name),
            last_name: Set(fields.last_name),
            dni: Set(fields.dni),
            gender: Set(fields.gender.as_str().to_string()),
            phone: Set(fields.phone),
            email: Set(fields.email),
            birth_day: Set(fields.birth_date),
            status: Set(UserStatus::Active.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        let model = active_model.insert(&self.db).await.map_err(write_error)?;
        User::try_from(model)
    }

    async fn get_by_id(&self, tenant: TenantId, id: UserId) -> DomainResult<User> {
        require_id(id)?;
        self.find_one(Self::scoped(tenant).filter(user::Column::Id.eq(id)))
            .await
    }

    async fn get_by_identity(&self, tenant: TenantId, dni: &str) -> DomainResult<User> {
        require_identity(dni)?;
        self.find_one(Self::scoped(tenant).filter(user::Column::Dni.eq(dni)))
            .await
    }

    async fn list(&self, tenant: TenantId) -> DomainResult<Vec<User>> {
        let models = Self::scoped(tenant)
            .order_by_desc(user::Column::Id)
            .all(&self.db)
            .await
            .map_err(storage_error)?;

        models.into_iter().map(User::try_from).collect()
    }

    async fn update(&self, tenant: TenantId, id: UserId, fields: UserFields) -> DomainResult<User> {
        require_id(id)?;
        let mut existing = self.get_by_id(tenant, id).await?;

        let now = Utc::now();
        let changes = ActiveModel {
            tenant_id: Set(existing.tenant_id.as_i64()),
            first_name: Set(fields.first_name.clone()),
            last_name: Set(fields.last_name.clone()),
            dni: Set(fields.dni.clone()),
            gender: Set(fields.gender.as_str().to_string()),
            phone: Set(fields.phone.clone()),
            email: Set(fields.email.clone()),
            birth_day: Set(fields.birth_date),
            updated_at: Set(now),
            ..Default::default()
        };

        // The row may have been deleted since it was loaded
        let result = UserEntity::update_many()
            .set(changes)
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::TenantId.eq(tenant.as_i64()))
            .filter(user::Column::Status.eq(UserStatus::Active.as_str()))
            .exec(&self.db)
            .await
            .map_err(write_error)?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        existing.apply(fields, now);
        Ok(existing)
    }

    async fn delete(&self, tenant: TenantId, id: UserId) -> DomainResult<()> {
        require_id(id)?;

        let now = Utc::now();
        let tombstone = ActiveModel {
            status: Set(UserStatus::Deleted.as_str().to_string()),
            deleted_at: Set(Some(now)),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = UserEntity::update_many()
            .set(tombstone)
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::TenantId.eq(tenant.as_i64()))
            .filter(user::Column::Status.eq(UserStatus::Active.as_str()))
            .exec(&self.db)
            .await
            .map_err(storage_error)?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        Ok(())
    }
}

fn storage_error(err: DbErr) -> DomainError {
    tracing::error!(error = %err, "User storage operation failed");
    DomainError::storage(err.to_string())
}

/// Classify a failed insert/update: unique violations become duplicate errors.
fn write_error(err: DbErr) -> DomainError {
    match unique_violation(&err) {
        Some(constraint) => duplicate_error(constraint.as_deref()),
        None => storage_error(err),
    }
}

/// `Some(constraint name)` if `err` is a unique violation.
fn unique_violation(err: &DbErr) -> Option<Option<String>> {
    if let DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(db_err)))
    | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(db_err))) = err
    {
        if db_err.is_unique_violation() {
            return Some(db_err.constraint().map(str::to_string));
        }
    }

    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Some(None),
        _ => None,
    }
}
