//! User service - Handles user-related business logic.
//!
//! Validation and the identity-number pre-check run here, before storage is
//! touched. The repository's unique constraints remain the final word on
//! duplicates when two calls race past the pre-check.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use domain::{DomainError, DomainResult, TenantId, User, UserDraft, UserId, UserPatch};

use crate::repository::UserRepository;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Validate and create a user owned by `tenant`
    async fn create_user(&self, tenant: TenantId, draft: UserDraft) -> DomainResult<User>;

    /// Get active user by ID
    async fn get_user(&self, tenant: TenantId, id: UserId) -> DomainResult<User>;

    /// Get active user by identity number
    async fn get_user_by_identity(&self, tenant: TenantId, dni: &str) -> DomainResult<User>;

    /// List active users, newest first
    async fn list_users(&self, tenant: TenantId) -> DomainResult<Vec<User>>;

    /// Apply a partial update, then validate the merged record
    async fn update_user(&self, tenant: TenantId, id: UserId, patch: UserPatch)
        -> DomainResult<User>;

    /// Soft delete user
    async fn delete_user(&self, tenant: TenantId, id: UserId) -> DomainResult<()>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
}

impl UserManager {
    /// Create new user service instance with repository
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Fail with `DuplicateIdentity` if another user of `tenant` holds `dni`.
    async fn ensure_identity_available(
        &self,
        tenant: TenantId,
        dni: &str,
        owner: Option<UserId>,
    ) -> DomainResult<()> {
        match self.repo.get_by_identity(tenant, dni).await {
            Ok(existing) if Some(existing.id) == owner => Ok(()),
            Ok(_) => Err(DomainError::DuplicateIdentity),
            Err(DomainError::NotFound) => Ok(()),
            Err(err) => Err(err),
        }
    }
}

fn require_id(id: UserId) -> DomainResult<()> {
    if id <= 0 {
        return Err(DomainError::invalid_argument("invalid user id"));
    }
    Ok(())
}

#[async_trait]
impl UserService for UserManager {
    async fn create_user(&self, tenant: TenantId, draft: UserDraft) -> DomainResult<User> {
        let fields = draft.into_fields()?;
        self.ensure_identity_available(tenant, &fields.dni, None)
            .await?;

        let user = self.repo.create(tenant, fields).await?;
        info!(tenant = %tenant, user_id = user.id, "User created");
        Ok(user)
    }

    async fn get_user(&self, tenant: TenantId, id: UserId) -> DomainResult<User> {
        require_id(id)?;
        self.repo.get_by_id(tenant, id).await
    }

    async fn get_user_by_identity(&self, tenant: TenantId, dni: &str) -> DomainResult<User> {
        self.repo.get_by_identity(tenant, dni.trim()).await
    }

    async fn list_users(&self, tenant: TenantId) -> DomainResult<Vec<User>> {
        self.repo.list(tenant).await
    }

    async fn update_user(
        &self,
        tenant: TenantId,
        id: UserId,
        patch: UserPatch,
    ) -> DomainResult<User> {
        require_id(id)?;
        let existing = self.repo.get_by_id(tenant, id).await?;

        let fields = patch.merge_into(&existing).into_fields()?;
        self.ensure_identity_available(tenant, &fields.dni, Some(id))
            .await?;

        let user = self.repo.update(tenant, id, fields).await?;
        info!(tenant = %tenant, user_id = id, "User updated");
        Ok(user)
    }

    async fn delete_user(&self, tenant: TenantId, id: UserId) -> DomainResult<()> {
        require_id(id)?;
        self.repo.delete(tenant, id).await?;
        info!(tenant = %tenant, user_id = id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUserRepository;
    use chrono::{NaiveDate, Utc};
    use domain::{Gender, UserFields};
    use mockall::predicate::eq;

    fn tenant(id: u32) -> TenantId {
        TenantId::new(id).unwrap()
    }

    fn draft(dni: &str) -> UserDraft {
        UserDraft {
            first_name: " Juan ".to_string(),
            last_name: "Perez".to_string(),
            dni: dni.to_string(),
            gender: "M".to_string(),
            phone: "111".to_string(),
            email: "A@X.com".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2000, 1, 1),
        }
    }

    fn stored_user(id: UserId, dni: &str) -> User {
        let fields = UserFields {
            first_name: "Juan".to_string(),
            last_name: "Perez".to_string(),
            dni: dni.to_string(),
            gender: Gender::Male,
            phone: "111".to_string(),
            email: "a@x.com".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        };
        User::new(id, tenant(1), fields, Utc::now())
    }

    #[tokio::test]
    async fn test_create_user_success() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_identity()
            .withf(|t, dni| *t == tenant(1) && dni == "A1")
            .returning(|_, _| Err(DomainError::NotFound));
        repo.expect_create()
            .withf(|t, fields| {
                *t == tenant(1) && fields.first_name == "Juan" && fields.email == "a@x.com"
            })
            .times(1)
            .returning(|t, fields| Ok(User::new(7, t, fields, Utc::now())));

        let service = UserManager::new(Arc::new(repo));
        let user = service.create_user(tenant(1), draft(" A1 ")).await.unwrap();

        assert_eq!(user.id, 7);
        assert_eq!(user.dni, "A1");
    }

    #[tokio::test]
    async fn test_create_user_duplicate_identity_skips_storage() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_identity()
            .returning(|_, dni| Ok(stored_user(3, dni)));
        repo.expect_create().never();

        let service = UserManager::new(Arc::new(repo));
        let result = service.create_user(tenant(1), draft("A1")).await;

        assert_eq!(result, Err(DomainError::DuplicateIdentity));
    }

    #[tokio::test]
    async fn test_create_user_validation_runs_first() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_identity().never();
        repo.expect_create().never();

        let service = UserManager::new(Arc::new(repo));

        let mut underage = draft("A1");
        underage.birth_date = Utc::now().date_naive().pred_opt();
        assert_eq!(
            service.create_user(tenant(1), underage).await,
            Err(DomainError::Underage)
        );

        let mut missing = draft("A1");
        missing.phone = "  ".to_string();
        assert_eq!(
            service.create_user(tenant(1), missing).await,
            Err(DomainError::MissingField("phone"))
        );
    }

    #[tokio::test]
    async fn test_create_user_storage_failure_propagates() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_identity()
            .returning(|_, _| Err(DomainError::storage("connection refused")));
        repo.expect_create().never();

        let service = UserManager::new(Arc::new(repo));
        let result = service.create_user(tenant(1), draft("A1")).await;

        assert!(matches!(result, Err(DomainError::StorageFailure(_))));
    }

    #[tokio::test]
    async fn test_create_user_constraint_backstop() {
        // Pre-check raced: storage still reports the duplicate
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_identity()
            .returning(|_, _| Err(DomainError::NotFound));
        repo.expect_create()
            .returning(|_, _| Err(DomainError::DuplicateIdentity));

        let service = UserManager::new(Arc::new(repo));
        let result = service.create_user(tenant(1), draft("A1")).await;

        assert_eq!(result, Err(DomainError::DuplicateIdentity));
    }

    #[tokio::test]
    async fn test_get_user_rejects_non_positive_id() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id().never();

        let service = UserManager::new(Arc::new(repo));

        assert!(matches!(
            service.get_user(tenant(1), 0).await,
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(matches!(
            service.delete_user(tenant(1), 0).await,
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_get_user_not_found_passes_through() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id()
            .with(eq(tenant(2)), eq(5))
            .returning(|_, _| Err(DomainError::NotFound));

        let service = UserManager::new(Arc::new(repo));
        let result = service.get_user(tenant(2), 5).await;

        assert_eq!(result, Err(DomainError::NotFound));
    }

    #[tokio::test]
    async fn test_get_user_by_identity_trims_input() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_identity()
            .withf(|_, dni| dni == "A1")
            .returning(|_, dni| Ok(stored_user(1, dni)));

        let service = UserManager::new(Arc::new(repo));
        let user = service.get_user_by_identity(tenant(1), "  A1 ").await.unwrap();

        assert_eq!(user.dni, "A1");
    }

    #[tokio::test]
    async fn test_update_user_same_identity_is_not_a_conflict() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id()
            .returning(|_, id| Ok(stored_user(id, "A1")));
        repo.expect_get_by_identity()
            .returning(|_, dni| Ok(stored_user(4, dni)));
        repo.expect_update()
            .withf(|_, id, fields| *id == 4 && fields.first_name == "Pedro" && fields.dni == "A1")
            .times(1)
            .returning(|t, id, fields| Ok(User::new(id, t, fields, Utc::now())));

        let service = UserManager::new(Arc::new(repo));
        let patch = UserPatch {
            first_name: Some("Pedro".to_string()),
            ..Default::default()
        };
        let user = service.update_user(tenant(1), 4, patch).await.unwrap();

        assert_eq!(user.first_name, "Pedro");
        assert_eq!(user.last_name, "Perez");
    }

    #[tokio::test]
    async fn test_update_user_identity_taken_by_another_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id()
            .returning(|_, id| Ok(stored_user(id, "A1")));
        repo.expect_get_by_identity()
            .returning(|_, dni| Ok(stored_user(9, dni)));
        repo.expect_update().never();

        let service = UserManager::new(Arc::new(repo));
        let patch = UserPatch {
            dni: Some("B2".to_string()),
            ..Default::default()
        };
        let result = service.update_user(tenant(1), 4, patch).await;

        assert_eq!(result, Err(DomainError::DuplicateIdentity));
    }

    #[tokio::test]
    async fn test_update_user_validates_merged_record() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id()
            .returning(|_, id| Ok(stored_user(id, "A1")));
        repo.expect_update().never();

        let service = UserManager::new(Arc::new(repo));
        let patch = UserPatch {
            gender: Some("X".to_string()),
            ..Default::default()
        };
        let result = service.update_user(tenant(1), 4, patch).await;

        assert!(matches!(result, Err(DomainError::InvalidGender(_))));
    }

    #[tokio::test]
    async fn test_update_user_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id()
            .returning(|_, _| Err(DomainError::NotFound));
        repo.expect_update().never();

        let service = UserManager::new(Arc::new(repo));
        let result = service
            .update_user(tenant(1), 4, UserPatch::default())
            .await;

        assert_eq!(result, Err(DomainError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_user_success() {
        let mut repo = MockUserRepository::new();
        repo.expect_delete()
            .with(eq(tenant(1)), eq(4))
            .times(1)
            .returning(|_, _| Ok(()));

        let service = UserManager::new(Arc::new(repo));
        assert!(service.delete_user(tenant(1), 4).await.is_ok());
    }
}
