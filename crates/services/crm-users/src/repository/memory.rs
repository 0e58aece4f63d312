//! In-memory user repository.
//!
//! Enforces the same per-tenant unique constraints as the `users` table,
//! soft-deleted rows included, and reports violations by constraint name.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use domain::{DomainError, DomainResult, TenantId, User, UserFields, UserId};

use super::constraints::{duplicate_error, USERS_TENANT_DNI, USERS_TENANT_EMAIL, USERS_TENANT_PHONE};
use super::user_repository::{require_id, require_identity, UserRepository};

type Clash = fn(&User, &UserFields) -> bool;

const UNIQUE_CONSTRAINTS: [(&str, Clash); 3] = [
    (USERS_TENANT_DNI, |user, fields| user.dni == fields.dni),
    (USERS_TENANT_EMAIL, |user, fields| user.email == fields.email),
    (USERS_TENANT_PHONE, |user, fields| user.phone == fields.phone),
];

#[derive(Default)]
struct MemoryState {
    last_id: UserId,
    rows: BTreeMap<UserId, User>,
}

impl MemoryState {
    fn active(&self, tenant: TenantId, id: UserId) -> Option<&User> {
        self.rows
            .get(&id)
            .filter(|user| user.tenant_id == tenant && user.is_active())
    }

    /// First unique constraint `fields` would violate within `tenant`.
    fn violated_constraint(
        &self,
        tenant: TenantId,
        fields: &UserFields,
        exclude: Option<UserId>,
    ) -> Option<&'static str> {
        UNIQUE_CONSTRAINTS
            .iter()
            .find(|(_, clash)| {
                self.rows
                    .values()
                    .filter(|user| user.tenant_id == tenant && Some(user.id) != exclude)
                    .any(|user| clash(user, fields))
            })
            .map(|(name, _)| *name)
    }
}

/// User repository backed by process memory.
#[derive(Default)]
pub struct MemoryUserStore {
    state: Mutex<MemoryState>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> DomainResult<MutexGuard<'_, MemoryState>> {
        self.state.lock().map_err(|err| {
            tracing::error!(error = %err, "User store lock poisoned");
            DomainError::storage("user store lock poisoned")
        })
    }
}

#[async_trait]
impl UserRepository for MemoryUserStore {
    async fn create(&self, tenant: TenantId, fields: UserFields) -> DomainResult<User> {
        let mut state = self.state()?;
        if let Some(constraint) = state.violated_constraint(tenant, &fields, None) {
            return Err(duplicate_error(Some(constraint)));
        }

        state.last_id += 1;
        let user = User::new(state.last_id, tenant, fields, Utc::now());
        state.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, tenant: TenantId, id: UserId) -> DomainResult<User> {
        require_id(id)?;
        self.state()?
            .active(tenant, id)
            .cloned()
            .ok_or(DomainError::NotFound)
    }

    async fn get_by_identity(&self, tenant: TenantId, dni: &str) -> DomainResult<User> {
        require_identity(dni)?;
        self.state()?
            .rows
            .values()
            .find(|user| user.tenant_id == tenant && user.is_active() && user.dni == dni)
            .cloned()
            .ok_or(DomainError::NotFound)
    }

    async fn list(&self, tenant: TenantId) -> DomainResult<Vec<User>> {
        Ok(self
            .state()?
            .rows
            .values()
            .rev()
            .filter(|user| user.tenant_id == tenant && user.is_active())
            .cloned()
            .collect())
    }

    async fn update(&self, tenant: TenantId, id: UserId, fields: UserFields) -> DomainResult<User> {
        require_id(id)?;
        let mut state = self.state()?;
        if state.active(tenant, id).is_none() {
            return Err(DomainError::NotFound);
        }
        if let Some(constraint) = state.violated_constraint(tenant, &fields, Some(id)) {
            return Err(duplicate_error(Some(constraint)));
        }

        let user = state.rows.get_mut(&id).ok_or(DomainError::NotFound)?;
        user.apply(fields, Utc::now());
        Ok(user.clone())
    }

    async fn delete(&self, tenant: TenantId, id: UserId) -> DomainResult<()> {
        require_id(id)?;
        let mut state = self.state()?;
        if state.active(tenant, id).is_none() {
            return Err(DomainError::NotFound);
        }

        let user = state.rows.get_mut(&id).ok_or(DomainError::NotFound)?;
        user.soft_delete(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use domain::Gender;

    use super::*;

    fn tenant(id: u32) -> TenantId {
        TenantId::new(id).unwrap()
    }

    fn fields(dni: &str, email: &str, phone: &str) -> UserFields {
        UserFields {
            first_name: "Juan".to_string(),
            last_name: "Perez".to_string(),
            dni: dni.to_string(),
            gender: Gender::Male,
            phone: phone.to_string(),
            email: email.to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_ids_and_tenant() {
        let store = MemoryUserStore::new();

        let first = store.create(tenant(1), fields("A1", "a@x.com", "111")).await.unwrap();
        let second = store.create(tenant(1), fields("A2", "b@x.com", "222")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.tenant_id, tenant(1));
        assert!(first.is_active());
    }

    #[tokio::test]
    async fn test_duplicates_are_per_tenant() {
        let store = MemoryUserStore::new();
        store.create(tenant(1), fields("A1", "a@x.com", "111")).await.unwrap();

        assert_eq!(
            store.create(tenant(1), fields("A1", "z@x.com", "999")).await,
            Err(DomainError::DuplicateIdentity)
        );
        assert_eq!(
            store.create(tenant(1), fields("Z9", "a@x.com", "999")).await,
            Err(DomainError::DuplicateEmail)
        );
        assert_eq!(
            store.create(tenant(1), fields("Z9", "z@x.com", "111")).await,
            Err(DomainError::DuplicatePhone)
        );

        // Same attributes in another tenant are fine
        assert!(store.create(tenant(2), fields("A1", "a@x.com", "111")).await.is_ok());
    }

    #[tokio::test]
    async fn test_other_tenant_sees_not_found() {
        let store = MemoryUserStore::new();
        let user = store.create(tenant(1), fields("A1", "a@x.com", "111")).await.unwrap();

        assert_eq!(store.get_by_id(tenant(2), user.id).await, Err(DomainError::NotFound));
        assert_eq!(
            store.get_by_identity(tenant(2), "A1").await,
            Err(DomainError::NotFound)
        );
        assert_eq!(
            store.update(tenant(2), user.id, fields("B1", "b@x.com", "222")).await,
            Err(DomainError::NotFound)
        );
        assert_eq!(store.delete(tenant(2), user.id).await, Err(DomainError::NotFound));
        assert!(store.list(tenant(2)).await.unwrap().is_empty());

        // Untouched for the owner
        assert_eq!(store.get_by_id(tenant(1), user.id).await.unwrap(), user);
    }

    #[tokio::test]
    async fn test_soft_deleted_user_is_invisible() {
        let store = MemoryUserStore::new();
        let user = store.create(tenant(1), fields("A1", "a@x.com", "111")).await.unwrap();

        store.delete(tenant(1), user.id).await.unwrap();

        assert_eq!(store.get_by_id(tenant(1), user.id).await, Err(DomainError::NotFound));
        assert_eq!(store.get_by_identity(tenant(1), "A1").await, Err(DomainError::NotFound));
        assert!(store.list(tenant(1)).await.unwrap().is_empty());
        assert_eq!(store.delete(tenant(1), user.id).await, Err(DomainError::NotFound));
        assert_eq!(
            store.update(tenant(1), user.id, fields("A1", "a@x.com", "111")).await,
            Err(DomainError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_deleted_user_still_holds_unique_values() {
        let store = MemoryUserStore::new();
        let user = store.create(tenant(1), fields("A1", "a@x.com", "111")).await.unwrap();
        store.delete(tenant(1), user.id).await.unwrap();

        assert_eq!(
            store.create(tenant(1), fields("A1", "b@x.com", "222")).await,
            Err(DomainError::DuplicateIdentity)
        );
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = MemoryUserStore::new();
        for n in 1..=3 {
            store
                .create(tenant(1), fields(&format!("A{n}"), &format!("{n}@x.com"), &format!("{n}")))
                .await
                .unwrap();
        }
        store.create(tenant(2), fields("B1", "b@x.com", "9")).await.unwrap();

        let ids: Vec<UserId> = store.list(tenant(1)).await.unwrap().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_update_keeps_tenant_and_own_values() {
        let store = MemoryUserStore::new();
        let user = store.create(tenant(1), fields("A1", "a@x.com", "111")).await.unwrap();

        // Re-submitting its own dni/email/phone is not a conflict
        let mut changed = fields("A1", "a@x.com", "111");
        changed.first_name = "Pedro".to_string();
        let updated = store.update(tenant(1), user.id, changed).await.unwrap();

        assert_eq!(updated.id, user.id);
        assert_eq!(updated.tenant_id, tenant(1));
        assert_eq!(updated.first_name, "Pedro");
        assert_eq!(updated.created_at, user.created_at);
        assert_eq!(store.get_by_id(tenant(1), user.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_rejects_values_of_another_user() {
        let store = MemoryUserStore::new();
        store.create(tenant(1), fields("A1", "a@x.com", "111")).await.unwrap();
        let other = store.create(tenant(1), fields("A2", "b@x.com", "222")).await.unwrap();

        assert_eq!(
            store.update(tenant(1), other.id, fields("A2", "a@x.com", "222")).await,
            Err(DomainError::DuplicateEmail)
        );
        assert_eq!(store.get_by_id(tenant(1), other.id).await.unwrap(), other);
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let store = MemoryUserStore::new();

        assert!(matches!(
            store.get_by_id(tenant(1), 0).await,
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(matches!(
            store.delete(tenant(1), -4).await,
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(matches!(
            store.get_by_identity(tenant(1), "").await,
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_creates_keep_identity_unique() {
        let store = Arc::new(MemoryUserStore::new());

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .create(tenant(1), fields("A1", &format!("{n}@x.com"), &format!("{n}")))
                        .await
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(err) => assert_eq!(err, DomainError::DuplicateIdentity),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.list(tenant(1)).await.unwrap().len(), 1);
    }
}
