//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{DomainError, Gender, TenantId, User, UserStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub tenant_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub dni: String,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub birth_day: Date,
    /// `active` or `deleted`
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity.
///
/// Fails only on rows the service itself could never have written.
impl TryFrom<Model> for User {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = model.id;
        let corrupt = |what: &str| DomainError::storage(format!("user {} has invalid {}", id, what));
        let tenant_id = TenantId::try_from(model.tenant_id).map_err(|_| corrupt("tenant_id"))?;
        let gender = model
            .gender
            .parse::<Gender>()
            .map_err(|_| corrupt("gender"))?;

        Ok(User {
            id,
            tenant_id,
            first_name: model.first_name,
            last_name: model.last_name,
            dni: model.dni,
            gender,
            phone: model.phone,
            email: model.email,
            birth_date: model.birth_day,
            created_at: model.created_at,
            updated_at: model.updated_at,
            status: UserStatus::from(model.status.as_str()),
            deleted_at: model.deleted_at,
        })
    }
}
