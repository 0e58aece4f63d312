//! User handlers.
//!
//! Every route here sits behind the tenant middleware: the tenant comes from
//! the `X-Tenant-ID` header and request bodies have no way to set it.

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidateEmail, ValidationError};

use common::{AppError, AppResult};
use domain::{
    TenantId, User, UserDraft, UserId, UserPatch, BIRTH_DATE_FORMAT, MAX_DNI_LENGTH,
    MAX_EMAIL_LENGTH, MAX_FIRST_NAME_LENGTH, MAX_LAST_NAME_LENGTH, MAX_PHONE_LENGTH,
};

use crate::extractors::{ValidatedJson, ValidatedPath};
use crate::state::AppState;

/// User creation request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct CreateUserRequest {
    #[serde(rename = "firstname")]
    #[validate(length(max = MAX_FIRST_NAME_LENGTH, message = "firstname is too long"))]
    #[schema(example = "Juan")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    #[validate(length(max = MAX_LAST_NAME_LENGTH, message = "lastname is too long"))]
    #[schema(example = "Perez")]
    pub last_name: String,
    /// Identity number, unique per tenant
    #[validate(length(max = MAX_DNI_LENGTH, message = "dni is too long"))]
    #[schema(example = "30123456")]
    pub dni: String,
    /// "M" or "F"
    #[schema(example = "M")]
    pub gender: String,
    #[validate(length(max = MAX_PHONE_LENGTH, message = "phone is too long"))]
    #[schema(example = "1155550000")]
    pub phone: String,
    #[validate(
        length(max = MAX_EMAIL_LENGTH, message = "email is too long"),
        custom(function = "email_format")
    )]
    #[schema(example = "juan.perez@example.com")]
    pub email: String,
    /// Birth date as YYYY-MM-DD
    #[schema(example = "1990-05-17")]
    pub birth_day: String,
}

/// User update request, absent fields are left untouched
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(rename = "firstname")]
    #[validate(length(max = MAX_FIRST_NAME_LENGTH, message = "firstname is too long"))]
    pub first_name: Option<String>,
    #[serde(rename = "lastname")]
    #[validate(length(max = MAX_LAST_NAME_LENGTH, message = "lastname is too long"))]
    pub last_name: Option<String>,
    #[validate(length(max = MAX_DNI_LENGTH, message = "dni is too long"))]
    pub dni: Option<String>,
    pub gender: Option<String>,
    #[validate(length(max = MAX_PHONE_LENGTH, message = "phone is too long"))]
    pub phone: Option<String>,
    #[validate(
        length(max = MAX_EMAIL_LENGTH, message = "email is too long"),
        custom(function = "email_format")
    )]
    pub email: Option<String>,
    #[schema(example = "1990-05-17")]
    pub birth_day: Option<String>,
}

/// Identity number lookup
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Identity number to look up
    #[serde(default)]
    pub value: String,
}

/// User representation returned by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    pub tenant_id: u32,
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
    pub dni: String,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub birth_day: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            tenant_id: user.tenant_id.get(),
            first_name: user.first_name,
            last_name: user.last_name,
            dni: user.dni,
            gender: user.gender.as_str().to_string(),
            phone: user.phone,
            email: user.email,
            birth_day: user.birth_date,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// User listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListUsersResponse {
    pub users: Vec<UserResponse>,
}

impl TryFrom<CreateUserRequest> for UserDraft {
    type Error = AppError;

    fn try_from(req: CreateUserRequest) -> AppResult<Self> {
        Ok(UserDraft {
            birth_date: parse_birth_date(&req.birth_day)?,
            first_name: req.first_name,
            last_name: req.last_name,
            dni: req.dni,
            gender: req.gender,
            phone: req.phone,
            email: req.email,
        })
    }
}

impl TryFrom<UpdateUserRequest> for UserPatch {
    type Error = AppError;

    fn try_from(req: UpdateUserRequest) -> AppResult<Self> {
        let birth_date = match req.birth_day.as_deref() {
            Some(value) => parse_birth_date(value)?,
            None => None,
        };

        Ok(UserPatch {
            first_name: req.first_name,
            last_name: req.last_name,
            dni: req.dni,
            gender: req.gender,
            phone: req.phone,
            email: req.email,
            birth_date,
        })
    }
}

/// Blank means "no date"; anything else must be YYYY-MM-DD.
fn parse_birth_date(value: &str) -> AppResult<Option<NaiveDate>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, BIRTH_DATE_FORMAT)
        .map(Some)
        .map_err(|_| AppError::bad_request("birth_day must be a date formatted as YYYY-MM-DD"))
}

/// Blank emails are left to the required-field check.
fn email_format(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() || email.validate_email() {
        return Ok(());
    }
    let mut err = ValidationError::new("email");
    err.message = Some("Invalid email format".into());
    Err(err)
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/search", get(get_user_by_identity))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

/// Create a user in the caller's tenant
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    security(("tenant" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid tenant or user data"),
        (status = 409, description = "Identity number, email or phone already in use")
    )
)]
pub async fn create_user(
    Extension(tenant): Extension<TenantId>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let draft = UserDraft::try_from(payload)?;
    let user = state.user_service.create_user(tenant, draft).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// List the tenant's users, newest first
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    security(("tenant" = [])),
    responses(
        (status = 200, description = "Users of the tenant", body = ListUsersResponse),
        (status = 400, description = "Invalid tenant")
    )
)]
pub async fn list_users(
    Extension(tenant): Extension<TenantId>,
    State(state): State<AppState>,
) -> AppResult<Json<ListUsersResponse>> {
    let users = state.user_service.list_users(tenant).await?;

    Ok(Json(ListUsersResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// Find a user by identity number
#[utoipa::path(
    get,
    path = "/api/v1/users/search",
    tag = "Users",
    security(("tenant" = [])),
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching user", body = UserResponse),
        (status = 400, description = "Invalid tenant or empty value"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_by_identity(
    Extension(tenant): Extension<TenantId>,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .user_service
        .get_user_by_identity(tenant, &query.value)
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("tenant" = [])),
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 400, description = "Invalid tenant or id"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    Extension(tenant): Extension<TenantId>,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<UserId>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get_user(tenant, id).await?;

    Ok(Json(UserResponse::from(user)))
}

/// Partially update a user
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("tenant" = [])),
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid tenant or user data"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Identity number, email or phone already in use")
    )
)]
pub async fn update_user(
    Extension(tenant): Extension<TenantId>,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<UserId>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let patch = UserPatch::try_from(payload)?;
    let user = state.user_service.update_user(tenant, id, patch).await?;

    Ok(Json(UserResponse::from(user)))
}

/// Soft delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("tenant" = [])),
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Invalid tenant or id"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    Extension(tenant): Extension<TenantId>,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<UserId>,
) -> AppResult<StatusCode> {
    state.user_service.delete_user(tenant, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_birth_date_is_absent() {
        assert_eq!(parse_birth_date("").unwrap(), None);
        assert_eq!(parse_birth_date("  ").unwrap(), None);
    }

    #[test]
    fn test_birth_date_format() {
        assert_eq!(
            parse_birth_date("2000-01-31").unwrap(),
            NaiveDate::from_ymd_opt(2000, 1, 31)
        );
        for bad in ["31/01/2000", "2000-13-01", "yesterday"] {
            assert!(matches!(parse_birth_date(bad), Err(AppError::BadRequest(_))));
        }
    }

    #[test]
    fn test_email_format_skips_blank_and_trims() {
        assert!(email_format("").is_ok());
        assert!(email_format("  Juan@Example.com ").is_ok());
        assert!(email_format("not-an-email").is_err());
    }

    #[test]
    fn test_create_request_rejects_long_fields() {
        let req = CreateUserRequest {
            first_name: "x".repeat(31),
            ..Default::default()
        };
        assert!(req.validate().is_err());

        let req = CreateUserRequest {
            dni: "x".repeat(20),
            ..Default::default()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_request_maps_to_patch() {
        let req = UpdateUserRequest {
            phone: Some("222".to_string()),
            birth_day: Some("1990-05-17".to_string()),
            ..Default::default()
        };
        let patch = UserPatch::try_from(req).unwrap();

        assert_eq!(patch.phone.as_deref(), Some("222"));
        assert_eq!(patch.birth_date, NaiveDate::from_ymd_opt(1990, 5, 17));
        assert!(patch.first_name.is_none());
    }
}
