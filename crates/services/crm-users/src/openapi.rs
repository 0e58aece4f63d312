//! OpenAPI documentation.

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

use crate::handlers::user_handler::{
    CreateUserRequest, ListUsersResponse, UpdateUserRequest, UserResponse,
};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CRM Users",
        description = "Multi-tenant user management"
    ),
    paths(
        crate::handlers::user_handler::create_user,
        crate::handlers::user_handler::list_users,
        crate::handlers::user_handler::get_user_by_identity,
        crate::handlers::user_handler::get_user,
        crate::handlers::user_handler::update_user,
        crate::handlers::user_handler::delete_user,
    ),
    components(
        schemas(
            CreateUserRequest,
            UpdateUserRequest,
            UserResponse,
            ListUsersResponse,
        )
    ),
    modifiers(&TenantAddon),
    tags(
        (name = "Users", description = "Tenant-scoped user management endpoints"),
    )
)]
pub struct ApiDoc;

/// Tenant header security scheme.
struct TenantAddon;

impl Modify for TenantAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "tenant",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    domain::TENANT_HEADER,
                    "Numeric tenant identifier",
                ))),
            );
        }
    }
}
