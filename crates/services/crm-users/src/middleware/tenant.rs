//! Tenant resolution middleware.

use axum::{extract::Request, middleware::Next, response::Response};

use common::AppResult;
use domain::{DomainError, TenantId, TENANT_HEADER};

/// Resolve the `X-Tenant-ID` header into a [`TenantId`].
///
/// The resolved tenant is inserted into the request extensions, where
/// handlers pick it up with `Extension<TenantId>`. Requests without a valid
/// tenant never reach a handler.
pub async fn tenant_middleware(mut request: Request, next: Next) -> AppResult<Response> {
    let token = match request.headers().get(TENANT_HEADER) {
        Some(value) => Some(value.to_str().map_err(|_| {
            DomainError::invalid_tenant(format!("{} must be a positive integer", TENANT_HEADER))
        })?),
        None => None,
    };

    let tenant = TenantId::resolve(token)?;
    tracing::debug!(tenant = %tenant, "Tenant resolved");

    request.extensions_mut().insert(tenant);

    Ok(next.run(request).await)
}
