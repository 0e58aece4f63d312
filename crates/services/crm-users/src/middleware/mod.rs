//! Request middleware.

mod tenant;

pub use tenant::tenant_middleware;
