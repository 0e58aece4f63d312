//! Custom request extractors.

mod path;
mod validated_json;

pub use path::ValidatedPath;
pub use validated_json::ValidatedJson;
