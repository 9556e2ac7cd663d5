//! Request extractors.

mod validated_json;
mod validated_path;

pub use validated_json::ValidatedJson;
pub use validated_path::ValidatedPath;
