mod manifest;
mod plan;
mod schema;

pub use manifest::{ManifestParse, parse_sources_manifest};
pub use plan::{count_decisions, count_placeholders, planned_questions};
pub use schema::schema_tables;
