use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("site profile is not valid TOML: {0}")]
    MalformedProfile(String),
    #[error("site profile version {0} is not supported")]
    UnsupportedProfileVersion(u32),
    #[error("keyword table {table} has an empty keyword for label {label:?}")]
    EmptyKeyword { table: &'static str, label: String },
    #[error("keyword table {0} needs a non-empty default")]
    MissingDefault(&'static str),
    #[error("page has no place to insert navigation links")]
    NoInsertionPoint,
}
