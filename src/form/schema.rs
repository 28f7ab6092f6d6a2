use super::value::{FieldValue, ValueMap};

/// One validation failure reported by a [`Schema`].
///
/// `path` starts at the top-level field name; an empty path marks a
/// form-level issue.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Issue {
    pub path: Vec<String>,
    pub message: String,
}

impl Issue {
    pub fn field(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: vec![name.into()],
            message: message.into(),
        }
    }

    pub fn root(message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            message: message.into(),
        }
    }

    pub fn top_level(&self) -> Option<&str> {
        self.path.first().map(String::as_str)
    }
}

/// Validates a single field value in isolation.
pub trait FieldCheck: Send + Sync {
    fn check(&self, value: &FieldValue) -> Result<(), String>;
}

impl<F> FieldCheck for F
where
    F: Fn(&FieldValue) -> Result<(), String> + Send + Sync,
{
    fn check(&self, value: &FieldValue) -> Result<(), String> {
        (self)(value)
    }
}

/// Result of asking a schema for a single-field sub-validator.
pub enum Narrowed<'a> {
    Field(&'a dyn FieldCheck),
    /// The schema cannot be narrowed at all; live validation is skipped.
    Unsupported,
    /// The schema supports narrowing but knows no such field.
    Missing,
}

/// Validator for a whole value map.
pub trait Schema: Send + Sync {
    fn validate(&self, values: &ValueMap) -> Result<(), Vec<Issue>>;

    fn narrow(&self, _field: &str) -> Narrowed<'_> {
        Narrowed::Unsupported
    }
}

impl<F> Schema for F
where
    F: Fn(&ValueMap) -> Result<(), Vec<Issue>> + Send + Sync,
{
    fn validate(&self, values: &ValueMap) -> Result<(), Vec<Issue>> {
        (self)(values)
    }
}
