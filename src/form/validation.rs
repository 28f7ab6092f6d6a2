use std::collections::BTreeMap;
use std::sync::Arc;

use super::schema::{Issue, Narrowed, Schema};
use super::value::{FieldValue, ValueMap};

/// First validation message per field, plus an optional form-level message.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorMap {
    fields: BTreeMap<String, String>,
    root: Option<String>,
}

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_issues(issues: impl IntoIterator<Item = Issue>) -> Self {
        let mut errors = Self::new();
        for issue in issues {
            match issue.top_level() {
                Some(name) => {
                    if !errors.fields.contains_key(name) {
                        errors.fields.insert(name.to_string(), issue.message);
                    }
                }
                None => {
                    errors.root.get_or_insert(issue.message);
                }
            }
        }
        errors
    }

    pub fn with(mut self, name: impl Into<String>, message: impl Into<String>) -> Self {
        self.insert(name, message);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.fields.insert(name.into(), message.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, message)| (name.as_str(), message.as_str()))
    }

    /// Name of the first failing field in `order`, falling back to map order.
    pub fn first_field<'a>(&'a self, order: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
        order
            .into_iter()
            .find(|name| self.fields.contains_key(*name))
            .or_else(|| self.fields.keys().next().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.root.is_none()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
        self.root = None;
    }
}

/// Outcome of validating one field on its own.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LiveValidation {
    Valid,
    Invalid(String),
    /// The schema could not be narrowed to this field; error state is left
    /// untouched.
    Skipped,
}

/// Runs a [`Schema`] against a value map and turns issues into an
/// [`ErrorMap`].
#[derive(Clone)]
pub struct ValidationAdapter {
    schema: Arc<dyn Schema>,
}

impl ValidationAdapter {
    pub fn new(schema: Arc<dyn Schema>) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Arc<dyn Schema> {
        &self.schema
    }

    pub fn validate_all(&self, values: &ValueMap) -> ErrorMap {
        match self.schema.validate(values) {
            Ok(()) => ErrorMap::new(),
            Err(issues) => ErrorMap::from_issues(issues),
        }
    }

    /// Validates `value` against the schema narrowed to `name`. Cross-field
    /// refinements are not part of the narrowed schema.
    pub fn validate_field(&self, name: &str, value: &FieldValue) -> LiveValidation {
        match self.schema.narrow(name) {
            Narrowed::Field(check) => match check.check(value) {
                Ok(()) => LiveValidation::Valid,
                Err(message) => LiveValidation::Invalid(message),
            },
            Narrowed::Unsupported => {
                tracing::debug!(field = name, "schema does not support field narrowing");
                LiveValidation::Skipped
            }
            Narrowed::Missing => {
                tracing::warn!(field = name, "unable to validate field: not in schema");
                LiveValidation::Skipped
            }
        }
    }
}
