use std::collections::BTreeSet;
use std::sync::Arc;

use super::config::FormConfig;
use super::controller::{FormError, FormResult};
use super::field::FieldSchema;
use super::schema::Schema;
use super::value::{FieldValue, ValueMap};

/// Ordered field list plus the schema that validates it. Immutable once
/// built.
#[derive(Clone)]
pub struct FormDefinition {
    fields: Vec<FieldSchema>,
    schema: Arc<dyn Schema>,
}

impl FormDefinition {
    pub fn new(
        fields: impl IntoIterator<Item = FieldSchema>,
        schema: impl Schema + 'static,
    ) -> FormResult<Self> {
        Self::with_shared_schema(fields, Arc::new(schema))
    }

    pub fn with_shared_schema(
        fields: impl IntoIterator<Item = FieldSchema>,
        schema: Arc<dyn Schema>,
    ) -> FormResult<Self> {
        let fields = fields.into_iter().collect::<Vec<_>>();
        let mut seen = BTreeSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(FormError::DuplicateField(field.name.clone()));
            }
        }
        Ok(Self { fields, schema })
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn schema(&self) -> &Arc<dyn Schema> {
        &self.schema
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    /// Checks that `value` may be stored under `name`.
    pub fn check_value(&self, name: &str, value: &FieldValue) -> FormResult<()> {
        let field = self
            .field(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        if field.accepts(value) {
            Ok(())
        } else {
            Err(FormError::TypeMismatch {
                field: name.to_string(),
                found: value.kind(),
            })
        }
    }

    /// Starting values: the config's defaults where they fit, otherwise each
    /// field's own default. Fields of unknown kind get no entry.
    pub fn initial_values(&self, config: &FormConfig) -> ValueMap {
        let mut values = ValueMap::new();
        for field in &self.fields {
            let configured = config
                .default_values
                .get(&field.name)
                .filter(|value| {
                    let fits = field.accepts(value);
                    if !fits {
                        tracing::warn!(
                            field = %field.name,
                            found = %value.kind(),
                            "ignoring configured default of the wrong type"
                        );
                    }
                    fits
                })
                .cloned();
            if let Some(value) = configured.or_else(|| field.initial_value()) {
                values.insert(field.name.clone(), value);
            }
        }
        for name in config.default_values.names() {
            if self.field(name).is_none() {
                tracing::warn!(field = name, "default value for a field the form does not define");
            }
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::field::FieldKind;
    use crate::form::rules::ObjectSchema;

    #[test]
    fn duplicate_names_are_rejected() {
        let result = FormDefinition::new(
            [
                FieldSchema::email("email", "Email"),
                FieldSchema::text("email", "Email again"),
            ],
            ObjectSchema::new(),
        );
        assert_eq!(
            result.err().map(|error| error.to_string()),
            Some("form defines field `email` more than once".to_string())
        );
    }

    #[test]
    fn initial_values_prefer_config_defaults_that_fit() {
        let definition = FormDefinition::new(
            [
                FieldSchema::text("name", "Name").default_value("Ada"),
                FieldSchema::checkbox("terms", "Terms"),
                FieldSchema::text("city", "City"),
                FieldSchema::new("rating", "Rating", FieldKind::Unknown("stars".into())),
            ],
            ObjectSchema::new(),
        )
        .expect("definition");
        let config = FormConfig::default()
            .default_value("city", "Berlin")
            .default_value("terms", "yes");

        let values = definition.initial_values(&config);
        assert_eq!(values.text("name"), Some("Ada"));
        assert_eq!(values.text("city"), Some("Berlin"));
        assert_eq!(values.bool("terms"), Some(false));
        assert!(!values.contains("rating"));
    }
}
