use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::value::{FieldValue, ValueKind, ValueMap};

pub type HiddenPredicate = Arc<dyn Fn(&ValueMap) -> bool + Send + Sync>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputType {
    Text,
    Email,
    Password,
    Tel,
    Url,
}

impl InputType {
    pub fn as_str(self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Email => "email",
            InputType::Password => "password",
            InputType::Tel => "tel",
            InputType::Url => "url",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
    pub disabled: bool,
}

impl ChoiceOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            disabled: false,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Closed set of field types; each variant carries its own attributes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldKind {
    Input(InputType),
    Number {
        min: Option<Decimal>,
        max: Option<Decimal>,
        step: Option<Decimal>,
    },
    Textarea {
        rows: u16,
    },
    Checkbox,
    Switch,
    Select {
        options: Vec<ChoiceOption>,
    },
    Radio {
        options: Vec<ChoiceOption>,
    },
    Date {
        min: Option<NaiveDate>,
        max: Option<NaiveDate>,
    },
    File {
        accept: Vec<String>,
        multiple: bool,
    },
    /// A type name that matched no widget. Renderers skip these fields.
    Unknown(String),
}

impl FieldKind {
    /// Parses a type name as used in declarative field lists
    /// (`"email"`, `"select"`, ...). Attributes start out empty.
    pub fn from_type_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "text" => FieldKind::Input(InputType::Text),
            "email" => FieldKind::Input(InputType::Email),
            "password" => FieldKind::Input(InputType::Password),
            "tel" => FieldKind::Input(InputType::Tel),
            "url" => FieldKind::Input(InputType::Url),
            "number" => FieldKind::Number {
                min: None,
                max: None,
                step: None,
            },
            "textarea" => FieldKind::Textarea { rows: 4 },
            "checkbox" => FieldKind::Checkbox,
            "switch" => FieldKind::Switch,
            "select" => FieldKind::Select {
                options: Vec::new(),
            },
            "radio" => FieldKind::Radio {
                options: Vec::new(),
            },
            "date" => FieldKind::Date {
                min: None,
                max: None,
            },
            "file" => FieldKind::File {
                accept: Vec::new(),
                multiple: false,
            },
            _ => FieldKind::Unknown(name.to_string()),
        }
    }

    /// Value shape this kind stores, `None` for unknown kinds.
    pub fn value_kind(&self) -> Option<ValueKind> {
        match self {
            FieldKind::Input(_)
            | FieldKind::Textarea { .. }
            | FieldKind::Select { .. }
            | FieldKind::Radio { .. } => Some(ValueKind::Text),
            FieldKind::Number { .. } => Some(ValueKind::Number),
            FieldKind::Checkbox | FieldKind::Switch => Some(ValueKind::Bool),
            FieldKind::Date { .. } => Some(ValueKind::Date),
            FieldKind::File { multiple: false, .. } => Some(ValueKind::File),
            FieldKind::File { multiple: true, .. } => Some(ValueKind::Files),
            FieldKind::Unknown(_) => None,
        }
    }

    pub fn empty_value(&self) -> Option<FieldValue> {
        let value = match self.value_kind()? {
            ValueKind::Text => FieldValue::Text(String::new()),
            ValueKind::Bool => FieldValue::Bool(false),
            ValueKind::Number => FieldValue::Number(None),
            ValueKind::Date => FieldValue::Date(None),
            ValueKind::File => FieldValue::File(None),
            ValueKind::Files => FieldValue::Files(Vec::new()),
        };
        Some(value)
    }
}

#[derive(Clone, Default)]
pub enum Hidden {
    #[default]
    Never,
    Always,
    When(HiddenPredicate),
}

impl Hidden {
    pub fn evaluate(&self, values: &ValueMap) -> bool {
        match self {
            Hidden::Never => false,
            Hidden::Always => true,
            Hidden::When(predicate) => predicate(values),
        }
    }
}

impl Debug for Hidden {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Hidden::Never => f.write_str("Never"),
            Hidden::Always => f.write_str("Always"),
            Hidden::When(_) => f.write_str("When(..)"),
        }
    }
}

impl From<bool> for Hidden {
    fn from(value: bool) -> Self {
        if value { Hidden::Always } else { Hidden::Never }
    }
}

/// Width of a field inside a group row.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum FieldWidth {
    /// Equal share of whatever the explicitly sized members leave over.
    #[default]
    Auto,
    Fraction(f32),
    Px(f32),
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum WidgetVariant {
    #[default]
    Default,
    Filled,
    Pill,
}

#[derive(Clone, Debug)]
pub struct FieldSchema {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub disabled: bool,
    pub group: Option<String>,
    pub width: FieldWidth,
    pub hidden: Hidden,
    pub default_value: Option<FieldValue>,
    pub placeholder: Option<String>,
    pub description: Option<String>,
    pub variant: Option<WidgetVariant>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: false,
            disabled: false,
            group: None,
            width: FieldWidth::Auto,
            hidden: Hidden::Never,
            default_value: None,
            placeholder: None,
            description: None,
            variant: None,
        }
    }

    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Input(InputType::Text))
    }

    pub fn email(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Input(InputType::Email))
    }

    pub fn password(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Input(InputType::Password))
    }

    pub fn number(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::from_type_name("number"))
    }

    pub fn textarea(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Textarea { rows: 4 })
    }

    pub fn checkbox(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Checkbox)
    }

    pub fn switch(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Switch)
    }

    pub fn select(
        name: impl Into<String>,
        label: impl Into<String>,
        options: impl IntoIterator<Item = ChoiceOption>,
    ) -> Self {
        Self::new(
            name,
            label,
            FieldKind::Select {
                options: options.into_iter().collect(),
            },
        )
    }

    pub fn radio(
        name: impl Into<String>,
        label: impl Into<String>,
        options: impl IntoIterator<Item = ChoiceOption>,
    ) -> Self {
        Self::new(
            name,
            label,
            FieldKind::Radio {
                options: options.into_iter().collect(),
            },
        )
    }

    pub fn date(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Date { min: None, max: None })
    }

    pub fn file(name: impl Into<String>, label: impl Into<String>, multiple: bool) -> Self {
        Self::new(
            name,
            label,
            FieldKind::File {
                accept: Vec::new(),
                multiple,
            },
        )
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn width(mut self, width: FieldWidth) -> Self {
        self.width = width;
        self
    }

    pub fn hidden(mut self, hidden: impl Into<Hidden>) -> Self {
        self.hidden = hidden.into();
        self
    }

    pub fn hidden_when(
        mut self,
        predicate: impl Fn(&ValueMap) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.hidden = Hidden::When(Arc::new(predicate));
        self
    }

    pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn variant(mut self, variant: WidgetVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Value used before the user or the form config supplies one.
    pub fn initial_value(&self) -> Option<FieldValue> {
        match &self.default_value {
            Some(value) if Some(value.kind()) == self.kind.value_kind() => Some(value.clone()),
            Some(value) => {
                tracing::warn!(
                    field = %self.name,
                    found = %value.kind(),
                    "ignoring field default of the wrong type"
                );
                self.kind.empty_value()
            }
            None => self.kind.empty_value(),
        }
    }

    pub fn accepts(&self, value: &FieldValue) -> bool {
        self.kind.value_kind() == Some(value.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_parse_into_kinds() {
        assert_eq!(
            FieldKind::from_type_name("Email"),
            FieldKind::Input(InputType::Email)
        );
        assert_eq!(FieldKind::from_type_name("switch"), FieldKind::Switch);
        assert_eq!(
            FieldKind::from_type_name("colour"),
            FieldKind::Unknown("colour".into())
        );
    }

    #[test]
    fn file_multiplicity_selects_value_shape() {
        let single = FieldSchema::file("avatar", "Avatar", false);
        let many = FieldSchema::file("attachments", "Attachments", true);
        assert_eq!(single.initial_value(), Some(FieldValue::File(None)));
        assert_eq!(many.initial_value(), Some(FieldValue::Files(Vec::new())));
    }

    #[test]
    fn mistyped_default_falls_back_to_empty_value() {
        let field = FieldSchema::checkbox("terms", "Terms").default_value("yes");
        assert_eq!(field.initial_value(), Some(FieldValue::Bool(false)));

        let field = FieldSchema::checkbox("terms", "Terms").default_value(true);
        assert_eq!(field.initial_value(), Some(FieldValue::Bool(true)));
    }

    #[test]
    fn unknown_kind_has_no_value() {
        let field = FieldSchema::new("x", "X", FieldKind::Unknown("slider".into()));
        assert_eq!(field.initial_value(), None);
        assert!(!field.accepts(&FieldValue::Text(String::new())));
    }
}
