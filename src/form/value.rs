use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::model::{FieldData, ModelError};

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct FileRef {
    pub name: String,
    pub size: u64,
    pub mime: Option<String>,
}

impl FileRef {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            mime: None,
        }
    }

    pub fn mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    pub fn extension(&self) -> Option<&str> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }
}

/// Shape of a [`FieldValue`], used to check that a value fits its field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueKind {
    Text,
    Bool,
    Number,
    Date,
    File,
    Files,
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueKind::Text => "text",
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::Date => "date",
            ValueKind::File => "file",
            ValueKind::Files => "file list",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    Number(Option<Decimal>),
    Date(Option<NaiveDate>),
    File(Option<FileRef>),
    Files(Vec<FileRef>),
}

impl FieldValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Text(_) => ValueKind::Text,
            FieldValue::Bool(_) => ValueKind::Bool,
            FieldValue::Number(_) => ValueKind::Number,
            FieldValue::Date(_) => ValueKind::Date,
            FieldValue::File(_) => ValueKind::File,
            FieldValue::Files(_) => ValueKind::Files,
        }
    }

    /// Whether the value counts as "not filled in". Booleans are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Bool(_) => false,
            FieldValue::Number(number) => number.is_none(),
            FieldValue::Date(date) => date.is_none(),
            FieldValue::File(file) => file.is_none(),
            FieldValue::Files(files) => files.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            FieldValue::Number(value) => *value,
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(value) => *value,
            _ => None,
        }
    }

    /// Files held by a single or multiple file value.
    pub fn files(&self) -> &[FileRef] {
        match self {
            FieldValue::File(Some(file)) => std::slice::from_ref(file),
            FieldValue::Files(files) => files,
            _ => &[],
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Number(Some(value))
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(Some(value))
    }
}

impl From<FileRef> for FieldValue {
    fn from(value: FileRef) -> Self {
        FieldValue::File(Some(value))
    }
}

impl From<Vec<FileRef>> for FieldValue {
    fn from(value: Vec<FileRef>) -> Self {
        FieldValue::Files(value)
    }
}

/// Current values of one form instance, keyed by field name.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ValueMap {
    entries: BTreeMap<String, FieldValue>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.entries.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.entries.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FieldValue::as_bool)
    }

    pub fn number(&self, name: &str) -> Option<Decimal> {
        self.get(name).and_then(FieldValue::as_number)
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        self.get(name).and_then(FieldValue::as_date)
    }

    pub fn decode<T>(&self, name: &str) -> Result<T, ModelError>
    where
        T: FieldData,
    {
        let value = self
            .get(name)
            .ok_or_else(|| ModelError::MissingField(name.to_string()))?;
        T::from_field(value).ok_or_else(|| ModelError::TypeMismatch {
            field: name.to_string(),
            found: value.kind(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ValueMap
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emptiness_follows_value_shape() {
        assert!(FieldValue::Text("   ".into()).is_empty());
        assert!(!FieldValue::Text("a".into()).is_empty());
        assert!(!FieldValue::Bool(false).is_empty());
        assert!(FieldValue::Number(None).is_empty());
        assert!(FieldValue::Files(Vec::new()).is_empty());
        assert!(!FieldValue::from(FileRef::new("cv.pdf", 10)).is_empty());
    }

    #[test]
    fn decode_reports_missing_and_mismatched_fields() {
        let values = ValueMap::new().with("email", "a@b.com").with("terms", true);

        assert_eq!(values.decode::<String>("email"), Ok("a@b.com".to_string()));
        assert_eq!(
            values.decode::<String>("terms"),
            Err(ModelError::TypeMismatch {
                field: "terms".into(),
                found: ValueKind::Bool,
            })
        );
        assert_eq!(
            values.decode::<bool>("newsletter"),
            Err(ModelError::MissingField("newsletter".into()))
        );
    }

    #[test]
    fn file_extension_ignores_trailing_dot() {
        assert_eq!(FileRef::new("avatar.png", 1).extension(), Some("png"));
        assert_eq!(FileRef::new("README", 1).extension(), None);
        assert_eq!(FileRef::new("odd.", 1).extension(), None);
    }
}
