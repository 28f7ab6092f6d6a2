use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use super::value::{FieldValue, FileRef, ValueKind, ValueMap};

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ModelError {
    #[error("form values are missing field `{0}`")]
    MissingField(String),
    #[error("field `{field}` holds a {found} value of the wrong type")]
    TypeMismatch { field: String, found: ValueKind },
}

/// Conversion between one Rust field type and a [`FieldValue`].
pub trait FieldData: Sized {
    fn from_field(value: &FieldValue) -> Option<Self>;
    fn into_field(self) -> FieldValue;
}

impl FieldData for String {
    fn from_field(value: &FieldValue) -> Option<Self> {
        value.as_text().map(str::to_string)
    }

    fn into_field(self) -> FieldValue {
        FieldValue::Text(self)
    }
}

impl FieldData for bool {
    fn from_field(value: &FieldValue) -> Option<Self> {
        value.as_bool()
    }

    fn into_field(self) -> FieldValue {
        FieldValue::Bool(self)
    }
}

impl FieldData for Option<Decimal> {
    fn from_field(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Number(number) => Some(*number),
            _ => None,
        }
    }

    fn into_field(self) -> FieldValue {
        FieldValue::Number(self)
    }
}

impl FieldData for Decimal {
    fn from_field(value: &FieldValue) -> Option<Self> {
        value.as_number()
    }

    fn into_field(self) -> FieldValue {
        FieldValue::Number(Some(self))
    }
}

impl FieldData for Option<NaiveDate> {
    fn from_field(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Date(date) => Some(*date),
            _ => None,
        }
    }

    fn into_field(self) -> FieldValue {
        FieldValue::Date(self)
    }
}

impl FieldData for NaiveDate {
    fn from_field(value: &FieldValue) -> Option<Self> {
        value.as_date()
    }

    fn into_field(self) -> FieldValue {
        FieldValue::Date(Some(self))
    }
}

impl FieldData for Option<FileRef> {
    fn from_field(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::File(file) => Some(file.clone()),
            _ => None,
        }
    }

    fn into_field(self) -> FieldValue {
        FieldValue::File(self)
    }
}

impl FieldData for Vec<FileRef> {
    fn from_field(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Files(files) => Some(files.clone()),
            _ => None,
        }
    }

    fn into_field(self) -> FieldValue {
        FieldValue::Files(self)
    }
}

/// A typed view over a [`ValueMap`], usually implemented with
/// `#[derive(FormModel)]`.
pub trait FormModel: Sized {
    const FIELDS: &'static [&'static str];

    fn from_values(values: &ValueMap) -> Result<Self, ModelError>;
    fn into_values(self) -> ValueMap;
}
