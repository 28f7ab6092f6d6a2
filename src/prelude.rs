pub use crate::form::{
    ErrorMap, FieldKind, FieldRules, FieldSchema, FieldValue, FieldWidth, FileRef, FormConfig,
    FormController, FormDefinition, FormError, FormLayout, FormModel, FormResult, FormStatus,
    FormView, Gap, ObjectSchema, Schema, SubmitError, SubmitOutcome, ValidationMode, ValueMap,
    WidgetSet,
};
pub use crate::i18n::{Locale, MessageKey, Messages};

#[cfg(feature = "gpui")]
pub use crate::surface::FormSurface;
