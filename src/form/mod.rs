//! Schema-driven forms: field definitions, validation, visibility rules and
//! a submit controller. Rendering produces plain widget props so any UI
//! layer can draw them.

mod config;
mod controller;
mod definition;
mod field;
mod model;
mod render;
mod rules;
mod schema;
mod state;
mod validation;
mod value;
mod visibility;


pub use calmform_derive::FormModel;
pub use config::{FormConfig, FormLayout, Gap, ValidationMode};
pub use controller::{
    FormController, FormError, FormId, FormResult, FormSnapshot, SubmitError, SubmitOutcome,
};
pub use definition::FormDefinition;
pub use field::{
    ChoiceOption, FieldKind, FieldSchema, FieldWidth, Hidden, HiddenPredicate, InputType,
    WidgetVariant,
};
pub use model::{FieldData, FormModel, ModelError};
pub use render::{
    FieldView, FormView, GroupMember, MemberWidth, RenderedRow, RowView, Widget, WidgetSet, render,
};
pub use rules::{CustomRule, FieldRules, ObjectSchema, Refined, RefinementFn, Rule};
pub use schema::{FieldCheck, Issue, Narrowed, Schema};
pub use state::{Banner, BannerKind, FormEvent, FormState, FormStatus, SubmitFailure};
pub use validation::{ErrorMap, LiveValidation, ValidationAdapter};
pub use value::{FieldValue, FileRef, ValueKind, ValueMap};
pub use visibility::{is_hidden, visible_fields, visible_names};
