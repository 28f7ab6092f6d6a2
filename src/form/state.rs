use std::collections::BTreeSet;

use super::config::FormConfig;
use super::controller::{FormError, FormResult};
use super::definition::FormDefinition;
use super::validation::{ErrorMap, LiveValidation};
use super::value::{FieldValue, ValueMap};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SubmitFailure {
    /// Full validation failed; the error map names the fields.
    Validation,
    /// The submit callback returned an error.
    Rejected(String),
    /// The submit callback outlived the configured timeout.
    TimedOut,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum FormStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed(SubmitFailure),
}

impl FormStatus {
    pub fn is_submitting(&self) -> bool {
        matches!(self, FormStatus::Submitting)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, FormStatus::Succeeded | FormStatus::Failed(_))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BannerKind {
    Success,
    Error,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

#[derive(Clone, Debug)]
pub enum FormEvent {
    Change { name: String, value: FieldValue },
    Touch { name: String },
    FieldValidated { name: String, outcome: LiveValidation },
    SubmitStarted,
    ValidationFailed(ErrorMap),
    ValidationPassed,
    SubmitSucceeded { reset: bool },
    SubmitFailed(SubmitFailure),
    Reset,
}

/// Everything one form instance owns: values, errors, touched fields and
/// the submit status. Mutated only through [`FormState::apply`].
#[derive(Clone, Debug)]
pub struct FormState {
    pub(super) initial: ValueMap,
    pub(super) values: ValueMap,
    pub(super) errors: ErrorMap,
    pub(super) touched: BTreeSet<String>,
    pub(super) status: FormStatus,
    pub(super) submit_count: u32,
    /// Set from `SubmitStarted` until the submit settles, even if a reset
    /// moves the status back to `Idle` in between.
    pub(super) in_flight: bool,
}

impl FormState {
    pub fn new(initial: ValueMap) -> Self {
        Self {
            values: initial.clone(),
            initial,
            errors: ErrorMap::new(),
            touched: BTreeSet::new(),
            status: FormStatus::Idle,
            submit_count: 0,
            in_flight: false,
        }
    }

    pub fn values(&self) -> &ValueMap {
        &self.values
    }

    pub fn initial_values(&self) -> &ValueMap {
        &self.initial
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    pub fn submit_count(&self) -> u32 {
        self.submit_count
    }

    /// Whether a submit callback may still be running.
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.contains(name)
    }

    /// Error for `name` once the user has interacted with it or tried to
    /// submit.
    pub fn display_error(&self, name: &str) -> Option<&str> {
        if !self.is_touched(name) && self.submit_count == 0 {
            return None;
        }
        self.errors.get(name)
    }

    pub fn banner(&self, config: &FormConfig) -> Option<Banner> {
        let (kind, message) = match &self.status {
            FormStatus::Idle | FormStatus::Submitting => return None,
            FormStatus::Succeeded => (BannerKind::Success, &config.success_message),
            FormStatus::Failed(SubmitFailure::TimedOut) => {
                (BannerKind::Error, &config.timeout_message)
            }
            FormStatus::Failed(_) => (BannerKind::Error, &config.error_message),
        };
        Some(Banner {
            kind,
            message: message.clone(),
        })
    }

    pub fn apply(&mut self, definition: &FormDefinition, event: FormEvent) -> FormResult<()> {
        match event {
            FormEvent::Change { name, value } => {
                if let Err(error) = definition.check_value(&name, &value) {
                    tracing::warn!(%error, "rejecting field change");
                    return Err(error);
                }
                self.values.insert(name.clone(), value);
                self.touched.insert(name);
                if self.status.is_settled() {
                    self.transition(FormStatus::Idle)?;
                }
            }
            FormEvent::Touch { name } => {
                if definition.field(&name).is_none() {
                    return Err(FormError::UnknownField(name));
                }
                self.touched.insert(name);
            }
            FormEvent::FieldValidated { name, outcome } => match outcome {
                LiveValidation::Valid => {
                    self.errors.remove(&name);
                }
                LiveValidation::Invalid(message) => self.errors.insert(name, message),
                LiveValidation::Skipped => {}
            },
            FormEvent::SubmitStarted => {
                if self.in_flight {
                    return Err(FormError::AlreadySubmitting);
                }
                self.transition(FormStatus::Submitting)?;
                self.in_flight = true;
                self.submit_count = self.submit_count.saturating_add(1);
            }
            FormEvent::ValidationFailed(errors) => {
                self.in_flight = false;
                self.errors = errors;
                self.transition(FormStatus::Failed(SubmitFailure::Validation))?;
            }
            FormEvent::ValidationPassed => self.errors.clear(),
            FormEvent::SubmitSucceeded { reset } => {
                self.in_flight = false;
                self.transition(FormStatus::Succeeded)?;
                if reset {
                    self.values = self.initial.clone();
                    self.touched.clear();
                    self.errors.clear();
                }
            }
            FormEvent::SubmitFailed(failure) => {
                self.in_flight = false;
                self.transition(FormStatus::Failed(failure))?;
            }
            FormEvent::Reset => {
                self.values = self.initial.clone();
                self.errors.clear();
                self.touched.clear();
                self.submit_count = 0;
                self.transition(FormStatus::Idle)?;
            }
        }
        Ok(())
    }

    fn transition(&mut self, next: FormStatus) -> FormResult<()> {
        let allowed = matches!(
            (&self.status, &next),
            (
                FormStatus::Idle | FormStatus::Succeeded | FormStatus::Failed(_),
                FormStatus::Submitting
            ) | (
                FormStatus::Submitting,
                FormStatus::Succeeded | FormStatus::Failed(_)
            ) | (_, FormStatus::Idle)
        );
        if !allowed {
            return Err(FormError::InvalidStateTransition {
                from: self.status.clone(),
                to: next,
            });
        }
        tracing::debug!(from = ?self.status, to = ?next, "form status transition");
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::field::FieldSchema;
    use crate::form::rules::ObjectSchema;

    fn definition() -> FormDefinition {
        FormDefinition::new(
            [
                FieldSchema::email("email", "Email"),
                FieldSchema::checkbox("terms", "Terms"),
            ],
            ObjectSchema::new(),
        )
        .expect("definition")
    }

    fn state(definition: &FormDefinition) -> FormState {
        FormState::new(definition.initial_values(&FormConfig::default()))
    }

    fn change(name: &str, value: impl Into<FieldValue>) -> FormEvent {
        FormEvent::Change {
            name: name.into(),
            value: value.into(),
        }
    }

    #[test]
    fn change_writes_value_and_marks_touched() {
        let definition = definition();
        let mut state = state(&definition);
        state
            .apply(&definition, change("email", "a@b.com"))
            .expect("change");
        assert_eq!(state.values().text("email"), Some("a@b.com"));
        assert!(state.is_touched("email"));
        assert!(!state.is_touched("terms"));
    }

    #[test]
    fn change_rejects_unknown_names_and_wrong_types() {
        let definition = definition();
        let mut state = state(&definition);
        assert_eq!(
            state.apply(&definition, change("phone", "123")),
            Err(FormError::UnknownField("phone".into()))
        );
        assert!(matches!(
            state.apply(&definition, change("terms", "yes")),
            Err(FormError::TypeMismatch { .. })
        ));
        assert_eq!(state.values().bool("terms"), Some(false));
    }

    #[test]
    fn settled_status_returns_to_idle_on_change() {
        let definition = definition();
        let mut state = state(&definition);
        state
            .apply(&definition, FormEvent::SubmitStarted)
            .expect("start");
        state
            .apply(
                &definition,
                FormEvent::ValidationFailed(ErrorMap::new().with("email", "Required")),
            )
            .expect("fail");
        assert_eq!(
            state.status(),
            &FormStatus::Failed(SubmitFailure::Validation)
        );

        state.apply(&definition, change("email", "x")).expect("change");
        assert_eq!(state.status(), &FormStatus::Idle);
        assert_eq!(state.errors().get("email"), Some("Required"));
    }

    #[test]
    fn second_submit_start_is_refused() {
        let definition = definition();
        let mut state = state(&definition);
        state
            .apply(&definition, FormEvent::SubmitStarted)
            .expect("start");
        assert_eq!(
            state.apply(&definition, FormEvent::SubmitStarted),
            Err(FormError::AlreadySubmitting)
        );
        assert_eq!(state.submit_count(), 1);
    }

    #[test]
    fn reset_does_not_end_an_in_flight_submit() {
        let definition = definition();
        let mut state = state(&definition);
        state
            .apply(&definition, FormEvent::SubmitStarted)
            .expect("start");
        state.apply(&definition, FormEvent::Reset).expect("reset");
        assert_eq!(state.status(), &FormStatus::Idle);
        assert!(state.in_flight());
        assert_eq!(
            state.apply(&definition, FormEvent::SubmitStarted),
            Err(FormError::AlreadySubmitting)
        );

        assert!(matches!(
            state.apply(&definition, FormEvent::SubmitSucceeded { reset: false }),
            Err(FormError::InvalidStateTransition { .. })
        ));
        assert!(!state.in_flight());
        state
            .apply(&definition, FormEvent::SubmitStarted)
            .expect("start after settle");
        assert_eq!(state.status(), &FormStatus::Submitting);
    }

    #[test]
    fn rejection_leaves_existing_errors_alone() {
        let definition = definition();
        let mut state = state(&definition);
        state
            .apply(&definition, FormEvent::SubmitStarted)
            .expect("start");
        state.errors.insert("email", "Enter a valid email");
        let before = state.errors().clone();

        state
            .apply(
                &definition,
                FormEvent::SubmitFailed(SubmitFailure::Rejected("server down".into())),
            )
            .expect("reject");
        assert_eq!(state.errors(), &before);
    }

    #[test]
    fn success_without_submit_is_an_invalid_transition() {
        let definition = definition();
        let mut state = state(&definition);
        assert!(matches!(
            state.apply(&definition, FormEvent::SubmitSucceeded { reset: false }),
            Err(FormError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn skipped_live_validation_keeps_existing_error() {
        let definition = definition();
        let mut state = state(&definition);
        state
            .apply(
                &definition,
                FormEvent::FieldValidated {
                    name: "email".into(),
                    outcome: LiveValidation::Invalid("Enter a valid email".into()),
                },
            )
            .expect("invalid");
        state
            .apply(
                &definition,
                FormEvent::FieldValidated {
                    name: "email".into(),
                    outcome: LiveValidation::Skipped,
                },
            )
            .expect("skipped");
        assert_eq!(state.errors().get("email"), Some("Enter a valid email"));
    }

    #[test]
    fn errors_display_only_after_touch_or_submit() {
        let definition = definition();
        let mut state = state(&definition);
        state.errors.insert("email", "Required");
        assert_eq!(state.display_error("email"), None);
        state
            .apply(
                &definition,
                FormEvent::Touch {
                    name: "email".into(),
                },
            )
            .expect("touch");
        assert_eq!(state.display_error("email"), Some("Required"));
    }
}
