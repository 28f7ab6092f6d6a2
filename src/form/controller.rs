use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::future::{self, Either};
use futures_timer::Delay;
use thiserror::Error;

use super::config::{FormConfig, ValidationMode};
use super::definition::FormDefinition;
use super::model::FormModel;
use super::render::{self, FormView};
use super::state::{Banner, FormEvent, FormState, FormStatus, SubmitFailure};
use super::validation::{ErrorMap, LiveValidation, ValidationAdapter};
use super::value::{FieldValue, ValueKind, ValueMap};

static FORM_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FormId(pub u64);

impl FormId {
    pub fn next() -> Self {
        Self(FORM_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum FormError {
    #[error("form state lock poisoned while {0}")]
    StatePoisoned(&'static str),
    #[error("form defines field `{0}` more than once")]
    DuplicateField(String),
    #[error("form has no field named `{0}`")]
    UnknownField(String),
    #[error("field `{field}` cannot hold a {found} value")]
    TypeMismatch { field: String, found: ValueKind },
    #[error("invalid form status transition: {from:?} -> {to:?}")]
    InvalidStateTransition { from: FormStatus, to: FormStatus },
    #[error("form submit is already in progress")]
    AlreadySubmitting,
}

pub type FormResult<T> = Result<T, FormError>;

/// Failure reported by a submit callback. Its message is kept in the form
/// status; the banner shows the configured generic message.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("{message}")]
pub struct SubmitError {
    message: String,
}

impl SubmitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for SubmitError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for SubmitError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitOutcome {
    /// A submission was already in flight; nothing happened.
    Ignored,
    /// Full validation failed; the callback was not invoked.
    Invalid,
    Succeeded,
    Rejected,
    TimedOut,
}

#[derive(Clone, Debug)]
pub struct FormSnapshot {
    pub id: FormId,
    pub values: ValueMap,
    pub errors: ErrorMap,
    pub status: FormStatus,
    pub submit_count: u32,
    pub visible: Vec<String>,
    pub banner: Option<Banner>,
}

impl FormSnapshot {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Owns one form instance. Clones share the same state, so a clone can be
/// moved into widget change handlers.
#[derive(Clone)]
pub struct FormController {
    id: FormId,
    definition: Arc<FormDefinition>,
    config: Arc<FormConfig>,
    adapter: ValidationAdapter,
    state: Arc<RwLock<FormState>>,
}

impl FormController {
    pub fn new(definition: FormDefinition, config: FormConfig) -> Self {
        let initial = definition.initial_values(&config);
        let adapter = ValidationAdapter::new(definition.schema().clone());
        Self {
            id: FormId::next(),
            definition: Arc::new(definition),
            config: Arc::new(config),
            adapter,
            state: Arc::new(RwLock::new(FormState::new(initial))),
        }
    }

    pub fn id(&self) -> FormId {
        self.id
    }

    pub fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// Writes a new value for `name` and marks the field touched. In
    /// `OnChange` mode the field is validated on its own right away.
    pub fn change(&self, name: &str, value: impl Into<FieldValue>) -> FormResult<()> {
        self.apply(
            FormEvent::Change {
                name: name.to_string(),
                value: value.into(),
            },
            "applying field change",
        )?;
        if self.config.validation_mode == ValidationMode::OnChange {
            self.validate_field(name)?;
        }
        Ok(())
    }

    pub fn touch(&self, name: &str) -> FormResult<()> {
        self.apply(
            FormEvent::Touch {
                name: name.to_string(),
            },
            "touching field",
        )?;
        if self.config.validation_mode == ValidationMode::OnBlur {
            self.validate_field(name)?;
        }
        Ok(())
    }

    /// Replaces several values at once without marking fields touched or
    /// running live validation.
    pub fn set_values(&self, values: &ValueMap) -> FormResult<()> {
        for (name, value) in values.iter() {
            self.definition.check_value(name, value)?;
        }
        let mut state = write_lock(&self.state, "setting form values")?;
        for (name, value) in values.iter() {
            state.values.insert(name, value.clone());
        }
        Ok(())
    }

    /// Live validation for one field. Cross-field refinements do not run
    /// here; they only run on submit.
    pub fn validate_field(&self, name: &str) -> FormResult<LiveValidation> {
        let value = read_lock(&self.state, "reading value for field validation")?
            .values
            .get(name)
            .cloned();
        let Some(value) = value else {
            tracing::warn!(field = name, "unable to validate field without a value");
            return Ok(LiveValidation::Skipped);
        };
        let outcome = self.adapter.validate_field(name, &value);
        self.apply(
            FormEvent::FieldValidated {
                name: name.to_string(),
                outcome: outcome.clone(),
            },
            "applying field validation result",
        )?;
        Ok(outcome)
    }

    /// Runs the full schema and replaces the error map. The status is left
    /// alone.
    pub fn validate_form(&self) -> FormResult<ErrorMap> {
        let values = read_lock(&self.state, "reading values for form validation")?
            .values
            .clone();
        let errors = self.adapter.validate_all(&values);
        write_lock(&self.state, "applying form validation result")?.errors = errors.clone();
        Ok(errors)
    }

    /// Validates every value and, if they pass, hands them to `handler`.
    ///
    /// Validation failures, callback errors and timeouts end up in the form
    /// status; the returned error is reserved for a poisoned state lock.
    /// A submit while another one is in flight is ignored.
    pub async fn submit<F, Fut>(&self, handler: F) -> FormResult<SubmitOutcome>
    where
        F: FnOnce(ValueMap) -> Fut,
        Fut: Future<Output = Result<(), SubmitError>>,
    {
        let values = {
            let mut state = write_lock(&self.state, "starting submit")?;
            match state.apply(&self.definition, FormEvent::SubmitStarted) {
                Ok(()) => {}
                Err(FormError::AlreadySubmitting) => {
                    tracing::debug!(form = self.id.0, "ignoring submit while submitting");
                    return Ok(SubmitOutcome::Ignored);
                }
                Err(error) => return Err(error),
            }
            state.values.clone()
        };

        let errors = self.adapter.validate_all(&values);
        if !errors.is_empty() {
            tracing::debug!(
                form = self.id.0,
                invalid = errors.len(),
                "submit blocked by validation"
            );
            return self.settle(
                FormEvent::ValidationFailed(errors),
                SubmitOutcome::Invalid,
                "handling submit validation failure",
            );
        }
        self.apply(FormEvent::ValidationPassed, "clearing errors before submit")?;

        let (outcome, event) = match self.run_handler(handler(values)).await {
            Some(Ok(())) => (
                SubmitOutcome::Succeeded,
                FormEvent::SubmitSucceeded {
                    reset: self.config.reset_on_success,
                },
            ),
            Some(Err(error)) => {
                tracing::warn!(form = self.id.0, %error, "submit callback failed");
                (
                    SubmitOutcome::Rejected,
                    FormEvent::SubmitFailed(SubmitFailure::Rejected(error.message)),
                )
            }
            None => {
                tracing::warn!(form = self.id.0, "submit callback timed out");
                (
                    SubmitOutcome::TimedOut,
                    FormEvent::SubmitFailed(SubmitFailure::TimedOut),
                )
            }
        };

        self.settle(event, outcome, "completing submit")
    }

    /// Applies the event that ends a submit. If the form was reset in the
    /// meantime the status transition is refused; the submit still counts as
    /// finished.
    fn settle(
        &self,
        event: FormEvent,
        outcome: SubmitOutcome,
        context: &'static str,
    ) -> FormResult<SubmitOutcome> {
        let mut state = write_lock(&self.state, context)?;
        match state.apply(&self.definition, event) {
            Ok(()) => Ok(outcome),
            Err(FormError::InvalidStateTransition { from, .. }) => {
                tracing::debug!(form = self.id.0, ?from, "dropping stale submit result");
                Ok(outcome)
            }
            Err(error) => Err(error),
        }
    }

    /// Like [`FormController::submit`], but hands the handler a typed model.
    /// A conversion failure counts as a rejected submit.
    pub async fn submit_model<M, F, Fut>(&self, handler: F) -> FormResult<SubmitOutcome>
    where
        M: FormModel,
        F: FnOnce(M) -> Fut,
        Fut: Future<Output = Result<(), SubmitError>>,
    {
        self.submit(move |values| async move {
            let model = M::from_values(&values).map_err(|error| SubmitError::new(error.to_string()))?;
            handler(model).await
        })
        .await
    }

    async fn run_handler<Fut>(&self, fut: Fut) -> Option<Result<(), SubmitError>>
    where
        Fut: Future<Output = Result<(), SubmitError>>,
    {
        let Some(timeout) = self.config.submit_timeout else {
            return Some(fut.await);
        };
        match future::select(Box::pin(fut), Delay::new(timeout)).await {
            Either::Left((result, _)) => Some(result),
            Either::Right(((), _)) => None,
        }
    }

    pub fn reset(&self) -> FormResult<()> {
        self.apply(FormEvent::Reset, "resetting form")
    }

    pub fn status(&self) -> FormResult<FormStatus> {
        Ok(read_lock(&self.state, "reading form status")?.status.clone())
    }

    /// True while a submit callback runs, including after a reset issued
    /// during that submit.
    pub fn is_submitting(&self) -> FormResult<bool> {
        Ok(read_lock(&self.state, "reading form status")?.in_flight())
    }

    pub fn values(&self) -> FormResult<ValueMap> {
        Ok(read_lock(&self.state, "reading form values")?.values.clone())
    }

    pub fn errors(&self) -> FormResult<ErrorMap> {
        Ok(read_lock(&self.state, "reading form errors")?.errors.clone())
    }

    /// Names of the fields `view` renders, in definition order. Fields of an
    /// unknown kind are never listed.
    pub fn visible_fields(&self) -> FormResult<Vec<String>> {
        Ok(self
            .view()?
            .field_names()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot> {
        let visible = self.visible_fields()?;
        let state = read_lock(&self.state, "creating form snapshot")?;
        Ok(FormSnapshot {
            id: self.id,
            values: state.values.clone(),
            errors: state.errors.clone(),
            status: state.status.clone(),
            submit_count: state.submit_count,
            visible,
            banner: state.banner(&self.config),
        })
    }

    /// Widget props for the fields that are currently visible.
    pub fn view(&self) -> FormResult<FormView> {
        let state = read_lock(&self.state, "rendering form view")?;
        Ok(render::render(&self.definition, &state, &self.config))
    }

    /// First field with an error, in definition order.
    pub fn first_error(&self) -> FormResult<Option<String>> {
        let state = read_lock(&self.state, "reading first error")?;
        Ok(state
            .errors
            .first_field(self.definition.names())
            .map(str::to_string))
    }

    fn apply(&self, event: FormEvent, context: &'static str) -> FormResult<()> {
        write_lock(&self.state, context)?.apply(&self.definition, event)
    }
}

pub(super) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(super) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
