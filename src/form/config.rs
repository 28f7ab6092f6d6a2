use std::time::Duration;

use super::field::WidgetVariant;
use super::value::{FieldValue, ValueMap};
use crate::i18n::{MessageKey, Messages};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FormLayout {
    #[default]
    Vertical,
    Horizontal,
    Grid { columns: usize },
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Gap {
    Xs,
    Sm,
    #[default]
    Md,
    Lg,
    Xl,
}

impl Gap {
    pub fn px(self) -> f32 {
        match self {
            Gap::Xs => 4.0,
            Gap::Sm => 6.0,
            Gap::Md => 8.0,
            Gap::Lg => 12.0,
            Gap::Xl => 16.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationMode {
    /// Validate a field on every change.
    OnChange,
    /// Validate a field when it is touched.
    OnBlur,
    /// Only validate when the form is submitted.
    OnSubmit,
}

#[derive(Clone, Debug)]
pub struct FormConfig {
    pub layout: FormLayout,
    /// Gap between grid cells. The other layouts render with `Gap::Md`.
    pub gap: Gap,
    pub default_values: ValueMap,
    pub success_message: String,
    pub error_message: String,
    pub timeout_message: String,
    pub reset_on_success: bool,
    pub validation_mode: ValidationMode,
    /// Upper bound for the submit callback. `None` waits indefinitely.
    pub submit_timeout: Option<Duration>,
    pub variant: WidgetVariant,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self::localized(&Messages::default())
    }
}

impl FormConfig {
    pub fn localized(messages: &Messages) -> Self {
        Self {
            layout: FormLayout::Vertical,
            gap: Gap::Md,
            default_values: ValueMap::new(),
            success_message: messages.t(MessageKey::SubmitSuccess).to_string(),
            error_message: messages.t(MessageKey::SubmitError).to_string(),
            timeout_message: messages.t(MessageKey::SubmitTimeout).to_string(),
            reset_on_success: false,
            validation_mode: ValidationMode::OnChange,
            submit_timeout: None,
            variant: WidgetVariant::Default,
        }
    }

    pub fn layout(mut self, layout: FormLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn grid(mut self, columns: usize, gap: Gap) -> Self {
        self.layout = FormLayout::Grid {
            columns: columns.max(1),
        };
        self.gap = gap;
        self
    }

    pub fn default_value(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.default_values.insert(name, value);
        self
    }

    pub fn default_values(mut self, values: ValueMap) -> Self {
        self.default_values = values;
        self
    }

    pub fn success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = message.into();
        self
    }

    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    pub fn timeout_message(mut self, message: impl Into<String>) -> Self {
        self.timeout_message = message.into();
        self
    }

    pub fn reset_on_success(mut self, reset: bool) -> Self {
        self.reset_on_success = reset;
        self
    }

    pub fn validation_mode(mut self, mode: ValidationMode) -> Self {
        self.validation_mode = mode;
        self
    }

    pub fn submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = Some(timeout);
        self
    }

    pub fn variant(mut self, variant: WidgetVariant) -> Self {
        self.variant = variant;
        self
    }
}
