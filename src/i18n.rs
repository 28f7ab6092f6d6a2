//! Default form messages per locale.

use std::sync::{Arc, RwLock};

#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub enum Locale {
    #[default]
    System,
    Tag(String),
}

impl From<String> for Locale {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("system") {
            return Self::System;
        }
        Self::Tag(value.trim().to_string())
    }
}

impl From<&str> for Locale {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum MessageKey {
    SubmitSuccess,
    SubmitError,
    SubmitTimeout,
    FieldRequired,
    FieldInvalidEmail,
}

const DEFAULT_LOCALE: &str = "en";

type Catalog = &'static [(MessageKey, &'static str)];

const EN: Catalog = &[
    (MessageKey::SubmitSuccess, "Form submitted successfully!"),
    (
        MessageKey::SubmitError,
        "Something went wrong. Please try again.",
    ),
    (
        MessageKey::SubmitTimeout,
        "The request took too long. Please try again.",
    ),
    (MessageKey::FieldRequired, "This field is required"),
    (MessageKey::FieldInvalidEmail, "Enter a valid email address"),
];

const DE: Catalog = &[
    (MessageKey::SubmitSuccess, "Formular erfolgreich gesendet!"),
    (
        MessageKey::SubmitError,
        "Etwas ist schiefgelaufen. Bitte versuche es erneut.",
    ),
    (
        MessageKey::SubmitTimeout,
        "Die Anfrage hat zu lange gedauert. Bitte versuche es erneut.",
    ),
    (MessageKey::FieldRequired, "Dieses Feld ist erforderlich"),
    (
        MessageKey::FieldInvalidEmail,
        "Gib eine gültige E-Mail-Adresse ein",
    ),
];

const FR: Catalog = &[
    (MessageKey::SubmitSuccess, "Formulaire envoyé avec succès !"),
    (
        MessageKey::SubmitError,
        "Une erreur est survenue. Veuillez réessayer.",
    ),
    (
        MessageKey::SubmitTimeout,
        "La requête a pris trop de temps. Veuillez réessayer.",
    ),
    (MessageKey::FieldRequired, "Ce champ est obligatoire"),
    (
        MessageKey::FieldInvalidEmail,
        "Saisissez une adresse e-mail valide",
    ),
];

const LOCALES: &[(&str, Catalog)] = &[("en", EN), ("de", DE), ("fr", FR)];

#[derive(Clone)]
pub struct Messages {
    locale: Arc<RwLock<Locale>>,
}

impl Default for Messages {
    fn default() -> Self {
        Self::new(Locale::System)
    }
}

impl Messages {
    pub fn new(locale: impl Into<Locale>) -> Self {
        Self {
            locale: Arc::new(RwLock::new(locale.into())),
        }
    }

    pub fn locale(&self) -> Locale {
        match self.locale.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_locale(&self, locale: impl Into<Locale>) {
        let mut guard = match self.locale.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = locale.into();
    }

    pub fn resolved_locale(&self) -> &'static str {
        resolve_locale(self.requested_locale().as_deref())
    }

    pub fn t(&self, key: MessageKey) -> &'static str {
        lookup(self.resolved_locale(), key)
            .or_else(|| lookup(DEFAULT_LOCALE, key))
            .unwrap_or_default()
    }

    fn requested_locale(&self) -> Option<String> {
        match self.locale() {
            Locale::System => system_locale(),
            Locale::Tag(tag) => Some(tag),
        }
    }
}

#[cfg(feature = "i18n")]
fn system_locale() -> Option<String> {
    sys_locale::get_locale()
}

#[cfg(not(feature = "i18n"))]
fn system_locale() -> Option<String> {
    None
}

fn lookup(locale: &str, key: MessageKey) -> Option<&'static str> {
    LOCALES
        .iter()
        .find(|(tag, _)| *tag == locale)
        .and_then(|(_, catalog)| {
            catalog
                .iter()
                .find_map(|(candidate, text)| (*candidate == key).then_some(*text))
        })
}

fn resolve_locale(requested: Option<&str>) -> &'static str {
    let Some(requested) = requested else {
        return DEFAULT_LOCALE;
    };
    let normalized = normalize_locale_tag(requested);
    let language = normalized.split('-').next().unwrap_or_default();
    LOCALES
        .iter()
        .map(|(tag, _)| *tag)
        .find(|tag| *tag == normalized || *tag == language)
        .unwrap_or(DEFAULT_LOCALE)
}

fn normalize_locale_tag(tag: &str) -> String {
    let trimmed = tag.trim();
    let without_encoding = trimmed.split('.').next().unwrap_or(trimmed);
    let without_variant = without_encoding
        .split('@')
        .next()
        .unwrap_or(without_encoding);
    without_variant.replace('_', "-").to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_tags_fall_back_to_language() {
        let messages = Messages::new("de_AT.UTF-8");
        assert_eq!(messages.resolved_locale(), "de");
        assert_eq!(
            messages.t(MessageKey::SubmitSuccess),
            "Formular erfolgreich gesendet!"
        );
    }

    #[test]
    fn unknown_locale_uses_english() {
        let messages = Messages::new("ja-JP");
        assert_eq!(messages.resolved_locale(), "en");
        messages.set_locale("fr");
        assert_eq!(
            messages.t(MessageKey::FieldRequired),
            "Ce champ est obligatoire"
        );
    }

    #[test]
    fn system_keyword_parses_as_system_locale() {
        assert_eq!(Locale::from(" System "), Locale::System);
        assert_eq!(Locale::from("en-GB"), Locale::Tag("en-GB".into()));
    }
}
