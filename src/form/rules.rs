//! Built-in object schema with per-field rules and cross-field refinements.

use std::fmt::{Debug, Formatter};
use std::sync::{Arc, LazyLock};

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;

use super::schema::{FieldCheck, Issue, Narrowed, Schema};
use super::value::{FieldValue, ValueMap};
use crate::i18n::{MessageKey, Messages};

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("EMAIL_REGEX: invalid regex pattern")
});

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("URL_REGEX: invalid regex pattern")
});

pub type CustomRule = Arc<dyn Fn(&FieldValue) -> Result<(), String> + Send + Sync>;
pub type RefinementFn = Arc<dyn Fn(&ValueMap) -> bool + Send + Sync>;

#[derive(Clone)]
pub enum Rule {
    Required(String),
    Email(String),
    Url(String),
    Pattern(Regex, String),
    MinLength(usize, String),
    MaxLength(usize, String),
    OneOf(Vec<String>, String),
    Checked(String),
    MinNumber(Decimal, String),
    MaxNumber(Decimal, String),
    MinDate(NaiveDate, String),
    MaxDate(NaiveDate, String),
    MaxFileSize(u64, String),
    Accept(Vec<String>, String),
    MaxFiles(usize, String),
    Custom(CustomRule),
}

impl Rule {
    /// Checks one value. Format rules do not fire on empty values; that is
    /// the job of `Required`.
    fn check(&self, value: &FieldValue) -> Result<(), String> {
        let fail = |message: &String| -> Result<(), String> { Err(message.clone()) };
        match self {
            Rule::Required(message) => {
                if value.is_empty() {
                    return fail(message);
                }
            }
            Rule::Email(message) => {
                if non_empty_text(value).is_some_and(|text| !EMAIL_REGEX.is_match(text)) {
                    return fail(message);
                }
            }
            Rule::Url(message) => {
                if non_empty_text(value).is_some_and(|text| !URL_REGEX.is_match(text)) {
                    return fail(message);
                }
            }
            Rule::Pattern(pattern, message) => {
                if non_empty_text(value).is_some_and(|text| !pattern.is_match(text)) {
                    return fail(message);
                }
            }
            Rule::MinLength(min, message) => {
                if non_empty_text(value).is_some_and(|text| text.chars().count() < *min) {
                    return fail(message);
                }
            }
            Rule::MaxLength(max, message) => {
                if value.as_text().is_some_and(|text| text.chars().count() > *max) {
                    return fail(message);
                }
            }
            Rule::OneOf(allowed, message) => {
                if non_empty_text(value)
                    .is_some_and(|text| !allowed.iter().any(|candidate| candidate == text))
                {
                    return fail(message);
                }
            }
            Rule::Checked(message) => {
                if value.as_bool() == Some(false) {
                    return fail(message);
                }
            }
            Rule::MinNumber(min, message) => {
                if value.as_number().is_some_and(|number| number < *min) {
                    return fail(message);
                }
            }
            Rule::MaxNumber(max, message) => {
                if value.as_number().is_some_and(|number| number > *max) {
                    return fail(message);
                }
            }
            Rule::MinDate(min, message) => {
                if value.as_date().is_some_and(|date| date < *min) {
                    return fail(message);
                }
            }
            Rule::MaxDate(max, message) => {
                if value.as_date().is_some_and(|date| date > *max) {
                    return fail(message);
                }
            }
            Rule::MaxFileSize(max, message) => {
                if value.files().iter().any(|file| file.size > *max) {
                    return fail(message);
                }
            }
            Rule::Accept(accepted, message) => {
                if value
                    .files()
                    .iter()
                    .any(|file| !accepted.iter().any(|pattern| file_matches(file, pattern)))
                {
                    return fail(message);
                }
            }
            Rule::MaxFiles(max, message) => {
                if value.files().len() > *max {
                    return fail(message);
                }
            }
            Rule::Custom(check) => check(value)?,
        }
        Ok(())
    }
}

impl Debug for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Rule::Required(_) => "Required",
            Rule::Email(_) => "Email",
            Rule::Url(_) => "Url",
            Rule::Pattern(..) => "Pattern",
            Rule::MinLength(..) => "MinLength",
            Rule::MaxLength(..) => "MaxLength",
            Rule::OneOf(..) => "OneOf",
            Rule::Checked(_) => "Checked",
            Rule::MinNumber(..) => "MinNumber",
            Rule::MaxNumber(..) => "MaxNumber",
            Rule::MinDate(..) => "MinDate",
            Rule::MaxDate(..) => "MaxDate",
            Rule::MaxFileSize(..) => "MaxFileSize",
            Rule::Accept(..) => "Accept",
            Rule::MaxFiles(..) => "MaxFiles",
            Rule::Custom(_) => "Custom",
        };
        f.write_str(name)
    }
}

fn non_empty_text(value: &FieldValue) -> Option<&str> {
    value.as_text().filter(|text| !text.is_empty())
}

/// `pattern` is a mime type (`image/png`), a mime family (`image/*`) or an
/// extension (`.pdf`).
fn file_matches(file: &super::value::FileRef, pattern: &str) -> bool {
    let pattern = pattern.trim().to_ascii_lowercase();
    if let Some(extension) = pattern.strip_prefix('.') {
        return file
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
    }
    let Some(mime) = file.mime.as_deref().map(str::to_ascii_lowercase) else {
        return false;
    };
    match pattern.strip_suffix("/*") {
        Some(family) => mime.split('/').next() == Some(family),
        None => mime == pattern,
    }
}

/// Ordered rules for one field. The first failing rule wins.
#[derive(Clone, Debug, Default)]
pub struct FieldRules {
    rules: Vec<Rule>,
}

impl FieldRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn required(self, message: impl Into<String>) -> Self {
        self.rule(Rule::Required(message.into()))
    }

    pub fn email(self, message: impl Into<String>) -> Self {
        self.rule(Rule::Email(message.into()))
    }

    /// `required` and `email` with the catalog messages for the active
    /// locale.
    pub fn localized_email(self, messages: &Messages) -> Self {
        self.required(messages.t(MessageKey::FieldRequired))
            .email(messages.t(MessageKey::FieldInvalidEmail))
    }

    pub fn url(self, message: impl Into<String>) -> Self {
        self.rule(Rule::Url(message.into()))
    }

    pub fn pattern(self, pattern: Regex, message: impl Into<String>) -> Self {
        self.rule(Rule::Pattern(pattern, message.into()))
    }

    pub fn min_length(self, min: usize, message: impl Into<String>) -> Self {
        self.rule(Rule::MinLength(min, message.into()))
    }

    pub fn max_length(self, max: usize, message: impl Into<String>) -> Self {
        self.rule(Rule::MaxLength(max, message.into()))
    }

    pub fn one_of<I, S>(self, allowed: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule(Rule::OneOf(
            allowed.into_iter().map(Into::into).collect(),
            message.into(),
        ))
    }

    pub fn checked(self, message: impl Into<String>) -> Self {
        self.rule(Rule::Checked(message.into()))
    }

    pub fn min_number(self, min: Decimal, message: impl Into<String>) -> Self {
        self.rule(Rule::MinNumber(min, message.into()))
    }

    pub fn max_number(self, max: Decimal, message: impl Into<String>) -> Self {
        self.rule(Rule::MaxNumber(max, message.into()))
    }

    pub fn min_date(self, min: NaiveDate, message: impl Into<String>) -> Self {
        self.rule(Rule::MinDate(min, message.into()))
    }

    pub fn max_date(self, max: NaiveDate, message: impl Into<String>) -> Self {
        self.rule(Rule::MaxDate(max, message.into()))
    }

    pub fn max_file_size(self, bytes: u64, message: impl Into<String>) -> Self {
        self.rule(Rule::MaxFileSize(bytes, message.into()))
    }

    pub fn accept<I, S>(self, patterns: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule(Rule::Accept(
            patterns.into_iter().map(Into::into).collect(),
            message.into(),
        ))
    }

    pub fn max_files(self, max: usize, message: impl Into<String>) -> Self {
        self.rule(Rule::MaxFiles(max, message.into()))
    }

    pub fn custom(
        self,
        check: impl Fn(&FieldValue) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.rule(Rule::Custom(Arc::new(check)))
    }

    fn required_message(&self) -> Option<&str> {
        self.rules.iter().find_map(|rule| match rule {
            Rule::Required(message) => Some(message.as_str()),
            _ => None,
        })
    }

    fn check_missing(&self) -> Result<(), String> {
        match self.required_message() {
            Some(message) => Err(message.to_string()),
            None => Ok(()),
        }
    }
}

impl FieldCheck for FieldRules {
    fn check(&self, value: &FieldValue) -> Result<(), String> {
        self.rules.iter().try_for_each(|rule| rule.check(value))
    }
}

/// Object-shaped schema: one [`FieldRules`] per field name. Values for
/// names the schema does not know are ignored.
#[derive(Clone, Debug, Default)]
pub struct ObjectSchema {
    fields: Vec<(String, FieldRules)>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, rules: FieldRules) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => *existing = rules,
            None => self.fields.push((name, rules)),
        }
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn rules(&self, name: &str) -> Option<&FieldRules> {
        self.fields
            .iter()
            .find_map(|(field, rules)| (field == name).then_some(rules))
    }

    /// Wraps the schema with a cross-field check. A failing check reports
    /// `message` at `path` (empty for a form-level message).
    pub fn refine<P>(
        self,
        check: impl Fn(&ValueMap) -> bool + Send + Sync + 'static,
        path: P,
        message: impl Into<String>,
    ) -> Refined<Self>
    where
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Refined::new(self).refine(check, path, message)
    }
}

impl Schema for ObjectSchema {
    fn validate(&self, values: &ValueMap) -> Result<(), Vec<Issue>> {
        let issues = self
            .fields
            .iter()
            .filter_map(|(name, rules)| {
                let outcome = match values.get(name) {
                    Some(value) => rules.check(value),
                    None => rules.check_missing(),
                };
                outcome.err().map(|message| Issue::field(name.clone(), message))
            })
            .collect::<Vec<_>>();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    fn narrow(&self, field: &str) -> Narrowed<'_> {
        match self.rules(field) {
            Some(rules) => Narrowed::Field(rules),
            None => Narrowed::Missing,
        }
    }
}

#[derive(Clone)]
struct Refinement {
    check: RefinementFn,
    path: Vec<String>,
    message: String,
}

/// A schema with cross-field checks layered on top. The checks only run
/// once the inner schema passes, and narrowing goes straight to the inner
/// schema, so live single-field validation never sees them.
#[derive(Clone)]
pub struct Refined<S> {
    inner: S,
    refinements: Vec<Refinement>,
}

impl<S> Refined<S>
where
    S: Schema,
{
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            refinements: Vec::new(),
        }
    }

    pub fn refine<P>(
        mut self,
        check: impl Fn(&ValueMap) -> bool + Send + Sync + 'static,
        path: P,
        message: impl Into<String>,
    ) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
    {
        self.refinements.push(Refinement {
            check: Arc::new(check),
            path: path.into_iter().map(Into::into).collect(),
            message: message.into(),
        });
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S> Schema for Refined<S>
where
    S: Schema,
{
    fn validate(&self, values: &ValueMap) -> Result<(), Vec<Issue>> {
        self.inner.validate(values)?;
        let issues = self
            .refinements
            .iter()
            .filter(|refinement| !(refinement.check)(values))
            .map(|refinement| Issue {
                path: refinement.path.clone(),
                message: refinement.message.clone(),
            })
            .collect::<Vec<_>>();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    fn narrow(&self, field: &str) -> Narrowed<'_> {
        self.inner.narrow(field)
    }
}

impl<S> Debug for Refined<S>
where
    S: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Refined")
            .field("inner", &self.inner)
            .field("refinements", &self.refinements.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::value::FileRef;

    #[test]
    fn localized_email_rules_use_catalog_messages() {
        let rules = FieldRules::new().localized_email(&Messages::new("de-DE"));
        assert_eq!(
            rules.check(&FieldValue::from("")),
            Err("Dieses Feld ist erforderlich".to_string())
        );
        assert!(rules.check(&FieldValue::from("not-an-email")).is_err());
        assert_eq!(rules.check(&FieldValue::from("a@b.com")), Ok(()));
    }

    fn signup_schema() -> Refined<ObjectSchema> {
        ObjectSchema::new()
            .field(
                "email",
                FieldRules::new()
                    .required("Email is required")
                    .email("Enter a valid email"),
            )
            .field(
                "password",
                FieldRules::new()
                    .required("Password is required")
                    .min_length(8, "At least 8 characters"),
            )
            .field("confirmPassword", FieldRules::new().required("Confirm it"))
            .refine(
                |values| values.text("password") == values.text("confirmPassword"),
                ["confirmPassword"],
                "Passwords do not match",
            )
    }

    #[test]
    fn first_failing_rule_reports_its_message() {
        let rules = FieldRules::new()
            .required("Email is required")
            .email("Enter a valid email");
        assert_eq!(
            rules.check(&"".into()),
            Err("Email is required".to_string())
        );
        assert_eq!(
            rules.check(&"not-an-email".into()),
            Err("Enter a valid email".to_string())
        );
        assert_eq!(rules.check(&"a@b.com".into()), Ok(()));
    }

    #[test]
    fn format_rules_skip_empty_optional_values() {
        let rules = FieldRules::new()
            .url("Enter a valid URL")
            .min_length(3, "Too short");
        assert_eq!(rules.check(&"".into()), Ok(()));
        assert_eq!(
            rules.check(&"ftp".into()),
            Err("Enter a valid URL".to_string())
        );
        assert_eq!(rules.check(&"https://calm.ui".into()), Ok(()));
    }

    #[test]
    fn missing_values_only_fail_required_fields() {
        let schema = ObjectSchema::new()
            .field("name", FieldRules::new().required("Name is required"))
            .field("nickname", FieldRules::new().max_length(10, "Too long"));

        let issues = schema.validate(&ValueMap::new()).expect_err("name missing");
        assert_eq!(issues, vec![Issue::field("name", "Name is required")]);
    }

    #[test]
    fn refinements_run_only_after_inner_schema_passes() {
        let schema = signup_schema();

        let invalid_inner = ValueMap::new()
            .with("email", "nope")
            .with("password", "longenough")
            .with("confirmPassword", "different");
        let issues = schema.validate(&invalid_inner).expect_err("email invalid");
        assert_eq!(issues, vec![Issue::field("email", "Enter a valid email")]);

        let mismatch = invalid_inner.with("email", "a@b.com");
        let issues = schema.validate(&mismatch).expect_err("mismatch");
        assert_eq!(
            issues,
            vec![Issue::field("confirmPassword", "Passwords do not match")]
        );
    }

    #[test]
    fn narrowing_unwraps_refinements() {
        let schema = signup_schema();
        let Narrowed::Field(check) = schema.narrow("confirmPassword") else {
            panic!("confirmPassword should narrow");
        };
        assert_eq!(check.check(&"anything".into()), Ok(()));
        assert!(matches!(schema.narrow("phone"), Narrowed::Missing));
    }

    #[test]
    fn file_rules_match_mime_families_and_extensions() {
        let rules = FieldRules::new()
            .accept(["image/*", ".pdf"], "Unsupported file")
            .max_file_size(1_000, "Too large")
            .max_files(2, "Too many files");

        let png = FileRef::new("a.png", 10).mime("image/png");
        let pdf = FileRef::new("cv.PDF", 10);
        let zip = FileRef::new("src.zip", 10).mime("application/zip");

        assert_eq!(
            rules.check(&vec![png.clone(), pdf.clone()].into()),
            Ok(())
        );
        assert_eq!(
            rules.check(&zip.into()),
            Err("Unsupported file".to_string())
        );
        assert_eq!(
            rules.check(&FileRef::new("big.png", 5_000).mime("image/png").into()),
            Err("Too large".to_string())
        );
        assert_eq!(
            rules.check(&vec![png.clone(), png, pdf].into()),
            Err("Too many files".to_string())
        );
    }

    #[test]
    fn checked_and_number_bounds() {
        let terms = FieldRules::new().checked("Accept the terms");
        assert_eq!(
            terms.check(&false.into()),
            Err("Accept the terms".to_string())
        );
        assert_eq!(terms.check(&true.into()), Ok(()));

        let quantity = FieldRules::new()
            .min_number(Decimal::ONE, "At least one")
            .max_number(Decimal::from(10), "At most ten");
        assert_eq!(
            quantity.check(&Decimal::ZERO.into()),
            Err("At least one".to_string())
        );
        assert_eq!(quantity.check(&Decimal::from(3).into()), Ok(()));
    }
}
