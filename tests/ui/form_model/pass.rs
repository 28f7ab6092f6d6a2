use calmform::form::{FormModel, ValueMap};

#[derive(Clone, Debug, PartialEq, calmform::form::FormModel)]
struct SignupForm {
    email: String,
    terms: bool,
}

fn main() {
    assert_eq!(SignupForm::FIELDS, &["email", "terms"]);

    let values = ValueMap::new().with("email", "a@calm.form").with("terms", true);
    let model = SignupForm::from_values(&values).expect("model");
    assert_eq!(
        model,
        SignupForm {
            email: "a@calm.form".to_string(),
            terms: true,
        }
    );

    let values = model.into_values();
    assert_eq!(values.text("email"), Some("a@calm.form"));
    assert_eq!(values.bool("terms"), Some(true));
}
