use calmform::form::{FormModel, ModelError, ValueMap};
use rust_decimal::Decimal;

#[derive(calmform::form::FormModel)]
struct ShippingForm {
    #[form(rename = "pickupLocation")]
    pickup_location: String,
    weight: Option<Decimal>,
}

fn main() {
    assert_eq!(ShippingForm::FIELDS, &["pickupLocation", "weight"]);

    let missing = ShippingForm::from_values(&ValueMap::new().with("pickupLocation", "Depot"));
    assert_eq!(
        missing.err(),
        Some(ModelError::MissingField("weight".to_string()))
    );

    let values = ValueMap::new()
        .with("pickupLocation", "Depot")
        .with("weight", Decimal::new(25, 1));
    let model = ShippingForm::from_values(&values).expect("model");
    assert_eq!(model.pickup_location, "Depot");
    assert_eq!(model.weight, Some(Decimal::new(25, 1)));
}
