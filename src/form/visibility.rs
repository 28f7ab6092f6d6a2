use super::field::FieldSchema;
use super::value::ValueMap;

pub fn is_hidden(field: &FieldSchema, values: &ValueMap) -> bool {
    field.hidden.evaluate(values)
}

/// Fields to render for `values`, in definition order. Values of hidden
/// fields are left alone.
pub fn visible_fields<'a>(fields: &'a [FieldSchema], values: &ValueMap) -> Vec<&'a FieldSchema> {
    fields
        .iter()
        .filter(|field| !is_hidden(field, values))
        .collect()
}

pub fn visible_names(fields: &[FieldSchema], values: &ValueMap) -> Vec<String> {
    visible_fields(fields, values)
        .into_iter()
        .map(|field| field.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::field::ChoiceOption;

    fn shipping_fields() -> Vec<FieldSchema> {
        vec![
            FieldSchema::radio(
                "shippingMethod",
                "Shipping",
                [
                    ChoiceOption::new("standard", "Standard"),
                    ChoiceOption::new("pickup", "Pickup"),
                ],
            ),
            FieldSchema::text("pickupLocation", "Pickup location")
                .hidden_when(|values| values.text("shippingMethod") != Some("pickup")),
            FieldSchema::text("internalNote", "Note").hidden(true),
        ]
    }

    #[test]
    fn predicates_follow_current_values() {
        let fields = shipping_fields();
        let pickup = ValueMap::new()
            .with("shippingMethod", "pickup")
            .with("pickupLocation", "Dock 4");
        assert_eq!(
            visible_names(&fields, &pickup),
            vec!["shippingMethod", "pickupLocation"]
        );

        let standard = pickup.clone().with("shippingMethod", "standard");
        assert_eq!(visible_names(&fields, &standard), vec!["shippingMethod"]);
        assert_eq!(standard.text("pickupLocation"), Some("Dock 4"));
    }

    #[test]
    fn static_hidden_flag_always_wins() {
        let fields = shipping_fields();
        assert!(is_hidden(&fields[2], &ValueMap::new()));
        assert!(!is_hidden(&fields[0], &ValueMap::new()));
    }
}
