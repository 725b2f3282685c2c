use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::prelude::TimeBase;

/// An immutable scalar fact about the flight or aircraft, e.g. the series
/// or the takeoff runway record. Carries no time dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: Value,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Truthiness of the wrapped value, except that `0` and `false` are
    /// meaningful recorded values and therefore count as present; only a
    /// null or empty value is absent.
    pub fn is_present(&self) -> bool {
        match &self.value {
            Value::Null => false,
            Value::Bool(_) => true,
            Value::Number(_) => true,
            Value::String(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Object(o) => !o.is_empty(),
        }
    }

    /// Alignment is meaningless for a time-invariant value.
    pub fn get_aligned(&self, _target: TimeBase) -> Attribute {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(null), false)]
    #[case(json!(0), true)]
    #[case(json!(false), true)]
    #[case(json!(true), true)]
    #[case(json!(""), false)]
    #[case(json!("B737-300"), true)]
    #[case(json!([]), false)]
    #[case(json!({"ident": "27L"}), true)]
    fn presence_distinguishes_zero_from_absent(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(Attribute::new("Flap Selections", value).is_present(), expected);
    }

    #[test]
    fn alignment_is_the_identity() {
        let attr = Attribute::new("Takeoff Runway", json!({"ident": "09R"}));
        let aligned = attr.get_aligned(TimeBase::one_hz());
        assert_eq!(aligned, attr);
    }
}
