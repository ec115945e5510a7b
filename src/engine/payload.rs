use serde_json::{Map, Number, Value};

/// Read-only view over the `data` object of a request body.
///
/// Presence checks follow loose truthiness: `null`, `false`, `0`, `""` and a
/// missing key all count as absent, while empty arrays and objects count as
/// present.
#[derive(Debug, Clone, Copy)]
pub struct Payload<'a> {
    data: &'a Value,
}

impl<'a> Payload<'a> {
    pub fn new(data: &'a Value) -> Self {
        Self { data }
    }

    pub fn object(&self) -> Option<&'a Map<String, Value>> {
        self.data.as_object()
    }

    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.data.get(field)
    }

    pub fn truthy(&self, field: &str) -> bool {
        self.get(field).is_some_and(is_truthy)
    }

    pub fn non_empty_str(&self, field: &str) -> Option<&'a str> {
        self.get(field)
            .and_then(Value::as_str)
            .filter(|raw| !raw.is_empty())
    }

    pub fn positive_number(&self, field: &str) -> Option<&'a Number> {
        let number = match self.get(field) {
            Some(Value::Number(number)) => number,
            _ => return None,
        };
        Some(number).filter(|number| number.as_f64().is_some_and(|value| value > 0.0))
    }

    /// Whether the payload carries a truthy `field` that is not exactly `expected`.
    pub fn conflicts_with(&self, field: &str, expected: &str) -> bool {
        match self.get(field) {
            Some(value) if is_truthy(value) => value.as_str() != Some(expected),
            _ => false,
        }
    }

    /// Renders a field for an error message; strings lose their quotes.
    pub fn display(&self, field: &str) -> String {
        match self.get(field) {
            Some(Value::String(raw)) => raw.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(raw) => !raw.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Whole-number value of a JSON number, accepting `2.0` as well as `2`.
pub fn integer_value(value: &Value) -> Option<i64> {
    if let Some(integer) = value.as_i64() {
        return Some(integer);
    }
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
    value
        .as_f64()
        .filter(|float| float.fract() == 0.0)
        .filter(|float| *float >= i64::MIN as f64 && *float < i64::MAX as f64)
        .map(|float| float as i64)
}
