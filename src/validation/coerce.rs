//! String→typed-value coercion for CSV cells.

use serde_json::Value;

use crate::errors::ValidatorError;

/// A target type a schema can declare for a CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvType {
    Null,
    Integer,
    Number,
    Boolean,
    String,
}

impl CsvType {
    pub fn from_schema_name(name: &str) -> Option<Self> {
        match name {
            "null" => Some(CsvType::Null),
            "integer" => Some(CsvType::Integer),
            "number" => Some(CsvType::Number),
            "boolean" => Some(CsvType::Boolean),
            "string" => Some(CsvType::String),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CsvType::Null => "null",
            CsvType::Integer => "integer",
            CsvType::Number => "number",
            CsvType::Boolean => "boolean",
            CsvType::String => "string",
        }
    }

    /// Attempts the cast; `None` means the text is not a value of this type.
    fn cast(self, raw: &str) -> Option<Value> {
        match self {
            CsvType::Null => raw.is_empty().then_some(Value::Null),
            CsvType::Integer => raw.parse::<i64>().ok().map(Value::from),
            CsvType::Number => raw
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            CsvType::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            CsvType::String => Some(Value::String(raw.to_string())),
        }
    }
}

/// The ordered set of acceptable target types the schema declares for a
/// column. A column with no usable `type` entry coerces as plain text.
pub fn declared_types(schema: &Value, column: &str) -> Vec<CsvType> {
    let declared = schema
        .get("properties")
        .and_then(|properties| properties.get(column))
        .and_then(|property| property.get("type"));
    let types: Vec<CsvType> = match declared {
        Some(Value::String(name)) => CsvType::from_schema_name(name).into_iter().collect(),
        Some(Value::Array(names)) => names
            .iter()
            .filter_map(Value::as_str)
            .filter_map(CsvType::from_schema_name)
            .collect(),
        _ => Vec::new(),
    };
    if types.is_empty() {
        vec![CsvType::String]
    } else {
        types
    }
}

/// Coerces one cell per the declared target types.
///
/// A failed cast never raises on its own; the original text is returned and
/// the schema validator flags the mismatch downstream. The only failure is
/// an ambiguous cast, where more than one non-null target accepts the text.
pub fn cast_cell(raw: &str, types: &[CsvType]) -> Result<Value, ValidatorError> {
    if let [only] = types {
        return Ok(cast_or_original(raw, *only));
    }

    let mut candidates: Vec<CsvType> = types.to_vec();
    if candidates.contains(&CsvType::Null) {
        if let Some(null) = CsvType::Null.cast(raw) {
            return Ok(null);
        }
        candidates.retain(|candidate| *candidate != CsvType::Null);
    }

    if let [only] = candidates.as_slice() {
        return Ok(cast_or_original(raw, *only));
    }

    let matches: Vec<(CsvType, Value)> = candidates
        .iter()
        .filter_map(|candidate| candidate.cast(raw).map(|value| (*candidate, value)))
        .collect();

    if matches.len() > 1 {
        return Err(ValidatorError::AmbiguousCast {
            value: raw.to_string(),
            matching: matches
                .iter()
                .map(|(candidate, _)| candidate.as_str().to_string())
                .collect(),
        });
    }
    match matches.into_iter().next() {
        Some((_, value)) => Ok(value),
        None => Ok(Value::String(raw.to_string())),
    }
}

fn cast_or_original(raw: &str, target: CsvType) -> Value {
    target
        .cast(raw)
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_type_casts_or_returns_original() {
        assert_eq!(cast_cell("5", &[CsvType::Integer]).unwrap(), json!(5));
        assert_eq!(
            cast_cell("five", &[CsvType::Integer]).unwrap(),
            json!("five")
        );
        assert_eq!(cast_cell("2.5", &[CsvType::Number]).unwrap(), json!(2.5));
        assert_eq!(cast_cell("TRUE", &[CsvType::Boolean]).unwrap(), json!(true));
    }

    #[test]
    fn test_null_then_fallback() {
        let types = [CsvType::Null, CsvType::Integer];
        assert_eq!(cast_cell("", &types).unwrap(), Value::Null);
        assert_eq!(cast_cell("5", &types).unwrap(), json!(5));
        assert_eq!(cast_cell("abc", &types).unwrap(), json!("abc"));
    }

    #[test]
    fn test_ambiguous_cast_is_surfaced() {
        let err = cast_cell("5", &[CsvType::Integer, CsvType::Number]).unwrap_err();
        match err {
            ValidatorError::AmbiguousCast { value, matching } => {
                assert_eq!(value, "5");
                assert_eq!(matching, vec!["integer", "number"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_single_non_null_winner() {
        assert_eq!(
            cast_cell("2.5", &[CsvType::Integer, CsvType::Number]).unwrap(),
            json!(2.5)
        );
        assert_eq!(
            cast_cell("true", &[CsvType::Integer, CsvType::Boolean]).unwrap(),
            json!(true)
        );
    }

    #[test]
    fn test_no_candidate_matches() {
        assert_eq!(
            cast_cell("maybe", &[CsvType::Integer, CsvType::Boolean]).unwrap(),
            json!("maybe")
        );
    }

    #[test]
    fn test_declared_types_from_schema() {
        let schema = json!({
            "properties": {
                "age": {"type": "integer"},
                "weight": {"type": ["null", "number"]},
                "notes": {"description": "free text"}
            }
        });
        assert_eq!(declared_types(&schema, "age"), vec![CsvType::Integer]);
        assert_eq!(
            declared_types(&schema, "weight"),
            vec![CsvType::Null, CsvType::Number]
        );
        // No usable type entry: treat as text.
        assert_eq!(declared_types(&schema, "notes"), vec![CsvType::String]);
        assert_eq!(declared_types(&schema, "missing"), vec![CsvType::String]);
    }
}
