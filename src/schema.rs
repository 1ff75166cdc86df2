// src/schema.rs

//! Structural contract for emitted catalog records.
//!
//! Validation operates on untyped JSON so that type mismatches are reported
//! per field rather than as an opaque decode failure. It is pure: the same
//! input always yields the same outcome.

use serde_json::{Map, Value};
use url::Url;

use crate::error::ValidationError;
use crate::models::{CatalogRecord, Category};

/// Field name used when the failure concerns the record as a whole.
pub const RECORD_FIELD: &str = "<record>";

/// Validate a candidate against the catalog record contract.
pub fn validate(candidate: &Value) -> Result<CatalogRecord, ValidationError> {
    let obj = candidate
        .as_object()
        .ok_or_else(|| ValidationError::new(RECORD_FIELD, "expected a JSON object"))?;

    let name = non_empty_string(obj, "name")?;
    let category = required_string(obj, "category")?
        .parse::<Category>()
        .map_err(|reason| ValidationError::new("category", reason))?;
    let order_in_section = positive_integer(obj, "orderInSection")?;
    let description = non_empty_string(obj, "description")?;
    let homepage = url_string(obj, "homepage")?;
    let icons = optional_url_list(obj, "icons")?;

    Ok(CatalogRecord {
        name,
        category,
        order_in_section,
        description,
        homepage,
        icons,
    })
}

/// Decode one JSONL line and validate it.
pub fn validate_line(line: &str) -> Result<CatalogRecord, ValidationError> {
    let value: Value = serde_json::from_str(line)
        .map_err(|e| ValidationError::new(RECORD_FIELD, format!("invalid JSON: {e}")))?;
    validate(&value)
}

/// Whether `s` is an absolute URL with a host.
pub fn is_valid_url(s: &str) -> bool {
    Url::parse(s).is_ok_and(|u| u.has_host())
}

fn required<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a Value, ValidationError> {
    match obj.get(field) {
        Some(value) => Ok(value),
        None => Err(ValidationError::new(field, "is required")),
    }
}

fn required_string<'a>(
    obj: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a str, ValidationError> {
    let value = required(obj, field)?;
    value.as_str().ok_or_else(|| {
        ValidationError::new(field, format!("expected a string, got {}", type_name(value)))
    })
}

fn non_empty_string(obj: &Map<String, Value>, field: &str) -> Result<String, ValidationError> {
    let value = required_string(obj, field)?;
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(value.to_string())
}

fn url_string(obj: &Map<String, Value>, field: &str) -> Result<String, ValidationError> {
    let value = required_string(obj, field)?;
    if !is_valid_url(value) {
        return Err(ValidationError::new(
            field,
            format!("must be a valid URL (got {value:?})"),
        ));
    }
    Ok(value.to_string())
}

fn positive_integer(obj: &Map<String, Value>, field: &str) -> Result<u32, ValidationError> {
    let value = required(obj, field)?;
    let Some(number) = value.as_number() else {
        return Err(ValidationError::new(
            field,
            format!("expected an integer, got {}", type_name(value)),
        ));
    };

    let integer = if let Some(n) = number.as_i64() {
        n
    } else if let Some(f) = number.as_f64().filter(|f| f.fract() == 0.0 && f.is_finite()) {
        f as i64
    } else {
        return Err(ValidationError::new(field, "must be an integer"));
    };

    if integer < 1 {
        return Err(ValidationError::new(
            field,
            format!("must be a positive integer (got {integer})"),
        ));
    }
    u32::try_from(integer).map_err(|_| ValidationError::new(field, "is out of range"))
}

fn optional_url_list(
    obj: &Map<String, Value>,
    field: &str,
) -> Result<Option<Vec<String>>, ValidationError> {
    let Some(value) = obj.get(field) else {
        return Ok(None);
    };
    let items = value.as_array().ok_or_else(|| {
        ValidationError::new(field, format!("expected an array, got {}", type_name(value)))
    })?;

    let mut urls = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let item_field = format!("{field}[{i}]");
        let Some(url) = item.as_str() else {
            return Err(ValidationError::new(
                item_field,
                format!("expected a string, got {}", type_name(item)),
            ));
        };
        if !is_valid_url(url) {
            return Err(ValidationError::new(
                item_field,
                format!("must be a valid URL (got {url:?})"),
            ));
        }
        urls.push(url.to_string());
    }
    Ok(Some(urls))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
