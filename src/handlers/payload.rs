//! JSON body extraction and field access with patch semantics: a field that
//! is absent from the payload is left untouched, a field that is present is
//! applied, and for nullable columns an explicit JSON null clears the value.

use async_trait::async_trait;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// A JSON object body. Malformed JSON or a non-object body is a validation
/// failure with the standard error shape, not a framework rejection.
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|e| ApiError::validation(format!("Invalid JSON body: {}", e)))?;

        if !value.is_object() {
            return Err(ApiError::validation("Request body must be a JSON object"));
        }
        Ok(JsonBody(value))
    }
}

pub fn has(data: &Value, field: &str) -> bool {
    data.get(field).is_some()
}

/// Required string field; missing, null, non-string, or empty all fail the
/// same way.
pub fn require_str(data: &Value, field: &str) -> Result<String, ApiError> {
    match data.get(field).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(ApiError::validation("Missing required fields")),
    }
}

pub fn require_i64(data: &Value, field: &str) -> Result<i64, ApiError> {
    data.get(field)
        .and_then(Value::as_i64)
        .ok_or_else(|| ApiError::validation("Missing required fields"))
}

pub fn require_f64(data: &Value, field: &str) -> Result<f64, ApiError> {
    data.get(field)
        .and_then(Value::as_f64)
        .ok_or_else(|| ApiError::validation("Missing required fields"))
}

/// Optional string field: absent yields None, anything present must be a
/// string.
pub fn optional_str(data: &Value, field: &str) -> Result<Option<String>, ApiError> {
    match data.get(field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ApiError::validation(format!("Field '{}' must be a string", field))),
    }
}

pub fn optional_i64(data: &Value, field: &str) -> Result<Option<i64>, ApiError> {
    match data.get(field) {
        None => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| ApiError::validation(format!("Field '{}' must be an integer", field))),
    }
}

pub fn optional_f64(data: &Value, field: &str) -> Result<Option<f64>, ApiError> {
    match data.get(field) {
        None => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| ApiError::validation(format!("Field '{}' must be a number", field))),
    }
}

/// Nullable foreign key: absent means leave unchanged, null means clear,
/// a number means reassign.
pub fn nullable_i64(data: &Value, field: &str) -> Result<Option<Option<i64>>, ApiError> {
    match data.get(field) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(v) => v
            .as_i64()
            .map(|n| Some(Some(n)))
            .ok_or_else(|| ApiError::validation(format!("Field '{}' must be an integer or null", field))),
    }
}

/// Parse an enumerated field (role, status, priority) if present. An
/// unrecognized label is a validation failure.
pub fn optional_enum<T: DeserializeOwned>(data: &Value, field: &str) -> Result<Option<T>, ApiError> {
    match data.get(field) {
        None => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|_| ApiError::validation(format!("Invalid value for field '{}'", field))),
    }
}

pub fn require_enum<T: DeserializeOwned>(data: &Value, field: &str) -> Result<T, ApiError> {
    optional_enum(data, field)?.ok_or_else(|| ApiError::validation("Missing required fields"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Role, TicketStatus};
    use serde_json::json;

    #[test]
    fn required_fields_reject_empty_and_missing() {
        let data = json!({ "name": "", "email": "a@b.c" });
        assert!(require_str(&data, "name").is_err());
        assert!(require_str(&data, "phone").is_err());
        assert_eq!(require_str(&data, "email").unwrap(), "a@b.c");
    }

    #[test]
    fn nullable_distinguishes_absent_null_and_value() {
        let data = json!({ "cleared": null, "set": 9 });
        assert_eq!(nullable_i64(&data, "missing").unwrap(), None);
        assert_eq!(nullable_i64(&data, "cleared").unwrap(), Some(None));
        assert_eq!(nullable_i64(&data, "set").unwrap(), Some(Some(9)));
    }

    #[test]
    fn enums_parse_their_wire_labels() {
        let data = json!({ "role": "technician", "status": "in-progress", "bad": "boss" });
        assert_eq!(optional_enum::<Role>(&data, "role").unwrap(), Some(Role::Technician));
        assert_eq!(
            optional_enum::<TicketStatus>(&data, "status").unwrap(),
            Some(TicketStatus::InProgress)
        );
        assert!(optional_enum::<Role>(&data, "bad").is_err());
        assert_eq!(optional_enum::<Role>(&data, "absent").unwrap(), None);
    }
}
