//! Request-body validation at the HTTP boundary.
//!
//! `ValidatedJson<T>` decodes the body and runs `T::validate`, so handlers
//! only ever see requests that satisfy their field constraints. Every
//! failure becomes a 422 with a list of field violations.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::AppError;

/// One failed constraint, located by its path in the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldViolation {
    pub fn field(name: &str, msg: impl Into<String>, kind: &str) -> Self {
        Self {
            loc: vec!["body".to_string(), name.to_string()],
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }

    pub fn body(msg: impl Into<String>, kind: &str) -> Self {
        Self {
            loc: vec!["body".to_string()],
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }

    pub fn missing(name: &str) -> Self {
        Self::field(name, "Field required", "missing")
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), Vec<FieldViolation>>;
}

/// Records a violation when `value` is outside `min..=max` characters.
pub fn check_length(
    violations: &mut Vec<FieldViolation>,
    field: &str,
    value: &str,
    min: usize,
    max: Option<usize>,
) {
    let len = value.chars().count();
    if len < min {
        violations.push(FieldViolation::field(
            field,
            format!("String should have at least {min} character{}", plural(min)),
            "string_too_short",
        ));
    } else if let Some(max) = max.filter(|&max| len > max) {
        violations.push(FieldViolation::field(
            field,
            format!("String should have at most {max} character{}", plural(max)),
            "string_too_long",
        ));
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Collects violations into the `Result` shape `Validate` returns.
pub fn into_result(violations: Vec<FieldViolation>) -> Result<(), Vec<FieldViolation>> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// JSON extractor that rejects bodies failing `Validate`.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

fn rejection_violation(rejection: JsonRejection) -> FieldViolation {
    let kind = match &rejection {
        JsonRejection::JsonDataError(_) => "value_error",
        JsonRejection::JsonSyntaxError(_) => "json_invalid",
        JsonRejection::MissingJsonContentType(_) => "content_type",
        _ => "body_unreadable",
    };
    FieldViolation::body(rejection.body_text(), kind)
}

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(vec![rejection_violation(rejection)]))?;
        value.validate().map_err(AppError::Validation)?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_length_bounds() {
        let mut v = Vec::new();
        check_length(&mut v, "name", "Ann", 3, Some(50));
        assert!(v.is_empty());

        check_length(&mut v, "name", "Al", 3, Some(50));
        assert_eq!(v[0].kind, "string_too_short");
        assert_eq!(v[0].loc, vec!["body", "name"]);
        assert_eq!(v[0].msg, "String should have at least 3 characters");

        check_length(&mut v, "name", &"x".repeat(51), 3, Some(50));
        assert_eq!(v[1].kind, "string_too_long");

        check_length(&mut v, "description", "", 1, None);
        assert_eq!(v[2].msg, "String should have at least 1 character");
    }

    #[test]
    fn test_length_counts_characters() {
        let mut v = Vec::new();
        check_length(&mut v, "name", "Zoë", 3, Some(3));
        assert!(v.is_empty());
    }

    #[test]
    fn test_violation_serializes_type_key() {
        let json = serde_json::to_value(FieldViolation::missing("current_major")).unwrap();
        assert_eq!(json["type"], "missing");
        assert_eq!(json["loc"][1], "current_major");
        assert_eq!(json["msg"], "Field required");
    }
}
