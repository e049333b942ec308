//! Request body validation
//!
//! Each request schema lists its fields in reporting order. A payload is
//! checked field by field (presence, then type, then length, then email
//! format) and only the first violation is reported, worded the way the
//! public API always has: `"name" is required`, `"email" must be a valid
//! email`, and so on.

use crate::error::AppError;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

/// JSON type a field must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Boolean,
}

impl FieldKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Boolean => value.is_boolean(),
        }
    }

    /// Loose conversion applied before the type check: `"true"`/`"false"`
    /// are accepted for boolean fields
    fn coerce(self, value: &mut Value) {
        if !matches!(self, FieldKind::Boolean) {
            return;
        }
        if let Some(flag) = value.as_str().and_then(|s| s.parse::<bool>().ok()) {
            *value = Value::Bool(flag);
        }
    }

    fn type_name(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Boolean => "boolean",
        }
    }
}

/// One field of a request schema
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// Struct field name, as `validator` reports it
    pub name: &'static str,
    /// Name on the wire
    pub json: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn string(name: &'static str, json: &'static str) -> Self {
        Self {
            name,
            json,
            kind: FieldKind::String,
        }
    }

    pub const fn boolean(name: &'static str, json: &'static str) -> Self {
        Self {
            name,
            json,
            kind: FieldKind::Boolean,
        }
    }
}

/// A request body with declared fields and validation rules
pub trait Schema: DeserializeOwned + Validate {
    /// Fields in the order violations are reported
    const FIELDS: &'static [Field];
}

// ============================================================================
// Schemas
// ============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(required, length(min = 6, max = 30))]
    pub name: Option<String>,
    #[validate(required, length(min = 6), custom(function = "email_address"))]
    pub email: Option<String>,
    #[validate(required, length(min = 6))]
    pub password: Option<String>,
}

impl Schema for RegisterRequest {
    const FIELDS: &'static [Field] = &[
        Field::string("name", "name"),
        Field::string("email", "email"),
        Field::string("password", "password"),
    ];
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(required, length(min = 6), custom(function = "email_address"))]
    pub email: Option<String>,
    #[validate(required, length(min = 6))]
    pub password: Option<String>,
}

impl Schema for LoginRequest {
    const FIELDS: &'static [Field] = &[
        Field::string("email", "email"),
        Field::string("password", "password"),
    ];
}

/// Body for creating or replacing a thought
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ThoughtRequest {
    #[validate(required, length(min = 3, max = 255))]
    pub feeling: Option<String>,
    #[validate(required, length(min = 6, max = 1024))]
    pub cause: Option<String>,
    pub justified: Option<bool>,
}

impl Schema for ThoughtRequest {
    const FIELDS: &'static [Field] = &[
        Field::string("feeling", "feeling"),
        Field::string("cause", "cause"),
        Field::boolean("justified", "justified"),
    ];
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PasswordUpdateRequest {
    #[serde(rename = "currentPassword")]
    #[validate(required, length(min = 6))]
    pub current_password: Option<String>,
    #[serde(rename = "newPassword")]
    #[validate(required, length(min = 6))]
    pub new_password: Option<String>,
}

impl Schema for PasswordUpdateRequest {
    const FIELDS: &'static [Field] = &[
        Field::string("current_password", "currentPassword"),
        Field::string("new_password", "newPassword"),
    ];
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EmailUpdateRequest {
    #[serde(rename = "newEmail")]
    #[validate(required, length(min = 6), custom(function = "email_address"))]
    pub new_email: Option<String>,
}

impl Schema for EmailUpdateRequest {
    const FIELDS: &'static [Field] = &[Field::string("new_email", "newEmail")];
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NameUpdateRequest {
    #[validate(required, length(min = 6, max = 30))]
    pub name: Option<String>,
}

impl Schema for NameUpdateRequest {
    const FIELDS: &'static [Field] = &[Field::string("name", "name")];
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReasonRequest {
    #[validate(required, length(min = 1, max = 1024))]
    pub description: Option<String>,
    #[serde(rename = "isPositive")]
    pub is_positive: Option<bool>,
}

impl Schema for ReasonRequest {
    const FIELDS: &'static [Field] = &[
        Field::string("description", "description"),
        Field::boolean("is_positive", "isPositive"),
    ];
}

// ============================================================================
// Validation
// ============================================================================

/// Email syntax plus a domain of at least two labels, each non-empty, with
/// a top-level label of two or more characters. Reported under the `email`
/// code so it shares the standard message.
fn email_address(value: &str) -> Result<(), ValidationError> {
    let dotted_domain = value.rsplit_once('@').is_some_and(|(_, domain)| {
        let labels: Vec<&str> = domain.split('.').collect();
        labels.len() >= 2
            && labels.iter().all(|label| !label.is_empty())
            && labels.last().is_some_and(|tld| tld.len() >= 2)
    });

    if dotted_domain && value.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}

/// Parse and validate a request body, returning the first violation
pub fn validate_payload<T: Schema>(body: &[u8]) -> Result<T, String> {
    let mut object = parse_object(body)?;

    // Drop wrong-typed values so deserialization succeeds; the type error
    // is still reported in field order below. An explicit null is a wrong
    // type, not a missing field.
    let mut type_errors = Vec::new();
    for field in T::FIELDS {
        let wrong_type = match object.get_mut(field.json) {
            Some(value) => {
                field.kind.coerce(value);
                !field.kind.matches(value)
            }
            None => false,
        };
        if wrong_type {
            object.remove(field.json);
            type_errors.push(field.json);
        }
    }

    let unknown: Vec<String> = object
        .keys()
        .filter(|key| !T::FIELDS.iter().any(|f| f.json == key.as_str()))
        .cloned()
        .collect();
    for key in &unknown {
        object.remove(key);
    }

    let payload: T = serde_json::from_value(Value::Object(object))
        .map_err(|e| format!("Invalid request body: {e}"))?;
    let errors = payload.validate().err();

    for field in T::FIELDS {
        if type_errors.contains(&field.json) {
            return Err(format!(
                "\"{}\" must be a {}",
                field.json,
                field.kind.type_name()
            ));
        }
        if let Some(message) = errors.as_ref().and_then(|e| field_violation(e, field)) {
            return Err(message);
        }
    }

    if let Some(key) = unknown.first() {
        return Err(format!("\"{key}\" is not allowed"));
    }

    Ok(payload)
}

fn parse_object(body: &[u8]) -> Result<Map<String, Value>, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("\"value\" must be an object".to_string()),
        Err(_) => Err("Invalid JSON payload.".to_string()),
    }
}

/// Message for the highest-priority violation of `field`, if any
fn field_violation(errors: &ValidationErrors, field: &Field) -> Option<String> {
    let field_errors = errors.field_errors();
    let violations = field_errors
        .iter()
        .find(|(key, _)| {
            let key: &str = key.as_ref();
            key == field.name || key == field.json
        })
        .map(|(_, errs)| *errs)?;

    ["required", "length", "email"].iter().find_map(|code| {
        violations
            .iter()
            .find(|e| e.code == *code)
            .map(|e| describe(field.json, e))
    })
}

fn describe(name: &str, error: &ValidationError) -> String {
    match &*error.code {
        "required" => format!("\"{name}\" is required"),
        "email" => format!("\"{name}\" must be a valid email"),
        "length" => {
            let len = error
                .params
                .get("value")
                .and_then(Value::as_str)
                .map(|s| s.chars().count());
            let min = error.params.get("min").and_then(Value::as_u64);
            let max = error.params.get("max").and_then(Value::as_u64);

            match (len, min, max) {
                (Some(0), _, _) => format!("\"{name}\" is not allowed to be empty"),
                (Some(len), Some(min), _) if (len as u64) < min => {
                    format!("\"{name}\" length must be at least {min} characters long")
                }
                (_, _, Some(max)) => format!(
                    "\"{name}\" length must be less than or equal to {max} characters long"
                ),
                (_, Some(min), None) => {
                    format!("\"{name}\" length must be at least {min} characters long")
                }
                _ => format!("\"{name}\" has an invalid length"),
            }
        }
        other => format!("\"{name}\" failed {other} validation"),
    }
}

/// JSON body extractor that rejects with 400 and the first violation
///
/// The body is read regardless of `Content-Type`; an empty body counts as
/// an empty object, so `GET /login` with no payload reports the first
/// missing field.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: Schema + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        validate_payload::<T>(&body)
            .map(ValidatedJson)
            .map_err(AppError::BadRequest)
    }
}
