//! Checks raw JSON bodies against the create and update shapes.
//!
//! Every problem is collected, not just the first, so a client can fix a
//! payload in one round trip. Field errors use the `{loc, msg, type}` layout
//! that the service has always returned.

use serde_json::{Map, Value};
use thiserror::Error;

use advert_types::api::FieldError;

const ROOT: &str = "__root__";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("payload failed validation ({} problem(s))", .errors.len())]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// The body could not be decoded as JSON at all.
    pub fn undecodable(reason: impl Into<String>) -> Self {
        Self {
            errors: vec![field_error(ROOT, reason, "value_error.jsondecode")],
        }
    }
}

/// Validated body of a create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePayload {
    pub header: String,
    pub description: String,
    pub user: String,
}

/// Validated body of an update request. `None` means the field was absent or
/// null and must be left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePayload {
    pub header: Option<String>,
    pub description: Option<String>,
    pub user: String,
}

/// A payload shape that can be checked against raw JSON.
pub trait Schema: Sized {
    fn validate(raw: &Value) -> Result<Self, ValidationError>;
}

pub fn validate<S: Schema>(raw: &Value) -> Result<S, ValidationError> {
    S::validate(raw)
}

impl Schema for CreatePayload {
    fn validate(raw: &Value) -> Result<Self, ValidationError> {
        let mut fields = Fields::of(raw)?;
        let header = fields.required_str("header");
        let description = fields.required_str("description");
        let user = fields.required_str("user");

        match (header, description, user) {
            (Some(header), Some(description), Some(user)) if fields.is_clean() => Ok(Self {
                header,
                description,
                user,
            }),
            _ => Err(fields.into_error()),
        }
    }
}

impl Schema for UpdatePayload {
    fn validate(raw: &Value) -> Result<Self, ValidationError> {
        let mut fields = Fields::of(raw)?;
        let header = fields.optional_str("header");
        let description = fields.optional_str("description");
        let user = fields.required_str("user");

        match user {
            Some(user) if fields.is_clean() => Ok(Self {
                header,
                description,
                user,
            }),
            _ => Err(fields.into_error()),
        }
    }
}

struct Fields<'a> {
    object: &'a Map<String, Value>,
    errors: Vec<FieldError>,
}

impl<'a> Fields<'a> {
    fn of(raw: &'a Value) -> Result<Self, ValidationError> {
        match raw {
            Value::Object(object) => Ok(Self {
                object,
                errors: Vec::new(),
            }),
            _ => Err(ValidationError {
                errors: vec![field_error(ROOT, "value is not a valid dict", "type_error.dict")],
            }),
        }
    }

    fn required_str(&mut self, name: &str) -> Option<String> {
        let object = self.object;
        match object.get(name) {
            None => {
                self.errors
                    .push(field_error(name, "field required", "value_error.missing"));
                None
            }
            Some(Value::Null) => {
                self.errors.push(field_error(
                    name,
                    "none is not an allowed value",
                    "type_error.none.not_allowed",
                ));
                None
            }
            Some(value) => self.string(name, value),
        }
    }

    fn optional_str(&mut self, name: &str) -> Option<String> {
        let object = self.object;
        match object.get(name) {
            None | Some(Value::Null) => None,
            Some(value) => self.string(name, value),
        }
    }

    fn string(&mut self, name: &str, value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => {
                self.errors
                    .push(field_error(name, "str type expected", "type_error.str"));
                None
            }
        }
    }

    fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    fn into_error(self) -> ValidationError {
        ValidationError {
            errors: self.errors,
        }
    }
}

fn field_error(loc: &str, msg: impl Into<String>, kind: &str) -> FieldError {
    FieldError {
        loc: vec![loc.to_string()],
        msg: msg.into(),
        kind: kind.to_string(),
    }
}
