//! Per-operation input contracts.
//!
//! Each contract takes the raw JSON body and returns either the normalized
//! request or every violation it found. Contracts never touch the store.

mod account;
mod boards;
mod elements;
mod sessions;

pub use account::{login, register};
pub use boards::{create_board, grant_collaborator, update_board};
pub use elements::{create_element, update_element};
pub use sessions::{
    attach_reference_analysis, create_folder, create_session, update_folder, update_session,
};

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use tracing::warn;
use uuid::Uuid;

use mixboard_types::api::{FieldError, FieldUpdate};

use crate::error::ApiError;

pub type ContractResult<T> = Result<T, Vec<FieldError>>;

const MAX_NAME_LEN: usize = 120;

/// Request body held back until the pipeline reaches its validation stage.
/// A body that is not JSON is only reported once identity and access checks
/// have passed.
pub struct JsonBody(Result<Value, String>);

impl JsonBody {
    /// Run `contract` over the body, logging rejections under `operation`.
    pub fn validate<T, F>(&self, operation: &str, contract: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Value) -> ContractResult<T>,
    {
        let result = match &self.0 {
            Ok(value) => contract(value),
            Err(e) => Err(vec![FieldError::new("", format!("Malformed JSON body: {}", e))]),
        };

        result.map_err(|errors| {
            warn!("{} rejected with {} violation(s)", operation, errors.len());
            ApiError::Validation(errors)
        })
    }
}

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        Ok(Self(serde_json::from_slice(&bytes).map_err(|e| e.to_string())))
    }
}

/// Build a dotted path the way clients address nested fields (`data.items.0.id`).
pub(crate) fn at(parent: &str, key: impl std::fmt::Display) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
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

/// Collects violations while a contract walks its input. Every check records
/// what it found and returns `None` on failure, so one pass reports all of
/// them.
#[derive(Default)]
pub(crate) struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    pub fn fail(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(path, message));
    }

    fn mismatch(&mut self, path: &str, expected: &str, found: &Value) {
        self.fail(path, format!("Expected {}, received {}", expected, type_name(found)));
    }

    /// Hand back `value` if nothing was recorded.
    pub fn finish<T>(self, value: Option<T>) -> ContractResult<T> {
        if !self.errors.is_empty() {
            return Err(self.errors);
        }
        value.ok_or_else(|| vec![FieldError::new("", "Invalid input")])
    }

    pub fn object<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Map<String, Value>> {
        match value {
            Value::Object(map) => Some(map),
            other => {
                self.mismatch(path, "object", other);
                None
            }
        }
    }

    /// Field that must be present. `null` counts as present so the type check
    /// reports it.
    pub fn required<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        parent: &str,
        key: &str,
    ) -> Option<&'v Value> {
        let value = obj.get(key);
        if value.is_none() {
            self.fail(at(parent, key), "Required");
        }
        value
    }

    /// Absent or `null` both read as "not given".
    pub fn optional<'v>(obj: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
        obj.get(key).filter(|v| !v.is_null())
    }

    /// Absent keeps, `null` clears, anything else is handed to `check`.
    pub fn nullable<T>(
        &mut self,
        obj: &Map<String, Value>,
        parent: &str,
        key: &str,
        check: impl FnOnce(&mut Self, &Value, &str) -> Option<T>,
    ) -> Option<FieldUpdate<T>> {
        match obj.get(key) {
            None => Some(FieldUpdate::Keep),
            Some(Value::Null) => Some(FieldUpdate::Clear),
            Some(value) => check(self, value, &at(parent, key)).map(FieldUpdate::Set),
        }
    }

    pub fn string(&mut self, value: &Value, path: &str) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            other => {
                self.mismatch(path, "string", other);
                None
            }
        }
    }

    pub fn non_empty(&mut self, value: &Value, path: &str) -> Option<String> {
        let s = self.string(value, path)?;
        if s.trim().is_empty() {
            self.fail(path, "Must not be empty");
            return None;
        }
        Some(s)
    }

    /// Display name: trimmed, non-empty, bounded.
    pub fn name(&mut self, value: &Value, path: &str) -> Option<String> {
        self.bounded_name(value, path, MAX_NAME_LEN)
    }

    pub fn bounded_name(&mut self, value: &Value, path: &str, max: usize) -> Option<String> {
        let s = self.non_empty(value, path)?;
        let trimmed = s.trim();
        if trimmed.chars().count() > max {
            self.fail(path, format!("Must be at most {} characters", max));
            return None;
        }
        Some(trimmed.to_string())
    }

    pub fn number(&mut self, value: &Value, path: &str) -> Option<f64> {
        match value.as_f64() {
            Some(n) if n.is_finite() => Some(n),
            Some(_) => {
                self.fail(path, "Must be a finite number");
                None
            }
            None => {
                self.mismatch(path, "number", value);
                None
            }
        }
    }

    pub fn positive_int(&mut self, value: &Value, path: &str) -> Option<u32> {
        let n = self.number(value, path)?;
        if n.fract() != 0.0 {
            self.fail(path, "Expected integer, received float");
            return None;
        }
        if n <= 0.0 {
            self.fail(path, "Must be greater than 0");
            return None;
        }
        if n > f64::from(u32::MAX) {
            self.fail(path, format!("Must be at most {}", u32::MAX));
            return None;
        }
        Some(n as u32)
    }

    pub fn boolean(&mut self, value: &Value, path: &str) -> Option<bool> {
        match value {
            Value::Bool(b) => Some(*b),
            other => {
                self.mismatch(path, "boolean", other);
                None
            }
        }
    }

    /// Absolute URL of any scheme the `url` crate can parse.
    pub fn url(&mut self, value: &Value, path: &str) -> Option<String> {
        let s = self.string(value, path)?;
        let trimmed = s.trim();
        match url::Url::parse(trimmed) {
            Ok(_) => Some(trimmed.to_string()),
            Err(_) => {
                self.fail(path, "Invalid url");
                None
            }
        }
    }

    pub fn uuid(&mut self, value: &Value, path: &str) -> Option<Uuid> {
        let s = self.string(value, path)?;
        match Uuid::parse_str(&s) {
            Ok(id) => Some(id),
            Err(_) => {
                self.fail(path, "Invalid uuid");
                None
            }
        }
    }

    /// Trimmed, lowercased address with a plausible `local@domain.tld` shape.
    pub fn email(&mut self, value: &Value, path: &str) -> Option<String> {
        let s = self.string(value, path)?;
        let email = s.trim().to_lowercase();
        if !is_plausible_email(&email) {
            self.fail(path, "Invalid email");
            return None;
        }
        Some(email)
    }

    /// One of a closed set of literals.
    pub fn literal<T: Copy>(
        &mut self,
        value: &Value,
        path: &str,
        options: &[T],
        as_str: impl Fn(&T) -> &'static str,
    ) -> Option<T> {
        let s = self.string(value, path)?;
        match options.iter().find(|o| as_str(*o) == s) {
            Some(found) => Some(*found),
            None => {
                let expected: Vec<String> =
                    options.iter().map(|o| format!("'{}'", as_str(o))).collect();
                self.fail(
                    path,
                    format!("Invalid enum value. Expected {}, received '{}'", expected.join(" | "), s),
                );
                None
            }
        }
    }

    pub fn array<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Vec<Value>> {
        match value {
            Value::Array(items) => Some(items),
            other => {
                self.mismatch(path, "array", other);
                None
            }
        }
    }
}

fn is_plausible_email(email: &str) -> bool {
    if email.len() > 254 || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

/// The body must be a JSON object before any field can be checked.
pub(crate) fn root(body: &Value) -> ContractResult<&Map<String, Value>> {
    match body {
        Value::Object(map) => Ok(map),
        other => Err(vec![FieldError::new(
            "",
            format!("Expected object, received {}", type_name(other)),
        )]),
    }
}
