use serde_json::Value;

use mixboard_types::api::{LoginRequest, RegisterRequest};

use super::{Checker, ContractResult, root};

const MAX_USER_NAME_LEN: usize = 100;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

pub fn register(body: &Value) -> ContractResult<RegisterRequest> {
    let obj = root(body)?;
    let mut c = Checker::default();

    let name = c
        .required(obj, "", "name")
        .and_then(|v| c.bounded_name(v, "name", MAX_USER_NAME_LEN));
    let email = c.required(obj, "", "email").and_then(|v| c.email(v, "email"));
    let password = c.required(obj, "", "password").and_then(|v| check_password(&mut c, v));
    let profile_avatar = Checker::optional(obj, "profileAvatar").and_then(|v| c.url(v, "profileAvatar"));

    let request = (|| -> Option<RegisterRequest> {
        Some(RegisterRequest {
            name: name?,
            email: email?,
            password: password?,
            profile_avatar,
        })
    })();
    c.finish(request)
}

/// Only checks shape. Whether the credentials are right is the handler's
/// business, and it must not say which half was wrong.
pub fn login(body: &Value) -> ContractResult<LoginRequest> {
    let obj = root(body)?;
    let mut c = Checker::default();

    let email = c.required(obj, "", "email").and_then(|v| c.email(v, "email"));
    let password = c.required(obj, "", "password").and_then(|v| c.string(v, "password"));
    if password.as_deref() == Some("") {
        c.fail("password", "Must not be empty");
    }

    let request = (|| -> Option<LoginRequest> {
        Some(LoginRequest {
            email: email?,
            password: password?,
        })
    })();
    c.finish(request)
}

// Passwords are taken verbatim; no trimming.
fn check_password(c: &mut Checker, value: &Value) -> Option<String> {
    let password = c.string(value, "password")?;
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        c.fail("password", format!("Must be at least {} characters", MIN_PASSWORD_LEN));
        return None;
    }
    if len > MAX_PASSWORD_LEN {
        c.fail("password", format!("Must be at most {} characters", MAX_PASSWORD_LEN));
        return None;
    }
    Some(password)
}
