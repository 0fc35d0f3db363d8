use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// Extract and validate the bearer token, then hand the claims to the
/// handler through request extensions. Any failed request is logged here
/// with its route and caller.
pub async fn require_auth(
    State(state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let claims = bearer
        .map_err(|_| ApiError::authentication("Missing bearer token"))
        .and_then(|TypedHeader(Authorization(bearer))| state.tokens.verify(bearer.token()))
        .inspect_err(|e| warn!("{} {} unauthenticated: {}", method, path, e))?;

    let caller = claims.sub;
    req.extensions_mut().insert(claims);
    let response = next.run(req).await;

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        warn!("{} {} failed with {} for user {}", method, path, status, caller);
    }
    Ok(response)
}
