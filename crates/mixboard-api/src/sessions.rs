use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use mixboard_db::Database;
use mixboard_db::models::SessionRow;
use mixboard_types::api::{Claims, FieldUpdate, SessionEnvelope, SessionResponse};

use crate::access::{Action, authorize_folder, authorize_session};
use crate::contracts::{self, JsonBody};
use crate::convert;
use crate::error::ApiError;
use crate::state::{AppState, with_db};

fn envelope(message: &str, row: SessionRow) -> Result<Json<SessionEnvelope>, ApiError> {
    Ok(Json(SessionEnvelope {
        message: message.to_string(),
        session: convert::session(row, None)?,
    }))
}

/// A session may only be filed under one of its owner's folders.
fn check_folder(db: &Database, caller: Uuid, folder_id: Uuid) -> Result<(), ApiError> {
    authorize_folder(db, caller, &folder_id.to_string(), Action::Write).map(|_| ())
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = with_db(&state, move |db| Ok(db.list_sessions(&claims.sub.to_string())?)).await?;

    let sessions = rows
        .into_iter()
        .map(|row| convert::session(row, None))
        .collect::<Result<Vec<SessionResponse>, _>>()?;

    Ok(Json(sessions))
}

pub async fn create_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let req = body.validate("create_session", contracts::create_session)?;

    let row = with_db(&state, move |db| {
        if let Some(folder_id) = req.folder_id {
            check_folder(db, claims.sub, folder_id)?;
        }

        let analysis = req
            .reference_analysis
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(ApiError::internal)?;
        let folder_id = req.folder_id.map(|id| id.to_string());
        let id = Uuid::new_v4().to_string();

        Ok(db.create_session(
            &id,
            &claims.sub.to_string(),
            folder_id.as_deref(),
            &req.name,
            analysis.as_deref(),
        )?)
    })
    .await?;

    info!("User {} created session {}", claims.sub, row.id);
    Ok((StatusCode::CREATED, envelope("Session created successfully", row)?))
}

/// Single read includes the folder the session is filed under.
pub async fn get_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (row, folder) = with_db(&state, move |db| {
        let row = authorize_session(db, claims.sub, &session_id, Action::Read)?;
        let folder = match row.folder_id.as_deref() {
            Some(folder_id) => db.get_folder(folder_id)?,
            None => None,
        };
        Ok((row, folder))
    })
    .await?;

    Ok(Json(convert::session(row, folder)?))
}

pub async fn update_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<String>,
    body: JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let row = with_db(&state, move |db| {
        authorize_session(db, claims.sub, &session_id, Action::Write)?;
        let req = body.validate("update_session", contracts::update_session)?;

        if let FieldUpdate::Set(folder_id) = req.folder_id {
            check_folder(db, claims.sub, folder_id)?;
        }

        let folder_id = req.folder_id.map(|id| id.to_string());
        db.update_session(&session_id, req.name.as_deref(), folder_id.as_deref())?
            .ok_or_else(|| ApiError::not_found("Session not found"))
    })
    .await?;

    envelope("Session updated successfully", row)
}

pub async fn attach_reference(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<String>,
    body: JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let row = with_db(&state, move |db| {
        authorize_session(db, claims.sub, &session_id, Action::Write)?;
        let analysis = body.validate("attach_reference", contracts::attach_reference_analysis)?;

        let analysis = serde_json::to_string(&analysis).map_err(ApiError::internal)?;
        db.set_reference_analysis(&session_id, &analysis)?
            .ok_or_else(|| ApiError::not_found("Session not found"))
    })
    .await?;

    info!("Reference analysis attached to session {}", row.id);
    envelope("Reference analysis attached successfully", row)
}

/// Echoes the deleted session back.
pub async fn delete_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = with_db(&state, move |db| {
        authorize_session(db, claims.sub, &session_id, Action::Delete)?;
        db.delete_session(&session_id)?
            .ok_or_else(|| ApiError::not_found("Session not found"))
    })
    .await?;

    info!("User {} deleted session {}", claims.sub, row.id);
    envelope("Session deleted successfully", row)
}
