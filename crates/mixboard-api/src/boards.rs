use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};
use uuid::Uuid;

use mixboard_types::api::{BoardResponse, Claims, MessageResponse};
use mixboard_types::models::{CollaboratorRole, Role};

use crate::access::{Action, authorize_board, resolve_role};
use crate::contracts::{self, JsonBody};
use crate::convert;
use crate::error::ApiError;
use crate::state::{AppState, with_db};

/// Boards the caller owns or collaborates on, each with the caller's role.
pub async fn list_boards(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let caller = claims.sub.to_string();
    let rows = with_db(&state, move |db| Ok(db.list_boards_for_user(&caller)?)).await?;

    let caller = claims.sub.to_string();
    let boards: Vec<BoardResponse> = rows
        .into_iter()
        .map(|row| {
            let grant = row.grant.as_deref().and_then(|g| {
                g.parse::<CollaboratorRole>()
                    .map_err(|e| warn!("Board '{}': {}", row.board.id, e))
                    .ok()
            });
            let role = resolve_role(&caller, &row.board.owner_id, grant);
            convert::board(row.board, role)
        })
        .collect();

    Ok(Json(boards))
}

pub async fn create_board(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let req = body.validate("create_board", contracts::create_board)?;

    let row = with_db(&state, move |db| {
        let id = Uuid::new_v4().to_string();
        Ok(db.create_board(&id, &claims.sub.to_string(), &req.name, req.description.as_deref())?)
    })
    .await?;

    info!("User {} created board {}", claims.sub, row.id);
    Ok((StatusCode::CREATED, Json(convert::board(row, Role::Owner))))
}

pub async fn get_board(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(board_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let access = with_db(&state, move |db| authorize_board(db, claims.sub, &board_id, Action::Read)).await?;

    Ok(Json(convert::board(access.board, access.role)))
}

pub async fn update_board(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(board_id): Path<String>,
    body: JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let (row, role) = with_db(&state, move |db| {
        let access = authorize_board(db, claims.sub, &board_id, Action::Write)?;
        let req = body.validate("update_board", contracts::update_board)?;

        let row = db
            .update_board(&board_id, req.name.as_deref(), req.description.as_deref())?
            .ok_or_else(|| ApiError::not_found("Board not found"))?;
        Ok((row, access.role))
    })
    .await?;

    Ok(Json(convert::board(row, role)))
}

/// Owner only. Elements and collaborator grants go with it.
pub async fn delete_board(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(board_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = board_id.clone();
    with_db(&state, move |db| {
        authorize_board(db, claims.sub, &id, Action::Delete)?;
        if !db.delete_board(&id)? {
            return Err(ApiError::not_found("Board not found"));
        }
        Ok(())
    })
    .await?;

    info!("User {} deleted board {}", claims.sub, board_id);
    Ok(Json(MessageResponse::new("Board deleted successfully")))
}
