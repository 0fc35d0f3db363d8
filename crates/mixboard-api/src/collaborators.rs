use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};

use mixboard_types::api::{Claims, CollaboratorResponse, MessageResponse};

use crate::access::{Action, authorize_board};
use crate::contracts::{self, JsonBody};
use crate::convert;
use crate::error::ApiError;
use crate::state::{AppState, with_db};

pub async fn list_collaborators(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(board_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = with_db(&state, move |db| {
        authorize_board(db, claims.sub, &board_id, Action::Read)?;
        Ok(db.list_collaborators(&board_id)?)
    })
    .await?;

    let collaborators = rows
        .into_iter()
        .map(convert::collaborator)
        .collect::<Result<Vec<CollaboratorResponse>, _>>()?;

    Ok(Json(collaborators))
}

/// Grant a registered user a role on the board. Owner only.
pub async fn add_collaborator(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(board_id): Path<String>,
    body: JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let row = with_db(&state, move |db| {
        let access = authorize_board(db, claims.sub, &board_id, Action::Share)?;
        let req = body.validate("add_collaborator", contracts::grant_collaborator)?;

        let user = db
            .get_user_by_email(&req.email)?
            .ok_or_else(|| {
                warn!("Share of board {} rejected: no user with that email", board_id);
                ApiError::not_found("User not found")
            })?;
        if user.id == access.board.owner_id {
            warn!("Share of board {} rejected: target is the owner", board_id);
            return Err(ApiError::conflict("The board owner cannot be added as a collaborator"));
        }

        db.add_collaborator(&user.id, &board_id, req.role)
            .map_err(|e| match ApiError::from(e) {
                ApiError::Conflict(_) => {
                    warn!("User {} already collaborates on board {}", user.id, board_id);
                    ApiError::conflict("User is already a collaborator on this board")
                }
                other => other,
            })
    })
    .await?;

    info!("Board {} shared with user {} as {}", row.board_id, row.user_id, row.role);
    Ok((StatusCode::CREATED, Json(convert::collaborator(row)?)))
}

pub async fn remove_collaborator(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((board_id, user_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    with_db(&state, move |db| {
        authorize_board(db, claims.sub, &board_id, Action::Share)?;
        if !db.remove_collaborator(&user_id, &board_id)? {
            return Err(ApiError::not_found("Collaborator not found"));
        }
        info!("User {} removed from board {}", user_id, board_id);
        Ok(())
    })
    .await?;

    Ok(Json(MessageResponse::new("Collaborator removed successfully")))
}
