use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use mixboard_db::queries::ElementChanges;
use mixboard_types::api::{Claims, ElementResponse, MessageResponse};
use mixboard_types::models::ElementKind;

use crate::access::{Action, authorize_board, authorize_element};
use crate::contracts::{self, JsonBody};
use crate::convert;
use crate::error::ApiError;
use crate::state::{AppState, with_db};

pub async fn list_elements(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(board_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = with_db(&state, move |db| {
        authorize_board(db, claims.sub, &board_id, Action::Read)?;
        Ok(db.list_elements(&board_id)?)
    })
    .await?;

    let elements = rows
        .into_iter()
        .map(convert::element)
        .collect::<Result<Vec<ElementResponse>, _>>()?;

    Ok(Json(elements))
}

pub async fn create_element(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(board_id): Path<String>,
    body: JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let row = with_db(&state, move |db| {
        authorize_board(db, claims.sub, &board_id, Action::Write)?;
        let req = body.validate("create_element", contracts::create_element)?;

        let data = serde_json::to_string(&req.data).map_err(ApiError::internal)?;
        let g = req.geometry;
        let id = Uuid::new_v4().to_string();
        Ok(db.create_element(
            &id,
            &board_id,
            req.kind(),
            g.position_x,
            g.position_y,
            g.width,
            g.height,
            &data,
        )?)
    })
    .await?;

    info!("User {} created {} element {} on board {}", claims.sub, row.kind, row.id, row.board_id);
    Ok((StatusCode::CREATED, Json(convert::element(row)?)))
}

/// Partial update. `data` replaces the payload wholesale and must fit the
/// element's existing type.
pub async fn update_element(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(element_id): Path<String>,
    body: JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let row = with_db(&state, move |db| {
        let access = authorize_element(db, claims.sub, &element_id, Action::Write)?;
        let stored = access
            .element
            .kind
            .parse::<ElementKind>()
            .map_err(|e| ApiError::internal(anyhow::anyhow!("element '{}': {}", element_id, e)))?;
        let req = body.validate("update_element", |value| contracts::update_element(value, stored))?;

        let data = req
            .data
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(ApiError::internal)?;
        let changes = ElementChanges {
            position_x: req.position_x,
            position_y: req.position_y,
            width: req.width,
            height: req.height,
            data: data.as_deref(),
        };

        db.update_element(&element_id, &changes)?
            .ok_or_else(|| ApiError::not_found("Element not found"))
    })
    .await?;

    Ok(Json(convert::element(row)?))
}

pub async fn delete_element(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(element_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    with_db(&state, move |db| {
        let access = authorize_element(db, claims.sub, &element_id, Action::Delete)?;
        if !db.delete_element(&element_id)? {
            return Err(ApiError::not_found("Element not found"));
        }
        info!("User {} deleted element {} from board {}", claims.sub, element_id, access.board.board.id);
        Ok(())
    })
    .await?;

    Ok(Json(MessageResponse::new("Element deleted successfully")))
}
