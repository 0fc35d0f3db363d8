use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use mixboard_types::api::{Claims, FolderResponse, MessageResponse};

use crate::access::{Action, authorize_folder};
use crate::contracts::{self, JsonBody};
use crate::convert;
use crate::error::ApiError;
use crate::state::{AppState, with_db};

pub async fn list_folders(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = with_db(&state, move |db| Ok(db.list_folders(&claims.sub.to_string())?)).await?;

    let folders: Vec<FolderResponse> = rows.into_iter().map(convert::folder).collect();
    Ok(Json(folders))
}

pub async fn create_folder(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let req = body.validate("create_folder", contracts::create_folder)?;

    let row = with_db(&state, move |db| {
        let id = Uuid::new_v4().to_string();
        Ok(db.create_folder(&id, &claims.sub.to_string(), &req.name)?)
    })
    .await?;

    info!("User {} created folder {}", claims.sub, row.id);
    Ok((StatusCode::CREATED, Json(convert::folder(row))))
}

pub async fn update_folder(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(folder_id): Path<String>,
    body: JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let row = with_db(&state, move |db| {
        authorize_folder(db, claims.sub, &folder_id, Action::Write)?;
        let req = body.validate("update_folder", contracts::update_folder)?;

        db.rename_folder(&folder_id, &req.name)?
            .ok_or_else(|| ApiError::not_found("Folder not found"))
    })
    .await?;

    Ok(Json(convert::folder(row)))
}

/// Sessions filed in the folder are kept and become unfiled.
pub async fn delete_folder(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(folder_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    with_db(&state, move |db| {
        authorize_folder(db, claims.sub, &folder_id, Action::Delete)?;
        if !db.delete_folder(&folder_id)? {
            return Err(ApiError::not_found("Folder not found"));
        }
        info!("User {} deleted folder {}", claims.sub, folder_id);
        Ok(())
    })
    .await?;

    Ok(Json(MessageResponse::new("Folder deleted successfully")))
}
