//! Store rows to API shapes.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use mixboard_db::models::{BoardRow, CollaboratorRow, ElementRow, FolderRow, SessionRow, UserRow};
use mixboard_types::api::{
    BoardResponse, CollaboratorResponse, ElementResponse, FolderResponse, SessionResponse,
    UserResponse,
};
use mixboard_types::models::{CollaboratorRole, ElementData, ElementKind, ReferenceAnalysis, Role};

use crate::error::ApiError;

fn uuid(value: &str, what: &str, row_id: &str) -> Uuid {
    value.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}' on row '{}': {}", what, value, row_id, e);
        Uuid::default()
    })
}

pub(crate) fn timestamp(value: &str, row_id: &str) -> DateTime<Utc> {
    value
        .parse::<DateTime<Utc>>()
        .or_else(|_| {
            // Rows written by hand through the sqlite shell use CURRENT_TIMESTAMP.
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on row '{}': {}", value, row_id, e);
            DateTime::default()
        })
}

pub fn user(row: UserRow) -> UserResponse {
    UserResponse {
        id: uuid(&row.id, "id", &row.id),
        created_at: timestamp(&row.created_at, &row.id),
        email: row.email,
        name: row.name,
        profile_avatar: row.profile_avatar,
    }
}

pub fn board(row: BoardRow, role: Role) -> BoardResponse {
    BoardResponse {
        id: uuid(&row.id, "id", &row.id),
        owner_id: uuid(&row.owner_id, "owner_id", &row.id),
        created_at: timestamp(&row.created_at, &row.id),
        updated_at: timestamp(&row.updated_at, &row.id),
        name: row.name,
        description: row.description,
        role,
    }
}

pub fn collaborator(row: CollaboratorRow) -> Result<CollaboratorResponse, ApiError> {
    let role = row
        .role
        .parse::<CollaboratorRole>()
        .map_err(|e| ApiError::internal(anyhow::anyhow!("collaborator '{}': {}", row.user_id, e)))?;

    Ok(CollaboratorResponse {
        user_id: uuid(&row.user_id, "user_id", &row.user_id),
        board_id: uuid(&row.board_id, "board_id", &row.user_id),
        created_at: timestamp(&row.created_at, &row.user_id),
        name: row.name,
        email: row.email,
        role,
    })
}

/// Stored kind and payload must still agree; a row that does not is an
/// internal error, never a client one.
pub fn element(row: ElementRow) -> Result<ElementResponse, ApiError> {
    let kind = row
        .kind
        .parse::<ElementKind>()
        .map_err(|e| ApiError::internal(anyhow::anyhow!("element '{}': {}", row.id, e)))?;
    let value: serde_json::Value = serde_json::from_str(&row.data)
        .map_err(|e| ApiError::internal(anyhow::anyhow!("element '{}' data: {}", row.id, e)))?;
    let data = ElementData::from_stored(kind, value)
        .map_err(|e| ApiError::internal(anyhow::anyhow!("element '{}' data: {}", row.id, e)))?;

    Ok(ElementResponse {
        id: uuid(&row.id, "id", &row.id),
        board_id: uuid(&row.board_id, "board_id", &row.id),
        kind,
        position_x: row.position_x,
        position_y: row.position_y,
        width: row.width,
        height: row.height,
        data,
        created_at: timestamp(&row.created_at, &row.id),
        updated_at: timestamp(&row.updated_at, &row.id),
    })
}

pub fn folder(row: FolderRow) -> FolderResponse {
    FolderResponse {
        id: uuid(&row.id, "id", &row.id),
        user_id: uuid(&row.user_id, "user_id", &row.id),
        created_at: timestamp(&row.created_at, &row.id),
        name: row.name,
    }
}

pub fn session(row: SessionRow, folder_row: Option<FolderRow>) -> Result<SessionResponse, ApiError> {
    let reference_analysis = row
        .reference_analysis
        .as_deref()
        .map(serde_json::from_str::<ReferenceAnalysis>)
        .transpose()
        .map_err(|e| ApiError::internal(anyhow::anyhow!("session '{}' analysis: {}", row.id, e)))?;

    Ok(SessionResponse {
        id: uuid(&row.id, "id", &row.id),
        folder_id: row.folder_id.as_deref().map(|f| uuid(f, "folder_id", &row.id)),
        user_id: uuid(&row.user_id, "user_id", &row.id),
        created_at: timestamp(&row.created_at, &row.id),
        updated_at: timestamp(&row.updated_at, &row.id),
        name: row.name,
        reference_analysis,
        folder: folder_row.map(folder),
    })
}
