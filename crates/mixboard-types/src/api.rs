use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{CollaboratorRole, ElementData, ElementKind, ReferenceAnalysis, Role};

// -- JWT Claims --

/// Bearer token claims. `sub` is the user id; nothing else about the user is
/// carried in the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
}

// -- Validation --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ValidationErrorBody {
    pub message: String,
    pub errors: Vec<FieldError>,
}

/// Three-way update for nullable columns: leave alone, set to null, or set.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldUpdate<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T> FieldUpdate<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldUpdate<U> {
        match self {
            Self::Keep => FieldUpdate::Keep,
            Self::Clear => FieldUpdate::Clear,
            Self::Set(value) => FieldUpdate::Set(f(value)),
        }
    }

    /// Column form taken by the store: `None` keeps, `Some(None)` clears.
    pub fn as_deref(&self) -> Option<Option<&T::Target>>
    where
        T: std::ops::Deref,
    {
        match self {
            Self::Keep => None,
            Self::Clear => Some(None),
            Self::Set(value) => Some(Some(value.deref())),
        }
    }
}

// -- Auth --

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub profile_avatar: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// User as exposed over the API. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub profile_avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// -- Boards --

#[derive(Debug, Clone)]
pub struct CreateBoardRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateBoardRequest {
    pub name: Option<String>,
    pub description: FieldUpdate<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    /// The caller's effective role on this board.
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct GrantCollaboratorRequest {
    pub email: String,
    pub role: CollaboratorRole,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorResponse {
    pub user_id: Uuid,
    pub board_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: CollaboratorRole,
    pub created_at: DateTime<Utc>,
}

// -- Elements --

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub position_x: f64,
    pub position_y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone)]
pub struct CreateElementRequest {
    pub geometry: Geometry,
    pub data: ElementData,
}

impl CreateElementRequest {
    pub fn kind(&self) -> ElementKind {
        self.data.kind()
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateElementRequest {
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub data: Option<ElementData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ElementResponse {
    pub id: Uuid,
    #[serde(rename = "boardId")]
    pub board_id: Uuid,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub position_x: f64,
    pub position_y: f64,
    pub width: f64,
    pub height: f64,
    pub data: ElementData,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

// -- Sessions --

#[derive(Debug, Clone)]
pub struct CreateSessionRequest {
    pub name: String,
    pub folder_id: Option<Uuid>,
    pub reference_analysis: Option<ReferenceAnalysis>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateSessionRequest {
    pub name: Option<String>,
    pub folder_id: FieldUpdate<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: Uuid,
    pub name: String,
    pub folder_id: Option<Uuid>,
    pub reference_analysis: Option<ReferenceAnalysis>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Populated only on single-session reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<FolderResponse>,
}

#[derive(Debug, Serialize)]
pub struct SessionEnvelope {
    pub message: String,
    pub session: SessionResponse,
}

// -- Folders --

#[derive(Debug, Clone)]
pub struct FolderRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderResponse {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}
