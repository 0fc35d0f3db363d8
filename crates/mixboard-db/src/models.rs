/// Database row types. These map directly to SQLite rows and are kept
/// distinct from the mixboard-types API models.

#[derive(Debug)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password: String,
    pub profile_avatar: Option<String>,
    pub created_at: String,
}

pub struct BoardRow {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A board together with the listing user's grant, if any.
pub struct AccessibleBoardRow {
    pub board: BoardRow,
    pub grant: Option<String>,
}

pub struct CollaboratorRow {
    pub user_id: String,
    pub board_id: String,
    pub role: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

pub struct ElementRow {
    pub id: String,
    pub board_id: String,
    pub kind: String,
    pub position_x: f64,
    pub position_y: f64,
    pub width: f64,
    pub height: f64,
    pub data: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct FolderRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub created_at: String,
}

pub struct SessionRow {
    pub id: String,
    pub user_id: String,
    pub folder_id: Option<String>,
    pub name: String,
    pub reference_analysis: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
