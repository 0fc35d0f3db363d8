use crate::Database;
use crate::models::{
    AccessibleBoardRow, BoardRow, CollaboratorRow, ElementRow, FolderRow, SessionRow, UserRow,
};
use anyhow::Result;
use mixboard_types::models::{CollaboratorRole, ElementKind};
use rusqlite::{Row, params};

const USER_COLUMNS: &str = "id, email, name, password, profile_avatar, created_at";
const BOARD_COLUMNS: &str = "id, owner_id, name, description, created_at, updated_at";
const ELEMENT_COLUMNS: &str =
    "id, board_id, type, position_x, position_y, width, height, data, created_at, updated_at";
const FOLDER_COLUMNS: &str = "id, user_id, name, created_at";
const SESSION_COLUMNS: &str =
    "id, user_id, folder_id, name, reference_analysis, created_at, updated_at";

/// Partial element update. `None` leaves the column untouched, so concurrent
/// updates to disjoint fields do not clobber each other.
#[derive(Debug, Default)]
pub struct ElementChanges<'a> {
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub data: Option<&'a str>,
}

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        email: &str,
        name: &str,
        password_hash: &str,
        profile_avatar: Option<&str>,
    ) -> Result<UserRow> {
        self.with_conn(|conn| {
            let row = conn.query_row(
                &format!(
                    "INSERT INTO users (id, email, name, password, profile_avatar)
                     VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {USER_COLUMNS}"
                ),
                params![id, email, name, password_hash, profile_avatar],
                user_from_row,
            )?;
            Ok(row)
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                [email],
                user_from_row,
            )
            .optional()
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                [id],
                user_from_row,
            )
            .optional()
        })
    }

    // -- Boards --

    pub fn create_board(
        &self,
        id: &str,
        owner_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<BoardRow> {
        self.with_conn(|conn| {
            let row = conn.query_row(
                &format!(
                    "INSERT INTO boards (id, owner_id, name, description)
                     VALUES (?1, ?2, ?3, ?4) RETURNING {BOARD_COLUMNS}"
                ),
                params![id, owner_id, name, description],
                board_from_row,
            )?;
            Ok(row)
        })
    }

    pub fn get_board(&self, id: &str) -> Result<Option<BoardRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {BOARD_COLUMNS} FROM boards WHERE id = ?1"),
                [id],
                board_from_row,
            )
            .optional()
        })
    }

    /// Boards the user owns or holds a grant on, newest first.
    pub fn list_boards_for_user(&self, user_id: &str) -> Result<Vec<AccessibleBoardRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT b.id, b.owner_id, b.name, b.description, b.created_at, b.updated_at, c.role
                 FROM boards b
                 LEFT JOIN board_collaborators c ON c.board_id = b.id AND c.user_id = ?1
                 WHERE b.owner_id = ?1 OR c.user_id IS NOT NULL
                 ORDER BY b.created_at DESC, b.rowid DESC",
            )?;

            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(AccessibleBoardRow {
                        board: board_from_row(row)?,
                        grant: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// `description` is `None` to keep the current value, `Some(None)` to clear it.
    pub fn update_board(
        &self,
        id: &str,
        name: Option<&str>,
        description: Option<Option<&str>>,
    ) -> Result<Option<BoardRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "UPDATE boards SET
                        name = COALESCE(?2, name),
                        description = CASE WHEN ?3 THEN ?4 ELSE description END,
                        updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE id = ?1 RETURNING {BOARD_COLUMNS}"
                ),
                params![id, name, description.is_some(), description.flatten()],
                board_from_row,
            )
            .optional()
        })
    }

    /// Elements and collaborator grants go with the board via ON DELETE CASCADE.
    pub fn delete_board(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM boards WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }

    // -- Collaborators --

    pub fn get_collaborator_role(&self, user_id: &str, board_id: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT role FROM board_collaborators WHERE user_id = ?1 AND board_id = ?2",
                [user_id, board_id],
                |row| row.get(0),
            )
            .optional()
        })
    }

    pub fn add_collaborator(
        &self,
        user_id: &str,
        board_id: &str,
        role: CollaboratorRole,
    ) -> Result<CollaboratorRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO board_collaborators (user_id, board_id, role) VALUES (?1, ?2, ?3)",
                params![user_id, board_id, role.as_str()],
            )?;
            let row = conn.query_row(
                "SELECT c.user_id, c.board_id, c.role, u.name, u.email, c.created_at
                 FROM board_collaborators c
                 JOIN users u ON u.id = c.user_id
                 WHERE c.user_id = ?1 AND c.board_id = ?2",
                [user_id, board_id],
                collaborator_from_row,
            )?;
            Ok(row)
        })
    }

    pub fn list_collaborators(&self, board_id: &str) -> Result<Vec<CollaboratorRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.user_id, c.board_id, c.role, u.name, u.email, c.created_at
                 FROM board_collaborators c
                 JOIN users u ON u.id = c.user_id
                 WHERE c.board_id = ?1
                 ORDER BY c.created_at, c.rowid",
            )?;

            let rows = stmt
                .query_map([board_id], collaborator_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn remove_collaborator(&self, user_id: &str, board_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM board_collaborators WHERE user_id = ?1 AND board_id = ?2",
                [user_id, board_id],
            )?;
            Ok(deleted > 0)
        })
    }

    // -- Elements --

    #[allow(clippy::too_many_arguments)]
    pub fn create_element(
        &self,
        id: &str,
        board_id: &str,
        kind: ElementKind,
        position_x: f64,
        position_y: f64,
        width: f64,
        height: f64,
        data: &str,
    ) -> Result<ElementRow> {
        self.with_conn(|conn| {
            let row = conn.query_row(
                &format!(
                    "INSERT INTO elements (id, board_id, type, position_x, position_y, width, height, data)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) RETURNING {ELEMENT_COLUMNS}"
                ),
                params![id, board_id, kind.as_str(), position_x, position_y, width, height, data],
                element_from_row,
            )?;
            Ok(row)
        })
    }

    pub fn get_element(&self, id: &str) -> Result<Option<ElementRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {ELEMENT_COLUMNS} FROM elements WHERE id = ?1"),
                [id],
                element_from_row,
            )
            .optional()
        })
    }

    pub fn list_elements(&self, board_id: &str) -> Result<Vec<ElementRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ELEMENT_COLUMNS} FROM elements WHERE board_id = ?1 ORDER BY created_at, rowid"
            ))?;

            let rows = stmt
                .query_map([board_id], element_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn update_element(&self, id: &str, changes: &ElementChanges<'_>) -> Result<Option<ElementRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "UPDATE elements SET
                        position_x = COALESCE(?2, position_x),
                        position_y = COALESCE(?3, position_y),
                        width = COALESCE(?4, width),
                        height = COALESCE(?5, height),
                        data = COALESCE(?6, data),
                        updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE id = ?1 RETURNING {ELEMENT_COLUMNS}"
                ),
                params![
                    id,
                    changes.position_x,
                    changes.position_y,
                    changes.width,
                    changes.height,
                    changes.data
                ],
                element_from_row,
            )
            .optional()
        })
    }

    pub fn delete_element(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM elements WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }

    // -- Folders --

    pub fn create_folder(&self, id: &str, user_id: &str, name: &str) -> Result<FolderRow> {
        self.with_conn(|conn| {
            let row = conn.query_row(
                &format!(
                    "INSERT INTO folders (id, user_id, name) VALUES (?1, ?2, ?3) RETURNING {FOLDER_COLUMNS}"
                ),
                [id, user_id, name],
                folder_from_row,
            )?;
            Ok(row)
        })
    }

    pub fn get_folder(&self, id: &str) -> Result<Option<FolderRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {FOLDER_COLUMNS} FROM folders WHERE id = ?1"),
                [id],
                folder_from_row,
            )
            .optional()
        })
    }

    pub fn list_folders(&self, user_id: &str) -> Result<Vec<FolderRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {FOLDER_COLUMNS} FROM folders WHERE user_id = ?1 ORDER BY name, rowid"
            ))?;

            let rows = stmt
                .query_map([user_id], folder_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn rename_folder(&self, id: &str, name: &str) -> Result<Option<FolderRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("UPDATE folders SET name = ?2 WHERE id = ?1 RETURNING {FOLDER_COLUMNS}"),
                [id, name],
                folder_from_row,
            )
            .optional()
        })
    }

    /// Sessions in the folder survive with `folder_id` set to NULL.
    pub fn delete_folder(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM folders WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }

    // -- Sessions --

    pub fn create_session(
        &self,
        id: &str,
        user_id: &str,
        folder_id: Option<&str>,
        name: &str,
        reference_analysis: Option<&str>,
    ) -> Result<SessionRow> {
        self.with_conn(|conn| {
            let row = conn.query_row(
                &format!(
                    "INSERT INTO sessions (id, user_id, folder_id, name, reference_analysis)
                     VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {SESSION_COLUMNS}"
                ),
                params![id, user_id, folder_id, name, reference_analysis],
                session_from_row,
            )?;
            Ok(row)
        })
    }

    pub fn get_session(&self, id: &str) -> Result<Option<SessionRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"),
                [id],
                session_from_row,
            )
            .optional()
        })
    }

    pub fn list_sessions(&self, user_id: &str) -> Result<Vec<SessionRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions WHERE user_id = ?1
                 ORDER BY created_at DESC, rowid DESC"
            ))?;

            let rows = stmt
                .query_map([user_id], session_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// `folder_id` is `None` to keep the current folder, `Some(None)` to clear it.
    pub fn update_session(
        &self,
        id: &str,
        name: Option<&str>,
        folder_id: Option<Option<&str>>,
    ) -> Result<Option<SessionRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "UPDATE sessions SET
                        name = COALESCE(?2, name),
                        folder_id = CASE WHEN ?3 THEN ?4 ELSE folder_id END,
                        updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE id = ?1 RETURNING {SESSION_COLUMNS}"
                ),
                params![id, name, folder_id.is_some(), folder_id.flatten()],
                session_from_row,
            )
            .optional()
        })
    }

    pub fn set_reference_analysis(&self, id: &str, analysis: &str) -> Result<Option<SessionRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "UPDATE sessions SET
                        reference_analysis = ?2,
                        updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE id = ?1 RETURNING {SESSION_COLUMNS}"
                ),
                [id, analysis],
                session_from_row,
            )
            .optional()
        })
    }

    /// Returns the deleted row so callers can echo it back.
    pub fn delete_session(&self, id: &str) -> Result<Option<SessionRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("DELETE FROM sessions WHERE id = ?1 RETURNING {SESSION_COLUMNS}"),
                [id],
                session_from_row,
            )
            .optional()
        })
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        password: row.get(3)?,
        profile_avatar: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn board_from_row(row: &Row<'_>) -> rusqlite::Result<BoardRow> {
    Ok(BoardRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn collaborator_from_row(row: &Row<'_>) -> rusqlite::Result<CollaboratorRow> {
    Ok(CollaboratorRow {
        user_id: row.get(0)?,
        board_id: row.get(1)?,
        role: row.get(2)?,
        name: row.get(3)?,
        email: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn element_from_row(row: &Row<'_>) -> rusqlite::Result<ElementRow> {
    Ok(ElementRow {
        id: row.get(0)?,
        board_id: row.get(1)?,
        kind: row.get(2)?,
        position_x: row.get(3)?,
        position_y: row.get(4)?,
        width: row.get(5)?,
        height: row.get(6)?,
        data: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn folder_from_row(row: &Row<'_>) -> rusqlite::Result<FolderRow> {
    Ok(FolderRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<SessionRow> {
    Ok(SessionRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        folder_id: row.get(2)?,
        name: row.get(3)?,
        reference_analysis: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
