//! Who may do what to which resource.
//!
//! Role resolution and the permission table are pure. The `authorize_*`
//! helpers load the target from the store, resolve the caller's role and
//! return the loaded rows when the action is allowed, so handlers never act
//! on a resource they have not been cleared for.

use tracing::warn;
use uuid::Uuid;

use mixboard_db::Database;
use mixboard_db::models::{BoardRow, ElementRow, FolderRow, SessionRow};
use mixboard_types::models::{CollaboratorRole, Role};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Board,
    Element,
    Session,
    Folder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Write,
    Delete,
    /// Manage who else can see a board.
    Share,
}

/// Owner beats any grant; a grant beats nothing.
pub fn resolve_role(caller: &str, owner_id: &str, grant: Option<CollaboratorRole>) -> Role {
    if caller == owner_id {
        Role::Owner
    } else {
        grant.map(Role::from).unwrap_or(Role::None)
    }
}

pub fn permits(role: Role, kind: ResourceKind, action: Action) -> bool {
    match (role, kind) {
        (Role::Owner, _) => true,
        (Role::None, _) => false,
        // Sessions and folders are private to their owner.
        (_, ResourceKind::Session | ResourceKind::Folder) => false,
        (Role::Viewer, _) => action == Action::Read,
        (Role::Editor, ResourceKind::Element) => {
            matches!(action, Action::Read | Action::Write | Action::Delete)
        }
        (Role::Editor, ResourceKind::Board) => matches!(action, Action::Read | Action::Write),
    }
}

/// A board the caller has been cleared for, with the role that cleared them.
pub struct BoardAccess {
    pub board: BoardRow,
    pub role: Role,
}

pub struct ElementAccess {
    pub element: ElementRow,
    pub board: BoardAccess,
}

fn denial(kind: ResourceKind, action: Action) -> String {
    let target = match kind {
        ResourceKind::Board => "this board",
        ResourceKind::Element => "elements",
        ResourceKind::Session => "this session",
        ResourceKind::Folder => "this folder",
    };
    match action {
        Action::Read => format!("User does not have access to {}", target),
        Action::Write => format!("User does not have permission to update {}", target),
        Action::Delete => format!("User does not have permission to delete {}", target),
        Action::Share => "Only the board owner can manage collaborators".to_string(),
    }
}

fn owner_permits(caller: &str, owner_id: &str, kind: ResourceKind, action: Action) -> bool {
    permits(resolve_role(caller, owner_id, None), kind, action)
}

fn caller_grant(
    db: &Database,
    caller: &str,
    board_id: &str,
) -> Result<Option<CollaboratorRole>, ApiError> {
    let Some(role) = db.get_collaborator_role(caller, board_id)? else {
        return Ok(None);
    };
    role.parse::<CollaboratorRole>()
        .map(Some)
        .map_err(|e| ApiError::internal(anyhow::anyhow!("board '{}': {}", board_id, e)))
}

fn board_role(db: &Database, caller: &str, board: &BoardRow) -> Result<Role, ApiError> {
    // The owner never needs the grant lookup.
    if caller == board.owner_id {
        return Ok(Role::Owner);
    }
    let grant = caller_grant(db, caller, &board.id)?;
    Ok(resolve_role(caller, &board.owner_id, grant))
}

fn check_board(
    db: &Database,
    caller: &str,
    board: BoardRow,
    kind: ResourceKind,
    action: Action,
) -> Result<BoardAccess, ApiError> {
    let role = board_role(db, caller, &board)?;
    if !permits(role, kind, action) {
        warn!(
            "Denied {:?} on {:?} (board {}) for user {} with role {:?}",
            action, kind, board.id, caller, role
        );
        return Err(ApiError::forbidden(denial(kind, action)));
    }
    Ok(BoardAccess { board, role })
}

pub fn authorize_board(
    db: &Database,
    caller: Uuid,
    board_id: &str,
    action: Action,
) -> Result<BoardAccess, ApiError> {
    let board = db
        .get_board(board_id)?
        .ok_or_else(|| ApiError::not_found("Board not found"))?;
    check_board(db, &caller.to_string(), board, ResourceKind::Board, action)
}

/// An element inherits its board's grants, judged against the element table.
pub fn authorize_element(
    db: &Database,
    caller: Uuid,
    element_id: &str,
    action: Action,
) -> Result<ElementAccess, ApiError> {
    let element = db
        .get_element(element_id)?
        .ok_or_else(|| ApiError::not_found("Element not found"))?;
    let board = db
        .get_board(&element.board_id)?
        .ok_or_else(|| ApiError::not_found("Element not found"))?;
    let board = check_board(db, &caller.to_string(), board, ResourceKind::Element, action)?;
    Ok(ElementAccess { element, board })
}

/// Someone else's session answers exactly like a missing one.
pub fn authorize_session(
    db: &Database,
    caller: Uuid,
    session_id: &str,
    action: Action,
) -> Result<SessionRow, ApiError> {
    let caller = caller.to_string();
    match db.get_session(session_id)? {
        Some(session) if owner_permits(&caller, &session.user_id, ResourceKind::Session, action) => {
            Ok(session)
        }
        Some(session) => {
            warn!("Denied {:?} on session {} for user {}", action, session.id, caller);
            Err(ApiError::not_found("Session not found"))
        }
        None => Err(ApiError::not_found("Session not found")),
    }
}

pub fn authorize_folder(
    db: &Database,
    caller: Uuid,
    folder_id: &str,
    action: Action,
) -> Result<FolderRow, ApiError> {
    let caller = caller.to_string();
    match db.get_folder(folder_id)? {
        Some(folder) if owner_permits(&caller, &folder.user_id, ResourceKind::Folder, action) => {
            Ok(folder)
        }
        Some(folder) => {
            warn!("Denied {:?} on folder {} for user {}", action, folder.id, caller);
            Err(ApiError::not_found("Folder not found"))
        }
        None => Err(ApiError::not_found("Folder not found")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ACTIONS: [Action; 4] = [Action::Read, Action::Write, Action::Delete, Action::Share];
    const ALL_KINDS: [ResourceKind; 4] = [
        ResourceKind::Board,
        ResourceKind::Element,
        ResourceKind::Session,
        ResourceKind::Folder,
    ];

    #[test]
    fn owner_wins_over_grant() {
        assert_eq!(resolve_role("u1", "u1", Some(CollaboratorRole::Viewer)), Role::Owner);
        assert_eq!(resolve_role("u2", "u1", Some(CollaboratorRole::Editor)), Role::Editor);
        assert_eq!(resolve_role("u2", "u1", Some(CollaboratorRole::Viewer)), Role::Viewer);
        assert_eq!(resolve_role("u2", "u1", None), Role::None);
    }

    #[test]
    fn owner_may_do_anything_and_strangers_nothing() {
        for kind in ALL_KINDS {
            for action in ALL_ACTIONS {
                assert!(permits(Role::Owner, kind, action));
                assert!(!permits(Role::None, kind, action));
            }
        }
    }

    #[test]
    fn viewer_only_reads_boards_and_elements() {
        for kind in [ResourceKind::Board, ResourceKind::Element] {
            assert!(permits(Role::Viewer, kind, Action::Read));
            for action in [Action::Write, Action::Delete, Action::Share] {
                assert!(!permits(Role::Viewer, kind, action));
            }
        }
    }

    #[test]
    fn editor_matrix() {
        assert!(permits(Role::Editor, ResourceKind::Board, Action::Read));
        assert!(permits(Role::Editor, ResourceKind::Board, Action::Write));
        assert!(!permits(Role::Editor, ResourceKind::Board, Action::Delete));
        assert!(!permits(Role::Editor, ResourceKind::Board, Action::Share));

        assert!(permits(Role::Editor, ResourceKind::Element, Action::Read));
        assert!(permits(Role::Editor, ResourceKind::Element, Action::Write));
        assert!(permits(Role::Editor, ResourceKind::Element, Action::Delete));
        assert!(!permits(Role::Editor, ResourceKind::Element, Action::Share));
    }

    #[test]
    fn grants_never_reach_private_resources() {
        for role in [Role::Editor, Role::Viewer] {
            for kind in [ResourceKind::Session, ResourceKind::Folder] {
                for action in ALL_ACTIONS {
                    assert!(!permits(role, kind, action));
                }
            }
        }
    }

    fn seeded() -> (Database, Uuid, Uuid, Uuid) {
        let db = Database::open_in_memory().unwrap();
        let (owner, editor, outsider) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        for (id, email) in [(owner, "o@x.io"), (editor, "e@x.io"), (outsider, "s@x.io")] {
            db.create_user(&id.to_string(), email, "U", "hash", None).unwrap();
        }
        db.create_board("b1", &owner.to_string(), "Board", None).unwrap();
        db.add_collaborator(&editor.to_string(), "b1", CollaboratorRole::Editor)
            .unwrap();
        (db, owner, editor, outsider)
    }

    #[test]
    fn board_authorization_uses_stored_grants() {
        let (db, owner, editor, outsider) = seeded();

        assert_eq!(authorize_board(&db, owner, "b1", Action::Delete).unwrap().role, Role::Owner);
        assert_eq!(authorize_board(&db, editor, "b1", Action::Write).unwrap().role, Role::Editor);
        assert!(matches!(
            authorize_board(&db, editor, "b1", Action::Delete),
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            authorize_board(&db, outsider, "b1", Action::Read),
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            authorize_board(&db, owner, "missing", Action::Read),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn foreign_session_looks_missing() {
        let (db, owner, _, outsider) = seeded();
        db.create_session("s1", &owner.to_string(), None, "Mix", None).unwrap();

        assert!(authorize_session(&db, owner, "s1", Action::Write).is_ok());
        assert!(matches!(
            authorize_session(&db, outsider, "s1", Action::Read),
            Err(ApiError::NotFound(_))
        ));
    }
}
