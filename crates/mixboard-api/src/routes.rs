use axum::{
    Json, Router, middleware,
    routing::{delete, get, patch, post, put},
};
use serde_json::{Value, json};

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{auth, boards, collaborators, elements, folders, sessions};

/// The full API. Everything except health, register and login sits behind
/// `require_auth`.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/boards", get(boards::list_boards).post(boards::create_board))
        .route(
            "/boards/{board_id}",
            get(boards::get_board)
                .patch(boards::update_board)
                .delete(boards::delete_board),
        )
        .route(
            "/boards/{board_id}/collaborators",
            get(collaborators::list_collaborators).post(collaborators::add_collaborator),
        )
        .route(
            "/boards/{board_id}/collaborators/{user_id}",
            delete(collaborators::remove_collaborator),
        )
        .route(
            "/boards/{board_id}/elements",
            get(elements::list_elements).post(elements::create_element),
        )
        .route(
            "/elements/{element_id}",
            put(elements::update_element).delete(elements::delete_element),
        )
        .route("/sessions", get(sessions::list_sessions).post(sessions::create_session))
        .route(
            "/sessions/{session_id}",
            get(sessions::get_session)
                .patch(sessions::update_session)
                .delete(sessions::delete_session),
        )
        .route("/sessions/{session_id}/reference", patch(sessions::attach_reference))
        .route("/folders", get(folders::list_folders).post(folders::create_folder))
        .route(
            "/folders/{folder_id}",
            patch(folders::update_folder).delete(folders::delete_folder),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
