pub mod access;
pub mod auth;
pub mod boards;
pub mod collaborators;
pub mod config;
pub mod contracts;
pub mod convert;
pub mod elements;
pub mod error;
pub mod folders;
pub mod identity;
pub mod middleware;
pub mod routes;
pub mod sessions;
pub mod state;

pub use routes::router;
pub use state::{AppState, AppStateInner};
