//! HTTP application wiring (axum router + state).
//!
//! Layout:
//! - `state.rs`: repositories, session signer and configuration shared by handlers
//! - `route_table.rs`: declarative registration of binder-driven routes
//! - `routes/`: handlers (one file per area)
//! - `reply.rs`: handler outcomes and the template seam
//! - `dto.rs`: JSON mapping helpers
//! - `errors.rs`: consistent error responses

use axum::Router;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod reply;
pub mod route_table;
pub mod routes;
pub mod state;

pub use errors::HandlerError;
pub use route_table::{RouteError, RouteTable};
pub use state::{AppState, StartupError};

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(state: AppState) -> Result<Router, RouteError> {
    let table = routes::table(state.config.body_limit_bytes)?;

    Ok(table
        .into_router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::session_middleware,
        ))
        .with_state(state))
}
