//! Web front-end: one page that re-renders after every change, plus a
//! small JSON API over the same file.

pub mod routes;
pub mod state;

use std::net::SocketAddr;

use axum::Router;
use tracing::info;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    routes::router().with_state(state)
}

/// Serves `state` on `addr` until the process is stopped.
pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    info!(addr = %addr, todo_file = %state.store.path().display(), "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await
}
