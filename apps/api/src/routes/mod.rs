pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::accounts::handlers as accounts;
use crate::jobs::handlers as jobs;
use crate::organizations::handlers as organizations;
use crate::state::AppState;

/// `{ "data": ... }` wrapper used by the content endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/auth/local", post(accounts::handle_login))
        .route("/api/auth/local/register", post(accounts::handle_register))
        .route("/api/users/me", get(accounts::handle_me))
        .route("/api/users/:id", put(accounts::handle_update_user))
        // Jobs
        .route("/api/jobs", post(jobs::handle_create_job))
        .route(
            "/api/jobs/latest-and-categories",
            get(jobs::handle_latest_and_categories),
        )
        .route("/api/jobs/:id", put(jobs::handle_update_job))
        .route("/api/jobs-applied", post(jobs::handle_apply))
        // Organizations
        .route(
            "/api/organizations/:id",
            put(organizations::handle_update_organization),
        )
        .with_state(state)
}
