//! roster-web library - HTTP service for the volunteer-assignment tracker

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use roster_common::auth::generate_session_token;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Live session tokens. Process-local: a restart logs everyone out.
    sessions: Arc<Mutex<HashSet<String>>>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            sessions: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Mint a new session token and remember it
    pub fn issue_session(&self) -> String {
        let token = generate_session_token();
        self.sessions.lock().expect("sessions lock").insert(token.clone());
        token
    }

    pub fn session_is_valid(&self, token: &str) -> bool {
        self.sessions.lock().expect("sessions lock").contains(token)
    }

    pub fn revoke_session(&self, token: &str) {
        self.sessions.lock().expect("sessions lock").remove(token);
    }
}

/// Build application router
///
/// Everything under /api except login requires a valid session cookie;
/// the health endpoint is public.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post, put};

    // Protected routes (require a session)
    let protected = Router::new()
        .route("/api/db", get(api::snapshot::get_db).put(api::snapshot::put_db))
        .route("/api/people", post(api::people::create_person))
        .route(
            "/api/people/:id",
            put(api::people::update_person).delete(api::people::delete_person),
        )
        .route("/api/people/:id/partners", get(api::people::list_partners))
        .route("/api/tasks", post(api::tasks::create_task))
        .route(
            "/api/tasks/:id",
            put(api::tasks::update_task).delete(api::tasks::delete_task),
        )
        .route("/api/tasks/status", post(api::tasks::set_status))
        .route("/api/auth/logout", post(api::auth::logout))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::session_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/api/auth/login", post(api::auth::login))
        .merge(api::health::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
