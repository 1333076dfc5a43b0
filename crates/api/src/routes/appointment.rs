//! Route definitions for the `/appointments` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::appointment;
use crate::state::AppState;

/// Routes mounted at `/appointments`.
///
/// All routes require authentication; admins see every appointment, other
/// users only their own.
///
/// ```text
/// GET    /        -> list
/// POST   /        -> create
/// GET    /{id}    -> get_by_id
/// PUT    /{id}    -> update
/// DELETE /{id}    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(appointment::list).post(appointment::create))
        .route(
            "/{id}",
            get(appointment::get_by_id)
                .put(appointment::update)
                .delete(appointment::delete),
        )
}
