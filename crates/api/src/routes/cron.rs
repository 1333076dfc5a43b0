//! Route definitions for the `/cron` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::cron;
use crate::state::AppState;

/// Routes mounted at `/cron`.
///
/// Protected by the shared `CRON_SECRET`, not user tokens.
///
/// ```text
/// GET /reminders  -> trigger_reminders
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/reminders", get(cron::trigger_reminders))
}
