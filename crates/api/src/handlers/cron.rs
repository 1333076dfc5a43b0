//! Handler for the external cron entry point. Platforms without durable
//! in-process schedulers (or operators who prefer an external trigger) can
//! hit this route from a scheduler job; it runs the same sweep the
//! background loop does.

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use consulta_core::error::CoreError;

use crate::background::reminders::{run_sweep, SweepOutcome};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/v1/cron/reminders
///
/// Protected by a shared secret rather than a user token: the caller must
/// send `Authorization: Bearer <CRON_SECRET>`.
pub async fn trigger_reminders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<SweepOutcome>> {
    let expected = format!("Bearer {}", state.config.cron_secret);
    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if presented != Some(expected.as_str()) {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid cron secret".into(),
        )));
    }

    let outcome = run_sweep(&state.pool, &state.mailer, Utc::now()).await?;
    Ok(Json(outcome))
}
