//! Integration tests for the cron-triggered reminder sweep.

mod common;

use axum::body::Body;
use axum::http::header::AUTHORIZATION;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use common::body_json;
use consulta_api::auth::password::hash_password;
use consulta_api::background::reminders::run_sweep;
use consulta_core::roles::ROLE_USER;
use consulta_db::models::appointment::CreateAppointment;
use consulta_db::models::user::{CreateUser, User};
use consulta_db::repositories::{AppointmentRepo, UserRepo};
use consulta_mailer::Mailer;
use sqlx::PgPool;
use tower::ServiceExt;

async fn seed_user(pool: &PgPool, email: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            name: "Test Patient".to_string(),
            email: email.to_string(),
            password_hash: hash_password("test_password_123").expect("hashing"),
            role: ROLE_USER.to_string(),
        },
    )
    .await
    .expect("user creation")
}

async fn get_with_header(
    app: axum::Router,
    uri: &str,
    auth: Option<&str>,
) -> axum::http::Response<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(value) = auth {
        builder = builder.header(AUTHORIZATION, value);
    }
    let request = builder.body(Body::empty()).expect("request build");
    app.oneshot(request).await.expect("request send")
}

// ---------------------------------------------------------------------------
// Secret enforcement
// ---------------------------------------------------------------------------

/// Requests without the shared secret are rejected with 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn cron_requires_secret(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_with_header(app, "/api/v1/cron/reminders", None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// A wrong secret is rejected with 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn cron_rejects_wrong_secret(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_with_header(
        app,
        "/api/v1/cron/reminders",
        Some("Bearer not-the-secret"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// A user JWT is not a cron secret.
#[sqlx::test(migrations = "../db/migrations")]
async fn cron_rejects_user_tokens(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::test_token(1, "admin");
    let response = get_with_header(
        app,
        "/api/v1/cron/reminders",
        Some(&format!("Bearer {token}")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// The right secret triggers a sweep and returns its outcome.
#[sqlx::test(migrations = "../db/migrations")]
async fn cron_runs_sweep_with_secret(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_with_header(
        app,
        "/api/v1/cron/reminders",
        Some("Bearer test-cron-secret"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["total"].is_number());
    assert!(json["sent"].is_number());
    assert!(json["errors"].is_number());
}

// ---------------------------------------------------------------------------
// Sweep semantics (driven directly with a pinned clock)
// ---------------------------------------------------------------------------

/// An appointment exactly 72 hours out is reminded once and marked, and a
/// second sweep finds nothing.
#[sqlx::test(migrations = "../db/migrations")]
async fn sweep_sends_once_and_marks(pool: PgPool) {
    let user = seed_user(&pool, "due@example.com").await;

    let due_date = Utc::now().date_naive() + Duration::days(10);
    let appointment = AppointmentRepo::create(
        &pool,
        user.id,
        &CreateAppointment {
            date: due_date,
            time_slot: "10:00".to_string(),
            reason: "Seguimiento".to_string(),
            notes: None,
        },
    )
    .await
    .expect("seed appointment");

    // Pin the clock 72 hours before the appointment's midnight, putting
    // that midnight dead-center in the sweep window.
    let now = due_date.and_hms_opt(0, 0, 0).unwrap().and_utc() - Duration::hours(72);

    let mailer = Mailer::disabled();
    let outcome = run_sweep(&pool, &mailer, now).await.expect("sweep");
    assert_eq!(outcome.total, 1);
    assert_eq!(outcome.sent, 1);
    assert_eq!(outcome.errors, 0);

    let marked = AppointmentRepo::find_by_id(&pool, appointment.id)
        .await
        .expect("lookup")
        .expect("still there");
    assert!(marked.reminder_sent);

    // Second sweep at the same instant: nothing left to do.
    let outcome = run_sweep(&pool, &mailer, now).await.expect("sweep");
    assert_eq!(outcome.total, 0);
    assert_eq!(outcome.sent, 0);
}

/// Appointments outside the window are left alone.
#[sqlx::test(migrations = "../db/migrations")]
async fn sweep_ignores_other_dates(pool: PgPool) {
    let user = seed_user(&pool, "far@example.com").await;

    let far_date = Utc::now().date_naive() + Duration::days(20);
    let appointment = AppointmentRepo::create(
        &pool,
        user.id,
        &CreateAppointment {
            date: far_date,
            time_slot: "10:00".to_string(),
            reason: "Seguimiento".to_string(),
            notes: None,
        },
    )
    .await
    .expect("seed appointment");

    // Clock pinned 72h before a different date.
    let other_date = far_date - Duration::days(5);
    let now = other_date.and_hms_opt(0, 0, 0).unwrap().and_utc() - Duration::hours(72);

    let mailer = Mailer::disabled();
    let outcome = run_sweep(&pool, &mailer, now).await.expect("sweep");
    assert_eq!(outcome.total, 0);

    let untouched = AppointmentRepo::find_by_id(&pool, appointment.id)
        .await
        .expect("lookup")
        .expect("still there");
    assert!(!untouched.reminder_sent);
}

/// A failed send leaves that appointment pending for the next tick while the
/// rest of the sweep still goes out.
#[sqlx::test(migrations = "../db/migrations")]
async fn sweep_isolates_send_failures(pool: PgPool) {
    let reachable = seed_user(&pool, "ok@example.com").await;
    let bouncing = seed_user(&pool, "bounce@example.com").await;

    let due_date = Utc::now().date_naive() + Duration::days(10);
    let delivered = AppointmentRepo::create(
        &pool,
        reachable.id,
        &CreateAppointment {
            date: due_date,
            time_slot: "10:00".to_string(),
            reason: "Seguimiento".to_string(),
            notes: None,
        },
    )
    .await
    .expect("seed appointment");
    let bounced = AppointmentRepo::create(
        &pool,
        bouncing.id,
        &CreateAppointment {
            date: due_date,
            time_slot: "11:00".to_string(),
            reason: "Seguimiento".to_string(),
            notes: None,
        },
    )
    .await
    .expect("seed appointment");

    let now = due_date.and_hms_opt(0, 0, 0).unwrap().and_utc() - Duration::hours(72);

    let mailer = Mailer::rejecting("bounce@example.com");
    let outcome = run_sweep(&pool, &mailer, now).await.expect("sweep");
    assert_eq!(outcome.total, 2);
    assert_eq!(outcome.sent, 1);
    assert_eq!(outcome.errors, 1);

    let delivered = AppointmentRepo::find_by_id(&pool, delivered.id)
        .await
        .expect("lookup")
        .expect("still there");
    assert!(delivered.reminder_sent);

    // The failed one stays unmarked so a later tick can retry it.
    let pending = AppointmentRepo::find_by_id(&pool, bounced.id)
        .await
        .expect("lookup")
        .expect("still there");
    assert!(!pending.reminder_sent);

    // Next tick with delivery restored: only the pending one is due.
    let outcome = run_sweep(&pool, &Mailer::disabled(), now)
        .await
        .expect("sweep");
    assert_eq!(outcome.total, 1);
    assert_eq!(outcome.sent, 1);
    assert_eq!(outcome.errors, 0);

    let retried = AppointmentRepo::find_by_id(&pool, bounced.id)
        .await
        .expect("lookup")
        .expect("still there");
    assert!(retried.reminder_sent);
}
