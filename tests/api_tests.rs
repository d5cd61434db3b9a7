use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use liqo::config::Config;
use tower::ServiceExt;

/// Bootstrap account seeded by migration (must match m20240102_seed_super_admin.rs)
const SUPER_ADMIN_EMAIL: &str = "superadmin@sahabatliqo.id";
const SUPER_ADMIN_PASSWORD: &str = "password";

async fn spawn_app_with_state() -> (Router, std::sync::Arc<liqo::api::AppState>) {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // A single pooled connection keeps every query on the same in-memory database.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;

    let state = liqo::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    let app = liqo::api::router(state.clone()).await;
    (app, state)
}

async fn spawn_app() -> Router {
    spawn_app_with_state().await.0
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", mime::APPLICATION_JSON.as_ref());

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let body = body.map_or_else(Body::empty, |v| Body::from(v.to_string()));

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, serde_json::Value) {
    send_json(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await
}

/// Logs in as the seeded super admin and returns a bearer token.
async fn super_admin_token(app: &Router) -> String {
    let (status, body) = login(app, SUPER_ADMIN_EMAIL, SUPER_ADMIN_PASSWORD).await;
    assert_eq!(status, StatusCode::OK, "super admin login failed: {body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn create_mentor(app: &Router, token: &str, email: &str, name: &str) -> i32 {
    let (status, body) = send_json(
        app,
        "POST",
        "/api/mentors",
        Some(token),
        Some(serde_json::json!({
            "email": email,
            "password": "rahasia-123",
            "full_name": name,
            "gender": "Ikhwan",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "mentor creation failed: {body}");
    i32::try_from(body["data"]["id"].as_i64().unwrap()).unwrap()
}

async fn create_group(app: &Router, token: &str, name: &str, mentor_id: i32) -> i32 {
    let (status, body) = send_json(
        app,
        "POST",
        "/api/groups",
        Some(token),
        Some(serde_json::json!({
            "group_name": name,
            "description": "Kelompok uji",
            "mentor_id": mentor_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "group creation failed: {body}");
    i32::try_from(body["data"]["id"].as_i64().unwrap()).unwrap()
}

async fn create_mentee(app: &Router, token: &str, name: &str, group_id: Option<i32>) -> i32 {
    let (status, body) = send_json(
        app,
        "POST",
        "/api/mentees",
        Some(token),
        Some(serde_json::json!({
            "full_name": name,
            "gender": "Akhwat",
            "status": "Aktif",
            "group_id": group_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "mentee creation failed: {body}");
    i32::try_from(body["data"]["id"].as_i64().unwrap()).unwrap()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = spawn_app().await;

    let (status, body) = send_json(&app, "GET", "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_login_returns_token_and_user() {
    let app = spawn_app().await;

    let (status, body) = login(&app, SUPER_ADMIN_EMAIL, SUPER_ADMIN_PASSWORD).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(!body["data"]["token"].as_str().unwrap().is_empty());
    assert_eq!(body["data"]["user"]["email"], SUPER_ADMIN_EMAIL);
    assert_eq!(body["data"]["user"]["role"], "super_admin");
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let app = spawn_app().await;

    let (status, body) = login(&app, SUPER_ADMIN_EMAIL, "salah-total").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_login_validation_error_shape() {
    let app = spawn_app().await;

    let (status, body) = login(&app, "bukan-email", "").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Data yang diberikan tidak valid.");
    assert!(body["errors"]["email"].is_array());
    assert!(body["errors"]["password"].is_array());
}

#[tokio::test]
async fn test_login_throttled_after_repeated_attempts() {
    let app = spawn_app().await;

    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/login")
                    .header("Content-Type", mime::APPLICATION_JSON.as_ref())
                    .header("x-forwarded-for", "9.9.9.9")
                    .body(Body::from(
                        serde_json::json!({
                            "email": SUPER_ADMIN_EMAIL,
                            "password": "salah-total",
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", mime::APPLICATION_JSON.as_ref())
                .header("x-forwarded-for", "9.9.9.9")
                .body(Body::from(
                    serde_json::json!({
                        "email": SUPER_ADMIN_EMAIL,
                        "password": SUPER_ADMIN_PASSWORD,
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let app = spawn_app().await;

    let (status, _) = send_json(&app, "GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_json(&app, "GET", "/api/mentees", Some("token-palsu"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = spawn_app().await;
    let token = super_admin_token(&app).await;

    let (status, _) = send_json(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(&app, "POST", "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_mentor_cannot_reach_admin_routes() {
    let app = spawn_app().await;
    let admin_token = super_admin_token(&app).await;

    create_mentor(&app, &admin_token, "ustadz@sahabatliqo.id", "Ustadz Fulan").await;

    let (status, body) = login(&app, "ustadz@sahabatliqo.id", "rahasia-123").await;
    assert_eq!(status, StatusCode::OK);
    let mentor_token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, _) = send_json(&app, "GET", "/api/mentees", Some(&mentor_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send_json(&app, "GET", "/api/admins", Some(&mentor_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Shared routes stay open, scoped to the mentor's own groups.
    let (status, body) = send_json(&app, "GET", "/api/groups", Some(&mentor_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_blocked_mentor_cannot_login() {
    let app = spawn_app().await;
    let admin_token = super_admin_token(&app).await;

    let mentor_id =
        create_mentor(&app, &admin_token, "terblokir@sahabatliqo.id", "Ustadz Blokir").await;

    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/api/users/{mentor_id}/block"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = login(&app, "terblokir@sahabatliqo.id", "rahasia-123").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "ACCOUNT_BLOCKED");
    assert!(body["blocked_at"].is_string());

    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/api/users/{mentor_id}/unblock"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = login(&app, "terblokir@sahabatliqo.id", "rahasia-123").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_super_admin_cannot_block_self() {
    let app = spawn_app().await;
    let token = super_admin_token(&app).await;

    let (_, body) = send_json(&app, "GET", "/api/auth/me", Some(&token), None).await;
    let own_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/api/users/{own_id}/block"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_mentee_group_membership_lifecycle() {
    let app = spawn_app().await;
    let token = super_admin_token(&app).await;

    let mentor_id = create_mentor(&app, &token, "mentor@sahabatliqo.id", "Mentor Satu").await;
    let group_a = create_group(&app, &token, "Kelompok A", mentor_id).await;
    let group_b = create_group(&app, &token, "Kelompok B", mentor_id).await;
    let mentee_id = create_mentee(&app, &token, "Aisyah", Some(group_a)).await;

    // Move to the other group.
    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/mentees/{mentee_id}/move"),
        Some(&token),
        Some(serde_json::json!({ "group_id": group_b })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["group_id"], group_b);

    let (status, body) = send_json(
        &app,
        "GET",
        &format!("/api/groups/{group_b}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let members = body["data"]["members"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["full_name"], "Aisyah");

    // Deleting the group releases its members.
    let (status, body) = send_json(
        &app,
        "GET",
        &format!("/api/groups/{group_b}/delete-info"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["mentee_count"], 1);

    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/api/groups/{group_b}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(&app, "GET", "/api/mentees/available", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let available = body["data"].as_array().unwrap();
    assert!(available.iter().any(|m| m["id"] == mentee_id));

    let (_, body) = send_json(&app, "GET", "/api/groups/trashed", Some(&token), None).await;
    let trashed = body["data"].as_array().unwrap();
    assert!(trashed.iter().any(|g| g["id"] == group_b));

    // Force delete is only valid from the trash.
    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/api/groups/{group_a}/force"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/api/groups/{group_b}/restore"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send_json(&app, "GET", "/api/groups", Some(&token), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_move_mentees_in_bulk() {
    let app = spawn_app().await;
    let token = super_admin_token(&app).await;

    let mentor_id = create_mentor(&app, &token, "mentor@sahabatliqo.id", "Mentor Satu").await;
    let group = create_group(&app, &token, "Kelompok Baru", mentor_id).await;
    let first = create_mentee(&app, &token, "Fatimah", None).await;
    let second = create_mentee(&app, &token, "Khadijah", None).await;

    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/api/groups/{group}/move-mentees"),
        Some(&token),
        Some(serde_json::json!({ "mentee_ids": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/groups/{group}/move-mentees"),
        Some(&token),
        Some(serde_json::json!({ "mentee_ids": [first, second] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "bulk move failed: {body}");

    let (_, body) = send_json(
        &app,
        "GET",
        &format!("/api/groups/{group}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"]["members"].as_array().unwrap().len(), 2);

    // A missing mentee rolls the whole batch back.
    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/api/groups/{group}/move-mentees"),
        Some(&token),
        Some(serde_json::json!({ "mentee_ids": [first, 9999] })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_mentee_rejects_unknown_group() {
    let app = spawn_app().await;
    let token = super_admin_token(&app).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/mentees",
        Some(&token),
        Some(serde_json::json!({
            "full_name": "Aisyah",
            "gender": "Akhwat",
            "status": "Aktif",
            "group_id": 9999,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
    assert!(body["errors"]["group_id"].is_array());

    // A trashed group is just as unassignable as an unknown one.
    let mentor_id = create_mentor(&app, &token, "mentor@sahabatliqo.id", "Mentor Satu").await;
    let group = create_group(&app, &token, "Kelompok A", mentor_id).await;
    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/api/groups/{group}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/mentees",
        Some(&token),
        Some(serde_json::json!({
            "full_name": "Fatimah",
            "gender": "Akhwat",
            "status": "Aktif",
            "group_id": group,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
    assert!(body["errors"]["group_id"].is_array());
}

#[tokio::test]
async fn test_membership_history_rows() {
    use liqo::entities::prelude::GroupHistories;
    use sea_orm::EntityTrait;

    let (app, state) = spawn_app_with_state().await;
    let token = super_admin_token(&app).await;

    let (_, me) = send_json(&app, "GET", "/api/auth/me", Some(&token), None).await;
    let admin_id = me["data"]["id"].as_i64().unwrap();

    let mentor_id = create_mentor(&app, &token, "mentor@sahabatliqo.id", "Mentor Satu").await;
    let group = create_group(&app, &token, "Kelompok A", mentor_id).await;

    // An explicit move writes exactly one history row.
    let loose = create_mentee(&app, &token, "Aisyah", None).await;
    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/mentees/{loose}/move"),
        Some(&token),
        Some(serde_json::json!({ "group_id": group })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let rows = GroupHistories::find()
        .all(&state.store().conn)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].mentee_id, loose);
    assert_eq!(rows[0].from_group_id, None);
    assert_eq!(rows[0].to_group_id, Some(group));
    assert_eq!(i64::from(rows[0].moved_by), admin_id);

    // Assignment at creation time counts as a membership change too.
    let direct = create_mentee(&app, &token, "Fatimah", Some(group)).await;
    let rows = GroupHistories::find()
        .all(&state.store().conn)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(
        rows.iter()
            .any(|r| r.mentee_id == direct && r.from_group_id.is_none()
                && r.to_group_id == Some(group))
    );

    // Soft-deleting the group releases both mentees with one row each.
    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/api/groups/{group}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let rows = GroupHistories::find()
        .all(&state.store().conn)
        .await
        .unwrap();
    assert_eq!(rows.len(), 4);
    let released: Vec<_> = rows
        .iter()
        .filter(|r| r.from_group_id == Some(group) && r.to_group_id.is_none())
        .collect();
    assert_eq!(released.len(), 2);
}

#[tokio::test]
async fn test_attendance_recording_and_stats() {
    let app = spawn_app().await;
    let token = super_admin_token(&app).await;

    let mentor_id = create_mentor(&app, &token, "mentor@sahabatliqo.id", "Mentor Satu").await;
    let group = create_group(&app, &token, "Kelompok A", mentor_id).await;
    let first = create_mentee(&app, &token, "Aisyah", Some(group)).await;
    let second = create_mentee(&app, &token, "Fatimah", Some(group)).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/meetings",
        Some(&token),
        Some(serde_json::json!({
            "group_id": group,
            "meeting_date": "2026-08-10",
            "place": "Masjid Al-Ikhlas",
            "topic": "Adab menuntut ilmu",
            "meeting_type": "Offline",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "meeting creation failed: {body}");
    let meeting_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/meetings/{meeting_id}/attendances"),
        Some(&token),
        Some(serde_json::json!({
            "attendances": [
                { "mentee_id": first, "status": "Hadir" },
                { "mentee_id": second, "status": "Alpa" },
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "attendance failed: {body}");
    assert_eq!(body["data"]["stats"]["total"], 2);
    assert_eq!(body["data"]["stats"]["present"], 1);
    assert_eq!(body["data"]["stats"]["absent"], 1);
    assert_eq!(body["data"]["stats"]["attendance_rate"], 50.0);

    // Re-recording overwrites instead of duplicating.
    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/meetings/{meeting_id}/attendances"),
        Some(&token),
        Some(serde_json::json!({
            "attendances": [
                { "mentee_id": second, "status": "Hadir", "notes": "Datang terlambat" },
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["attendances"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["stats"]["present"], 2);
    assert_eq!(body["data"]["stats"]["attendance_rate"], 100.0);

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/meetings/{meeting_id}/attendances"),
        Some(&token),
        Some(serde_json::json!({
            "attendances": [
                { "mentee_id": first, "status": "bolos" },
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");

    let (status, body) = send_json(
        &app,
        "GET",
        "/api/meetings/attendance-report",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["meetings"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["overall"]["total"], 2);
    assert_eq!(body["data"]["overall"]["attendance_rate"], 100.0);

    let (status, body) = send_json(
        &app,
        "GET",
        "/api/meetings/attendance-report?group_id=9999",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["meetings"].as_array().unwrap().is_empty());
    assert_eq!(body["data"]["overall"]["attendance_rate"], 0.0);
}

#[tokio::test]
async fn test_monthly_report() {
    let app = spawn_app().await;
    let token = super_admin_token(&app).await;

    let mentor_id = create_mentor(&app, &token, "mentor@sahabatliqo.id", "Mentor Satu").await;
    let group = create_group(&app, &token, "Kelompok A", mentor_id).await;
    let mentee = create_mentee(&app, &token, "Aisyah", Some(group)).await;

    let (_, body) = send_json(
        &app,
        "POST",
        "/api/meetings",
        Some(&token),
        Some(serde_json::json!({
            "group_id": group,
            "meeting_date": "2026-08-10",
            "meeting_type": "Online",
        })),
    )
    .await;
    let meeting_id = body["data"]["id"].as_i64().unwrap();

    send_json(
        &app,
        "POST",
        &format!("/api/meetings/{meeting_id}/attendances"),
        Some(&token),
        Some(serde_json::json!({
            "attendances": [{ "mentee_id": mentee, "status": "Hadir" }],
        })),
    )
    .await;

    let (status, body) = send_json(
        &app,
        "GET",
        "/api/reports/monthly?month=8&year=2026",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "report failed: {body}");
    let groups = body["data"]["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["meeting_count"], 1);
    assert_eq!(groups[0]["stats"]["attendance_rate"], 100.0);
    assert_eq!(groups[0]["mentees"].as_array().unwrap().len(), 1);

    // A different month has the group but no meetings.
    let (status, body) = send_json(
        &app,
        "GET",
        "/api/reports/monthly?month=7&year=2026",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let groups = body["data"]["groups"].as_array().unwrap();
    assert_eq!(groups[0]["meeting_count"], 0);
    assert_eq!(groups[0]["stats"]["total"], 0);

    let (status, _) = send_json(
        &app,
        "GET",
        "/api/reports/monthly?month=13&year=2026",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_email_uniqueness() {
    let app = spawn_app().await;
    let token = super_admin_token(&app).await;

    let mentor_id = create_mentor(&app, &token, "mentor@sahabatliqo.id", "Mentor Satu").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/mentors",
        Some(&token),
        Some(serde_json::json!({
            "email": "mentor@sahabatliqo.id",
            "password": "rahasia-123",
            "full_name": "Mentor Dua",
            "gender": "Ikhwan",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
    assert!(body["errors"]["email"].is_array());

    // The seeded super admin holds this address, so it clashes across roles.
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/mentors",
        Some(&token),
        Some(serde_json::json!({
            "email": SUPER_ADMIN_EMAIL,
            "password": "rahasia-123",
            "full_name": "Mentor Tiga",
            "gender": "Ikhwan",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");

    // Updating a record without changing its email must not self-collide.
    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/api/mentors/{mentor_id}"),
        Some(&token),
        Some(serde_json::json!({
            "email": "mentor@sahabatliqo.id",
            "full_name": "Mentor Satu Diperbarui",
            "gender": "Ikhwan",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

#[tokio::test]
async fn test_exports_not_implemented() {
    let app = spawn_app().await;
    let token = super_admin_token(&app).await;

    let (status, _) = send_json(
        &app,
        "GET",
        "/api/reports/monthly/export/pdf",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);

    let (status, _) = send_json(
        &app,
        "GET",
        "/api/meetings/export/excel",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn test_announcement_multipart_lifecycle() {
    let app = spawn_app().await;
    let token = super_admin_token(&app).await;

    let boundary = "liqo-test-boundary";
    let form = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nKajian Akbar\r\n--{boundary}\r\nContent-Disposition: form-data; name=\"content\"\r\n\r\nKajian akbar bulan ini.\r\n--{boundary}--\r\n"
    );

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/announcements")
                .header("Authorization", format!("Bearer {token}"))
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(form))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["title"], "Kajian Akbar");
    assert_eq!(body["data"]["is_archived"], false);

    let (status, body) = send_json(&app, "GET", "/api/announcements", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/api/announcements/{id}/archive"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send_json(&app, "GET", "/api/announcements", Some(&token), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let (_, body) = send_json(
        &app,
        "GET",
        "/api/announcements/archived",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_mentee_trash_and_restore() {
    let app = spawn_app().await;
    let token = super_admin_token(&app).await;

    let mentee = create_mentee(&app, &token, "Maryam", None).await;

    // Force delete before trashing is refused.
    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/api/mentees/{mentee}/force"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/api/mentees/{mentee}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send_json(&app, "GET", "/api/mentees", Some(&token), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/api/mentees/{mentee}/restore"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send_json(&app, "GET", "/api/mentees", Some(&token), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/api/mentees/{mentee}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/api/mentees/{mentee}/force"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send_json(&app, "GET", "/api/mentees/trashed", Some(&token), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}
