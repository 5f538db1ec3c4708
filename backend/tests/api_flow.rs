//! End-to-end flow through the HTTP router: login, scheduling, sign-up,
//! attendance and the resulting ledger entry.

use std::io::Write;
use std::sync::{Arc, Mutex};

use aulao_backend::config::AppConfig;
use aulao_backend::domain::email_service::DisabledEmailSender;
use aulao_backend::domain::models::catalog::Subject;
use aulao_backend::domain::password::BcryptPasswordHasher;
use aulao_backend::domain::AuthTokens;
use aulao_backend::storage::{CatalogStorage, Connection, DbConnection, OperatorFileStore};
use aulao_backend::{create_router, initialize_backend, AppState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use serde_json::{json, Value};
use tower::ServiceExt;

const ADMIN_USERNAME: &str = "coordenacao";
const ADMIN_PASSWORD: &str = "senha-forte";

async fn setup_test() -> Router {
    let db = Arc::new(DbConnection::init_in_memory().await.expect("Failed to create test database"));
    db.create_catalog_repository()
        .store_subject(&Subject {
            id: "calculo-1".to_string(),
            name: "Cálculo I".to_string(),
            description: None,
            is_scheduled: true,
            is_seeking_teachers: false,
            created_at: "2025-01-01T00:00:00+00:00".to_string(),
        })
        .await
        .expect("Failed to store subject");

    let file_storage = Arc::new(OperatorFileStore::in_memory("http://localhost:3000/files").unwrap());
    let state = AppState::new(
        db,
        file_storage,
        Arc::new(DisabledEmailSender),
        Arc::new(BcryptPasswordHasher::new(4)),
        AuthTokens::new("integration-secret", Duration::hours(1)),
    );
    state
        .admin_service
        .ensure_bootstrap_admin(ADMIN_USERNAME, ADMIN_PASSWORD, "Coordenação")
        .await
        .expect("Failed to create administrator");

    let config = AppConfig {
        jwt_secret: "integration-secret".to_string(),
        ..AppConfig::default()
    };
    create_router(state, &config).expect("Failed to build router")
}

async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn login(app: &Router) -> String {
    login_as(app, ADMIN_USERNAME, ADMIN_PASSWORD).await
}

async fn login_as(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    body["token"].as_str().unwrap().to_string()
}

async fn create_session(app: &Router, token: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/admin/sessions",
        Some(token),
        Some(json!({
            "title": "Aulão de Limites",
            "subject_id": "calculo-1",
            "teacher_id": null,
            "date": "2025-05-10",
            "start_time": "14:00",
            "end_time": "17:00",
            "location": "Sala 101",
            "max_participants": 40,
            "topics": "limites, continuidade",
            "materials_needed": null
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
    body["session"]["id"].as_str().unwrap().to_string()
}

async fn register(app: &Router, session_id: &str, email: &str, pledge: Value, amount: Value) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        &format!("/api/sessions/{}/registrations", session_id),
        None,
        Some(json!({
            "student_name": "Ana Souza",
            "student_email": email,
            "student_phone": null,
            "student_registration_number": "2023001",
            "pledge_type": pledge,
            "pledge_amount": amount,
            "payment_proof_file_name": null
        })),
    )
    .await
}

#[tokio::test]
async fn test_health_check_is_public() {
    let app = setup_test().await;
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let app = setup_test().await;
    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": ADMIN_USERNAME, "password": "errada" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "unauthorized");
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let app = setup_test().await;

    let (status, body) = send(&app, "GET", "/api/admin/finance", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "unauthorized");

    let (status, _) = send(&app, "GET", "/api/admin/registrations", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_session_returns_json_not_found() {
    let app = setup_test().await;
    let (status, body) = send(&app, "GET", "/api/sessions/missing", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
    assert!(body["error"].as_str().unwrap().contains("missing"));
}

#[tokio::test]
async fn test_attendance_records_a_single_donation() {
    let app = setup_test().await;
    let token = login(&app).await;
    let session_id = create_session(&app, &token).await;

    let (status, body) = register(&app, &session_id, "ana@example.com", json!("pagamento_hora"), json!("25")).await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
    let registration_id = body["registration"]["id"].as_str().unwrap().to_string();

    let attendance_uri = format!("/api/admin/registrations/{}/attendance", registration_id);
    let (status, body) = send(&app, "PUT", &attendance_uri, Some(&token), Some(json!({ "attended": true }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ledger"]["status"], "recorded");
    assert!(body["warning"].is_null());
    assert_eq!(body["registration"]["confirmed_presence"], true);

    // Marking again is idempotent on the ledger
    let (status, body) = send(&app, "PUT", &attendance_uri, Some(&token), Some(json!({ "attended": true }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ledger"]["status"], "already_recorded");

    // Un-marking keeps the donation
    let (status, _) = send(&app, "PUT", &attendance_uri, Some(&token), Some(json!({ "attended": false }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/admin/finance", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_money_donations"], 25.0);
    assert_eq!(body["sessions_with_donations"], 1);
    assert_eq!(body["donations_by_session"][0]["session_title"], "Aulão de Limites");

    let (status, body) = send(&app, "GET", "/api/admin/donations", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["donations"].as_array().unwrap().len(), 1);
    assert_eq!(body["donations"][0]["registration_id"], registration_id.as_str());
}

#[tokio::test]
async fn test_session_deletion_keeps_donations_unlinked() {
    let app = setup_test().await;
    let token = login(&app).await;
    let session_id = create_session(&app, &token).await;

    let (_, body) = register(&app, &session_id, "bia@example.com", json!("pagamento_hora"), json!("10.50")).await;
    let registration_id = body["registration"]["id"].as_str().unwrap().to_string();
    send(
        &app,
        "PUT",
        &format!("/api/admin/registrations/{}/attendance", registration_id),
        Some(&token),
        Some(json!({ "attended": true })),
    )
    .await;

    let (status, body) = send(&app, "DELETE", &format!("/api/admin/sessions/{}", session_id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    assert_eq!(body["resumed"], false);

    let (status, _) = send(&app, "GET", &format!("/api/sessions/{}", session_id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, "GET", "/api/admin/donations", Some(&token), None).await;
    assert_eq!(body["donations"].as_array().unwrap().len(), 1);
    assert!(body["donations"][0]["session_id"].is_null());
    assert_eq!(body["donations"][0]["amount"], 10.5);
}

#[tokio::test]
async fn test_registration_listing_counts_and_filters() {
    let app = setup_test().await;
    let token = login(&app).await;
    let session_id = create_session(&app, &token).await;

    register(&app, &session_id, "ana@example.com", json!("alimento"), Value::Null).await;
    register(&app, &session_id, "bia@example.com", json!("pagamento_hora"), json!("15")).await;
    register(&app, &session_id, "caio@example.com", Value::Null, Value::Null).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/admin/registrations?session_id={}&pledge=none", session_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["registrations"].as_array().unwrap().len(), 1);
    assert_eq!(body["counters"]["total"], 3);
    assert_eq!(body["counters"]["food_pledges"], 1);
    assert_eq!(body["counters"]["monetary_pledges"], 1);

    let (status, body) = send(&app, "GET", "/api/admin/registrations?status=bogus", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn test_invalid_pledge_amount_is_rejected() {
    let app = setup_test().await;
    let token = login(&app).await;
    let session_id = create_session(&app, &token).await;

    let (status, body) = register(&app, &session_id, "ana@example.com", json!("pagamento_hora"), json!("abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn test_deleted_administrator_loses_access() {
    let app = setup_test().await;
    let root = login(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/administrators",
        Some(&root),
        Some(json!({
            "username": "bob",
            "full_name": "Bob Lima",
            "email": null,
            "password": "senha-do-bob"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
    let bob_id = body["id"].as_str().unwrap().to_string();

    let bob = login_as(&app, "bob", "senha-do-bob").await;
    let (status, _) = send(&app, "GET", "/api/admin/registrations", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", &format!("/api/admin/administrators/{}", bob_id), Some(&root), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The token is still signed and unexpired, the account behind it is gone
    let (status, body) = send(&app, "GET", "/api/admin/registrations", Some(&bob), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "unauthorized");

    let (status, _) = send(&app, "GET", "/api/admin/registrations", Some(&root), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_fresh_deployment_has_subjects_to_schedule() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        database_url: format!("sqlite://{}", dir.path().join("aulao.db").display()),
        upload_dir: dir.path().join("uploads").to_string_lossy().to_string(),
        jwt_secret: "integration-secret".to_string(),
        bootstrap_admin_username: ADMIN_USERNAME.to_string(),
        bootstrap_admin_password: ADMIN_PASSWORD.to_string(),
        password_hash_cost: 4,
        ..AppConfig::default()
    };

    let state = initialize_backend(&config).await.expect("Failed to initialize backend");
    let app = create_router(state, &config).unwrap();

    let (status, body) = send(&app, "GET", "/api/subjects", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let seeded = body["subjects"].as_array().unwrap().len();
    assert_eq!(seeded, config.subjects.len());

    let token = login(&app).await;
    create_session(&app, &token).await;

    // A restart over the same database does not duplicate the catalog
    let state = initialize_backend(&config).await.expect("Failed to initialize backend twice");
    let app = create_router(state, &config).unwrap();
    let (_, body) = send(&app, "GET", "/api/subjects", None, None).await;
    assert_eq!(body["subjects"].as_array().unwrap().len(), seeded);
}

#[tokio::test]
async fn test_admin_can_add_a_subject() {
    let app = setup_test().await;
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/subjects",
        Some(&token),
        Some(json!({ "id": null, "name": "Equações Diferenciais", "description": null })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
    assert_eq!(body["id"], "equa-es-diferenciais");

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/subjects",
        Some(&token),
        Some(json!({ "id": "calculo-1", "name": "Outro Cálculo", "description": null })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");

    let (_, body) = send(&app, "GET", "/api/subjects", None, None).await;
    assert_eq!(body["subjects"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_public_transparency_report_and_food_total() {
    let app = setup_test().await;
    let token = login(&app).await;
    create_session(&app, &token).await;

    for donation in [
        json!({ "kind": "alimento", "session_id": null, "amount": null, "food_weight_kg": 12.5,
                "description": "arroz e feijão", "institution": "Lar São Vicente", "donation_date": "2025-06-01" }),
        json!({ "kind": "dinheiro", "session_id": null, "amount": 30.0, "food_weight_kg": null,
                "description": null, "institution": "Creche Esperança", "donation_date": "2025-06-02" }),
        json!({ "kind": "alimento", "session_id": null, "amount": null, "food_weight_kg": 2.0,
                "description": null, "institution": null, "donation_date": "2024-03-01" }),
    ] {
        let (status, body) = send(&app, "POST", "/api/admin/donations", Some(&token), Some(donation)).await;
        assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
    }

    let (status, body) = send(&app, "GET", "/api/transparency?year=2025", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["year"], 2025);
    assert_eq!(body["available_years"], json!([2025, 2024]));
    assert_eq!(body["total_money"], 30.0);
    assert_eq!(body["total_food_kg"], 12.5);
    assert_eq!(body["institutions_helped"], 2);
    assert_eq!(body["sessions_held"], 1);
    let donations = body["donations"].as_array().unwrap();
    assert_eq!(donations.len(), 2);
    assert_eq!(donations[0]["institution"], "Creche Esperança");
    assert!(donations[0].get("registration_id").is_none());

    let (status, body) = send(&app, "GET", "/api/statistics", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_food_kg"], 14.5);
}

#[tokio::test]
async fn test_notification_with_no_delivered_email_is_a_gateway_error() {
    let app = setup_test().await;
    let token = login(&app).await;
    let session_id = create_session(&app, &token).await;
    register(&app, &session_id, "ana@example.com", Value::Null, Value::Null).await;

    // Email delivery is disabled in this router
    let (status, body) = send(&app, "POST", &format!("/api/admin/sessions/{}/notify", session_id), Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["kind"], "delivery_failed");
}

#[tokio::test]
async fn test_email_template_can_be_edited() {
    let app = setup_test().await;
    let token = login(&app).await;

    let (status, body) = send(&app, "GET", "/api/admin/email-template", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subject"], "Lembrete: {TITULO_AULAO} - {DATA}");

    let template = json!({ "subject": "Amanhã: {TITULO_AULAO}", "body": "Local: {LOCAL}", "signature": "Equipe" });
    let (status, _) = send(&app, "PUT", "/api/admin/email-template", Some(&token), Some(template.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/admin/email-template", Some(&token), None).await;
    assert_eq!(body, template);
}

#[tokio::test]
async fn test_advance_payment_details_are_listed() {
    let app = setup_test().await;
    let token = login(&app).await;
    let session_id = create_session(&app, &token).await;

    let (_, body) = register(&app, &session_id, "ana@example.com", json!("pagamento_antecipado"), json!("20")).await;
    let registration_id = body["registration"]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/admin/registrations/{}/payment-details", registration_id);
    let (status, _) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let details = body["payment_details"].as_array().unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0]["amount"], 20.0);
    assert_eq!(details[0]["status"], "pending");

    let (status, _) = send(&app, "GET", "/api/admin/registrations/missing/payment-details", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_sign_up_logs_ids_but_no_student_data() {
    let app = setup_test().await;
    let token = login(&app).await;
    let session_id = create_session(&app, &token).await;

    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    let (status, body) = register(&app, &session_id, "ana.souza@example.com", json!("pagamento_hora"), json!("15")).await;
    drop(guard);

    assert_eq!(status, StatusCode::CREATED);
    let registration_id = body["registration"]["id"].as_str().unwrap();
    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains(&session_id));
    assert!(output.contains(registration_id));
    assert!(!output.contains("ana.souza@example.com"));
    assert!(!output.contains("Ana Souza"));
    assert!(!output.contains("2023001"));
}
