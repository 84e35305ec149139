#![allow(dead_code)]

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};

use taskboard::auth::{PasswordHasher, MIN_COST};
use taskboard::routes::{self, health};
use taskboard::store::MemoryStore;
use taskboard::AppState;

/// Shared state backed by a fresh in-memory store. bcrypt runs at its minimum cost so
/// the suite stays fast.
pub fn memory_state() -> (web::Data<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = web::Data::new(AppState::new(
        store.clone(),
        PasswordHasher::new(MIN_COST),
    ));
    (state, store)
}

/// Builds the same application `main` serves, minus the database.
pub async fn init_app(
    state: web::Data<AppState>,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .app_data(state)
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(health::health)
            .service(web::scope("/api").configure(routes::config))
            .default_service(web::route().to(health::not_found)),
    )
    .await
}

/// Sends `req` and returns the status with the body parsed as JSON (`Value::Null` when empty).
pub async fn send(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    req: actix_http::Request,
) -> (StatusCode, Value) {
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            panic!(
                "Response body was not JSON: {}. Body: {}",
                e,
                String::from_utf8_lossy(&bytes)
            )
        })
    };
    (status, body)
}

pub async fn create_user(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
) -> Value {
    let req = test::TestRequest::post()
        .uri("/api/user")
        .set_json(json!({
            "email": email,
            "name": "Test User",
            "password": "secret1"
        }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "Failed to create user. Body: {}", body);
    body
}

pub async fn create_task(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    user_id: &str,
    title: &str,
) -> Value {
    let req = test::TestRequest::post()
        .uri("/api/task")
        .set_json(json!({
            "title": title,
            "description": "Initial description",
            "userId": user_id
        }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "Failed to create task. Body: {}", body);
    body
}
