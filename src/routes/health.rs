use actix_web::{get, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

/// Root health check endpoint
///
/// Reports that the API is running, with the current timestamp.
#[get("/")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "API is running",
        "status": "OK",
        "timestamp": Utc::now()
    }))
}

/// Fallback for every request no route matched.
pub async fn not_found(req: HttpRequest) -> impl Responder {
    HttpResponse::NotFound().json(json!({
        "error": "Route not found",
        "path": req.path()
    }))
}
