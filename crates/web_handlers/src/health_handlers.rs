use actix_web::{HttpResponse, Result};

/// Liveness check for load balancers and uptime monitors
pub async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "service": "campgrounds",
        "status": "healthy",
        "timestamp": chrono::Utc::now()
    })))
}
