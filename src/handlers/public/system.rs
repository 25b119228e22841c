use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service info
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "AgroBagual API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Farm management backend: livestock, reminders, notes, market, GPS routes and the SemeIA assistant",
        "endpoints": {
            "health": "/health (public)",
            "weather": "/api/weather/:location (public)",
            "news": "/api/news (public)",
            "market": "/api/market/listings (public GET, protected writes)",
            "auth": "/api/auth/user (protected)",
            "animals": "/api/animals[/:id[/vaccinations]] (protected)",
            "vaccinations": "/api/vaccinations[/:id] (protected)",
            "reminders": "/api/reminders[/today|/:id] (protected)",
            "notes": "/api/notes[/:id] (protected)",
            "gps": "/api/gps/routes[/:id] (protected)",
            "semeia": "/api/semeia/chat, /api/semeia/analyze-image (protected)",
        }
    }))
}

/// GET /health - liveness plus a store ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
