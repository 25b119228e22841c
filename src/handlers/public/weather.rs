use axum::extract::{Path, State};
use axum::Json;

use crate::services::weather::WeatherData;
use crate::state::AppState;

/// GET /api/weather/:location - live conditions, or the fallback payload
pub async fn weather_get(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> Json<WeatherData> {
    Json(state.weather.get(&location).await)
}
