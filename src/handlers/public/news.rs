use axum::Json;
use chrono::Utc;

use crate::services::news::{self, NewsItem};

/// GET /api/news - static agricultural headlines
pub async fn news_list() -> Json<Vec<NewsItem>> {
    Json(news::latest(Utc::now()))
}
