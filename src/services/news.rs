use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub image_url: String,
    pub published_at: DateTime<Utc>,
    pub category: String,
}

/// Static agricultural headlines, timestamped relative to `now`
pub fn latest(now: DateTime<Utc>) -> Vec<NewsItem> {
    let item = |id: &str, title: &str, summary: &str, image: &str, age: Duration, category: &str| {
        NewsItem {
            id: id.to_string(),
            title: title.to_string(),
            summary: summary.to_string(),
            image_url: format!(
                "https://images.unsplash.com/{}?ixlib=rb-4.0.3&auto=format&fit=crop&w=300&h=200",
                image
            ),
            published_at: now - age,
            category: category.to_string(),
        }
    };

    vec![
        item(
            "1",
            "Nova tecnologia aumenta produtividade em 30%",
            "Equipamentos de última geração chegam ao mercado brasileiro",
            "photo-1625246333195-78d9c38ad449",
            Duration::zero(),
            "tecnologia",
        ),
        item(
            "2",
            "Preços do boi gordo sobem 8% na semana",
            "Mercado aquecido impulsiona valores na praça de São Paulo",
            "photo-1560114928-40f1f1eb26a0",
            Duration::hours(2),
            "mercado",
        ),
        item(
            "3",
            "Safra de trigo bate recorde histórico",
            "Condições climáticas favoráveis resultam em colheita excepcional",
            "photo-1574323347407-f5e1ad6d020b",
            Duration::days(1),
            "agricultura",
        ),
    ]
}
