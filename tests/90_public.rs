mod common;

use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde_json::Value;

// No provider key configured, so the canned payload comes back for any city.
#[tokio::test]
async fn weather_falls_back_without_provider() -> Result<()> {
    let app = common::TestApp::spawn().await?;

    let res = app.client.get(app.url("/api/weather/Santa%20Maria")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["location"], "Santa Maria");
    assert_eq!(body["current"]["temperature"], 24);
    assert_eq!(body["current"]["windSpeed"], 15);
    assert_eq!(body["forecast"].as_array().map(Vec::len), Some(3));
    Ok(())
}

#[tokio::test]
async fn news_lists_three_recent_items() -> Result<()> {
    let app = common::TestApp::spawn().await?;

    let before = Utc::now();
    let items = app
        .client
        .get(app.url("/api/news"))
        .send()
        .await?
        .json::<Vec<Value>>()
        .await?;
    assert_eq!(items.len(), 3);

    let newest: DateTime<Utc> = items[0]["publishedAt"].as_str().unwrap_or_default().parse()?;
    let oldest: DateTime<Utc> = items[2]["publishedAt"].as_str().unwrap_or_default().parse()?;
    assert!(newest >= before);
    assert!(oldest < newest);
    assert!(items.iter().all(|i| i["imageUrl"].as_str().is_some()));
    Ok(())
}
