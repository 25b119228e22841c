mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let app = common::TestApp::spawn().await?;

    let res = app.client.get(app.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn root_describes_the_service() -> Result<()> {
    let app = common::TestApp::spawn().await?;

    let body = app.client.get(app.url("/")).send().await?.json::<Value>().await?;
    assert_eq!(body["name"], "AgroBagual API");
    assert!(body["endpoints"]["animals"].is_string());
    Ok(())
}
