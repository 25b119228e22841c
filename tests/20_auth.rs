mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use agrobagual_api::auth::{generate_jwt, Claims};
use agrobagual_api::database::Store;
use uuid::Uuid;

#[tokio::test]
async fn protected_routes_require_a_token() -> Result<()> {
    let app = common::TestApp::spawn().await?;

    let paths = [
        "/api/animals",
        "/api/reminders",
        "/api/reminders/today",
        "/api/notes",
        "/api/gps/routes",
    ];
    for path in paths {
        let res = app.client.get(app.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "GET {}", path);
        let body = res.json::<Value>().await?;
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
    Ok(())
}

// Rejected before the handler runs, so nothing is written.
#[tokio::test]
async fn anonymous_create_touches_no_storage() -> Result<()> {
    let app = common::TestApp::spawn().await?;
    let token = app.login("joao@fazenda.com").await?;

    let res = app
        .client
        .post(app.url("/api/notes"))
        .json(&json!({ "title": "Ordenha" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let notes = app.get("/api/notes", &token).send().await?.json::<Vec<Value>>().await?;
    assert!(notes.is_empty());
    Ok(())
}

#[tokio::test]
async fn tampered_or_foreign_tokens_are_rejected() -> Result<()> {
    let app = common::TestApp::spawn().await?;

    let res = app.get("/api/animals", "not-a-jwt").send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let foreign = generate_jwt(&Claims::new(Uuid::new_v4(), None, 1), "some-other-secret")?;
    let res = app.get("/api/animals", &foreign).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn current_user_profile() -> Result<()> {
    let app = common::TestApp::spawn().await?;
    let token = app.login("maria@fazenda.com").await?;

    let res = app.get("/api/auth/user", &token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["email"], "maria@fazenda.com");
    assert_eq!(body["firstName"], "Produtor");
    Ok(())
}

#[tokio::test]
async fn valid_token_for_unknown_user_is_unauthorized() -> Result<()> {
    let app = common::TestApp::spawn().await?;
    let ghost = Uuid::new_v4();
    let token = generate_jwt(&Claims::new(ghost, None, 1), common::TEST_SECRET)?;

    let res = app.get("/api/auth/user", &token).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(app.store.get_user(ghost).await?.is_none());
    Ok(())
}
