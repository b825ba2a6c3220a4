use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use mealmate::api::{create_api, AppState};
use mealmate::food::config::FoodConfig;
use mealmate::{Accounts, Database, RecipeFinder};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn app(server: &MockServer, with_accounts: bool) -> Result<Router> {
    let finder = RecipeFinder::from_config(&FoodConfig::new("test-key").with_base_url(server.uri()))?;
    let accounts = if with_accounts {
        Some(Accounts::from_database(
            Database::open_in_memory().await?.with_password_cost(4),
        ))
    } else {
        None
    };
    Ok(create_api(AppState::new(finder, accounts)))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
    send_as(app, None, method, uri, body).await
}

async fn send_as(
    app: &Router,
    token: Option<&str>,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = builder.body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })?;

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

#[tokio::test]
async fn test_health() -> Result<()> {
    let server = MockServer::start().await;
    let app = app(&server, false).await?;

    let (status, body) = send(&app, "GET", "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Server is running and healthy");
    Ok(())
}

#[tokio::test]
async fn test_search_returns_views_and_notices() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recipes/findByIngredients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "title": "Egg Fried Rice", "image": "a.jpg"},
            {"id": 2, "title": "Rice Pudding", "image": "b.jpg"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/recipes/1/information"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "title": "Egg Fried Rice",
            "instructions": "Scramble.\nFry."
        })))
        .mount(&server)
        .await;

    let app = app(&server, false).await?;
    let (status, body) = send(
        &app,
        "POST",
        "/recipes/search",
        Some(json!({"ingredients": "egg, rice", "diet": "vegan"})),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    let recipes = body["recipes"].as_array().unwrap();
    assert_eq!(recipes.len(), 1);
    assert_eq!(recipes[0]["share_link"], "https://www.spoonacular.com/recipes/1/Egg-Fried-Rice");
    assert_eq!(recipes[0]["instructions_html"], "Scramble.<br>Fry.");
    assert_eq!(body["notices"][0]["level"], "error");
    Ok(())
}

#[tokio::test]
async fn test_search_rejects_unknown_diet() -> Result<()> {
    let server = MockServer::start().await;
    let app = app(&server, false).await?;

    let (status, _) = send(
        &app,
        "POST",
        "/recipes/search",
        Some(json!({"ingredients": "egg", "diet": "carnivore"})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_accounts_unavailable() -> Result<()> {
    let server = MockServer::start().await;
    let app = app(&server, false).await?;

    let (status, _) = send(&app, "GET", "/favorites/some-uid", None).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}

#[tokio::test]
async fn test_signup_login_and_favorites() -> Result<()> {
    let server = MockServer::start().await;
    let app = app(&server, true).await?;
    let credentials = json!({"email": "cook@example.com", "password": "secret123"});

    let (status, body) = send(&app, "POST", "/auth/signup", Some(credentials.clone())).await?;
    assert_eq!(status, StatusCode::CREATED);
    let uid = body["user"]["uid"].as_str().unwrap().to_string();
    assert!(body["token"].as_str().is_some());

    let (status, _) = send(&app, "POST", "/auth/signup", Some(credentials.clone())).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "POST", "/auth/login", Some(credentials)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["uid"], uid.as_str());
    let token = body["token"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        "/auth/login",
        Some(json!({"email": "cook@example.com", "password": "wrong-one"})),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let favorites_uri = format!("/favorites/{}", uid);
    let (status, body) = send_as(&app, Some(&token), "GET", &favorites_uri, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["favorites"], json!([]));

    let recipe = json!({
        "id": 5,
        "title": "Bean Chili",
        "image": null,
        "ready_in_minutes": 50,
        "servings": 6,
        "ingredients": ["2 cans beans"],
        "instructions": null,
        "nutrition": null
    });
    let (status, body) = send_as(&app, Some(&token), "POST", &favorites_uri, Some(json!({"recipe": recipe}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["added"], true);

    let (_, body) = send_as(&app, Some(&token), "GET", &favorites_uri, None).await?;
    assert_eq!(body["favorites"][0]["title"], "Bean Chili");
    Ok(())
}

fn sample_recipe(title: &str) -> Value {
    json!({
        "recipe": {
            "id": 9,
            "title": title,
            "image": null,
            "ready_in_minutes": null,
            "servings": null,
            "ingredients": [],
            "instructions": null,
            "nutrition": null
        }
    })
}

async fn signup(app: &Router, email: &str) -> Result<(String, String)> {
    let (status, body) = send(
        app,
        "POST",
        "/auth/signup",
        Some(json!({"email": email, "password": "secret123"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok((
        body["user"]["uid"].as_str().unwrap().to_string(),
        body["token"].as_str().unwrap().to_string(),
    ))
}

#[tokio::test]
async fn test_favorites_require_a_token() -> Result<()> {
    let server = MockServer::start().await;
    let app = app(&server, true).await?;

    let (status, _) = send(&app, "POST", "/favorites/not-a-real-user", Some(sample_recipe("Injected"))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/favorites/not-a-real-user", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_as(&app, Some("made-up-token"), "GET", "/favorites/not-a-real-user", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_favorites_reject_other_users() -> Result<()> {
    let server = MockServer::start().await;
    let app = app(&server, true).await?;
    let (alice_uid, alice_token) = signup(&app, "alice@example.com").await?;
    let (bob_uid, bob_token) = signup(&app, "bob@example.com").await?;

    let alice_uri = format!("/favorites/{}", alice_uid);
    let (status, _) = send_as(&app, Some(&bob_token), "POST", &alice_uri, Some(sample_recipe("Injected"))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send_as(&app, Some(&bob_token), "GET", &alice_uri, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = send_as(&app, Some(&alice_token), "GET", &alice_uri, None).await?;
    assert_eq!(body["favorites"], json!([]));

    let bob_uri = format!("/favorites/{}", bob_uid);
    let (status, _) = send_as(&app, Some(&bob_token), "POST", &bob_uri, Some(sample_recipe("Toast"))).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}
