mod common;

use axum::http::{StatusCode, header};
use common::{TestSetup, body_json, get, get_with_token, setup};

fn location(response: &axum::http::Response<axum::body::Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

#[tokio::test]
async fn test_dashboard_without_cookie_redirects_to_login() {
    let app = setup().await;

    for path in ["/dashboard", "/dashboard/anything", "/dashboard/reports/q3"] {
        let response = app.send(get(path)).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{path}");
        assert_eq!(location(&response), "/login");
    }
}

#[tokio::test]
async fn test_login_with_cookie_redirects_to_dashboard() {
    let app = setup().await;

    // Presence is enough; the value is not verified at the gate
    let response = app.send(get_with_token("/login", "stale-or-forged")).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn test_pages_pass_through() {
    let app = setup().await;

    let response = app.send(get("/login")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .send(get_with_token("/dashboard/anything", "any-value"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("data-page=\"dashboard\""));
}

#[tokio::test]
async fn test_empty_cookie_counts_as_absent() {
    let app = setup().await;

    let response = app.send(get_with_token("/dashboard", "")).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login");

    let response = app.send(get_with_token("/login", "")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_api_is_not_redirected() {
    let app = setup().await;

    let response = app.send(get("/api/dashboard")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Not authenticated");

    let response = app.send(get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_root_redirects_to_dashboard() {
    let app = setup().await;

    let response = app.send(get("/")).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn test_base_path() {
    let app = TestSetup::new().with_base("/fin").build().await;

    let response = app.send(get("/fin/dashboard/anything")).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/fin/login");

    let response = app.send(get_with_token("/fin/login", "x")).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/fin/dashboard");

    let response = app.send(get("/fin/login")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.send(get("/fin/api/auth/me")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Outside the base path nothing is served
    let response = app.send(get("/dashboard")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
