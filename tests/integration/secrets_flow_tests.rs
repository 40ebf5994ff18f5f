//! Secrets listing/submission behavior and the federated route edges that
//! need no provider round-trip.

use crate::test_utils::{
    body_json, first_cookie, form_post, form_post_with_cookie, get, location, setup_test_env,
};
use axum::http::StatusCode;
use tower::ServiceExt;

#[tokio::test]
async fn test_secrets_listing_is_public_and_initially_empty() {
    let (app, _state, _temp_dir) = setup_test_env().await;

    let response = app.clone().oneshot(get("/secrets")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["secrets"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_submitting_twice_overwrites_the_secret() {
    let (app, _state, _temp_dir) = setup_test_env().await;

    let response = app
        .clone()
        .oneshot(form_post(
            "/register",
            "username=alice%40example.com&password=password123",
        ))
        .await
        .unwrap();
    let cookie = first_cookie(&response).unwrap();

    for secret in ["first", "second"] {
        let body = format!("secret={secret}");
        let response = app
            .clone()
            .oneshot(form_post_with_cookie("/submit", &body, &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    let body = body_json(app.clone().oneshot(get("/secrets")).await.unwrap()).await;
    let parsed: secrets_common::SecretsResponse = serde_json::from_value(body).unwrap();
    assert_eq!(parsed.secrets.len(), 1);
    assert_eq!(parsed.secrets[0].secret, "second");
}

#[tokio::test]
async fn test_empty_secret_is_rejected() {
    let (app, _state, _temp_dir) = setup_test_env().await;

    let response = app
        .clone()
        .oneshot(form_post(
            "/register",
            "username=alice%40example.com&password=password123",
        ))
        .await
        .unwrap();
    let cookie = first_cookie(&response).unwrap();

    let response = app
        .clone()
        .oneshot(form_post_with_cookie("/submit", "secret=", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(app.clone().oneshot(get("/secrets")).await.unwrap()).await;
    assert_eq!(body["secrets"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_home_lists_the_route_surface() {
    let (app, _state, _temp_dir) = setup_test_env().await;

    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["service"], "secrets");
}

#[tokio::test]
async fn test_federated_routes_without_a_configured_client() {
    let (app, _state, _temp_dir) = setup_test_env().await;

    // No Google client configured: starting the flow is an error response
    let response = app.clone().oneshot(get("/auth/google")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    // ...but a stray callback still lands on the login page, like any
    // other failed federated sign-in
    let response = app
        .clone()
        .oneshot(get("/auth/google/callback?code=x&state=y"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_callback_without_state_cookie_is_rejected() {
    let (app, _state, _temp_dir) = setup_test_env().await;

    // Even with callback params present, a missing state cookie means the
    // flow was never started here; the user ends up back at login
    let response = app
        .clone()
        .oneshot(get("/auth/google/callback?code=abc&state=def"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
}
