//! End-to-end authentication flows: register, login, logout, and the
//! session gate in front of the protected routes.

use crate::test_utils::{
    body_json, first_cookie, form_post, form_post_with_cookie, get, get_with_cookie, location,
    setup_test_env,
};
use axum::http::StatusCode;
use tower::ServiceExt;

#[tokio::test]
async fn test_register_login_submit_flow() {
    let (app, _state, _temp_dir) = setup_test_env().await;

    // Register: redirected to the secrets page with a fresh session
    let response = app
        .clone()
        .oneshot(form_post(
            "/register",
            "username=alice%40example.com&password=password123",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/secrets"));
    let cookie = first_cookie(&response).expect("registration should set a session cookie");

    // Auto-login: the protected submit view works immediately
    let response = app
        .clone()
        .oneshot(get_with_cookie("/submit", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let principal = body_json(response).await;
    assert_eq!(principal["username"], "alice@example.com");

    // Submit a secret
    let response = app
        .clone()
        .oneshot(form_post_with_cookie("/submit", "secret=my-secret", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/secrets"));

    // The listing is public and now contains the secret
    let response = app.clone().oneshot(get("/secrets")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["secrets"][0]["secret"], "my-secret");
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let (app, _state, temp_dir) = setup_test_env().await;

    let response = app
        .clone()
        .oneshot(form_post(
            "/register",
            "username=alice%40example.com&password=password123",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app
        .clone()
        .oneshot(form_post(
            "/register",
            "username=alice%40example.com&password=otherpassword",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "AUTH_002");

    // Exactly one record exists for the username
    let user_files = std::fs::read_dir(temp_dir.path().join("users"))
        .unwrap()
        .count();
    assert_eq!(user_files, 1);

    // And its original password still logs in
    let response = app
        .clone()
        .oneshot(form_post(
            "/login",
            "username=alice%40example.com&password=password123",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_registration_enforces_minimum_password_length() {
    let (app, _state, _temp_dir) = setup_test_env().await;

    let response = app
        .clone()
        .oneshot(form_post(
            "/register",
            "username=alice%40example.com&password=short",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VAL_001");
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user_are_indistinguishable() {
    let (app, _state, _temp_dir) = setup_test_env().await;

    app.clone()
        .oneshot(form_post(
            "/register",
            "username=alice%40example.com&password=password123",
        ))
        .await
        .unwrap();

    let wrong_password = app
        .clone()
        .oneshot(form_post(
            "/login",
            "username=alice%40example.com&password=wrongpass",
        ))
        .await
        .unwrap();
    let unknown_user = app
        .clone()
        .oneshot(form_post(
            "/login",
            "username=bob%40example.com&password=wrongpass",
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    let first = body_json(wrong_password).await;
    let second = body_json(unknown_user).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_failed_login_leaves_the_session_unauthenticated() {
    let (app, _state, _temp_dir) = setup_test_env().await;

    app.clone()
        .oneshot(form_post(
            "/register",
            "username=alice%40example.com&password=password123",
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(form_post(
            "/login",
            "username=alice%40example.com&password=wrongpass",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(first_cookie(&response).is_none());
}

#[tokio::test]
async fn test_logout_terminates_the_session_but_keeps_the_record() {
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
        .oneshot(form_post_with_cookie("/logout", "", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));

    // The old token no longer passes the gate
    let response = app
        .clone()
        .oneshot(get_with_cookie("/submit", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));

    // The record survives: logging in again works
    let response = app
        .clone()
        .oneshot(form_post(
            "/login",
            "username=alice%40example.com&password=password123",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_protected_routes_redirect_without_a_session() {
    let (app, _state, _temp_dir) = setup_test_env().await;

    let response = app.clone().oneshot(get("/submit")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));

    let response = app
        .clone()
        .oneshot(form_post("/submit", "secret=sneaky"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));

    // A forged token is just as unauthenticated as none
    let response = app
        .clone()
        .oneshot(get_with_cookie("/submit", "secrets_session=forged-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
}
