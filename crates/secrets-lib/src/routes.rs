// ============================
// crates/secrets-lib/src/routes.rs
// ============================
//! HTTP router and handlers.
use crate::auth::{Principal, SESSION_COOKIE};
use crate::error::AppError;
use crate::middleware::require_auth;
use crate::secrets;
use crate::store::UserStore;
use crate::AppState;
use axum::{
    extract::{Query, State},
    middleware,
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Extension, Form, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use secrets_common::{
    LoginRequest, PrincipalInfo, RegisterRequest, SecretsResponse, SubmitSecretRequest,
};
use serde::Deserialize;
use std::sync::Arc;
use time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const STATE_COOKIE: &str = "__secrets_oauth_state";
const PKCE_COOKIE: &str = "__secrets_oauth_pkce";
/// OAuth helper cookies are scoped to the auth routes only
const AUTH_COOKIE_PATH: &str = "/auth";
const OAUTH_COOKIE_TTL: Duration = Duration::minutes(10);

/// Create the application router
pub fn create_router<S: UserStore + Clone + Send + Sync + 'static>(
    state: Arc<AppState<S>>,
) -> Router {
    let protected = Router::new()
        .route("/submit", get(submit_view).post(submit_secret::<S>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth::<S>,
        ));

    Router::new()
        .route("/", get(home))
        .route("/register", post(register::<S>))
        .route("/login", post(login::<S>))
        .route("/logout", post(logout::<S>))
        .route("/secrets", get(list_secrets::<S>))
        .route("/auth/google", get(google_redirect::<S>))
        .route("/auth/google/callback", get(google_callback::<S>))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn session_cookie(token: String, ttl_secs: u64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(ttl_secs as i64))
        .build()
}

fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

fn oauth_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path(AUTH_COOKIE_PATH)
        .max_age(OAUTH_COOKIE_TTL)
        .build()
}

fn clear_oauth_cookies(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build((STATE_COOKIE, "")).path(AUTH_COOKIE_PATH).build())
        .remove(Cookie::build((PKCE_COOKIE, "")).path(AUTH_COOKIE_PATH).build())
}

async fn home() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "secrets",
        "routes": ["/register", "/login", "/logout", "/secrets", "/submit", "/auth/google"],
    }))
}

async fn register<S: UserStore + Clone + Send + Sync + 'static>(
    State(state): State<Arc<AppState<S>>>,
    jar: CookieJar,
    Form(form): Form<RegisterRequest>,
) -> Result<(CookieJar, Redirect), AppError> {
    let token = state.auth.register(&form.username, form.password).await?;
    let jar = jar.add(session_cookie(token, state.settings.session_ttl_secs));
    Ok((jar, Redirect::to("/secrets")))
}

async fn login<S: UserStore + Clone + Send + Sync + 'static>(
    State(state): State<Arc<AppState<S>>>,
    jar: CookieJar,
    Form(form): Form<LoginRequest>,
) -> Result<(CookieJar, Redirect), AppError> {
    let token = state.auth.login(&form.username, &form.password).await?;
    let jar = jar.add(session_cookie(token, state.settings.session_ttl_secs));
    Ok((jar, Redirect::to("/secrets")))
}

async fn logout<S: UserStore + Clone + Send + Sync + 'static>(
    State(state): State<Arc<AppState<S>>>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let token = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    if let Some(token) = token {
        // Logout never blocks on the outcome; an unknown session is logged
        // inside and the user-visible effect is the same.
        state.auth.logout(&token).await;
    }
    let jar = jar.remove(clear_session_cookie());
    (jar, Redirect::to("/"))
}

/// Public listing: no session required, only secret-bearing records appear.
async fn list_secrets<S: UserStore + Clone + Send + Sync + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<SecretsResponse>, AppError> {
    let entries = secrets::list_secrets(&state.store).await?;
    Ok(Json(SecretsResponse { secrets: entries }))
}

async fn submit_view(Extension(principal): Extension<Principal>) -> Json<PrincipalInfo> {
    Json(principal.to_info())
}

async fn submit_secret<S: UserStore + Clone + Send + Sync + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(principal): Extension<Principal>,
    Form(form): Form<SubmitSecretRequest>,
) -> Result<Redirect, AppError> {
    secrets::submit_secret(&state.store, principal.id, &form.secret).await?;
    Ok(Redirect::to("/secrets"))
}

async fn google_redirect<S: UserStore + Clone + Send + Sync + 'static>(
    State(state): State<Arc<AppState<S>>>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    let Some(google) = state.google.as_ref() else {
        return Err(AppError::Federated(
            "federated sign-in is not configured".to_string(),
        ));
    };

    let (auth_url, csrf_state, pkce_verifier) = google.begin();
    let jar = jar
        .add(oauth_cookie(STATE_COOKIE, csrf_state))
        .add(oauth_cookie(PKCE_COOKIE, pkce_verifier));
    Ok((jar, Redirect::to(&auth_url)))
}

#[derive(Debug, Deserialize)]
struct GoogleCallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

async fn google_callback<S: UserStore + Clone + Send + Sync + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<GoogleCallbackParams>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let expected_state = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    let pkce_verifier = jar.get(PKCE_COOKIE).map(|c| c.value().to_string());
    let jar = clear_oauth_cookies(jar);

    match authenticate_callback(&state, params, expected_state, pkce_verifier).await {
        Ok(token) => {
            info!("successful federated authentication");
            let jar = jar.add(session_cookie(token, state.settings.session_ttl_secs));
            (jar, Redirect::to("/secrets"))
        },
        Err(err) => {
            // A failed provider callback lands back on the login page
            warn!(error = %err, "federated sign-in failed");
            (jar, Redirect::to("/login"))
        },
    }
}

async fn authenticate_callback<S: UserStore + Clone + Send + Sync + 'static>(
    state: &AppState<S>,
    params: GoogleCallbackParams,
    expected_state: Option<String>,
    pkce_verifier: Option<String>,
) -> Result<String, AppError> {
    let google = state.google.as_ref().ok_or_else(|| {
        AppError::Federated("federated sign-in is not configured".to_string())
    })?;

    if let Some(error) = params.error {
        return Err(AppError::Federated(format!(
            "provider returned error: {error}"
        )));
    }

    let code = params
        .code
        .ok_or_else(|| AppError::Federated("missing authorization code".to_string()))?;
    let returned_state = params
        .state
        .ok_or_else(|| AppError::Federated("missing state parameter".to_string()))?;
    let expected_state = expected_state
        .ok_or_else(|| AppError::Federated("missing state cookie".to_string()))?;
    if returned_state != expected_state {
        return Err(AppError::Federated("state mismatch".to_string()));
    }
    let pkce_verifier = pkce_verifier
        .ok_or_else(|| AppError::Federated("missing PKCE verifier cookie".to_string()))?;

    let profile = google.exchange(&code, pkce_verifier).await?;
    state.auth.login_federated(profile).await
}
