// crates/secrets-lib/src/middleware/auth.rs

//! Session gate for protected routes.
use crate::auth::SESSION_COOKIE;
use crate::store::UserStore;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

/// Resolve the session cookie into a `Principal` request extension.
///
/// Requests without a resolvable session are redirected to `/login`; the
/// handler behind this layer can rely on the extension being present.
pub async fn require_auth<S: UserStore + Clone + Send + Sync + 'static>(
    State(state): State<Arc<AppState<S>>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Redirect::to("/login").into_response();
    };

    match state.auth.resolve_session(cookie.value()).await {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        },
        Err(_) => Redirect::to("/login").into_response(),
    }
}
