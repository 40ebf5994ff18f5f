// ============================
// crates/secrets-lib/src/auth/federated.rs
// ============================
//! Federated sign-in: the Google OAuth client and the resolver that turns
//! an asserted subject identifier into a local user record.
use crate::config::GoogleSettings;
use crate::error::AppError;
use crate::store::{UserRecord, UserStore};
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::Deserialize;
use tracing::info;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Profile claims from the Google userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    /// Stable subject identifier; the key for resolve-or-create
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// OAuth client type with auth URL and token URL set.
type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Google authorization-code client (with PKCE).
pub struct GoogleOAuth {
    client_id: ClientId,
    client_secret: ClientSecret,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    redirect_url: RedirectUrl,
}

impl GoogleOAuth {
    pub fn from_settings(settings: &GoogleSettings) -> Result<Self, AppError> {
        Ok(Self {
            client_id: ClientId::new(settings.client_id.clone()),
            client_secret: ClientSecret::new(settings.client_secret.clone()),
            auth_url: AuthUrl::new(GOOGLE_AUTH_URL.to_string())
                .map_err(|e| AppError::Federated(e.to_string()))?,
            token_url: TokenUrl::new(GOOGLE_TOKEN_URL.to_string())
                .map_err(|e| AppError::Federated(e.to_string()))?,
            redirect_url: RedirectUrl::new(settings.redirect_url.clone())
                .map_err(|e| AppError::Federated(e.to_string()))?,
        })
    }

    fn create_client(&self) -> ConfiguredClient {
        BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_auth_uri(self.auth_url.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone())
    }

    /// Build the provider authorization URL.
    ///
    /// Returns the URL together with the CSRF state and PKCE verifier the
    /// callback must present again.
    pub fn begin(&self) -> (String, String, String) {
        let client = self.create_client();
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (auth_url, csrf_state) = client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .set_pkce_challenge(pkce_challenge)
            .url();

        (
            auth_url.to_string(),
            csrf_state.secret().clone(),
            pkce_verifier.secret().clone(),
        )
    }

    /// Exchange the callback code for the asserted profile.
    pub async fn exchange(
        &self,
        code: &str,
        pkce_verifier: String,
    ) -> Result<GoogleProfile, AppError> {
        // The token exchange client must not follow redirects
        let http_client = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AppError::Federated(e.to_string()))?;

        let token = self
            .create_client()
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
            .request_async(&http_client)
            .await
            .map_err(|e| AppError::Federated(format!("token exchange failed: {e}")))?;

        let profile: GoogleProfile = reqwest::Client::new()
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(token.access_token().secret())
            .send()
            .await
            .map_err(|e| AppError::Federated(format!("userinfo request failed: {e}")))?
            .json()
            .await
            .map_err(|e| AppError::Federated(format!("userinfo response malformed: {e}")))?;

        Ok(profile)
    }
}

/// Find-or-create over the user store, keyed on the asserted subject id.
pub struct FederatedResolver<S> {
    store: S,
}

impl<S: UserStore> FederatedResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Resolve an asserted identity to a local record, creating one on
    /// first sign-in.
    ///
    /// Best-effort existence check; concurrent first sign-ins of the same
    /// subject can race, like registration. Returning users get their
    /// profile fields refreshed from the latest assertion.
    pub async fn resolve_or_create(
        &self,
        profile: &GoogleProfile,
    ) -> Result<UserRecord, AppError> {
        if let Some(mut record) = self.store.find_by_google_id(&profile.sub).await? {
            let mut changed = false;
            if profile.name.is_some() && record.display_name != profile.name {
                record.display_name = profile.name.clone();
                changed = true;
            }
            if profile.picture.is_some() && record.picture != profile.picture {
                record.picture = profile.picture.clone();
                changed = true;
            }
            if record.username.is_none() && profile.email.is_some() {
                record.username = profile.email.clone();
                changed = true;
            }
            if changed {
                record.touch();
                self.store.update(&record).await?;
            }
            return Ok(record);
        }

        let record = UserRecord::new_federated(
            &profile.sub,
            profile.email.clone(),
            profile.name.clone(),
            profile.picture.clone(),
        );
        info!(user_id = %record.id, "created user from federated profile");
        self.store.insert(record).await
    }
}
