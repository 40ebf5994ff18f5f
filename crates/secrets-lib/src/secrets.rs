// ============================
// crates/secrets-lib/src/secrets.rs
// ============================
//! Secret viewing and submission over the user store.
use crate::error::AppError;
use crate::store::UserStore;
use crate::validation;
use secrets_common::SecretEntry;
use tracing::info;
use uuid::Uuid;

/// The public read path: every stored secret, without authorship.
pub async fn list_secrets<S: UserStore>(store: &S) -> Result<Vec<SecretEntry>, AppError> {
    let records = store.find_with_secrets().await?;
    Ok(records
        .into_iter()
        .filter_map(|record| record.secret)
        .map(|secret| SecretEntry { secret })
        .collect())
}

/// Overwrite the caller's secret. A record holds at most one secret.
pub async fn submit_secret<S: UserStore>(
    store: &S,
    user_id: Uuid,
    secret: &str,
) -> Result<(), AppError> {
    validation::validate_secret(secret)?;

    let Some(mut record) = store.find_by_id(user_id).await? else {
        return Err(AppError::NotFound(format!("user {user_id}")));
    };

    record.secret = Some(secret.to_string());
    record.touch();
    store.update(&record).await?;

    info!(%user_id, "secret updated");
    Ok(())
}
