//! Account status checks

use chrono::Utc;
use notevault_db::User;

use crate::error::AuthError;

/// Check the account status flags and expiry dates
///
/// Shared by the login path and the authentication gate: an account that
/// fails any of these never authenticates, correct password or valid token
/// notwithstanding. Each failure maps to its own error kind so login can
/// report an accurate reason; the gate discards the kind and falls back to
/// anonymous.
pub fn check_account_status(user: &User) -> Result<(), AuthError> {
    let today = Utc::now().date_naive();

    if !user.enabled {
        return Err(AuthError::AccountDisabled);
    }
    if !user.account_non_locked {
        return Err(AuthError::AccountLocked);
    }
    if !user.account_non_expired || user.account_expiry_date.is_some_and(|d| d < today) {
        return Err(AuthError::AccountExpired);
    }
    if !user.credentials_non_expired || user.credentials_expiry_date.is_some_and(|d| d < today) {
        return Err(AuthError::CredentialsExpired);
    }

    Ok(())
}
