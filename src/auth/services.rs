use lazy_static::lazy_static;
use rand::RngCore;
use regex::Regex;
use time::{Duration as TimeDuration, OffsetDateTime};

use crate::{
    auth::{
        password::{verify_password, MIN_PASSWORD_LEN},
        repo_types::{PasswordResetToken, User, UserStatus},
    },
    error::ApiError,
};

/// Reset tokens expire on an absolute wall clock, not a sliding window.
pub const RESET_TOKEN_TTL: TimeDuration = TimeDuration::hours(1);

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn validate_new_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::InvalidInput(
            "Password must be at least 6 characters".into(),
        ));
    }
    Ok(())
}

/// Credential gate for login. Unknown email and wrong password produce the
/// identical error so responses cannot be used to enumerate accounts. Account
/// status is only checked after the hash matches.
pub fn gate_login(user: Option<User>, password: &str) -> Result<User, ApiError> {
    let invalid = || ApiError::Unauthorized("Invalid email or password".into());

    let user = user.ok_or_else(invalid)?;
    let ok = verify_password(password, &user.password_hash).map_err(ApiError::Internal)?;
    if !ok {
        return Err(invalid());
    }

    match user.status {
        UserStatus::Pending => Err(ApiError::Forbidden(
            "Your account is pending admin approval".into(),
        )),
        UserStatus::Inactive => Err(ApiError::Forbidden(
            "Your account has been deactivated".into(),
        )),
        UserStatus::Active => Ok(user),
    }
}

/// High-entropy raw reset token. The raw value goes back to the caller for
/// out-of-band delivery and is never persisted; only its hash is stored.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Check a presented raw token against the stored row. "No valid row",
/// "already used", "expired" and "hash mismatch" are deliberately
/// indistinguishable to the caller. The row query already filters used and
/// expired rows; re-checking here keeps the invariants even if a stale row
/// reaches this point.
pub fn check_reset_token(
    row: Option<&PasswordResetToken>,
    raw: &str,
    now: OffsetDateTime,
) -> Result<uuid::Uuid, ApiError> {
    let invalid = || ApiError::InvalidInput("Invalid or expired reset token".into());

    let row = row.ok_or_else(invalid)?;
    if row.used || row.expires_at <= now {
        return Err(invalid());
    }
    let ok = verify_password(raw, &row.token_hash).map_err(ApiError::Internal)?;
    if !ok {
        return Err(invalid());
    }
    Ok(row.id)
}

/// Outcome of the consume transaction. Losing the race on the `used` flip is
/// the caller's "invalid token"; transaction failures surface separately as
/// internal errors.
pub fn consumed_or_invalid(consumed: bool) -> Result<(), ApiError> {
    if consumed {
        Ok(())
    } else {
        Err(ApiError::InvalidInput("Invalid or expired reset token".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        password::hash_password,
        repo_types::{Role, User},
    };
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn user(status: UserStatus, password: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            password_hash: hash_password(password).unwrap(),
            full_name: "A".into(),
            role: Role::Customer,
            status,
            phone: None,
            address: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("spaces in@x.com"));
        assert!(!is_valid_email("a@nodot"));
    }

    #[test]
    fn short_password_rejected() {
        assert!(validate_new_password("12345").is_err());
        assert!(validate_new_password("123456").is_ok());
    }

    #[test]
    fn unknown_email_and_wrong_password_are_indistinguishable() {
        let missing = gate_login(None, "secret1").unwrap_err();
        let wrong = gate_login(Some(user(UserStatus::Active, "secret1")), "other12").unwrap_err();
        assert_eq!(missing.to_string(), wrong.to_string());
        assert!(matches!(missing, ApiError::Unauthorized(_)));
        assert!(matches!(wrong, ApiError::Unauthorized(_)));
    }

    #[test]
    fn pending_and_inactive_accounts_are_refused_after_hash_match() {
        let err = gate_login(Some(user(UserStatus::Pending, "secret1")), "secret1").unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert!(err.to_string().contains("pending"));

        let err = gate_login(Some(user(UserStatus::Inactive, "secret1")), "secret1").unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert!(err.to_string().contains("deactivated"));
    }

    #[test]
    fn pending_account_with_wrong_password_gets_generic_error() {
        // Status must not leak before the hash matches.
        let err = gate_login(Some(user(UserStatus::Pending, "secret1")), "wrong99").unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn active_account_with_correct_password_passes() {
        let u = user(UserStatus::Active, "secret1");
        let out = gate_login(Some(u.clone()), "secret1").expect("login should pass");
        assert_eq!(out.id, u.id);
    }

    #[test]
    fn reset_token_is_64_hex_chars_and_unique() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    fn token_row(raw: &str) -> PasswordResetToken {
        PasswordResetToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token_hash: hash_password(raw).unwrap(),
            expires_at: OffsetDateTime::now_utc() + RESET_TOKEN_TTL,
            used: false,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn stored_reset_hash_never_equals_raw_token() {
        let raw = generate_reset_token();
        let row = token_row(&raw);
        assert_ne!(row.token_hash, raw);
    }

    #[test]
    fn missing_row_and_wrong_token_share_one_error_message() {
        let raw = generate_reset_token();
        let row = token_row(&raw);
        let now = OffsetDateTime::now_utc();
        let missing = check_reset_token(None, &raw, now).unwrap_err();
        let wrong = check_reset_token(Some(&row), &generate_reset_token(), now).unwrap_err();
        assert_eq!(missing.to_string(), wrong.to_string());
    }

    #[test]
    fn used_row_is_rejected_even_with_matching_token() {
        let raw = generate_reset_token();
        let mut row = token_row(&raw);
        row.used = true;
        let err = check_reset_token(Some(&row), &raw, OffsetDateTime::now_utc()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert_eq!(err.to_string(), "Invalid or expired reset token");
    }

    #[test]
    fn expired_row_is_rejected_even_with_matching_token() {
        let raw = generate_reset_token();
        let row = token_row(&raw);
        // Two hours past issue, one hour past the row's expiry.
        let later = row.expires_at + TimeDuration::hours(1);
        let err = check_reset_token(Some(&row), &raw, later).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert_eq!(err.to_string(), "Invalid or expired reset token");
    }

    #[test]
    fn matching_token_yields_the_row_id() {
        let raw = generate_reset_token();
        let row = token_row(&raw);
        let id = check_reset_token(Some(&row), &raw, OffsetDateTime::now_utc())
            .expect("token should match");
        assert_eq!(id, row.id);
    }

    #[test]
    fn lost_consume_race_reads_as_invalid_token() {
        assert!(consumed_or_invalid(true).is_ok());
        let err = consumed_or_invalid(false).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert_eq!(err.to_string(), "Invalid or expired reset token");
    }
}
