use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{auth::repo_types::Role, config::JwtConfig, state::AppState};

/// Session token payload. Role is captured at issuance; an admin changing a
/// user's role does not invalidate tokens already in flight — they run out
/// their expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

/// JWT signing and verification keys plus issuer metadata. Stateless: no
/// server-side session record exists, expiry is the only termination.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            ttl: Duration::from_secs((ttl_minutes as u64) * 60),
        }
    }
}

impl JwtKeys {
    /// Mint a session token binding identity and role until `now + ttl`.
    pub fn sign(&self, user_id: Uuid, email: &str, role: Role) -> anyhow::Result<(String, i64)> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            role,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, role = ?role, "jwt signed");
        Ok((token, exp.unix_timestamp()))
    }

    /// Rejects bad signatures, wrong issuer/audience, structural garbage and
    /// expired tokens alike.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys() -> JwtKeys {
        JwtKeys::from_ref(&AppState::fake())
    }

    #[tokio::test]
    async fn sign_and_verify_roundtrip_preserves_identity_and_role() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let (token, exp) = keys.sign(user_id, "a@x.com", Role::Manager).expect("sign");
        assert!(exp > OffsetDateTime::now_utc().unix_timestamp());
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.role, Role::Manager);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
    }

    #[tokio::test]
    async fn verify_rejects_token_signed_with_other_secret() {
        let keys = make_keys();
        let other = JwtKeys {
            encoding: EncodingKey::from_secret(b"different-secret"),
            decoding: DecodingKey::from_secret(b"different-secret"),
            issuer: keys.issuer.clone(),
            audience: keys.audience.clone(),
            ttl: keys.ttl,
        };
        let (token, _) = other.sign(Uuid::new_v4(), "a@x.com", Role::Admin).unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn verify_rejects_tampered_token() {
        let keys = make_keys();
        let (token, _) = keys.sign(Uuid::new_v4(), "a@x.com", Role::Customer).unwrap();
        let mut parts: Vec<String> = token.split('.').map(|s| s.to_string()).collect();
        // Flip a character in the payload segment.
        let replacement = if parts[1].starts_with('A') { "B" } else { "A" };
        parts[1].replace_range(0..1, replacement);
        let forged = parts.join(".");
        assert!(keys.verify(&forged).is_err());
    }

    #[tokio::test]
    async fn verify_rejects_structural_garbage() {
        let keys = make_keys();
        assert!(keys.verify("not-a-jwt").is_err());
        assert!(keys.verify("").is_err());
        assert!(keys.verify("a.b.c").is_err());
    }

    #[tokio::test]
    async fn verify_rejects_expired_token() {
        let keys = make_keys();
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "a@x.com".into(),
            role: Role::Employee,
            iat: (now - TimeDuration::hours(3)).unix_timestamp() as usize,
            exp: (now - TimeDuration::hours(2)).unix_timestamp() as usize,
            iss: keys.issuer.clone(),
            aud: keys.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn verify_rejects_wrong_issuer_or_audience() {
        let keys = make_keys();
        let stranger = JwtKeys {
            encoding: keys.encoding.clone(),
            decoding: keys.decoding.clone(),
            issuer: "other-issuer".into(),
            audience: "other-aud".into(),
            ttl: keys.ttl,
        };
        let (token, _) = stranger.sign(Uuid::new_v4(), "a@x.com", Role::Admin).unwrap();
        assert!(keys.verify(&token).is_err());
    }
}
