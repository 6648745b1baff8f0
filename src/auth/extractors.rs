use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::{
    auth::{jwt::JwtKeys, repo_types::Role},
    error::ApiError,
};

/// Authenticated identity extracted from a verified session token.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Bearer-token extractor; rejection is the 401 envelope.
pub struct AuthUser(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header".into()))?;

        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::Unauthorized("Invalid or expired token".into())
        })?;

        Ok(AuthUser(Principal {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }))
    }
}

/// Role gate applied after authentication; the allowed set is fixed per route.
pub fn authorize(principal: &Principal, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&principal.role) {
        Ok(())
    } else {
        warn!(user_id = %principal.user_id, role = ?principal.role, "role not permitted");
        Err(ApiError::Forbidden("Access denied".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            email: "p@x.com".into(),
            role,
        }
    }

    #[test]
    fn authorize_admits_every_role_in_the_allowed_set() {
        for role in Role::ALL {
            assert!(authorize(&principal(role), &[role]).is_ok());
        }
    }

    #[test]
    fn authorize_denies_every_role_outside_the_allowed_set() {
        let allowed = [Role::Admin, Role::Manager];
        for role in [Role::Employee, Role::Customer] {
            let err = authorize(&principal(role), &allowed).unwrap_err();
            assert!(matches!(err, ApiError::Forbidden(_)));
        }
    }

    #[test]
    fn authorize_denies_everyone_on_empty_set() {
        for role in Role::ALL {
            assert!(authorize(&principal(role), &[]).is_err());
        }
    }
}
