use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo_types::{Role, User, UserStatus};

// Required fields are modelled as Options so a missing field surfaces as the
// 400 envelope instead of a deserialization rejection.
#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, rename = "newPassword")]
    pub new_password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "userId")]
    pub user_id: Uuid,
}

/// Public part of the user returned to the client after login.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            email: u.email.clone(),
            full_name: u.full_name.clone(),
            role: u.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: PublicUser,
}

/// Forgot-password always answers 200; the token field is present only when
/// an account actually exists, the message is identical either way.
#[derive(Debug, Serialize)]
pub struct ForgotPasswordResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "resetToken", skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,
    #[serde(rename = "expiresIn", skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Full profile for `/auth/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub user: ProfileUser,
}

#[derive(Debug, Serialize)]
pub struct ProfileUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub status: UserStatus,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl From<User> for ProfileUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            full_name: u.full_name,
            role: u.role,
            status: u.status,
            phone: u.phone,
            address: u.address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_is_present_on_responses() {
        let resp = MessageResponse::new("Password reset successful");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Password reset successful");
    }

    #[test]
    fn forgot_password_response_omits_token_when_absent() {
        let resp = ForgotPasswordResponse {
            success: true,
            message: "If an account exists with this email, a reset link will be sent".into(),
            reset_token: None,
            expires_in: None,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("resetToken").is_none());
        assert!(json.get("expiresIn").is_none());
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_value(Role::Admin).unwrap();
        assert_eq!(json, "admin");
    }
}
