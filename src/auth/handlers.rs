use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    audit,
    auth::{
        dto::{
            ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest, LoginResponse,
            MeResponse, MessageResponse, PublicUser, ResetPasswordRequest, SignupRequest,
            SignupResponse,
        },
        extractors::AuthUser,
        jwt::JwtKeys,
        password::hash_password,
        repo_types::{PasswordResetToken, User},
        services::{
            check_reset_token, consumed_or_invalid, gate_login, generate_reset_token,
            is_valid_email, validate_new_password, RESET_TOKEN_TTL,
        },
    },
    error::ApiError,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/me", get(me))
}

fn require(field: Option<String>, msg: &str) -> Result<String, ApiError> {
    match field {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::InvalidInput(msg.into())),
    }
}

#[instrument(skip(state, payload))]
async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let missing = "Email, password, and full name are required";
    let email = require(payload.email, missing)?;
    let password = require(payload.password, missing)?;
    let full_name = require(payload.full_name, missing)?;

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::InvalidInput("Invalid email".into()));
    }
    validate_new_password(&password)?;

    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&password).map_err(ApiError::Internal)?;
    let user = User::create(&state.db, &email, &hash, &full_name)
        .await
        .map_err(ApiError::Internal)?;

    info!(user_id = %user.id, "user signed up, awaiting approval");
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            success: true,
            message: "Signup successful. Please wait for admin approval.".into(),
            user_id: user.id,
        }),
    ))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let missing = "Email and password are required";
    let email = require(payload.email, missing)?;
    let password = require(payload.password, missing)?;

    let found = User::find_by_email(&state.db, &email)
        .await
        .map_err(ApiError::Internal)?;
    let user = gate_login(found, &password)?;

    let keys = JwtKeys::from_ref(&state);
    let (token, _) = keys
        .sign(user.id, &user.email, user.role)
        .map_err(ApiError::Internal)?;

    info!(user_id = %user.id, role = ?user.role, "user logged in");
    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".into(),
        token,
        user: PublicUser::from(&user),
    }))
}

#[instrument(skip(state, payload))]
async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<ForgotPasswordResponse>, ApiError> {
    let email = require(payload.email, "Email is required")?;

    // Unknown addresses get the same 200 so responses cannot confirm whether
    // an account exists. No token row is created in that case.
    let Some(user) = User::find_by_email(&state.db, &email)
        .await
        .map_err(ApiError::Internal)?
    else {
        return Ok(Json(ForgotPasswordResponse {
            success: true,
            message: "If an account exists with this email, a reset link will be sent".into(),
            reset_token: None,
            expires_in: None,
        }));
    };

    let raw_token = generate_reset_token();
    let token_hash = hash_password(&raw_token).map_err(ApiError::Internal)?;
    let expires_at = OffsetDateTime::now_utc() + RESET_TOKEN_TTL;
    PasswordResetToken::create(&state.db, user.id, &token_hash, expires_at)
        .await
        .map_err(ApiError::Internal)?;

    info!(user_id = %user.id, "password reset token issued");
    // The raw token goes back to the caller for out-of-band delivery; it is
    // never persisted.
    Ok(Json(ForgotPasswordResponse {
        success: true,
        message: "If an account exists with this email, a reset link will be sent".into(),
        reset_token: Some(raw_token),
        expires_in: Some("1 hour".into()),
    }))
}

#[instrument(skip(state, payload))]
async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let missing = "Email, token, and new password are required";
    let email = require(payload.email, missing)?;
    let token = require(payload.token, missing)?;
    let new_password = require(payload.new_password, missing)?;

    validate_new_password(&new_password)?;

    let user = User::find_by_email(&state.db, &email)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let row = PasswordResetToken::find_latest_valid(&state.db, user.id)
        .await
        .map_err(ApiError::Internal)?;
    let token_id = check_reset_token(row.as_ref(), &token, OffsetDateTime::now_utc())?;

    let new_hash = hash_password(&new_password).map_err(ApiError::Internal)?;
    let consumed = PasswordResetToken::consume(&state.db, token_id, user.id, &new_hash)
        .await
        .map_err(ApiError::Internal)?;
    consumed_or_invalid(consumed)?;

    audit::record(
        &state.db,
        Some(user.id),
        "auth.password_reset",
        Some("user"),
        Some(user.id),
        None,
    )
    .await;

    info!(user_id = %user.id, "password reset completed");
    Ok(Json(MessageResponse::new("Password reset successful")))
}

#[instrument(skip(state))]
async fn me(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<MeResponse>, ApiError> {
    let user = User::find_by_id(&state.db, principal.user_id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(MeResponse {
        success: true,
        user: user.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_rejects_missing_and_blank_fields() {
        assert!(require(None, "required").is_err());
        assert!(require(Some("".into()), "required").is_err());
        assert!(require(Some("   ".into()), "required").is_err());
        assert_eq!(require(Some("x".into()), "required").unwrap(), "x");
    }
}
