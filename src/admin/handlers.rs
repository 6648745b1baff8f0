use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    admin::{
        dto::{
            AdminStatsResponse, ApproveUserRequest, DeactivateUserRequest, UserListResponse,
        },
        repo,
    },
    audit,
    auth::{
        dto::MessageResponse,
        extractors::{authorize, AuthUser, Principal},
        repo_types::Role,
    },
    error::ApiError,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", delete(delete_user))
        .route("/approve-user", post(approve_user))
        .route("/deactivate-user", post(deactivate_user))
        .route("/stats", get(admin_stats))
}

fn require_admin(principal: &Principal) -> Result<(), ApiError> {
    authorize(principal, &[Role::Admin])
}

#[instrument(skip(state))]
async fn list_users(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<UserListResponse>, ApiError> {
    require_admin(&principal)?;
    let users = repo::list_users(&state.db).await.map_err(ApiError::Internal)?;
    Ok(Json(UserListResponse {
        success: true,
        users,
    }))
}

#[instrument(skip(state, payload))]
async fn approve_user(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(payload): Json<ApproveUserRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_admin(&principal)?;

    let (user_id, role_raw) = match (payload.user_id, payload.role) {
        (Some(u), Some(r)) => (u, r),
        _ => {
            return Err(ApiError::InvalidInput(
                "User ID and role are required".into(),
            ))
        }
    };
    let role =
        Role::parse(&role_raw).ok_or_else(|| ApiError::InvalidInput("Invalid role".into()))?;

    if !repo::user_exists(&state.db, user_id)
        .await
        .map_err(ApiError::Internal)?
    {
        return Err(ApiError::NotFound("User not found".into()));
    }

    repo::approve_user(&state.db, user_id, role)
        .await
        .map_err(ApiError::Internal)?;

    audit::record(
        &state.db,
        Some(principal.user_id),
        "admin.approve_user",
        Some("user"),
        Some(user_id),
        Some(&role_raw),
    )
    .await;

    info!(%user_id, role = %role_raw, "user approved");
    Ok(Json(MessageResponse::new("User approved successfully")))
}

#[instrument(skip(state, payload))]
async fn deactivate_user(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(payload): Json<DeactivateUserRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_admin(&principal)?;

    let user_id = payload
        .user_id
        .ok_or_else(|| ApiError::InvalidInput("User ID is required".into()))?;

    if !repo::user_exists(&state.db, user_id)
        .await
        .map_err(ApiError::Internal)?
    {
        return Err(ApiError::NotFound("User not found".into()));
    }

    repo::deactivate_user(&state.db, user_id)
        .await
        .map_err(ApiError::Internal)?;

    audit::record(
        &state.db,
        Some(principal.user_id),
        "admin.deactivate_user",
        Some("user"),
        Some(user_id),
        None,
    )
    .await;

    info!(%user_id, "user deactivated");
    Ok(Json(MessageResponse::new("User deactivated successfully")))
}

#[instrument(skip(state))]
async fn delete_user(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_admin(&principal)?;

    repo::delete_user(&state.db, user_id)
        .await
        .map_err(ApiError::Internal)?;

    // user_id on the audit row is the acting admin; the deleted account no
    // longer exists to reference.
    audit::record(
        &state.db,
        Some(principal.user_id),
        "admin.delete_user",
        Some("user"),
        Some(user_id),
        None,
    )
    .await;

    info!(%user_id, "user deleted");
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

#[instrument(skip(state))]
async fn admin_stats(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<AdminStatsResponse>, ApiError> {
    require_admin(&principal)?;
    let stats = repo::admin_stats(&state.db)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(AdminStatsResponse {
        success: true,
        stats,
    }))
}
