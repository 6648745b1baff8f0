use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    auth::repo_types::{Role, UserStatus},
    tasks::repo_types::TaskStatus,
};

#[derive(Debug, Default, Deserialize)]
pub struct ApproveUserRequest {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeactivateUserRequest {
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

/// Listing row for the admin user table; no password hash leaves the store.
#[derive(Debug, Serialize, FromRow)]
pub struct UserListItem {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub status: UserStatus,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub success: bool,
    pub users: Vec<UserListItem>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct UserRoleCount {
    pub role: Role,
    pub status: UserStatus,
    pub count: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TaskStatusCount {
    pub status: TaskStatus,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub users: Vec<UserRoleCount>,
    pub tasks: Vec<TaskStatusCount>,
    #[serde(rename = "pendingApprovals")]
    pub pending_approvals: i64,
    #[serde(rename = "overdueTasks")]
    pub overdue_tasks: i64,
}

#[derive(Debug, Serialize)]
pub struct AdminStatsResponse {
    pub success: bool,
    pub stats: AdminStats,
}
