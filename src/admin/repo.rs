use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    admin::dto::{AdminStats, TaskStatusCount, UserListItem, UserRoleCount},
    auth::repo_types::Role,
};

pub async fn list_users(db: &PgPool) -> anyhow::Result<Vec<UserListItem>> {
    let rows = sqlx::query_as::<_, UserListItem>(
        r#"
        SELECT id, email, full_name, role, status, phone
        FROM users
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn user_exists(db: &PgPool, user_id: Uuid) -> anyhow::Result<bool> {
    let row: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(db)
        .await?;
    Ok(row.is_some())
}

/// Approval is the only transition out of `Pending`: assigns the final role
/// and activates the account in one statement.
pub async fn approve_user(db: &PgPool, user_id: Uuid, role: Role) -> anyhow::Result<()> {
    sqlx::query("UPDATE users SET role = $1, status = 'Active' WHERE id = $2")
        .bind(role)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn deactivate_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
    sqlx::query("UPDATE users SET status = 'Inactive' WHERE id = $1")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn delete_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn admin_stats(db: &PgPool) -> anyhow::Result<AdminStats> {
    let users = sqlx::query_as::<_, UserRoleCount>(
        "SELECT role, status, COUNT(*) AS count FROM users GROUP BY role, status",
    )
    .fetch_all(db)
    .await?;

    let tasks = sqlx::query_as::<_, TaskStatusCount>(
        "SELECT status, COUNT(*) AS count FROM tasks GROUP BY status",
    )
    .fetch_all(db)
    .await?;

    let (pending_approvals,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM users WHERE status = 'Pending'")
            .fetch_one(db)
            .await?;

    let (overdue_tasks,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM tasks WHERE due_date < CURRENT_DATE AND status != 'Completed'",
    )
    .fetch_one(db)
    .await?;

    Ok(AdminStats {
        users,
        tasks,
        pending_approvals,
        overdue_tasks,
    })
}
