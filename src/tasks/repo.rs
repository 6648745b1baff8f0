use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use crate::{
    auth::{extractors::Principal, repo_types::Role},
    tasks::repo_types::{Task, TaskPriority, TaskStats, TaskStatus, TaskWithNames},
};

const TASK_COLUMNS: &str = "id, title, description, customer_id, assigned_to, status, priority, \
     created_date, due_date, completion_date, address, created_by, created_at";

/// WHERE clause scoping a query to what the caller's role may see. Customers
/// see their own tasks, employees their assignments, managers and admins all.
fn role_scope(principal: &Principal) -> (&'static str, Option<Uuid>) {
    match principal.role {
        Role::Customer => ("WHERE t.customer_id = $1", Some(principal.user_id)),
        Role::Employee => ("WHERE t.assigned_to = $1", Some(principal.user_id)),
        Role::Manager | Role::Admin => ("", None),
    }
}

impl Task {
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        db: &PgPool,
        title: &str,
        description: Option<&str>,
        customer_id: Uuid,
        priority: TaskPriority,
        created_date: Date,
        due_date: Date,
        address: Option<&str>,
        created_by: Uuid,
    ) -> anyhow::Result<Task> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks
                 (title, description, customer_id, priority, created_date, due_date, address, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(title)
        .bind(description)
        .bind(customer_id)
        .bind(priority)
        .bind(created_date)
        .bind(due_date)
        .bind(address)
        .bind(created_by)
        .fetch_one(db)
        .await?;
        Ok(task)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(task)
    }

    pub async fn assign(db: &PgPool, task_id: Uuid, assigned_to: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE tasks SET assigned_to = $1, status = 'Assigned' WHERE id = $2")
            .bind(assigned_to)
            .bind(task_id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn update_status(
        db: &PgPool,
        task_id: Uuid,
        status: TaskStatus,
        completion_date: Option<Date>,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE tasks SET status = $1, completion_date = $2 WHERE id = $3")
            .bind(status)
            .bind(completion_date)
            .bind(task_id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn list_for(db: &PgPool, principal: &Principal) -> anyhow::Result<Vec<TaskWithNames>> {
        let (scope, bind) = role_scope(principal);
        let sql = format!(
            "SELECT t.id, t.title, t.description, t.customer_id, t.assigned_to, t.status,
                    t.priority, t.created_date, t.due_date, t.completion_date, t.address,
                    t.created_by, t.created_at,
                    c.full_name AS customer_name,
                    e.full_name AS assigned_tech
             FROM tasks t
             LEFT JOIN users c ON c.id = t.customer_id
             LEFT JOIN users e ON e.id = t.assigned_to
             {scope}
             ORDER BY t.created_at DESC"
        );
        let mut query = sqlx::query_as::<_, TaskWithNames>(&sql);
        if let Some(id) = bind {
            query = query.bind(id);
        }
        let rows = query.fetch_all(db).await?;
        Ok(rows)
    }

    pub async fn stats_for(db: &PgPool, principal: &Principal) -> anyhow::Result<TaskStats> {
        let (scope, bind) = role_scope(principal);
        let sql = format!(
            "SELECT COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE t.status = 'Pending') AS pending,
                    COUNT(*) FILTER (WHERE t.status = 'Assigned') AS assigned,
                    COUNT(*) FILTER (WHERE t.status = 'In Progress') AS in_progress,
                    COUNT(*) FILTER (WHERE t.status = 'Completed') AS completed,
                    COUNT(*) FILTER (WHERE t.status = 'Cancelled') AS cancelled
             FROM tasks t
             {scope}"
        );
        let mut query = sqlx::query_as::<_, TaskStats>(&sql);
        if let Some(id) = bind {
            query = query.bind(id);
        }
        let stats = query.fetch_one(db).await?;
        Ok(stats)
    }
}
