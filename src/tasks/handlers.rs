use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use time::{Date, OffsetDateTime};
use tracing::{info, instrument, warn};

use crate::{
    audit,
    auth::{
        extractors::{authorize, AuthUser},
        repo_types::{Role, User},
    },
    error::ApiError,
    state::AppState,
    tasks::{
        dto::{
            date_fmt, AssignTaskRequest, CreateTaskRequest, CreatedTaskResponse,
            TaskListResponse, TaskStatsResponse, UpdateStatusRequest,
        },
        repo_types::{Task, TaskPriority, TaskStatus},
        services::{authorize_status_change, validate_assignable, validate_due_date},
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_task).get(list_tasks))
        .route("/stats", get(task_stats))
        .route("/assign", post(assign_task))
        .route("/status", put(update_task_status))
}

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

#[instrument(skip(state, payload))]
async fn create_task(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<CreatedTaskResponse>), ApiError> {
    authorize(&principal, &[Role::Admin, Role::Manager, Role::Customer])?;

    let missing = "Title, customer, and due date are required";
    let (title, customer_id, due_raw) = match (
        payload.title.filter(|t| !t.trim().is_empty()),
        payload.customer_id,
        payload.due_date.filter(|d| !d.trim().is_empty()),
    ) {
        (Some(t), Some(c), Some(d)) => (t, c, d),
        _ => return Err(ApiError::InvalidInput(missing.into())),
    };

    let due_date = Date::parse(&due_raw, date_fmt::FORMAT)
        .map_err(|_| ApiError::InvalidInput("Invalid due date".into()))?;
    validate_due_date(due_date, today())?;

    let priority = match payload.priority.as_deref() {
        None => TaskPriority::Medium,
        Some(p) => TaskPriority::parse(p)
            .ok_or_else(|| ApiError::InvalidInput("Invalid priority".into()))?,
    };

    if User::find_by_id(&state.db, customer_id)
        .await
        .map_err(ApiError::Internal)?
        .is_none()
    {
        return Err(ApiError::NotFound("Customer not found".into()));
    }

    let task = Task::create(
        &state.db,
        &title,
        payload.description.as_deref(),
        customer_id,
        priority,
        today(),
        due_date,
        payload.address.as_deref(),
        principal.user_id,
    )
    .await
    .map_err(ApiError::Internal)?;

    audit::record(
        &state.db,
        Some(principal.user_id),
        "task.create",
        Some("task"),
        Some(task.id),
        None,
    )
    .await;

    info!(task_id = %task.id, customer_id = %customer_id, "task created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedTaskResponse {
            success: true,
            message: "Task created successfully".into(),
            task_id: task.id,
        }),
    ))
}

#[instrument(skip(state))]
async fn list_tasks(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<TaskListResponse>, ApiError> {
    let tasks = Task::list_for(&state.db, &principal)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(TaskListResponse {
        success: true,
        tasks,
    }))
}

#[instrument(skip(state))]
async fn task_stats(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<TaskStatsResponse>, ApiError> {
    let stats = Task::stats_for(&state.db, &principal)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(TaskStatsResponse {
        success: true,
        stats,
    }))
}

#[instrument(skip(state, payload))]
async fn assign_task(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(payload): Json<AssignTaskRequest>,
) -> Result<Json<crate::auth::dto::MessageResponse>, ApiError> {
    authorize(&principal, &[Role::Admin, Role::Manager])?;

    let (task_id, assigned_to) = match (payload.task_id, payload.assigned_to) {
        (Some(t), Some(a)) => (t, a),
        _ => {
            return Err(ApiError::InvalidInput(
                "Task ID and assigned employee are required".into(),
            ))
        }
    };

    let task = Task::find_by_id(&state.db, task_id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound("Task not found".into()))?;

    let assignee = User::find_by_id(&state.db, assigned_to)
        .await
        .map_err(ApiError::Internal)?;
    match assignee.map(|u| u.role) {
        Some(Role::Employee) | Some(Role::Manager) => {}
        _ => {
            warn!(%assigned_to, "assignee missing or not assignable");
            return Err(ApiError::NotFound("Employee not found".into()));
        }
    }

    validate_assignable(task.created_date, today())?;

    Task::assign(&state.db, task_id, assigned_to)
        .await
        .map_err(ApiError::Internal)?;

    audit::record(
        &state.db,
        Some(principal.user_id),
        "task.assign",
        Some("task"),
        Some(task_id),
        None,
    )
    .await;

    info!(%task_id, %assigned_to, "task assigned");
    Ok(Json(crate::auth::dto::MessageResponse::new(
        "Task assigned successfully",
    )))
}

#[instrument(skip(state, payload))]
async fn update_task_status(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<crate::auth::dto::MessageResponse>, ApiError> {
    let (task_id, status_raw) = match (payload.task_id, payload.status) {
        (Some(t), Some(s)) => (t, s),
        _ => {
            return Err(ApiError::InvalidInput(
                "Task ID and status are required".into(),
            ))
        }
    };

    let status = TaskStatus::parse(&status_raw)
        .ok_or_else(|| ApiError::InvalidInput("Invalid status".into()))?;

    let task = Task::find_by_id(&state.db, task_id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound("Task not found".into()))?;

    authorize_status_change(task.assigned_to, &principal)?;

    let completion_date = (status == TaskStatus::Completed).then(today);
    Task::update_status(&state.db, task_id, status, completion_date)
        .await
        .map_err(ApiError::Internal)?;

    audit::record(
        &state.db,
        Some(principal.user_id),
        "task.status",
        Some("task"),
        Some(task_id),
        Some(&status_raw),
    )
    .await;

    info!(%task_id, status = %status_raw, "task status updated");
    Ok(Json(crate::auth::dto::MessageResponse::new(
        "Task status updated successfully",
    )))
}
