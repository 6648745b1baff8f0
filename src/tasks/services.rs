use time::Date;

use crate::{
    auth::{extractors::Principal, repo_types::Role},
    error::ApiError,
};

/// Due dates may be today or later; the comparison is calendar-day based so a
/// task due later today is still accepted.
pub fn validate_due_date(due: Date, today: Date) -> Result<(), ApiError> {
    if due < today {
        return Err(ApiError::InvalidInput("Due date cannot be in the past".into()));
    }
    Ok(())
}

/// Stale tasks go back through an admin rather than straight to assignment.
pub fn validate_assignable(created: Date, today: Date) -> Result<(), ApiError> {
    if created < today {
        return Err(ApiError::InvalidInput(
            "Cannot assign task created before today. Please contact admin.".into(),
        ));
    }
    Ok(())
}

/// Ownership check layered after role authorization: only the assigned user
/// or an admin may move a task's status.
pub fn authorize_status_change(
    assigned_to: Option<uuid::Uuid>,
    principal: &Principal,
) -> Result<(), ApiError> {
    if principal.role == Role::Admin || assigned_to == Some(principal.user_id) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "You can only update tasks assigned to you".into(),
        ))
    }
}
