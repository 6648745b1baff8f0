use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::tasks::dto::{date_fmt, date_fmt_opt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    Pending,
    Assigned,
    #[sqlx(rename = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Wire-format parse; `None` for anything outside the closed set.
    pub fn parse(s: &str) -> Option<TaskStatus> {
        match s {
            "Pending" => Some(TaskStatus::Pending),
            "Assigned" => Some(TaskStatus::Assigned),
            "In Progress" => Some(TaskStatus::InProgress),
            "Completed" => Some(TaskStatus::Completed),
            "Cancelled" => Some(TaskStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Emergency,
}

impl TaskPriority {
    pub fn parse(s: &str) -> Option<TaskPriority> {
        match s {
            "Low" => Some(TaskPriority::Low),
            "Medium" => Some(TaskPriority::Medium),
            "High" => Some(TaskPriority::High),
            "Emergency" => Some(TaskPriority::Emergency),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub customer_id: Uuid,
    pub assigned_to: Option<Uuid>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(with = "date_fmt")]
    pub created_date: Date,
    #[serde(with = "date_fmt")]
    pub due_date: Date,
    #[serde(with = "date_fmt_opt")]
    pub completion_date: Option<Date>,
    pub address: Option<String>,
    pub created_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Listing row: task joined with customer and assignee display names.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TaskWithNames {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub customer_id: Uuid,
    pub assigned_to: Option<Uuid>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(with = "date_fmt")]
    pub created_date: Date,
    #[serde(with = "date_fmt")]
    pub due_date: Date,
    #[serde(with = "date_fmt_opt")]
    pub completion_date: Option<Date>,
    pub address: Option<String>,
    pub created_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub customer_name: Option<String>,
    pub assigned_tech: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TaskStats {
    pub total: i64,
    pub pending: i64,
    pub assigned: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub cancelled: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_covers_the_closed_set() {
        assert_eq!(TaskStatus::parse("Pending"), Some(TaskStatus::Pending));
        assert_eq!(TaskStatus::parse("In Progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("Cancelled"), Some(TaskStatus::Cancelled));
        assert_eq!(TaskStatus::parse("in progress"), None);
        assert_eq!(TaskStatus::parse("Done"), None);
    }

    #[test]
    fn in_progress_serializes_with_a_space() {
        let json = serde_json::to_value(TaskStatus::InProgress).unwrap();
        assert_eq!(json, "In Progress");
    }
}
