use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tasks::repo_types::{TaskStats, TaskWithNames};

/// `YYYY-MM-DD` serde for calendar dates, matching the wire format the
/// dashboards consume.
pub mod date_fmt {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{format_description::FormatItem, macros::format_description, Date};

    pub const FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

    pub fn serialize<S: Serializer>(date: &Date, s: S) -> Result<S::Ok, S::Error> {
        let out = date.format(FORMAT).map_err(serde::ser::Error::custom)?;
        s.serialize_str(&out)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Date, D::Error> {
        let s = String::deserialize(d)?;
        Date::parse(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

pub mod date_fmt_opt {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Option<Date>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => super::date_fmt::serialize(d, s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Date>, D::Error> {
        let s = Option::<String>::deserialize(d)?;
        s.map(|v| {
            time::Date::parse(&v, super::date_fmt::FORMAT).map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AssignTaskRequest {
    #[serde(default)]
    pub task_id: Option<Uuid>,
    #[serde(default)]
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub task_id: Option<Uuid>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedTaskResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "taskId")]
    pub task_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub success: bool,
    pub tasks: Vec<TaskWithNames>,
}

#[derive(Debug, Serialize)]
pub struct TaskStatsResponse {
    pub success: bool,
    pub stats: TaskStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Wrapper {
        #[serde(with = "date_fmt")]
        d: time::Date,
        #[serde(with = "date_fmt_opt")]
        o: Option<time::Date>,
    }

    #[test]
    fn dates_use_iso_calendar_format() {
        let w = Wrapper {
            d: date!(2026 - 08 - 23),
            o: None,
        };
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["d"], "2026-08-23");
        assert_eq!(json["o"], serde_json::Value::Null);

        let back: Wrapper = serde_json::from_value(json).unwrap();
        assert_eq!(back, w);
    }

    #[test]
    fn bad_date_strings_fail_to_parse() {
        let err = serde_json::from_str::<Wrapper>(r#"{"d":"23/08/2026","o":null}"#);
        assert!(err.is_err());
    }
}
