use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use super::model::{NewTask, Pagination, StatusFilter, TaskChanges, TaskStatus};
use super::service::TaskError;

#[derive(Debug, Default, Deserialize)]
pub struct CreateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<String>,
}

/// Same shape as `CreateTask`. Empty `description`/`due_date` keep the stored
/// value rather than clearing it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "perPage")]
    pub per_page: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "statusFilter")]
    pub status_filter: Option<String>,
}

impl CreateTask {
    pub fn validate(self) -> Result<NewTask, TaskError> {
        let (title, status) = required(self.title, self.status)?;
        Ok(NewTask {
            title,
            description: non_empty(self.description),
            status,
            due_date: parse_due_date(self.due_date.as_deref())?,
        })
    }
}

impl UpdateTask {
    pub fn validate(self) -> Result<TaskChanges, TaskError> {
        let (title, status) = required(self.title, self.status)?;
        Ok(TaskChanges {
            title,
            description: non_empty(self.description),
            status,
            due_date: parse_due_date(self.due_date.as_deref())?,
        })
    }
}

impl ListQuery {
    /// Unparseable or non-positive values fall back to the defaults.
    pub fn pagination(&self) -> Pagination {
        Pagination::new(positive(self.page.as_deref()), positive(self.per_page.as_deref()))
    }

    pub fn status_filter(&self) -> Result<StatusFilter, TaskError> {
        match self.status_filter.as_deref() {
            None | Some("") => Ok(StatusFilter::All),
            Some(raw) => raw.parse().map_err(|e| TaskError::Validation(format!("{e}"))),
        }
    }
}

fn required(title: Option<String>, status: Option<String>) -> Result<(String, TaskStatus), TaskError> {
    let (Some(title), Some(status)) = (non_empty(title), non_empty(status)) else {
        return Err(TaskError::Validation("Title and status are required".to_string()));
    };
    let status = status
        .parse()
        .map_err(|e| TaskError::Validation(format!("{e}")))?;
    Ok((title, status))
}

/// Only the empty string counts as absent; whitespace is kept as given.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn positive(raw: Option<&str>) -> u32 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v >= 1)
        .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (taken as UTC) or `YYYY-MM-DD`
/// (midnight UTC). Blank means not supplied.
pub fn parse_due_date(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, TaskError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(naive.and_utc()));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc()));
    }

    Err(TaskError::Validation(format!("invalid due_date: {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create(title: &str, status: &str) -> CreateTask {
        CreateTask {
            title: Some(title.to_string()),
            status: Some(status.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_requires_title_and_status() {
        assert!(create("t1", "Pending").validate().is_ok());
        assert!(matches!(create("", "Pending").validate(), Err(TaskError::Validation(_))));
        assert!(matches!(create("t1", "").validate(), Err(TaskError::Validation(_))));
        assert!(matches!(CreateTask::default().validate(), Err(TaskError::Validation(_))));
    }

    #[test]
    fn test_create_rejects_unknown_status() {
        assert!(matches!(create("t1", "Done").validate(), Err(TaskError::Validation(_))));
    }

    #[test]
    fn test_update_blank_optionals_mean_keep() {
        let changes = UpdateTask {
            title: Some("t1".to_string()),
            description: Some(String::new()),
            status: Some("Completed".to_string()),
            due_date: Some(String::new()),
        }
        .validate()
        .unwrap();

        assert_eq!(changes.status, TaskStatus::Completed);
        assert!(changes.description.is_none());
        assert!(changes.due_date.is_none());
    }

    #[test]
    fn test_only_empty_strings_count_as_absent() {
        let task = CreateTask {
            title: Some("   ".to_string()),
            description: Some("  ".to_string()),
            status: Some("Pending".to_string()),
            due_date: None,
        }
        .validate()
        .unwrap();
        assert_eq!(task.title, "   ");
        assert_eq!(task.description.as_deref(), Some("  "));

        let changes = UpdateTask {
            title: Some("t1".to_string()),
            description: Some(" ".to_string()),
            status: Some("Pending".to_string()),
            due_date: None,
        }
        .validate()
        .unwrap();
        assert_eq!(changes.description.as_deref(), Some(" "));

        assert!(matches!(create("t1", " ").validate(), Err(TaskError::Validation(_))));
    }

    #[test]
    fn test_due_date_formats() {
        let midnight = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_due_date(Some("2025-01-01")).unwrap(), Some(midnight));
        assert_eq!(
            parse_due_date(Some("2025-01-01T00:00:00Z")).unwrap(),
            Some(midnight)
        );
        assert_eq!(
            parse_due_date(Some("2025-01-01T02:00:00+02:00")).unwrap(),
            Some(midnight)
        );
        assert_eq!(
            parse_due_date(Some("2025-01-01T09:30")).unwrap(),
            Some(Utc.with_ymd_and_hms(2025, 1, 1, 9, 30, 0).unwrap())
        );
        assert_eq!(parse_due_date(None).unwrap(), None);
        assert_eq!(parse_due_date(Some("  ")).unwrap(), None);
        assert!(parse_due_date(Some("tomorrow")).is_err());
        assert!(parse_due_date(Some("2025-13-40")).is_err());
    }

    #[test]
    fn test_list_query_defaults() {
        let query = ListQuery::default();
        assert_eq!(query.pagination(), Pagination::default());
        assert_eq!(query.status_filter().unwrap(), StatusFilter::All);
    }

    #[test]
    fn test_list_query_lenient_numbers() {
        let query = ListQuery {
            per_page: Some("abc".to_string()),
            page: Some("-2".to_string()),
            status_filter: Some("Pending".to_string()),
        };
        assert_eq!(query.pagination(), Pagination::default());
        assert_eq!(
            query.status_filter().unwrap(),
            StatusFilter::Only(TaskStatus::Pending)
        );

        let query = ListQuery {
            per_page: Some("10".to_string()),
            page: Some("3".to_string()),
            status_filter: None,
        };
        assert_eq!(query.pagination(), Pagination::new(3, 10));
    }

    #[test]
    fn test_list_query_unknown_filter() {
        let query = ListQuery {
            status_filter: Some("Someday".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.status_filter(), Err(TaskError::Validation(_))));
    }
}
