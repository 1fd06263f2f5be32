use std::borrow::Cow;

use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use super::status::TaskStatus;
use crate::validation::{optional_text, text};

const TITLE_EMPTY: &str = "Task title cannot be empty";
const STATUS_INVALID: &str = "Status must be 'todo', 'in_progress', or 'done'";

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[serde(default, deserialize_with = "text")]
    #[validate(length(min = 1, message = "Task title cannot be empty"))]
    pub title: String,
}

/// Partial update; absent fields are left untouched. A present field of the
/// wrong JSON type (`null` included) is kept as empty text and rejected.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default, deserialize_with = "optional_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub status: Option<String>,
}

/// Update after validation, with the status parsed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub status: Option<TaskStatus>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.status.is_none()
    }
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

impl Validate for UpdateTaskRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.title.as_deref().is_some_and(str::is_empty) {
            errors.add("title", field_error("length", TITLE_EMPTY));
        }
        if let Some(status) = &self.status {
            if status.parse::<TaskStatus>().is_err() {
                errors.add("status", field_error("status", STATUS_INVALID));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl UpdateTaskRequest {
    /// Only meaningful once `validate` has passed; an unparseable status is dropped.
    pub fn into_changes(self) -> TaskChanges {
        TaskChanges {
            title: self.title,
            status: self.status.and_then(|s| s.parse().ok()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(json: &str) -> UpdateTaskRequest {
        serde_json::from_str(json).expect("valid json")
    }

    #[test]
    fn empty_title_is_rejected_on_create() {
        let req: CreateTaskRequest = serde_json::from_str("{}").unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn empty_update_is_valid_and_empty() {
        let req = update("{}");
        assert!(req.validate().is_ok());
        assert!(req.into_changes().is_empty());
    }

    #[test]
    fn status_only_update() {
        let req = update(r#"{"status":"done"}"#);
        assert!(req.validate().is_ok());
        assert_eq!(
            req.into_changes(),
            TaskChanges {
                title: None,
                status: Some(TaskStatus::Done)
            }
        );
    }

    #[test]
    fn bad_status_and_empty_title_both_reported() {
        let errs = update(r#"{"title":"","status":"blocked"}"#)
            .validate()
            .unwrap_err();
        let fields = errs.field_errors();
        assert_eq!(fields.len(), 2);
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("status"));
    }

    #[test]
    fn non_string_status_gets_the_status_message() {
        let errs = update(r#"{"status":5}"#).validate().unwrap_err();
        let fields = errs.field_errors();
        assert_eq!(fields["status"][0].message.as_deref(), Some(STATUS_INVALID));
    }

    #[test]
    fn null_title_is_rejected_not_ignored() {
        let errs = update(r#"{"title":null}"#).validate().unwrap_err();
        let fields = errs.field_errors();
        assert_eq!(fields["title"][0].message.as_deref(), Some(TITLE_EMPTY));
    }
}
