pub mod dto;
pub mod model;
pub mod queries;
pub mod routes;

use chrono::{NaiveDate, NaiveTime};

use dto::{CreateTask, UpdateTask};

pub const PRIORITIES: [&str; 3] = ["Low", "Medium", "High"];
pub const DEFAULT_PRIORITY: &str = "Medium";

// HELPER FUNCTIONS

pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Task title cannot be empty".to_string());
    }

    if title.len() > 200 {
        return Err("Task title is too long (Max: 200 characters)".to_string());
    }

    Ok(())
}

pub fn validate_priority(priority: &str) -> Result<(), String> {
    if !PRIORITIES.contains(&priority) {
        return Err(format!("Priority must be one of {}", PRIORITIES.join(", ")));
    }

    Ok(())
}

// Empty means "no due date" and is always accepted
pub fn validate_due_date(due_date: &str) -> Result<(), String> {
    let due_date = due_date.trim();
    if due_date.is_empty() {
        return Ok(());
    }

    NaiveDate::parse_from_str(due_date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| "Due date must be formatted as YYYY-MM-DD".to_string())
}

pub fn validate_due_time(due_time: &str) -> Result<(), String> {
    let due_time = due_time.trim();
    if due_time.is_empty() {
        return Ok(());
    }

    if due_time.len() != 5 || NaiveTime::parse_from_str(due_time, "%H:%M").is_err() {
        return Err("Due time must be formatted as HH:MM".to_string());
    }

    Ok(())
}

pub fn validate_create(body: &CreateTask) -> Result<(), String> {
    validate_title(&body.title)?;
    if let Some(priority) = &body.priority {
        validate_priority(priority)?;
    }
    if let Some(due_date) = &body.due_date {
        validate_due_date(due_date)?;
    }
    if let Some(due_time) = &body.due_time {
        validate_due_time(due_time)?;
    }
    Ok(())
}

pub fn validate_update(body: &UpdateTask) -> Result<(), String> {
    if let Some(title) = &body.title {
        validate_title(title)?;
    }
    if let Some(priority) = &body.priority {
        validate_priority(priority)?;
    }
    if let Some(due_date) = &body.due_date {
        validate_due_date(due_date)?;
    }
    if let Some(due_time) = &body.due_time {
        validate_due_time(due_time)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_due_time() {
        assert!(validate_due_time("09:05").is_ok());
        assert!(validate_due_time("").is_ok());
        assert!(validate_due_time("9pm").is_err());
        assert!(validate_due_time("9:05").is_err());
        assert!(validate_due_time("24:00").is_err());
    }

    #[test]
    fn test_validate_due_date() {
        assert!(validate_due_date("2024-02-29").is_ok());
        assert!(validate_due_date(" ").is_ok());
        assert!(validate_due_date("2023-02-29").is_err());
        assert!(validate_due_date("01/02/2024").is_err());
    }

    #[test]
    fn test_validate_create() {
        let body = CreateTask {
            title: "Buy milk".to_string(),
            priority: Some("Urgent".to_string()),
            folder_id: None,
            due_date: None,
            due_time: None,
        };
        assert!(validate_create(&body).unwrap_err().contains("Priority"));

        let body = CreateTask {
            title: "   ".to_string(),
            priority: None,
            folder_id: None,
            due_date: None,
            due_time: None,
        };
        assert!(validate_create(&body).is_err());
    }
}
