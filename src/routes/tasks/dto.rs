use serde::Deserialize;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub priority: Option<String>,
    pub folder_id: Option<Uuid>,
    pub due_date: Option<String>,
    pub due_time: Option<String>,
}

/// Absent fields are left untouched. For `due_date` and `due_time` an
/// empty string clears the stored value.
#[derive(Deserialize, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub priority: Option<String>,
    pub completed: Option<bool>,
    pub folder_id: Option<Uuid>,
    pub due_date: Option<String>,
    pub due_time: Option<String>,
}

#[derive(Deserialize)]
pub struct ListTasksQuery {
    pub folder_id: Option<Uuid>,
    pub completed: Option<bool>,
}
