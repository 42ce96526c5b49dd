pub mod routes;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// MODELS

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Folder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFolderRequest {
    pub name: String,
}

// HELPER FUNCTIONS

pub fn validate_folder_name(name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Folder name cannot be empty".to_string());
    }

    if name.chars().count() > 64 {
        return Err("Folder name is too long (Max: 64 characters)".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_folder_name() {
        assert!(validate_folder_name("Groceries").is_ok());
        assert!(validate_folder_name("   ").is_err());
        assert!(validate_folder_name(&"x".repeat(65)).is_err());
    }
}
