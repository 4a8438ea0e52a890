//! User-related DTOs.

use crate::cache::{Cached, Mutation, Provenance};
use chrono::{DateTime, Utc};
use larder_core::rules::{not_blank, valid_username};
use larder_core::{User, UserId};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(
        length(max = 128, message = "Name cannot exceed 128 characters"),
        custom(function = "not_blank", message = "Name cannot be blank")
    )]
    pub name: String,

    #[validate(custom(function = "valid_username"))]
    pub username: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Request to update a user. Absent fields are left as they are.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(
        length(max = 128, message = "Name cannot exceed 128 characters"),
        custom(function = "not_blank", message = "Name cannot be blank")
    )]
    pub name: Option<String>,

    #[validate(custom(function = "valid_username"))]
    pub username: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
}

impl UpdateUserRequest {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.username.is_none() && self.email.is_none()
    }
}

/// User response DTO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            email: user.email.into(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self::from(user.clone())
    }
}

/// User list response with pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

/// A read result tagged with where it was answered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourcedResponse<T> {
    pub source: Provenance,
    pub data: T,
}

impl<T> From<Cached<T>> for SourcedResponse<T> {
    fn from(cached: Cached<T>) -> Self {
        Self {
            source: cached.provenance,
            data: cached.value,
        }
    }
}

/// Outcome of an administrative reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetSummary {
    /// Rows deleted from the store.
    pub deleted: u64,
    /// Demo rows inserted afterwards.
    pub seeded: u64,
    /// Cache keys removed.
    pub cache_keys_removed: u64,
}

/// Outcome of a cache flush.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlushSummary {
    pub mutation: Mutation,
    pub cache_keys_removed: u64,
    pub failures: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::Email;

    fn create_request(name: &str, username: &str, email: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: name.to_string(),
            username: username.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn test_create_user_request_valid() {
        let request = create_request("Ada Lovelace", "ada", "ada@example.com");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_user_request_invalid_username() {
        assert!(create_request("Ada", "ab", "ada@example.com").validate().is_err());
        assert!(create_request("Ada", "1ada", "ada@example.com").validate().is_err());
    }

    #[test]
    fn test_create_user_request_invalid_email() {
        let request = create_request("Ada", "ada", "not-an-email");
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_user_request_blank_name() {
        let request = create_request("   ", "ada", "ada@example.com");
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_user_request_partial() {
        let request = UpdateUserRequest {
            name: Some("Grace".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_ok());
        assert!(!request.is_empty());
        assert!(UpdateUserRequest::default().is_empty());
    }

    #[test]
    fn test_update_user_request_invalid_email() {
        let request = UpdateUserRequest {
            email: Some("nope".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_user_response_from_user() {
        let user = User::new("Ada", "ada", Email::new_unchecked("ada@example.com"));
        let response = UserResponse::from(&user);

        assert_eq!(response.id, user.id);
        assert_eq!(response.username, "ada");
        assert_eq!(response.email, "ada@example.com");
    }
}
