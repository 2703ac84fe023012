//! Wire-format records for the remote story service. Field names follow the
//! service's camelCase JSON; everything crossing the HTTP boundary lives here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::StoryId;

/// One story as the service returns it, inside listings, user detail
/// payloads, and create-story responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoryRecord {
    pub story_id: StoryId,
    pub title: String,
    pub author: String,
    pub url: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User detail as returned by signup, login, and the user lookup endpoint.
/// `favorites` and `stories` default to empty because signup responses omit
/// them for brand-new accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub username: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub favorites: Vec<StoryRecord>,
    #[serde(default)]
    pub stories: Vec<StoryRecord>,
}

/// Caller-supplied fields for a new story submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStoryFields {
    pub author: String,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoriesResponse {
    pub stories: Vec<StoryRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoryResponse {
    pub story: StoryRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    pub user: UserRecord,
}

/// Signup and login both return the user plus a fresh session token.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: UserRecord,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStoryRequest {
    pub token: String,
    pub story: NewStoryFields,
}

/// The service reads the session token for deletes and favorite toggles from
/// the request body rather than a header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenOnlyRequest {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub user: SignupCredentials,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupCredentials {
    pub username: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub user: LoginCredentials,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORY_JSON: &str = r#"{
        "storyId": "4f3f49f4-0f5b-4a3c-b5a2-f3f4d0a1c111",
        "title": "First post",
        "author": "Alice A",
        "url": "http://example.com/a",
        "username": "alice",
        "createdAt": "2024-01-01T00:00:00.000Z",
        "updatedAt": "2024-01-02T00:00:00.000Z"
    }"#;

    #[test]
    fn decodes_camel_case_story_record() {
        let record: StoryRecord = serde_json::from_str(STORY_JSON).expect("story");
        assert_eq!(record.story_id.as_str(), "4f3f49f4-0f5b-4a3c-b5a2-f3f4d0a1c111");
        assert_eq!(record.username, "alice");
    }

    #[test]
    fn story_record_with_missing_required_field_is_rejected() {
        let truncated = STORY_JSON.replace("\"username\": \"alice\",", "");
        assert!(serde_json::from_str::<StoryRecord>(&truncated).is_err());
    }

    #[test]
    fn user_record_collections_default_to_empty() {
        let json = r#"{
            "username": "alice",
            "name": "Alice A",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-01T00:00:00.000Z"
        }"#;
        let record: UserRecord = serde_json::from_str(json).expect("user");
        assert!(record.favorites.is_empty());
        assert!(record.stories.is_empty());
    }
}
