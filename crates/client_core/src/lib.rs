//! Domain model and API client for the story service: `Story`, `User`, and
//! `StoryList` wrap the remote REST endpoints and hold in-memory state
//! mirroring server resources. Session orchestration lives in [`session`].

use chrono::{DateTime, Utc};
use reqwest::{Client, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::{
    domain::StoryId,
    error::RemoteServiceError,
    protocol::{
        AuthResponse, CreateStoryRequest, LoginCredentials, LoginRequest, NewStoryFields,
        SignupCredentials, SignupRequest, StoriesResponse, StoryRecord, StoryResponse,
        TokenOnlyRequest, UserRecord, UserResponse,
    },
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub mod session;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure, propagated unchanged from the HTTP client.
    #[error("transport failure: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-success status from the remote service, message passed through.
    #[error(transparent)]
    Api(#[from] RemoteServiceError),
    /// The service answered with a body this client cannot make sense of.
    #[error("malformed response from story service: {0}")]
    MalformedResponse(String),
    #[error("invalid request url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Thin wrapper around a reqwest [`Client`] bound to the service base URL.
/// No retries, no client-imposed timeouts, no caching; callers see exactly
/// what the transport and the service report.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)?;
        // Url::join drops the last path segment unless the base ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let mut url = self.endpoint(path)?;
        for (key, value) in query {
            url.query_pairs_mut().append_pair(key, value);
        }
        debug!(path, "GET request to story service");
        let response = self.http.get(url).send().await?;
        Self::decode(response).await
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = self.endpoint(path)?;
        debug!(%method, path, "request to story service");
        let response = self.http.request(method, url).json(body).send().await?;
        Self::decode(response).await
    }

    /// Like `send_json` but tolerates any (or no) response body; used for
    /// confirmation-style endpoints whose payload is returned raw.
    async fn send_expect_any<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Value, ClientError> {
        let url = self.endpoint(path)?;
        debug!(%method, path, "request to story service");
        let response = self.http.request(method, url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(RemoteServiceError::from_response(status.as_u16(), &text).into());
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|err| {
            ClientError::MalformedResponse(format!("confirmation body is not JSON: {err}"))
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(RemoteServiceError::from_response(status.as_u16(), &text).into());
        }
        serde_json::from_str(&text)
            .map_err(|err| ClientError::MalformedResponse(format!("failed to decode body: {err}")))
    }
}

/// One submitted link. Immutable value snapshot of a server record; removal
/// from the owning collections is the only local "mutation".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    pub story_id: StoryId,
    pub title: String,
    pub author: String,
    pub url: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<StoryRecord> for Story {
    type Error = ClientError;

    fn try_from(record: StoryRecord) -> Result<Self, Self::Error> {
        if record.story_id.is_empty() {
            return Err(ClientError::MalformedResponse(
                "story record with empty storyId".to_string(),
            ));
        }
        if record.username.is_empty() {
            return Err(ClientError::MalformedResponse(format!(
                "story {} has an empty owning username",
                record.story_id
            )));
        }
        Ok(Self {
            story_id: record.story_id,
            title: record.title,
            author: record.author,
            url: record.url,
            username: record.username,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl Story {
    /// Host portion of the story URL for display: scheme and leading `www.`
    /// stripped, path dropped.
    pub fn host_name(&self) -> &str {
        let rest = match self.url.find("://") {
            Some(idx) => &self.url[idx + 3..],
            None => self.url.as_str(),
        };
        let host = rest.split('/').next().unwrap_or(rest);
        host.strip_prefix("www.").unwrap_or(host)
    }
}

fn map_stories(records: Vec<StoryRecord>) -> Result<Vec<Story>, ClientError> {
    records.into_iter().map(Story::try_from).collect()
}

/// Verb selector for the shared favorite-toggle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteAction {
    Add,
    Remove,
}

impl FavoriteAction {
    fn http_method(self) -> Method {
        match self {
            FavoriteAction::Add => Method::POST,
            FavoriteAction::Remove => Method::DELETE,
        }
    }
}

/// The session-holding account. `token` is client-side only and never part
/// of server identity. `favorites` and `own_stories` always reflect the
/// server's last-known state after a mutating call; favorite toggles
/// re-fetch full detail rather than patching locally.
#[derive(Debug, Clone)]
pub struct User {
    pub username: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub token: String,
    pub favorites: Vec<Story>,
    pub own_stories: Vec<Story>,
}

impl User {
    fn from_record(record: UserRecord, token: String) -> Result<Self, ClientError> {
        if record.username.is_empty() {
            return Err(ClientError::MalformedResponse(
                "user record with empty username".to_string(),
            ));
        }
        Ok(Self {
            username: record.username,
            name: record.name,
            created_at: record.created_at,
            updated_at: record.updated_at,
            token,
            favorites: map_stories(record.favorites)?,
            own_stories: map_stories(record.stories)?,
        })
    }

    /// Registers a new account. Username/password constraints are enforced
    /// remotely; rejections (e.g. duplicate username) propagate unchanged.
    pub async fn create(
        client: &ApiClient,
        username: &str,
        password: &str,
        name: &str,
    ) -> Result<User, ClientError> {
        let response: AuthResponse = client
            .send_json(
                Method::POST,
                "signup",
                &SignupRequest {
                    user: SignupCredentials {
                        username: username.to_string(),
                        password: password.to_string(),
                        name: name.to_string(),
                    },
                },
            )
            .await?;
        User::from_record(response.user, response.token)
    }

    /// Authenticates an existing account and maps its favorites and owned
    /// stories into [`Story`] values.
    pub async fn login(
        client: &ApiClient,
        username: &str,
        password: &str,
    ) -> Result<User, ClientError> {
        let response: AuthResponse = client
            .send_json(
                Method::POST,
                "login",
                &LoginRequest {
                    user: LoginCredentials {
                        username: username.to_string(),
                        password: password.to_string(),
                    },
                },
            )
            .await?;
        User::from_record(response.user, response.token)
    }

    /// Resolves a previously persisted session back into a live user.
    /// Returns `Ok(None)` without touching the network when either input is
    /// absent or empty; that guard is part of the contract, not an error.
    pub async fn logged_in(
        client: &ApiClient,
        token: Option<&str>,
        username: Option<&str>,
    ) -> Result<Option<User>, ClientError> {
        let (Some(token), Some(username)) = (token, username) else {
            return Ok(None);
        };
        if token.is_empty() || username.is_empty() {
            return Ok(None);
        }
        let response: UserResponse = client
            .get_json(&format!("users/{username}"), &[("token", token)])
            .await?;
        User::from_record(response.user, token.to_string()).map(Some)
    }

    /// Re-fetches name, timestamps, favorites, and owned stories for this
    /// user, mutating in place.
    pub async fn refresh_details(&mut self, client: &ApiClient) -> Result<&mut Self, ClientError> {
        let response: UserResponse = client
            .get_json(
                &format!("users/{}", self.username),
                &[("token", &self.token)],
            )
            .await?;
        let record = response.user;
        self.name = record.name;
        self.created_at = record.created_at;
        self.updated_at = record.updated_at;
        self.favorites = map_stories(record.favorites)?;
        self.own_stories = map_stories(record.stories)?;
        Ok(self)
    }

    pub async fn add_favorite(
        &mut self,
        client: &ApiClient,
        story_id: &StoryId,
    ) -> Result<Value, ClientError> {
        self.toggle_favorite(client, story_id, FavoriteAction::Add)
            .await
    }

    pub async fn remove_favorite(
        &mut self,
        client: &ApiClient,
        story_id: &StoryId,
    ) -> Result<Value, ClientError> {
        self.toggle_favorite(client, story_id, FavoriteAction::Remove)
            .await
    }

    /// Shared toggle behind [`add_favorite`]/[`remove_favorite`]. After the
    /// remote toggle succeeds, a full detail refresh runs before returning
    /// the raw confirmation payload; the extra round trip is the consistency
    /// contract and must not be replaced with an optimistic local patch.
    async fn toggle_favorite(
        &mut self,
        client: &ApiClient,
        story_id: &StoryId,
        action: FavoriteAction,
    ) -> Result<Value, ClientError> {
        let path = format!("users/{}/favorites/{}", self.username, story_id);
        let ack = client
            .send_expect_any(
                action.http_method(),
                &path,
                &TokenOnlyRequest {
                    token: self.token.clone(),
                },
            )
            .await?;
        self.refresh_details(client).await?;
        Ok(ack)
    }

    pub fn is_favorite(&self, story_id: &StoryId) -> bool {
        self.favorites
            .iter()
            .any(|story| &story.story_id == story_id)
    }
}

/// Ordered, most-recent-first collection of all known stories. Rebuilt per
/// fetch; mutated locally on add/remove to avoid a second listing call.
#[derive(Debug, Clone, Default)]
pub struct StoryList {
    pub stories: Vec<Story>,
}

impl StoryList {
    /// Fetches the global listing and wraps every record. Factory-style: a
    /// brand-new list, nothing existing is mutated.
    pub async fn fetch(client: &ApiClient) -> Result<StoryList, ClientError> {
        let response: StoriesResponse = client.get_json("stories", &[]).await?;
        Ok(StoryList {
            stories: map_stories(response.stories)?,
        })
    }

    /// Submits a new story under the user's token and prepends the created
    /// story to both this list and the user's owned stories.
    pub async fn add_story(
        &mut self,
        client: &ApiClient,
        user: &mut User,
        fields: NewStoryFields,
    ) -> Result<Story, ClientError> {
        let response: StoryResponse = client
            .send_json(
                Method::POST,
                "stories",
                &CreateStoryRequest {
                    token: user.token.clone(),
                    story: fields,
                },
            )
            .await?;
        let story = Story::try_from(response.story)?;
        self.stories.insert(0, story.clone());
        user.own_stories.insert(0, story.clone());
        Ok(story)
    }

    /// Deletes the story remotely, then filters it out of both this list and
    /// the user's owned stories. A remote failure returns before any local
    /// mutation. Filtering an identifier that was never present locally is a
    /// quiet no-op; the server remains authoritative.
    pub async fn remove_story(
        &mut self,
        client: &ApiClient,
        user: &mut User,
        story_id: &StoryId,
    ) -> Result<(), ClientError> {
        client
            .send_expect_any(
                Method::DELETE,
                &format!("stories/{story_id}"),
                &TokenOnlyRequest {
                    token: user.token.clone(),
                },
            )
            .await?;
        let before = self.stories.len() + user.own_stories.len();
        self.stories.retain(|story| &story.story_id != story_id);
        user.own_stories.retain(|story| &story.story_id != story_id);
        if self.stories.len() + user.own_stories.len() == before {
            warn!(%story_id, "deleted story was not present in any local collection");
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
