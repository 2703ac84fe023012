//! Session orchestration: persisted token/username, the live user, and the
//! current story list, carried in an explicit context instead of globals so
//! multiple sessions (e.g. in tests) never interfere.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use shared::{domain::StoryId, protocol::NewStoryFields};
use tokio::sync::Mutex;

use crate::{ApiClient, Story, StoryList, User};

/// Fixed key under which the session token is persisted.
pub const TOKEN_KEY: &str = "token";
/// Fixed key under which the logged-in username is persisted.
pub const USERNAME_KEY: &str = "username";

/// The two values that survive across runs. Both are required: absence of
/// either means "not logged in".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSession {
    pub token: String,
    pub username: String,
}

/// Persistence seam for the session token and username. Written only by the
/// login/signup success paths, cleared only by logout.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, session: &PersistedSession) -> Result<()>;
    async fn load(&self) -> Result<Option<PersistedSession>>;
    async fn clear(&self) -> Result<()>;
}

/// Process-local store; the default for tests and for runs that should not
/// leave a session behind.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<PersistedSession>>,
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, session: &PersistedSession) -> Result<()> {
        *self.inner.lock().await = Some(session.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<PersistedSession>> {
        Ok(self.inner.lock().await.clone())
    }

    async fn clear(&self) -> Result<()> {
        *self.inner.lock().await = None;
        Ok(())
    }
}

/// Explicit session state: the API client, the persistence seam, the current
/// user (if any), and the story list backing the main view.
pub struct SessionContext {
    client: ApiClient,
    store: Arc<dyn SessionStore>,
    current_user: Option<User>,
    story_list: StoryList,
}

impl SessionContext {
    pub fn new(client: ApiClient, store: Arc<dyn SessionStore>) -> Self {
        Self {
            client,
            store,
            current_user: None,
            story_list: StoryList::default(),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_user.is_some()
    }

    pub fn story_list(&self) -> &StoryList {
        &self.story_list
    }

    /// Startup path: reads the persisted token/username pair, resolves it
    /// into a live user when both are present, and loads the global story
    /// listing. A missing or partial persisted session yields an anonymous
    /// context without any user lookup.
    pub async fn resolve_session(&mut self) -> Result<()> {
        let persisted = self
            .store
            .load()
            .await
            .context("failed to read persisted session")?;
        let (token, username) = match &persisted {
            Some(session) => (Some(session.token.as_str()), Some(session.username.as_str())),
            None => (None, None),
        };
        self.current_user = User::logged_in(&self.client, token, username)
            .await
            .context("failed to resolve persisted session")?;
        self.refresh_stories().await
    }

    pub async fn refresh_stories(&mut self) -> Result<()> {
        self.story_list = StoryList::fetch(&self.client)
            .await
            .context("failed to fetch story listing")?;
        Ok(())
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let user = User::login(&self.client, username, password).await?;
        self.persist(&user).await?;
        self.current_user = Some(user);
        Ok(())
    }

    pub async fn signup(&mut self, username: &str, password: &str, name: &str) -> Result<()> {
        let user = User::create(&self.client, username, password, name).await?;
        self.persist(&user).await?;
        self.current_user = Some(user);
        Ok(())
    }

    async fn persist(&self, user: &User) -> Result<()> {
        self.store
            .save(&PersistedSession {
                token: user.token.clone(),
                username: user.username.clone(),
            })
            .await
            .context("failed to persist session")
    }

    /// Terminal transition: clears the persisted session, drops the live
    /// user, and reloads the anonymous story listing.
    pub async fn logout(&mut self) -> Result<()> {
        self.store
            .clear()
            .await
            .context("failed to clear persisted session")?;
        self.current_user = None;
        self.refresh_stories().await
    }

    pub async fn submit_story(&mut self, fields: NewStoryFields) -> Result<Story> {
        let Some(user) = self.current_user.as_mut() else {
            bail!("cannot submit a story while signed out");
        };
        let story = self
            .story_list
            .add_story(&self.client, user, fields)
            .await?;
        Ok(story)
    }

    pub async fn delete_story(&mut self, story_id: &StoryId) -> Result<()> {
        let Some(user) = self.current_user.as_mut() else {
            bail!("cannot delete a story while signed out");
        };
        self.story_list
            .remove_story(&self.client, user, story_id)
            .await?;
        Ok(())
    }

    /// Star click: adds the story to favorites when absent, removes it when
    /// present. Either way the user's collections come back from the detail
    /// refresh inside the toggle.
    pub async fn toggle_favorite(&mut self, story_id: &StoryId) -> Result<()> {
        let Some(user) = self.current_user.as_mut() else {
            bail!("cannot toggle a favorite while signed out");
        };
        if user.is_favorite(story_id) {
            user.remove_favorite(&self.client, story_id).await?;
        } else {
            user.add_favorite(&self.client, story_id).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
