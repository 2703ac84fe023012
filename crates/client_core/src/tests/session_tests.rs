use super::*;

use crate::tests::{seed_two_users, spawn_story_server};

async fn context_with_server() -> (SessionContext, Arc<MemorySessionStore>) {
    let (server_url, state) = spawn_story_server().await;
    seed_two_users(&state).await;
    let client = ApiClient::new(&server_url).expect("client");
    let store = Arc::new(MemorySessionStore::default());
    let shared_store: Arc<dyn SessionStore> = store.clone();
    (SessionContext::new(client, shared_store), store)
}

#[tokio::test]
async fn resolve_session_without_persisted_state_is_anonymous() {
    let (mut context, _store) = context_with_server().await;

    context.resolve_session().await.expect("resolve");

    assert!(!context.is_logged_in());
    assert_eq!(context.story_list().len(), 3);
}

#[tokio::test]
async fn login_persists_token_and_username() {
    let (mut context, store) = context_with_server().await;

    context.login("alice", "secret1").await.expect("login");

    assert!(context.is_logged_in());
    let persisted = store.load().await.expect("load").expect("session");
    assert_eq!(persisted.token, "token-alice");
    assert_eq!(persisted.username, "alice");
}

#[tokio::test]
async fn signup_persists_session_and_later_context_resolves_it() {
    let (server_url, _state) = spawn_story_server().await;
    let store = Arc::new(MemorySessionStore::default());

    {
        let client = ApiClient::new(&server_url).expect("client");
        let shared_store: Arc<dyn SessionStore> = store.clone();
        let mut context = SessionContext::new(client, shared_store);
        context
            .signup("carol", "pw", "Carol C")
            .await
            .expect("signup");
        assert!(context.is_logged_in());
    }

    // A fresh context over the same store picks the session back up.
    let client = ApiClient::new(&server_url).expect("client");
    let shared_store: Arc<dyn SessionStore> = store;
    let mut context = SessionContext::new(client, shared_store);
    context.resolve_session().await.expect("resolve");

    let user = context.current_user().expect("logged in");
    assert_eq!(user.username, "carol");
    assert_eq!(user.token, "token-carol");
}

#[tokio::test]
async fn logout_clears_persisted_session_and_resets_to_anonymous() {
    let (mut context, store) = context_with_server().await;
    context.login("alice", "secret1").await.expect("login");

    context.logout().await.expect("logout");

    assert!(!context.is_logged_in());
    assert!(store.load().await.expect("load").is_none());
    assert_eq!(context.story_list().len(), 3, "anonymous listing reloaded");
}

#[tokio::test]
async fn submit_story_requires_a_signed_in_user() {
    let (mut context, _store) = context_with_server().await;
    context.resolve_session().await.expect("resolve");

    let err = context
        .submit_story(NewStoryFields {
            title: "T".to_string(),
            author: "A".to_string(),
            url: "http://x.com".to_string(),
        })
        .await
        .expect_err("must fail while signed out");
    assert!(err.to_string().contains("signed out"));
}

#[tokio::test]
async fn submit_story_prepends_for_the_session_user() {
    let (mut context, _store) = context_with_server().await;
    context.login("alice", "secret1").await.expect("login");
    context.refresh_stories().await.expect("stories");

    let story = context
        .submit_story(NewStoryFields {
            title: "T".to_string(),
            author: "A".to_string(),
            url: "http://x.com".to_string(),
        })
        .await
        .expect("submit");

    assert_eq!(context.story_list().stories[0], story);
    let user = context.current_user().expect("user");
    assert_eq!(user.own_stories[0], story);
}

#[tokio::test]
async fn toggle_favorite_adds_then_removes() {
    let (mut context, _store) = context_with_server().await;
    context.login("alice", "secret1").await.expect("login");

    let target = StoryId::from("story-3");
    context.toggle_favorite(&target).await.expect("add");
    assert!(context.current_user().expect("user").is_favorite(&target));

    context.toggle_favorite(&target).await.expect("remove");
    assert!(!context.current_user().expect("user").is_favorite(&target));
}

#[tokio::test]
async fn delete_story_removes_from_session_collections() {
    let (mut context, _store) = context_with_server().await;
    context.login("alice", "secret1").await.expect("login");
    context.refresh_stories().await.expect("stories");

    let target = StoryId::from("story-1");
    context.delete_story(&target).await.expect("delete");

    assert!(context
        .story_list()
        .stories
        .iter()
        .all(|story| story.story_id != target));
    assert!(context
        .current_user()
        .expect("user")
        .own_stories
        .iter()
        .all(|story| story.story_id != target));
}
