use std::{
    io::{self, BufRead, Write},
    sync::Arc,
};

use anyhow::Result;
use clap::Parser;
use client_core::{
    session::{SessionContext, SessionStore},
    ApiClient, Story, User,
};
use shared::{domain::StoryId, protocol::NewStoryFields};
use storage::SqliteSessionStore;

mod controller;

use controller::{
    events::{describe_login_failure, UiError, UiErrorContext},
    reducer::{self, View},
};

#[derive(Parser, Debug)]
#[command(about = "Interactive client for the story-sharing service")]
struct Args {
    #[arg(long, default_value = "https://hack-or-snooze-v3.herokuapp.com")]
    server_url: String,
    #[arg(long, default_value = "sqlite://./data/session.db")]
    session_db: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let store: Arc<dyn SessionStore> = Arc::new(SqliteSessionStore::new(&args.session_db).await?);
    let client = ApiClient::new(&args.server_url)?;
    let mut context = SessionContext::new(client, store);

    if let Err(err) = context.resolve_session().await {
        let ui = UiError::from_message(UiErrorContext::Startup, format!("{err:#}"));
        eprintln!("startup: {}", ui.message());
        if ui.requires_reauth() {
            // The persisted token no longer works; drop it and start anonymous.
            context.logout().await?;
        }
    }

    let mut view = View::AllStories;
    render(view, &context);
    print_help();

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.splitn(2, ' ');
        let command = parts.next().unwrap_or_default();
        let rest = parts.next().unwrap_or("").trim();

        match command {
            "quit" | "exit" => break,
            "help" => print_help(),
            "all" => {
                view = reducer::transition(view, View::AllStories, context.is_logged_in());
                if let Err(err) = context.refresh_stories().await {
                    report(err, &mut context).await?;
                }
                render(view, &context);
            }
            "favorites" => {
                if try_nav(&mut view, View::Favorites, &context) {
                    render(view, &context);
                }
            }
            "mine" => {
                if try_nav(&mut view, View::OwnStories, &context) {
                    render(view, &context);
                }
            }
            "profile" => {
                if try_nav(&mut view, View::Profile, &context) {
                    render(view, &context);
                }
            }
            "login" => {
                let mut fields = rest.split_whitespace();
                match (fields.next(), fields.next()) {
                    (Some(username), Some(password)) => {
                        match context.login(username, password).await {
                            Ok(()) => {
                                view = reducer::after_auth();
                                if let Err(err) = context.refresh_stories().await {
                                    report(err, &mut context).await?;
                                }
                                render(view, &context);
                            }
                            Err(err) => {
                                let ui = UiError::from_message(
                                    UiErrorContext::Login,
                                    format!("{err:#}"),
                                );
                                eprintln!("{}", describe_login_failure(ui.message()));
                            }
                        }
                    }
                    _ => println!("usage: login <username> <password>"),
                }
            }
            "signup" => {
                let mut fields = rest.splitn(3, ' ');
                match (fields.next(), fields.next(), fields.next()) {
                    (Some(username), Some(password), Some(name)) if !name.trim().is_empty() => {
                        match context.signup(username, password, name.trim()).await {
                            Ok(()) => {
                                view = reducer::after_auth();
                                if let Err(err) = context.refresh_stories().await {
                                    report(err, &mut context).await?;
                                }
                                render(view, &context);
                            }
                            Err(err) => report(err, &mut context).await?,
                        }
                    }
                    _ => println!("usage: signup <username> <password> <full name>"),
                }
            }
            "submit" => {
                if !try_nav(&mut view, View::SubmitForm, &context) {
                    continue;
                }
                if rest.is_empty() {
                    render(view, &context);
                    continue;
                }
                let fields: Vec<&str> = rest.splitn(3, '|').map(str::trim).collect();
                if fields.len() != 3 {
                    println!("usage: submit <author>|<title>|<url>");
                    continue;
                }
                match context
                    .submit_story(NewStoryFields {
                        author: fields[0].to_string(),
                        title: fields[1].to_string(),
                        url: fields[2].to_string(),
                    })
                    .await
                {
                    Ok(story) => {
                        println!("submitted [{}] {}", story.story_id, story.title);
                        view = reducer::transition(view, View::AllStories, true);
                        render(view, &context);
                    }
                    Err(err) => report(err, &mut context).await?,
                }
            }
            "fav" => {
                if rest.is_empty() {
                    println!("usage: fav <story id>");
                    continue;
                }
                match context.toggle_favorite(&StoryId::from(rest)).await {
                    Ok(()) => render(view, &context),
                    Err(err) => report(err, &mut context).await?,
                }
            }
            "rm" => {
                if rest.is_empty() {
                    println!("usage: rm <story id>");
                    continue;
                }
                match context.delete_story(&StoryId::from(rest)).await {
                    Ok(()) => render(view, &context),
                    Err(err) => report(err, &mut context).await?,
                }
            }
            "logout" => {
                if let Err(err) = context.logout().await {
                    report(err, &mut context).await?;
                }
                view = reducer::after_logout();
                render(view, &context);
            }
            other => println!("unknown command '{other}'; try 'help'"),
        }
    }

    Ok(())
}

/// Applies a navigation click; prints a hint when the session state gates
/// the target off.
fn try_nav(view: &mut View, target: View, context: &SessionContext) -> bool {
    let next = reducer::transition(*view, target, context.is_logged_in());
    let moved = next == target;
    *view = next;
    if !moved {
        println!("sign in to view that page");
    }
    moved
}

async fn report(err: anyhow::Error, context: &mut SessionContext) -> Result<()> {
    let ui = UiError::from_message(UiErrorContext::Command, format!("{err:#}"));
    eprintln!("error: {}", ui.message());
    if ui.requires_reauth() {
        eprintln!("stored session looks stale; signing out");
        context.logout().await?;
    }
    Ok(())
}

fn render(view: View, context: &SessionContext) {
    match view {
        View::AllStories => render_listing(context),
        View::Favorites => match context.current_user() {
            Some(user) => render_stories(&user.favorites, "No favorites added!"),
            None => println!("sign in to view favorites"),
        },
        View::OwnStories => match context.current_user() {
            Some(user) => render_stories(&user.own_stories, "No stories added by user yet!"),
            None => println!("sign in to view your stories"),
        },
        View::Profile => match context.current_user() {
            Some(user) => render_profile(user),
            None => println!("sign in to view your profile"),
        },
        View::SubmitForm => println!("submit a story with: submit <author>|<title>|<url>"),
        View::AuthForms => {
            println!("login <username> <password>  |  signup <username> <password> <full name>")
        }
    }
}

fn render_listing(context: &SessionContext) {
    let user = context.current_user();
    if context.story_list().is_empty() {
        println!("no stories yet");
        return;
    }
    for story in &context.story_list().stories {
        let star = match user {
            Some(user) if user.is_favorite(&story.story_id) => "*",
            _ => " ",
        };
        println!(
            "{star} [{}] {} ({}) by {}, posted by {}",
            story.story_id,
            story.title,
            story.host_name(),
            story.author,
            story.username
        );
    }
}

fn render_stories(stories: &[Story], empty_message: &str) {
    if stories.is_empty() {
        println!("{empty_message}");
        return;
    }
    for story in stories {
        println!(
            "[{}] {} ({}) by {}",
            story.story_id,
            story.title,
            story.host_name(),
            story.author
        );
    }
}

fn render_profile(user: &User) {
    println!("Name: {}", user.name);
    println!("Username: {}", user.username);
    println!("Account Created: {}", user.created_at.format("%Y-%m-%d"));
}

fn print_help() {
    println!("commands:");
    println!("  all                                 show the story listing");
    println!("  favorites | mine | profile          signed-in views");
    println!("  login <username> <password>");
    println!("  signup <username> <password> <name>");
    println!("  submit <author>|<title>|<url>       post a new story");
    println!("  fav <story id>                      toggle a favorite");
    println!("  rm <story id>                       delete one of your stories");
    println!("  logout | quit");
}
