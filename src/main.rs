//! taskdeck - a command-line client for the Todolist API.
//!
//! The binary is a thin dispatcher over the library: it resolves the
//! configuration, opens the keychain-backed session, and maps each
//! command onto one API operation. All rendering is plain stdout.

use std::io;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use taskdeck::api::ApiClient;
use taskdeck::auth::{CredentialStore, Session};
use taskdeck::config::Config;
use taskdeck::models::Todo;

const USAGE: &str = "\
taskdeck <command> [args]

  register <name> <email>     create an account (prompts for password)
  login <email>               log in (prompts for password)
  logout                      log out and drop the stored token
  whoami                      show the current user
  rename <name>               change the account name
  passwd                      change the password (prompts)
  list [--by-name|--by-done]  list todos
  add <text>                  add a todo
  toggle <id>                 flip a todo's done state
  edit <id> <text>            rewrite a todo's text
  rm <id>                     delete a todo
  clear                       delete every todo
  set-url <url>               save the API base URL";

/// Initialize the tracing subscriber for logging.
/// Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        println!("{USAGE}");
        return Ok(());
    };

    let mut config = Config::load().context("Failed to load configuration")?;
    let session = Session::with_store(CredentialStore);
    let client = ApiClient::new(config.base_url(), session)?;

    match (command, &args[1..]) {
        ("register", [name, email]) => {
            let password = prompt_password("Password: ")?;
            println!("{}", client.register(name, email, &password).await?);
        }
        ("login", [email]) => {
            let password = prompt_password("Password: ")?;
            client.login(email, &password).await?;
            println!("logged in as {email}");
        }
        ("logout", []) => {
            client.logout().await?;
            println!("logged out");
        }
        ("whoami", []) => {
            let user = client.current_user().await?;
            println!("{} <{}>", user.name, user.email);
        }
        ("rename", [name]) => {
            let user = client.update_user(name).await?;
            println!("name updated to {}", user.name);
        }
        ("passwd", []) => {
            let old = prompt_password("Current password: ")?;
            let new = prompt_password("New password: ")?;
            let confirm = prompt_password("Confirm new password: ")?;
            println!("{}", client.change_password(&old, &new, &confirm).await?);
        }
        ("list", rest) => {
            let todos = match rest {
                [] => client.todos().await?,
                [flag] if flag.as_str() == "--by-name" => client.todos_by_name().await?,
                [flag] if flag.as_str() == "--by-done" => client.todos_by_done().await?,
                _ => bail!("usage: taskdeck list [--by-name|--by-done]"),
            };
            print_todos(&todos);
        }
        ("add", [text]) => {
            let todo = client.add_todo(text).await?;
            println!("added {} ({})", todo.todo, todo.id);
        }
        ("toggle", [id]) => {
            let current = find_todo(&client, id).await?;
            let updated = client
                .update_todo(id, &current.todo, !current.is_done)
                .await?;
            print_todos(std::slice::from_ref(&updated));
        }
        ("edit", [id, text]) => {
            let current = find_todo(&client, id).await?;
            let updated = client.update_todo(id, text, current.is_done).await?;
            print_todos(std::slice::from_ref(&updated));
        }
        ("rm", [id]) => {
            println!("{}", client.delete_todo(id).await?);
        }
        ("clear", []) => {
            println!("{}", client.delete_all().await?);
        }
        ("set-url", [url]) => {
            config.api_url = Some(url.clone());
            config.save().context("Failed to save configuration")?;
            println!("api url set to {url}");
        }
        _ => {
            println!("{USAGE}");
            bail!("unknown or malformed command: {command}");
        }
    }

    Ok(())
}

fn prompt_password(prompt: &str) -> Result<String> {
    rpassword::prompt_password(prompt).context("Failed to read password")
}

async fn find_todo(client: &ApiClient, id: &str) -> Result<Todo> {
    let todos = client.todos().await?;
    todos
        .into_iter()
        .find(|todo| todo.id == id)
        .with_context(|| format!("no todo with id {id}"))
}

fn print_todos(todos: &[Todo]) {
    if todos.is_empty() {
        println!("nothing to do");
        return;
    }
    for todo in todos {
        let mark = if todo.is_done { "x" } else { " " };
        println!("[{mark}] {}  {}", todo.id, todo.todo);
    }
}
