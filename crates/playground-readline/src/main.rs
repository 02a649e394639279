mod commands;
mod helper;
mod logging;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result, anyhow};
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;

use playground_core::PlaygroundConfig;
use playground_core::storage::KeyValueStore;
use playground_infrastructure::{ConfigService, JsonFileStore, MemoryStore, PlaygroundPaths};
use playground_interaction::{
    AuthError, ChatCoordinator, HttpChatBackend, SendOutcome, SessionLifecycle, View,
};

use commands::{ChatCommand, HELP};
use helper::CliHelper;

type Repl = Editor<CliHelper, DefaultHistory>;

#[derive(Debug, Parser)]
#[command(name = "playground", version, about = "Chat with the playground backend")]
struct Cli {
    /// Path to config.toml (default: ~/.config/playground/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the backend base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Directory holding the persisted store (default: platform data dir)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

/// How the chat view was left.
enum ChatExit {
    Logout,
    Quit,
}

fn load_config(cli: &Cli) -> Result<PlaygroundConfig> {
    let service = match &cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new()?,
    };
    let mut config = service
        .load_with_env()
        .with_context(|| format!("failed to load {}", service.path().display()))?;

    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
        config.validate()?;
    }
    Ok(config)
}

fn open_store(cli: &Cli, config: &PlaygroundConfig) -> Result<JsonFileStore> {
    let path = match &cli.data_dir {
        Some(dir) => PlaygroundPaths::store_file_in(dir),
        None => PlaygroundPaths::store_file().map_err(|e| anyhow!(e.to_string()))?,
    };
    tracing::info!(path = %path.display(), "opening store");
    Ok(JsonFileStore::open(path).with_capacity_bytes(config.storage_capacity_bytes))
}

/// Reads one line; `None` on Ctrl-D.
fn read_line(rl: &mut Repl, prompt: &str, initial: &str) -> Result<Option<String>> {
    loop {
        let result = if initial.is_empty() {
            rl.readline(prompt)
        } else {
            rl.readline_with_initial(prompt, (initial, ""))
        };
        match result {
            Ok(line) => return Ok(Some(line)),
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => return Ok(None),
            Err(err) => return Err(err.into()),
        }
    }
}

/// Reads a message; a trailing `\` continues it on the next line.
fn read_message(rl: &mut Repl, initial: &str) -> Result<Option<String>> {
    let Some(mut line) = read_line(rl, ">> ", initial)? else {
        return Ok(None);
    };

    while line.ends_with('\\') {
        line.pop();
        line.push('\n');
        match read_line(rl, ".. ", "")? {
            Some(next) => line.push_str(&next),
            None => break,
        }
    }
    Ok(Some(line))
}

/// Prompts until the credentials are accepted. `false` on Ctrl-D.
fn login_gate(rl: &mut Repl, lifecycle: &SessionLifecycle) -> Result<bool> {
    println!("{}", "=== Login ===".bright_magenta().bold());
    loop {
        let Some(email) = read_line(rl, "email: ", "")? else {
            return Ok(false);
        };
        let Some(password) = read_line(rl, "password: ", "")? else {
            return Ok(false);
        };

        match lifecycle.login(email.trim(), &password) {
            Ok(_) => {
                println!("{}", format!("Logged in as {}", email.trim()).bright_green());
                println!();
                return Ok(true);
            }
            Err(AuthError::InvalidCredentials) => {
                println!("{}", "Login failed!".red());
            }
            Err(err) => return Err(err.into()),
        }
    }
}

async fn chat_view(rl: &mut Repl, lifecycle: &SessionLifecycle) -> Result<ChatExit> {
    let chat = lifecycle.start_session();

    println!(
        "{}",
        format!("=== Playground ({}) ===", chat.identity().account)
            .bright_magenta()
            .bold()
    );
    render::print_system("Type a message and press Enter, or /help for commands.");
    println!();
    for message in chat.messages() {
        render::print_message(&message);
    }

    let mut last_query = String::new();
    loop {
        let Some(line) = read_message(rl, &chat.input())? else {
            return Ok(ChatExit::Quit);
        };
        chat.set_input(line.clone());
        if !line.trim().is_empty() {
            let _ = rl.add_history_entry(line.as_str());
        }

        match ChatCommand::parse(&line) {
            ChatCommand::Send(_) => send(&chat).await,
            ChatCommand::History(query) => {
                chat.set_input("");
                render::print_history(&chat.filtered_history(&query), &query);
                last_query = query;
            }
            ChatCommand::Save(text) => {
                chat.set_input(text.unwrap_or_default());
                chat.save_input_to_history();
                chat.set_input("");
                render::print_system("Saved to history.");
            }
            ChatCommand::ClearHistory => {
                chat.set_input("");
                chat.clear_history();
                render::print_system("History cleared.");
            }
            ChatCommand::Recall(n) => {
                chat.set_input("");
                if chat.recall_history(&last_query, n - 1).is_none() {
                    render::print_system(&format!("No history entry {n}, see /history."));
                }
            }
            ChatCommand::Logout => {
                lifecycle.logout(&chat).await;
                render::print_system("Logged out.");
                println!();
                return Ok(ChatExit::Logout);
            }
            ChatCommand::Quit => return Ok(ChatExit::Quit),
            ChatCommand::Help => {
                chat.set_input("");
                render::print_system(HELP);
            }
            ChatCommand::Invalid(hint) => {
                chat.set_input("");
                println!("{}", hint.yellow());
            }
        }
    }
}

async fn send(chat: &ChatCoordinator) {
    if !chat.can_send() {
        chat.set_input("");
        return;
    }

    render::print_system("sending...");
    match chat.send_input().await {
        SendOutcome::Replied(message) => render::print_message(&message),
        SendOutcome::Failed(_) => {
            if let Some(message) = chat.messages().pop() {
                render::print_message(&message);
            }
        }
        SendOutcome::Ignored | SendOutcome::Discarded => {}
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init();

    let config = load_config(&cli)?;
    let store: Arc<dyn KeyValueStore> = Arc::new(open_store(&cli, &config)?);
    let session_store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let backend = Arc::new(HttpChatBackend::new(&config));
    let lifecycle = SessionLifecycle::new(store, session_store, backend, config);

    let mut rl: Repl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    loop {
        if lifecycle.initial_view() == View::Login && !login_gate(&mut rl, &lifecycle)? {
            break;
        }

        match chat_view(&mut rl, &lifecycle).await? {
            ChatExit::Logout => continue,
            ChatExit::Quit => break,
        }
    }

    println!("{}", "Goodbye!".bright_green());
    Ok(())
}
