mod command;
mod render;

use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use command::{COMMANDS, Command, HELP};
use parley_application::{AppBootstrap, BootstrapOptions, ChatUseCase};

/// Terminal chat client for Gemini.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about)]
struct Args {
    /// Directory holding config, chats and logs (default: ~/.config/parley)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Alternative config file
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Rustyline helper providing slash-command completion, highlighting and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|cmd| cmd.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Installs a daily rolling file logger in `logs_dir`.
///
/// The returned guard must live until exit so buffered lines are flushed.
fn init_logging(logs_dir: &Path, default_level: &str) -> Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

    let appender = tracing_appender::rolling::daily(logs_dir, "parley.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

/// Resolves a `/select` or `/delete` argument: list position or session id.
async fn resolve_session_ref(chat: &ChatUseCase, reference: &str) -> String {
    if let Ok(position) = reference.parse::<usize>() {
        let sessions = chat.sessions().await;
        if let Some(session) = position.checked_sub(1).and_then(|i| sessions.get(i)) {
            return session.id.clone();
        }
    }
    reference.to_string()
}

async fn send(chat: &ChatUseCase, text: &str) {
    println!("{}", "Thinking...".bright_black());
    match chat.send(text).await {
        Ok(outcome) => {
            render::print_reply(&outcome.reply);
            if !outcome.stored {
                println!(
                    "{}",
                    "The chat was deleted before the reply arrived; it was not saved.".yellow()
                );
            }
        }
        Err(e) => render::print_error(e),
    }
}

/// Executes one command. Returns `false` when the REPL should stop.
async fn dispatch(chat: &ChatUseCase, command: Command) -> bool {
    match command {
        Command::Quit => return false,
        Command::Send(text) => send(chat, &text).await,
        Command::New => {
            chat.new_session().await;
            println!("{}", "Started a new chat.".bright_green());
        }
        Command::Sessions => {
            let current = chat.current_session_id().await;
            render::print_sessions(&chat.sessions().await, current.as_deref());
        }
        Command::Select(reference) => {
            let id = resolve_session_ref(chat, &reference).await;
            match chat.select_session(&id).await {
                Ok(()) => {
                    if let Some(session) = chat.current_session().await {
                        render::print_transcript(&session);
                    }
                }
                Err(e) => render::print_error(e),
            }
        }
        Command::Delete(reference) => {
            let id = resolve_session_ref(chat, &reference).await;
            match chat.delete_session(&id).await {
                Ok(()) => println!("{}", "Chat deleted.".bright_green()),
                Err(e) => render::print_error(e),
            }
        }
        Command::Think => {
            chat.toggle_deep_thinking().await;
            render::print_options(&chat.options().await);
        }
        Command::Search => {
            chat.toggle_web_search().await;
            render::print_options(&chat.options().await);
        }
        Command::Mode(Some(mode)) => {
            chat.set_mode(mode).await;
            render::print_options(&chat.options().await);
        }
        Command::Mode(None) => render::print_options(&chat.options().await),
        Command::Attach(paths) => {
            let report = chat.attach_files(&paths).await;
            render::print_rejections(&report.rejected);
            render::print_pending(&chat.pending_attachments().await);
        }
        Command::Detach(position) => match chat.remove_pending(position - 1).await {
            Some(attachment) => println!("{}", format!("Removed {}", attachment.name).yellow()),
            None => render::print_error(format!("No staged file #{}", position)),
        },
        Command::Pending => render::print_pending(&chat.pending_attachments().await),
        Command::Help => println!("{}", HELP.bright_black()),
        Command::Usage(usage) => println!("{}", format!("Usage: {}", usage).yellow()),
        Command::Unknown(name) => {
            println!("{}", format!("Unknown command {}. Try /help", name).bright_black())
        }
    }
    true
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let bootstrap = AppBootstrap::load(&BootstrapOptions {
        data_dir: args.data_dir,
        config_file: args.config,
    })?;
    let _log_guard = init_logging(&bootstrap.logs_dir()?, &bootstrap.config.log_level)?;
    tracing::info!("[Main] Parley starting");

    let chat = bootstrap.build_gemini_chat()?;

    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Parley ===".bright_magenta().bold());
    println!(
        "{}",
        "Type a message to chat, '/help' for commands, or 'quit' to exit.".bright_black()
    );
    render::print_options(&chat.options().await);
    if let Some(session) = chat.current_session().await {
        render::print_transcript(&session);
    }
    println!();

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let command = Command::parse(&line);
                if matches!(command, Command::Send(ref text) if text.is_empty()) {
                    // An empty line still sends when files are staged
                    if chat.pending_attachments().await.is_empty() {
                        continue;
                    }
                }

                let _ = rl.add_history_entry(line.as_str());
                if !dispatch(&chat, command).await {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                render::print_error(format!("{:?}", err));
                break;
            }
        }
    }

    tracing::info!("[Main] Parley exiting");
    Ok(())
}
