//! Parsing of REPL input lines.

use parley_core::chat::ChatMode;
use std::path::PathBuf;

/// Slash commands offered for completion.
pub const COMMANDS: &[&str] = &[
    "/new", "/sessions", "/select", "/delete", "/think", "/search", "/mode", "/attach", "/detach",
    "/pending", "/help",
];

pub const HELP: &str = "\
/new                 start a new chat
/sessions            list chats (newest first)
/select <n|id>       switch to a chat
/delete <n|id>       delete a chat
/think               toggle deep thinking
/search              toggle web search
/mode [name]         show or set the assistant mode (general, study, math, research)
/attach <path>...    stage files for the next message
/detach <n>          unstage a file
/pending             list staged files
quit                 exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Free text sent to the assistant
    Send(String),
    New,
    Sessions,
    /// Session reference: list position (1-based) or id
    Select(String),
    Delete(String),
    Think,
    Search,
    Mode(Option<ChatMode>),
    Attach(Vec<PathBuf>),
    /// 1-based position in the staging list
    Detach(usize),
    Pending,
    Help,
    Quit,
    /// Recognized command with bad arguments
    Usage(&'static str),
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed == "quit" || trimmed == "exit" {
            return Command::Quit;
        }
        if !trimmed.starts_with('/') {
            return Command::Send(trimmed.to_string());
        }

        let (name, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (trimmed, ""),
        };

        match name {
            "/new" => Command::New,
            "/sessions" => Command::Sessions,
            "/select" if !rest.is_empty() => Command::Select(rest.to_string()),
            "/select" => Command::Usage("/select <n|id>"),
            "/delete" if !rest.is_empty() => Command::Delete(rest.to_string()),
            "/delete" => Command::Usage("/delete <n|id>"),
            "/think" => Command::Think,
            "/search" => Command::Search,
            "/mode" if rest.is_empty() => Command::Mode(None),
            "/mode" => match rest.parse::<ChatMode>() {
                Ok(mode) => Command::Mode(Some(mode)),
                Err(_) => Command::Usage("/mode [general|study|math|research]"),
            },
            "/attach" => {
                let paths: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
                if paths.is_empty() {
                    Command::Usage("/attach <path>...")
                } else {
                    Command::Attach(paths)
                }
            }
            "/detach" => match rest.parse::<usize>() {
                Ok(n) if n > 0 => Command::Detach(n),
                _ => Command::Usage("/detach <n>"),
            },
            "/pending" => Command::Pending,
            "/help" => Command::Help,
            other => Command::Unknown(other.to_string()),
        }
    }
}
