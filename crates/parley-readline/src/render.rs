//! Terminal rendering of sessions and messages.

use chrono::{DateTime, Local};
use colored::Colorize;
use parley_core::attachment::{Attachment, AttachmentRejection};
use parley_core::chat::{ChatOptions, RemoteReply};
use parley_core::session::{GroundingUrl, Message, MessageRole, Session};

fn format_time(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn print_options(options: &ChatOptions) {
    let on_off = |flag: bool| if flag { "on".green() } else { "off".bright_black() };
    println!(
        "{} thinking: {}  search: {}  mode: {}",
        "[options]".bright_black(),
        on_off(options.deep_thinking),
        on_off(options.web_search),
        options.mode.to_string().bright_cyan()
    );
}

pub fn print_sessions(sessions: &[Session], current: Option<&str>) {
    if sessions.is_empty() {
        println!("{}", "No chats yet. Type a message to start one.".bright_black());
        return;
    }

    for (index, session) in sessions.iter().enumerate() {
        let marker = if Some(session.id.as_str()) == current { "*" } else { " " };
        println!(
            "{} {:>2}. {}  {}",
            marker.bright_green(),
            index + 1,
            session.title.bold(),
            format!(
                "({} messages, {})",
                session.messages.len(),
                format_time(session.created_at)
            )
            .bright_black()
        );
    }
}

pub fn print_transcript(session: &Session) {
    println!("{}", format!("=== {} ===", session.title).bright_magenta().bold());
    for message in &session.messages {
        print_message(message);
    }
}

fn print_message(message: &Message) {
    match message.role {
        MessageRole::User => {
            for attachment in message.attachments() {
                println!("{}", format!("  [file] {}", attachment.name).yellow());
            }
            if !message.content.is_empty() {
                println!("{}", format!("> {}", message.content).green());
            }
        }
        MessageRole::Assistant => {
            print_body(
                &message.content,
                message.thinking.as_deref(),
                message.grounding_urls.as_deref().unwrap_or_default(),
            );
        }
    }
    println!();
}

pub fn print_reply(reply: &RemoteReply) {
    print_body(&reply.text, reply.thinking.as_deref(), &reply.citations);
}

fn print_body(text: &str, thinking: Option<&str>, citations: &[GroundingUrl]) {
    if let Some(thinking) = thinking {
        println!("{}", "[thinking]".bright_black());
        for line in thinking.lines() {
            println!("{}", line.bright_black().italic());
        }
    }
    for line in text.lines() {
        println!("{}", line.bright_blue());
    }
    if !citations.is_empty() {
        println!("{}", "Sources:".cyan());
        for (index, citation) in citations.iter().enumerate() {
            println!(
                "{}",
                format!("  [{}] {} - {}", index + 1, citation.title, citation.uri).cyan()
            );
        }
    }
}

pub fn print_pending(attachments: &[Attachment]) {
    if attachments.is_empty() {
        println!("{}", "No staged files.".bright_black());
        return;
    }
    for (index, attachment) in attachments.iter().enumerate() {
        println!(
            "{}",
            format!("  {}. {} ({})", index + 1, attachment.name, attachment.mime_type).yellow()
        );
    }
}

pub fn print_rejections(rejections: &[AttachmentRejection]) {
    for rejection in rejections {
        eprintln!("{}", rejection.to_string().red());
    }
}

pub fn print_error(message: impl std::fmt::Display) {
    eprintln!("{}", format!("Error: {}", message).red());
}
