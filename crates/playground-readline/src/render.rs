use colored::Colorize;
use playground_core::session::{Message, MessageRole};

pub fn print_message(message: &Message) {
    match message.role {
        MessageRole::User => {
            for line in message.text.lines() {
                println!("{}", format!("> {}", line).green());
            }
        }
        MessageRole::Assistant if message.is_error => {
            for line in message.text.lines() {
                println!("{}", line.red());
            }
        }
        MessageRole::Assistant => {
            for line in message.text.lines() {
                println!("{}", line.bright_blue());
            }
        }
    }
    println!();
}

/// Numbered listing of (filtered) history, 1-based to match `/recall`.
pub fn print_history(entries: &[String], query: &str) {
    if entries.is_empty() {
        if query.trim().is_empty() {
            println!("{}", "No saved history.".bright_black());
        } else {
            println!("{}", format!("No history matches '{}'.", query.trim()).bright_black());
        }
        return;
    }

    for (i, entry) in entries.iter().enumerate() {
        let first_line = entry.lines().next().unwrap_or_default();
        let more = if entry.lines().nth(1).is_some() { " ..." } else { "" };
        println!("{} {}{}", format!("{:>3}.", i + 1).bright_black(), first_line, more);
    }
}

pub fn print_system(text: &str) {
    println!("{}", text.bright_black());
}
