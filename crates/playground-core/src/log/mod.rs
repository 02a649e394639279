//! Bounded logs.
//!
//! Pure functions over the message log and the prompt history. Each
//! mutation consumes the old log and returns the new one; persisting the
//! result is the caller's job.
//!
//! - Message log: chronological, capped at the back, oldest evicted from the front.
//! - History: most recent first, no duplicates, oldest evicted from the back.

use crate::session::{Message, OutgoingMessage};

/// Appends `entry` and keeps only the most recent `max` messages.
pub fn append_message(mut log: Vec<Message>, entry: Message, max: usize) -> Vec<Message> {
    log.push(entry);
    cap_messages(log, max)
}

/// Drops the oldest messages until at most `max` remain.
pub fn cap_messages(mut log: Vec<Message>, max: usize) -> Vec<Message> {
    if log.len() > max {
        let excess = log.len() - max;
        log.drain(..excess);
    }
    log
}

/// Records `text` as the most recently used prompt.
///
/// Blank input is a no-op. An equal entry already in the log is moved to
/// the front instead of duplicated.
pub fn push_history(mut log: Vec<String>, text: &str, max: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return log;
    }

    log.retain(|entry| entry != text);
    log.insert(0, text.to_string());
    log.truncate(max);
    log
}

/// Restores the history invariants on a log read from storage.
pub fn normalize_history(log: Vec<String>, max: usize) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(log.len().min(max));
    for entry in log {
        let entry = entry.trim();
        if entry.is_empty() || normalized.iter().any(|seen| seen == entry) {
            continue;
        }
        normalized.push(entry.to_string());
        if normalized.len() == max {
            break;
        }
    }
    normalized
}

/// Case-insensitive substring filter that keeps the log order.
///
/// An empty (or blank) query returns every entry.
pub fn filter_history<'a>(log: &'a [String], query: &str) -> Vec<&'a str> {
    let query = query.trim().to_lowercase();
    log.iter()
        .map(String::as_str)
        .filter(|entry| query.is_empty() || entry.to_lowercase().contains(&query))
        .collect()
}

/// The trailing `max` messages, projected to their wire shape.
pub fn build_outgoing_history(messages: &[Message], max: usize) -> Vec<OutgoingMessage> {
    let start = messages.len().saturating_sub(max);
    messages[start..].iter().map(OutgoingMessage::from).collect()
}
