//! Slash commands of the chat view.

/// Everything a line typed in the chat view can mean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Plain text to send.
    Send(String),
    /// `/history [query]` - list (filtered) history.
    History(String),
    /// `/save [text]` - save text, or the current input, to the history.
    Save(Option<String>),
    /// `/clear-history`
    ClearHistory,
    /// `/recall <n>` - 1-based index into the last listed history.
    Recall(usize),
    Logout,
    Quit,
    Help,
    /// Unknown command or bad arguments, with a hint for the user.
    Invalid(String),
}

/// Command names with their argument synopsis, for completion and hints.
pub const COMMANDS: [(&str, &str); 8] = [
    ("/history", " [query]"),
    ("/save", " [text]"),
    ("/clear-history", ""),
    ("/recall", " <n>"),
    ("/logout", ""),
    ("/quit", ""),
    ("/exit", ""),
    ("/help", ""),
];

pub const HELP: &str = "\
/history [query]   list prompt history, optionally filtered
/save [text]       save text (or the current input) to the history
/clear-history     remove every history entry
/recall <n>        load entry n of the last listing into the input line
/logout            log out and return to the login prompt
/quit              exit
Lines ending in '\\' continue on the next line.";

impl ChatCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if !trimmed.starts_with('/') {
            return ChatCommand::Send(line.to_string());
        }

        let (name, args) = match trimmed.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (trimmed, ""),
        };

        match name {
            "/history" => ChatCommand::History(args.to_string()),
            "/save" if args.is_empty() => ChatCommand::Save(None),
            "/save" => ChatCommand::Save(Some(args.to_string())),
            "/clear-history" => ChatCommand::ClearHistory,
            "/recall" => match args.parse::<usize>() {
                Ok(n) if n > 0 => ChatCommand::Recall(n),
                _ => ChatCommand::Invalid("usage: /recall <n> (n starts at 1)".to_string()),
            },
            "/logout" => ChatCommand::Logout,
            "/quit" | "/exit" => ChatCommand::Quit,
            "/help" => ChatCommand::Help,
            other => ChatCommand::Invalid(format!("unknown command {other}, try /help")),
        }
    }
}
