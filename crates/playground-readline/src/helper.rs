use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::commands::COMMANDS;

/// Rustyline helper for the chat view: completes slash command names and
/// hints the rest of the name plus its argument synopsis.
#[derive(Clone)]
pub struct CliHelper {
    commands: Vec<(&'static str, &'static str)>,
}

impl CliHelper {
    pub fn new() -> Self {
        Self {
            commands: COMMANDS.to_vec(),
        }
    }

    /// Commands whose name starts with the partially typed `word`.
    fn matching<'a>(&'a self, word: &'a str) -> impl Iterator<Item = &'a (&'static str, &'static str)> {
        self.commands
            .iter()
            .filter(move |(name, _)| word.starts_with('/') && name.starts_with(word))
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
        if line.contains(char::is_whitespace) {
            return Ok((0, vec![]));
        }

        let candidates = self
            .matching(line)
            .map(|(name, synopsis)| Pair {
                display: format!("{name}{synopsis}"),
                replacement: name.to_string(),
            })
            .collect();
        Ok((0, candidates))
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

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() || line.contains(char::is_whitespace) {
            return None;
        }

        let mut matches = self.matching(line);
        let (name, synopsis) = matches.next()?;
        // Only hint once the prefix is unambiguous.
        if matches.next().is_some() {
            return None;
        }
        Some(format!("{}{}", &name[line.len()..], synopsis))
    }
}

impl Validator for CliHelper {}
