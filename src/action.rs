//! Normalization of typed commands.
//!
//! Users type abbreviations (`a`, `e`, `c`, `s`, `q`) and synonyms (`new`,
//! `n`, `display`, `disp`, `d`, `exit`, `x`) for the five canonical actions.
//! The command word is matched case-insensitively; whatever follows it is the
//! argument and keeps its case.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static COMMAND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^(?P<verb>\S+)(?:\s+(?P<arg>.*))?$").expect("valid command regex"));

/// A canonical action with its optional argument.
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum Action {
    /// Append the argument, or prompt for items until a blank line.
    Add(Option<String>),
    /// Edit the numbered item, or prompt for numbers until a blank line.
    Edit(Option<String>),
    Show,
    /// Delete the numbered item, or prompt for one number.
    Complete(Option<String>),
    Quit,
    /// Not a recognised command; holds the trimmed input.
    Unknown(String),
}

impl Action {
    /// Canonical string form, e.g. `add Buy milk`.
    pub fn canonical(&self) -> String {
        fn with_arg(verb: &str, arg: &Option<String>) -> String {
            match arg {
                Some(arg) => format!("{} {}", verb, arg),
                None => verb.to_string(),
            }
        }
        match self {
            Action::Add(arg) => with_arg("add", arg),
            Action::Edit(arg) => with_arg("edit", arg),
            Action::Show => "show".to_string(),
            Action::Complete(arg) => with_arg("complete", arg),
            Action::Quit => "quit".to_string(),
            Action::Unknown(raw) => raw.to_lowercase(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Maps a typed line to its canonical action.
pub fn normalize_action(input: &str) -> Action {
    let trimmed = input.trim();
    let caps = match COMMAND_RE.captures(trimmed) {
        Some(caps) => caps,
        None => return Action::Unknown(trimmed.to_string()),
    };
    let verb = caps["verb"].to_lowercase();
    let arg = caps
        .name("arg")
        .map(|m| m.as_str().trim())
        .filter(|a| !a.is_empty())
        .map(str::to_string);

    match (verb.as_str(), arg) {
        ("add" | "a" | "new" | "n", arg) => Action::Add(arg),
        ("edit" | "e", arg) => Action::Edit(arg),
        ("complete" | "c", arg) => Action::Complete(arg),
        ("show" | "s" | "display" | "disp" | "d", None) => Action::Show,
        ("quit" | "q" | "exit" | "x", None) => Action::Quit,
        _ => Action::Unknown(trimmed.to_string()),
    }
}
