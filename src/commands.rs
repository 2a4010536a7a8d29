//! Chat session commands (/mode, /clear, /save, /help, /quit).

use crate::protocol::QueryMode;
use crate::state::Action;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `None` toggles between the two modes
    SetMode(Option<QueryMode>),
    Clear,
    /// Persist the current backend URL and mode
    Save,
    Help,
    Quit,
    /// Unrecognised command or bad argument, with a message for the user
    Unknown(String),
}

impl Command {
    /// The state transition this command causes, if any
    pub fn action(&self) -> Option<Action> {
        match self {
            Command::SetMode(Some(mode)) => Some(Action::SetMode(*mode)),
            Command::SetMode(None) => Some(Action::ToggleMode),
            Command::Clear => Some(Action::ClearHistory),
            Command::Save | Command::Help | Command::Quit | Command::Unknown(_) => None,
        }
    }
}

pub const HELP_TEXT: &str = "\
Commands:
  /mode [fast|deep]  switch retrieval mode (no argument toggles)
  /clear             forget the conversation
  /save              remember the backend and mode for next time
  /help              show this help
  /quit              leave the session
Anything else is sent to the research assistant.";

/// Parse a line of input. Returns `None` when it is not a command.
pub fn parse_command(input: &str) -> Option<Command> {
    let s = input.trim();
    let cmdline = s.strip_prefix('/')?.trim();
    let mut parts = cmdline.split_whitespace();
    let cmd = parts.next().unwrap_or("").to_lowercase();

    let command = match cmd.as_str() {
        "mode" | "m" => match parts.next() {
            None => Command::SetMode(None),
            Some(arg) => match QueryMode::parse(arg) {
                Some(mode) => Command::SetMode(Some(mode)),
                None => Command::Unknown(format!("Unknown mode '{}'. Use fast or deep.", arg)),
            },
        },
        "clear" => Command::Clear,
        "save" => Command::Save,
        "help" | "h" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        "" => Command::Unknown("Empty command. Type /help for a list.".to_string()),
        other => Command::Unknown(format!("Unknown command '/{}'. Type /help for a list.", other)),
    };
    Some(command)
}
