//! SYI command parser.
//!
//! Parses incoming SYI protocol commands from raw text into structured
//! `Command` variants that the engine main loop can dispatch on.

/// Search constraints passed with the `go` command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    pub movetime: Option<u64>,
    pub depth: Option<u32>,
}

/// A parsed server-to-engine SYI command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Initialize the SYI protocol handshake.
    Syi,

    /// Synchronization ping; engine must reply `readyok`.
    IsReady,

    /// Set an engine option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Reset engine state for a new game.
    NewGame,

    /// Set the board from a single-line JSON document.
    Position { json: String },

    /// Pick a move for the side to act, with optional search constraints.
    Go(GoParams),

    /// Interrupt the current search.
    Stop,

    /// Terminate the engine process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let first = *tokens.first()?;

    match first {
        "syi" => Some(Command::Syi),
        "isready" => Some(Command::IsReady),
        "quit" => Some(Command::Quit),
        "newgame" => Some(Command::NewGame),
        "stop" => Some(Command::Stop),

        "setoption" => parse_setoption(&tokens),
        "position" => parse_position(trimmed),
        "go" => parse_go(&tokens),

        other => {
            log::warn!("unknown command: {}", other);
            None
        }
    }
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 3 || tokens[1] != "name" {
        log::warn!("malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    }

    let (name_parts, value_parts) = match tokens.iter().position(|&t| t == "value") {
        Some(vi) => (&tokens[2..vi], &tokens[vi + 1..]),
        None => (&tokens[2..], &tokens[tokens.len()..]),
    };
    if name_parts.is_empty() {
        log::warn!("malformed setoption: empty name");
        return None;
    }

    let name = name_parts.join(" ");
    let value = (!value_parts.is_empty()).then(|| value_parts.join(" "));
    Some(Command::SetOption { name, value })
}

/// Parses `position <json>`; the document is the rest of the line.
fn parse_position(line: &str) -> Option<Command> {
    let json = line.strip_prefix("position").unwrap_or("").trim();
    if json.is_empty() {
        log::warn!("malformed position: expected 'position <json>'");
        return None;
    }
    Some(Command::Position {
        json: json.to_string(),
    })
}

/// Parses `go [movetime <ms>] [depth <n>]`.
fn parse_go(tokens: &[&str]) -> Option<Command> {
    let mut params = GoParams::default();
    let mut i = 1;

    while i < tokens.len() {
        match tokens[i] {
            "movetime" => {
                i += 1;
                match tokens.get(i).map(|t| t.parse::<u64>()) {
                    Some(Ok(v)) => params.movetime = Some(v),
                    Some(Err(_)) => log::warn!("invalid movetime value: '{}'", tokens[i]),
                    None => log::warn!("movetime without a value"),
                }
            }
            "depth" => {
                i += 1;
                match tokens.get(i).map(|t| t.parse::<u32>()) {
                    Some(Ok(v)) => params.depth = Some(v),
                    Some(Err(_)) => log::warn!("invalid depth value: '{}'", tokens[i]),
                    None => log::warn!("depth without a value"),
                }
            }
            other => {
                log::warn!("unknown go parameter: '{}'", other);
            }
        }
        i += 1;
    }

    Some(Command::Go(params))
}
