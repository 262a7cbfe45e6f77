//! Line commands understood by the terminal front end.
//!
//! The order command follows the chat format the backend's users already
//! know: `topup telkomsel 10k ke 0812xxx via qris`.

use thiserror::Error;
use topup_widget::model::{PaymentMethod, TopupRequest};

pub const USAGE: &str = "topup <provider> <nominal> ke <phone> via <method>";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Topup(TopupRequest),
    Status,
    Close,
    Open,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("Unknown command. Usage: {USAGE}")]
    Usage,

    #[error("{0}")]
    Method(String),
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((head, rest)) = parts.split_first() else {
        return Ok(None);
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "topup" => Command::Topup(parse_topup(rest)?),
        "status" | "poll" if rest.is_empty() => Command::Status,
        "close" if rest.is_empty() => Command::Close,
        "open" if rest.is_empty() => Command::Open,
        "quit" | "exit" if rest.is_empty() => Command::Quit,
        _ => return Err(CommandError::Usage),
    };
    Ok(Some(command))
}

fn parse_topup(args: &[&str]) -> Result<TopupRequest, CommandError> {
    let lower: Vec<String> = args.iter().map(|a| a.to_ascii_lowercase()).collect();
    let keywords: Vec<&str> = lower.iter().map(String::as_str).collect();

    let (phone, method) = match keywords.as_slice() {
        [_, _, "ke", _] => (args[3], None),
        [_, _, "ke", _, "via", _] => (args[3], Some(args[5])),
        [_, _, _] => (args[2], None),
        [_, _, _, _] => (args[2], Some(args[3])),
        _ => return Err(CommandError::Usage),
    };

    let request = TopupRequest::new(phone, &lower[0], &lower[1]);
    match method {
        Some(method) => {
            let method: PaymentMethod = method.parse().map_err(CommandError::Method)?;
            Ok(request.with_method(method))
        }
        None => Ok(request),
    }
}
