//! Inbound text handling: normalisation, validation, and commands.
//!
//! Transports call [`parse_input`] before handing a query to the
//! coordinator, so the pipeline only ever sees trimmed, lowercased,
//! non-empty text of bounded length.

/// Help text listing example queries.
pub const HELP_TEXT: &str = "Just type your query and send!
Examples:
- c++ check if element in list
- schedule task java
- binary search go
- docker set env
";

/// Reasons a raw query is rejected before resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Please provide your query in plaintext.")]
    Empty,

    #[error("Your request is too long.")]
    TooLong {
        /// Normalised length in bytes.
        len: usize,
        /// Configured maximum.
        max: usize,
    },
}

/// Classified inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A normalised question for the resolver.
    Query(String),
    /// `/help`.
    Help,
    /// Any other `/command`, lowercased without the slash.
    UnknownCommand(String),
}

/// Trim and lowercase `raw`, rejecting empty or oversized text.
pub fn normalize_query(raw: &str, max_len: usize) -> Result<String, QueryError> {
    let query = raw.trim().to_lowercase();
    if query.is_empty() {
        return Err(QueryError::Empty);
    }
    if query.len() > max_len {
        return Err(QueryError::TooLong {
            len: query.len(),
            max: max_len,
        });
    }
    Ok(query)
}

/// Classify `raw` as a command or a normalised query.
pub fn parse_input(raw: &str, max_len: usize) -> Result<Input, QueryError> {
    let trimmed = raw.trim();
    if let Some(command) = trimmed.strip_prefix('/') {
        let name = command
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();
        return Ok(match name.as_str() {
            "help" | "start" => Input::Help,
            _ => Input::UnknownCommand(name),
        });
    }
    normalize_query(trimmed, max_len).map(Input::Query)
}
