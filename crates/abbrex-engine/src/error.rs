use thiserror::Error;

/// Low-level consumption failure raised by the [`Scanner`](crate::scanner::Scanner).
///
/// Parsers either swallow it (speculative consumption that simply did not
/// match) or convert it into [`ExpandError::Syntax`] at the top level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at {}", .pos + 1)]
pub struct ScannerError {
    pub message: String,
    /// Zero-based character offset in the scanned string.
    pub pos: usize,
}

impl ScannerError {
    pub fn new(message: impl Into<String>, pos: usize) -> Self {
        Self {
            message: message.into(),
            pos,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    #[error("{message} at {}", .pos + 1)]
    Syntax { message: String, pos: usize },

    #[error("Invalid element name \"{name}\" at {}", .pos + 1)]
    InvalidAbbreviation { name: String, pos: usize },

    #[error("Repeat count {count} exceeds the limit of {limit}")]
    LimitExceeded { count: usize, limit: usize },

    #[error("Nesting depth {depth} exceeds the limit of {limit}")]
    DepthExceeded { depth: usize, limit: usize },

    #[error("Invalid field: {message} at {}", .pos + 1)]
    Field { message: String, pos: usize },
}

/// A syntax, profile or filter name that is not known to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind} \"{name}\"")]
pub struct UnknownName {
    pub kind: &'static str,
    pub name: String,
}

impl UnknownName {
    pub fn new(kind: &'static str, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl From<ScannerError> for ExpandError {
    fn from(err: ScannerError) -> Self {
        ExpandError::Syntax {
            message: err.message,
            pos: err.pos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scanner_error_reports_one_based_position() {
        let err = ScannerError::new("Unexpected character", 3);
        assert_eq!(err.to_string(), "Unexpected character at 4");
    }

    #[test]
    fn scanner_error_converts_to_syntax_error() {
        let err: ExpandError = ScannerError::new("Unable to consume quoted string", 0).into();
        assert_eq!(
            err,
            ExpandError::Syntax {
                message: "Unable to consume quoted string".into(),
                pos: 0
            }
        );
        assert_eq!(err.to_string(), "Unable to consume quoted string at 1");
    }

    #[test]
    fn limit_error_message() {
        let err = ExpandError::LimitExceeded {
            count: 5000,
            limit: 1000,
        };
        assert_eq!(err.to_string(), "Repeat count 5000 exceeds the limit of 1000");
    }

    #[test]
    fn unknown_name_message() {
        assert_eq!(
            UnknownName::new("syntax", "jade").to_string(),
            "Unknown syntax \"jade\""
        );
    }
}
