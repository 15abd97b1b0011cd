use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserErrorKind {
    UnexpectedToken { expected: String, found: String },
    MissingPunctuation { expected: &'static str, found: String },
    UnterminatedBlock,
    InvalidUpdateExpression { found: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserError {
    pub kind: ParserErrorKind,
    pub line: u32,
}

impl ParserError {
    pub fn unexpected_token(line: u32, expected: impl Into<String>, found: impl Into<String>) -> Self {
        ParserError {
            kind: ParserErrorKind::UnexpectedToken {
                expected: expected.into(),
                found: found.into(),
            },
            line,
        }
    }

    pub fn missing_punctuation(line: u32, expected: &'static str, found: impl Into<String>) -> Self {
        ParserError {
            kind: ParserErrorKind::MissingPunctuation {
                expected,
                found: found.into(),
            },
            line,
        }
    }

    pub fn unterminated_block(line: u32) -> Self {
        ParserError {
            kind: ParserErrorKind::UnterminatedBlock,
            line,
        }
    }

    pub fn invalid_update(line: u32, found: impl Into<String>) -> Self {
        ParserError {
            kind: ParserErrorKind::InvalidUpdateExpression {
                found: found.into(),
            },
            line,
        }
    }
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: ", self.line)?;
        match &self.kind {
            ParserErrorKind::UnexpectedToken { expected, found } => {
                write!(f, "expected {expected}, found '{found}'")
            }
            ParserErrorKind::MissingPunctuation { expected, found } => {
                write!(f, "expected '{expected}', found '{found}'")
            }
            ParserErrorKind::UnterminatedBlock => {
                write!(f, "unterminated block, missing '}}'")
            }
            ParserErrorKind::InvalidUpdateExpression { found } => {
                write!(f, "invalid update expression near '{found}'")
            }
        }
    }
}

impl std::error::Error for ParserError {}

pub type ParserResult<T> = Result<T, ParserError>;
