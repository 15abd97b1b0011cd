use std::fmt;

use crate::semantic::context::SemType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticErrorKind {
    UndeclaredIdentifier {
        name: String,
    },
    DuplicateDeclaration {
        name: String,
    },
    TypeMismatchOperation {
        operator: &'static str,
        left: SemType,
        right: SemType,
    },
    AssignTypeMismatch {
        expected: SemType,
        actual: SemType,
    },
    ConstViolation {
        name: String,
    },
    InvalidUpdateTarget {
        name: String,
        ty: SemType,
    },
    ScopeDepthExceeded {
        limit: usize,
    },
    TooManySymbols {
        limit: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    pub line: u32,
}

impl SemanticError {
    pub fn new(kind: SemanticErrorKind, line: u32) -> Self {
        SemanticError { kind, line }
    }
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: ", self.line)?;
        match &self.kind {
            SemanticErrorKind::UndeclaredIdentifier { name } => {
                write!(f, "'{name}' not declared")
            }
            SemanticErrorKind::DuplicateDeclaration { name } => {
                write!(f, "redeclaration of '{name}'")
            }
            SemanticErrorKind::TypeMismatchOperation {
                operator,
                left,
                right,
            } => {
                write!(f, "operator '{operator}' not valid for {left} and {right}")
            }
            SemanticErrorKind::AssignTypeMismatch { expected, actual } => {
                write!(f, "cannot assign {actual} to {expected}")
            }
            SemanticErrorKind::ConstViolation { name } => {
                write!(f, "cannot modify const '{name}'")
            }
            SemanticErrorKind::InvalidUpdateTarget { name, ty } => {
                write!(f, "update operator requires number, '{name}' is {ty}")
            }
            SemanticErrorKind::ScopeDepthExceeded { limit } => {
                write!(f, "scope nesting too deep (limit {limit})")
            }
            SemanticErrorKind::TooManySymbols { limit } => {
                write!(f, "too many symbols in scope (limit {limit})")
            }
        }
    }
}

impl std::error::Error for SemanticError {}
