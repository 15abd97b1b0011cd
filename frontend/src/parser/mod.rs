mod core;
mod error;
mod expr;
mod stmt;


pub use self::core::Parser;
pub use self::error::{ParserError, ParserErrorKind, ParserResult};
pub use self::expr::Precedence;
