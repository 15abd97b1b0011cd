//! Frontend for a small JavaScript-like language: lexing, parsing into
//! pooled ASTs, semantic analysis, constant folding, three-address IR,
//! and a basic-block control-flow graph with dead code elimination.

pub mod ast;
pub mod cfg;
pub mod fold;
pub mod ir;
pub mod lexer;
pub mod opt;
pub mod parser;
pub mod semantic;
pub mod token;

pub use ast::{Expr, ExprPool, ExprRef, LiteralKind, Operator, Program, Stmt, StmtPool, StmtRef};
pub use parser::{Parser, ParserError, ParserResult};
pub use token::{Kind, Token};
