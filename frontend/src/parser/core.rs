use string_interner::{DefaultStringInterner, DefaultSymbol};

use crate::ast::{ExprPool, Program, StmtPool};
use crate::parser::error::{ParserError, ParserResult};
use crate::parser::stmt;
use crate::token::{Kind, Token};

const INITIAL_POOL_CAPACITY: usize = 256;

/// Recursive-descent parser over a pre-lexed token stream. Each parser
/// owns its own pools and interner; `parse_program` hands them off in
/// the returned [`Program`].
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    pub(crate) stmt_pool: StmtPool,
    pub(crate) expr_pool: ExprPool,
    pub(crate) interner: DefaultStringInterner,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        // Comments carry no syntax; drop them up front.
        tokens.retain(|t| t.kind != Kind::Comment);
        if tokens.last().map(|t| t.kind) != Some(Kind::Eof) {
            let line = tokens.last().map(|t| t.line).unwrap_or(1);
            tokens.push(Token::eof(line));
        }
        Parser {
            tokens,
            pos: 0,
            stmt_pool: StmtPool::with_capacity(INITIAL_POOL_CAPACITY),
            expr_pool: ExprPool::with_capacity(INITIAL_POOL_CAPACITY),
            interner: DefaultStringInterner::new(),
        }
    }

    pub fn parse_program(mut self) -> ParserResult<Program> {
        let mut statements = Vec::new();
        while !self.at_end() {
            let s = stmt::parse_stmt(&mut self)?;
            statements.push(s);
        }
        Ok(Program {
            statements,
            stmt_pool: self.stmt_pool,
            expr_pool: self.expr_pool,
            interner: self.interner,
        })
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_at(&self, offset: usize) -> &Token {
        let index = self.pos + offset;
        &self.tokens[index.min(self.tokens.len() - 1)]
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// True once the stream hits `Eof` or a lexer `Error` token. Both
    /// terminate parsing.
    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek().kind, Kind::Eof | Kind::Error)
    }

    pub(crate) fn expect_punct(&mut self, punct: &'static str) -> ParserResult<()> {
        if self.peek().is_punct(punct) {
            self.pos += 1;
            Ok(())
        } else {
            let found = self.peek();
            Err(ParserError::missing_punctuation(
                found.line,
                punct,
                found.lexeme.clone(),
            ))
        }
    }

    pub(crate) fn expect_op(&mut self, op: &'static str) -> ParserResult<()> {
        if self.peek().is_op(op) {
            self.pos += 1;
            Ok(())
        } else {
            let found = self.peek();
            Err(ParserError::unexpected_token(
                found.line,
                format!("'{op}'"),
                found.lexeme.clone(),
            ))
        }
    }

    pub(crate) fn intern(&mut self, text: &str) -> DefaultSymbol {
        self.interner.get_or_intern(text)
    }
}
