use crate::ast::{Expr, ExprRef, LiteralKind, Operator};
use crate::parser::core::Parser;
use crate::parser::error::{ParserError, ParserResult};
use crate::token::{Kind, Token};

/// Binding strength ladder for the expression grammar, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    None,
    Assignment,
    Equality,
    Comparison,
    Term,
    Factor,
    Unary,
    Primary,
}

impl Precedence {
    /// One step tighter. Binary operators recurse at this level on their
    /// right operand, which makes every operator left-associative.
    fn next(self) -> Precedence {
        match self {
            Precedence::None => Precedence::Assignment,
            Precedence::Assignment => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor => Precedence::Unary,
            Precedence::Unary => Precedence::Primary,
            Precedence::Primary => Precedence::Primary,
        }
    }
}

/// The binary operator a token denotes, if any. `=` is not a binary
/// operator; assignment is a statement form.
fn binary_operator(token: &Token) -> Option<Operator> {
    if token.kind != Kind::Operator {
        return None;
    }
    Operator::from_lexeme(&token.lexeme)
}

fn precedence_of(op: Operator) -> Precedence {
    match op {
        Operator::Eq | Operator::Ne => Precedence::Equality,
        Operator::Lt | Operator::Gt | Operator::Le | Operator::Ge => Precedence::Comparison,
        Operator::Add | Operator::Sub => Precedence::Term,
        Operator::Mul | Operator::Div => Precedence::Factor,
    }
}

pub(crate) fn parse_expression(p: &mut Parser) -> ParserResult<ExprRef> {
    parse_expression_prec(p, Precedence::Assignment)
}

fn parse_expression_prec(p: &mut Parser, min: Precedence) -> ParserResult<ExprRef> {
    let mut left = parse_primary(p)?;
    while let Some(op) = binary_operator(p.peek()) {
        let level = precedence_of(op);
        if level < min {
            break;
        }
        let token = p.advance();
        let right = parse_expression_prec(p, level.next())?;
        left = p.expr_pool.add(Expr::Binary(op, left, right), token.line);
    }
    Ok(left)
}

fn parse_primary(p: &mut Parser) -> ParserResult<ExprRef> {
    let token = p.peek().clone();
    let literal = match token.kind {
        Kind::Number => Some(LiteralKind::Number),
        Kind::String => Some(LiteralKind::Str),
        Kind::Boolean => Some(LiteralKind::Bool),
        _ => None,
    };
    if let Some(kind) = literal {
        p.advance();
        let symbol = p.intern(&token.lexeme);
        return Ok(p.expr_pool.add(Expr::Literal(kind, symbol), token.line));
    }
    match token.kind {
        Kind::Identifier => {
            p.advance();
            let symbol = p.intern(&token.lexeme);
            Ok(p.expr_pool.add(Expr::Identifier(symbol), token.line))
        }
        Kind::Punctuation if token.lexeme == "(" => {
            p.advance();
            let inner = parse_expression(p)?;
            p.expect_punct(")")?;
            Ok(inner)
        }
        _ => Err(ParserError::unexpected_token(
            token.line,
            "expression",
            token.lexeme,
        )),
    }
}
