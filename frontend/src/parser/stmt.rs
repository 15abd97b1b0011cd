use crate::ast::{Stmt, StmtRef, UpdateOp};
use crate::parser::core::Parser;
use crate::parser::error::{ParserError, ParserResult};
use crate::parser::expr::parse_expression;
use crate::token::Kind;

pub(crate) fn parse_stmt(p: &mut Parser) -> ParserResult<StmtRef> {
    let token = p.peek().clone();
    if token.kind == Kind::Identifier && token.lexeme == "console" {
        return parse_print_stmt(p);
    }
    if token.kind == Kind::Keyword {
        match token.lexeme.as_str() {
            "let" | "const" => return parse_declaration(p),
            "if" => return parse_if_stmt(p),
            "else" => return parse_else_stmt(p),
            "while" => return parse_while_stmt(p),
            "for" => return parse_for_stmt(p),
            _ => {}
        }
    }
    if token.kind == Kind::Identifier && p.peek_at(1).is_op("=") {
        return parse_assignment(p);
    }
    Err(ParserError::unexpected_token(
        token.line,
        "statement",
        token.lexeme,
    ))
}

fn parse_declaration(p: &mut Parser) -> ParserResult<StmtRef> {
    let keyword = p.advance();
    let is_const = keyword.lexeme == "const";
    let name_token = p.peek().clone();
    if name_token.kind != Kind::Identifier {
        return Err(ParserError::unexpected_token(
            name_token.line,
            "identifier",
            name_token.lexeme,
        ));
    }
    p.advance();
    p.expect_op("=")?;
    let init = parse_expression(p)?;
    p.expect_punct(";")?;
    let name = p.intern(&name_token.lexeme);
    Ok(p.stmt_pool.add(
        Stmt::VarDecl {
            name,
            is_const,
            init,
        },
        keyword.line,
    ))
}

fn parse_assignment(p: &mut Parser) -> ParserResult<StmtRef> {
    let name_token = p.advance();
    p.expect_op("=")?;
    let value = parse_expression(p)?;
    p.expect_punct(";")?;
    let target = p.intern(&name_token.lexeme);
    Ok(p.stmt_pool
        .add(Stmt::Assign { target, value }, name_token.line))
}

/// `console.log(expr);` is the only call form in the language. It takes
/// exactly one argument.
fn parse_print_stmt(p: &mut Parser) -> ParserResult<StmtRef> {
    let console = p.advance();
    p.expect_punct(".")?;
    let method = p.peek().clone();
    if method.kind != Kind::Identifier || method.lexeme != "log" {
        return Err(ParserError::unexpected_token(
            method.line,
            "'log'",
            method.lexeme,
        ));
    }
    p.advance();
    p.expect_punct("(")?;
    let arg = parse_expression(p)?;
    p.expect_punct(")")?;
    p.expect_punct(";")?;
    let callee = p.intern("console.log");
    Ok(p.stmt_pool.add(
        Stmt::Call {
            callee,
            args: vec![arg],
        },
        console.line,
    ))
}

fn parse_if_stmt(p: &mut Parser) -> ParserResult<StmtRef> {
    let keyword = p.advance();
    p.expect_punct("(")?;
    let cond = parse_expression(p)?;
    p.expect_punct(")")?;
    let then_block = parse_block(p)?;
    Ok(p.stmt_pool
        .add(Stmt::If { cond, then_block }, keyword.line))
}

fn parse_else_stmt(p: &mut Parser) -> ParserResult<StmtRef> {
    let keyword = p.advance();
    let block = parse_block(p)?;
    Ok(p.stmt_pool.add(Stmt::Else { block }, keyword.line))
}

fn parse_while_stmt(p: &mut Parser) -> ParserResult<StmtRef> {
    let keyword = p.advance();
    p.expect_punct("(")?;
    let cond = parse_expression(p)?;
    p.expect_punct(")")?;
    let body = parse_block(p)?;
    Ok(p.stmt_pool.add(Stmt::While { cond, body }, keyword.line))
}

fn parse_for_stmt(p: &mut Parser) -> ParserResult<StmtRef> {
    let keyword = p.advance();
    p.expect_punct("(")?;
    let init = parse_for_init(p)?;
    let cond = parse_expression(p)?;
    p.expect_punct(";")?;
    let update = parse_update(p)?;
    p.expect_punct(")")?;
    let body = parse_block(p)?;
    Ok(p.stmt_pool.add(
        Stmt::For {
            init,
            cond,
            update,
            body,
        },
        keyword.line,
    ))
}

// The initializer clause reuses the ordinary declaration/assignment
// parsers, so it consumes its own trailing ';'.
fn parse_for_init(p: &mut Parser) -> ParserResult<StmtRef> {
    let token = p.peek().clone();
    if token.is_keyword("let") || token.is_keyword("const") {
        return parse_declaration(p);
    }
    if token.kind == Kind::Identifier && p.peek_at(1).is_op("=") {
        return parse_assignment(p);
    }
    Err(ParserError::unexpected_token(
        token.line,
        "for-loop initializer",
        token.lexeme,
    ))
}

/// Update clause of a `for` header. Exactly two shapes are accepted,
/// three tokens each: `++i` / `--i` and `i++` / `i--`.
fn parse_update(p: &mut Parser) -> ParserResult<StmtRef> {
    let first = p.peek().clone();
    let second = p.peek_at(1).clone();
    let third = p.peek_at(2).clone();

    let update_op = |lexeme: &str| match lexeme {
        "+" => Some(UpdateOp::Increment),
        "-" => Some(UpdateOp::Decrement),
        _ => None,
    };

    if first.kind == Kind::Operator {
        let op = update_op(&first.lexeme)
            .filter(|_| second.is_op(&first.lexeme) && third.kind == Kind::Identifier)
            .ok_or_else(|| ParserError::invalid_update(first.line, first.lexeme.clone()))?;
        p.advance();
        p.advance();
        p.advance();
        let target = p.intern(&third.lexeme);
        return Ok(p.stmt_pool.add(Stmt::PreUpdate { target, op }, first.line));
    }

    if first.kind == Kind::Identifier {
        let op = update_op(&second.lexeme)
            .filter(|_| second.kind == Kind::Operator && third.lexeme == second.lexeme && third.kind == Kind::Operator)
            .ok_or_else(|| ParserError::invalid_update(first.line, second.lexeme.clone()))?;
        p.advance();
        p.advance();
        p.advance();
        let target = p.intern(&first.lexeme);
        return Ok(p.stmt_pool.add(Stmt::PostUpdate { target, op }, first.line));
    }

    Err(ParserError::invalid_update(first.line, first.lexeme))
}

fn parse_block(p: &mut Parser) -> ParserResult<StmtRef> {
    let open = p.peek().clone();
    p.expect_punct("{")?;
    let mut children = Vec::new();
    loop {
        if p.peek().kind == Kind::Eof {
            return Err(ParserError::unterminated_block(open.line));
        }
        if p.peek().is_punct("}") {
            p.advance();
            break;
        }
        children.push(parse_stmt(p)?);
    }
    Ok(p.stmt_pool.add(Stmt::Block(children), open.line))
}
