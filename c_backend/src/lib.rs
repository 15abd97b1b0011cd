//! C source backend. Walks the checked AST and prints a single `main`
//! translation unit: declarations first (types from the semantic table),
//! then the statements in direct style. Bodies of `else` statements are
//! dropped, matching the IR lowering.

use std::fmt::{self, Write as _};

use frontend::ast::{Expr, ExprRef, LiteralKind, Operator, Program, Stmt, StmtRef};
use frontend::semantic::{SemType, TypeTable};

#[derive(Debug)]
pub struct CGenError(fmt::Error);

impl fmt::Display for CGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c code generation failed: {}", self.0)
    }
}

impl std::error::Error for CGenError {}

impl From<fmt::Error> for CGenError {
    fn from(err: fmt::Error) -> Self {
        CGenError(err)
    }
}

pub struct CSourceGenerator<'a> {
    program: &'a Program,
    types: &'a TypeTable,
    output: String,
}

impl<'a> CSourceGenerator<'a> {
    pub fn new(program: &'a Program, types: &'a TypeTable) -> Self {
        CSourceGenerator {
            program,
            types,
            output: String::new(),
        }
    }

    pub fn generate(mut self) -> Result<String, CGenError> {
        self.output.push_str("#include <stdio.h>\n");
        self.output.push_str("#include <stdbool.h>\n\n");
        self.output.push_str("int main() {\n");
        self.emit_declarations()?;
        for s in &self.program.statements {
            self.emit_stmt(*s, 1)?;
        }
        self.output.push_str("    return 0;\n");
        self.output.push_str("}\n");
        Ok(self.output)
    }

    /// Hoists every top-level variable to a typed declaration at the top
    /// of `main`. Loop variables declared in a `for` header are hoisted
    /// too, always as `int`.
    fn emit_declarations(&mut self) -> Result<(), CGenError> {
        for s in &self.program.statements {
            match self.program.stmt_pool.get(*s).clone() {
                Stmt::VarDecl { name, .. } => {
                    let text = self.program.resolve(name).to_string();
                    match self.types.get(name) {
                        SemType::String => writeln!(self.output, "    char *{text};")?,
                        SemType::Boolean => writeln!(self.output, "    bool {text};")?,
                        _ => writeln!(self.output, "    int {text};")?,
                    }
                }
                Stmt::For { init, .. } => {
                    if let Stmt::VarDecl { name, .. } = self.program.stmt_pool.get(init) {
                        let text = self.program.resolve(*name).to_string();
                        writeln!(self.output, "    int {text};")?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn emit_stmt(&mut self, s: StmtRef, indent: usize) -> Result<(), CGenError> {
        let pad = "    ".repeat(indent);
        match self.program.stmt_pool.get(s).clone() {
            // Blocks are opened inline after the controlling statement;
            // children sit at this indent, the brace closes one out.
            Stmt::Block(children) => {
                self.output.push_str("{\n");
                for c in children {
                    self.emit_stmt(c, indent)?;
                }
                writeln!(self.output, "{}}}", "    ".repeat(indent - 1))?;
            }
            Stmt::VarDecl { name, init, .. } => {
                write!(self.output, "{pad}{} = ", self.program.resolve(name))?;
                self.emit_expr(init)?;
                self.output.push_str(";\n");
            }
            Stmt::Assign { target, value } => {
                write!(self.output, "{pad}{} = ", self.program.resolve(target))?;
                self.emit_expr(value)?;
                self.output.push_str(";\n");
            }
            Stmt::If { cond, then_block } => {
                write!(self.output, "{pad}if (")?;
                self.emit_expr(cond)?;
                self.output.push_str(") ");
                self.emit_stmt(then_block, indent + 1)?;
            }
            Stmt::Else { .. } => {}
            Stmt::While { cond, body } => {
                write!(self.output, "{pad}while (")?;
                self.emit_expr(cond)?;
                self.output.push_str(") ");
                self.emit_stmt(body, indent + 1)?;
            }
            Stmt::For {
                init,
                cond,
                update,
                body,
            } => {
                write!(self.output, "{pad}for (")?;
                self.emit_for_init(init)?;
                self.output.push_str("; ");
                self.emit_expr(cond)?;
                self.output.push_str("; ");
                self.emit_for_update(update)?;
                self.output.push_str(") ");
                self.emit_stmt(body, indent + 1)?;
            }
            Stmt::Call { args, .. } => {
                let conversion = match args.first().map(|a| self.expr_type(*a)) {
                    Some(SemType::String) => "%s",
                    _ => "%d",
                };
                write!(self.output, "{pad}printf(\"{conversion}\\n\", ")?;
                if let Some(arg) = args.first() {
                    self.emit_expr(*arg)?;
                }
                self.output.push_str(");\n");
            }
            // Updates only occur inside for headers.
            Stmt::PreUpdate { .. } | Stmt::PostUpdate { .. } => {}
        }
        Ok(())
    }

    fn emit_for_init(&mut self, s: StmtRef) -> Result<(), CGenError> {
        match self.program.stmt_pool.get(s).clone() {
            Stmt::VarDecl { name, init, .. } | Stmt::Assign {
                target: name,
                value: init,
            } => {
                write!(self.output, "{} = ", self.program.resolve(name))?;
                self.emit_expr(init)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn emit_for_update(&mut self, s: StmtRef) -> Result<(), CGenError> {
        match self.program.stmt_pool.get(s) {
            Stmt::PreUpdate { target, op } => {
                let name = self.program.resolve(*target);
                write!(self.output, "{}{name}", op.symbol())?;
            }
            Stmt::PostUpdate { target, op } => {
                let name = self.program.resolve(*target);
                write!(self.output, "{name}{}", op.symbol())?;
            }
            _ => {}
        }
        Ok(())
    }

    fn emit_expr(&mut self, e: ExprRef) -> Result<(), CGenError> {
        match self.program.expr_pool.get(e).clone() {
            Expr::Literal(LiteralKind::Number, symbol) => {
                let text = self.program.resolve(symbol).to_string();
                self.output.push_str(&to_decimal(&text));
            }
            Expr::Literal(LiteralKind::Str, symbol) => {
                write!(self.output, "\"{}\"", self.program.resolve(symbol))?;
            }
            Expr::Literal(LiteralKind::Bool, symbol) => {
                let value = if self.program.resolve(symbol) == "true" {
                    "1"
                } else {
                    "0"
                };
                self.output.push_str(value);
            }
            Expr::Identifier(symbol) => {
                write!(self.output, "{}", self.program.resolve(symbol))?;
            }
            Expr::Binary(op, left, right) => {
                self.output.push('(');
                self.emit_expr(left)?;
                write!(self.output, " {} ", c_operator(op))?;
                self.emit_expr(right)?;
                self.output.push(')');
            }
        }
        Ok(())
    }

    /// Static type of an expression for printf formatting. A binary
    /// expression takes the type of its left operand.
    fn expr_type(&self, e: ExprRef) -> SemType {
        match self.program.expr_pool.get(e) {
            Expr::Literal(LiteralKind::Number, _) => SemType::Number,
            Expr::Literal(LiteralKind::Str, _) => SemType::String,
            Expr::Literal(LiteralKind::Bool, _) => SemType::Boolean,
            Expr::Identifier(symbol) => self.types.get(*symbol),
            Expr::Binary(_, left, _) => self.expr_type(*left),
        }
    }
}

fn c_operator(op: Operator) -> &'static str {
    match op {
        Operator::Eq => "==",
        Operator::Ne => "!=",
        other => other.symbol(),
    }
}

/// Rewrites hex and binary literals to plain decimal. Anything that does
/// not parse passes through untouched.
fn to_decimal(text: &str) -> String {
    let parsed = if let Some(rest) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        i64::from_str_radix(rest, 16).ok()
    } else if let Some(rest) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        i64::from_str_radix(rest, 2).ok()
    } else {
        None
    };
    match parsed {
        Some(value) => value.to_string(),
        None => text.to_string(),
    }
}
