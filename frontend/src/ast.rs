use std::fmt::Write as _;

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Index into an [`ExprPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprRef(pub u32);

/// Index into a [`StmtPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StmtRef(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Number,
    Str,
    Bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "===",
            Operator::Ne => "!==",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Ge => ">=",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
        }
    }

    pub fn from_lexeme(lexeme: &str) -> Option<Operator> {
        let op = match lexeme {
            "===" => Operator::Eq,
            "!==" => Operator::Ne,
            "<" => Operator::Lt,
            ">" => Operator::Gt,
            "<=" => Operator::Le,
            ">=" => Operator::Ge,
            "+" => Operator::Add,
            "-" => Operator::Sub,
            "*" => Operator::Mul,
            "/" => Operator::Div,
            _ => return None,
        };
        Some(op)
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Operator::Add | Operator::Sub | Operator::Mul | Operator::Div
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

impl UpdateOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UpdateOp::Increment => "++",
            UpdateOp::Decrement => "--",
        }
    }
}

/// Expression node. Literal payloads keep the raw lexeme text interned,
/// so `0x1F` and `"hi"` survive exactly as written.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(LiteralKind, DefaultSymbol),
    Identifier(DefaultSymbol),
    Binary(Operator, ExprRef, ExprRef),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Block(Vec<StmtRef>),
    VarDecl {
        name: DefaultSymbol,
        is_const: bool,
        init: ExprRef,
    },
    Assign {
        target: DefaultSymbol,
        value: ExprRef,
    },
    /// `else` is parsed as a standalone sibling statement; nothing ties it
    /// back to the `if` that precedes it.
    If {
        cond: ExprRef,
        then_block: StmtRef,
    },
    Else {
        block: StmtRef,
    },
    While {
        cond: ExprRef,
        body: StmtRef,
    },
    For {
        init: StmtRef,
        cond: ExprRef,
        update: StmtRef,
        body: StmtRef,
    },
    Call {
        callee: DefaultSymbol,
        args: Vec<ExprRef>,
    },
    PreUpdate {
        target: DefaultSymbol,
        op: UpdateOp,
    },
    PostUpdate {
        target: DefaultSymbol,
        op: UpdateOp,
    },
}

#[derive(Debug, Default)]
pub struct ExprPool {
    nodes: Vec<Expr>,
    lines: Vec<u32>,
}

impl ExprPool {
    pub fn new() -> Self {
        ExprPool::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ExprPool {
            nodes: Vec::with_capacity(capacity),
            lines: Vec::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, expr: Expr, line: u32) -> ExprRef {
        let index = self.nodes.len() as u32;
        self.nodes.push(expr);
        self.lines.push(line);
        ExprRef(index)
    }

    pub fn get(&self, r: ExprRef) -> &Expr {
        &self.nodes[r.0 as usize]
    }

    pub fn set(&mut self, r: ExprRef, expr: Expr) {
        self.nodes[r.0 as usize] = expr;
    }

    pub fn line(&self, r: ExprRef) -> u32 {
        self.lines[r.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct StmtPool {
    nodes: Vec<Stmt>,
    lines: Vec<u32>,
}

impl StmtPool {
    pub fn new() -> Self {
        StmtPool::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        StmtPool {
            nodes: Vec::with_capacity(capacity),
            lines: Vec::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, stmt: Stmt, line: u32) -> StmtRef {
        let index = self.nodes.len() as u32;
        self.nodes.push(stmt);
        self.lines.push(line);
        StmtRef(index)
    }

    pub fn get(&self, r: StmtRef) -> &Stmt {
        &self.nodes[r.0 as usize]
    }

    pub fn set(&mut self, r: StmtRef, stmt: Stmt) {
        self.nodes[r.0 as usize] = stmt;
    }

    pub fn line(&self, r: StmtRef) -> u32 {
        self.lines[r.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Parsed program: the top-level statement list plus the pools and the
/// interner every symbol in the tree resolves through. Each program owns
/// its pools outright.
#[derive(Debug)]
pub struct Program {
    pub statements: Vec<StmtRef>,
    pub stmt_pool: StmtPool,
    pub expr_pool: ExprPool,
    pub interner: DefaultStringInterner,
}

impl Program {
    pub fn resolve(&self, symbol: DefaultSymbol) -> &str {
        self.interner.resolve(symbol).unwrap_or("<unknown>")
    }

    /// Indented tree dump of the whole program, one node per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for s in &self.statements {
            self.dump_stmt(&mut out, *s, 0);
        }
        out
    }

    fn dump_stmt(&self, out: &mut String, s: StmtRef, depth: usize) {
        let pad = "  ".repeat(depth);
        match self.stmt_pool.get(s) {
            Stmt::Block(children) => {
                let _ = writeln!(out, "{pad}Block");
                for c in children {
                    self.dump_stmt(out, *c, depth + 1);
                }
            }
            Stmt::VarDecl { name, init, .. } => {
                let _ = writeln!(out, "{pad}Assign");
                let _ = writeln!(out, "{pad}  VarDecl({})", self.resolve(*name));
                self.dump_expr(out, *init, depth + 1);
            }
            Stmt::Assign { target, value } => {
                let _ = writeln!(out, "{pad}Assign");
                let _ = writeln!(out, "{pad}  Identifier({})", self.resolve(*target));
                self.dump_expr(out, *value, depth + 1);
            }
            Stmt::If { cond, then_block } => {
                let _ = writeln!(out, "{pad}IfStmt");
                self.dump_expr(out, *cond, depth + 1);
                self.dump_stmt(out, *then_block, depth + 1);
            }
            Stmt::Else { block } => {
                let _ = writeln!(out, "{pad}ElseStmt");
                self.dump_stmt(out, *block, depth + 1);
            }
            Stmt::While { cond, body } => {
                let _ = writeln!(out, "{pad}WhileStmt");
                self.dump_expr(out, *cond, depth + 1);
                self.dump_stmt(out, *body, depth + 1);
            }
            Stmt::For {
                init,
                cond,
                update,
                body,
            } => {
                let _ = writeln!(out, "{pad}ForStmt");
                let _ = writeln!(out, "{pad}  Init:");
                self.dump_stmt(out, *init, depth + 2);
                let _ = writeln!(out, "{pad}  Condition:");
                self.dump_expr(out, *cond, depth + 2);
                let _ = writeln!(out, "{pad}  Update:");
                self.dump_stmt(out, *update, depth + 2);
                let _ = writeln!(out, "{pad}  Body:");
                self.dump_stmt(out, *body, depth + 2);
            }
            Stmt::Call { callee, args } => {
                let _ = writeln!(out, "{pad}FuncCall({})", self.resolve(*callee));
                for a in args {
                    self.dump_expr(out, *a, depth + 1);
                }
            }
            Stmt::PreUpdate { target, op } => {
                let _ = writeln!(
                    out,
                    "{pad}PreUpdate({}{})",
                    op.symbol(),
                    self.resolve(*target)
                );
            }
            Stmt::PostUpdate { target, op } => {
                let _ = writeln!(
                    out,
                    "{pad}PostUpdate({}{})",
                    self.resolve(*target),
                    op.symbol()
                );
            }
        }
    }

    fn dump_expr(&self, out: &mut String, e: ExprRef, depth: usize) {
        let pad = "  ".repeat(depth);
        match self.expr_pool.get(e) {
            Expr::Literal(LiteralKind::Str, symbol) => {
                let _ = writeln!(out, "{pad}Literal(\"{}\")", self.resolve(*symbol));
            }
            Expr::Literal(_, symbol) => {
                let _ = writeln!(out, "{pad}Literal({})", self.resolve(*symbol));
            }
            Expr::Identifier(symbol) => {
                let _ = writeln!(out, "{pad}Identifier({})", self.resolve(*symbol));
            }
            Expr::Binary(op, left, right) => {
                let _ = writeln!(out, "{pad}BinaryOp({})", op.symbol());
                self.dump_expr(out, *left, depth + 1);
                self.dump_expr(out, *right, depth + 1);
            }
        }
    }
}
