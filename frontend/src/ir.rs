//! Three-address IR. Instructions operate on string operands: variable
//! names, literal text, or generated temporaries `t0, t1, ...`. Labels
//! are generated as `L0, L1, ...`. Counters live on the generator, so
//! independent generators never share numbering.

use std::fmt;

use crate::ast::{Expr, ExprRef, Operator, Program, Stmt, StmtRef, UpdateOp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    Assign {
        dst: String,
        src: String,
    },
    BinOp {
        dst: String,
        lhs: String,
        op: Operator,
        rhs: String,
    },
    Label(String),
    Goto(String),
    IfFalseGoto {
        cond: String,
        target: String,
    },
    Param(String),
    Call {
        callee: String,
        argc: usize,
    },
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Assign { dst, src } => write!(f, "{dst} = {src}"),
            Instr::BinOp { dst, lhs, op, rhs } => {
                write!(f, "{dst} = {lhs} {} {rhs}", op.symbol())
            }
            Instr::Label(label) => write!(f, "{label}:"),
            Instr::Goto(label) => write!(f, "goto {label}"),
            Instr::IfFalseGoto { cond, target } => write!(f, "ifFalse {cond} goto {target}"),
            Instr::Param(operand) => write!(f, "param {operand}"),
            Instr::Call { callee, argc } => write!(f, "call {callee}, {argc}"),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IrProgram {
    instrs: Vec<Instr>,
}

impl IrProgram {
    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Instr> {
        self.instrs.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instr> {
        self.instrs.iter()
    }

    pub fn instrs(&self) -> &[Instr] {
        &self.instrs
    }
}

impl fmt::Display for IrProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instr in &self.instrs {
            writeln!(f, "{instr}")?;
        }
        Ok(())
    }
}

pub fn generate(program: &Program) -> IrProgram {
    let mut generator = IrGenerator::new(program);
    for s in &program.statements {
        generator.gen_stmt(*s);
    }
    IrProgram {
        instrs: generator.instrs,
    }
}

struct IrGenerator<'a> {
    program: &'a Program,
    instrs: Vec<Instr>,
    temp_count: u32,
    label_count: u32,
}

impl<'a> IrGenerator<'a> {
    fn new(program: &'a Program) -> Self {
        IrGenerator {
            program,
            instrs: Vec::new(),
            temp_count: 0,
            label_count: 0,
        }
    }

    fn new_temp(&mut self) -> String {
        let name = format!("t{}", self.temp_count);
        self.temp_count += 1;
        name
    }

    fn new_label(&mut self) -> String {
        let name = format!("L{}", self.label_count);
        self.label_count += 1;
        name
    }

    /// Lowers an expression, returning the operand that holds its value.
    /// Literals and identifiers pass through as their raw text.
    fn gen_expr(&mut self, e: ExprRef) -> String {
        match self.program.expr_pool.get(e).clone() {
            Expr::Literal(_, symbol) | Expr::Identifier(symbol) => {
                self.program.resolve(symbol).to_string()
            }
            Expr::Binary(op, left, right) => {
                let lhs = self.gen_expr(left);
                let rhs = self.gen_expr(right);
                let dst = self.new_temp();
                self.instrs.push(Instr::BinOp {
                    dst: dst.clone(),
                    lhs,
                    op,
                    rhs,
                });
                dst
            }
        }
    }

    fn gen_stmt(&mut self, s: StmtRef) {
        match self.program.stmt_pool.get(s).clone() {
            Stmt::Block(children) => {
                for c in children {
                    self.gen_stmt(c);
                }
            }
            Stmt::VarDecl { name, init, .. } => {
                let src = self.gen_expr(init);
                self.instrs.push(Instr::Assign {
                    dst: self.program.resolve(name).to_string(),
                    src,
                });
            }
            Stmt::Assign { target, value } => {
                let src = self.gen_expr(value);
                self.instrs.push(Instr::Assign {
                    dst: self.program.resolve(target).to_string(),
                    src,
                });
            }
            Stmt::If { cond, then_block } => {
                let cond_operand = self.gen_expr(cond);
                let after = self.new_label();
                self.instrs.push(Instr::IfFalseGoto {
                    cond: cond_operand,
                    target: after.clone(),
                });
                self.gen_stmt(then_block);
                self.instrs.push(Instr::Label(after));
            }
            // An else body has no branch driving it; nothing is emitted.
            Stmt::Else { .. } => {}
            Stmt::While { cond, body } => {
                let start = self.new_label();
                let end = self.new_label();
                self.instrs.push(Instr::Label(start.clone()));
                let cond_operand = self.gen_expr(cond);
                self.instrs.push(Instr::IfFalseGoto {
                    cond: cond_operand,
                    target: end.clone(),
                });
                self.gen_stmt(body);
                self.instrs.push(Instr::Goto(start));
                self.instrs.push(Instr::Label(end));
            }
            Stmt::For {
                init,
                cond,
                update,
                body,
            } => {
                self.gen_stmt(init);
                let start = self.new_label();
                let end = self.new_label();
                self.instrs.push(Instr::Label(start.clone()));
                let cond_operand = self.gen_expr(cond);
                self.instrs.push(Instr::IfFalseGoto {
                    cond: cond_operand,
                    target: end.clone(),
                });
                self.gen_stmt(body);
                self.gen_stmt(update);
                self.instrs.push(Instr::Goto(start));
                self.instrs.push(Instr::Label(end));
            }
            Stmt::Call { callee, args } => {
                let argc = args.len();
                for a in args {
                    let operand = self.gen_expr(a);
                    self.instrs.push(Instr::Param(operand));
                }
                self.instrs.push(Instr::Call {
                    callee: self.program.resolve(callee).to_string(),
                    argc,
                });
            }
            Stmt::PreUpdate { target, op } | Stmt::PostUpdate { target, op } => {
                let name = self.program.resolve(target).to_string();
                let temp = self.new_temp();
                let binop = match op {
                    UpdateOp::Increment => Operator::Add,
                    UpdateOp::Decrement => Operator::Sub,
                };
                self.instrs.push(Instr::BinOp {
                    dst: temp.clone(),
                    lhs: name.clone(),
                    op: binop,
                    rhs: "1".to_string(),
                });
                self.instrs.push(Instr::Assign {
                    dst: name,
                    src: temp,
                });
            }
        }
    }
}
