mod context;
mod error;


use std::collections::HashMap;

use string_interner::DefaultSymbol;

use crate::ast::{Expr, ExprRef, LiteralKind, Operator, Program, Stmt, StmtRef};

pub use context::{MAX_SCOPES, MAX_SCOPE_SYMBOLS, ScopeStack, SemType, SymbolInfo};
pub use error::{SemanticError, SemanticErrorKind};

use context::DeclareOutcome;

/// Variable name to type mapping produced by analysis. Backends consult
/// it when emitting declarations and print calls. Names that were never
/// recorded report `Number`.
#[derive(Debug, Default, Clone)]
pub struct TypeTable {
    types: HashMap<DefaultSymbol, SemType>,
}

impl TypeTable {
    pub fn get(&self, name: DefaultSymbol) -> SemType {
        self.types.get(&name).copied().unwrap_or(SemType::Number)
    }

    pub fn lookup(&self, name: DefaultSymbol) -> Option<SemType> {
        self.types.get(&name).copied()
    }

    pub fn is_tracked(&self, name: DefaultSymbol) -> bool {
        self.types.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Walks the program once, enforcing declaration and type rules, and
/// collects the [`TypeTable`]. Analysis halts at the first error.
pub fn analyze(program: &Program) -> Result<TypeTable, SemanticError> {
    SemanticAnalyzer::new(program).run()
}

struct SemanticAnalyzer<'a> {
    program: &'a Program,
    scopes: ScopeStack,
    types: HashMap<DefaultSymbol, SemType>,
}

impl<'a> SemanticAnalyzer<'a> {
    fn new(program: &'a Program) -> Self {
        SemanticAnalyzer {
            program,
            scopes: ScopeStack::new(),
            types: HashMap::new(),
        }
    }

    fn run(mut self) -> Result<TypeTable, SemanticError> {
        self.enter_scope(0)?;
        for s in &self.program.statements {
            self.analyze_stmt(*s)?;
        }
        self.scopes.pop_scope();
        Ok(TypeTable { types: self.types })
    }

    fn enter_scope(&mut self, line: u32) -> Result<(), SemanticError> {
        if !self.scopes.push_scope() {
            return Err(SemanticError::new(
                SemanticErrorKind::ScopeDepthExceeded { limit: MAX_SCOPES },
                line,
            ));
        }
        Ok(())
    }

    fn name_of(&self, symbol: DefaultSymbol) -> String {
        self.program.resolve(symbol).to_string()
    }

    fn declare(
        &mut self,
        name: DefaultSymbol,
        is_const: bool,
        ty: SemType,
        line: u32,
    ) -> Result<(), SemanticError> {
        match self.scopes.declare(name, SymbolInfo { is_const, ty }) {
            DeclareOutcome::Declared => {
                self.types.insert(name, ty);
                Ok(())
            }
            DeclareOutcome::Duplicate => Err(SemanticError::new(
                SemanticErrorKind::DuplicateDeclaration {
                    name: self.name_of(name),
                },
                line,
            )),
            DeclareOutcome::ScopeFull => Err(SemanticError::new(
                SemanticErrorKind::TooManySymbols {
                    limit: MAX_SCOPE_SYMBOLS,
                },
                line,
            )),
        }
    }

    fn analyze_stmt(&mut self, s: StmtRef) -> Result<(), SemanticError> {
        let line = self.program.stmt_pool.line(s);
        match self.program.stmt_pool.get(s).clone() {
            Stmt::Block(children) => {
                self.enter_scope(line)?;
                for c in children {
                    self.analyze_stmt(c)?;
                }
                self.scopes.pop_scope();
                Ok(())
            }
            Stmt::VarDecl {
                name,
                is_const,
                init,
            } => {
                let ty = self.infer_expr(init)?;
                self.declare(name, is_const, ty, line)
            }
            Stmt::Assign { target, value } => self.analyze_assign(target, value, line),
            Stmt::If { cond, then_block } => {
                self.check_declared(cond)?;
                self.analyze_stmt(then_block)
            }
            Stmt::Else { block } => self.analyze_stmt(block),
            Stmt::While { cond, body } => {
                self.check_declared(cond)?;
                self.analyze_stmt(body)
            }
            Stmt::For {
                init,
                cond,
                update,
                body,
            } => {
                // One scope covers the whole loop, so the induction
                // variable is visible in cond, body and update.
                self.enter_scope(line)?;
                self.analyze_stmt(init)?;
                self.check_declared(cond)?;
                self.analyze_stmt(body)?;
                self.analyze_stmt(update)?;
                self.scopes.pop_scope();
                Ok(())
            }
            Stmt::Call { args, .. } => {
                for a in args {
                    self.check_declared(a)?;
                }
                Ok(())
            }
            Stmt::PreUpdate { target, .. } | Stmt::PostUpdate { target, .. } => {
                self.check_update_target(target, line)
            }
        }
    }

    fn analyze_assign(
        &mut self,
        target: DefaultSymbol,
        value: ExprRef,
        line: u32,
    ) -> Result<(), SemanticError> {
        let Some(info) = self.scopes.lookup(target) else {
            return Err(SemanticError::new(
                SemanticErrorKind::UndeclaredIdentifier {
                    name: self.name_of(target),
                },
                line,
            ));
        };
        if info.is_const {
            return Err(SemanticError::new(
                SemanticErrorKind::ConstViolation {
                    name: self.name_of(target),
                },
                line,
            ));
        }
        let actual = self.infer_expr(value)?;
        if info.ty == SemType::Unknown {
            // First assignment pins the type.
            self.scopes.update_type(target, actual);
            self.types.insert(target, actual);
            return Ok(());
        }
        if info.ty != actual {
            return Err(SemanticError::new(
                SemanticErrorKind::AssignTypeMismatch {
                    expected: info.ty,
                    actual,
                },
                line,
            ));
        }
        Ok(())
    }

    fn check_update_target(
        &mut self,
        target: DefaultSymbol,
        line: u32,
    ) -> Result<(), SemanticError> {
        let Some(info) = self.scopes.lookup(target) else {
            return Err(SemanticError::new(
                SemanticErrorKind::UndeclaredIdentifier {
                    name: self.name_of(target),
                },
                line,
            ));
        };
        if info.is_const {
            return Err(SemanticError::new(
                SemanticErrorKind::ConstViolation {
                    name: self.name_of(target),
                },
                line,
            ));
        }
        if info.ty != SemType::Number {
            return Err(SemanticError::new(
                SemanticErrorKind::InvalidUpdateTarget {
                    name: self.name_of(target),
                    ty: info.ty,
                },
                line,
            ));
        }
        Ok(())
    }

    fn infer_expr(&mut self, e: ExprRef) -> Result<SemType, SemanticError> {
        let line = self.program.expr_pool.line(e);
        match self.program.expr_pool.get(e).clone() {
            Expr::Literal(kind, _) => Ok(match kind {
                LiteralKind::Number => SemType::Number,
                LiteralKind::Str => SemType::String,
                LiteralKind::Bool => SemType::Boolean,
            }),
            Expr::Identifier(name) => match self.scopes.lookup(name) {
                Some(info) => Ok(info.ty),
                None => Err(SemanticError::new(
                    SemanticErrorKind::UndeclaredIdentifier {
                        name: self.name_of(name),
                    },
                    line,
                )),
            },
            Expr::Binary(op, left, right) => {
                let lt = self.infer_expr(left)?;
                let rt = self.infer_expr(right)?;
                // '+' concatenates when either side is a string.
                if op == Operator::Add && (lt == SemType::String || rt == SemType::String) {
                    return Ok(SemType::String);
                }
                if lt != SemType::Number || rt != SemType::Number {
                    return Err(SemanticError::new(
                        SemanticErrorKind::TypeMismatchOperation {
                            operator: op.symbol(),
                            left: lt,
                            right: rt,
                        },
                        line,
                    ));
                }
                Ok(SemType::Number)
            }
        }
    }

    /// Declaredness-only walk for conditions and call arguments. No type
    /// rule is enforced here, every name just has to resolve.
    fn check_declared(&mut self, e: ExprRef) -> Result<(), SemanticError> {
        let line = self.program.expr_pool.line(e);
        match self.program.expr_pool.get(e).clone() {
            Expr::Literal(..) => Ok(()),
            Expr::Identifier(name) => {
                if self.scopes.lookup(name).is_none() {
                    return Err(SemanticError::new(
                        SemanticErrorKind::UndeclaredIdentifier {
                            name: self.name_of(name),
                        },
                        line,
                    ));
                }
                Ok(())
            }
            Expr::Binary(_, left, right) => {
                self.check_declared(left)?;
                self.check_declared(right)
            }
        }
    }
}
