//! Constant folding over the parsed tree. Arithmetic on plain decimal
//! number literals collapses to a fresh literal node; everything else is
//! left untouched. Folding runs after semantic analysis, so operand
//! types are already known to be sound.

use crate::ast::{Expr, ExprRef, LiteralKind, Operator, Program, Stmt, StmtRef};

pub fn fold_program(program: &mut Program) {
    let roots = program.statements.clone();
    for s in roots {
        fold_stmt(program, s);
    }
}

fn fold_stmt(program: &mut Program, s: StmtRef) {
    let folded = match program.stmt_pool.get(s).clone() {
        Stmt::Block(children) => {
            for c in &children {
                fold_stmt(program, *c);
            }
            return;
        }
        Stmt::VarDecl {
            name,
            is_const,
            init,
        } => Stmt::VarDecl {
            name,
            is_const,
            init: fold_expr(program, init),
        },
        Stmt::Assign { target, value } => Stmt::Assign {
            target,
            value: fold_expr(program, value),
        },
        Stmt::If { cond, then_block } => {
            fold_stmt(program, then_block);
            Stmt::If {
                cond: fold_expr(program, cond),
                then_block,
            }
        }
        Stmt::Else { block } => {
            fold_stmt(program, block);
            return;
        }
        Stmt::While { cond, body } => {
            fold_stmt(program, body);
            Stmt::While {
                cond: fold_expr(program, cond),
                body,
            }
        }
        Stmt::For {
            init,
            cond,
            update,
            body,
        } => {
            fold_stmt(program, init);
            fold_stmt(program, body);
            Stmt::For {
                init,
                cond: fold_expr(program, cond),
                update,
                body,
            }
        }
        Stmt::Call { callee, args } => {
            let args = args.iter().map(|a| fold_expr(program, *a)).collect();
            Stmt::Call { callee, args }
        }
        Stmt::PreUpdate { .. } | Stmt::PostUpdate { .. } => return,
    };
    program.stmt_pool.set(s, folded);
}

fn fold_expr(program: &mut Program, e: ExprRef) -> ExprRef {
    let Expr::Binary(op, left, right) = program.expr_pool.get(e).clone() else {
        return e;
    };
    let left_folded = fold_expr(program, left);
    let right_folded = fold_expr(program, right);

    if op.is_arithmetic() {
        if let (Some(a), Some(b)) = (
            decimal_value(program, left_folded),
            decimal_value(program, right_folded),
        ) {
            let value = match op {
                Operator::Add => a.wrapping_add(b),
                Operator::Sub => a.wrapping_sub(b),
                Operator::Mul => a.wrapping_mul(b),
                // Division by zero folds to zero rather than aborting.
                Operator::Div => {
                    if b == 0 {
                        0
                    } else {
                        a.wrapping_div(b)
                    }
                }
                _ => unreachable!("is_arithmetic covers exactly these"),
            };
            let line = program.expr_pool.line(e);
            let symbol = program.interner.get_or_intern(value.to_string());
            return program
                .expr_pool
                .add(Expr::Literal(LiteralKind::Number, symbol), line);
        }
    }

    if left_folded != left || right_folded != right {
        program
            .expr_pool
            .set(e, Expr::Binary(op, left_folded, right_folded));
    }
    e
}

/// A literal qualifies for folding only when its text is all ASCII
/// digits, so hex, binary and already-negative results stay out.
fn decimal_value(program: &Program, e: ExprRef) -> Option<i64> {
    let Expr::Literal(LiteralKind::Number, symbol) = program.expr_pool.get(e) else {
        return None;
    };
    let text = program.interner.resolve(*symbol)?;
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::Parser;
    use proptest::prelude::*;
    use rstest::rstest;

    fn folded(source: &str) -> Program {
        let tokens = tokenize(source).expect("lexing should succeed");
        let mut program = Parser::new(tokens)
            .parse_program()
            .expect("parsing should succeed");
        fold_program(&mut program);
        program
    }

    fn init_literal_text(program: &Program) -> Option<String> {
        let Stmt::VarDecl { init, .. } = program.stmt_pool.get(program.statements[0]) else {
            return None;
        };
        match program.expr_pool.get(*init) {
            Expr::Literal(LiteralKind::Number, symbol) => {
                Some(program.resolve(*symbol).to_string())
            }
            _ => None,
        }
    }

    #[rstest]
    #[case("let x = 1 + 2;", "3")]
    #[case("let x = 10 - 4;", "6")]
    #[case("let x = 6 * 7;", "42")]
    #[case("let x = 9 / 3;", "3")]
    #[case("let x = 2 + 3 * 4;", "14")]
    #[case("let x = (1 + 2) * (3 + 4);", "21")]
    fn arithmetic_folds_to_a_literal(#[case] source: &str, #[case] expected: &str) {
        let program = folded(source);
        assert_eq!(init_literal_text(&program).as_deref(), Some(expected));
    }

    #[test]
    fn division_by_zero_folds_to_zero() {
        let program = folded("let x = 5 / 0;");
        assert_eq!(init_literal_text(&program).as_deref(), Some("0"));
    }

    #[test]
    fn hex_literals_are_not_folded() {
        let program = folded("let x = 0x10 + 1;");
        assert_eq!(init_literal_text(&program), None);
    }

    #[test]
    fn comparisons_are_not_folded() {
        let program = folded("let x = 1 < 2;");
        let Stmt::VarDecl { init, .. } = program.stmt_pool.get(program.statements[0]) else {
            panic!("expected VarDecl");
        };
        assert!(matches!(
            program.expr_pool.get(*init),
            Expr::Binary(Operator::Lt, _, _)
        ));
    }

    #[test]
    fn identifiers_block_folding_but_children_still_fold() {
        let program = folded("let x = y + 2 * 3;");
        let Stmt::VarDecl { init, .. } = program.stmt_pool.get(program.statements[0]) else {
            panic!("expected VarDecl");
        };
        let Expr::Binary(Operator::Add, _, right) = program.expr_pool.get(*init) else {
            panic!("expected Add at the root");
        };
        match program.expr_pool.get(*right) {
            Expr::Literal(LiteralKind::Number, symbol) => {
                assert_eq!(program.resolve(*symbol), "6");
            }
            other => panic!("expected folded literal, got {other:?}"),
        }
    }

    #[test]
    fn folding_reaches_loop_conditions_and_call_args() {
        let program = folded("while (x < 2 + 3) { console.log(1 + 1); }");
        let dump = program.dump();
        assert!(dump.contains("Literal(5)"));
        assert!(dump.contains("Literal(2)"));
    }

    proptest! {
        #[test]
        fn folding_matches_wrapping_arithmetic(
            a in 0i64..100_000,
            b in 0i64..100_000,
            op_index in 0usize..4,
        ) {
            let op = ["+", "-", "*", "/"][op_index];
            let expected = match op {
                "+" => a.wrapping_add(b),
                "-" => a.wrapping_sub(b),
                "*" => a.wrapping_mul(b),
                _ => {
                    if b == 0 {
                        0
                    } else {
                        a.wrapping_div(b)
                    }
                }
            };
            let program = folded(&format!("let x = {a} {op} {b};"));
            prop_assert_eq!(init_literal_text(&program), Some(expected.to_string()));
        }

        #[test]
        fn folding_is_idempotent(a in 0i64..1000, b in 1i64..1000) {
            let mut program = folded(&format!("let x = {a} * {b} - {b};"));
            let once = program.dump();
            fold_program(&mut program);
            prop_assert_eq!(once, program.dump());
        }
    }
}
