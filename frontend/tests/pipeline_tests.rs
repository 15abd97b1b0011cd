//! End-to-end tests over the whole frontend: lex, parse, analyze, fold,
//! lower to IR, build the CFG and run dead code elimination.

use frontend::ast::Program;
use frontend::cfg::{self, Cfg};
use frontend::fold::fold_program;
use frontend::ir::{self, IrProgram};
use frontend::lexer::tokenize;
use frontend::opt::eliminate_dead_code;
use frontend::parser::Parser;
use frontend::semantic;

struct Compiled {
    program: Program,
    ir: IrProgram,
    cfg: Cfg,
}

fn compile(source: &str) -> Compiled {
    let tokens = tokenize(source).expect("lexing should succeed");
    let mut program = Parser::new(tokens)
        .parse_program()
        .expect("parsing should succeed");
    semantic::analyze(&program).expect("analysis should succeed");
    fold_program(&mut program);
    let ir = ir::generate(&program);
    let mut cfg = cfg::build(&program).expect("graph should fit");
    eliminate_dead_code(&mut cfg);
    Compiled { program, ir, cfg }
}

fn ir_lines(ir: &IrProgram) -> Vec<String> {
    ir.iter().map(|i| i.to_string()).collect()
}

#[test]
fn fold_then_print_single_block() {
    let compiled = compile("let x = 2 + 3;\nconsole.log(x);");

    // Folding binds x to the literal 5.
    assert!(compiled.program.dump().contains("Literal(5)"));

    assert_eq!(
        ir_lines(&compiled.ir),
        vec!["x = 5", "param x", "call console.log, 1"]
    );

    assert_eq!(compiled.cfg.block_count(), 1);
    let entry = compiled.cfg.block(0).unwrap();
    assert_eq!(entry.stmts.len(), 2);
    assert!(entry.succs.is_empty());
}

#[test]
fn while_loop_shape_through_the_whole_pipeline() {
    let compiled = compile("let i = 0;\nwhile (i < 3) {\nconsole.log(i);\ni = i + 1;\n}");

    assert_eq!(
        ir_lines(&compiled.ir),
        vec![
            "i = 0",
            "L0:",
            "t0 = i < 3",
            "ifFalse t0 goto L1",
            "param i",
            "call console.log, 1",
            "t1 = i + 1",
            "i = t1",
            "goto L0",
            "L1:",
        ]
    );

    // Entry, cond, body, after; body jumps back to cond.
    assert_eq!(compiled.cfg.block_count(), 4);
    assert_eq!(compiled.cfg.block(0).unwrap().succs, vec![1]);
    assert_eq!(compiled.cfg.block(1).unwrap().succs, vec![2, 3]);
    assert_eq!(compiled.cfg.block(2).unwrap().succs, vec![1]);
    assert!(compiled.cfg.block(3).unwrap().succs.is_empty());
    // All blocks survive DCE.
    assert_eq!(compiled.cfg.block(2).unwrap().stmts.len(), 2);
}

#[test]
fn parsing_consumes_exactly_to_end_of_input() {
    let tokens = tokenize("let a = 1;\nlet b = a + 2;\nconsole.log(b);").unwrap();
    let count = tokens.len();
    let program = Parser::new(tokens).parse_program().unwrap();
    assert_eq!(program.statements.len(), 3);
    // Every token except the sentinel belongs to some statement.
    assert!(count > 1);
}

#[test]
fn entry_block_always_survives() {
    let compiled = compile("let x = 1;");
    assert_eq!(compiled.cfg.block_count(), 1);
    assert_eq!(compiled.cfg.block(0).unwrap().stmts.len(), 1);

    let empty = compile("if (1 < 2) {\n}");
    assert!(empty.cfg.block_count() >= 1);
}

#[test]
fn string_concat_checks_and_numeric_mismatch_rejects() {
    let tokens = tokenize("let s = \"a\" + 1;").unwrap();
    let program = Parser::new(tokens).parse_program().unwrap();
    assert!(semantic::analyze(&program).is_ok());

    let tokens = tokenize("let n = 1 - \"a\";").unwrap();
    let program = Parser::new(tokens).parse_program().unwrap();
    assert!(semantic::analyze(&program).is_err());
}

#[test]
fn shadowing_is_accepted_redeclaration_is_not() {
    let tokens = tokenize("let x = 1;\nif (x < 2) {\nlet x = 2;\n}").unwrap();
    let program = Parser::new(tokens).parse_program().unwrap();
    assert!(semantic::analyze(&program).is_ok());

    let tokens = tokenize("let x = 1;\nlet x = 2;").unwrap();
    let program = Parser::new(tokens).parse_program().unwrap();
    assert!(semantic::analyze(&program).is_err());
}

#[test]
fn nested_loops_fold_ir_and_cfg_stay_consistent() {
    let compiled = compile(
        "for (let i = 0; i < 2 + 1; i++) {\nfor (let j = 0; j < 2; j++) {\nconsole.log(i + j);\n}\n}",
    );
    let lines = ir_lines(&compiled.ir);
    // Outer bound folds to 3 before lowering.
    assert!(lines.contains(&"t0 = i < 3".to_string()));
    // Four labels: start/end per loop.
    assert_eq!(lines.iter().filter(|l| l.ends_with(':')).count(), 4);
    // 1 entry + 3 per loop.
    assert_eq!(compiled.cfg.block_count(), 7);
}
