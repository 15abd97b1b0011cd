//! Pipeline orchestration. A [`CompilerSession`] runs one source text
//! through lex, parse, semantic analysis, folding, IR lowering, CFG
//! construction and dead code elimination, and hands back everything
//! the backends need. Sessions share no state with one another.

use std::fmt;

use log::debug;

use frontend::ast::Program;
use frontend::cfg::{self, Cfg, CfgError};
use frontend::fold;
use frontend::ir::{self, IrProgram};
use frontend::lexer::{self, LexError};
use frontend::opt;
use frontend::parser::{Parser, ParserError};
use frontend::semantic::{self, SemanticError, TypeTable};
use frontend::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lex,
    Parse,
    Semantic,
    Cfg,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Lex => "lex",
            Stage::Parse => "parse",
            Stage::Semantic => "semantic",
            Stage::Cfg => "cfg",
        };
        f.write_str(name)
    }
}

/// A single pipeline failure. The pipeline stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub stage: Stage,
    pub message: String,
    pub line: u32,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.stage, self.message)
    }
}

impl std::error::Error for Diagnostic {}

impl From<LexError> for Diagnostic {
    fn from(err: LexError) -> Self {
        Diagnostic {
            stage: Stage::Lex,
            message: err.to_string(),
            line: err.line,
        }
    }
}

impl From<ParserError> for Diagnostic {
    fn from(err: ParserError) -> Self {
        Diagnostic {
            stage: Stage::Parse,
            message: err.to_string(),
            line: err.line,
        }
    }
}

impl From<SemanticError> for Diagnostic {
    fn from(err: SemanticError) -> Self {
        Diagnostic {
            stage: Stage::Semantic,
            message: err.to_string(),
            line: err.line,
        }
    }
}

impl From<CfgError> for Diagnostic {
    fn from(err: CfgError) -> Self {
        Diagnostic {
            stage: Stage::Cfg,
            message: err.to_string(),
            line: 0,
        }
    }
}

/// Everything a successful compilation produces.
#[derive(Debug)]
pub struct CompileOutput {
    pub program: Program,
    pub types: TypeTable,
    pub ir: IrProgram,
    pub cfg: Cfg,
}

#[derive(Debug, Default)]
pub struct CompilerSession;

impl CompilerSession {
    pub fn new() -> Self {
        CompilerSession
    }

    /// Lexes without running the rest of the pipeline.
    pub fn tokenize(&self, source: &str) -> Result<Vec<Token>, Diagnostic> {
        Ok(lexer::tokenize(source)?)
    }

    pub fn compile(&mut self, source: &str) -> Result<CompileOutput, Diagnostic> {
        let tokens = lexer::tokenize(source)?;
        debug!("lexed {} tokens", tokens.len());

        let mut program = Parser::new(tokens).parse_program()?;
        debug!(
            "parsed {} top-level statements",
            program.statements.len()
        );

        // Types are checked on the tree as written; folding runs after.
        let types = semantic::analyze(&program)?;
        debug!("recorded {} variable types", types.len());

        fold::fold_program(&mut program);

        let ir = ir::generate(&program);
        debug!("lowered to {} IR instructions", ir.len());

        let mut cfg = cfg::build(&program)?;
        opt::eliminate_dead_code(&mut cfg);
        debug!("cfg has {} blocks", cfg.block_count());

        Ok(CompileOutput {
            program,
            types,
            ir,
            cfg,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontend::semantic::SemType;

    fn compile(source: &str) -> Result<CompileOutput, Diagnostic> {
        CompilerSession::new().compile(source)
    }

    #[test]
    fn full_pipeline_produces_all_artifacts() {
        let output = compile("let x = 1 + 2;\nconsole.log(x);").unwrap();
        assert_eq!(output.program.statements.len(), 2);
        assert_eq!(output.ir.len(), 3);
        assert_eq!(output.cfg.block_count(), 1);
        let x = output.program.interner.get("x").unwrap();
        assert_eq!(output.types.get(x), SemType::Number);
    }

    #[test]
    fn folding_runs_after_type_checking() {
        // The IR sees the folded literal, not the addition.
        let output = compile("let x = 1 + 2;").unwrap();
        assert_eq!(output.ir.get(0).unwrap().to_string(), "x = 3");
    }

    #[test]
    fn lex_errors_carry_the_stage() {
        let err = compile("let x = #;").unwrap_err();
        assert_eq!(err.stage, Stage::Lex);
        assert_eq!(err.line, 1);
    }

    #[test]
    fn parse_errors_carry_the_stage() {
        let err = compile("let x = ;").unwrap_err();
        assert_eq!(err.stage, Stage::Parse);
    }

    #[test]
    fn semantic_errors_carry_the_stage_and_line() {
        let err = compile("let x = 1;\nx = \"s\";").unwrap_err();
        assert_eq!(err.stage, Stage::Semantic);
        assert_eq!(err.line, 2);
    }

    #[test]
    fn sessions_are_independent() {
        let mut first = CompilerSession::new();
        let mut second = CompilerSession::new();
        let a = first
            .compile("let p = 1;\nlet q = 2;\nlet x = p + q;")
            .unwrap();
        let b = second
            .compile("let r = 3;\nlet s = 4;\nlet y = r + s;")
            .unwrap();
        // Temp numbering restarts per compilation.
        assert_eq!(a.ir.get(2).unwrap().to_string(), "t0 = p + q");
        assert_eq!(b.ir.get(2).unwrap().to_string(), "t0 = r + s");
    }

    #[test]
    fn loops_survive_dead_code_elimination() {
        let output = compile("let i = 0;\nwhile (i < 3) { i = i + 1; }").unwrap();
        // Body block is reachable through the cond block.
        assert!(!output.cfg.block(2).unwrap().stmts.is_empty());
    }
}
