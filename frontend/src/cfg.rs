//! Control-flow graph built directly over AST statement refs. Blocks
//! hold the straight-line statements assigned to them; structured
//! statements split the current block and wire successor edges.

use std::fmt;
use std::fmt::Write as _;

use crate::ast::{Program, Stmt, StmtRef};

/// Upper bound on blocks in a single graph.
pub const MAX_BLOCKS: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    pub id: usize,
    pub stmts: Vec<StmtRef>,
    pub succs: Vec<usize>,
}

impl BasicBlock {
    fn new(id: usize) -> Self {
        BasicBlock {
            id,
            stmts: Vec::new(),
            succs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CfgErrorKind {
    TooManyBlocks { limit: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfgError {
    pub kind: CfgErrorKind,
}

impl fmt::Display for CfgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CfgErrorKind::TooManyBlocks { limit } => {
                write!(f, "too many basic blocks (limit {limit})")
            }
        }
    }
}

impl std::error::Error for CfgError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cfg {
    blocks: Vec<BasicBlock>,
}

impl Cfg {
    /// Assembles a graph from pre-built blocks. Mostly useful for tests.
    pub fn from_blocks(blocks: Vec<BasicBlock>) -> Self {
        Cfg { blocks }
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn block(&self, id: usize) -> Option<&BasicBlock> {
        self.blocks.get(id)
    }

    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    pub(crate) fn block_mut(&mut self, id: usize) -> Option<&mut BasicBlock> {
        self.blocks.get_mut(id)
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            let _ = writeln!(out, "Block B{}:", block.id);
            let _ = writeln!(out, "  Statements: {}", block.stmts.len());
            let _ = write!(out, "  Successors:");
            for succ in &block.succs {
                let _ = write!(out, " B{succ}");
            }
            let _ = writeln!(out);
        }
        out
    }
}

/// Builds the graph for a program. Block 0 is always the entry block.
pub fn build(program: &Program) -> Result<Cfg, CfgError> {
    let mut builder = CfgBuilder {
        program,
        blocks: Vec::new(),
    };
    let mut current = builder.new_block()?;
    for s in &program.statements {
        current = builder.build_stmt(*s, current)?;
    }
    Ok(Cfg {
        blocks: builder.blocks,
    })
}

struct CfgBuilder<'a> {
    program: &'a Program,
    blocks: Vec<BasicBlock>,
}

impl CfgBuilder<'_> {
    fn new_block(&mut self) -> Result<usize, CfgError> {
        if self.blocks.len() >= MAX_BLOCKS {
            return Err(CfgError {
                kind: CfgErrorKind::TooManyBlocks { limit: MAX_BLOCKS },
            });
        }
        let id = self.blocks.len();
        self.blocks.push(BasicBlock::new(id));
        Ok(id)
    }

    fn add_edge(&mut self, from: usize, to: usize) {
        self.blocks[from].succs.push(to);
    }

    /// Adds `s` to the graph starting from block `current`; returns the
    /// block that control falls through to afterwards.
    fn build_stmt(&mut self, s: StmtRef, current: usize) -> Result<usize, CfgError> {
        match self.program.stmt_pool.get(s).clone() {
            Stmt::Block(children) => {
                let mut cursor = current;
                for c in children {
                    cursor = self.build_stmt(c, cursor)?;
                }
                Ok(cursor)
            }
            Stmt::If { then_block, .. } => {
                let then_entry = self.new_block()?;
                let after = self.new_block()?;
                self.add_edge(current, then_entry);
                self.add_edge(current, after);
                let then_exit = self.build_stmt(then_block, then_entry)?;
                self.add_edge(then_exit, after);
                Ok(after)
            }
            Stmt::While { body, .. } => {
                let cond = self.new_block()?;
                let body_entry = self.new_block()?;
                let after = self.new_block()?;
                self.add_edge(current, cond);
                self.add_edge(cond, body_entry);
                self.add_edge(cond, after);
                let body_exit = self.build_stmt(body, body_entry)?;
                self.add_edge(body_exit, cond);
                Ok(after)
            }
            Stmt::For {
                init, update, body, ..
            } => {
                // Init runs with whatever precedes the loop; the update
                // lands at the tail of the body.
                self.blocks[current].stmts.push(init);
                let cond = self.new_block()?;
                let body_entry = self.new_block()?;
                let after = self.new_block()?;
                self.add_edge(current, cond);
                self.add_edge(cond, body_entry);
                self.add_edge(cond, after);
                let body_exit = self.build_stmt(body, body_entry)?;
                self.blocks[body_exit].stmts.push(update);
                self.add_edge(body_exit, cond);
                Ok(after)
            }
            _ => {
                self.blocks[current].stmts.push(s);
                Ok(current)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::Parser;

    fn graph(source: &str) -> Cfg {
        let tokens = tokenize(source).expect("lexing should succeed");
        let program = Parser::new(tokens)
            .parse_program()
            .expect("parsing should succeed");
        build(&program).expect("graph should fit")
    }

    #[test]
    fn straight_line_code_is_one_block() {
        let cfg = graph("let a = 1;\nlet b = 2;\nconsole.log(a);");
        assert_eq!(cfg.block_count(), 1);
        assert_eq!(cfg.block(0).unwrap().stmts.len(), 3);
        assert!(cfg.block(0).unwrap().succs.is_empty());
    }

    #[test]
    fn if_splits_into_then_and_after() {
        let cfg = graph("let x = 1;\nif (x < 2) { x = 2; }\nconsole.log(x);");
        assert_eq!(cfg.block_count(), 3);
        assert_eq!(cfg.block(0).unwrap().succs, vec![1, 2]);
        assert_eq!(cfg.block(1).unwrap().succs, vec![2]);
        // Trailing statement lands in the join block.
        assert_eq!(cfg.block(2).unwrap().stmts.len(), 1);
    }

    #[test]
    fn while_gets_cond_body_after_with_back_edge() {
        let cfg = graph("let i = 0;\nwhile (i < 3) { i = i + 1; }");
        assert_eq!(cfg.block_count(), 4);
        assert_eq!(cfg.block(0).unwrap().succs, vec![1]);
        assert_eq!(cfg.block(1).unwrap().succs, vec![2, 3]);
        assert_eq!(cfg.block(2).unwrap().succs, vec![1]);
        assert!(cfg.block(3).unwrap().succs.is_empty());
    }

    #[test]
    fn for_init_stays_in_entry_and_update_joins_body() {
        let cfg = graph("for (let i = 0; i < 3; i++) { console.log(i); }");
        assert_eq!(cfg.block_count(), 4);
        // Entry holds the init statement.
        assert_eq!(cfg.block(0).unwrap().stmts.len(), 1);
        assert_eq!(cfg.block(0).unwrap().succs, vec![1]);
        // Body holds the call plus the update.
        assert_eq!(cfg.block(2).unwrap().stmts.len(), 2);
        assert_eq!(cfg.block(2).unwrap().succs, vec![1]);
    }

    #[test]
    fn else_body_is_never_entered() {
        let cfg = graph("let x = 1;\nif (x < 2) { x = 2; } else { x = 3; }");
        // The else statement sits in the join block but gains no edge of
        // its own, and nothing lowers it later.
        assert_eq!(cfg.block_count(), 3);
        assert_eq!(cfg.block(2).unwrap().stmts.len(), 1);
    }

    #[test]
    fn deep_nesting_overflows_the_block_limit() {
        let mut source = String::new();
        for _ in 0..64 {
            source.push_str("if (x < 1) {\n");
        }
        for _ in 0..64 {
            source.push_str("}\n");
        }
        let tokens = tokenize(&source).expect("lexing should succeed");
        let program = Parser::new(tokens)
            .parse_program()
            .expect("parsing should succeed");
        let err = build(&program).expect_err("graph should overflow");
        assert_eq!(
            err.kind,
            CfgErrorKind::TooManyBlocks { limit: MAX_BLOCKS }
        );
    }
}
