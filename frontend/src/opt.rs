//! Dead code elimination over the CFG. Reachability is a DFS from the
//! entry block; unreachable blocks keep their ids and edges but lose
//! their statements.

use log::debug;

use crate::cfg::Cfg;

pub fn eliminate_dead_code(cfg: &mut Cfg) {
    let count = cfg.block_count();
    if count == 0 {
        return;
    }
    let mut visited = vec![false; count];
    let mut stack = vec![0usize];
    while let Some(id) = stack.pop() {
        if visited[id] {
            continue;
        }
        visited[id] = true;
        if let Some(block) = cfg.block(id) {
            for &succ in &block.succs {
                if succ < count && !visited[succ] {
                    stack.push(succ);
                }
            }
        }
    }
    for (id, reachable) in visited.iter().enumerate() {
        if !reachable {
            if let Some(block) = cfg.block_mut(id) {
                debug!("removing unreachable block B{id}");
                block.stmts.clear();
            }
        }
    }
}
