use std::collections::HashMap;
use std::fmt;

use string_interner::DefaultSymbol;

/// Nesting limit for lexical scopes.
pub const MAX_SCOPES: usize = 64;
/// Limit on symbols declared within a single scope.
pub const MAX_SCOPE_SYMBOLS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemType {
    Number,
    String,
    Boolean,
    Unknown,
}

impl fmt::Display for SemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SemType::Number => "number",
            SemType::String => "string",
            SemType::Boolean => "boolean",
            SemType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SymbolInfo {
    pub is_const: bool,
    pub ty: SemType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeclareOutcome {
    Declared,
    Duplicate,
    ScopeFull,
}

/// Lexical scope stack. Lookups walk innermost to outermost.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<HashMap<DefaultSymbol, SymbolInfo>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack::default()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Returns false when the nesting limit is reached.
    pub fn push_scope(&mut self) -> bool {
        if self.scopes.len() >= MAX_SCOPES {
            return false;
        }
        self.scopes.push(HashMap::new());
        true
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub(crate) fn declare(&mut self, name: DefaultSymbol, info: SymbolInfo) -> DeclareOutcome {
        let Some(scope) = self.scopes.last_mut() else {
            return DeclareOutcome::ScopeFull;
        };
        if scope.contains_key(&name) {
            return DeclareOutcome::Duplicate;
        }
        if scope.len() >= MAX_SCOPE_SYMBOLS {
            return DeclareOutcome::ScopeFull;
        }
        scope.insert(name, info);
        DeclareOutcome::Declared
    }

    pub fn lookup(&self, name: DefaultSymbol) -> Option<SymbolInfo> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name).copied())
    }

    /// Rewrites the recorded type of the innermost binding for `name`.
    pub fn update_type(&mut self, name: DefaultSymbol, ty: SemType) -> bool {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(info) = scope.get_mut(&name) {
                info.ty = ty;
                return true;
            }
        }
        false
    }
}
