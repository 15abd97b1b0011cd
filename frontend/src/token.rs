/// Token category produced by the lexer. The parser dispatches on the kind
/// and, for operators/punctuation/keywords, on the lexeme text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Identifier,
    Keyword,
    Number,
    String,
    Boolean,
    Operator,
    Punctuation,
    Comment,
    Error,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: Kind,
    pub lexeme: String,
    pub line: u32,
}

impl Token {
    pub fn new(kind: Kind, lexeme: impl Into<String>, line: u32) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            line,
        }
    }

    /// End-of-input sentinel. The token stream always ends with one.
    pub fn eof(line: u32) -> Self {
        Token::new(Kind::Eof, "", line)
    }

    pub fn is_op(&self, op: &str) -> bool {
        self.kind == Kind::Operator && self.lexeme == op
    }

    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == Kind::Punctuation && self.lexeme == punct
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == Kind::Keyword && self.lexeme == keyword
    }
}
