use logos::{Lexer, Logos, Skip};

use crate::token::{Kind, Token};

/// Hard cap on the number of tokens a single source file may produce.
pub const MAX_TOKENS: usize = 65536;

const KEYWORDS: &[&str] = &[
    "abstract",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "export",
    "extends",
    "finally",
    "for",
    "function",
    "if",
    "import",
    "in",
    "instanceof",
    "let",
    "new",
    "null",
    "return",
    "static",
    "super",
    "switch",
    "this",
    "throw",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "yield",
];

fn is_keyword(lexeme: &str) -> bool {
    KEYWORDS.contains(&lexeme)
}

fn newline(lex: &mut Lexer<'_, RawToken>) -> Skip {
    lex.extras += 1;
    Skip
}

fn block_comment(lex: &mut Lexer<'_, RawToken>) {
    lex.extras += lex.slice().bytes().filter(|&b| b == b'\n').count() as u32;
}

// Raw lexeme classes. `extras` tracks the number of newlines consumed so
// far; the reported line is `extras + 1`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(extras = u32)]
#[logos(skip r"[ \t\r\f]+")]
enum RawToken {
    #[token("\n", newline)]
    Newline,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*[^*]*\*+([^*/][^*]*\*+)*/", block_comment)]
    BlockComment,

    // Matches only when the closing */ is missing; a terminated comment
    // is the longer match and wins.
    #[regex(r"/\*[^*]*(\*+[^*/][^*]*)*\**", block_comment)]
    UnterminatedComment,

    #[regex(r#""[^"\n]*""#)]
    Str,

    #[regex(r"0[xX][0-9a-fA-F]+")]
    HexNumber,

    #[regex(r"0[bB][01]+")]
    BinNumber,

    #[regex(r"[0-9]+")]
    Number,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Word,

    #[token("===")]
    #[token("!==")]
    #[token("<=")]
    #[token(">=")]
    #[token("<")]
    #[token(">")]
    #[token("=")]
    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    Operator,

    #[token("(")]
    #[token(")")]
    #[token("{")]
    #[token("}")]
    #[token(";")]
    #[token(",")]
    #[token(".")]
    Punctuation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    UnrecognizedCharacter { lexeme: String },
    UnterminatedComment,
    TooManyTokens { limit: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: u32,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            LexErrorKind::UnrecognizedCharacter { lexeme } => {
                write!(f, "line {}: unrecognized character '{}'", self.line, lexeme)
            }
            LexErrorKind::UnterminatedComment => {
                write!(f, "line {}: unterminated block comment", self.line)
            }
            LexErrorKind::TooManyTokens { limit } => {
                write!(f, "line {}: too many tokens (limit {})", self.line, limit)
            }
        }
    }
}

impl std::error::Error for LexError {}

/// Tokenizes `source` into the full token stream, comments included, with
/// an `Eof` sentinel appended. Stops at the first unrecognized character.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = RawToken::lexer(source);
    let mut tokens = Vec::new();

    while let Some(raw) = lexer.next() {
        let slice = lexer.slice();
        // The block comment callback has already counted the newlines in
        // this slice; subtracting them reports the token's opening line.
        let newlines_inside = slice.bytes().filter(|&b| b == b'\n').count() as u32;
        let line = lexer.extras + 1 - newlines_inside;
        if tokens.len() >= MAX_TOKENS {
            return Err(LexError {
                kind: LexErrorKind::TooManyTokens { limit: MAX_TOKENS },
                line,
            });
        }
        let token = match raw {
            Ok(RawToken::Newline) => continue,
            Ok(RawToken::LineComment) => Token::new(Kind::Comment, slice, line),
            Ok(RawToken::BlockComment) => Token::new(Kind::Comment, slice, line),
            Ok(RawToken::UnterminatedComment) => {
                return Err(LexError {
                    kind: LexErrorKind::UnterminatedComment,
                    line,
                });
            }
            Ok(RawToken::Str) => {
                // Quotes are stripped; only the contents survive.
                Token::new(Kind::String, &slice[1..slice.len() - 1], line)
            }
            Ok(RawToken::HexNumber) | Ok(RawToken::BinNumber) | Ok(RawToken::Number) => {
                Token::new(Kind::Number, slice, line)
            }
            Ok(RawToken::Word) => {
                if slice == "true" || slice == "false" {
                    Token::new(Kind::Boolean, slice, line)
                } else if is_keyword(slice) {
                    Token::new(Kind::Keyword, slice, line)
                } else {
                    Token::new(Kind::Identifier, slice, line)
                }
            }
            Ok(RawToken::Operator) => Token::new(Kind::Operator, slice, line),
            Ok(RawToken::Punctuation) => Token::new(Kind::Punctuation, slice, line),
            Err(()) => {
                return Err(LexError {
                    kind: LexErrorKind::UnrecognizedCharacter {
                        lexeme: slice.to_string(),
                    },
                    line,
                });
            }
        };
        tokens.push(token);
    }

    tokens.push(Token::eof(lexer.extras + 1));
    Ok(tokens)
}
