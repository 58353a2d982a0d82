// src/core/token.rs

use serde::Serialize;

/// Closed set of lexical categories. The token's `text` field carries the
/// payload (identifier spelling, string content, raw number text, module name
/// for import symbols, operator spelling).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    // Names and literals
    Identifier,
    Number,
    Text,
    /// `《模块名》` — the text is the raw module name between the brackets.
    ImportSymbol,

    // Keywords
    Function, // 涵义
    Param,    // 需知
    Return,   // 求
    Known,    // 已知
    As,       // 为
    Let,      // 令
    If,       // 若
    ElseIf,   // 或若
    Else,     // 不然
    While,    // 当
    Repeat,   // 重复
    Times,    // 次

    /// Comparison/logical operator; the spelling (是, 不是, 至少, 至多, 且, 或)
    /// is kept in `text` and interpreted by the evaluator.
    Operator,

    // Punctuation
    LeftBracket,  // 【
    RightBracket, // 】
    Colon,        // ：
    Period,       // 。
    Comma,        // ，

    Eof,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self { kind, text: text.into(), line, column }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::Text => "string",
            TokenKind::ImportSymbol => "import symbol",
            TokenKind::Function => "涵义",
            TokenKind::Param => "需知",
            TokenKind::Return => "求",
            TokenKind::Known => "已知",
            TokenKind::As => "为",
            TokenKind::Let => "令",
            TokenKind::If => "若",
            TokenKind::ElseIf => "或若",
            TokenKind::Else => "不然",
            TokenKind::While => "当",
            TokenKind::Repeat => "重复",
            TokenKind::Times => "次",
            TokenKind::Operator => "operator",
            TokenKind::LeftBracket => "【",
            TokenKind::RightBracket => "】",
            TokenKind::Colon => "：",
            TokenKind::Period => "。",
            TokenKind::Comma => "，",
            TokenKind::Eof => "end of input",
        };
        write!(f, "{}", name)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Identifier
            | TokenKind::Number
            | TokenKind::Text
            | TokenKind::ImportSymbol
            | TokenKind::Operator => {
                write!(f, "{}「{}」@{}:{}", self.kind, self.text, self.line, self.column)
            }
            other => write!(f, "{} @{}:{}", other, self.line, self.column),
        }
    }
}
