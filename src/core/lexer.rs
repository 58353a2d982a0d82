// src/core/lexer.rs

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use unicode_ident::is_xid_start;
use unicode_normalization::UnicodeNormalization;

use crate::core::token::{Token, TokenKind};

/// Lexer error with source location.
#[derive(Debug, Clone, PartialEq)]
pub enum LexerError {
    UnexpectedCharacter(char, usize, usize),
    UnterminatedString(usize, usize),
    UnterminatedImport(usize, usize),
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use LexerError::*;
        match self {
            UnexpectedCharacter(ch, line, col) => {
                write!(f, "unexpected character '{}' at {}:{}", ch, line, col)
            }
            UnterminatedString(line, col) => {
                write!(f, "unterminated string starting at {}:{}", line, col)
            }
            UnterminatedImport(line, col) => {
                write!(f, "unterminated import symbol starting at {}:{}", line, col)
            }
        }
    }
}

impl std::error::Error for LexerError {}

/// Keyword table: maximal letter runs are matched here after operator checks.
static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    HashMap::from([
        ("涵义", TokenKind::Function),
        ("需知", TokenKind::Param),
        ("求", TokenKind::Return),
        ("已知", TokenKind::Known),
        ("为", TokenKind::As),
        ("令", TokenKind::Let),
        ("若", TokenKind::If),
        ("不然", TokenKind::Else),
        ("当", TokenKind::While),
        ("重复", TokenKind::Repeat),
        ("次", TokenKind::Times),
    ])
});

/// Two-glyph operators, matched by direct substring lookahead before the
/// single-glyph operators (longest match first). 或若 rides along here so it
/// wins over the 或 operator.
static TWO_GLYPH: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    HashMap::from([
        ("不是", TokenKind::Operator),
        ("至少", TokenKind::Operator),
        ("至多", TokenKind::Operator),
        ("或若", TokenKind::ElseIf),
    ])
});

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        let normalized: String = source.nfc().collect();
        Self { chars: normalized.chars().collect(), pos: 0, line: 1, column: 1 }
    }

    /// Tokenizes the whole source, appending a trailing EOF token. Aborts on
    /// the first unclassifiable character; no recovery is attempted.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();
        while let Some(ch) = self.current() {
            if is_whitespace(ch) || ch == '\n' {
                self.advance();
                continue;
            }
            if ch == '注' && self.peek_next() == Some('：') {
                self.skip_comment();
                continue;
            }
            if ch == '“' {
                tokens.push(self.lex_string()?);
                continue;
            }
            if ch.is_ascii_digit() || is_numeral_unit(ch) {
                tokens.push(self.lex_number());
                continue;
            }
            if ch == '《' {
                tokens.push(self.lex_import()?);
                continue;
            }
            if let Some(kind) = punctuation(ch) {
                tokens.push(self.single(kind, ch));
                continue;
            }
            if let Some(token) = self.match_two_glyph() {
                tokens.push(token);
                continue;
            }
            if is_single_operator(ch) {
                tokens.push(self.single(TokenKind::Operator, ch));
                continue;
            }
            if is_letter(ch) {
                tokens.push(self.lex_word());
                continue;
            }
            return Err(LexerError::UnexpectedCharacter(ch, self.line, self.column));
        }
        tokens.push(Token::new(TokenKind::Eof, "", self.line, self.column));
        Ok(tokens)
    }

    #[inline]
    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    #[inline]
    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    #[inline]
    fn advance(&mut self) {
        if let Some(ch) = self.current() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.pos += 1;
        }
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.current() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn single(&mut self, kind: TokenKind, ch: char) -> Token {
        let token = Token::new(kind, ch.to_string(), self.line, self.column);
        self.advance();
        token
    }

    fn match_two_glyph(&mut self) -> Option<Token> {
        let first = self.current()?;
        let second = self.peek_next()?;
        let pair: String = [first, second].iter().collect();
        let kind = *TWO_GLYPH.get(pair.as_str())?;
        let token = Token::new(kind, pair, self.line, self.column);
        self.advance();
        self.advance();
        Some(token)
    }

    fn lex_string(&mut self) -> Result<Token, LexerError> {
        let (line, column) = (self.line, self.column);
        self.advance(); // opening “
        let mut content = String::new();
        loop {
            match self.current() {
                None => return Err(LexerError::UnterminatedString(line, column)),
                Some('”') => {
                    self.advance();
                    return Ok(Token::new(TokenKind::Text, content, line, column));
                }
                Some(ch) => {
                    content.push(ch);
                    self.advance();
                }
            }
        }
    }

    // Maximal run of ASCII digits and numeral-unit glyphs, kept verbatim.
    // Conversion to a numeric value happens in the parser.
    fn lex_number(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut raw = String::new();
        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() || is_numeral_unit(ch) {
                raw.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        Token::new(TokenKind::Number, raw, line, column)
    }

    fn lex_import(&mut self) -> Result<Token, LexerError> {
        let (line, column) = (self.line, self.column);
        self.advance(); // 《
        let mut name = String::new();
        loop {
            match self.current() {
                None => return Err(LexerError::UnterminatedImport(line, column)),
                Some('》') => {
                    self.advance();
                    return Ok(Token::new(TokenKind::ImportSymbol, name, line, column));
                }
                Some(ch) => {
                    name.push(ch);
                    self.advance();
                }
            }
        }
    }

    fn lex_word(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut word = String::new();
        while let Some(ch) = self.current() {
            if is_letter(ch) {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        let kind = KEYWORDS.get(word.as_str()).copied().unwrap_or(TokenKind::Identifier);
        Token::new(kind, word, line, column)
    }
}

fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\u{3000}' | '\u{FEFF}')
}

fn is_numeral_unit(ch: char) -> bool {
    matches!(ch, '十' | '百' | '千' | '万' | '亿')
}

fn is_letter(ch: char) -> bool {
    is_xid_start(ch)
}

fn is_single_operator(ch: char) -> bool {
    matches!(ch, '是' | '且' | '或')
}

fn punctuation(ch: char) -> Option<TokenKind> {
    match ch {
        '【' => Some(TokenKind::LeftBracket),
        '】' => Some(TokenKind::RightBracket),
        '：' => Some(TokenKind::Colon),
        '。' => Some(TokenKind::Period),
        '，' => Some(TokenKind::Comma),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_and_punctuation() {
        let got = kinds("涵义【甲】，需知：");
        assert_eq!(
            got,
            vec![
                TokenKind::Function,
                TokenKind::LeftBracket,
                TokenKind::Identifier,
                TokenKind::RightBracket,
                TokenKind::Comma,
                TokenKind::Param,
                TokenKind::Colon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn two_glyph_wins_over_single() {
        let tokens = Lexer::new("甲 不是 乙").tokenize().unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Operator);
        assert_eq!(tokens[1].text, "不是");
    }

    #[test]
    fn else_if_is_one_token() {
        let tokens = Lexer::new("或若 甲：").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::ElseIf);
    }

    #[test]
    fn number_keeps_unit_glyphs() {
        let tokens = Lexer::new("10万").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].text, "10万");
    }

    #[test]
    fn comment_runs_to_end_of_line() {
        let got = kinds("注：此乃注释\n甲");
        assert_eq!(got, vec![TokenKind::Identifier, TokenKind::Eof]);
    }

    #[test]
    fn unterminated_string_errors() {
        let err = Lexer::new("“无尾").tokenize().unwrap_err();
        assert!(matches!(err, LexerError::UnterminatedString(1, 1)));
    }

    #[test]
    fn unexpected_character_errors() {
        let err = Lexer::new("甲 # 乙").tokenize().unwrap_err();
        assert!(matches!(err, LexerError::UnexpectedCharacter('#', 1, 3)));
    }
}
