pub mod ast;
pub mod builtins;
pub mod environment;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod token;
pub mod value;
pub mod vm;

use std::fmt;

pub use ast::AstNode;
pub use error::{RuntimeError, RuntimeErrorKind};
pub use lexer::{Lexer, LexerError};
pub use parser::{Parser, ParserError};
pub use runtime::Runtime;
pub use token::{Token, TokenKind};
pub use value::Value;

/// Either phase of the front end can reject a source text.
#[derive(Debug)]
pub enum CompileError {
    Lex(LexerError),
    Parse(ParserError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Lex(e) => write!(f, "{}", e),
            CompileError::Parse(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<LexerError> for CompileError {
    fn from(e: LexerError) -> Self {
        CompileError::Lex(e)
    }
}

impl From<ParserError> for CompileError {
    fn from(e: ParserError) -> Self {
        CompileError::Parse(e)
    }
}

/// Source text straight to a `Program` node.
pub fn compile(source: &str) -> Result<AstNode, CompileError> {
    let tokens = Lexer::new(source).tokenize()?;
    let program = Parser::new(tokens).parse()?;
    Ok(program)
}
