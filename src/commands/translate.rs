use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use colored::Colorize;

use crate::core::{Lexer, Parser};

/// Lex and parse a script, writing pretty-printed JSON dumps of the token
/// stream and the syntax tree next to the input by default.
pub fn main(
    input: PathBuf,
    tokens_out: Option<PathBuf>,
    ast_out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let source = fs::read_to_string(&input)
        .with_context(|| format!("could not read '{}'", input.display()))?;

    let tokens = match Lexer::new(&source).tokenize() {
        Ok(tokens) => tokens,
        Err(err) => {
            eprintln!("{}{}", "译毕，有误：".red().bold(), err);
            std::process::exit(1);
        }
    };
    let program = match Parser::new(tokens.clone()).parse() {
        Ok(program) => program,
        Err(err) => {
            eprintln!("{}{}", "译毕，有误：".red().bold(), err);
            std::process::exit(1);
        }
    };

    let tokens_path = tokens_out.unwrap_or_else(|| sibling(&input, "tokens.json"));
    let ast_path = ast_out.unwrap_or_else(|| sibling(&input, "ast.json"));

    let tokens_json = serde_json::to_string_pretty(&tokens)?;
    fs::write(&tokens_path, tokens_json)
        .with_context(|| format!("could not write '{}'", tokens_path.display()))?;

    let ast_json = serde_json::to_string_pretty(&program)?;
    fs::write(&ast_path, ast_json)
        .with_context(|| format!("could not write '{}'", ast_path.display()))?;

    println!("tokens → {}", tokens_path.display());
    println!("ast    → {}", ast_path.display());
    Ok(())
}

fn sibling(input: &PathBuf, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    input.with_file_name(format!("{}.{}", stem, suffix))
}
