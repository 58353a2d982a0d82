use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use colored::Colorize;

use crate::core::{compile, Runtime};

/// Compile and run one script file. Front-end failures print with the
/// 译毕 (translation finished) prefix, runtime failures with 行毕
/// (execution finished); both exit nonzero through the anyhow chain.
pub fn main(input: PathBuf) -> anyhow::Result<()> {
    let source = fs::read_to_string(&input)
        .with_context(|| format!("could not read '{}'", input.display()))?;

    let program = match compile(&source) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("{}{}", "译毕，有误：".red().bold(), err);
            std::process::exit(1);
        }
    };

    let runtime = Runtime::new();
    if let Err(err) = runtime.execute(&program) {
        eprintln!("{}{}", "行毕，有误：".red().bold(), err);
        std::process::exit(1);
    }
    Ok(())
}
