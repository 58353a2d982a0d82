use std::io::{self, BufRead, Write};

use colored::Colorize;

use crate::core::{compile, Runtime, Value};

const PROMPT: &str = " · ";
const EXIT_WORD: &str = "致知";

/// Interactive session against one persistent runtime, so bindings carry
/// over between entries. A line ending in ： opens a block; the block is
/// buffered until a blank line and then executed whole.
pub fn main() -> anyhow::Result<()> {
    println!("guwen {} — 致知 exits", env!("CARGO_PKG_VERSION"));
    let runtime = Runtime::new();
    let stdin = io::stdin();
    let mut buffer = String::new();

    loop {
        if buffer.is_empty() {
            print!("{}", PROMPT);
        } else {
            print!("{}", "…  ".dimmed());
        }
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF with an open block: run what was buffered before leaving.
            if !buffer.is_empty() {
                evaluate(&runtime, &buffer);
            }
            break;
        }
        let trimmed = line.trim_end();

        if buffer.is_empty() {
            if trimmed.trim() == EXIT_WORD {
                break;
            }
            if trimmed.trim().is_empty() {
                continue;
            }
            if trimmed.ends_with('：') {
                buffer.push_str(trimmed);
                buffer.push('\n');
                continue;
            }
            evaluate(&runtime, trimmed);
        } else if trimmed.trim().is_empty() {
            let entry = std::mem::take(&mut buffer);
            evaluate(&runtime, &entry);
        } else {
            buffer.push_str(trimmed);
            buffer.push('\n');
        }
    }
    Ok(())
}

fn evaluate(runtime: &Runtime, source: &str) {
    let program = match compile(source) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("{}{}", "译毕，有误：".red().bold(), err);
            return;
        }
    };
    match runtime.execute(&program) {
        Ok(Value::Null) => {}
        Ok(value) => println!("{}", value.display_string()),
        Err(err) => eprintln!("{}{}", "行毕，有误：".red().bold(), err),
    }
}
