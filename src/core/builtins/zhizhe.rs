//! 《志者》, the scribe: console input and output.

use std::io::{self, BufRead, Write};

use crate::core::builtins::named;
use crate::core::environment::{FunctionDescriptor, ModuleLibrary};
use crate::core::error::RuntimeError;
use crate::core::value::Value;
use crate::core::vm::Vm;

pub fn library() -> ModuleLibrary {
    let mut library = ModuleLibrary::default();
    library.functions.insert(
        "曰".to_string(),
        FunctionDescriptor::Builtin { parameters: Vec::new(), executor: speak },
    );
    library.functions.insert(
        "倾".to_string(),
        FunctionDescriptor::Builtin { parameters: Vec::new(), executor: listen },
    );
    library
}

/// Prints every supplied argument, space-separated, and returns the printed
/// line. Declares no parameters, so anything passed arrives uncoerced.
fn speak(args: &[(String, Value)], _vm: &mut Vm) -> Result<Value, RuntimeError> {
    let rendered: Vec<String> = args.iter().map(|(_, v)| v.display_string()).collect();
    let line = rendered.join(" ");
    println!("{}", line);
    Ok(Value::Text(line))
}

/// Reads one line from standard input, printing 提示 first when supplied.
fn listen(args: &[(String, Value)], _vm: &mut Vm) -> Result<Value, RuntimeError> {
    if let Some(prompt) = named(args, "提示") {
        print!("{}", prompt.display_string());
        io::stdout()
            .flush()
            .map_err(|e| RuntimeError::internal(format!("failed to flush stdout: {}", e)))?;
    }
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| RuntimeError::internal(format!("failed to read stdin: {}", e)))?;
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Value::Text(line))
}
