//! 《天命》: chance. Both functions coerce their operands through 数 before
//! the executor sees them.

use rand::Rng;

use crate::core::builtins::named;
use crate::core::environment::{FunctionDescriptor, ModuleLibrary, TypedParam};
use crate::core::error::RuntimeError;
use crate::core::value::{Value, NUMBER_CLASS};
use crate::core::vm::Vm;

pub fn library() -> ModuleLibrary {
    let mut library = ModuleLibrary::default();
    library.functions.insert(
        "随缘".to_string(),
        FunctionDescriptor::Builtin {
            parameters: vec![
                TypedParam::new(NUMBER_CLASS, "始"),
                TypedParam::new(NUMBER_CLASS, "终"),
            ],
            executor: pick,
        },
    );
    library.functions.insert(
        "掷币".to_string(),
        FunctionDescriptor::Builtin {
            parameters: vec![TypedParam::new(NUMBER_CLASS, "势")],
            executor: flip,
        },
    );
    library
}

fn required_number(args: &[(String, Value)], name: &str) -> Result<f64, RuntimeError> {
    named(args, name)
        .and_then(Value::as_number)
        .ok_or_else(|| RuntimeError::internal(format!("coerced argument `{}` missing", name)))
}

/// Whole number drawn uniformly from the inclusive range 始..=终.
fn pick(args: &[(String, Value)], _vm: &mut Vm) -> Result<Value, RuntimeError> {
    let low = required_number(args, "始")?.ceil() as i64;
    let high = required_number(args, "终")?.floor() as i64;
    if low > high {
        return Err(RuntimeError::argument(format!(
            "随缘 range is empty: 始 {} exceeds 终 {}",
            low, high
        )));
    }
    let drawn = rand::thread_rng().gen_range(low..=high);
    Ok(Value::Number(drawn as f64))
}

/// True with probability 势 percent.
fn flip(args: &[(String, Value)], _vm: &mut Vm) -> Result<Value, RuntimeError> {
    let odds = (required_number(args, "势")? / 100.0).clamp(0.0, 1.0);
    Ok(Value::Boolean(rand::thread_rng().gen_bool(odds)))
}
