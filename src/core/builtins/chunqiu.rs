//! 《春秋》: explicit conversions between the three built-in classes. The
//! heavy lifting happens in the class adapters that coerce each declared
//! parameter before the executor runs, so the executors just hand the
//! coerced value back.

use crate::core::builtins::named;
use crate::core::environment::{FunctionDescriptor, ModuleLibrary, TypedParam};
use crate::core::error::RuntimeError;
use crate::core::value::{Value, BOOLEAN_CLASS, NUMBER_CLASS, TEXT_CLASS};
use crate::core::vm::Vm;

pub fn library() -> ModuleLibrary {
    let mut library = ModuleLibrary::default();
    library.functions.insert(
        "为文言".to_string(),
        FunctionDescriptor::Builtin {
            parameters: vec![TypedParam::new(TEXT_CLASS, "值")],
            executor: passthrough,
        },
    );
    library.functions.insert(
        "为数".to_string(),
        FunctionDescriptor::Builtin {
            parameters: vec![TypedParam::new(NUMBER_CLASS, "值")],
            executor: passthrough,
        },
    );
    library.functions.insert(
        "极化".to_string(),
        FunctionDescriptor::Builtin {
            parameters: vec![TypedParam::new(BOOLEAN_CLASS, "值")],
            executor: passthrough,
        },
    );
    library
}

fn passthrough(args: &[(String, Value)], _vm: &mut Vm) -> Result<Value, RuntimeError> {
    named(args, "值")
        .cloned()
        .ok_or_else(|| RuntimeError::internal("coerced argument `值` missing"))
}
