//! Host-side entry point: owns the root environment, seeds the built-in
//! module registry, and runs parsed programs against it. A `Runtime` kept
//! alive across calls gives REPL sessions their accumulated state.

use crate::core::ast::AstNode;
use crate::core::builtins;
use crate::core::environment::{EnvRef, Environment, ModuleLibrary};
use crate::core::error::RuntimeError;
use crate::core::value::Value;
use crate::core::vm::Vm;

pub struct Runtime {
    root: EnvRef,
}

impl Runtime {
    pub fn new() -> Self {
        let root = Environment::new_root();
        for (name, library) in builtins::registry() {
            root.borrow_mut().modules.insert(name, library);
        }
        Self { root }
    }

    /// Register an extra module before any program runs against this runtime.
    pub fn register_module(&self, name: impl Into<String>, library: ModuleLibrary) {
        self.root.borrow_mut().modules.insert(name.into(), library);
    }

    /// Look up a registered module library by name; `None` when no module of
    /// that name exists. Imports resolve through the same registry.
    pub fn load_module(&self, name: &str) -> Option<ModuleLibrary> {
        self.root.borrow().modules.get(name).cloned()
    }

    /// Run a parsed program in the root environment. Declarations persist,
    /// so successive calls see each other's bindings.
    pub fn execute(&self, program: &AstNode) -> Result<Value, RuntimeError> {
        let mut vm = Vm::new(self.root.clone());
        vm.execute_program(program)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
