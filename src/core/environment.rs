// src/core/environment.rs
//! Parent-linked scope records. Each call frame owns its own variable map;
//! function/class/module tables are snapshotted (shallow-copied) into every
//! child frame at creation. Variable lookup and mutation walk the parent
//! chain; function/class/module lookup is local-only.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::core::ast::AstNode;
use crate::core::error::RuntimeError;
use crate::core::value::{Value, ValueDescriptor, BOOLEAN_CLASS, NUMBER_CLASS, TEXT_CLASS};
use crate::core::vm::Vm;

pub type EnvRef = Rc<RefCell<Environment>>;

pub type BuiltinExecutor = fn(&[(String, Value)], &mut Vm) -> Result<Value, RuntimeError>;

/// Declared parameter of a built-in function: a type name plus binding name.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedParam {
    pub type_name: String,
    pub name: String,
}

impl TypedParam {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self { type_name: type_name.into(), name: name.into() }
    }
}

#[derive(Debug, Clone)]
pub enum FunctionDescriptor {
    Builtin {
        parameters: Vec<TypedParam>,
        executor: BuiltinExecutor,
    },
    /// Holds the FunctionDeclaration subtree produced by the parser.
    User { declaration: AstNode },
}

/// validate/cast pair backing a class's raw-value behavior.
#[derive(Debug, Clone, Copy)]
pub struct RawValueAdapter {
    pub validate: fn(&ValueDescriptor) -> bool,
    pub cast: fn(&ValueDescriptor) -> Value,
}

/// Nominal runtime type. The grammar has no class-declaration form, so every
/// class alive in a run is one of the three seeded built-ins.
#[derive(Debug, Clone)]
pub struct ClassType {
    pub name: String,
    pub adapter: Option<RawValueAdapter>,
}

impl ClassType {
    /// Route a value through the adapter: validation failure is a TypeError
    /// naming the offending value and the target type.
    pub fn check_and_cast(&self, value: Value) -> Result<ValueDescriptor, RuntimeError> {
        let source = ValueDescriptor::infer(value);
        match self.adapter {
            Some(adapter) => {
                if !(adapter.validate)(&source) {
                    return Err(RuntimeError::type_error(format!(
                        "value 「{}」 does not conform to type `{}`",
                        source.value.display_string(),
                        self.name
                    )));
                }
                Ok(ValueDescriptor::new(self.name.clone(), (adapter.cast)(&source)))
            }
            None => Ok(ValueDescriptor::new(self.name.clone(), source.value)),
        }
    }
}

/// A flat named built-in library: functions plus optional variables.
#[derive(Debug, Clone, Default)]
pub struct ModuleLibrary {
    pub functions: HashMap<String, FunctionDescriptor>,
    pub variables: HashMap<String, ValueDescriptor>,
}

#[derive(Debug, Default)]
pub struct Environment {
    pub variables: HashMap<String, ValueDescriptor>,
    pub functions: HashMap<String, FunctionDescriptor>,
    pub classes: HashMap<String, ClassType>,
    pub modules: HashMap<String, ModuleLibrary>,
    parent: Option<EnvRef>,
}

impl Environment {
    /// Root environment with the three built-in classes seeded. The class
    /// registry is immutable afterwards: nothing in the grammar can redefine
    /// a class name.
    pub fn new_root() -> EnvRef {
        let mut env = Environment::default();
        env.classes.insert(
            TEXT_CLASS.into(),
            ClassType {
                name: TEXT_CLASS.into(),
                adapter: Some(RawValueAdapter { validate: text_validate, cast: text_cast }),
            },
        );
        env.classes.insert(
            NUMBER_CLASS.into(),
            ClassType {
                name: NUMBER_CLASS.into(),
                adapter: Some(RawValueAdapter { validate: number_validate, cast: number_cast }),
            },
        );
        env.classes.insert(
            BOOLEAN_CLASS.into(),
            ClassType {
                name: BOOLEAN_CLASS.into(),
                adapter: Some(RawValueAdapter { validate: boolean_validate, cast: boolean_cast }),
            },
        );
        Rc::new(RefCell::new(env))
    }

    /// New call frame: fresh variables, snapshot of the parent's function,
    /// class, and module tables, parent link for variable resolution.
    pub fn child_of(parent: &EnvRef) -> EnvRef {
        let snapshot = {
            let p = parent.borrow();
            (p.functions.clone(), p.classes.clone(), p.modules.clone())
        };
        Rc::new(RefCell::new(Environment {
            variables: HashMap::new(),
            functions: snapshot.0,
            classes: snapshot.1,
            modules: snapshot.2,
            parent: Some(Rc::clone(parent)),
        }))
    }

    /// Walk the parent chain outward until the name is found.
    pub fn lookup_variable(env: &EnvRef, name: &str) -> Option<ValueDescriptor> {
        let e = env.borrow();
        if let Some(descriptor) = e.variables.get(name) {
            return Some(descriptor.clone());
        }
        e.parent.as_ref().and_then(|p| Self::lookup_variable(p, name))
    }

    /// Replace an existing binding wherever it lives on the chain. Returns
    /// false when no frame holds the name.
    pub fn rebind_variable(env: &EnvRef, name: &str, descriptor: ValueDescriptor) -> bool {
        let mut e = env.borrow_mut();
        if let Some(slot) = e.variables.get_mut(name) {
            *slot = descriptor;
            return true;
        }
        match e.parent.as_ref() {
            Some(p) => Self::rebind_variable(&Rc::clone(p), name, descriptor),
            None => false,
        }
    }

    pub fn lookup_function(&self, name: &str) -> Option<FunctionDescriptor> {
        self.functions.get(name).cloned()
    }

    pub fn lookup_class(&self, name: &str) -> Option<ClassType> {
        self.classes.get(name).cloned()
    }
}

// 文言: everything validates; cast is string coercion.
fn text_validate(_: &ValueDescriptor) -> bool {
    true
}
fn text_cast(v: &ValueDescriptor) -> Value {
    Value::Text(v.value.display_string())
}

// 数: validates when the source parses to a finite number.
fn number_validate(v: &ValueDescriptor) -> bool {
    v.value.as_number().is_some()
}
fn number_cast(v: &ValueDescriptor) -> Value {
    Value::Number(v.value.as_number().unwrap_or(f64::NAN))
}

// 阴阳: everything validates; cast is truthy coercion.
fn boolean_validate(_: &ValueDescriptor) -> bool {
    true
}
fn boolean_cast(v: &ValueDescriptor) -> Value {
    Value::Boolean(v.value.truthy())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_lookup_walks_the_parent_chain() {
        let root = Environment::new_root();
        root.borrow_mut()
            .variables
            .insert("甲".into(), ValueDescriptor::new(NUMBER_CLASS, Value::Number(3.0)));
        let child = Environment::child_of(&root);
        let found = Environment::lookup_variable(&child, "甲").unwrap();
        assert_eq!(found.value, Value::Number(3.0));
    }

    #[test]
    fn rebind_mutates_the_owning_frame() {
        let root = Environment::new_root();
        root.borrow_mut()
            .variables
            .insert("甲".into(), ValueDescriptor::new(NUMBER_CLASS, Value::Number(3.0)));
        let child = Environment::child_of(&root);
        assert!(Environment::rebind_variable(
            &child,
            "甲",
            ValueDescriptor::new(NUMBER_CLASS, Value::Number(9.0)),
        ));
        let root_value = Environment::lookup_variable(&root, "甲").unwrap();
        assert_eq!(root_value.value, Value::Number(9.0));
    }

    #[test]
    fn function_tables_are_snapshots_not_live_views() {
        let root = Environment::new_root();
        let child = Environment::child_of(&root);
        root.borrow_mut().functions.insert(
            "后来".into(),
            FunctionDescriptor::Builtin { parameters: vec![], executor: |_, _| Ok(Value::Null) },
        );
        assert!(child.borrow().lookup_function("后来").is_none());
    }

    #[test]
    fn number_class_rejects_unparseable_text() {
        let root = Environment::new_root();
        let class = root.borrow().lookup_class(NUMBER_CLASS).unwrap();
        assert!(class.check_and_cast(Value::Text("三".into())).is_err());
        let ok = class.check_and_cast(Value::Text("12".into())).unwrap();
        assert_eq!(ok.value, Value::Number(12.0));
    }
}
