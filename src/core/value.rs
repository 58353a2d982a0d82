// src/core/value.rs
//! Runtime values and the (type name, value) descriptor pairs used for typed
//! variable bindings.

use crate::core::environment::FunctionDescriptor;

pub const TEXT_CLASS: &str = "文言";
pub const NUMBER_CLASS: &str = "数";
pub const BOOLEAN_CLASS: &str = "阴阳";

#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    Number(f64),
    Boolean(bool),
    Function(FunctionDescriptor),
    Null,
}

impl Value {
    /// String coercion, also used by the 文言 class adapter and 曰.
    pub fn display_string(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Value::Boolean(true) => "阳".into(),
            Value::Boolean(false) => "阴".into(),
            Value::Function(_) => "〈涵义〉".into(),
            Value::Null => "空".into(),
        }
    }

    /// Numeric coercion; `None` when the value does not parse to a finite
    /// number (the 数 adapter fails validation in that case).
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n).filter(|n| n.is_finite()),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            Value::Boolean(true) => Some(1.0),
            Value::Boolean(false) => Some(0.0),
            Value::Function(_) | Value::Null => None,
        }
    }

    /// Truthiness, also used by the 阴阳 class adapter and conditions.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Text(s) => !s.is_empty(),
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Boolean(b) => *b,
            Value::Function(_) => true,
            Value::Null => false,
        }
    }

    pub fn type_label(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::Function(_) => "function",
            Value::Null => "null",
        }
    }
}

// Structural equality; functions never compare equal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }
}

/// A value paired with its nominal type name.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueDescriptor {
    pub type_name: String,
    pub value: Value,
}

impl ValueDescriptor {
    pub fn new(type_name: impl Into<String>, value: Value) -> Self {
        Self { type_name: type_name.into(), value }
    }

    /// Type inference from the value's shape, used for untyped assignments:
    /// strings are 文言, booleans and 0/1 numerics are 阴阳, other numbers 数.
    pub fn infer(value: Value) -> Self {
        let type_name = match &value {
            Value::Text(_) => TEXT_CLASS,
            Value::Boolean(_) => BOOLEAN_CLASS,
            Value::Number(n) if *n == 0.0 || *n == 1.0 => BOOLEAN_CLASS,
            Value::Number(_) => NUMBER_CLASS,
            Value::Function(_) => "涵义",
            Value::Null => TEXT_CLASS,
        };
        Self::new(type_name, value)
    }
}
