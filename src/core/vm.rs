//! Tree-walking evaluator. One `Vm` wraps one environment frame; every
//! user-function call builds a child frame and a fresh `Vm` around it whose
//! lifetime is bounded by that call. Statement executors thread a control-flow
//! result so 求 propagates out of nested if/while/repeat bodies.

use crate::core::ast::{AstNode, CallArgument, IfBranch};
use crate::core::environment::{Environment, EnvRef, FunctionDescriptor};
use crate::core::error::RuntimeError;
use crate::core::value::{Value, ValueDescriptor, BOOLEAN_CLASS};

/// Result of executing one statement.
#[derive(Debug)]
pub enum Flow {
    Normal(Value),
    Return(Value),
}

pub struct Vm {
    pub env: EnvRef,
}

impl Vm {
    pub fn new(env: EnvRef) -> Self {
        Self { env }
    }

    /// Execute a program, returning the last statement's value. A top-level
    /// 求 stops execution and yields its value.
    pub fn execute_program(&mut self, program: &AstNode) -> Result<Value, RuntimeError> {
        let AstNode::Program { body, .. } = program else {
            return Err(RuntimeError::internal(format!(
                "execute_program invoked on {} node",
                program.kind_name()
            )));
        };
        let mut last = Value::Null;
        for statement in body {
            match self.execute_node(statement)? {
                Flow::Normal(value) => last = value,
                Flow::Return(value) => return Ok(value),
            }
        }
        Ok(last)
    }

    pub fn execute_node(&mut self, node: &AstNode) -> Result<Flow, RuntimeError> {
        match node {
            AstNode::ImportDeclaration { module, symbols, line, column } => {
                self.execute_import(module, symbols, *line, *column)?;
                Ok(Flow::Normal(Value::Null))
            }
            AstNode::FunctionDeclaration { name, .. } => {
                // Declaring is pure bookkeeping; the body runs at call time.
                self.env
                    .borrow_mut()
                    .functions
                    .insert(name.clone(), FunctionDescriptor::User { declaration: node.clone() });
                Ok(Flow::Normal(Value::Null))
            }
            AstNode::ReturnStatement { expression, .. } => {
                let value = self.eval_expr(expression)?;
                Ok(Flow::Return(value))
            }
            AstNode::VariableDeclaration { name, type_name, value, line, column } => {
                self.execute_declaration(name, type_name, value, *line, *column)?;
                Ok(Flow::Normal(Value::Null))
            }
            AstNode::VariableAssignment { name, value, line, column } => {
                self.execute_assignment(name, value, *line, *column)?;
                Ok(Flow::Normal(Value::Null))
            }
            AstNode::IfStatement { branches, else_body, .. } => {
                self.execute_if(branches, else_body.as_deref())
            }
            AstNode::WhileStatement { condition, body, .. } => self.execute_while(condition, body),
            AstNode::RepeatStatement { counter, count, body, line, column } => {
                self.execute_repeat(counter.as_deref(), count, body, *line, *column)
            }
            AstNode::FunctionCall { .. }
            | AstNode::BinaryExpression { .. }
            | AstNode::Identifier { .. }
            | AstNode::StringLiteral { .. }
            | AstNode::NumberLiteral { .. } => Ok(Flow::Normal(self.eval_expr(node)?)),
            AstNode::Program { .. } => Err(RuntimeError::internal(
                "nested Program node reached the evaluator",
            )),
        }
    }

    fn execute_block(&mut self, body: &[AstNode]) -> Result<Flow, RuntimeError> {
        for statement in body {
            if let Flow::Return(value) = self.execute_node(statement)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal(Value::Null))
    }

    pub fn eval_expr(&mut self, node: &AstNode) -> Result<Value, RuntimeError> {
        match node {
            AstNode::NumberLiteral { value, .. } => Ok(Value::Number(*value)),
            AstNode::StringLiteral { value, .. } => Ok(Value::Text(value.clone())),
            AstNode::Identifier { name, line, column } => {
                self.resolve_identifier(name, *line, *column)
            }
            AstNode::BinaryExpression { operator, left, right, line, column } => {
                self.eval_binary(operator, left, right, *line, *column)
            }
            AstNode::FunctionCall { name, arguments, line, column } => {
                self.call_function(name, arguments, *line, *column)
            }
            other => Err(RuntimeError::internal(format!(
                "{} node reached the evaluator in expression position",
                other.kind_name()
            ))),
        }
    }

    /* ── Imports ─────────────────────────────────────────── */

    fn execute_import(
        &mut self,
        module: &str,
        symbols: &[String],
        line: usize,
        column: usize,
    ) -> Result<(), RuntimeError> {
        let library = self
            .env
            .borrow()
            .modules
            .get(module)
            .cloned()
            .ok_or_else(|| {
                RuntimeError::lookup(format!("unknown module 《{}》", module)).at(line, column)
            })?;
        for symbol in symbols {
            if let Some(function) = library.functions.get(symbol) {
                self.env.borrow_mut().functions.insert(symbol.clone(), function.clone());
            } else if let Some(variable) = library.variables.get(symbol) {
                self.env.borrow_mut().variables.insert(symbol.clone(), variable.clone());
            } else {
                return Err(RuntimeError::lookup(format!(
                    "module 《{}》 has no symbol `{}`",
                    module, symbol
                ))
                .at(line, column));
            }
        }
        Ok(())
    }

    /* ── Calls ───────────────────────────────────────────── */

    fn call_function(
        &mut self,
        name: &str,
        arguments: &[CallArgument],
        line: usize,
        column: usize,
    ) -> Result<Value, RuntimeError> {
        let descriptor = self.env.borrow().lookup_function(name).ok_or_else(|| {
            RuntimeError::lookup(format!("function `{}` is not yet defined", name))
                .at(line, column)
        })?;

        // Eager, left-to-right as written, in the caller's environment.
        let mut supplied = Vec::with_capacity(arguments.len());
        for argument in arguments {
            supplied.push((argument.name.clone(), self.eval_expr(&argument.value)?));
        }

        self.dispatch(name, descriptor, supplied, line, column)
    }

    /// Invoke a resolved descriptor with already-evaluated named arguments.
    fn dispatch(
        &mut self,
        name: &str,
        descriptor: FunctionDescriptor,
        supplied: Vec<(String, Value)>,
        line: usize,
        column: usize,
    ) -> Result<Value, RuntimeError> {
        match descriptor {
            FunctionDescriptor::Builtin { parameters, executor } => {
                let mut args: Vec<(String, Value)> = Vec::with_capacity(supplied.len());
                for parameter in &parameters {
                    let raw = take_named(&supplied, &parameter.name).ok_or_else(|| {
                        RuntimeError::argument(format!(
                            "call to `{}` is missing required argument `{}`",
                            name, parameter.name
                        ))
                        .at(line, column)
                    })?;
                    let class =
                        self.env.borrow().lookup_class(&parameter.type_name).ok_or_else(|| {
                            RuntimeError::type_error(format!(
                                "unknown type `{}`",
                                parameter.type_name
                            ))
                            .at(line, column)
                        })?;
                    let coerced =
                        class.check_and_cast(raw).map_err(|e| e.at(line, column))?;
                    args.push((parameter.name.clone(), coerced.value));
                }
                // Undeclared extras pass through uncoerced, in source order.
                for (arg_name, value) in supplied {
                    if !parameters.iter().any(|p| p.name == arg_name) {
                        args.push((arg_name, value));
                    }
                }
                executor(&args, self)
            }
            FunctionDescriptor::User { declaration } => {
                let AstNode::FunctionDeclaration { parameters, body, .. } = &declaration else {
                    return Err(RuntimeError::internal(format!(
                        "function `{}` is bound to a {} node",
                        name,
                        declaration.kind_name()
                    )));
                };

                let frame = Environment::child_of(&self.env);
                for parameter in parameters {
                    let value = take_named(&supplied, &parameter.name).ok_or_else(|| {
                        RuntimeError::argument(format!(
                            "call to `{}` is missing required argument `{}`",
                            name, parameter.name
                        ))
                        .at(line, column)
                    })?;
                    self.bind_parameter(&frame, &parameter.name, &parameter.type_name, value)
                        .map_err(|e| e.at(parameter.line, parameter.column))?;
                }

                let mut callee = Vm::new(frame);
                match callee.execute_block(body)? {
                    Flow::Return(value) => Ok(value),
                    Flow::Normal(_) => Ok(Value::Null),
                }
            }
        }
    }

    /// Function-valued arguments land in the frame's function table under the
    /// parameter name so the callee can invoke them; a text argument naming a
    /// function currently bound in the caller behaves the same way. Everything
    /// else routes through the declared class adapter, like 令 declarations.
    fn bind_parameter(
        &self,
        frame: &EnvRef,
        name: &str,
        type_name: &str,
        value: Value,
    ) -> Result<(), RuntimeError> {
        if let Value::Function(descriptor) = value {
            frame.borrow_mut().functions.insert(name.to_string(), descriptor);
            return Ok(());
        }
        if let Value::Text(ref spelled) = value {
            if let Some(descriptor) = self.env.borrow().lookup_function(spelled) {
                frame.borrow_mut().functions.insert(name.to_string(), descriptor);
                return Ok(());
            }
        }
        let class = frame
            .borrow()
            .lookup_class(type_name)
            .ok_or_else(|| RuntimeError::type_error(format!("unknown type `{}`", type_name)))?;
        let descriptor = class.check_and_cast(value)?;
        frame.borrow_mut().variables.insert(name.to_string(), descriptor);
        Ok(())
    }

    /* ── Expressions ─────────────────────────────────────── */

    fn resolve_identifier(
        &mut self,
        name: &str,
        line: usize,
        column: usize,
    ) -> Result<Value, RuntimeError> {
        match name {
            "阳" => Ok(Value::Boolean(true)),
            "阴" => Ok(Value::Boolean(false)),
            _ => {
                if let Some(descriptor) = Environment::lookup_variable(&self.env, name) {
                    return Ok(descriptor.value);
                }
                if let Some(function) = self.env.borrow().lookup_function(name) {
                    return Ok(Value::Function(function));
                }
                Err(RuntimeError::lookup(format!("`{}` is not yet declared", name))
                    .at(line, column))
            }
        }
    }

    fn eval_binary(
        &mut self,
        operator: &str,
        left: &AstNode,
        right: &AstNode,
        line: usize,
        column: usize,
    ) -> Result<Value, RuntimeError> {
        let lhs = self.eval_expr(left)?;
        let rhs = self.eval_expr(right)?;

        match operator {
            // Division and modulo by zero follow IEEE-754 float semantics.
            "加" => self.numeric(operator, lhs, rhs, line, column, |a, b| a + b),
            "减" => self.numeric(operator, lhs, rhs, line, column, |a, b| a - b),
            "乘" => self.numeric(operator, lhs, rhs, line, column, |a, b| a * b),
            "除" => self.numeric(operator, lhs, rhs, line, column, |a, b| a / b),
            "余" => self.numeric(operator, lhs, rhs, line, column, |a, b| a % b),
            "幂" => self.numeric(operator, lhs, rhs, line, column, f64::powf),
            "是" => Ok(Value::Boolean(lhs == rhs)),
            "不是" => Ok(Value::Boolean(lhs != rhs)),
            "至少" => self.comparison(operator, lhs, rhs, line, column, |a, b| a >= b),
            "至多" => self.comparison(operator, lhs, rhs, line, column, |a, b| a <= b),
            // Both operands are already evaluated; 且/或 do not short-circuit.
            "且" => Ok(Value::Boolean(lhs.truthy() && rhs.truthy())),
            "或" => Ok(Value::Boolean(lhs.truthy() || rhs.truthy())),
            other => {
                // A registered function can serve as an infix operator,
                // receiving its operands as 左 and 右.
                let descriptor = self.env.borrow().lookup_function(other);
                match descriptor {
                    Some(descriptor) => self.dispatch(
                        other,
                        descriptor,
                        vec![("左".to_string(), lhs), ("右".to_string(), rhs)],
                        line,
                        column,
                    ),
                    None => Err(RuntimeError::lookup(format!("unknown operator `{}`", other))
                        .at(line, column)),
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn numeric(
        &self,
        operator: &str,
        lhs: Value,
        rhs: Value,
        line: usize,
        column: usize,
        apply: fn(f64, f64) -> f64,
    ) -> Result<Value, RuntimeError> {
        let (a, b) = self.numeric_operands(operator, lhs, rhs, line, column)?;
        Ok(Value::Number(apply(a, b)))
    }

    #[allow(clippy::too_many_arguments)]
    fn comparison(
        &self,
        operator: &str,
        lhs: Value,
        rhs: Value,
        line: usize,
        column: usize,
        apply: fn(f64, f64) -> bool,
    ) -> Result<Value, RuntimeError> {
        let (a, b) = self.numeric_operands(operator, lhs, rhs, line, column)?;
        Ok(Value::Boolean(apply(a, b)))
    }

    fn numeric_operands(
        &self,
        operator: &str,
        lhs: Value,
        rhs: Value,
        line: usize,
        column: usize,
    ) -> Result<(f64, f64), RuntimeError> {
        let coerce = |value: Value| {
            value.as_number().ok_or_else(|| {
                RuntimeError::type_error(format!(
                    "operator `{}` requires numeric operands, got {} 「{}」",
                    operator,
                    value.type_label(),
                    value.display_string()
                ))
                .at(line, column)
            })
        };
        Ok((coerce(lhs)?, coerce(rhs)?))
    }

    /* ── Variables ───────────────────────────────────────── */

    fn execute_declaration(
        &mut self,
        name: &str,
        type_name: &str,
        value: &AstNode,
        line: usize,
        column: usize,
    ) -> Result<(), RuntimeError> {
        let evaluated = self.eval_expr(value)?;
        let class = self.env.borrow().lookup_class(type_name).ok_or_else(|| {
            RuntimeError::type_error(format!("unknown type `{}`", type_name)).at(line, column)
        })?;
        let descriptor = class.check_and_cast(evaluated).map_err(|e| e.at(line, column))?;
        // Declarations bind locally, never in an enclosing frame.
        self.env.borrow_mut().variables.insert(name.to_string(), descriptor);
        Ok(())
    }

    fn execute_assignment(
        &mut self,
        name: &str,
        value: &AstNode,
        line: usize,
        column: usize,
    ) -> Result<(), RuntimeError> {
        let evaluated = self.eval_expr(value)?;
        if let Some(existing) = Environment::lookup_variable(&self.env, name) {
            // Rebind in place, preserving the established type.
            let class = self.env.borrow().lookup_class(&existing.type_name).ok_or_else(|| {
                RuntimeError::type_error(format!("unknown type `{}`", existing.type_name))
                    .at(line, column)
            })?;
            let descriptor = class.check_and_cast(evaluated).map_err(|e| e.at(line, column))?;
            Environment::rebind_variable(&self.env, name, descriptor);
        } else {
            self.env
                .borrow_mut()
                .variables
                .insert(name.to_string(), ValueDescriptor::infer(evaluated));
        }
        Ok(())
    }

    /* ── Control flow ────────────────────────────────────── */

    fn condition_holds(&mut self, condition: &AstNode) -> Result<bool, RuntimeError> {
        let value = self.eval_expr(condition)?;
        let class = self.env.borrow().lookup_class(BOOLEAN_CLASS).ok_or_else(|| {
            RuntimeError::internal(format!("built-in class `{}` missing", BOOLEAN_CLASS))
        })?;
        Ok(class.check_and_cast(value)?.value.truthy())
    }

    fn execute_if(
        &mut self,
        branches: &[IfBranch],
        else_body: Option<&[AstNode]>,
    ) -> Result<Flow, RuntimeError> {
        for branch in branches {
            if self.condition_holds(&branch.condition)? {
                return self.execute_block(&branch.body);
            }
        }
        match else_body {
            Some(body) => self.execute_block(body),
            None => Ok(Flow::Normal(Value::Null)),
        }
    }

    // No iteration guard: an infinite loop in source is an infinite loop here.
    fn execute_while(
        &mut self,
        condition: &AstNode,
        body: &[AstNode],
    ) -> Result<Flow, RuntimeError> {
        while self.condition_holds(condition)? {
            if let Flow::Return(value) = self.execute_block(body)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal(Value::Null))
    }

    fn execute_repeat(
        &mut self,
        counter: Option<&str>,
        count: &AstNode,
        body: &[AstNode],
        line: usize,
        column: usize,
    ) -> Result<Flow, RuntimeError> {
        let evaluated = self.eval_expr(count)?;
        let times = evaluated.as_number().ok_or_else(|| {
            RuntimeError::type_error(format!(
                "repeat count must be numeric, got {} 「{}」",
                evaluated.type_label(),
                evaluated.display_string()
            ))
            .at(line, column)
        })?;
        let times = times.floor().max(0.0) as i64;

        for index in 1..=times {
            if let Some(name) = counter {
                // Counter is 1-based and lives in the current frame.
                self.env.borrow_mut().variables.insert(
                    name.to_string(),
                    ValueDescriptor::new(
                        crate::core::value::NUMBER_CLASS,
                        Value::Number(index as f64),
                    ),
                );
            }
            if let Flow::Return(value) = self.execute_block(body)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal(Value::Null))
    }
}

fn take_named(supplied: &[(String, Value)], name: &str) -> Option<Value> {
    supplied.iter().find(|(n, _)| n == name).map(|(_, v)| v.clone())
}
