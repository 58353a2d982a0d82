// src/core/ast.rs
//! AST definitions. Nodes are produced once by the parser and never mutated
//! during evaluation; every node carries its source position for diagnostics.
//! The whole tree serializes to JSON for the `translate` dump command.

use serde::Serialize;

/// Typed function parameter: `数【甲】` gives `type_name: 数, name: 甲`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub type_name: String,
    pub name: String,
    pub line: usize,
    pub column: usize,
}

/// One named call argument. Arguments are kept in source order so evaluation
/// order is left-to-right as written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallArgument {
    pub name: String,
    pub value: AstNode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfBranch {
    pub condition: AstNode,
    pub body: Vec<AstNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum AstNode {
    Program {
        body: Vec<AstNode>,
        line: usize,
        column: usize,
    },
    ImportDeclaration {
        module: String,
        symbols: Vec<String>,
        line: usize,
        column: usize,
    },
    FunctionDeclaration {
        name: String,
        parameters: Vec<Parameter>,
        body: Vec<AstNode>,
        line: usize,
        column: usize,
    },
    FunctionCall {
        name: String,
        arguments: Vec<CallArgument>,
        line: usize,
        column: usize,
    },
    ReturnStatement {
        expression: Box<AstNode>,
        line: usize,
        column: usize,
    },
    /// The operator is the literal source spelling (加, 至少, …); the
    /// evaluator gives it meaning.
    BinaryExpression {
        operator: String,
        left: Box<AstNode>,
        right: Box<AstNode>,
        line: usize,
        column: usize,
    },
    Identifier {
        name: String,
        line: usize,
        column: usize,
    },
    StringLiteral {
        value: String,
        line: usize,
        column: usize,
    },
    NumberLiteral {
        value: f64,
        line: usize,
        column: usize,
    },
    VariableDeclaration {
        name: String,
        type_name: String,
        value: Box<AstNode>,
        line: usize,
        column: usize,
    },
    VariableAssignment {
        name: String,
        value: Box<AstNode>,
        line: usize,
        column: usize,
    },
    IfStatement {
        branches: Vec<IfBranch>,
        else_body: Option<Vec<AstNode>>,
        line: usize,
        column: usize,
    },
    WhileStatement {
        condition: Box<AstNode>,
        body: Vec<AstNode>,
        line: usize,
        column: usize,
    },
    RepeatStatement {
        counter: Option<String>,
        count: Box<AstNode>,
        body: Vec<AstNode>,
        line: usize,
        column: usize,
    },
}

impl AstNode {
    pub fn position(&self) -> (usize, usize) {
        use AstNode::*;
        match self {
            Program { line, column, .. }
            | ImportDeclaration { line, column, .. }
            | FunctionDeclaration { line, column, .. }
            | FunctionCall { line, column, .. }
            | ReturnStatement { line, column, .. }
            | BinaryExpression { line, column, .. }
            | Identifier { line, column, .. }
            | StringLiteral { line, column, .. }
            | NumberLiteral { line, column, .. }
            | VariableDeclaration { line, column, .. }
            | VariableAssignment { line, column, .. }
            | IfStatement { line, column, .. }
            | WhileStatement { line, column, .. }
            | RepeatStatement { line, column, .. } => (*line, *column),
        }
    }

    /// Short node-kind name, used in internal-error messages.
    pub fn kind_name(&self) -> &'static str {
        use AstNode::*;
        match self {
            Program { .. } => "Program",
            ImportDeclaration { .. } => "ImportDeclaration",
            FunctionDeclaration { .. } => "FunctionDeclaration",
            FunctionCall { .. } => "FunctionCall",
            ReturnStatement { .. } => "ReturnStatement",
            BinaryExpression { .. } => "BinaryExpression",
            Identifier { .. } => "Identifier",
            StringLiteral { .. } => "StringLiteral",
            NumberLiteral { .. } => "NumberLiteral",
            VariableDeclaration { .. } => "VariableDeclaration",
            VariableAssignment { .. } => "VariableAssignment",
            IfStatement { .. } => "IfStatement",
            WhileStatement { .. } => "WhileStatement",
            RepeatStatement { .. } => "RepeatStatement",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_kind_tag() {
        let node = AstNode::NumberLiteral { value: 7.0, line: 1, column: 3 };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "NumberLiteral");
        assert_eq!(json["value"], 7.0);
    }

    #[test]
    fn position_is_uniform_across_kinds() {
        let node = AstNode::Identifier { name: "甲".into(), line: 2, column: 5 };
        assert_eq!(node.position(), (2, 5));
        assert_eq!(node.kind_name(), "Identifier");
    }
}
