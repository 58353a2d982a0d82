//! Recursive-descent parser with precedence climbing and indentation-based
//! block bodies (the column of the introducing keyword is the baseline; a
//! statement belongs to the block while its leading token sits strictly to
//! the right of that baseline).

use crate::core::ast::{AstNode, CallArgument, IfBranch, Parameter};
use crate::core::token::{Token, TokenKind};

#[derive(Debug, Clone)]
pub struct ParserError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for ParserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}:{}", self.message, self.line, self.column)
    }
}

impl std::error::Error for ParserError {}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    // Baselines of the enclosing blocks, innermost last.
    indents: Vec<usize>,
}

impl Parser {
    /// Create a new parser; a trailing EOF token is guaranteed.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        let needs_eof = match tokens.last() {
            Some(t) => !matches!(t.kind, TokenKind::Eof),
            None => true,
        };
        if needs_eof {
            tokens.push(Token::new(TokenKind::Eof, "", 0, 0));
        }
        Parser { tokens, pos: 0, indents: Vec::new() }
    }

    pub fn parse(&mut self) -> Result<AstNode, ParserError> {
        let mut body = Vec::new();
        while !self.is_at_end() {
            body.push(self.parse_statement()?);
        }
        Ok(AstNode::Program { body, line: 1, column: 1 })
    }

    fn parse_statement(&mut self) -> Result<AstNode, ParserError> {
        match self.peek().kind {
            TokenKind::ImportSymbol => self.parse_import(),
            TokenKind::Function => self.parse_function_decl(),
            TokenKind::Let => self.parse_let(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Repeat => self.parse_repeat(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Identifier if self.is_call_start() => self.parse_call(false),
            _ => {
                let expr = self.parse_expression()?;
                let _ = self.match_kind(TokenKind::Period); // optional terminator
                Ok(expr)
            }
        }
    }

    /// A statement-leading identifier starts a call when it is followed by the
    /// argument marker 已知 or by a bracketed argument group, optionally with
    /// an intervening comma.
    fn is_call_start(&self) -> bool {
        let marker = |k: TokenKind| matches!(k, TokenKind::Known | TokenKind::LeftBracket);
        let k1 = self.peek_at(1).kind;
        if marker(k1) {
            return true;
        }
        k1 == TokenKind::Comma && marker(self.peek_at(2).kind)
    }

    // 《模块》曰：符，符。
    fn parse_import(&mut self) -> Result<AstNode, ParserError> {
        let import_tok = self.advance().clone();
        let module = import_tok.text;

        let speaker = self.consume_identifier("expected 曰 after import symbol")?;
        if speaker != "曰" {
            return Err(self.err_at(
                &format!("expected 曰 after import symbol, found 「{}」", speaker),
                self.previous().line,
                self.previous().column,
            ));
        }
        self.consume(TokenKind::Colon, "expected ： after 曰")?;

        let mut symbols = Vec::new();
        while self.check(TokenKind::Identifier) {
            symbols.push(self.advance().text.clone());
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::Period, "expected 。 after import list")?;

        Ok(AstNode::ImportDeclaration {
            module,
            symbols,
            line: import_tok.line,
            column: import_tok.column,
        })
    }

    // 涵义【名】，需知 类【参】，类【参】： <indented body>
    fn parse_function_decl(&mut self) -> Result<AstNode, ParserError> {
        let function_tok = self.consume(TokenKind::Function, "expected 涵义")?.clone();

        self.consume(TokenKind::LeftBracket, "expected 【 after 涵义")?;
        let name = self.consume_identifier("expected function name")?;
        self.consume(TokenKind::RightBracket, "expected 】 after function name")?;
        self.consume(TokenKind::Comma, "expected ， after function name")?;
        self.consume(TokenKind::Param, "expected 需知")?;

        let mut parameters = Vec::new();
        while self.check(TokenKind::Identifier) {
            let type_tok = self.advance().clone();
            self.consume(TokenKind::LeftBracket, "expected 【 after parameter type")?;
            let param_name = self.consume_identifier("expected parameter name")?;
            self.consume(TokenKind::RightBracket, "expected 】 after parameter name")?;
            parameters.push(Parameter {
                type_name: type_tok.text,
                name: param_name,
                line: type_tok.line,
                column: type_tok.column,
            });
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::Colon, "expected ： before function body")?;

        let body = self.parse_block(function_tok.column)?;
        Ok(AstNode::FunctionDeclaration {
            name,
            parameters,
            body,
            line: function_tok.line,
            column: function_tok.column,
        })
    }

    // 令【名】为 类：值。  (declaration)   |   令 名 为 值。  (assignment)
    fn parse_let(&mut self) -> Result<AstNode, ParserError> {
        let let_tok = self.consume(TokenKind::Let, "expected 令")?.clone();

        if self.check(TokenKind::LeftBracket) {
            self.advance();
            let name = self.consume_identifier("expected variable name")?;
            self.consume(TokenKind::RightBracket, "expected 】 after variable name")?;
            self.consume(TokenKind::As, "expected 为 after variable name")?;
            let type_name = self.consume_identifier("expected type name")?;
            self.consume(TokenKind::Colon, "expected ： after type name")?;
            let value = self.parse_expression()?;
            self.consume(TokenKind::Period, "expected 。 after declaration")?;
            Ok(AstNode::VariableDeclaration {
                name,
                type_name,
                value: Box::new(value),
                line: let_tok.line,
                column: let_tok.column,
            })
        } else {
            let name = self.consume_identifier("expected variable name after 令")?;
            self.consume(TokenKind::As, "expected 为 in assignment")?;
            let value = self.parse_expression()?;
            self.consume(TokenKind::Period, "expected 。 after assignment")?;
            Ok(AstNode::VariableAssignment {
                name,
                value: Box::new(value),
                line: let_tok.line,
                column: let_tok.column,
            })
        }
    }

    // 若 条件： body (或若 条件： body)* (不然： body)?
    fn parse_if(&mut self) -> Result<AstNode, ParserError> {
        let if_tok = self.consume(TokenKind::If, "expected 若")?.clone();
        let baseline = if_tok.column;

        let condition = self.parse_expression()?;
        self.consume(TokenKind::Colon, "expected ： after condition")?;
        let body = self.parse_block(baseline)?;
        let mut branches = vec![IfBranch { condition, body }];

        while self.check(TokenKind::ElseIf) && self.peek().column == baseline {
            self.advance();
            let condition = self.parse_expression()?;
            self.consume(TokenKind::Colon, "expected ： after condition")?;
            let body = self.parse_block(baseline)?;
            branches.push(IfBranch { condition, body });
        }

        let else_body = if self.check(TokenKind::Else) && self.peek().column == baseline {
            self.advance();
            self.consume(TokenKind::Colon, "expected ： after 不然")?;
            Some(self.parse_block(baseline)?)
        } else {
            None
        };

        Ok(AstNode::IfStatement {
            branches,
            else_body,
            line: if_tok.line,
            column: if_tok.column,
        })
    }

    // 当 条件： body
    fn parse_while(&mut self) -> Result<AstNode, ParserError> {
        let while_tok = self.consume(TokenKind::While, "expected 当")?.clone();
        let condition = self.parse_expression()?;
        self.consume(TokenKind::Colon, "expected ： after condition")?;
        let body = self.parse_block(while_tok.column)?;
        Ok(AstNode::WhileStatement {
            condition: Box::new(condition),
            body,
            line: while_tok.line,
            column: while_tok.column,
        })
    }

    // 重复 次数 次： body   |   重复【序】次数 次： body
    fn parse_repeat(&mut self) -> Result<AstNode, ParserError> {
        let repeat_tok = self.consume(TokenKind::Repeat, "expected 重复")?.clone();

        let counter = if self.match_kind(TokenKind::LeftBracket) {
            let name = self.consume_identifier("expected counter name")?;
            self.consume(TokenKind::RightBracket, "expected 】 after counter name")?;
            Some(name)
        } else {
            None
        };

        let count = self.parse_expression()?;
        self.consume(TokenKind::Times, "expected 次 after repeat count")?;
        self.consume(TokenKind::Colon, "expected ： after 次")?;
        let body = self.parse_block(repeat_tok.column)?;

        Ok(AstNode::RepeatStatement {
            counter,
            count: Box::new(count),
            body,
            line: repeat_tok.line,
            column: repeat_tok.column,
        })
    }

    // 求 值。
    fn parse_return(&mut self) -> Result<AstNode, ParserError> {
        let return_tok = self.consume(TokenKind::Return, "expected 求")?.clone();
        let expression = self.parse_expression()?;
        self.consume(TokenKind::Period, "expected 。 after return value")?;
        Ok(AstNode::ReturnStatement {
            expression: Box::new(expression),
            line: return_tok.line,
            column: return_tok.column,
        })
    }

    // 名，已知【参】为 值，【参】为 值。
    // 已知 may precede any bracket group; nested calls omit the trailing 。
    fn parse_call(&mut self, nested: bool) -> Result<AstNode, ParserError> {
        let name_tok = self.advance().clone();
        let name = name_tok.text;

        if !nested {
            let _ = self.match_kind(TokenKind::Comma);
        }

        let mut arguments = Vec::new();
        loop {
            let _ = self.match_kind(TokenKind::Known);
            if !self.check(TokenKind::LeftBracket) {
                break;
            }
            self.advance();
            let arg_name = self.consume_identifier("expected argument name")?;
            self.consume(TokenKind::RightBracket, "expected 】 after argument name")?;
            self.consume(TokenKind::As, "expected 为 before argument value")?;
            let value = self.parse_expression()?;
            arguments.push(CallArgument { name: arg_name, value });
            // A nested call only keeps going past a comma when 已知 restates
            // the argument marker; a bare 【 after the comma belongs to the
            // enclosing call.
            let continues = self.check(TokenKind::Comma)
                && if nested {
                    self.peek_at(1).kind == TokenKind::Known
                } else {
                    matches!(self.peek_at(1).kind, TokenKind::Known | TokenKind::LeftBracket)
                };
            if !continues {
                break;
            }
            self.advance();
        }

        if !nested {
            self.consume(TokenKind::Period, "expected 。 after call")?;
        }

        Ok(AstNode::FunctionCall {
            name,
            arguments,
            line: name_tok.line,
            column: name_tok.column,
        })
    }

    /// Consume body statements while their leading token sits strictly to the
    /// right of the block baseline.
    fn parse_block(&mut self, baseline: usize) -> Result<Vec<AstNode>, ParserError> {
        self.indents.push(baseline);
        let mut body = Vec::new();
        while !self.is_at_end() && self.peek().column > self.current_baseline() {
            body.push(self.parse_statement()?);
        }
        self.indents.pop();
        Ok(body)
    }

    fn current_baseline(&self) -> usize {
        self.indents.last().copied().unwrap_or(0)
    }

    /* ── Expressions ─────────────────────────────────────── */

    pub fn parse_expression(&mut self) -> Result<AstNode, ParserError> {
        let mut expr = self.parse_or()?;
        // Lowest tier: a bare identifier between two expressions is an infix
        // spelling of the function by that name, applied to 左 and 右 at run
        // time. Only taken when another operand clearly follows.
        while self.check(TokenKind::Identifier)
            && matches!(
                self.peek_at(1).kind,
                TokenKind::Number | TokenKind::Text | TokenKind::Identifier
            )
        {
            let op = self.advance().text.clone();
            let right = self.parse_or()?;
            expr = self.binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<AstNode, ParserError> {
        let mut expr = self.parse_and()?;
        while let Some(op) = self.match_operator(&["或"]) {
            let right = self.parse_and()?;
            expr = self.binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<AstNode, ParserError> {
        let mut expr = self.parse_equality()?;
        while let Some(op) = self.match_operator(&["且"]) {
            let right = self.parse_equality()?;
            expr = self.binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> Result<AstNode, ParserError> {
        let mut expr = self.parse_additive()?;
        while let Some(op) = self.match_operator(&["是", "不是", "至少", "至多"]) {
            let right = self.parse_additive()?;
            expr = self.binary(op, expr, right);
        }
        Ok(expr)
    }

    // 加/减 are ordinary identifiers recognized by spelling, not operator
    // tokens; the evaluator re-reads the stored text.
    fn parse_additive(&mut self) -> Result<AstNode, ParserError> {
        let mut expr = self.parse_multiplicative()?;
        while let Some(op) = self.match_word_operator(&["加", "减"]) {
            let right = self.parse_multiplicative()?;
            expr = self.binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_multiplicative(&mut self) -> Result<AstNode, ParserError> {
        let mut expr = self.parse_power()?;
        while let Some(op) = self.match_word_operator(&["乘", "除", "余"]) {
            let right = self.parse_power()?;
            expr = self.binary(op, expr, right);
        }
        Ok(expr)
    }

    // Right-associative: recurses into itself on the right-hand side.
    fn parse_power(&mut self) -> Result<AstNode, ParserError> {
        let left = self.parse_primary()?;
        if let Some(op) = self.match_word_operator(&["幂"]) {
            let right = self.parse_power()?;
            return Ok(self.binary(op, left, right));
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<AstNode, ParserError> {
        // A nested call can appear anywhere an expression is expected.
        if self.check(TokenKind::Identifier) && self.peek_at(1).kind == TokenKind::Known {
            return self.parse_call(true);
        }

        let token = self.advance().clone();
        match token.kind {
            TokenKind::Number => {
                // Unit glyphs are decorative; only the digits carry value.
                let digits: String = token.text.chars().filter(char::is_ascii_digit).collect();
                if digits.is_empty() {
                    return Err(self.err_at(
                        &format!("number literal 「{}」 has no digits", token.text),
                        token.line,
                        token.column,
                    ));
                }
                let value = digits.parse::<f64>().map_err(|_| {
                    self.err_at(
                        &format!("invalid number literal 「{}」", token.text),
                        token.line,
                        token.column,
                    )
                })?;
                Ok(AstNode::NumberLiteral { value, line: token.line, column: token.column })
            }
            TokenKind::Text => Ok(AstNode::StringLiteral {
                value: token.text,
                line: token.line,
                column: token.column,
            }),
            TokenKind::Identifier => Ok(AstNode::Identifier {
                name: token.text,
                line: token.line,
                column: token.column,
            }),
            other => Err(self.err_at(
                &format!("expected an expression, found {}", other),
                token.line,
                token.column,
            )),
        }
    }

    fn binary(&self, operator: String, left: AstNode, right: AstNode) -> AstNode {
        let (line, column) = left.position();
        AstNode::BinaryExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            line,
            column,
        }
    }

    /* ── Token utils ─────────────────────────────────────── */

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.pos += 1;
        }
        self.previous()
    }

    fn previous(&self) -> &Token {
        if self.pos == 0 {
            &self.tokens[0]
        } else {
            &self.tokens[self.pos - 1]
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_at(&self, offset: usize) -> &Token {
        &self.tokens[(self.pos + offset).min(self.tokens.len() - 1)]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            return true;
        }
        false
    }

    /// Consume an Operator token whose spelling is one of `texts`.
    fn match_operator(&mut self, texts: &[&str]) -> Option<String> {
        if self.check(TokenKind::Operator) && texts.contains(&self.peek().text.as_str()) {
            return Some(self.advance().text.clone());
        }
        None
    }

    /// Consume an Identifier token whose spelling is one of `texts`.
    fn match_word_operator(&mut self, texts: &[&str]) -> Option<String> {
        if self.check(TokenKind::Identifier) && texts.contains(&self.peek().text.as_str()) {
            return Some(self.advance().text.clone());
        }
        None
    }

    fn consume(&mut self, kind: TokenKind, msg: &str) -> Result<&Token, ParserError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let found = self.peek();
            Err(ParserError {
                message: format!("{}, found {}", msg, found.kind),
                line: found.line,
                column: found.column,
            })
        }
    }

    fn consume_identifier(&mut self, msg: &str) -> Result<String, ParserError> {
        if self.check(TokenKind::Identifier) {
            Ok(self.advance().text.clone())
        } else {
            let found = self.peek();
            Err(ParserError {
                message: format!("{}, found {}", msg, found.kind),
                line: found.line,
                column: found.column,
            })
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn err_at(&self, msg: &str, line: usize, column: usize) -> ParserError {
        ParserError { message: msg.into(), line, column }
    }
}
