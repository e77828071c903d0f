//! Statement-at-a-time recursive-descent parser.
//!
//! [`Parser::next_statement`] parses one top-level statement per call. When a
//! statement fails to parse, the offending token is consumed before the error
//! is returned so the caller can retry from the following token.

use thiserror::Error;

use super::lexer::Lexer;
use super::node::{Node, NodeKind};
use super::token::{Position, Token, TokenKind};

/// Deepest statement/expression nesting accepted before giving up
const MAX_NESTING: usize = 256;

const ASSIGNMENT_OPERATORS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=", ">>>=",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at {position}")]
pub struct ParseError {
    pub message: String,
    pub position: Position,
}

type ParseResult<T> = std::result::Result<T, ParseError>;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        Self {
            tokens: Lexer::tokenize(source),
            pos: 0,
            depth: 0,
        }
    }

    /// Begin of the next unconsumed token
    #[must_use]
    pub fn position(&self) -> Position {
        self.peek().begin
    }

    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.peek().is_eof()
    }

    /// Parse the next top-level statement; `Ok(None)` at end of input
    pub fn next_statement(&mut self) -> ParseResult<Option<Node>> {
        if self.is_at_end() {
            return Ok(None);
        }
        self.depth = 0;
        match self.line() {
            Ok(node) => Ok(Some(node)),
            Err(err) => {
                if !self.is_at_end() {
                    self.pos += 1;
                }
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------

    fn peek(&self) -> &Token {
        self.peek_at(self.pos)
    }

    fn peek_at(&self, index: usize) -> &Token {
        &self.tokens[index.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    fn check_punct(&self, text: &str) -> bool {
        self.peek().is_punct(text)
    }

    fn check_keyword(&self, text: &str) -> bool {
        self.peek().is_keyword(text)
    }

    fn eat_punct(&mut self, text: &str) -> bool {
        if self.check_punct(text) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, text: &str) -> bool {
        if self.check_keyword(text) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, text: &str) -> ParseResult<()> {
        if self.eat_punct(text) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{text}'")))
        }
    }

    fn expect_keyword(&mut self, text: &str) -> ParseResult<()> {
        if self.eat_keyword(text) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{text}'")))
        }
    }

    fn expect_identifier(&mut self) -> ParseResult<String> {
        if self.peek().is_identifier() {
            let name = self.peek().text.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.error("expected identifier"))
        }
    }

    fn error(&self, message: &str) -> ParseError {
        let token = self.peek();
        ParseError {
            message: format!("{message}, found {}", token.describe()),
            position: token.begin,
        }
    }

    fn node(&self, kind: NodeKind, start: usize, children: Vec<Node>) -> Node {
        let end = self.pos.max(start + 1).min(self.tokens.len());
        Node::from_tokens(kind, &self.tokens[start..end], children)
    }

    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Consume one `>` from the current token, splitting `>>`, `>=` and
    /// friends when they close nested type arguments
    fn close_angle(&mut self) -> ParseResult<()> {
        let token = self.peek().clone();
        if token.kind != TokenKind::Punct || !token.text.starts_with('>') {
            return Err(self.error("expected '>'"));
        }
        if token.text.len() > 1 {
            let close = Token::new(TokenKind::Punct, ">", token.begin, token.begin);
            let rest_begin = Position::new(token.begin.line, token.begin.column + 1);
            let rest = Token::new(TokenKind::Punct, &token.text[1..], rest_begin, token.end);
            self.tokens[self.pos] = rest;
            self.tokens.insert(self.pos, close);
        }
        self.advance();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lookahead (index based, never consumes)
    // ------------------------------------------------------------------

    fn skip_modifiers(&self, mut index: usize) -> usize {
        loop {
            let token = self.peek_at(index);
            let next = self.peek_at(index + 1);
            let is_statement = (token.is_keyword("synchronized") && next.is_punct("("))
                || (token.is_keyword("default") && next.is_punct(":"));
            if token.is_modifier() && !is_statement {
                index += 1;
            } else {
                return index;
            }
        }
    }

    /// Index just past a type starting at `index`, if one is there
    fn skip_type(&self, mut index: usize) -> Option<usize> {
        let first = self.peek_at(index);
        if first.is_primitive_type() {
            index += 1;
        } else if first.is_identifier() {
            index += 1;
            while self.peek_at(index).is_punct(".") && self.peek_at(index + 1).is_identifier() {
                index += 2;
            }
        } else {
            return None;
        }

        if self.peek_at(index).is_punct("<") {
            index = self.skip_type_arguments(index)?;
        }
        while self.peek_at(index).is_punct("[") && self.peek_at(index + 1).is_punct("]") {
            index += 2;
        }
        Some(index)
    }

    fn skip_type_arguments(&self, mut index: usize) -> Option<usize> {
        let mut depth: isize = 0;
        loop {
            let token = self.peek_at(index);
            match (token.kind, token.text.as_str()) {
                (TokenKind::Punct, "<") => depth += 1,
                (TokenKind::Punct, ">") => depth -= 1,
                (TokenKind::Punct, ">>") => depth -= 2,
                (TokenKind::Punct, ">>>") => depth -= 3,
                (TokenKind::Punct, "?" | "," | "." | "[" | "]" | "&") => {}
                (TokenKind::Identifier, _) => {}
                (TokenKind::Keyword, "extends" | "super") => {}
                (TokenKind::Keyword, _) if token.is_primitive_type() => {}
                _ => return None,
            }
            index += 1;
            if depth <= 0 {
                return Some(index);
            }
        }
    }

    fn matching_paren(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut index = open;
        loop {
            let token = self.peek_at(index);
            if token.is_eof() {
                return None;
            }
            if token.is_punct("(") {
                depth += 1;
            } else if token.is_punct(")") {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            index += 1;
        }
    }

    fn is_method_declaration(&self, index: usize) -> bool {
        let first = self.peek_at(index);
        if first.is_identifier() && self.peek_at(index + 1).is_punct("(") {
            return self.matching_paren(index + 1).is_some_and(|close| {
                let after = self.peek_at(close + 1);
                after.is_punct("{") || after.is_keyword("throws")
            });
        }
        self.skip_type(index).is_some_and(|after_type| {
            self.peek_at(after_type).is_identifier()
                && self.peek_at(after_type + 1).is_punct("(")
        })
    }

    fn is_typed_variable(&self, index: usize) -> bool {
        self.skip_type(index).is_some_and(|after_type| {
            let follow = self.peek_at(after_type + 1);
            self.peek_at(after_type).is_identifier()
                && ["=", ";", ",", "["].iter().any(|p| follow.is_punct(p))
        })
    }

    fn is_enhanced_for(&self) -> bool {
        let index = self.skip_modifiers(self.pos);
        if self.peek_at(index).is_identifier() && self.peek_at(index + 1).is_punct(":") {
            return true;
        }
        self.skip_type(index).is_some_and(|after_type| {
            self.peek_at(after_type).is_identifier()
                && self.peek_at(after_type + 1).is_punct(":")
        })
    }

    fn is_cast(&self) -> bool {
        let index = self.pos + 1;
        let Some(close) = self.skip_type(index) else {
            return false;
        };
        if !self.peek_at(close).is_punct(")") {
            return false;
        }
        if self.peek_at(index).is_primitive_type() {
            return true;
        }
        let operand = self.peek_at(close + 1);
        operand.is_identifier()
            || operand.is_literal()
            || operand.is_punct("(")
            || operand.is_punct("!")
            || operand.is_punct("~")
            || ["this", "super", "new"].iter().any(|k| operand.is_keyword(k))
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn line(&mut self) -> ParseResult<Node> {
        if self.check_keyword("package") {
            self.package_declaration()
        } else {
            self.block_statement()
        }
    }

    /// Imports are allowed in any block, not only at the top level
    fn block_statement(&mut self) -> ParseResult<Node> {
        if self.check_keyword("import") {
            return self.import_declaration();
        }
        let index = self.skip_modifiers(self.pos);
        let token = self.peek_at(index);
        if token.is_keyword("class") || token.is_keyword("interface") {
            self.class_declaration()
        } else if self.is_method_declaration(index) {
            self.method_declaration()
        } else if self.is_typed_variable(index) {
            self.typed_variable_declaration(true)
        } else if index > self.pos && token.is_punct("{") {
            // `static { ... }` initializer
            self.pos = index;
            self.block()
        } else {
            self.statement()
        }
    }

    fn import_declaration(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        self.expect_keyword("import")?;
        let static_import = self.eat_keyword("static");

        if self.eat_punct("*") {
            self.expect_punct(";")?;
            let kind = NodeKind::Import {
                static_import,
                super_import: true,
                package_import: false,
            };
            return Ok(self.node(kind, start, Vec::new()));
        }

        let name = self.ambiguous_name()?;
        let package_import = if self.check_punct(".") && self.peek_at(self.pos + 1).is_punct("*") {
            self.advance();
            self.advance();
            true
        } else {
            false
        };
        self.expect_punct(";")?;

        let kind = NodeKind::Import {
            static_import,
            super_import: false,
            package_import,
        };
        Ok(self.node(kind, start, vec![name]))
    }

    fn package_declaration(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        self.expect_keyword("package")?;
        let name = self.ambiguous_name()?;
        self.expect_punct(";")?;
        Ok(self.node(NodeKind::PackageDeclaration, start, vec![name]))
    }

    fn ambiguous_name(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        self.expect_identifier()?;
        while self.check_punct(".") && self.peek_at(self.pos + 1).is_identifier() {
            self.advance();
            self.advance();
        }
        Ok(self.node(NodeKind::AmbiguousName, start, Vec::new()))
    }

    /// A class name as used after `extends`/`implements`; type arguments are
    /// consumed but not part of the name
    fn class_reference(&mut self) -> ParseResult<Node> {
        let name = self.ambiguous_name()?;
        if self.check_punct("<") {
            self.type_arguments()?;
        }
        Ok(name)
    }

    fn class_reference_list(&mut self, into: &mut Vec<Node>) -> ParseResult<usize> {
        let mut count = 0;
        loop {
            into.push(self.class_reference()?);
            count += 1;
            if !self.eat_punct(",") {
                return Ok(count);
            }
        }
    }

    fn class_declaration(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        while self.peek().is_modifier() {
            self.advance();
        }
        let is_interface = self.check_keyword("interface");
        if !self.eat_keyword("class") && !self.eat_keyword("interface") {
            return Err(self.error("expected 'class' or 'interface'"));
        }
        let name = self.expect_identifier()?;
        if self.check_punct("<") {
            self.type_parameters()?;
        }

        let mut children = Vec::new();
        let mut has_superclass = false;
        let mut num_interfaces = 0;

        if self.eat_keyword("extends") {
            if is_interface {
                num_interfaces += self.class_reference_list(&mut children)?;
            } else {
                children.push(self.class_reference()?);
                has_superclass = true;
            }
        }
        if self.eat_keyword("implements") {
            num_interfaces += self.class_reference_list(&mut children)?;
        }
        children.push(self.block()?);

        let kind = NodeKind::ClassDeclaration {
            name,
            is_interface,
            has_superclass,
            num_interfaces,
        };
        Ok(self.node(kind, start, children))
    }

    fn method_declaration(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        while self.peek().is_modifier() {
            self.advance();
        }

        let mut children = Vec::new();
        if !(self.peek().is_identifier() && self.peek_at(self.pos + 1).is_punct("(")) {
            let type_start = self.pos;
            let return_type = self.parse_type()?;
            children.push(self.node(NodeKind::ReturnType, type_start, vec![return_type]));
        }

        let name = self.expect_identifier()?;
        children.push(self.formal_parameters()?);
        while self.check_punct("[") && self.peek_at(self.pos + 1).is_punct("]") {
            self.advance();
            self.advance();
        }
        if self.eat_keyword("throws") {
            self.class_reference_list(&mut children)?;
        }
        if self.check_punct("{") {
            children.push(self.block()?);
        } else {
            self.expect_punct(";")?;
        }

        Ok(self.node(NodeKind::MethodDeclaration { name }, start, children))
    }

    fn formal_parameters(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        self.expect_punct("(")?;
        let mut children = Vec::new();
        if !self.check_punct(")") {
            loop {
                children.push(self.formal_parameter()?);
                if !self.eat_punct(",") {
                    break;
                }
            }
        }
        self.expect_punct(")")?;
        Ok(self.node(NodeKind::FormalParameters, start, children))
    }

    fn formal_parameter(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        while self.peek().is_modifier() {
            self.advance();
        }
        let mut children = Vec::new();
        let untyped = self.peek().is_identifier()
            && (self.peek_at(self.pos + 1).is_punct(",") || self.peek_at(self.pos + 1).is_punct(")"));
        if !untyped {
            children.push(self.parse_type()?);
            self.eat_punct("...");
        }
        let name = self.expect_identifier()?;
        while self.check_punct("[") && self.peek_at(self.pos + 1).is_punct("]") {
            self.advance();
            self.advance();
        }
        Ok(self.node(NodeKind::FormalParameter { name }, start, children))
    }

    fn parse_type(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        if self.peek().is_primitive_type() {
            self.advance();
        } else if self.peek().is_identifier() {
            self.advance();
            while self.check_punct(".") && self.peek_at(self.pos + 1).is_identifier() {
                self.advance();
                self.advance();
            }
        } else {
            return Err(self.error("expected type"));
        }

        if self.check_punct("<") {
            self.type_arguments()?;
        }
        while self.check_punct("[") && self.peek_at(self.pos + 1).is_punct("]") {
            self.advance();
            self.advance();
        }
        Ok(self.node(NodeKind::Type, start, Vec::new()))
    }

    fn type_arguments(&mut self) -> ParseResult<()> {
        self.nested(|p| {
            p.expect_punct("<")?;
            if p.peek().text.starts_with('>') {
                return p.close_angle();
            }
            loop {
                if p.eat_punct("?") {
                    if p.eat_keyword("extends") || p.eat_keyword("super") {
                        p.parse_type()?;
                    }
                } else {
                    p.parse_type()?;
                }
                if !p.eat_punct(",") {
                    break;
                }
            }
            p.close_angle()
        })
    }

    /// Type parameters of a class header, e.g. `<K extends Number & Key, V>`
    fn type_parameters(&mut self) -> ParseResult<()> {
        self.nested(|p| {
            p.expect_punct("<")?;
            loop {
                p.expect_identifier()?;
                if p.eat_keyword("extends") {
                    p.parse_type()?;
                    while p.eat_punct("&") {
                        p.parse_type()?;
                    }
                }
                if !p.eat_punct(",") {
                    break;
                }
            }
            p.close_angle()
        })
    }

    fn typed_variable_declaration(&mut self, require_semicolon: bool) -> ParseResult<Node> {
        let start = self.pos;
        let mut modifiers = Vec::new();
        while self.peek().is_modifier() {
            modifiers.push(self.peek().text.clone());
            self.advance();
        }

        let mut children = vec![self.parse_type()?];
        loop {
            children.push(self.variable_declarator()?);
            if !self.eat_punct(",") {
                break;
            }
        }
        if require_semicolon {
            self.expect_punct(";")?;
        }

        Ok(self.node(
            NodeKind::TypedVariableDeclaration { modifiers },
            start,
            children,
        ))
    }

    fn variable_declarator(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        let name = self.expect_identifier()?;
        while self.check_punct("[") && self.peek_at(self.pos + 1).is_punct("]") {
            self.advance();
            self.advance();
        }
        let mut children = Vec::new();
        if self.eat_punct("=") {
            children.push(self.variable_initializer()?);
        }
        Ok(self.node(NodeKind::VariableDeclarator { name }, start, children))
    }

    fn variable_initializer(&mut self) -> ParseResult<Node> {
        if self.check_punct("{") {
            self.array_initializer()
        } else {
            self.expression()
        }
    }

    fn array_initializer(&mut self) -> ParseResult<Node> {
        self.nested(|p| {
            let start = p.pos;
            p.expect_punct("{")?;
            let mut children = Vec::new();
            while !p.check_punct("}") {
                children.push(p.variable_initializer()?);
                if !p.eat_punct(",") {
                    break;
                }
            }
            p.expect_punct("}")?;
            Ok(p.node(NodeKind::ArrayInitializer, start, children))
        })
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn block(&mut self) -> ParseResult<Node> {
        self.nested(|p| {
            let start = p.pos;
            p.expect_punct("{")?;
            let mut children = Vec::new();
            while !p.check_punct("}") && !p.is_at_end() {
                children.push(p.block_statement()?);
            }
            p.expect_punct("}")?;
            Ok(p.node(NodeKind::Block, start, children))
        })
    }

    fn statement(&mut self) -> ParseResult<Node> {
        self.nested(Self::statement_inner)
    }

    fn statement_inner(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        let token = self.peek().clone();

        if token.is_punct("{") {
            return self.block();
        }
        if token.is_punct(";") {
            self.advance();
            return Ok(self.node(NodeKind::EmptyStatement, start, Vec::new()));
        }
        if token.is_identifier() && self.peek_at(self.pos + 1).is_punct(":") {
            self.advance();
            self.advance();
            let body = self.statement()?;
            return Ok(self.node(NodeKind::LabeledStatement, start, vec![body]));
        }
        if token.kind == TokenKind::Keyword {
            match token.text.as_str() {
                "if" => return self.if_statement(),
                "while" => return self.while_statement(),
                "do" => return self.do_statement(),
                "for" => return self.for_statement(),
                "switch" => return self.switch_statement(),
                "try" => return self.try_statement(),
                "synchronized" => return self.synchronized_statement(),
                "return" => {
                    self.advance();
                    let mut children = Vec::new();
                    if !self.check_punct(";") {
                        children.push(self.expression()?);
                    }
                    self.expect_punct(";")?;
                    return Ok(self.node(NodeKind::ReturnStatement, start, children));
                }
                "throw" => {
                    self.advance();
                    let value = self.expression()?;
                    self.expect_punct(";")?;
                    return Ok(self.node(NodeKind::ThrowStatement, start, vec![value]));
                }
                "break" | "continue" => {
                    self.advance();
                    if self.peek().is_identifier() {
                        self.advance();
                    }
                    self.expect_punct(";")?;
                    let kind = if token.text == "break" {
                        NodeKind::BreakStatement
                    } else {
                        NodeKind::ContinueStatement
                    };
                    return Ok(self.node(kind, start, Vec::new()));
                }
                _ => {}
            }
        }

        let expression = self.expression()?;
        self.expect_punct(";")?;
        Ok(expression)
    }

    fn parenthesized(&mut self) -> ParseResult<Node> {
        self.expect_punct("(")?;
        let expression = self.expression()?;
        self.expect_punct(")")?;
        Ok(expression)
    }

    fn if_statement(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        self.expect_keyword("if")?;
        let mut children = vec![self.parenthesized()?, self.statement()?];
        if self.eat_keyword("else") {
            children.push(self.statement()?);
        }
        Ok(self.node(NodeKind::IfStatement, start, children))
    }

    fn while_statement(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        self.expect_keyword("while")?;
        let children = vec![self.parenthesized()?, self.statement()?];
        Ok(self.node(NodeKind::WhileStatement, start, children))
    }

    fn do_statement(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        self.expect_keyword("do")?;
        let body = self.statement()?;
        self.expect_keyword("while")?;
        let condition = self.parenthesized()?;
        self.expect_punct(";")?;
        Ok(self.node(NodeKind::DoStatement, start, vec![body, condition]))
    }

    fn for_statement(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        self.expect_keyword("for")?;
        self.expect_punct("(")?;
        let mut children = Vec::new();

        if self.is_enhanced_for() {
            while self.peek().is_modifier() {
                self.advance();
            }
            if !self.peek_at(self.pos + 1).is_punct(":") {
                children.push(self.parse_type()?);
            }
            self.expect_identifier()?;
            self.expect_punct(":")?;
            children.push(self.expression()?);
            self.expect_punct(")")?;
            children.push(self.statement()?);
            return Ok(self.node(NodeKind::EnhancedForStatement, start, children));
        }

        if !self.check_punct(";") {
            let index = self.skip_modifiers(self.pos);
            if self.is_typed_variable(index) {
                children.push(self.typed_variable_declaration(false)?);
            } else {
                self.expression_list(&mut children)?;
            }
        }
        self.expect_punct(";")?;
        if !self.check_punct(";") {
            children.push(self.expression()?);
        }
        self.expect_punct(";")?;
        if !self.check_punct(")") {
            self.expression_list(&mut children)?;
        }
        self.expect_punct(")")?;
        children.push(self.statement()?);
        Ok(self.node(NodeKind::ForStatement, start, children))
    }

    fn expression_list(&mut self, into: &mut Vec<Node>) -> ParseResult<()> {
        loop {
            into.push(self.expression()?);
            if !self.eat_punct(",") {
                return Ok(());
            }
        }
    }

    fn switch_statement(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        self.expect_keyword("switch")?;
        let mut children = vec![self.parenthesized()?];
        self.expect_punct("{")?;
        while !self.check_punct("}") && !self.is_at_end() {
            let label_start = self.pos;
            if self.eat_keyword("case") {
                let value = self.expression()?;
                self.expect_punct(":")?;
                children.push(self.node(NodeKind::SwitchLabel, label_start, vec![value]));
            } else if self.check_keyword("default") && self.peek_at(self.pos + 1).is_punct(":") {
                self.advance();
                self.advance();
                children.push(self.node(NodeKind::SwitchLabel, label_start, Vec::new()));
            } else {
                children.push(self.block_statement()?);
            }
        }
        self.expect_punct("}")?;
        Ok(self.node(NodeKind::SwitchStatement, start, children))
    }

    fn try_statement(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        self.expect_keyword("try")?;
        if self.check_punct("(") {
            let close = self
                .matching_paren(self.pos)
                .ok_or_else(|| self.error("unclosed resource list"))?;
            self.pos = close + 1;
        }
        let mut children = vec![self.block()?];

        while self.check_keyword("catch") {
            let catch_start = self.pos;
            self.advance();
            self.expect_punct("(")?;
            while self.peek().is_modifier() {
                self.advance();
            }
            let mut catch_children = Vec::new();
            if !(self.peek().is_identifier() && self.peek_at(self.pos + 1).is_punct(")")) {
                catch_children.push(self.parse_type()?);
                while self.eat_punct("|") {
                    catch_children.push(self.parse_type()?);
                }
            }
            self.expect_identifier()?;
            self.expect_punct(")")?;
            catch_children.push(self.block()?);
            children.push(self.node(NodeKind::CatchClause, catch_start, catch_children));
        }
        if self.eat_keyword("finally") {
            children.push(self.block()?);
        }
        Ok(self.node(NodeKind::TryStatement, start, children))
    }

    fn synchronized_statement(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        self.expect_keyword("synchronized")?;
        let children = vec![self.parenthesized()?, self.block()?];
        Ok(self.node(NodeKind::SynchronizedStatement, start, children))
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn expression(&mut self) -> ParseResult<Node> {
        self.nested(|p| {
            let start = p.pos;
            let target = p.conditional()?;

            let token = p.peek();
            if token.kind != TokenKind::Punct || !ASSIGNMENT_OPERATORS.contains(&token.text.as_str())
            {
                return Ok(target);
            }
            if !matches!(target.kind, NodeKind::PrimaryExpression) {
                return Err(p.error("invalid assignment target"));
            }
            let operator = token.text.clone();
            p.advance();
            let value = p.variable_initializer()?;
            Ok(p.node(NodeKind::Assignment { operator }, start, vec![target, value]))
        })
    }

    fn conditional(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        let condition = self.binary(0)?;
        if !self.eat_punct("?") {
            return Ok(condition);
        }
        let when_true = self.expression()?;
        self.expect_punct(":")?;
        let when_false = self.nested(Self::conditional)?;
        Ok(self.node(
            NodeKind::TernaryExpression,
            start,
            vec![condition, when_true, when_false],
        ))
    }

    fn binary_precedence(token: &Token) -> Option<u8> {
        if token.is_keyword("instanceof") {
            return Some(7);
        }
        if token.kind != TokenKind::Punct {
            return None;
        }
        match token.text.as_str() {
            "||" => Some(1),
            "&&" => Some(2),
            "|" => Some(3),
            "^" => Some(4),
            "&" => Some(5),
            "==" | "!=" => Some(6),
            "<" | ">" | "<=" | ">=" => Some(7),
            "<<" | ">>" | ">>>" => Some(8),
            "+" | "-" => Some(9),
            "*" | "/" | "%" => Some(10),
            _ => None,
        }
    }

    /// Precedence climbing over left-associative binary operators
    ///
    /// A run of operators with the same precedence becomes one node, so tree
    /// depth follows the number of precedence levels, not the run length.
    fn binary(&mut self, min_precedence: u8) -> ParseResult<Node> {
        let start = self.pos;
        let mut left = self.unary()?;

        while let Some(precedence) = Self::binary_precedence(self.peek()) {
            if precedence <= min_precedence {
                break;
            }
            let mut operators = Vec::new();
            let mut operands = vec![left];
            while Self::binary_precedence(self.peek()) == Some(precedence) {
                let operator = self.peek().text.clone();
                self.advance();
                operands.push(if operator == "instanceof" {
                    self.parse_type()?
                } else {
                    self.binary(precedence)?
                });
                operators.push(operator);
            }
            left = self.node(NodeKind::BinaryExpression { operators }, start, operands);
        }

        Ok(left)
    }

    fn unary(&mut self) -> ParseResult<Node> {
        self.nested(|p| {
            let start = p.pos;
            let token = p.peek().clone();

            if token.kind == TokenKind::Punct
                && matches!(token.text.as_str(), "+" | "-" | "!" | "~" | "++" | "--")
            {
                p.advance();
                let operand = p.unary()?;
                let kind = NodeKind::UnaryExpression {
                    operator: token.text,
                    postfix: false,
                };
                return Ok(p.node(kind, start, vec![operand]));
            }

            if token.is_punct("(") && p.is_cast() {
                p.advance();
                let target = p.parse_type()?;
                p.expect_punct(")")?;
                let operand = p.unary()?;
                return Ok(p.node(NodeKind::CastExpression, start, vec![target, operand]));
            }

            let primary = p.primary()?;
            let next = p.peek();
            if next.is_punct("++") || next.is_punct("--") {
                let operator = next.text.clone();
                p.advance();
                let kind = NodeKind::UnaryExpression {
                    operator,
                    postfix: true,
                };
                return Ok(p.node(kind, start, vec![primary]));
            }
            Ok(primary)
        })
    }

    fn primary(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        let token = self.peek().clone();

        let prefix = if token.is_literal() {
            self.advance();
            self.node(NodeKind::Literal, start, Vec::new())
        } else if token.is_keyword("this") || token.is_keyword("super") {
            self.advance();
            self.node(NodeKind::SelfReference, start, Vec::new())
        } else if token.is_keyword("new") {
            self.allocation()?
        } else if token.is_punct("(") {
            self.parenthesized()?
        } else if token.is_identifier() {
            self.ambiguous_name()?
        } else {
            return Err(self.error("expected expression"));
        };

        let mut children = vec![prefix];
        loop {
            let suffix_start = self.pos;
            if self.check_punct(".") {
                let member = self.peek_at(self.pos + 1).clone();
                let is_member = member.is_identifier()
                    || ["class", "this", "new"].iter().any(|k| member.is_keyword(k));
                if !is_member {
                    return Err(self.error("expected member name"));
                }
                self.advance();
                self.advance();
                let kind = NodeKind::FieldAccess { name: member.text };
                children.push(self.node(kind, suffix_start, Vec::new()));
            } else if self.eat_punct("[") {
                let index = self.expression()?;
                self.expect_punct("]")?;
                children.push(self.node(NodeKind::Index, suffix_start, vec![index]));
            } else if self.check_punct("(") {
                children.push(self.arguments()?);
            } else {
                break;
            }
        }

        Ok(self.node(NodeKind::PrimaryExpression, start, children))
    }

    fn arguments(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        self.expect_punct("(")?;
        let mut children = Vec::new();
        if !self.check_punct(")") {
            self.expression_list(&mut children)?;
        }
        self.expect_punct(")")?;
        Ok(self.node(NodeKind::Arguments, start, children))
    }

    fn allocation(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        self.expect_keyword("new")?;

        let type_start = self.pos;
        if self.peek().is_primitive_type() {
            self.advance();
        } else {
            self.ambiguous_name()?;
            if self.check_punct("<") {
                self.type_arguments()?;
            }
        }
        let mut children = vec![self.node(NodeKind::Type, type_start, Vec::new())];

        if self.check_punct("(") {
            children.push(self.arguments()?);
            if self.check_punct("{") {
                children.push(self.block()?);
            }
        } else if self.check_punct("[") {
            while self.eat_punct("[") {
                if !self.check_punct("]") {
                    children.push(self.expression()?);
                }
                self.expect_punct("]")?;
            }
            if self.check_punct("{") {
                children.push(self.array_initializer()?);
            }
        } else {
            return Err(self.error("expected '(' or '['"));
        }

        Ok(self.node(NodeKind::AllocationExpression, start, children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(source: &str) -> Vec<Node> {
        let mut parser = Parser::new(source);
        let mut nodes = Vec::new();
        while let Some(node) = parser.next_statement().expect("statement should parse") {
            nodes.push(node);
        }
        nodes
    }

    fn parse_one(source: &str) -> Node {
        let mut nodes = parse_all(source);
        assert_eq!(nodes.len(), 1, "expected one statement in {source:?}");
        nodes.remove(0)
    }

    #[test]
    fn test_import_flags() {
        let node = parse_one("import static java.lang.Math.*;");
        assert_eq!(
            node.kind,
            NodeKind::Import {
                static_import: true,
                super_import: false,
                package_import: true
            }
        );
        assert_eq!(node.children[0].text, "java.lang.Math");

        let node = parse_one("import *;");
        assert!(matches!(
            node.kind,
            NodeKind::Import {
                super_import: true,
                ..
            }
        ));
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_bare_assignment_is_assignment_node() {
        let node = parse_one("a = 1;");
        assert_eq!(
            node.kind,
            NodeKind::Assignment {
                operator: "=".to_string()
            }
        );
        let target = &node.children[0];
        assert_eq!(target.kind, NodeKind::PrimaryExpression);
        assert_eq!(target.children.len(), 1);
        assert_eq!(target.children[0].kind, NodeKind::AmbiguousName);
        assert_eq!(target.children[0].text, "a");
    }

    #[test]
    fn test_typed_variable_declaration() {
        let node = parse_one("private static final java.util.List[] items = null, more;");
        let NodeKind::TypedVariableDeclaration { modifiers } = &node.kind else {
            panic!("expected typed variable, got {:?}", node.kind);
        };
        assert_eq!(modifiers, &["private", "static", "final"]);
        assert_eq!(node.children[0].text, "java.util.List[]");
        assert_eq!(
            node.children[1].kind,
            NodeKind::VariableDeclarator {
                name: "items".to_string()
            }
        );
        assert_eq!(node.children.len(), 3);
    }

    #[test]
    fn test_method_without_return_type() {
        let node = parse_one("foo(a, int b) {\n  return this;\n}");
        assert_eq!(
            node.kind,
            NodeKind::MethodDeclaration {
                name: "foo".to_string()
            }
        );
        assert_eq!(node.text, "foo ( a , int b ) {");
        assert_eq!(node.begin, Position::new(1, 1));
        assert_eq!(node.end, Position::new(3, 1));

        let block = node.blocks().next().expect("method body");
        assert_eq!(block.children[0].kind, NodeKind::ReturnStatement);
        assert_eq!(block.children[0].children[0].text, "this");
    }

    #[test]
    fn test_call_statement_is_not_a_method() {
        let node = parse_one("print(\"hi\");");
        assert_eq!(node.kind, NodeKind::PrimaryExpression);
    }

    #[test]
    fn test_class_declaration() {
        let node = parse_one("public class A extends B implements I, J { int x; void m() {} }");
        assert_eq!(
            node.kind,
            NodeKind::ClassDeclaration {
                name: "A".to_string(),
                is_interface: false,
                has_superclass: true,
                num_interfaces: 2
            }
        );
        let names: Vec<_> = node
            .children
            .iter()
            .filter(|c| c.kind == NodeKind::AmbiguousName)
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(names, vec!["B", "I", "J"]);
        assert_eq!(node.text, "public class A extends B implements I , J {");

        let body = node.blocks().next().expect("class body");
        assert_eq!(body.children.len(), 2);
    }

    #[test]
    fn test_nested_generics_split_shift_tokens() {
        let node = parse_one("Map<String, List<Integer>> index = new HashMap<>();");
        assert_eq!(node.children[0].text, "Map<String,List<Integer>>");
        assert_eq!(
            node.children[1].kind,
            NodeKind::VariableDeclarator {
                name: "index".to_string()
            }
        );
    }

    #[test]
    fn test_control_flow_statements() {
        let source = r#"
            for (int i = 0; i < 10; i++) { total += i; }
            for (String s : names) print(s);
            while (running) { if (x > 1) break; else continue; }
            do { n--; } while (n > 0);
            switch (k) { case 1: a = 2; break; default: a = 3; }
            try { risky(); } catch (IOException | RuntimeException e) { } finally { done = true; }
            synchronized (lock) { count++; }
            outer: for (;;) { break outer; }
            x = (String) value;
            y = flag ? a : b;
            z = new int[] { 1, 2, 3 };
            w = list instanceof java.util.List && !empty;
        "#;
        let nodes = parse_all(source);
        assert_eq!(nodes.len(), 12);
        assert_eq!(nodes[0].kind, NodeKind::ForStatement);
        assert_eq!(nodes[1].kind, NodeKind::EnhancedForStatement);
        assert_eq!(nodes[5].kind, NodeKind::TryStatement);
        assert_eq!(nodes[7].kind, NodeKind::LabeledStatement);
        assert!(matches!(nodes[8].kind, NodeKind::Assignment { .. }));
        assert_eq!(nodes[8].children[1].kind, NodeKind::CastExpression);
    }

    #[test]
    fn test_error_consumes_offending_token() {
        let mut parser = Parser::new("a = 1; ) b = 2;");
        assert!(parser.next_statement().unwrap().is_some());

        let before = parser.position();
        let err = parser.next_statement().unwrap_err();
        assert_eq!(err.position, before);
        assert!(parser.position() > before);

        let node = parser.next_statement().unwrap().expect("recovered statement");
        assert_eq!(node.children[0].text, "b");
        assert!(parser.next_statement().unwrap().is_none());
    }

    #[test]
    fn test_error_at_end_of_input_does_not_advance() {
        let mut parser = Parser::new("void f() { a = 1;");
        let err = parser.next_statement().unwrap_err();
        assert!(err.message.contains("end of input"));
        assert!(parser.is_at_end());
        assert!(parser.next_statement().unwrap().is_none());
    }

    #[test]
    fn test_deep_nesting_is_rejected_not_overflowed() {
        let source = format!("x = {}1{};", "(".repeat(2000), ")".repeat(2000));
        let mut parser = Parser::new(&source);
        let err = parser.next_statement().unwrap_err();
        assert!(err.message.contains("nesting too deep"));
    }

    #[test]
    fn test_long_ternary_chain_is_rejected_not_overflowed() {
        let source = format!("x = {}0;", "a ? b : ".repeat(50_000));
        let mut parser = Parser::new(&source);
        let err = parser.next_statement().unwrap_err();
        assert!(err.message.contains("nesting too deep"));
    }

    #[test]
    fn test_deep_generic_type_is_rejected_not_overflowed() {
        let source = format!("{}String{} x;", "List<".repeat(50_000), ">".repeat(50_000));
        let mut parser = Parser::new(&source);
        let err = parser.next_statement().unwrap_err();
        assert!(err.message.contains("nesting too deep"));
    }

    #[test]
    fn test_operator_run_is_one_node() {
        let source = format!("x = {}1;", "a + b - ".repeat(20_000));
        let node = parse_one(&source);
        let value = &node.children[1];
        let NodeKind::BinaryExpression { operators } = &value.kind else {
            panic!("expected binary expression, got {:?}", value.kind);
        };
        assert_eq!(operators.len(), 40_000);
        assert_eq!(value.children.len(), 40_001);

        let node = parse_one("y = a * b + c * d < e;");
        let value = &node.children[1];
        assert_eq!(
            value.kind,
            NodeKind::BinaryExpression {
                operators: vec!["<".to_string()]
            }
        );
        assert_eq!(
            value.children[0].kind,
            NodeKind::BinaryExpression {
                operators: vec!["+".to_string()]
            }
        );
    }

    #[test]
    fn test_short_ternary_chain_still_parses() {
        let node = parse_one("x = a ? 1 : b ? 2 : 3;");
        assert!(matches!(node.kind, NodeKind::Assignment { .. }));
    }

    #[test]
    fn test_class_type_parameters_with_bounds() {
        let node = parse_one(
            "class Pair<K extends Comparable<K> & Key, V> extends Base<K> { int n; Pair() { } }",
        );
        assert_eq!(
            node.kind,
            NodeKind::ClassDeclaration {
                name: "Pair".to_string(),
                is_interface: false,
                has_superclass: true,
                num_interfaces: 0
            }
        );
        let names: Vec<_> = node
            .children
            .iter()
            .filter(|c| c.kind == NodeKind::AmbiguousName)
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(names, vec!["Base"]);

        let body = node.blocks().next().expect("class body");
        assert_eq!(body.children.len(), 2);
    }
}
