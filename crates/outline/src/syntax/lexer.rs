//! Hand-written lexer producing positioned tokens.
//!
//! Comments and whitespace are skipped. Characters that cannot start a token,
//! unterminated strings and unterminated block comments become
//! [`TokenKind::Error`] tokens so the parser can report and skip them.

use super::token::{Position, Token, TokenKind, KEYWORDS};

/// Multi-character operators, longest first
const OPERATORS: &[&str] = &[
    ">>>=", "<<=", ">>=", ">>>", "...", "==", "!=", "<=", ">=", "&&", "||", "++", "--", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "->", "::",
];

const SINGLE_PUNCT: &str = "(){}[];,.=<>!~?:+-*/&|^%@";

pub struct Lexer<'src> {
    source: &'src str,
    /// Byte offset of the next unread character
    offset: usize,
    line: usize,
    column: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Lex the whole source; the last token is always [`TokenKind::Eof`]
    pub fn tokenize(source: &'src str) -> Vec<Token> {
        let mut lexer = Self::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let done = token.is_eof();
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn rest(&self) -> &'src str {
        &self.source[self.offset..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.rest().chars();
        chars.next();
        chars.next()
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn eat_while(&mut self, mut predicate: impl FnMut(char) -> bool) {
        while self.peek().is_some_and(&mut predicate) {
            self.advance();
        }
    }

    /// Skip whitespace and comments; an unterminated block comment is reported
    fn skip_trivia(&mut self) -> Option<Token> {
        loop {
            self.eat_while(char::is_whitespace);
            match (self.peek(), self.peek_second()) {
                (Some('/'), Some('/')) => self.eat_while(|c| c != '\n'),
                (Some('/'), Some('*')) => {
                    let begin = self.position();
                    let start = self.offset;
                    self.advance();
                    self.advance();
                    loop {
                        if self.rest().starts_with("*/") {
                            self.advance();
                            self.advance();
                            break;
                        }
                        let here = self.position();
                        if self.advance().is_none() {
                            return Some(Token::new(
                                TokenKind::Error,
                                &self.source[start..],
                                begin,
                                here,
                            ));
                        }
                    }
                }
                _ => return None,
            }
        }
    }

    /// Get the next token from the source
    pub fn next_token(&mut self) -> Token {
        if let Some(error) = self.skip_trivia() {
            return error;
        }

        let begin = self.position();
        let start = self.offset;
        let Some(c) = self.peek() else {
            return Token::new(TokenKind::Eof, "", begin, begin);
        };

        let kind = if is_identifier_start(c) {
            self.eat_while(is_identifier_part);
            if KEYWORDS.contains(&&self.source[start..self.offset]) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            }
        } else if c.is_ascii_digit()
            || (c == '.' && self.peek_second().is_some_and(|n| n.is_ascii_digit()))
        {
            self.number();
            TokenKind::Number
        } else if c == '"' || c == '\'' {
            self.quoted(c)
        } else if let Some(op) = OPERATORS.iter().find(|op| self.rest().starts_with(**op)) {
            for _ in 0..op.len() {
                self.advance();
            }
            TokenKind::Punct
        } else if SINGLE_PUNCT.contains(c) {
            self.advance();
            TokenKind::Punct
        } else {
            self.advance();
            TokenKind::Error
        };

        self.make_token(kind, start, begin)
    }

    /// Tokens never span lines, so the end column is just behind the cursor
    fn make_token(&self, kind: TokenKind, start: usize, begin: Position) -> Token {
        let end = Position::new(self.line, (self.column - 1).max(begin.column));
        Token::new(kind, &self.source[start..self.offset], begin, end)
    }

    fn number(&mut self) {
        if self.rest().starts_with("0x") || self.rest().starts_with("0X") {
            self.advance();
            self.advance();
            self.eat_while(|c| c.is_ascii_hexdigit() || c == '_');
        } else {
            self.eat_while(|c| c.is_ascii_digit() || c == '_');
            if self.peek() == Some('.') && self.peek_second().map_or(true, |c| !is_identifier_start(c)) {
                self.advance();
                self.eat_while(|c| c.is_ascii_digit() || c == '_');
            }
            if matches!(self.peek(), Some('e' | 'E')) {
                self.advance();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.advance();
                }
                self.eat_while(|c| c.is_ascii_digit());
            }
        }
        if matches!(self.peek(), Some('l' | 'L' | 'f' | 'F' | 'd' | 'D')) {
            self.advance();
        }
    }

    /// Lex a string or char literal; stops at end of line when unterminated
    fn quoted(&mut self, quote: char) -> TokenKind {
        self.advance();
        loop {
            match self.peek() {
                None | Some('\n') => return TokenKind::Error,
                Some('\\') => {
                    self.advance();
                    if self.peek().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                Some(c) if c == quote => {
                    self.advance();
                    return if quote == '"' {
                        TokenKind::String
                    } else {
                        TokenKind::Char
                    };
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
