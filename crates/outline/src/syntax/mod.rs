//! Lexing and parsing of scripts into [`Node`] trees, one top-level
//! statement at a time.

pub mod lexer;
pub mod node;
pub mod parser;
pub mod token;

pub use lexer::Lexer;
pub use node::{render_text, Node, NodeKind};
pub use parser::{ParseError, Parser};
pub use token::{Position, Token, TokenKind};

/// Anything that yields top-level statement nodes in source order
///
/// After an `Err`, a source is expected to have moved past the failure so the
/// next call makes progress. A source that reports the same [`position`]
/// twice in a row while failing is considered stuck.
///
/// [`position`]: StatementSource::position
pub trait StatementSource {
    /// Next statement, `Ok(None)` once the input is exhausted
    fn next_statement(&mut self) -> Result<Option<Node>, ParseError>;

    /// Where the source will resume reading
    fn position(&self) -> Position;
}

impl StatementSource for Parser {
    fn next_statement(&mut self) -> Result<Option<Node>, ParseError> {
        Parser::next_statement(self)
    }

    fn position(&self) -> Position {
        Parser::position(self)
    }
}

impl<S: StatementSource + ?Sized> StatementSource for &mut S {
    fn next_statement(&mut self) -> Result<Option<Node>, ParseError> {
        (**self).next_statement()
    }

    fn position(&self) -> Position {
        (**self).position()
    }
}
