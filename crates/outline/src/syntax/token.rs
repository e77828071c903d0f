use std::fmt;

/// 1-indexed line/column location in the script
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Coarse token category; punctuation and keywords are told apart by text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Number,
    String,
    Char,
    Punct,
    /// Input the lexer could not make sense of
    Error,
    Eof,
}

/// Reserved words of the scripting language
pub const KEYWORDS: &[&str] = &[
    "abstract", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final",
    "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
    "interface", "long", "native", "new", "null", "package", "private", "protected",
    "public", "return", "short", "static", "strictfp", "super", "switch", "synchronized",
    "this", "throw", "throws", "transient", "true", "try", "void", "volatile", "while",
];

/// Primitive type keywords, usable wherever a type is expected
pub const PRIMITIVE_TYPES: &[&str] = &[
    "boolean", "char", "byte", "short", "int", "long", "float", "double", "void",
];

/// Keywords that may prefix a declaration
pub const MODIFIER_KEYWORDS: &[&str] = &[
    "public", "private", "protected", "static", "final", "abstract", "synchronized",
    "native", "transient", "volatile", "strictfp", "default",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Location of the first character
    pub begin: Position,
    /// Location of the last character
    pub end: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, begin: Position, end: Position) -> Self {
        Self {
            kind,
            text: text.into(),
            begin,
            end,
        }
    }

    #[must_use]
    pub fn is_punct(&self, text: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == text
    }

    #[must_use]
    pub fn is_keyword(&self, text: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == text
    }

    #[must_use]
    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }

    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    #[must_use]
    pub fn is_primitive_type(&self) -> bool {
        self.kind == TokenKind::Keyword && PRIMITIVE_TYPES.contains(&self.text.as_str())
    }

    #[must_use]
    pub fn is_modifier(&self) -> bool {
        self.kind == TokenKind::Keyword && MODIFIER_KEYWORDS.contains(&self.text.as_str())
    }

    #[must_use]
    pub fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Number | TokenKind::String | TokenKind::Char
        ) || (self.kind == TokenKind::Keyword
            && matches!(self.text.as_str(), "true" | "false" | "null"))
    }

    /// Get a short description for error messages
    #[must_use]
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Error => format!("invalid input '{}'", self.text),
            _ => format!("'{}'", self.text),
        }
    }
}
