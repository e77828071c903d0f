use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Rendering of [`TypeRef::Loose`]
pub const LOOSE_TYPE: &str = "<loose type>";

/// Rendering of [`TypeRef::Void`]
pub const VOID_TYPE: &str = "void";

/// Declared or inferred type of a method, variable or parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum TypeRef {
    /// No type was written; the declaration is dynamically typed
    Loose,
    /// Nothing is returned
    Void,
    /// An explicit type token, kept verbatim
    Named(String),
}

impl TypeRef {
    /// Build a type from a source token, folding `void` into [`TypeRef::Void`]
    pub fn from_token(token: impl Into<String>) -> Self {
        let token = token.into();
        match token.as_str() {
            VOID_TYPE => Self::Void,
            LOOSE_TYPE => Self::Loose,
            _ => Self::Named(token),
        }
    }

    #[must_use]
    pub const fn is_loose(&self) -> bool {
        matches!(self, Self::Loose)
    }

    #[must_use]
    pub const fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// Get the type as it is rendered in outlines
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Loose => LOOSE_TYPE,
            Self::Void => VOID_TYPE,
            Self::Named(name) => name,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        match value {
            TypeRef::Named(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl From<String> for TypeRef {
    fn from(value: String) -> Self {
        Self::from_token(value)
    }
}

/// Declaration modifier, matched by exact keyword text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Public,
    Private,
    Protected,
    Static,
    Final,
    Abstract,
    Synchronized,
    Native,
    Transient,
    Volatile,
    Strictfp,
    Default,
    /// `import *;` pulls in the whole class path
    Super,
    /// Package import (`import a.b.*;`) or an implicit default import
    Package,
}

impl Modifier {
    pub const ALL: [Self; 14] = [
        Self::Public,
        Self::Private,
        Self::Protected,
        Self::Static,
        Self::Final,
        Self::Abstract,
        Self::Synchronized,
        Self::Native,
        Self::Transient,
        Self::Volatile,
        Self::Strictfp,
        Self::Default,
        Self::Super,
        Self::Package,
    ];

    /// Look up a modifier by its keyword; the match is exact and case-sensitive
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.keyword() == keyword)
    }

    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Protected => "protected",
            Self::Static => "static",
            Self::Final => "final",
            Self::Abstract => "abstract",
            Self::Synchronized => "synchronized",
            Self::Native => "native",
            Self::Transient => "transient",
            Self::Volatile => "volatile",
            Self::Strictfp => "strictfp",
            Self::Default => "default",
            Self::Super => "super",
            Self::Package => "package",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Line/column range, 1-indexed and inclusive; all zero means "no span"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub begin_line: usize,
    pub begin_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl SourceSpan {
    #[must_use]
    pub const fn new(begin_line: usize, begin_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            begin_line,
            begin_column,
            end_line,
            end_column,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.begin_line == 0 && self.end_line == 0
    }

    /// Check if the span covers a specific line
    #[must_use]
    pub const fn contains_line(&self, line: usize) -> bool {
        !self.is_empty() && line >= self.begin_line && line <= self.end_line
    }
}

/// An import, either declared by the script or implied by the interpreter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportInfo {
    pub name: String,

    /// Source line, or -1 for implicit imports
    pub line_number: i64,

    #[serde(default)]
    pub modifiers: BTreeSet<Modifier>,
}

impl ImportInfo {
    /// Line number used for imports without a source location
    pub const IMPLICIT_LINE: i64 = -1;

    /// Create an implicit package import
    pub fn implicit_package(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            line_number: Self::IMPLICIT_LINE,
            modifiers: BTreeSet::from([Modifier::Package]),
        }
    }

    #[must_use]
    pub const fn is_implicit(&self) -> bool {
        self.line_number == Self::IMPLICIT_LINE
    }

    #[must_use]
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

/// A variable or field declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: TypeRef,
    pub line_number: usize,
    #[serde(default)]
    pub modifiers: BTreeSet<Modifier>,
}

impl VariableInfo {
    #[must_use]
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

/// A formal parameter of a method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: TypeRef,
}

impl ParameterInfo {
    pub fn new(name: impl Into<String>, type_name: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_name,
        }
    }
}

/// A method, a scripted class, or a declared class/interface
///
/// Classes share this shape so methods and classes nest under one recursive
/// type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    pub return_type: TypeRef,
    pub line_number: usize,
    pub span: SourceSpan,
    #[serde(default)]
    pub modifiers: BTreeSet<Modifier>,
    #[serde(default)]
    pub parameters: Vec<ParameterInfo>,
    /// Nested methods and classes, in declaration order
    #[serde(default)]
    pub methods: Vec<MethodInfo>,
    #[serde(default)]
    pub variables: Vec<VariableInfo>,
    pub is_constructor: bool,
    pub is_class: bool,
    pub is_interface: bool,
    pub super_class: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
}

impl MethodInfo {
    #[must_use]
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// Check if the declaration covers a specific line
    #[must_use]
    pub const fn contains_line(&self, line: usize) -> bool {
        self.span.contains_line(line)
    }

    /// Find a directly nested method by name
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| m.name == name)
    }

    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&VariableInfo> {
        self.variables.iter().find(|v| v.name == name)
    }
}

/// Outline of one script: the root of the result tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptInfo {
    pub imports: Vec<ImportInfo>,
    pub methods: Vec<MethodInfo>,
    pub variables: Vec<VariableInfo>,
    pub span: SourceSpan,
}

impl ScriptInfo {
    /// Find a top-level method or class by name
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| m.name == name)
    }

    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&VariableInfo> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Find a method at any depth; the first match in declaration order wins
    #[must_use]
    pub fn find_method(&self, name: &str) -> Option<&MethodInfo> {
        fn walk<'a>(methods: &'a [MethodInfo], name: &str) -> Option<&'a MethodInfo> {
            methods.iter().find_map(|m| {
                if m.name == name {
                    Some(m)
                } else {
                    walk(&m.methods, name)
                }
            })
        }
        walk(&self.methods, name)
    }

    /// Count methods and classes at every depth
    #[must_use]
    pub fn method_count(&self) -> usize {
        fn count(methods: &[MethodInfo]) -> usize {
            methods.iter().map(|m| 1 + count(&m.methods)).sum()
        }
        count(&self.methods)
    }

    /// Imports written in the script, skipping the implicit ones
    pub fn declared_imports(&self) -> impl Iterator<Item = &ImportInfo> {
        self.imports.iter().filter(|i| !i.is_implicit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ref_from_token() {
        assert_eq!(TypeRef::from_token("void"), TypeRef::Void);
        assert_eq!(TypeRef::from_token("<loose type>"), TypeRef::Loose);
        assert_eq!(
            TypeRef::from_token("String"),
            TypeRef::Named("String".to_string())
        );
    }

    #[test]
    fn test_type_ref_serializes_as_string() {
        let json = serde_json::to_string(&TypeRef::Loose).unwrap();
        assert_eq!(json, "\"<loose type>\"");

        let back: TypeRef = serde_json::from_str("\"int[]\"").unwrap();
        assert_eq!(back, TypeRef::Named("int[]".to_string()));
    }

    #[test]
    fn test_modifier_keywords_are_exact() {
        assert_eq!(Modifier::from_keyword("public"), Some(Modifier::Public));
        assert_eq!(Modifier::from_keyword("strictfp"), Some(Modifier::Strictfp));
        assert_eq!(Modifier::from_keyword("Public"), None);
        assert_eq!(Modifier::from_keyword("int"), None);
        for modifier in Modifier::ALL {
            assert_eq!(Modifier::from_keyword(modifier.keyword()), Some(modifier));
        }
    }

    #[test]
    fn test_span_contains_line() {
        let span = SourceSpan::new(3, 1, 7, 2);
        assert!(span.contains_line(3));
        assert!(span.contains_line(7));
        assert!(!span.contains_line(8));
        assert!(!SourceSpan::default().contains_line(0));
    }

    #[test]
    fn test_implicit_import() {
        let import = ImportInfo::implicit_package("java.util");
        assert!(import.is_implicit());
        assert!(import.has_modifier(Modifier::Package));
        assert_eq!(import.line_number, -1);
    }

    fn method(name: &str, line: usize, span: SourceSpan, methods: Vec<MethodInfo>) -> MethodInfo {
        MethodInfo {
            name: name.to_string(),
            return_type: TypeRef::Void,
            line_number: line,
            span,
            modifiers: BTreeSet::new(),
            parameters: Vec::new(),
            methods,
            variables: Vec::new(),
            is_constructor: false,
            is_class: false,
            is_interface: false,
            super_class: None,
            interfaces: Vec::new(),
        }
    }

    #[test]
    fn test_find_method_walks_nested() {
        let leaf = method("inner", 2, SourceSpan::new(2, 5, 2, 20), Vec::new());
        let outer = method("outer", 1, SourceSpan::new(1, 1, 3, 1), vec![leaf]);
        let script = ScriptInfo {
            methods: vec![outer],
            ..ScriptInfo::default()
        };

        assert_eq!(script.method_count(), 2);
        assert_eq!(script.find_method("inner").map(|m| m.line_number), Some(2));
        assert!(script.method("inner").is_none());
        assert!(script.methods[0].contains_line(2));
    }
}
