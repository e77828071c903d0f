use super::token::{Position, Token};

/// Kind of a parse node, one case per construct the grammar distinguishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Import {
        static_import: bool,
        /// `import *;`
        super_import: bool,
        /// `import a.b.*;`
        package_import: bool,
    },
    PackageDeclaration,
    ClassDeclaration {
        name: String,
        is_interface: bool,
        /// The first ambiguous-name child is the superclass
        has_superclass: bool,
        num_interfaces: usize,
    },
    MethodDeclaration {
        name: String,
    },
    FormalParameters,
    FormalParameter {
        name: String,
    },
    ReturnType,
    Type,
    TypedVariableDeclaration {
        /// Modifier keywords as written
        modifiers: Vec<String>,
    },
    VariableDeclarator {
        name: String,
    },
    /// A possibly qualified name whose meaning depends on context
    AmbiguousName,
    Block,
    Assignment {
        operator: String,
    },
    PrimaryExpression,
    Literal,
    /// `this` or `super`
    SelfReference,
    FieldAccess {
        name: String,
    },
    Index,
    Arguments,
    AllocationExpression,
    ArrayInitializer,
    /// Operands of one precedence level, left to right, joined by
    /// `operators` (one fewer than the operands)
    BinaryExpression {
        operators: Vec<String>,
    },
    UnaryExpression {
        operator: String,
        postfix: bool,
    },
    TernaryExpression,
    CastExpression,
    ReturnStatement,
    IfStatement,
    WhileStatement,
    DoStatement,
    ForStatement,
    EnhancedForStatement,
    SwitchStatement,
    SwitchLabel,
    TryStatement,
    CatchClause,
    ThrowStatement,
    BreakStatement,
    ContinueStatement,
    SynchronizedStatement,
    LabeledStatement,
    EmptyStatement,
}

/// A parse node: its kind, the text reconstructed from its tokens, its token
/// extent and its children in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub text: String,
    /// Begin of the first token
    pub begin: Position,
    /// End of the last token
    pub end: Position,
    pub children: Vec<Node>,
}

impl Node {
    /// Build a node covering `tokens`, which must not be empty
    pub(crate) fn from_tokens(kind: NodeKind, tokens: &[Token], children: Vec<Node>) -> Self {
        let begin = tokens.first().map(|t| t.begin).unwrap_or_default();
        let end = tokens.last().map(|t| t.end).unwrap_or_default();
        Self {
            kind,
            text: render_text(tokens),
            begin,
            end,
            children,
        }
    }

    /// Line of the first token
    #[must_use]
    pub const fn line_number(&self) -> usize {
        self.begin.line
    }

    #[must_use]
    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    /// Children that are blocks
    pub fn blocks(&self) -> impl Iterator<Item = &Node> {
        self.children
            .iter()
            .filter(|c| matches!(c.kind, NodeKind::Block))
    }

    /// Pre-order walk over this node and all descendants
    pub fn walk(&self, visit: &mut impl FnMut(&Node)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Get a short label for log and error messages
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{:?} at {} `{}`", self.kind, self.begin, self.text)
    }
}

/// Reconstruct source text from tokens
///
/// Tokens are joined by single spaces, except that `.`, `[`, `]`, `<` and `>`
/// attach to the preceding token, `.`, `[` and `<` attach to the following
/// one, and commas inside angle brackets attach on both sides. Rendering ends
/// after the first `{` or `;`, so a declaration's text is its header.
pub fn render_text(tokens: &[Token]) -> String {
    const GLUE_BEFORE: [&str; 5] = [".", "[", "]", "<", ">"];
    const GLUE_AFTER: [&str; 3] = [".", "[", "<"];

    let mut text = String::new();
    let mut angle_depth = 0usize;
    let mut previous: Option<&str> = None;

    for token in tokens {
        let current = token.text.as_str();
        let in_angles = angle_depth > 0;
        let glued = previous.is_some_and(|p| GLUE_AFTER.contains(&p) || (p == "," && in_angles))
            || GLUE_BEFORE.contains(&current)
            || (current == "," && in_angles);
        if previous.is_some() && !glued {
            text.push(' ');
        }
        text.push_str(current);

        match current {
            "<" => angle_depth += 1,
            ">" => angle_depth = angle_depth.saturating_sub(1),
            "{" | ";" => break,
            _ => {}
        }
        previous = Some(current);
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::lexer::Lexer;

    fn render(source: &str) -> String {
        let tokens: Vec<Token> = Lexer::tokenize(source)
            .into_iter()
            .filter(|t| !t.is_eof())
            .collect();
        render_text(&tokens)
    }

    #[test]
    fn test_render_stops_at_block() {
        assert_eq!(
            render("public int foo(int a, b) { return a; }"),
            "public int foo ( int a , b ) {"
        );
    }

    #[test]
    fn test_render_glues_qualified_names_and_arrays() {
        assert_eq!(render("java.util.List[] items;"), "java.util.List[] items ;");
    }

    #[test]
    fn test_render_keeps_generic_types_whole() {
        assert_eq!(
            render("Map<String, Integer> index = x;"),
            "Map<String,Integer> index = x ;"
        );
    }
}
