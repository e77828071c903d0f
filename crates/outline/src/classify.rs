//! Predicates deciding which declaration a top-level node represents.

use crate::syntax::{Node, NodeKind};

#[must_use]
pub fn is_import(node: &Node) -> bool {
    matches!(node.kind, NodeKind::Import { .. })
}

#[must_use]
pub fn is_class(node: &Node) -> bool {
    matches!(node.kind, NodeKind::ClassDeclaration { .. })
}

#[must_use]
pub fn is_method(node: &Node) -> bool {
    matches!(node.kind, NodeKind::MethodDeclaration { .. })
}

/// A typed declaration, or an assignment to a single bare name
///
/// The grammar has no separate form for declaring an untyped variable, so
/// `x = 1;` counts as a declaration of `x`. Qualified targets (`a.b = 1`) and
/// targets with suffixes (`a[0] = 1`, `f().x = 1`) do not.
#[must_use]
pub fn is_variable(node: &Node) -> bool {
    match node.kind {
        NodeKind::TypedVariableDeclaration { .. } => true,
        NodeKind::Assignment { .. } => assignment_target(node).is_some(),
        _ => false,
    }
}

/// The bare name an assignment writes to, if it writes to one
pub(crate) fn assignment_target(node: &Node) -> Option<&Node> {
    let target = node.child(0)?;
    if target.kind != NodeKind::PrimaryExpression || target.children.len() != 1 {
        return None;
    }
    let name = target.child(0)?;
    (name.kind == NodeKind::AmbiguousName && !name.text.contains('.')).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Parser;

    fn parse(source: &str) -> Node {
        Parser::new(source)
            .next_statement()
            .expect("statement should parse")
            .expect("statement expected")
    }

    #[test]
    fn test_declarations() {
        assert!(is_import(&parse("import java.util.*;")));
        assert!(is_class(&parse("class A {}")));
        assert!(is_class(&parse("interface I {}")));
        assert!(is_method(&parse("void run() {}")));
        assert!(is_method(&parse("run() {}")));
        assert!(!is_method(&parse("run();")));
    }

    #[test]
    fn test_variable_shapes() {
        assert!(is_variable(&parse("int x;")));
        assert!(is_variable(&parse("String s = \"a\", t;")));
        assert!(is_variable(&parse("x = 1;")));
        assert!(is_variable(&parse("x += 1;")));
    }

    #[test]
    fn test_non_variable_assignments() {
        assert!(!is_variable(&parse("a.b = 1;")));
        assert!(!is_variable(&parse("a[0] = 1;")));
        assert!(!is_variable(&parse("this.x = 1;")));
        assert!(!is_variable(&parse("f().x = 1;")));
        assert!(!is_variable(&parse("x++;")));
        assert!(!is_variable(&parse("print(x);")));
    }
}
