//! Scope-aware clean-up of a finished outline.
//!
//! Every assignment to a bare name is reported as a declaration, so repeated
//! assignments and assignments to variables of an enclosing scope show up as
//! spurious declarations until these passes run.

use std::collections::HashSet;

use crate::types::{MethodInfo, ScriptInfo, VariableInfo};

/// Run both passes in order: duplicates first, then shadows
pub fn normalize(script: &mut ScriptInfo) {
    remove_duplicate_variables(script);
    remove_shadowing_variables(script);
}

/// Keep only the first declaration of each name in every variable list
pub fn remove_duplicate_variables(script: &mut ScriptInfo) {
    dedupe(&mut script.variables);
    dedupe_methods(&mut script.methods);
}

fn dedupe_methods(methods: &mut [MethodInfo]) {
    for method in methods {
        dedupe(&mut method.variables);
        dedupe_methods(&mut method.methods);
    }
}

fn dedupe(variables: &mut Vec<VariableInfo>) {
    let mut seen = HashSet::new();
    variables.retain(|v| {
        let first = seen.insert(v.name.clone());
        if !first {
            log::trace!("dropping repeated declaration of `{}` at line {}", v.name, v.line_number);
        }
        first
    });
}

/// Drop loosely typed variables that name a variable of an enclosing scope
///
/// Containers are visited root first. Each one sees the names declared by all
/// of its ancestors, after those ancestors were themselves cleaned.
pub fn remove_shadowing_variables(script: &mut ScriptInfo) {
    shadow(&mut script.variables, &mut script.methods, &HashSet::new());
}

fn shadow(variables: &mut Vec<VariableInfo>, methods: &mut [MethodInfo], outer: &HashSet<String>) {
    variables.retain(|v| {
        let shadowing = v.type_name.is_loose() && outer.contains(&v.name);
        if shadowing {
            log::trace!("`{}` at line {} refers to an outer variable", v.name, v.line_number);
        }
        !shadowing
    });

    let mut scope = outer.clone();
    scope.extend(variables.iter().map(|v| v.name.clone()));
    for method in methods {
        shadow(&mut method.variables, &mut method.methods, &scope);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SourceSpan, TypeRef};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn var(name: &str, type_name: TypeRef, line: usize) -> VariableInfo {
        VariableInfo {
            name: name.to_string(),
            type_name,
            line_number: line,
            modifiers: BTreeSet::new(),
        }
    }

    fn scope(name: &str, variables: Vec<VariableInfo>, methods: Vec<MethodInfo>) -> MethodInfo {
        MethodInfo {
            name: name.to_string(),
            return_type: TypeRef::Void,
            line_number: 1,
            span: SourceSpan::default(),
            modifiers: BTreeSet::new(),
            parameters: Vec::new(),
            methods,
            variables,
            is_constructor: false,
            is_class: false,
            is_interface: false,
            super_class: None,
            interfaces: Vec::new(),
        }
    }

    fn names(variables: &[VariableInfo]) -> Vec<&str> {
        variables.iter().map(|v| v.name.as_str()).collect()
    }

    #[test]
    fn test_duplicates_keep_first_in_every_container() {
        let inner = scope(
            "inner",
            vec![var("y", TypeRef::Loose, 3), var("y", TypeRef::Loose, 4)],
            Vec::new(),
        );
        let mut script = ScriptInfo {
            variables: vec![
                var("a", TypeRef::Loose, 1),
                var("b", TypeRef::Named("int".into()), 2),
                var("a", TypeRef::Named("int".into()), 5),
            ],
            methods: vec![scope("outer", Vec::new(), vec![inner])],
            ..ScriptInfo::default()
        };

        remove_duplicate_variables(&mut script);

        assert_eq!(names(&script.variables), vec!["a", "b"]);
        assert_eq!(script.variables[0].line_number, 1);
        assert_eq!(names(&script.methods[0].methods[0].variables), vec!["y"]);
    }

    #[test]
    fn test_loose_shadow_is_removed_typed_is_kept() {
        let method = scope(
            "m",
            vec![
                var("x", TypeRef::Loose, 3),
                var("y", TypeRef::Named("int".into()), 4),
                var("z", TypeRef::Loose, 5),
            ],
            Vec::new(),
        );
        let mut script = ScriptInfo {
            variables: vec![var("x", TypeRef::Loose, 1), var("y", TypeRef::Loose, 2)],
            methods: vec![method],
            ..ScriptInfo::default()
        };

        remove_shadowing_variables(&mut script);

        assert_eq!(names(&script.variables), vec!["x", "y"]);
        assert_eq!(names(&script.methods[0].variables), vec!["y", "z"]);
    }

    #[test]
    fn test_outer_names_accumulate_down_the_tree() {
        let leaf = scope(
            "leaf",
            vec![var("a", TypeRef::Loose, 5), var("b", TypeRef::Loose, 6)],
            Vec::new(),
        );
        let middle = scope("middle", vec![var("b", TypeRef::Loose, 3)], vec![leaf]);
        let sibling = scope("sibling", vec![var("b", TypeRef::Loose, 8)], Vec::new());
        let mut script = ScriptInfo {
            variables: vec![var("a", TypeRef::Loose, 1)],
            methods: vec![middle, sibling],
            ..ScriptInfo::default()
        };

        normalize(&mut script);

        let middle = &script.methods[0];
        assert_eq!(names(&middle.variables), vec!["b"]);
        assert!(middle.methods[0].variables.is_empty());
        // a sibling does not see names declared in `middle`
        assert_eq!(names(&script.methods[1].variables), vec!["b"]);
    }
}
