//! Builds outline records from declaration nodes.
//!
//! Members of a method or class are read from the container's immediate
//! blocks only. Declarations nested inside control flow (`if`, loops, `try`)
//! are not members and are not reported.

use std::collections::BTreeSet;

use crate::classify::{assignment_target, is_import, is_method, is_variable};
use crate::config::OutlineConfig;
use crate::error::{OutlineError, Result};
use crate::syntax::{Node, NodeKind};
use crate::text;
use crate::types::{ImportInfo, MethodInfo, Modifier, SourceSpan, TypeRef, VariableInfo};

/// Name reported for `import *;`
const SUPER_IMPORT_NAME: &str = "*";

/// Every import declaration inside `node`, in pre-order
#[must_use]
pub fn collect_imports(node: &Node) -> Vec<ImportInfo> {
    let mut imports = Vec::new();
    node.walk(&mut |n: &Node| {
        if is_import(n) {
            if let Some(import) = import_info(n) {
                imports.push(import);
            }
        }
    });
    imports
}

fn import_info(node: &Node) -> Option<ImportInfo> {
    let NodeKind::Import {
        static_import,
        super_import,
        package_import,
    } = node.kind
    else {
        return None;
    };

    let mut modifiers = BTreeSet::new();
    if static_import {
        modifiers.insert(Modifier::Static);
    }
    if super_import {
        modifiers.insert(Modifier::Super);
    }
    if package_import {
        modifiers.insert(Modifier::Package);
    }

    let name = node
        .child(0)
        .map_or(SUPER_IMPORT_NAME, |name| name.text.trim())
        .to_string();

    Some(ImportInfo {
        name,
        line_number: i64::try_from(node.line_number()).unwrap_or(i64::MAX),
        modifiers,
    })
}

/// Variable declared by a typed declaration or a bare-name assignment
///
/// A typed declaration with several declarators reports the first one.
pub fn variable_info(node: &Node) -> Result<VariableInfo> {
    match &node.kind {
        NodeKind::TypedVariableDeclaration { modifiers } => {
            let (Some(ty), Some(declarator)) = (node.child(0), node.child(1)) else {
                return Err(OutlineError::unexpected_node(node.describe()));
            };
            let NodeKind::VariableDeclarator { name } = &declarator.kind else {
                return Err(OutlineError::unexpected_node(node.describe()));
            };
            Ok(VariableInfo {
                name: name.trim().to_string(),
                type_name: TypeRef::from_token(ty.text.trim()),
                line_number: node.line_number(),
                modifiers: modifiers
                    .iter()
                    .filter_map(|m| Modifier::from_keyword(m))
                    .collect(),
            })
        }
        NodeKind::Assignment { .. } => {
            let target = assignment_target(node)
                .ok_or_else(|| OutlineError::unexpected_node(node.describe()))?;
            Ok(VariableInfo {
                name: target.text.trim().to_string(),
                type_name: TypeRef::Loose,
                line_number: node.line_number(),
                modifiers: BTreeSet::new(),
            })
        }
        _ => Err(OutlineError::unexpected_node(node.describe())),
    }
}

/// Builds method and class records, recursing into nested members
pub struct DeclarationExtractor<'a> {
    config: &'a OutlineConfig,
}

impl<'a> DeclarationExtractor<'a> {
    pub fn new(config: &'a OutlineConfig) -> Self {
        Self { config }
    }

    /// Describe a method declaration
    ///
    /// Without an explicit return type the method returns [`TypeRef::Loose`]
    /// when its body has a `return` among its direct statements, and
    /// [`TypeRef::Void`] otherwise.
    pub fn method(&self, node: &Node) -> Result<MethodInfo> {
        let NodeKind::MethodDeclaration { name } = &node.kind else {
            return Err(OutlineError::unexpected_node(node.describe()));
        };

        let prefix = text::declaration_prefix(&node.text, name);
        let (modifiers, declared_type) = text::split_modifiers(&prefix);
        let return_type = match declared_type {
            Some(token) => TypeRef::from_token(token),
            None if has_return(node) => TypeRef::Loose,
            None => TypeRef::Void,
        };
        let (methods, variables) = self.members(node)?;

        Ok(MethodInfo {
            name: name.clone(),
            return_type,
            line_number: node.line_number(),
            span: span_of(node),
            modifiers,
            parameters: text::parameters(&node.text),
            methods,
            variables,
            is_constructor: false,
            is_class: is_scripted_class(node),
            is_interface: false,
            super_class: None,
            interfaces: Vec::new(),
        })
    }

    /// Describe a class or interface declaration
    pub fn class(&self, node: &Node) -> Result<MethodInfo> {
        let NodeKind::ClassDeclaration {
            name,
            is_interface,
            has_superclass,
            num_interfaces,
        } = &node.kind
        else {
            return Err(OutlineError::unexpected_node(node.describe()));
        };

        let prefix = text::declaration_prefix(&node.text, name);
        let (modifiers, _) = text::split_modifiers(&prefix);
        let super_class =
            text::super_class(&node.text).unwrap_or_else(|| self.config.base_class.clone());

        let interfaces = if *num_interfaces > 0 {
            node.children
                .iter()
                .filter(|c| c.kind == NodeKind::AmbiguousName)
                .skip(usize::from(*has_superclass))
                .map(|c| c.text.trim().to_string())
                .collect()
        } else {
            Vec::new()
        };

        let (methods, variables) = self.members(node)?;
        let methods = methods
            .into_iter()
            .map(|method| MethodInfo {
                is_constructor: method.name == *name && method.return_type.is_void(),
                ..method
            })
            .collect();

        Ok(MethodInfo {
            name: name.clone(),
            return_type: TypeRef::Void,
            line_number: node.line_number(),
            span: span_of(node),
            modifiers,
            parameters: Vec::new(),
            methods,
            variables,
            is_constructor: false,
            is_class: true,
            is_interface: *is_interface,
            super_class: Some(super_class),
            interfaces,
        })
    }

    /// Methods and variables declared directly in the container's blocks
    fn members(&self, container: &Node) -> Result<(Vec<MethodInfo>, Vec<VariableInfo>)> {
        let mut methods = Vec::new();
        let mut variables = Vec::new();
        for statement in direct_statements(container) {
            if is_method(statement) {
                methods.push(self.method(statement)?);
            } else if is_variable(statement) {
                variables.push(variable_info(statement)?);
            }
        }
        Ok((methods, variables))
    }
}

fn span_of(node: &Node) -> SourceSpan {
    SourceSpan::new(node.begin.line, node.begin.column, node.end.line, node.end.column)
}

fn direct_statements(node: &Node) -> impl Iterator<Item = &Node> {
    node.blocks().flat_map(|b| &b.children)
}

fn has_return(node: &Node) -> bool {
    direct_statements(node).any(|s| s.kind == NodeKind::ReturnStatement)
}

/// A direct `return this;` marks a method as a scripted class
fn is_scripted_class(node: &Node) -> bool {
    direct_statements(node).any(|s| {
        s.kind == NodeKind::ReturnStatement && s.child(0).is_some_and(|v| v.text.trim() == "this")
    })
}
