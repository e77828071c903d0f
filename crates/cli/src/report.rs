use anyhow::Result;
use script_outline::{ImportInfo, MethodInfo, Modifier, ScriptInfo, SourceSpan, VariableInfo};
use std::collections::BTreeSet;
use std::fmt::Write;

const INDENT: &str = "  ";

/// Render an outline as an indented tree, one declaration per line
pub fn render_tree(script: &ScriptInfo) -> Result<String> {
    let mut out = String::new();

    writeln!(out, "script {}", span_label(&script.span))?;

    if !script.imports.is_empty() {
        writeln!(out, "imports:")?;
        for import in &script.imports {
            writeln!(out, "{INDENT}{}", import_label(import))?;
        }
    }

    write_variables(&mut out, &script.variables, 0)?;

    if !script.methods.is_empty() {
        writeln!(out, "methods:")?;
        for method in &script.methods {
            write_method(&mut out, method, 1)?;
        }
    }

    Ok(out)
}

fn write_variables(out: &mut String, variables: &[VariableInfo], depth: usize) -> Result<()> {
    if variables.is_empty() {
        return Ok(());
    }
    let indent = INDENT.repeat(depth);
    writeln!(out, "{indent}variables:")?;
    for variable in variables {
        writeln!(
            out,
            "{indent}{INDENT}{}{}: {} (line {})",
            modifiers_label(&variable.modifiers),
            variable.name,
            variable.type_name,
            variable.line_number
        )?;
    }
    Ok(())
}

fn write_method(out: &mut String, method: &MethodInfo, depth: usize) -> Result<()> {
    let indent = INDENT.repeat(depth);
    writeln!(
        out,
        "{indent}{}{} {}",
        modifiers_label(&method.modifiers),
        signature(method)?,
        span_label(&method.span)
    )?;

    write_variables(out, &method.variables, depth + 1)?;
    for nested in &method.methods {
        write_method(out, nested, depth + 1)?;
    }
    Ok(())
}

fn signature(method: &MethodInfo) -> Result<String> {
    if method.is_interface || (method.is_class && method.super_class.is_some()) {
        let keyword = if method.is_interface { "interface" } else { "class" };
        let mut label = format!("{keyword} {}", method.name);
        if let Some(base) = &method.super_class {
            write!(label, " extends {base}")?;
        }
        if !method.interfaces.is_empty() {
            write!(label, " implements {}", method.interfaces.join(", "))?;
        }
        return Ok(label);
    }

    let keyword = if method.is_constructor {
        "constructor"
    } else if method.is_class {
        "scripted class"
    } else {
        "method"
    };
    let parameters: Vec<String> = method
        .parameters
        .iter()
        .map(|p| format!("{}: {}", p.name, p.type_name))
        .collect();
    Ok(format!(
        "{keyword} {}({}) -> {}",
        method.name,
        parameters.join(", "),
        method.return_type
    ))
}

fn import_label(import: &ImportInfo) -> String {
    let location = if import.is_implicit() {
        "implicit".to_string()
    } else {
        format!("line {}", import.line_number)
    };
    let flags: Vec<&str> = import.modifiers.iter().map(|m| m.keyword()).collect();
    if flags.is_empty() {
        format!("{} ({location})", import.name)
    } else {
        format!("{} [{}] ({location})", import.name, flags.join(" "))
    }
}

fn modifiers_label(modifiers: &BTreeSet<Modifier>) -> String {
    modifiers.iter().map(|m| format!("{m} ")).collect()
}

fn span_label(span: &SourceSpan) -> String {
    if span.is_empty() {
        "[no span]".to_string()
    } else {
        format!(
            "[{}:{}-{}:{}]",
            span.begin_line, span.begin_column, span.end_line, span.end_column
        )
    }
}
