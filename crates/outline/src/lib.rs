//! # Script Outline
//!
//! Structural outlines for BeanShell-style scripts: imports, classes, methods
//! (possibly nested), variables and parameters, with spans, modifiers and
//! inferred types.
//!
//! ## Philosophy
//!
//! Scripts being edited are usually broken somewhere. The analyzer:
//! - Parses one top-level statement at a time and skips what it cannot parse
//! - Always terminates, giving up once the parser stops making progress
//! - Treats `x = 1;` as a declaration of `x`, then removes repeats and uses
//!   of outer variables in a clean-up pass
//! - Treats a function ending in `return this;` as a scripted class
//!
//! ## Architecture
//!
//! ```text
//! Script Text
//!     │
//!     ├──> Lexer → Tokens
//!     │
//!     ├──> Parser (one statement per call, skips bad tokens)
//!     │
//!     ├──> Drive Loop (stuck detection)
//!     │    ├─> Classify: import / method / variable / class
//!     │    └─> Extract records, recursing into direct members
//!     │
//!     └──> Post-passes
//!          ├─> Drop repeated declarations per scope
//!          └─> Drop loose re-declarations of outer variables
//! ```
//!
//! ## Example
//!
//! ```rust
//! use script_outline::{ScriptAnalyzer, TypeRef};
//!
//! let script = r#"
//! count = 0;
//! increment(step) {
//!     count = count + step;
//!     return count;
//! }
//! "#;
//!
//! let outline = ScriptAnalyzer::default().analyze_str(script).unwrap();
//! assert_eq!(outline.variables[0].name, "count");
//!
//! let increment = outline.method("increment").unwrap();
//! assert_eq!(increment.return_type, TypeRef::Loose);
//! assert!(increment.variables.is_empty());
//! ```
//!
//! ## Known limitation
//!
//! Members are read from a method's or class's immediate body only. A method
//! or variable declared inside an `if`, a loop or a `try` block is not part of
//! the outline.

mod analyzer;
pub mod classify;
mod config;
mod error;
pub mod extract;
pub mod scope;
pub mod syntax;
pub mod text;
mod types;

pub use analyzer::{analyze, script_span, ScriptAnalyzer};
pub use config::{OutlineConfig, DEFAULT_IMPORTS};
pub use error::{OutlineError, Result};
pub use syntax::{ParseError, Parser, Position, StatementSource};
pub use types::{
    ImportInfo, MethodInfo, Modifier, ParameterInfo, ScriptInfo, SourceSpan, TypeRef,
    VariableInfo, LOOSE_TYPE, VOID_TYPE,
};
