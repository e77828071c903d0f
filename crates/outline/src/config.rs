use serde::{Deserialize, Serialize};

use crate::error::{OutlineError, Result};

/// Packages the interpreter imports before any script code runs
pub const DEFAULT_IMPORTS: [&str; 8] = [
    "javax.swing.event",
    "javax.swing",
    "java.awt.event",
    "java.awt",
    "java.net",
    "java.util",
    "java.io",
    "java.lang",
];

/// Configuration for outline extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Implicit package imports, in the order they are reported
    pub default_imports: Vec<String>,

    /// Seed every outline with `default_imports`
    pub include_default_imports: bool,

    /// Superclass reported for classes without an `extends` clause
    pub base_class: String,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            default_imports: DEFAULT_IMPORTS.iter().map(|s| (*s).to_string()).collect(),
            include_default_imports: true,
            base_class: "Object".to_string(),
        }
    }
}

impl OutlineConfig {
    /// Create config that reports only imports written in the script
    pub fn without_default_imports() -> Self {
        Self {
            include_default_imports: false,
            ..Default::default()
        }
    }

    /// Imports to seed an outline with
    pub fn seed_imports(&self) -> &[String] {
        if self.include_default_imports {
            &self.default_imports
        } else {
            &[]
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(index) = self.default_imports.iter().position(|i| i.trim().is_empty()) {
            return Err(OutlineError::invalid_config(format!(
                "default_imports[{index}] must not be empty"
            )));
        }

        if self.base_class.trim().is_empty() {
            return Err(OutlineError::invalid_config("base_class must not be empty"));
        }

        Ok(())
    }
}
