use std::io::Read;

use crate::classify::{is_class, is_method, is_variable};
use crate::config::OutlineConfig;
use crate::error::Result;
use crate::extract::{collect_imports, variable_info, DeclarationExtractor};
use crate::scope;
use crate::syntax::{Node, Parser, Position, StatementSource};
use crate::types::{ImportInfo, ScriptInfo, SourceSpan};

/// Main analyzer interface for outlining scripts
#[derive(Debug, Clone, Default)]
pub struct ScriptAnalyzer {
    config: OutlineConfig,
}

impl ScriptAnalyzer {
    /// Create a new analyzer, rejecting an invalid configuration
    pub fn new(config: OutlineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &OutlineConfig {
        &self.config
    }

    /// Outline a script held in memory, including its whole-text span
    pub fn analyze_str(&self, source: &str) -> Result<ScriptInfo> {
        let mut script = self.analyze_source(Parser::new(source))?;
        script.span = script_span(source);
        Ok(script)
    }

    /// Outline a script read from a stream
    ///
    /// Read failures and invalid UTF-8 are reported as
    /// [`OutlineError::Io`](crate::OutlineError::Io).
    pub fn analyze_reader(&self, mut reader: impl Read) -> Result<ScriptInfo> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        self.analyze_str(&source)
    }

    /// Outline the statements yielded by `source`
    ///
    /// Statements that fail to parse are skipped. The loop gives up when two
    /// failures in a row leave the source at the same position. The result
    /// carries no span, since only the statements are seen.
    pub fn analyze_source(&self, mut source: impl StatementSource) -> Result<ScriptInfo> {
        let mut script = ScriptInfo::default();
        for name in self.config.seed_imports() {
            merge_import(&mut script.imports, ImportInfo::implicit_package(name.as_str()));
        }

        let extractor = DeclarationExtractor::new(&self.config);
        let mut last_failure: Option<Position> = None;

        loop {
            match source.next_statement() {
                Ok(None) => break,
                Ok(Some(node)) => {
                    last_failure = None;
                    self.accept(&extractor, &node, &mut script)?;
                }
                Err(err) => {
                    let position = source.position();
                    if last_failure == Some(position) {
                        log::warn!("parser made no progress at {position}, stopping: {err}");
                        break;
                    }
                    log::debug!("skipping unparseable statement: {err}");
                    last_failure = Some(position);
                }
            }
        }

        scope::normalize(&mut script);
        Ok(script)
    }

    fn accept(
        &self,
        extractor: &DeclarationExtractor<'_>,
        node: &Node,
        script: &mut ScriptInfo,
    ) -> Result<()> {
        for import in collect_imports(node) {
            merge_import(&mut script.imports, import);
        }

        if is_method(node) {
            log::trace!("method: {}", node.describe());
            script.methods.push(extractor.method(node)?);
        } else if is_variable(node) {
            log::trace!("variable: {}", node.describe());
            script.variables.push(variable_info(node)?);
        } else if is_class(node) {
            log::trace!("class: {}", node.describe());
            script.methods.push(extractor.class(node)?);
        }
        Ok(())
    }
}

/// Outline a script with the default configuration
pub fn analyze(source: &str) -> Result<ScriptInfo> {
    ScriptAnalyzer::default().analyze_str(source)
}

/// Imports are unique by name; the first one seen wins
fn merge_import(imports: &mut Vec<ImportInfo>, import: ImportInfo) {
    if imports.iter().any(|existing| existing.name == import.name) {
        log::trace!("import `{}` already present", import.name);
    } else {
        imports.push(import);
    }
}

/// Span covering the whole text: line 1 column 1 to the end of the last line
///
/// Lines are separated by `\n` or `\r\n`; trailing empty lines do not count.
/// Text without any non-empty line has an empty span.
#[must_use]
pub fn script_span(source: &str) -> SourceSpan {
    let mut lines: Vec<&str> = source
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    match lines.last() {
        None => SourceSpan::default(),
        Some(last) => SourceSpan::new(1, 1, lines.len(), last.chars().count()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::ParseError;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;

    /// Replays canned results; each step also sets the position reported
    /// afterwards
    struct ScriptedSource {
        steps: VecDeque<(std::result::Result<Option<Node>, ParseError>, Position)>,
        position: Position,
        calls: usize,
    }

    impl ScriptedSource {
        fn new(steps: Vec<(std::result::Result<Option<Node>, ParseError>, Position)>) -> Self {
            Self {
                steps: steps.into(),
                position: Position::new(1, 1),
                calls: 0,
            }
        }
    }

    impl StatementSource for ScriptedSource {
        fn next_statement(&mut self) -> std::result::Result<Option<Node>, ParseError> {
            self.calls += 1;
            match self.steps.pop_front() {
                Some((result, position)) => {
                    self.position = position;
                    result
                }
                None => Ok(None),
            }
        }

        fn position(&self) -> Position {
            self.position
        }
    }

    fn failure(line: usize, column: usize) -> std::result::Result<Option<Node>, ParseError> {
        Err(ParseError {
            message: "unexpected token".to_string(),
            position: Position::new(line, column),
        })
    }

    fn statement(source: &str) -> std::result::Result<Option<Node>, ParseError> {
        Parser::new(source).next_statement()
    }

    #[test]
    fn test_two_failures_at_same_position_stop_the_loop() {
        let mut source = ScriptedSource::new(vec![
            (statement("a = 1;"), Position::new(1, 7)),
            (failure(1, 8), Position::new(1, 8)),
            (failure(1, 8), Position::new(1, 8)),
            (statement("b = 2;"), Position::new(2, 7)),
        ]);

        let script = ScriptAnalyzer::default()
            .analyze_source(&mut source)
            .unwrap();

        assert_eq!(source.calls, 3);
        assert_eq!(script.variables.len(), 1);
        assert_eq!(script.variables[0].name, "a");
    }

    #[test]
    fn test_failures_at_advancing_positions_keep_going() {
        let mut source = ScriptedSource::new(vec![
            (failure(1, 1), Position::new(1, 2)),
            (failure(1, 2), Position::new(1, 3)),
            (failure(1, 3), Position::new(1, 4)),
            (statement("b = 2;"), Position::new(2, 7)),
        ]);

        let script = ScriptAnalyzer::default()
            .analyze_source(&mut source)
            .unwrap();

        assert_eq!(source.calls, 5);
        assert_eq!(script.variables[0].name, "b");
    }

    #[test]
    fn test_success_between_failures_resets_stuck_detection() {
        let mut source = ScriptedSource::new(vec![
            (failure(1, 1), Position::new(1, 2)),
            (statement("a = 1;"), Position::new(1, 2)),
            (failure(1, 2), Position::new(1, 2)),
            (statement("b = 2;"), Position::new(2, 7)),
        ]);

        let script = ScriptAnalyzer::default()
            .analyze_source(&mut source)
            .unwrap();

        assert_eq!(script.variables.len(), 2);
    }

    #[test]
    fn test_script_span() {
        assert_eq!(script_span(""), SourceSpan::default());
        assert_eq!(script_span("\n\r\n"), SourceSpan::default());
        assert_eq!(script_span("a = 1;"), SourceSpan::new(1, 1, 1, 6));
        assert_eq!(
            script_span("a = 1;\r\nfoo() {\n}\n\n"),
            SourceSpan::new(1, 1, 3, 1)
        );
    }

    #[test]
    fn test_seed_imports_follow_config() {
        let analyzer = ScriptAnalyzer::new(OutlineConfig::without_default_imports()).unwrap();
        let script = analyzer.analyze_str("import java.util.*;").unwrap();
        assert_eq!(script.imports.len(), 1);
        assert_eq!(script.imports[0].line_number, 1);

        let config = OutlineConfig {
            base_class: String::new(),
            ..OutlineConfig::default()
        };
        assert!(ScriptAnalyzer::new(config).is_err());
    }

    #[test]
    fn test_repeated_default_import_is_not_duplicated() {
        let script = analyze("import java.util.*;\nimport java.util.regex.*;").unwrap();
        let names: Vec<_> = script.imports.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names.iter().filter(|n| **n == "java.util").count(), 1);
        assert_eq!(names.last(), Some(&"java.util.regex"));
        assert!(script.imports[5].is_implicit());
    }
}
