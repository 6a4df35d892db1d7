//! The analysis façade: from source text to per-function classifications.
//!
//! One [`Analyzer`] is configured once and reused across files. Every
//! analyzed decision gets a fresh BDD engine with fresh tables; nothing is
//! shared between decisions, functions, or files, so files may be analyzed
//! in parallel by the caller if desired.

use std::fs;
use std::path::Path;

use log::debug;

use crate::checker::{Classification, DecisionAnalysis, TreeChecker, DEFAULT_MAX_REORDER_VARIABLES};
use crate::error::AnalyzeError;
use crate::finder::find_decisions;
use crate::parser::parse_source;

/// Verdicts for one function or initializer with a body.
#[derive(Debug, Clone)]
pub struct FunctionAnalysis {
    pub name: String,
    /// 1-based line of the declaration.
    pub line: usize,
    /// Decisions in source order; may be empty.
    pub decisions: Vec<DecisionAnalysis>,
}

impl FunctionAnalysis {
    /// The worst classification among the function's decisions; `Tree` when
    /// there are none.
    pub fn overall_classification(&self) -> Classification {
        self.decisions
            .iter()
            .map(|decision| decision.classification)
            .max()
            .unwrap_or(Classification::Tree)
    }
}

/// Verdicts for one source file, functions in parser traversal order.
#[derive(Debug, Clone)]
pub struct FileAnalysis {
    pub path: String,
    pub functions: Vec<FunctionAnalysis>,
}

pub struct Analyzer {
    checker: TreeChecker,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REORDER_VARIABLES)
    }
}

impl Analyzer {
    pub fn new(max_reorder_variables: usize) -> Self {
        Self { checker: TreeChecker::new(max_reorder_variables) }
    }

    /// Analyze one file's source text. `path` is only used for reporting.
    pub fn analyze_source(&self, path: &str, source: &str) -> Result<FileAnalysis, AnalyzeError> {
        let file = parse_source(source)
            .map_err(|source| AnalyzeError::Parse { path: path.to_string(), source })?;

        let mut functions = Vec::new();
        for function in &file.functions {
            let Some(body) = &function.body else {
                // A declaration without a body (protocol requirement).
                continue;
            };
            let decisions: Vec<DecisionAnalysis> = find_decisions(body)
                .iter()
                .map(|decision| self.checker.check(decision))
                .collect();
            debug!(
                "{}:{} {}: {} decision(s)",
                path,
                function.line,
                function.name,
                decisions.len()
            );
            functions.push(FunctionAnalysis {
                name: function.name.clone(),
                line: function.line,
                decisions,
            });
        }
        Ok(FileAnalysis { path: path.to_string(), functions })
    }

    /// Read and analyze one file from disk.
    pub fn analyze_file(&self, path: &Path) -> Result<FileAnalysis, AnalyzeError> {
        let display = path.display().to_string();
        let source = fs::read_to_string(path)
            .map_err(|source| AnalyzeError::Io { path: display.clone(), source })?;
        self.analyze_source(&display, &source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_list_and_overall_classification() {
        let analyzer = Analyzer::default();
        let analysis = analyzer
            .analyze_source(
                "demo.swift",
                "func f() { if a && b { }\n if (b && c) || a { } }",
            )
            .unwrap();

        assert_eq!(analysis.functions.len(), 1);
        let function = &analysis.functions[0];
        assert_eq!(function.decisions.len(), 2);
        assert_eq!(function.decisions[0].classification, Classification::Tree);
        assert_eq!(
            function.decisions[1].classification,
            Classification::NonTreeCorrectable
        );
        assert_eq!(
            function.overall_classification(),
            Classification::NonTreeCorrectable
        );
    }

    #[test]
    fn test_function_without_decisions_is_kept() {
        let analyzer = Analyzer::default();
        let analysis = analyzer
            .analyze_source("demo.swift", "func plain() { if ready { run() } }")
            .unwrap();
        assert_eq!(analysis.functions.len(), 1);
        assert!(analysis.functions[0].decisions.is_empty());
        assert_eq!(
            analysis.functions[0].overall_classification(),
            Classification::Tree
        );
    }

    #[test]
    fn test_bodiless_declarations_produce_no_entries() {
        let analyzer = Analyzer::default();
        let analysis = analyzer
            .analyze_source("demo.swift", "protocol P { func f() -> Bool }")
            .unwrap();
        assert!(analysis.functions.is_empty());
    }

    #[test]
    fn test_parse_error_carries_the_path() {
        let analyzer = Analyzer::default();
        let err = analyzer.analyze_source("broken.swift", "func f() { if ").unwrap_err();
        match err {
            AnalyzeError::Parse { path, .. } => assert_eq!(path, "broken.swift"),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }
}
