//! Report rendering: the stable structured schema and a text form.
//!
//! The JSON shapes are a stable contract; field names are camelCase and the
//! classification spellings are `TREE`, `NON_TREE_CORRECTABLE`, and
//! `NON_TREE_NON_CORRECTABLE`. The text form is for humans and carries no
//! stability promise.

use std::fmt::Write as _;

use serde::Serialize;

use crate::analysis::{FileAnalysis, FunctionAnalysis};
use crate::checker::{Classification, DecisionAnalysis};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionReport {
    pub condition_count: usize,
    pub node_count: usize,
    pub classification: Classification,
    pub original_order: Vec<String>,
    /// `null` when no tree-shaped reordering exists within the bound.
    pub suggested_order: Option<Vec<String>>,
}

impl From<&DecisionAnalysis> for DecisionReport {
    fn from(analysis: &DecisionAnalysis) -> Self {
        Self {
            condition_count: analysis.condition_count,
            node_count: analysis.node_count,
            classification: analysis.classification,
            original_order: analysis.original_order.clone(),
            suggested_order: analysis.suggested_order.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionReport {
    pub name: String,
    pub line: usize,
    pub decisions: Vec<DecisionReport>,
}

impl From<&FunctionAnalysis> for FunctionReport {
    fn from(analysis: &FunctionAnalysis) -> Self {
        Self {
            name: analysis.name.clone(),
            line: analysis.line,
            decisions: analysis.decisions.iter().map(DecisionReport::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub path: String,
    pub functions: Vec<FunctionReport>,
}

impl From<&FileAnalysis> for FileReport {
    fn from(analysis: &FileAnalysis) -> Self {
        Self {
            path: analysis.path.clone(),
            functions: analysis.functions.iter().map(FunctionReport::from).collect(),
        }
    }
}

/// One non-tree function in the summary, with its offending decisions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NonTreeEntry {
    pub file: String,
    pub function: String,
    pub line: usize,
    pub decisions: Vec<DecisionReport>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub files_analyzed: usize,
    pub total_functions: usize,
    pub functions_with_decisions: usize,
    pub total_decisions: usize,
    pub tree_decisions: usize,
    pub correctable_decisions: usize,
    pub non_correctable_decisions: usize,
    pub non_tree_entries: Vec<NonTreeEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiFileReport {
    pub files: Vec<FileReport>,
    pub summary: Summary,
}

impl MultiFileReport {
    pub fn from_analyses(analyses: &[FileAnalysis]) -> Self {
        let files = analyses.iter().map(FileReport::from).collect();

        let mut summary = Summary {
            files_analyzed: analyses.len(),
            total_functions: 0,
            functions_with_decisions: 0,
            total_decisions: 0,
            tree_decisions: 0,
            correctable_decisions: 0,
            non_correctable_decisions: 0,
            non_tree_entries: Vec::new(),
        };

        for file in analyses {
            for function in &file.functions {
                summary.total_functions += 1;
                if !function.decisions.is_empty() {
                    summary.functions_with_decisions += 1;
                }
                for decision in &function.decisions {
                    summary.total_decisions += 1;
                    match decision.classification {
                        Classification::Tree => summary.tree_decisions += 1,
                        Classification::NonTreeCorrectable => summary.correctable_decisions += 1,
                        Classification::NonTreeNonCorrectable => {
                            summary.non_correctable_decisions += 1
                        }
                    }
                }
                if function.overall_classification() != Classification::Tree {
                    summary.non_tree_entries.push(NonTreeEntry {
                        file: file.path.clone(),
                        function: function.name.clone(),
                        line: function.line,
                        decisions: function
                            .decisions
                            .iter()
                            .filter(|decision| decision.classification != Classification::Tree)
                            .map(DecisionReport::from)
                            .collect(),
                    });
                }
            }
        }

        Self { files, summary }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn classification_label(classification: Classification) -> &'static str {
    match classification {
        Classification::Tree => "tree",
        Classification::NonTreeCorrectable => "non-tree (correctable)",
        Classification::NonTreeNonCorrectable => "non-tree (non-correctable)",
    }
}

/// Human-readable per-file report.
pub fn render_text(analyses: &[FileAnalysis]) -> String {
    let mut out = String::new();
    for file in analyses {
        let _ = writeln!(out, "{}", file.path);
        for function in &file.functions {
            let _ = writeln!(
                out,
                "  {} (line {}): {}",
                function.name,
                function.line,
                classification_label(function.overall_classification()),
            );
            for decision in &function.decisions {
                let _ = writeln!(
                    out,
                    "    [{}] {} conditions, {} nodes, order [{}]",
                    classification_label(decision.classification),
                    decision.condition_count,
                    decision.node_count,
                    decision.original_order.join(", "),
                );
                if let Some(order) = &decision.suggested_order {
                    let _ = writeln!(out, "      suggested order: [{}]", order.join(", "));
                }
            }
        }
    }
    out
}

/// Human-readable summary block.
pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "files analyzed:         {}", summary.files_analyzed);
    let _ = writeln!(out, "functions:              {}", summary.total_functions);
    let _ = writeln!(out, "  with decisions:       {}", summary.functions_with_decisions);
    let _ = writeln!(out, "decisions:              {}", summary.total_decisions);
    let _ = writeln!(out, "  tree:                 {}", summary.tree_decisions);
    let _ = writeln!(out, "  correctable:          {}", summary.correctable_decisions);
    let _ = writeln!(out, "  non-correctable:      {}", summary.non_correctable_decisions);
    for entry in &summary.non_tree_entries {
        let _ = writeln!(
            out,
            "  {}:{} {} ({} non-tree decision(s))",
            entry.file,
            entry.line,
            entry.function,
            entry.decisions.len(),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::analysis::Analyzer;

    fn analyses() -> Vec<FileAnalysis> {
        let analyzer = Analyzer::default();
        vec![analyzer
            .analyze_source(
                "demo.swift",
                "func f() { if a && b { }\n if (b && c) || a { } }\nfunc plain() { run() }",
            )
            .unwrap()]
    }

    #[test]
    fn test_summary_counts() {
        let report = MultiFileReport::from_analyses(&analyses());
        let summary = &report.summary;

        assert_eq!(summary.files_analyzed, 1);
        assert_eq!(summary.total_functions, 2);
        assert_eq!(summary.functions_with_decisions, 1);
        assert_eq!(summary.total_decisions, 2);
        assert_eq!(summary.tree_decisions, 1);
        assert_eq!(summary.correctable_decisions, 1);
        assert_eq!(summary.non_correctable_decisions, 0);
        assert_eq!(summary.non_tree_entries.len(), 1);
        assert_eq!(summary.non_tree_entries[0].function, "f");
        assert_eq!(summary.non_tree_entries[0].decisions.len(), 1);
    }

    #[test]
    fn test_json_schema_spellings() {
        let report = MultiFileReport::from_analyses(&analyses());
        let json = report.to_json().unwrap();

        assert!(json.contains("\"conditionCount\""));
        assert!(json.contains("\"nodeCount\""));
        assert!(json.contains("\"originalOrder\""));
        assert!(json.contains("\"suggestedOrder\""));
        assert!(json.contains("\"TREE\""));
        assert!(json.contains("\"NON_TREE_CORRECTABLE\""));
        assert!(json.contains("\"filesAnalyzed\""));
        assert!(json.contains("\"nonTreeEntries\""));

        // A tree decision serializes its missing suggestion as null.
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value["files"][0]["functions"][0]["decisions"][0];
        assert!(first["suggestedOrder"].is_null());
    }

    #[test]
    fn test_text_rendering_mentions_the_suggestion() {
        let text = render_text(&analyses());
        assert!(text.contains("demo.swift"));
        assert!(text.contains("suggested order: [b, a, c]"));
    }
}
