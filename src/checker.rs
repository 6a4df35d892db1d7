//! Classification of decisions against the tree criterion.
//!
//! Branch coverage of a compiled decision implies masking MC/DC exactly when
//! the decision's ROBDD is a tree. A decision that fails the check under its
//! natural evaluation order may still be fixable: for small arities every
//! permutation of the conditions is tried, and the first tree-shaped order is
//! suggested. The search is exhaustive within the bound — the claim "not
//! correctable" quantifies over the whole symmetric group.

use log::debug;
use serde::Serialize;

use crate::bdd::Bdd;
use crate::expr::BoolExpr;
use crate::finder::FoundDecision;

/// How a decision relates to the tree criterion. The `Ord` instance ranks
/// outcomes from best to worst, so the worst of a set is its maximum.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// The diagram is a tree: branch coverage implies masking MC/DC.
    Tree,
    /// Not a tree under the natural order, but a permutation within the
    /// arity bound is.
    NonTreeCorrectable,
    /// No permutation within the arity bound yields a tree, or the arity
    /// exceeds the bound.
    NonTreeNonCorrectable,
}

/// The verdict for one decision. Counts always describe the diagram under
/// the natural evaluation order, even when a reordering is suggested.
#[derive(Debug, Clone)]
pub struct DecisionAnalysis {
    pub condition_count: usize,
    pub node_count: usize,
    pub classification: Classification,
    pub original_order: Vec<String>,
    pub suggested_order: Option<Vec<String>>,
}

/// Default bound on the permutation search: 5 conditions, 120 rebuilds.
pub const DEFAULT_MAX_REORDER_VARIABLES: usize = 5;

#[derive(Debug, Clone)]
pub struct TreeChecker {
    max_reorder_variables: usize,
}

impl Default for TreeChecker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REORDER_VARIABLES)
    }
}

impl TreeChecker {
    pub fn new(max_reorder_variables: usize) -> Self {
        Self { max_reorder_variables }
    }

    pub fn max_reorder_variables(&self) -> usize {
        self.max_reorder_variables
    }

    /// Build the decision's diagram, classify it, and search for a
    /// tree-shaped reordering when the natural order fails.
    pub fn check(&self, decision: &FoundDecision) -> DecisionAnalysis {
        let bdd = Bdd::build(&decision.expr, &decision.variable_order);
        let root = bdd.root();
        let condition_count = bdd.variables(root).len();
        let node_count = bdd.node_count(root);

        if bdd.is_tree(root) {
            debug!("decision is a tree under the natural order");
            return DecisionAnalysis {
                condition_count,
                node_count,
                classification: Classification::Tree,
                original_order: decision.variable_order.clone(),
                suggested_order: None,
            };
        }

        let suggested_order = if decision.variable_order.len() <= self.max_reorder_variables {
            search_tree_order(&decision.expr, &decision.variable_order)
        } else {
            debug!(
                "arity {} exceeds the reorder bound {}",
                decision.variable_order.len(),
                self.max_reorder_variables
            );
            None
        };

        let classification = if suggested_order.is_some() {
            Classification::NonTreeCorrectable
        } else {
            Classification::NonTreeNonCorrectable
        };
        DecisionAnalysis {
            condition_count,
            node_count,
            classification,
            original_order: decision.variable_order.clone(),
            suggested_order,
        }
    }
}

/// First permutation of `order`, in lexicographic enumeration, whose diagram
/// is a tree. Lexicographic means: each remaining element is picked in index
/// order, so the enumeration starts at `order` itself and is deterministic.
fn search_tree_order(expr: &BoolExpr, order: &[String]) -> Option<Vec<String>> {
    let mut remaining = order.to_vec();
    let mut prefix = Vec::with_capacity(order.len());
    let found = permute(expr, &mut remaining, &mut prefix);
    if let Some(order) = &found {
        debug!("tree-shaped order found: [{}]", order.join(", "));
    }
    found
}

fn permute(expr: &BoolExpr, remaining: &mut Vec<String>, prefix: &mut Vec<String>) -> Option<Vec<String>> {
    if remaining.is_empty() {
        let bdd = Bdd::build(expr, prefix);
        if bdd.is_tree(bdd.root()) {
            return Some(prefix.clone());
        }
        return None;
    }
    for i in 0..remaining.len() {
        let name = remaining.remove(i);
        prefix.push(name.clone());
        let found = permute(expr, remaining, prefix);
        prefix.pop();
        remaining.insert(i, name);
        if found.is_some() {
            return found;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn decision(expr: BoolExpr) -> FoundDecision {
        let variable_order = expr.variable_order();
        FoundDecision { expr, variable_order }
    }

    fn var(name: &str) -> BoolExpr {
        BoolExpr::var(name)
    }

    #[test]
    fn test_conjunction_is_a_tree() {
        let analysis = TreeChecker::default().check(&decision(BoolExpr::and(var("a"), var("b"))));
        assert_eq!(analysis.classification, Classification::Tree);
        assert_eq!(analysis.condition_count, 2);
        assert_eq!(analysis.node_count, 2);
        assert_eq!(analysis.suggested_order, None);
    }

    #[test]
    fn test_disjunction_is_a_tree() {
        let analysis = TreeChecker::default().check(&decision(BoolExpr::or(var("a"), var("b"))));
        assert_eq!(analysis.classification, Classification::Tree);
        assert_eq!(analysis.node_count, 2);
    }

    #[test]
    fn test_correctable_decision_suggests_first_lexicographic_order() {
        // (b && c) || a shares the `a` node under [b, c, a]; the first
        // working permutation is [b, a, c].
        let expr = BoolExpr::or(BoolExpr::and(var("b"), var("c")), var("a"));
        let analysis = TreeChecker::default().check(&decision(expr));
        assert_eq!(analysis.classification, Classification::NonTreeCorrectable);
        assert_eq!(analysis.node_count, 3);
        assert_eq!(analysis.original_order, ["b", "c", "a"]);
        assert_eq!(analysis.suggested_order.as_deref(), Some(&["b".to_string(), "a".to_string(), "c".to_string()][..]));
    }

    #[test]
    fn test_counts_describe_the_natural_order() {
        let expr = BoolExpr::or(BoolExpr::and(var("b"), var("c")), var("a"));
        let analysis = TreeChecker::default().check(&decision(expr));
        // Counts come from the [b, c, a] diagram, not the suggested one.
        assert_eq!(analysis.condition_count, 3);
        assert_eq!(analysis.node_count, 3);
    }

    #[test]
    fn test_arity_above_the_bound_is_not_searched() {
        // Pairwise mix over six conditions; known to resist every ordering.
        let expr = BoolExpr::or(
            BoolExpr::or(
                BoolExpr::or(
                    BoolExpr::and(BoolExpr::and(var("a"), var("b")), var("c")),
                    BoolExpr::and(BoolExpr::and(var("d"), var("e")), var("f")),
                ),
                BoolExpr::and(var("a"), var("d")),
            ),
            BoolExpr::or(BoolExpr::and(var("b"), var("e")), BoolExpr::and(var("c"), var("f"))),
        );
        let analysis = TreeChecker::default().check(&decision(expr));
        assert_eq!(analysis.classification, Classification::NonTreeNonCorrectable);
        assert_eq!(analysis.suggested_order, None);
    }

    #[test]
    fn test_bound_is_inclusive() {
        // Five conditions: the search runs and finds an order.
        let expr = BoolExpr::or(
            BoolExpr::and(
                BoolExpr::and(BoolExpr::and(var("b"), var("c")), var("d")),
                var("e"),
            ),
            var("a"),
        );
        let analysis = TreeChecker::default().check(&decision(expr));
        assert_eq!(analysis.classification, Classification::NonTreeCorrectable);

        // The same decision under a bound of 4 is out of reach.
        let analysis = TreeChecker::new(4).check(&decision(BoolExpr::or(
            BoolExpr::and(
                BoolExpr::and(BoolExpr::and(var("b"), var("c")), var("d")),
                var("e"),
            ),
            var("a"),
        )));
        assert_eq!(analysis.classification, Classification::NonTreeNonCorrectable);
    }

    #[test]
    fn test_classification_ranking() {
        assert!(Classification::Tree < Classification::NonTreeCorrectable);
        assert!(Classification::NonTreeCorrectable < Classification::NonTreeNonCorrectable);
    }

    #[test]
    fn test_reorder_completeness_on_a_noncorrectable_decision() {
        // 2-of-3 majority: symmetric, so every order shares the deepest node.
        let expr = BoolExpr::or(
            BoolExpr::or(
                BoolExpr::and(var("a"), var("b")),
                BoolExpr::and(var("b"), var("c")),
            ),
            BoolExpr::and(var("c"), var("a")),
        );
        let found = decision(expr.clone());
        let analysis = TreeChecker::default().check(&found);
        assert_eq!(analysis.classification, Classification::NonTreeNonCorrectable);

        // The claim quantifies over the whole symmetric group.
        let names = found.variable_order;
        for i in 0..names.len() {
            for j in 0..names.len() {
                for k in 0..names.len() {
                    if [i, j, k].iter().collect::<std::collections::HashSet<_>>().len() == 3 {
                        let order =
                            vec![names[i].clone(), names[j].clone(), names[k].clone()];
                        let bdd = Bdd::build(&expr, &order);
                        assert!(!bdd.is_tree(bdd.root()), "order {:?} should share", order);
                    }
                }
            }
        }
    }
}
