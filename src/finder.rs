//! Locate the decisions of a function body.
//!
//! A decision is the outermost expression whose top connective is `&&` or
//! `||`; a nested connective inside such a subtree belongs to the same
//! decision. Every other node kind is transparent: statements, ternary
//! branches, call arguments, and member bases are all traversed so that the
//! decisions buried in them are found.

use crate::expr::BoolExpr;
use crate::extract::extract;
use crate::syntax::{Block, Expr, ExprKind, Stmt};

/// A decision lifted out of a function body, paired with the left-to-right
/// first-occurrence order of its conditions.
#[derive(Debug, Clone)]
pub struct FoundDecision {
    pub expr: BoolExpr,
    pub variable_order: Vec<String>,
}

/// Collect all decisions of `body`, in source order.
pub fn find_decisions(body: &Block) -> Vec<FoundDecision> {
    let mut found = Vec::new();
    scan_block(body, &mut found);
    found
}

fn scan_block(block: &Block, out: &mut Vec<FoundDecision>) {
    for stmt in &block.stmts {
        scan_stmt(stmt, out);
    }
}

fn scan_stmt(stmt: &Stmt, out: &mut Vec<FoundDecision>) {
    match stmt {
        Stmt::If { condition, then_block, else_block } => {
            scan_expr(condition, out);
            scan_block(then_block, out);
            if let Some(block) = else_block {
                scan_block(block, out);
            }
        }
        Stmt::While { condition, body } => {
            scan_expr(condition, out);
            scan_block(body, out);
        }
        Stmt::Guard { condition, else_block } => {
            scan_expr(condition, out);
            scan_block(else_block, out);
        }
        Stmt::Return(value) => {
            if let Some(expr) = value {
                scan_expr(expr, out);
            }
        }
        Stmt::Binding { value, .. } => {
            if let Some(expr) = value {
                scan_expr(expr, out);
            }
        }
        Stmt::Expr(expr) => scan_expr(expr, out),
    }
}

fn scan_expr(expr: &Expr, out: &mut Vec<FoundDecision>) {
    match &expr.kind {
        ExprKind::Infix { op, .. } if op == "&&" || op == "||" => {
            let decision = extract(expr);
            let variable_order = decision.variable_order();
            out.push(FoundDecision { expr: decision, variable_order });
            // Nested connectives belong to this decision; do not descend.
        }
        ExprKind::Paren(inner) => scan_expr(inner, out),
        ExprKind::Infix { lhs, rhs, .. } => {
            scan_expr(lhs, out);
            scan_expr(rhs, out);
        }
        ExprKind::Prefix { operand, .. } | ExprKind::Postfix { operand, .. } => {
            scan_expr(operand, out);
        }
        ExprKind::Ternary { condition, then_branch, else_branch } => {
            scan_expr(condition, out);
            scan_expr(then_branch, out);
            scan_expr(else_branch, out);
        }
        ExprKind::Call { callee, args } => {
            scan_expr(callee, out);
            for arg in args {
                scan_expr(arg, out);
            }
        }
        ExprKind::Member { base, .. } => scan_expr(base, out),
        ExprKind::Atom(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::parser::parse_source;

    fn decisions_of(source: &str) -> Vec<FoundDecision> {
        let file = parse_source(source).expect("source should parse");
        let body = file.functions[0].body.as_ref().expect("function should have a body");
        find_decisions(body)
    }

    #[test]
    fn test_two_statements_two_decisions() {
        let found = decisions_of("func f() { if a && b { }\n if b || c { } }");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].variable_order, ["a", "b"]);
        assert_eq!(found[1].variable_order, ["b", "c"]);
    }

    #[test]
    fn test_nested_connectives_are_one_decision() {
        let found = decisions_of("func f() { if (b && c) || a { } }");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].variable_order, ["b", "c", "a"]);
    }

    #[test]
    fn test_plain_condition_is_not_a_decision() {
        assert!(decisions_of("func f() { if a { } }").is_empty());
        assert!(decisions_of("func f() { if !a { } }").is_empty());
        assert!(decisions_of("func f() { if a == b { } }").is_empty());
    }

    #[test]
    fn test_ternary_condition_only_but_branches_are_visited() {
        // The `&&` in the else branch is its own decision; the ternary
        // condition alone carries no connective.
        let found = decisions_of("func f() { let x = flag ? a : (b && c) }");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].variable_order, ["b", "c"]);
    }

    #[test]
    fn test_ternary_inside_decision_is_condition_only() {
        let found = decisions_of("func f() { if (a ? b : c) && d { } }");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].variable_order, ["a", "d"]);
    }

    #[test]
    fn test_decision_in_call_argument() {
        let found = decisions_of("func f() { log(a || b) }");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].variable_order, ["a", "b"]);
    }

    #[test]
    fn test_decision_in_guard_and_return() {
        let found = decisions_of("func f() -> Bool { guard a && b else { return false }\n return c || d }");
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_no_descent_inside_a_decision_atom() {
        // `f(a && b)` is one atomic condition of the outer decision; the
        // connective inside its argument is not reported separately.
        let found = decisions_of("func g() { if f(a && b) || c { } }");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].variable_order, ["f(a && b)", "c"]);
    }
}
