//! Lift host expressions into [`BoolExpr`].

use crate::expr::BoolExpr;
use crate::syntax::{Expr, ExprKind};

/// Fold an operator-resolved host expression into a boolean expression.
///
/// Rules, checked in order:
///
/// 1. a parenthesized group unwraps to its inner expression,
/// 2. infix `&&` / `||` become `And` / `Or`,
/// 3. prefix `!` becomes `Not`,
/// 4. a ternary contributes only its condition — the branches do not take
///    part in the short-circuit structure of the enclosing decision,
/// 5. anything else is an atomic condition named by its trimmed source text.
///
/// Rule 1 makes `a` and `(a)` the same condition; beyond that, textual
/// equality is the only identity relation.
pub fn extract(expr: &Expr) -> BoolExpr {
    match &expr.kind {
        ExprKind::Paren(inner) => extract(inner),
        ExprKind::Infix { op, lhs, rhs } if op == "&&" => {
            BoolExpr::and(extract(lhs), extract(rhs))
        }
        ExprKind::Infix { op, lhs, rhs } if op == "||" => {
            BoolExpr::or(extract(lhs), extract(rhs))
        }
        ExprKind::Prefix { op, operand } if op == "!" => BoolExpr::not(extract(operand)),
        ExprKind::Ternary { condition, .. } => extract(condition),
        _ => BoolExpr::var(expr.text.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(text: &str) -> Expr {
        Expr::new(ExprKind::Atom(text.to_string()), text)
    }

    fn infix(op: &str, lhs: Expr, rhs: Expr) -> Expr {
        let text = format!("{} {} {}", lhs.text, op, rhs.text);
        Expr::new(
            ExprKind::Infix { op: op.to_string(), lhs: Box::new(lhs), rhs: Box::new(rhs) },
            text,
        )
    }

    #[test]
    fn test_connectives() {
        let expr = infix("||", infix("&&", atom("a"), atom("b")), atom("c"));
        assert_eq!(
            extract(&expr),
            BoolExpr::or(
                BoolExpr::and(BoolExpr::var("a"), BoolExpr::var("b")),
                BoolExpr::var("c"),
            )
        );
    }

    #[test]
    fn test_paren_unwraps_to_the_same_condition() {
        let plain = atom("a");
        let wrapped = Expr::new(ExprKind::Paren(Box::new(atom("a"))), "(a)");
        assert_eq!(extract(&plain), extract(&wrapped));
    }

    #[test]
    fn test_prefix_not() {
        let expr = Expr::new(
            ExprKind::Prefix { op: "!".to_string(), operand: Box::new(atom("a")) },
            "!a",
        );
        assert_eq!(extract(&expr), BoolExpr::not(BoolExpr::var("a")));
    }

    #[test]
    fn test_ternary_contributes_only_its_condition() {
        let expr = Expr::new(
            ExprKind::Ternary {
                condition: Box::new(atom("a")),
                then_branch: Box::new(atom("b")),
                else_branch: Box::new(atom("c")),
            },
            "a ? b : c",
        );
        assert_eq!(extract(&expr), BoolExpr::var("a"));
    }

    #[test]
    fn test_comparison_is_an_opaque_atom() {
        let expr = infix("&&", infix("==", atom("x"), atom("1")), atom("b"));
        assert_eq!(
            extract(&expr),
            BoolExpr::and(BoolExpr::var("x == 1"), BoolExpr::var("b"))
        );
    }

    #[test]
    fn test_force_unwrap_is_not_a_negation() {
        let expr = Expr::new(
            ExprKind::Postfix { op: "!".to_string(), operand: Box::new(atom("x")) },
            "x!",
        );
        assert_eq!(extract(&expr), BoolExpr::var("x!"));
    }
}
