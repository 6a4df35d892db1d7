//! Language-independent boolean expressions.

use std::fmt::{Display, Formatter};

/// A boolean expression over named atomic conditions.
///
/// Leaves are identified by their trimmed source text: two `Var` leaves with
/// equal names denote the same condition, and no other equivalence is
/// computed (`x.y` and `y.x` stay distinct).
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum BoolExpr {
    Var(String),
    Not(Box<BoolExpr>),
    And(Box<BoolExpr>, Box<BoolExpr>),
    Or(Box<BoolExpr>, Box<BoolExpr>),
}

impl BoolExpr {
    pub fn var(name: impl Into<String>) -> Self {
        BoolExpr::Var(name.into())
    }

    pub fn not(inner: Self) -> Self {
        BoolExpr::Not(Box::new(inner))
    }

    pub fn and(lhs: Self, rhs: Self) -> Self {
        BoolExpr::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Self, rhs: Self) -> Self {
        BoolExpr::Or(Box::new(lhs), Box::new(rhs))
    }

    /// Distinct variable names, in first-occurrence order of an in-order
    /// traversal (left operand before right, `Not` descends into its child).
    /// This is the natural evaluation order of the decision.
    pub fn variable_order(&self) -> Vec<String> {
        let mut order = Vec::new();
        self.collect_order(&mut order);
        order
    }

    fn collect_order(&self, order: &mut Vec<String>) {
        match self {
            BoolExpr::Var(name) => {
                if !order.iter().any(|seen| seen == name) {
                    order.push(name.clone());
                }
            }
            BoolExpr::Not(inner) => inner.collect_order(order),
            BoolExpr::And(lhs, rhs) | BoolExpr::Or(lhs, rhs) => {
                lhs.collect_order(order);
                rhs.collect_order(order);
            }
        }
    }
}

impl Display for BoolExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BoolExpr::Var(name) => write!(f, "{}", name),
            BoolExpr::Not(inner) => write!(f, "!{}", inner),
            BoolExpr::And(lhs, rhs) => write!(f, "({} && {})", lhs, rhs),
            BoolExpr::Or(lhs, rhs) => write!(f, "({} || {})", lhs, rhs),
        }
    }
}
