//! # mcdc-checker: does branch coverage imply masking MC/DC?
//!
//! **`mcdc-checker`** statically analyzes the compound boolean decisions of a
//! source file and decides, per decision, whether branch coverage of the
//! compiled code already implies **masking MC/DC** (Modified
//! Condition/Decision Coverage).
//!
//! ## The criterion
//!
//! Following Comar, Guitton & Hainque (2012), a decision is fully exercised
//! by branch coverage exactly when its **reduced ordered binary decision
//! diagram** is a *tree*: no internal node reachable along two distinct
//! edges. Short-circuit evaluation compiles a decision into one branch per
//! BDD node, so a shared node means two distinct evaluation paths merge and
//! branch coverage can no longer distinguish them.
//!
//! When a decision fails the check under its natural left-to-right order,
//! the checker enumerates variable permutations (for bounded arity) and
//! suggests the first order whose diagram is a tree — rewriting the decision
//! in that order restores the guarantee.
//!
//! ## Basic usage
//!
//! ```rust
//! use mcdc_checker::analysis::Analyzer;
//! use mcdc_checker::checker::Classification;
//!
//! let analyzer = Analyzer::default();
//! let analysis = analyzer
//!     .analyze_source("demo.swift", "func f(a: Bool, b: Bool) -> Bool { return a && b }")
//!     .unwrap();
//!
//! let function = &analysis.functions[0];
//! assert_eq!(function.decisions.len(), 1);
//! assert_eq!(function.decisions[0].classification, Classification::Tree);
//! ```
//!
//! The BDD engine is usable on its own:
//!
//! ```rust
//! use mcdc_checker::bdd::Bdd;
//! use mcdc_checker::expr::BoolExpr;
//!
//! let expr = BoolExpr::or(
//!     BoolExpr::and(BoolExpr::var("b"), BoolExpr::var("c")),
//!     BoolExpr::var("a"),
//! );
//! let bdd = Bdd::build(&expr, &expr.variable_order());
//! assert!(!bdd.is_tree(bdd.root())); // the `a` node is shared
//! ```
//!
//! ## Core components
//!
//! - **[`bdd`]**: the ROBDD engine — arena, unique table, memoized ITE, and
//!   the tree/size/variable queries.
//! - **[`expr`]**: the language-independent boolean expression AST.
//! - **[`parser`]** / **[`syntax`]**: the Swift-like host-language binding.
//! - **[`extract`]** / **[`finder`]**: lifting decisions out of parsed
//!   function bodies.
//! - **[`checker`]**: classification and the exhaustive reorder search.
//! - **[`analysis`]** / **[`report`]**: the per-file façade and the stable
//!   report schema.

pub mod analysis;
pub mod bdd;
pub mod cache;
pub mod checker;
pub mod error;
pub mod expr;
pub mod extract;
pub mod finder;
pub mod node;
pub mod parser;
pub mod reference;
pub mod report;
pub mod syntax;
pub mod types;
pub mod utils;
