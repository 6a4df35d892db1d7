//! The ROBDD engine.
//!
//! A [`Bdd`] owns every node of one decision's diagram: an arena of
//! [`Node`] records addressed by [`Ref`] handles, a unique table that makes
//! structural sharing canonical, and a computed table memoizing the ITE
//! operation. One `Bdd` is built per analyzed decision and discarded after
//! the read-only queries ran; nothing is shared across decisions.
//!
//! Reduction invariants maintained by [`mk_node`][Bdd::mk_node]:
//!
//! - no node has `low == high` (the test would be redundant),
//! - no two nodes share `(variable, low, high)` (the unique table resolves
//!   them to one handle),
//! - variable indices strictly increase from the root toward the terminals.

use std::collections::BTreeSet;
use std::hash::BuildHasherDefault;

use hashbrown::{HashMap, HashSet};
use log::debug;

use crate::cache::OpCache;
use crate::expr::BoolExpr;
use crate::node::Node;
use crate::reference::Ref;
use crate::types::Var;
use crate::utils::MyHasher;

/// Computed-table size: `2^12` slots is plenty for single-decision diagrams.
const CACHE_BITS: usize = 12;

type UniqueTable = HashMap<Node, Ref, BuildHasherDefault<MyHasher>>;

pub struct Bdd {
    /// Internal nodes in creation order; `Ref` 0 and 1 are the terminals and
    /// have no record, so node `r` lives at `nodes[r.index() - 2]`.
    nodes: Vec<Node>,
    unique: UniqueTable,
    ite_cache: OpCache<(Ref, Ref, Ref), Ref>,
    variable_names: Vec<String>,
    variable_index: HashMap<String, Var>,
    root: Ref,
}

impl Bdd {
    /// An engine without a name table. Variables are addressed by index only;
    /// use [`Bdd::build`] when construction starts from a [`BoolExpr`].
    pub fn new() -> Self {
        Self::with_order(&[])
    }

    /// An empty engine whose variable order is the given name list: the name
    /// at position `i` denotes variable `i`.
    pub fn with_order(order: &[String]) -> Self {
        let variable_index = order
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), Var::new(i as u32)))
            .collect();
        Self {
            nodes: Vec::new(),
            unique: UniqueTable::default(),
            ite_cache: OpCache::new(CACHE_BITS),
            variable_names: order.to_vec(),
            variable_index,
            root: Ref::ZERO,
        }
    }

    /// Build the diagram of `expr` under the given variable order and set the
    /// root. This is the entry point used per analyzed decision.
    pub fn build(expr: &BoolExpr, order: &[String]) -> Self {
        let mut bdd = Self::with_order(order);
        bdd.root = bdd.build_expr(expr);
        debug!(
            "build: {} variables, {} nodes, root = {}",
            order.len(),
            bdd.size(),
            bdd.root
        );
        bdd
    }

    pub fn root(&self) -> Ref {
        self.root
    }

    /// Number of internal nodes allocated so far (reachable or not).
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn variable_names(&self) -> &[String] {
        &self.variable_names
    }

    pub fn index_of(&self, name: &str) -> Option<Var> {
        self.variable_index.get(name).copied()
    }

    pub fn name_of(&self, v: Var) -> &str {
        &self.variable_names[v.index()]
    }

    fn node(&self, r: Ref) -> &Node {
        assert!(!r.is_terminal(), "Terminals have no node record");
        &self.nodes[r.index() - 2]
    }

    /// The branching variable of `r`, or `None` for a terminal. A terminal
    /// never becomes the top variable of an ITE call.
    pub fn variable(&self, r: Ref) -> Option<Var> {
        if r.is_terminal() {
            None
        } else {
            Some(self.node(r).variable)
        }
    }

    pub fn low(&self, r: Ref) -> Ref {
        self.node(r).low
    }

    pub fn high(&self, r: Ref) -> Ref {
        self.node(r).high
    }
}

impl Default for Bdd {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Bdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bdd")
            .field("nodes", &self.nodes.len())
            .field("variables", &self.variable_names.len())
            .field("root", &self.root)
            .finish()
    }
}

impl Bdd {
    /// Return the handle for `(v, low, high)`, honoring both reductions:
    /// a redundant test collapses to its child, and an existing node is
    /// reused through the unique table.
    pub fn mk_node(&mut self, v: Var, low: Ref, high: Ref) -> Ref {
        debug!("mk_node(v = {}, low = {}, high = {})", v, low, high);

        if low == high {
            debug!("mk_node: redundant test on {}", v);
            return low;
        }

        if let Some(w) = self.variable(low) {
            assert!(w > v, "Ordering breach: low child {} under {}", w, v);
        }
        if let Some(w) = self.variable(high) {
            assert!(w > v, "Ordering breach: high child {} under {}", w, v);
        }

        let node = Node::new(v, low, high);
        if let Some(&existing) = self.unique.get(&node) {
            debug!("mk_node: node {} already exists", existing);
            return existing;
        }

        let r = Ref::new((self.nodes.len() + 2) as u32);
        self.nodes.push(node);
        self.unique.insert(node, r);
        debug!("mk_node: created new node {}", r);
        r
    }

    /// The single-variable function `v`.
    pub fn mk_var(&mut self, v: Var) -> Ref {
        self.mk_node(v, Ref::ZERO, Ref::ONE)
    }

    /// Both restrictions of `x` by the top variable `v`: `(x|v=0, x|v=1)`.
    ///
    /// `v` never sits below the top of `x`; callers pass the minimum variable
    /// over their operands, so a node either branches on exactly `v` or does
    /// not mention it at all.
    pub fn top_cofactors(&self, x: Ref, v: Var) -> (Ref, Ref) {
        if x.is_terminal() {
            return (x, x);
        }
        let node = self.node(x);
        if node.variable > v {
            // `v` does not occur in this subgraph.
            return (x, x);
        }
        assert_eq!(node.variable, v, "Cofactor below the top variable");
        (node.low, node.high)
    }

    /// Apply the ITE operation to the arguments.
    ///
    /// ```text
    /// ITE(f, g, h) = (f ∧ g) ∨ (¬f ∧ h)
    /// ```
    ///
    /// # Examples
    ///
    /// ```
    /// use mcdc_checker::bdd::Bdd;
    /// use mcdc_checker::reference::Ref;
    /// use mcdc_checker::types::Var;
    ///
    /// let mut bdd = Bdd::new();
    /// let x = bdd.mk_var(Var::new(0));
    /// let y = bdd.mk_var(Var::new(1));
    /// let f = bdd.apply_ite(x, y, Ref::ZERO);
    /// assert_eq!(f, bdd.apply_and(x, y));
    /// ```
    pub fn apply_ite(&mut self, f: Ref, g: Ref, h: Ref) -> Ref {
        debug!("apply_ite(f = {}, g = {}, h = {})", f, g, h);

        // Terminal short-circuits, checked in this order:
        //   ite(1,G,H) => G
        //   ite(0,G,H) => H
        //   ite(F,1,0) => F
        //   ite(F,G,G) => G
        if f.is_one() {
            return g;
        }
        if f.is_zero() {
            return h;
        }
        if g.is_one() && h.is_zero() {
            return f;
        }
        if g == h {
            return g;
        }

        if let Some(res) = self.ite_cache.get(&(f, g, h)) {
            debug!("cache: apply_ite(f = {}, g = {}, h = {}) -> {}", f, g, h, res);
            return res;
        }

        // F is not a terminal here, so a top variable exists; terminals
        // contribute nothing to the minimum.
        let mut top = self.node(f).variable;
        if let Some(j) = self.variable(g) {
            top = top.min(j);
        }
        if let Some(k) = self.variable(h) {
            top = top.min(k);
        }
        debug!("top variable = {}", top);

        let (f0, f1) = self.top_cofactors(f, top);
        let (g0, g1) = self.top_cofactors(g, top);
        let (h0, h1) = self.top_cofactors(h, top);

        let low = self.apply_ite(f0, g0, h0);
        let high = self.apply_ite(f1, g1, h1);
        let res = self.mk_node(top, low, high);
        debug!("computed: apply_ite(f = {}, g = {}, h = {}) -> {}", f, g, h, res);

        self.ite_cache.insert((f, g, h), res);
        res
    }

    pub fn apply_and(&mut self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, v, Ref::ZERO)
    }

    pub fn apply_or(&mut self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, Ref::ONE, v)
    }

    pub fn apply_not(&mut self, u: Ref) -> Ref {
        self.apply_ite(u, Ref::ZERO, Ref::ONE)
    }

    /// Fold a [`BoolExpr`] into the diagram under the current variable order.
    ///
    /// A name absent from the order maps to the true terminal; that never
    /// happens when the order was collected from the same expression.
    pub fn build_expr(&mut self, expr: &BoolExpr) -> Ref {
        match expr {
            BoolExpr::Var(name) => match self.index_of(name) {
                Some(v) => self.mk_var(v),
                None => Ref::ONE,
            },
            BoolExpr::Not(inner) => {
                let x = self.build_expr(inner);
                self.apply_not(x)
            }
            BoolExpr::And(lhs, rhs) => {
                let a = self.build_expr(lhs);
                let b = self.build_expr(rhs);
                self.apply_and(a, b)
            }
            BoolExpr::Or(lhs, rhs) => {
                let a = self.build_expr(lhs);
                let b = self.build_expr(rhs);
                self.apply_or(a, b)
            }
        }
    }
}

impl Bdd {
    /// Whether the diagram under `root` is a tree: no internal node is
    /// reachable along two distinct edges. Terminals are excluded — they are
    /// expected to be shared.
    ///
    /// # Examples
    ///
    /// ```
    /// use mcdc_checker::bdd::Bdd;
    /// use mcdc_checker::types::Var;
    ///
    /// let mut bdd = Bdd::new();
    /// let x = bdd.mk_var(Var::new(0));
    /// let y = bdd.mk_var(Var::new(1));
    /// let f = bdd.apply_and(x, y);
    /// assert!(bdd.is_tree(f));
    /// ```
    pub fn is_tree(&self, root: Ref) -> bool {
        let mut references: HashMap<Ref, usize> = HashMap::new();
        let mut visited: HashSet<Ref> = HashSet::new();
        let mut stack = vec![root];

        while let Some(r) = stack.pop() {
            if r.is_terminal() || !visited.insert(r) {
                continue;
            }
            let node = self.node(r);
            for child in [node.low, node.high] {
                if child.is_terminal() {
                    continue;
                }
                let count = references.entry(child).or_insert(0);
                *count += 1;
                if *count >= 2 {
                    debug!("is_tree: node {} is shared", child);
                    return false;
                }
                stack.push(child);
            }
        }
        true
    }

    /// Number of internal nodes reachable from `root`.
    pub fn node_count(&self, root: Ref) -> usize {
        let mut visited: HashSet<Ref> = HashSet::new();
        let mut stack = vec![root];

        while let Some(r) = stack.pop() {
            if r.is_terminal() || !visited.insert(r) {
                continue;
            }
            let node = self.node(r);
            stack.push(node.low);
            stack.push(node.high);
        }
        visited.len()
    }

    /// The set of variables tested by nodes reachable from `root`.
    pub fn variables(&self, root: Ref) -> BTreeSet<Var> {
        let mut result = BTreeSet::new();
        let mut visited: HashSet<Ref> = HashSet::new();
        let mut stack = vec![root];

        while let Some(r) = stack.pop() {
            if r.is_terminal() || !visited.insert(r) {
                continue;
            }
            let node = self.node(r);
            result.insert(node.variable);
            stack.push(node.low);
            stack.push(node.high);
        }
        result
    }

    /// Render the diagram under `node` as a nested bracket string, high
    /// branch first. Debugging aid.
    pub fn to_bracket_string(&self, node: Ref) -> String {
        if node.is_zero() {
            return "(0)".to_string();
        }
        if node.is_one() {
            return "(1)".to_string();
        }

        let record = self.node(node);
        format!(
            "{}:({}, {}, {})",
            node,
            record.variable,
            self.to_bracket_string(record.high),
            self.to_bracket_string(record.low),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_mk_node_reductions() {
        let mut bdd = Bdd::new();
        let x = bdd.mk_var(Var::new(0));

        // Redundant test collapses to the child.
        assert_eq!(bdd.mk_node(Var::new(1), x, x), x);

        // The unique table resolves equal keys to one handle.
        let a = bdd.mk_node(Var::new(1), Ref::ZERO, Ref::ONE);
        let b = bdd.mk_node(Var::new(1), Ref::ZERO, Ref::ONE);
        assert_eq!(a, b);
        assert_eq!(bdd.size(), 2);
    }

    #[test]
    #[should_panic(expected = "Ordering breach")]
    fn test_mk_node_rejects_inverted_levels() {
        let mut bdd = Bdd::new();
        let top = bdd.mk_var(Var::new(0));
        bdd.mk_node(Var::new(1), top, Ref::ONE);
    }

    #[test]
    fn test_apply_ite_terminal_cases() {
        let mut bdd = Bdd::new();
        let g = bdd.mk_var(Var::new(1));
        let h = bdd.mk_var(Var::new(2));

        assert_eq!(bdd.apply_ite(Ref::ONE, g, h), g);
        assert_eq!(bdd.apply_ite(Ref::ZERO, g, h), h);

        let f = bdd.mk_var(Var::new(0));
        assert_eq!(bdd.apply_ite(f, Ref::ONE, Ref::ZERO), f);
        assert_eq!(bdd.apply_ite(f, g, g), g);
    }

    #[test]
    fn test_apply_ite_is_idempotent() {
        let mut bdd = Bdd::new();
        let f = bdd.mk_var(Var::new(0));
        let g = bdd.mk_var(Var::new(1));
        let h = bdd.mk_var(Var::new(2));

        let first = bdd.apply_ite(f, g, h);
        let second = bdd.apply_ite(f, g, h);
        assert_eq!(first, second);
    }

    #[test]
    fn test_double_negation_restores_the_handle() {
        let mut bdd = Bdd::new();
        let x = bdd.mk_var(Var::new(0));
        let y = bdd.mk_var(Var::new(1));
        let f = bdd.apply_or(x, y);

        let not_f = bdd.apply_not(f);
        assert_eq!(bdd.apply_not(not_f), f);
    }

    #[test]
    fn test_de_morgan_as_identifiers() {
        let mut bdd = Bdd::new();
        let a = bdd.mk_var(Var::new(0));
        let b = bdd.mk_var(Var::new(1));

        let conj = bdd.apply_and(a, b);
        let na = bdd.apply_not(a);
        let nb = bdd.apply_not(b);
        let disj = bdd.apply_or(na, nb);
        assert_eq!(conj, bdd.apply_not(disj));
    }

    #[test]
    fn test_ordering_invariant_along_paths() {
        let mut bdd = Bdd::new();
        let a = bdd.mk_var(Var::new(0));
        let b = bdd.mk_var(Var::new(1));
        let c = bdd.mk_var(Var::new(2));
        let ab = bdd.apply_and(a, b);
        let root = bdd.apply_or(ab, c);

        // Walk every path and check that levels strictly increase.
        let mut stack = vec![(root, None::<Var>)];
        while let Some((r, prev)) = stack.pop() {
            if r.is_terminal() {
                continue;
            }
            let v = bdd.variable(r).unwrap();
            if let Some(p) = prev {
                assert!(v > p, "level {} under {}", v, p);
            }
            stack.push((bdd.low(r), Some(v)));
            stack.push((bdd.high(r), Some(v)));
        }
    }

    #[test]
    fn test_build_conjunction_is_tree() {
        let expr = BoolExpr::and(BoolExpr::var("a"), BoolExpr::var("b"));
        let bdd = Bdd::build(&expr, &names(&["a", "b"]));

        assert_eq!(bdd.node_count(bdd.root()), 2);
        assert!(bdd.is_tree(bdd.root()));
        assert_eq!(bdd.variables(bdd.root()).len(), 2);
    }

    #[test]
    fn test_build_shared_diagram_is_not_tree() {
        // (b && c) || a under [b, c, a]: the `a` node is reachable twice.
        let expr = BoolExpr::or(
            BoolExpr::and(BoolExpr::var("b"), BoolExpr::var("c")),
            BoolExpr::var("a"),
        );
        let bdd = Bdd::build(&expr, &names(&["b", "c", "a"]));

        assert_eq!(bdd.node_count(bdd.root()), 3);
        assert!(!bdd.is_tree(bdd.root()));
    }

    #[test]
    fn test_build_duplicate_condition_collapses() {
        // Textually identical atoms are one variable.
        let expr = BoolExpr::and(BoolExpr::var("x"), BoolExpr::var("x"));
        let bdd = Bdd::build(&expr, &names(&["x"]));

        assert_eq!(bdd.node_count(bdd.root()), 1);
        assert!(bdd.is_tree(bdd.root()));
    }

    #[test]
    fn test_build_contradiction_collapses_to_terminal() {
        let expr = BoolExpr::and(BoolExpr::var("a"), BoolExpr::not(BoolExpr::var("a")));
        let bdd = Bdd::build(&expr, &names(&["a"]));

        assert!(bdd.root().is_zero());
        assert_eq!(bdd.node_count(bdd.root()), 0);
        assert!(bdd.is_tree(bdd.root()));
    }

    #[test]
    fn test_name_table() {
        let expr = BoolExpr::and(BoolExpr::var("left"), BoolExpr::var("right"));
        let bdd = Bdd::build(&expr, &names(&["left", "right"]));

        assert_eq!(bdd.variable_names(), ["left", "right"]);
        assert_eq!(bdd.index_of("right"), Some(Var::new(1)));
        assert_eq!(bdd.index_of("missing"), None);
        assert_eq!(bdd.name_of(Var::new(0)), "left");
    }

    #[test]
    fn test_build_unknown_name_maps_to_true() {
        let expr = BoolExpr::and(BoolExpr::var("a"), BoolExpr::var("ghost"));
        let bdd = Bdd::build(&expr, &names(&["a"]));

        // `ghost` degenerates to the true terminal, leaving just `a`.
        let expected = Bdd::build(&BoolExpr::var("a"), &names(&["a"]));
        assert_eq!(
            bdd.to_bracket_string(bdd.root()),
            expected.to_bracket_string(expected.root())
        );
    }
}
