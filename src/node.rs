use std::hash::{Hash, Hasher};

use crate::reference::Ref;
use crate::types::Var;
use crate::utils::{pairing3, MyHash};

/// An internal BDD node: one Shannon decomposition step.
///
/// ```text
/// f = (¬v ∧ low) ∨ (v ∧ high)
/// ```
///
/// `(variable, low, high)` is the unique-table key. For every stored node
/// `low != high` (a redundant test is never allocated), and no two stored
/// nodes share the key (sharing is resolved at creation).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Node {
    pub variable: Var,
    pub low: Ref,
    pub high: Ref,
}

impl Node {
    pub fn new(variable: Var, low: Ref, high: Ref) -> Self {
        Self { variable, low, high }
    }
}

impl MyHash for Node {
    fn hash(&self) -> u64 {
        pairing3(
            u32::from(self.variable) as u64,
            self.low.index() as u64,
            self.high.index() as u64,
        )
    }
}

// The unique table keys nodes by the `MyHash` value.
impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(MyHash::hash(self));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_equality() {
        let a = Node::new(Var::new(0), Ref::ZERO, Ref::ONE);
        let b = Node::new(Var::new(0), Ref::ZERO, Ref::ONE);
        let c = Node::new(Var::new(1), Ref::ZERO, Ref::ONE);
        assert_eq!(a, b);
        assert_eq!(MyHash::hash(&a), MyHash::hash(&b));
        assert_ne!(a, c);
    }
}
