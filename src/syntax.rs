//! Host-language syntax consumed by the analyzer.
//!
//! These shapes are the contract with the host parser: declarations carry a
//! name, start line, and optional body; expression nodes expose a kind, their
//! children, and the trimmed source text they cover. Operator precedence is
//! already resolved — `&&`, `||`, `!`, and the ternary are structural nodes,
//! everything else is opaque below its node.

/// A parsed source file: the flat list of analyzable declarations, in source
/// order. Nested declarations (methods of a type) are flattened here.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub functions: Vec<Function>,
}

/// A function or initializer declaration. Initializers are named `init`.
/// A declaration without a body (protocol requirement) is carried but never
/// produces analysis entries.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    /// 1-based line of the declaration keyword.
    pub line: usize,
    pub body: Option<Block>,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    If {
        condition: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },
    While {
        condition: Expr,
        body: Block,
    },
    Guard {
        condition: Expr,
        else_block: Block,
    },
    Return(Option<Expr>),
    /// A `let` or `var` binding; the initializer may contain decisions.
    Binding {
        name: String,
        value: Option<Expr>,
    },
    Expr(Expr),
}

/// An operator-folded host expression.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    /// Trimmed source text this node covers. Leaf identity for the
    /// extractor: atoms with equal text are the same condition.
    pub text: String,
}

impl Expr {
    pub fn new(kind: ExprKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into() }
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    /// A parenthesized group around a single expression.
    Paren(Box<Expr>),
    Infix {
        op: String,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Prefix {
        op: String,
        operand: Box<Expr>,
    },
    /// A postfix operator such as the force-unwrap `!`. Not a boolean
    /// connective: `x!` is an atomic condition, never a negation.
    Postfix {
        op: String,
        operand: Box<Expr>,
    },
    Ternary {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Member {
        base: Box<Expr>,
        name: String,
    },
    /// An identifier or literal; opaque to the analyzer.
    Atom(String),
}
