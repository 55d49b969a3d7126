//! Overloadable operators.

use std::fmt;

/// An overloadable operator.
///
/// Operators are ordinary functions with [`FunctionKind::Operator`]; a member
/// operator receives its left operand as the implicit object.
///
/// [`FunctionKind::Operator`]: crate::FunctionKind::Operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperatorKind {
    // === Assignment ===
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,

    // === Arithmetic ===
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    /// Unary minus.
    Negate,
    PreIncrement,
    PreDecrement,

    // === Comparison ===
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // === Logical ===
    LogicalAnd,
    LogicalOr,
    LogicalNot,

    // === Other ===
    Subscript,
    Call,
}

impl OperatorKind {
    /// Number of operands, counting the implicit object for members.
    /// `None` for the call operator, which takes any number.
    pub fn arity(self) -> Option<usize> {
        use OperatorKind::*;
        match self {
            Negate | PreIncrement | PreDecrement | LogicalNot => Some(1),
            Call => None,
            _ => Some(2),
        }
    }

    /// Whether this operator may only be declared as a member.
    pub fn is_member_only(self) -> bool {
        use OperatorKind::*;
        matches!(
            self,
            Assign | AddAssign | SubAssign | MulAssign | DivAssign | Subscript | Call
        )
    }

    pub fn symbol(self) -> &'static str {
        use OperatorKind::*;
        match self {
            Assign => "=",
            AddAssign => "+=",
            SubAssign => "-=",
            MulAssign => "*=",
            DivAssign => "/=",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Rem => "%",
            Negate => "-",
            PreIncrement => "++",
            PreDecrement => "--",
            Equal => "==",
            NotEqual => "!=",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            LogicalAnd => "&&",
            LogicalOr => "||",
            LogicalNot => "!",
            Subscript => "[]",
            Call => "()",
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operator{}", self.symbol())
    }
}
