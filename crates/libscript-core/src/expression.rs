//! Compiled expressions as seen by semantic analysis.
//!
//! The expression compiler hands already-compiled arguments to overload
//! resolution and initialization. Only the result type and whether the
//! expression is a brace list matter here, so this is deliberately small.

use crate::{DataType, TypeHash, primitives};

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal { data_type: DataType },
    /// Reference to a named value (local, global, member).
    Variable { data_type: DataType },
    Call { function: TypeHash, data_type: DataType },
    Lambda { closure: TypeHash },
    /// Brace-enclosed element list: `{1, 2, 3}`.
    InitializerList { elements: Vec<Expression> },
}

impl Expression {
    pub fn literal(data_type: impl Into<DataType>) -> Self {
        Expression::Literal {
            data_type: data_type.into(),
        }
    }

    pub fn variable(data_type: impl Into<DataType>) -> Self {
        Expression::Variable {
            data_type: data_type.into(),
        }
    }

    pub fn list(elements: Vec<Expression>) -> Self {
        Expression::InitializerList { elements }
    }

    /// Result type. Brace lists have the initializer-list sentinel type.
    pub fn data_type(&self) -> DataType {
        match self {
            Expression::Literal { data_type }
            | Expression::Variable { data_type }
            | Expression::Call { data_type, .. } => *data_type,
            Expression::Lambda { closure } => DataType::simple(*closure),
            Expression::InitializerList { .. } => DataType::simple(primitives::INITIALIZER_LIST),
        }
    }

    pub fn elements(&self) -> Option<&[Expression]> {
        match self {
            Expression::InitializerList { elements } => Some(elements),
            _ => None,
        }
    }

    pub fn is_initializer_list(&self) -> bool {
        matches!(self, Expression::InitializerList { .. })
    }
}
