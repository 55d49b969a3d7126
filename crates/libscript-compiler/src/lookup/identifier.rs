//! Names as written in source.

use std::fmt;

use libscript_core::{OperatorKind, TemplateArgument};

/// A possibly qualified name.
#[derive(Debug, Clone, PartialEq)]
pub enum Identifier {
    Simple(String),
    /// `operator+` and friends.
    Operator(OperatorKind),
    /// `lhs::rhs`. `lhs` must name a namespace, type or template.
    Scoped { lhs: Box<Identifier>, rhs: Box<Identifier> },
    /// `name<args...>`
    Template {
        name: String,
        arguments: Vec<TemplateArgument>,
    },
}

impl Identifier {
    pub fn simple(name: impl Into<String>) -> Self {
        Identifier::Simple(name.into())
    }

    pub fn operator(op: OperatorKind) -> Self {
        Identifier::Operator(op)
    }

    pub fn scoped(lhs: Identifier, rhs: Identifier) -> Self {
        Identifier::Scoped {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn template(name: impl Into<String>, arguments: Vec<TemplateArgument>) -> Self {
        Identifier::Template {
            name: name.into(),
            arguments,
        }
    }

    /// Parse `a::b::c` into left-nested scoped identifiers. A leading `::`
    /// is ignored. Returns `None` for an empty path or an empty segment.
    pub fn parse_path(path: &str) -> Option<Self> {
        let path = path.strip_prefix("::").unwrap_or(path);
        let mut segments = path.split("::");
        let first = segments.next().filter(|s| !s.is_empty())?;
        segments.try_fold(Identifier::simple(first), |lhs, segment| {
            (!segment.is_empty()).then(|| Identifier::scoped(lhs, Identifier::simple(segment)))
        })
    }

    /// The final unqualified name, if it has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Identifier::Simple(name) | Identifier::Template { name, .. } => Some(name),
            Identifier::Operator(_) => None,
            Identifier::Scoped { rhs, .. } => rhs.name(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Simple(name) => f.write_str(name),
            Identifier::Operator(op) => write!(f, "{op}"),
            Identifier::Scoped { lhs, rhs } => write!(f, "{lhs}::{rhs}"),
            Identifier::Template { name, arguments } => {
                let rendered: Vec<String> = arguments.iter().map(ToString::to_string).collect();
                write!(f, "{name}<{}>", rendered.join(", "))
            }
        }
    }
}
