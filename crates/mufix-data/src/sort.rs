use serde::Serialize;
use std::fmt;

/// Data sorts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Sort {
    Bool,
    /// Positive numbers `1, 2, ...`.
    Pos,
    /// Natural numbers `0, 1, ...`.
    Nat,
    Int,
    /// A constructor sort declared in a [`DataSpecification`](crate::DataSpecification).
    Named(String),
}

impl Sort {
    pub fn named(name: impl Into<String>) -> Self {
        Sort::Named(name.into())
    }

    /// Whether values of this sort are represented by number literals.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Sort::Pos | Sort::Nat | Sort::Int)
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Bool => write!(f, "Bool"),
            Sort::Pos => write!(f, "Pos"),
            Sort::Nat => write!(f, "Nat"),
            Sort::Int => write!(f, "Int"),
            Sort::Named(name) => write!(f, "{name}"),
        }
    }
}
