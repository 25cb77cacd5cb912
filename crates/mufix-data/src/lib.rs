#![doc = include_str!("../README.md")]

//! Data terms and the data-level collaborators of the equation-system solver.
//!
//! Everything downstream (`mufix-ir`, `mufix-rewrite`, `mufix-engine`) only
//! talks to data through the [`DataRewriter`] and [`DataEnumerator`] traits.

pub mod enumerator;
pub mod expr;
pub mod rewriter;
pub mod sort;
pub mod specification;
pub mod substitution;

pub use enumerator::{DataEnumerator, SortEnumerator};
pub use expr::{BinaryOp, DataExpr, DataVariable, UnaryOp};
pub use rewriter::{DataRewriter, EvaluatingRewriter};
pub use sort::Sort;
pub use specification::{Constructor, DataSpecification, SpecificationError};
pub use substitution::Substitution;
