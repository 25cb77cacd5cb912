#![doc = include_str!("../README.md")]

//! Equation-system intermediate representation.
//!
//! Predicate formulas, fixpoint equations, validated systems, and the
//! renaming of closed instantiations shared by the rewriter, the
//! instantiation engine and the Gauss solver.

pub mod equation;
pub mod expression;
#[cfg(any(test, feature = "proptest"))]
pub mod proptest_generators;
pub mod rename;
pub mod system;

pub use equation::{Equation, FixpointSymbol, PropVarDecl, PropVarInst};
pub use expression::PbesExpr;
pub use rename::{RenameError, Renamer};
pub use system::{Pbes, SystemError};
