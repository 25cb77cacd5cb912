#![doc = include_str!("../README.md")]

//! Predicate formula rewriting.
//!
//! [`SimplifyingRewriter`] applies the boolean laws and normalizes data
//! terms; [`EnumerateQuantifiersRewriter`] additionally removes quantifiers
//! by enumerating the bound variables' domains.

pub mod quantifiers;
pub mod rewriter;
pub mod simplify;

pub use quantifiers::{EnumerateQuantifiersRewriter, QuantifierOptions};
pub use rewriter::{make_rewriter, PbesRewriter, RewriteResult, RewriterChoice};
pub use simplify::{Quantifier, SimplifyingRewriter};
