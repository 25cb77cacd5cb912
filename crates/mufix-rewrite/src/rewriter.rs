use mufix_data::{DataEnumerator, DataRewriter, Substitution};
use mufix_ir::PbesExpr;
use serde::Serialize;

use crate::quantifiers::{EnumerateQuantifiersRewriter, QuantifierOptions};
use crate::simplify::SimplifyingRewriter;

/// Result of rewriting a formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteResult {
    pub expr: PbesExpr,
    /// False when the result is the constant `true` or `false`.
    pub non_constant: bool,
}

impl RewriteResult {
    pub fn new(expr: PbesExpr) -> Self {
        let non_constant = expr.as_bool().is_none();
        Self { expr, non_constant }
    }
}

/// Rewrites predicate formulas to equivalent, simpler ones.
pub trait PbesRewriter {
    /// Applies `sigma` to the free data variables of `expr` and rewrites.
    fn rewrite(&self, expr: &PbesExpr, sigma: &Substitution) -> RewriteResult;

    fn normalize(&self, expr: &PbesExpr) -> PbesExpr {
        self.rewrite(expr, &Substitution::new()).expr
    }
}

impl<P: PbesRewriter + ?Sized> PbesRewriter for &P {
    fn rewrite(&self, expr: &PbesExpr, sigma: &Substitution) -> RewriteResult {
        (**self).rewrite(expr, sigma)
    }
}

impl<P: PbesRewriter + ?Sized> PbesRewriter for Box<P> {
    fn rewrite(&self, expr: &PbesExpr, sigma: &Substitution) -> RewriteResult {
        (**self).rewrite(expr, sigma)
    }
}

/// Rewriter back-end selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RewriterChoice {
    /// Boolean laws and data normalization; quantifiers are kept.
    Simplify,
    /// `Simplify` plus quantifier elimination by enumeration.
    #[default]
    EnumerateQuantifiers,
}

/// Builds the rewriter selected by `choice`. `options` only affects
/// [`RewriterChoice::EnumerateQuantifiers`].
pub fn make_rewriter<'a, R, E>(
    choice: RewriterChoice,
    data: R,
    enumerator: E,
    options: QuantifierOptions,
) -> Box<dyn PbesRewriter + 'a>
where
    R: DataRewriter + 'a,
    E: DataEnumerator + 'a,
{
    match choice {
        RewriterChoice::Simplify => Box::new(SimplifyingRewriter::new(data)),
        RewriterChoice::EnumerateQuantifiers => {
            Box::new(EnumerateQuantifiersRewriter::new(data, enumerator, options))
        }
    }
}
