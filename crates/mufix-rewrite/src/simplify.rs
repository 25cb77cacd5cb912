//! Boolean simplification laws and the simplifying rewriter.
//!
//! The `mk_*` constructors build a node and apply the local laws in one step,
//! so callers that assemble formulas bottom-up get simplified results for
//! free.

use mufix_data::{DataExpr, DataRewriter, DataVariable, Substitution};
use mufix_ir::{PbesExpr, PropVarInst};

use crate::rewriter::{PbesRewriter, RewriteResult};

/// `!p`, with `!true = false`, `!false = true` and `!!p = p`.
pub fn mk_not(p: PbesExpr) -> PbesExpr {
    match p {
        PbesExpr::True => PbesExpr::False,
        PbesExpr::False => PbesExpr::True,
        PbesExpr::Not(inner) => *inner,
        p => p.not(),
    }
}

pub fn mk_and(p: PbesExpr, q: PbesExpr) -> PbesExpr {
    match (p, q) {
        (PbesExpr::False, _) | (_, PbesExpr::False) => PbesExpr::False,
        (PbesExpr::True, q) => q,
        (p, PbesExpr::True) => p,
        (p, q) if p == q => p,
        (p, q) => p.and(q),
    }
}

pub fn mk_or(p: PbesExpr, q: PbesExpr) -> PbesExpr {
    match (p, q) {
        (PbesExpr::True, _) | (_, PbesExpr::True) => PbesExpr::True,
        (PbesExpr::False, q) => q,
        (p, PbesExpr::False) => p,
        (p, q) if p == q => p,
        (p, q) => p.or(q),
    }
}

pub fn mk_implies(p: PbesExpr, q: PbesExpr) -> PbesExpr {
    match (p, q) {
        (PbesExpr::False, _) | (_, PbesExpr::True) => PbesExpr::True,
        (PbesExpr::True, q) => q,
        (p, PbesExpr::False) => mk_not(p),
        (p, q) if p == q => PbesExpr::True,
        (p, q) => p.implies(q),
    }
}

/// Kind of a quantifier node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Forall,
    Exists,
}

impl Quantifier {
    /// The value that decides the whole quantifier as soon as one branch has it.
    pub fn absorbing(self) -> PbesExpr {
        match self {
            Quantifier::Forall => PbesExpr::False,
            Quantifier::Exists => PbesExpr::True,
        }
    }

    /// Join of branch results: conjunction for `forall`, disjunction for `exists`.
    pub fn join<I: IntoIterator<Item = PbesExpr>>(self, branches: I) -> PbesExpr {
        let identity = mk_not(self.absorbing());
        branches.into_iter().fold(identity, |acc, b| match self {
            Quantifier::Forall => mk_and(acc, b),
            Quantifier::Exists => mk_or(acc, b),
        })
    }
}

/// Quantifier node over the variables of `variables` that occur in `body`.
/// Quantifiers over constants collapse.
pub fn mk_quantifier(kind: Quantifier, variables: &[DataVariable], body: PbesExpr) -> PbesExpr {
    if body.as_bool().is_some() {
        return body;
    }
    let used: Vec<DataVariable> = variables
        .iter()
        .filter(|v| body.mentions(v))
        .cloned()
        .collect();
    match kind {
        Quantifier::Forall => PbesExpr::forall(used, body),
        Quantifier::Exists => PbesExpr::exists(used, body),
    }
}

/// Structural simplification shared by all rewriters. Implementors decide
/// what happens at quantifier nodes.
pub(crate) trait Simplify {
    type Data: DataRewriter;

    fn data(&self) -> &Self::Data;

    fn quantifier(
        &self,
        kind: Quantifier,
        variables: &[DataVariable],
        body: &PbesExpr,
        sigma: &Substitution,
    ) -> PbesExpr;

    fn simplify(&self, expr: &PbesExpr, sigma: &Substitution) -> PbesExpr {
        match expr {
            PbesExpr::True | PbesExpr::False => expr.clone(),
            PbesExpr::Data(e) => match self.data().rewrite(e, sigma) {
                DataExpr::Bool(b) => PbesExpr::from_bool(b),
                e => PbesExpr::Data(e),
            },
            PbesExpr::PropVar(x) => PbesExpr::PropVar(PropVarInst::new(
                x.name.clone(),
                x.arguments
                    .iter()
                    .map(|a| self.data().rewrite(a, sigma))
                    .collect(),
            )),
            PbesExpr::Not(p) => mk_not(self.simplify(p, sigma)),
            PbesExpr::And(p, q) => match self.simplify(p, sigma) {
                PbesExpr::False => PbesExpr::False,
                p => mk_and(p, self.simplify(q, sigma)),
            },
            PbesExpr::Or(p, q) => match self.simplify(p, sigma) {
                PbesExpr::True => PbesExpr::True,
                p => mk_or(p, self.simplify(q, sigma)),
            },
            PbesExpr::Implies(p, q) => match self.simplify(p, sigma) {
                PbesExpr::False => PbesExpr::True,
                p => mk_implies(p, self.simplify(q, sigma)),
            },
            PbesExpr::Forall(vars, body) => self.quantifier(Quantifier::Forall, vars, body, sigma),
            PbesExpr::Exists(vars, body) => self.quantifier(Quantifier::Exists, vars, body, sigma),
        }
    }
}

/// Rewriter applying the simplification laws and data normalization.
/// Quantifiers are kept, minus the variables their body does not use.
#[derive(Debug, Clone, Default)]
pub struct SimplifyingRewriter<R> {
    data: R,
}

impl<R: DataRewriter> SimplifyingRewriter<R> {
    pub fn new(data: R) -> Self {
        Self { data }
    }
}

impl<R: DataRewriter> Simplify for SimplifyingRewriter<R> {
    type Data = R;

    fn data(&self) -> &R {
        &self.data
    }

    fn quantifier(
        &self,
        kind: Quantifier,
        variables: &[DataVariable],
        body: &PbesExpr,
        sigma: &Substitution,
    ) -> PbesExpr {
        let body = self.simplify(body, &sigma.without(variables));
        mk_quantifier(kind, variables, body)
    }
}

impl<R: DataRewriter> PbesRewriter for SimplifyingRewriter<R> {
    fn rewrite(&self, expr: &PbesExpr, sigma: &Substitution) -> RewriteResult {
        RewriteResult::new(self.simplify(expr, sigma))
    }
}
