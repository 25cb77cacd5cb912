//! Quantifier elimination by enumeration.
//!
//! Every bound variable starts with a single symbolic candidate: the variable
//! itself, standing for its whole not-yet-enumerated domain. Work items are
//! `(candidate, slot)` pairs processed in FIFO order. Processing a pair
//! rewrites the body for every combination of the candidates tried so far,
//! with the slot pinned to the candidate. A branch that still mentions a
//! bound variable came from that variable's symbolic candidate; one more
//! concrete value is pulled from the enumerator and both the value and the
//! symbolic candidate are queued again. A branch equal to the absorbing value
//! decides the quantifier at once.

use indexmap::IndexSet;
use std::collections::VecDeque;
use std::time::Instant;

use mufix_data::specification::cartesian_product;
use mufix_data::{DataEnumerator, DataExpr, DataRewriter, DataVariable, Substitution};
use mufix_ir::PbesExpr;

use crate::rewriter::{PbesRewriter, RewriteResult};
use crate::simplify::{mk_quantifier, Quantifier, Simplify};

/// Tuning of quantifier elimination.
#[derive(Debug, Clone)]
pub struct QuantifierOptions {
    /// Eliminate variables of sorts with infinitely many values too. When
    /// false, such variables stay quantified around the eliminated body.
    pub enumerate_infinite_sorts: bool,
    /// Maximum number of values pulled from the enumerator for a single
    /// quantifier. When exceeded the quantifier is kept.
    pub max_candidates: Option<usize>,
    /// Elimination still running at this instant gives up and keeps the
    /// quantifier.
    pub deadline: Option<Instant>,
}

impl Default for QuantifierOptions {
    fn default() -> Self {
        Self {
            enumerate_infinite_sorts: true,
            max_candidates: None,
            deadline: None,
        }
    }
}

/// Simplifying rewriter that also eliminates quantifiers.
#[derive(Debug, Clone)]
pub struct EnumerateQuantifiersRewriter<R, E> {
    data: R,
    enumerator: E,
    options: QuantifierOptions,
}

impl<R: DataRewriter, E: DataEnumerator> EnumerateQuantifiersRewriter<R, E> {
    pub fn new(data: R, enumerator: E, options: QuantifierOptions) -> Self {
        Self {
            data,
            enumerator,
            options,
        }
    }

    pub fn options(&self) -> &QuantifierOptions {
        &self.options
    }

    /// Eliminates all of `variables` from `body`. `None` when the candidate
    /// budget or the deadline ran out.
    fn enumerate(
        &self,
        kind: Quantifier,
        variables: &[DataVariable],
        body: &PbesExpr,
        sigma: &Substitution,
    ) -> Option<PbesExpr> {
        let absorbing = kind.absorbing();
        let symbolic: Vec<DataExpr> = variables.iter().cloned().map(DataExpr::Var).collect();
        let mut sources: Vec<_> = variables.iter().map(|v| self.enumerator.enumerate(v)).collect();
        let mut tried: Vec<Vec<DataExpr>> = symbolic.iter().map(|s| vec![s.clone()]).collect();
        let mut exhausted = vec![false; variables.len()];
        let mut symbolic_queued = vec![false; variables.len()];
        let mut queue = VecDeque::new();
        queue.push_back((symbolic[0].clone(), 0));
        symbolic_queued[0] = true;

        let mut branches: IndexSet<PbesExpr> = IndexSet::new();
        let mut pulled = 0usize;

        while let Some((candidate, slot)) = queue.pop_front() {
            if self.options.deadline.is_some_and(|at| Instant::now() >= at) {
                return None;
            }
            if candidate == symbolic[slot] {
                symbolic_queued[slot] = false;
                if exhausted[slot] {
                    continue;
                }
            }
            let domains: Vec<Vec<DataExpr>> = tried
                .iter()
                .enumerate()
                .map(|(i, values)| {
                    if i == slot {
                        vec![candidate.clone()]
                    } else {
                        values.clone()
                    }
                })
                .collect();

            let mut refined = vec![false; variables.len()];
            for combination in cartesian_product(&domains) {
                let bindings = variables
                    .iter()
                    .zip(combination)
                    .filter(|(v, value)| !matches!(value, DataExpr::Var(w) if w == *v))
                    .map(|(v, value)| (v.clone(), value));
                let branch = self.simplify(body, &sigma.extended(bindings));
                if branch == absorbing {
                    return Some(absorbing);
                }
                let open: Vec<usize> = (0..variables.len())
                    .filter(|&j| branch.mentions(&variables[j]))
                    .collect();
                if open.is_empty() {
                    branches.insert(branch);
                    continue;
                }
                for j in open {
                    if refined[j] {
                        continue;
                    }
                    refined[j] = true;
                    match sources[j].next() {
                        Some(value) => {
                            pulled += 1;
                            if self.options.max_candidates.is_some_and(|max| pulled > max) {
                                return None;
                            }
                            if !tried[j].contains(&value) {
                                tried[j].push(value.clone());
                                queue.push_back((value, j));
                            }
                            if !symbolic_queued[j] {
                                symbolic_queued[j] = true;
                                queue.push_back((symbolic[j].clone(), j));
                            }
                        }
                        None => {
                            exhausted[j] = true;
                            tried[j].retain(|value| *value != symbolic[j]);
                        }
                    }
                }
            }
        }
        Some(kind.join(branches))
    }
}

impl<R: DataRewriter, E: DataEnumerator> Simplify for EnumerateQuantifiersRewriter<R, E> {
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
        let sigma = sigma.without(variables);
        let (eliminate, keep): (Vec<DataVariable>, Vec<DataVariable>) =
            variables.iter().cloned().partition(|v| {
                body.mentions(v)
                    && (self.options.enumerate_infinite_sorts || self.enumerator.is_finite(&v.sort))
            });
        if eliminate.is_empty() {
            return mk_quantifier(kind, &keep, self.simplify(body, &sigma));
        }
        match self.enumerate(kind, &eliminate, body, &sigma) {
            Some(result) => mk_quantifier(kind, &keep, result),
            None => {
                tracing::debug!(
                    quantifier = ?kind,
                    variables = eliminate.len(),
                    "elimination budget exhausted, keeping quantifier"
                );
                mk_quantifier(kind, variables, self.simplify(body, &sigma))
            }
        }
    }
}

impl<R: DataRewriter, E: DataEnumerator> PbesRewriter for EnumerateQuantifiersRewriter<R, E> {
    fn rewrite(&self, expr: &PbesExpr, sigma: &Substitution) -> RewriteResult {
        RewriteResult::new(self.simplify(expr, sigma))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mufix_data::{Constructor, DataSpecification, EvaluatingRewriter, Sort, SortEnumerator};

    fn rewriter(options: QuantifierOptions) -> EnumerateQuantifiersRewriter<EvaluatingRewriter, SortEnumerator> {
        EnumerateQuantifiersRewriter::new(EvaluatingRewriter, SortEnumerator::default(), options)
    }

    fn rw(expr: &PbesExpr) -> PbesExpr {
        rewriter(QuantifierOptions::default()).normalize(expr)
    }

    fn nat(name: &str) -> DataVariable {
        DataVariable::new(name, Sort::Nat)
    }

    fn boolean(name: &str) -> DataVariable {
        DataVariable::new(name, Sort::Bool)
    }

    fn val(e: DataExpr) -> PbesExpr {
        PbesExpr::data(e)
    }

    #[test]
    fn forall_over_naturals_stops_at_first_counterexample() {
        let m = nat("m");
        let phi = PbesExpr::forall(vec![m.clone()], val(DataExpr::Var(m).lt(DataExpr::int(3))));
        assert_eq!(rw(&phi), PbesExpr::False);
    }

    #[test]
    fn exists_over_naturals_stops_at_first_witness() {
        let m = nat("m");
        let phi = PbesExpr::exists(vec![m.clone()], val(DataExpr::Var(m).gt(DataExpr::int(3))));
        assert_eq!(rw(&phi), PbesExpr::True);
    }

    #[test]
    fn finite_domains_are_expanded_in_enumeration_order() {
        let b = boolean("b");
        let w = |arg: DataExpr| PbesExpr::propvar("W", vec![arg]);
        let phi = PbesExpr::exists(vec![b.clone()], w(DataExpr::Var(b.clone())));
        assert_eq!(
            rw(&phi),
            w(DataExpr::bool(false)).or(w(DataExpr::bool(true)))
        );

        let x1 = |arg: DataExpr| PbesExpr::propvar("X1", vec![arg]);
        let phi = PbesExpr::forall(
            vec![b.clone()],
            val(DataExpr::Var(b.clone())).or(x1(DataExpr::Var(b.clone()))),
        );
        assert_eq!(rw(&phi), x1(DataExpr::bool(false)));

        let phi = PbesExpr::exists(
            vec![b.clone()],
            val(DataExpr::ite(
                DataExpr::Var(b.clone()),
                DataExpr::bool(false),
                DataExpr::Var(b),
            )),
        );
        assert_eq!(rw(&phi), PbesExpr::False);
    }

    #[test]
    fn nested_quantifiers_with_shadowing() {
        let n = nat("n");
        let inner = PbesExpr::exists(vec![n.clone()], val(DataExpr::Var(n.clone()).lt(DataExpr::int(3))));
        let phi = PbesExpr::forall(
            vec![n.clone()],
            val(DataExpr::Var(n.clone()).lt(DataExpr::int(3))).and(inner),
        );
        assert_eq!(rw(&phi), PbesExpr::False);

        let y = PbesExpr::propvar("Y", vec![DataExpr::Var(n.clone()).add(DataExpr::int(1))]);
        let phi = y.clone().or(PbesExpr::forall(
            vec![n.clone()],
            val(DataExpr::Var(n).lt(DataExpr::int(3))),
        ));
        assert_eq!(rw(&phi), y);
    }

    #[test]
    fn several_bound_variables_are_eliminated_together() {
        let b1 = boolean("b1");
        let b2 = boolean("b2");
        let w = |a: &DataVariable, b: &DataVariable| {
            PbesExpr::propvar("Z", vec![DataExpr::Var(a.clone()), DataExpr::Var(b.clone())])
        };
        let phi = PbesExpr::forall(vec![b1.clone(), b2.clone()], w(&b1, &b2));
        let result = rw(&phi);
        let printed = result.to_string();
        for expected in [
            "Z(false, false)",
            "Z(false, true)",
            "Z(true, false)",
            "Z(true, true)",
        ] {
            assert!(printed.contains(expected), "{expected} missing from {printed}");
        }
        assert_eq!(result.propvars().len(), 4);
    }

    #[test]
    fn infinite_sorts_can_be_left_quantified() {
        let n = nat("n");
        let b = boolean("b");
        let z = |b: DataExpr| PbesExpr::propvar("Z", vec![b, DataExpr::Var(n.clone())]);
        let phi = PbesExpr::forall(vec![n.clone(), b.clone()], z(DataExpr::Var(b)));
        let finite_only = rewriter(QuantifierOptions {
            enumerate_infinite_sorts: false,
            ..QuantifierOptions::default()
        });
        assert_eq!(
            finite_only.normalize(&phi),
            PbesExpr::forall(
                vec![n.clone()],
                z(DataExpr::bool(false)).and(z(DataExpr::bool(true)))
            )
        );

        let y = PbesExpr::forall(vec![n.clone()], PbesExpr::propvar("Y", vec![DataExpr::Var(n.clone())]));
        assert_eq!(finite_only.normalize(&y), y);
    }

    #[test]
    fn candidate_budget_keeps_the_quantifier() {
        let p = DataVariable::new("p", Sort::Pos);
        let phi = PbesExpr::forall(vec![p.clone()], val(DataExpr::Var(p).gt(DataExpr::int(0))));
        let bounded = rewriter(QuantifierOptions {
            max_candidates: Some(50),
            ..QuantifierOptions::default()
        });
        assert_eq!(bounded.normalize(&phi), phi);
    }

    #[test]
    fn passed_deadline_keeps_the_quantifier() {
        let n = nat("n");
        let phi = PbesExpr::forall(vec![n.clone()], val(DataExpr::Var(n).ge(DataExpr::int(0))));
        let expired = rewriter(QuantifierOptions {
            deadline: Some(Instant::now()),
            ..QuantifierOptions::default()
        });
        assert_eq!(expired.normalize(&phi), phi);

        let b = boolean("b");
        let phi = PbesExpr::exists(vec![b.clone()], val(DataExpr::Var(b)));
        assert_eq!(expired.normalize(&phi), phi);
    }

    #[test]
    fn empty_sorts_yield_the_join_identity() {
        let mut spec = DataSpecification::new();
        spec.add_sort(
            "Stream",
            vec![Constructor::new("next", vec![Sort::named("Stream")])],
        )
        .unwrap();
        let eliminate = EnumerateQuantifiersRewriter::new(
            EvaluatingRewriter,
            SortEnumerator::new(spec),
            QuantifierOptions::default(),
        );
        let s = DataVariable::new("s", Sort::named("Stream"));
        let y = PbesExpr::propvar("Y", vec![DataExpr::Var(s.clone())]);
        assert_eq!(
            eliminate.normalize(&PbesExpr::forall(vec![s.clone()], y.clone())),
            PbesExpr::True
        );
        assert_eq!(
            eliminate.normalize(&PbesExpr::exists(vec![s.clone()], y.clone())),
            PbesExpr::False
        );

        // An empty sort empties the whole product.
        let b = boolean("b");
        let z = PbesExpr::propvar("Z", vec![DataExpr::Var(s.clone()), DataExpr::Var(b.clone())]);
        assert_eq!(
            eliminate.normalize(&PbesExpr::exists(vec![s, b], z)),
            PbesExpr::False
        );
    }

    #[test]
    fn substitution_reaches_free_variables_inside_quantifiers() {
        let n = nat("n");
        let m = nat("m");
        let phi = PbesExpr::exists(
            vec![m.clone()],
            val(DataExpr::Var(m.clone()).eq(DataExpr::Var(n.clone()))),
        );
        let sigma: Substitution = [(n, DataExpr::int(4))].into_iter().collect();
        let result = rewriter(QuantifierOptions::default()).rewrite(&phi, &sigma);
        assert_eq!(result.expr, PbesExpr::True);
        assert!(!result.non_constant);
    }
}
