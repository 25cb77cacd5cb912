//! Gauss elimination for boolean equation systems.
//!
//! Equations are eliminated from last to first. Eliminating `sigma X = phi`
//! replaces `X` in `phi` by the default value of `sigma` (`false` for `mu`,
//! `true` for `nu`), simplifies the result, and substitutes it for `X` in
//! every earlier equation. The answer is the value of the first equation.

use mufix_data::EvaluatingRewriter;
use mufix_ir::{Equation, Pbes, PbesExpr};
use mufix_rewrite::{PbesRewriter, SimplifyingRewriter};
use serde::Serialize;
use std::fmt;
use tracing::{debug, trace};

/// Solution of a boolean equation system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    True,
    False,
    /// The first equation did not simplify to a constant.
    Unknown,
}

impl Answer {
    pub fn from_expr(expr: &PbesExpr) -> Self {
        match expr.as_bool() {
            Some(true) => Answer::True,
            Some(false) => Answer::False,
            None => Answer::Unknown,
        }
    }

    pub fn is_known(self) -> bool {
        self != Answer::Unknown
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::True => write!(f, "true"),
            Answer::False => write!(f, "false"),
            Answer::Unknown => write!(f, "unknown"),
        }
    }
}

/// Result of [`GaussSolver::solve_approximate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApproximateSolution {
    pub answer: Answer,
    /// Iterations spent on each equation, indexed like the input.
    pub rounds: Vec<usize>,
}

/// Gauss-elimination solver parameterized by the rewriter used to simplify
/// each eliminated row.
#[derive(Debug, Clone)]
pub struct GaussSolver<P> {
    rewriter: P,
}

impl Default for GaussSolver<SimplifyingRewriter<EvaluatingRewriter>> {
    fn default() -> Self {
        Self::new(SimplifyingRewriter::new(EvaluatingRewriter))
    }
}

impl<P: PbesRewriter> GaussSolver<P> {
    pub fn new(rewriter: P) -> Self {
        Self { rewriter }
    }

    /// Solves a boolean equation system. The initial instantiation is not
    /// consulted; the answer is the value of the first equation, and
    /// [`Answer::Unknown`] for an empty system.
    pub fn solve(&self, pbes: &Pbes) -> Answer {
        let solved = self.solve_equations(pbes.equations().to_vec());
        let answer = solved
            .first()
            .map_or(Answer::Unknown, |eq| Answer::from_expr(&eq.rhs));
        debug!(%answer, equations = solved.len(), "Gauss elimination finished");
        answer
    }

    /// Runs the elimination in place and returns the rewritten equations.
    /// After elimination the right-hand side of equation `i` only refers to
    /// variables of equations before `i`.
    pub fn solve_equations(&self, mut equations: Vec<Equation>) -> Vec<Equation> {
        for i in (0..equations.len()).rev() {
            let (earlier, rest) = equations.split_at_mut(i);
            let row = &mut rest[0];
            let default = PbesExpr::from_bool(row.symbol.default_value());
            row.rhs = self
                .rewriter
                .normalize(&row.rhs.replace_ground(row.name(), &default));
            trace!(
                row = i,
                equation = %row.name(),
                size = row.rhs.size(),
                "Eliminated equation"
            );
            for eq in earlier {
                eq.rhs = eq.rhs.replace_ground(row.name(), &row.rhs);
            }
        }
        equations
    }

    /// Elimination that iterates each row up to `rounds` times, starting
    /// from the default value, until `stable(previous, next)` holds.
    pub fn solve_approximate<F>(
        &self,
        pbes: &Pbes,
        rounds: usize,
        mut stable: F,
    ) -> ApproximateSolution
    where
        F: FnMut(&PbesExpr, &PbesExpr) -> bool,
    {
        let mut equations = pbes.equations().to_vec();
        let mut used = vec![0; equations.len()];
        for i in (0..equations.len()).rev() {
            let (earlier, rest) = equations.split_at_mut(i);
            let row = &mut rest[0];
            let mut approx = PbesExpr::from_bool(row.symbol.default_value());
            for round in 1..=rounds {
                let next = self
                    .rewriter
                    .normalize(&row.rhs.replace_ground(row.name(), &approx));
                let done = stable(&approx, &next);
                approx = next;
                used[i] = round;
                if done {
                    break;
                }
            }
            trace!(row = i, equation = %row.name(), rounds = used[i], "Approximated equation");
            row.rhs = approx;
            for eq in earlier {
                eq.rhs = eq.rhs.replace_ground(row.name(), &row.rhs);
            }
        }
        let answer = equations
            .first()
            .map_or(Answer::Unknown, |eq| Answer::from_expr(&eq.rhs));
        debug!(%answer, equations = equations.len(), "Approximate Gauss elimination finished");
        ApproximateSolution {
            answer,
            rounds: used,
        }
    }
}

/// Solves `pbes` with the default simplifying rewriter.
pub fn solve(pbes: &Pbes) -> Answer {
    GaussSolver::new(SimplifyingRewriter::new(EvaluatingRewriter)).solve(pbes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mufix_ir::{FixpointSymbol, PropVarDecl, PropVarInst};

    type Solver = GaussSolver<SimplifyingRewriter<EvaluatingRewriter>>;

    fn mu(name: &str, rhs: PbesExpr) -> Equation {
        Equation::new(FixpointSymbol::Mu, PropVarDecl::ground(name), rhs)
    }

    fn nu(name: &str, rhs: PbesExpr) -> Equation {
        Equation::new(FixpointSymbol::Nu, PropVarDecl::ground(name), rhs)
    }

    fn var(name: &str) -> PbesExpr {
        PbesExpr::var(name)
    }

    fn bes(equations: Vec<Equation>) -> Pbes {
        let initial = PropVarInst::ground(equations[0].name());
        Pbes::new(equations, initial).unwrap()
    }

    #[test]
    fn constant_equations() {
        assert_eq!(solve(&bes(vec![mu("X", PbesExpr::False)])), Answer::False);
        assert_eq!(solve(&bes(vec![nu("X", PbesExpr::True)])), Answer::True);
    }

    #[test]
    fn self_references_take_the_default_value() {
        assert_eq!(solve(&bes(vec![mu("X", var("X"))])), Answer::False);
        assert_eq!(solve(&bes(vec![nu("X", var("X"))])), Answer::True);
    }

    #[test]
    fn equation_order_decides_alternation() {
        assert_eq!(
            solve(&bes(vec![mu("X", var("Y")), nu("Y", var("X"))])),
            Answer::False
        );
        assert_eq!(
            solve(&bes(vec![nu("Y", var("X")), mu("X", var("Y"))])),
            Answer::True
        );
    }

    #[test]
    fn three_equation_system() {
        let system = bes(vec![
            nu("X1", var("X2").and(var("X1"))),
            mu("X2", var("X1").or(var("X3"))),
            nu("X3", var("X3")),
        ]);
        assert_eq!(solve(&system), Answer::True);
    }

    #[test]
    fn solved_rows_only_refer_to_earlier_equations() {
        let system = bes(vec![
            mu("X", var("Y").or(var("X"))),
            nu("Y", var("X").and(var("Y"))),
        ]);
        let solved = Solver::default().solve_equations(system.equations().to_vec());
        assert_eq!(solved[1].rhs, var("X"));
        assert_eq!(solved[0].rhs, PbesExpr::False);
    }

    #[test]
    fn front_equation_decides_the_answer() {
        // The initial instantiation points at Y, which is true, but the
        // answer is the value of X.
        let system = Pbes::new(
            vec![mu("X", var("X")), nu("Y", var("Y"))],
            PropVarInst::ground("Y"),
        )
        .unwrap();
        assert_eq!(solve(&system), Answer::False);
    }

    #[test]
    fn empty_equation_list_stays_empty() {
        assert_eq!(Solver::default().solve_equations(Vec::new()), Vec::new());
    }

    #[test]
    fn approximation_stops_when_stable() {
        let system = bes(vec![mu("X", var("Y").or(var("X"))), nu("Y", var("Y"))]);
        let solver = Solver::default();
        let solution = solver.solve_approximate(&system, 5, |a, b| a == b);
        assert_eq!(solution.answer, Answer::True);
        assert_eq!(solution.rounds, vec![2, 1]);

        let single = solver.solve_approximate(&system, 1, |_, _| false);
        assert_eq!(single.answer, Answer::True);
        assert_eq!(single.rounds, vec![1, 1]);
    }

    #[test]
    fn answers_serialize_in_lowercase() {
        assert_eq!(serde_json::to_string(&Answer::Unknown).unwrap(), "\"unknown\"");
        assert_eq!(Answer::True.to_string(), "true");
        assert!(!Answer::Unknown.is_known());
    }
}
