use mufix_rewrite::RewriterChoice;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::gauss::Answer;
use crate::instantiate::Strategy;

/// Outcome of [`solve_pbes`](crate::pipeline::solve_pbes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolveReport {
    pub answer: Answer,
    pub strategy: Strategy,
    pub rewriter: RewriterChoice,
    /// Equations of the parameterized input system.
    pub input_equations: usize,
    /// Equations of the instantiated boolean equation system.
    pub bes_equations: usize,
    pub instantiate_ms: u64,
    pub solve_ms: u64,
    /// Whether the answer comes from the approximate solver.
    pub approximated: bool,
}

impl SolveReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl fmt::Display for SolveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Answer: {}", self.answer)?;
        writeln!(
            f,
            "Instantiation: {:?} with {:?}, {} -> {} equation(s) in {} ms",
            self.strategy,
            self.rewriter,
            self.input_equations,
            self.bes_equations,
            self.instantiate_ms
        )?;
        write!(f, "Solving: {} ms", self.solve_ms)?;
        if self.approximated {
            write!(f, " (approximated)")?;
        }
        Ok(())
    }
}
