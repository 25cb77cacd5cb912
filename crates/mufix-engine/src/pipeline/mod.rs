//! Instantiate-then-solve pipeline over the reference data collaborators.

pub(crate) mod deadline;

use indexmap::{IndexMap, IndexSet};
use miette::Diagnostic;
use mufix_data::{DataSpecification, EvaluatingRewriter, SortEnumerator};
use mufix_ir::Pbes;
use mufix_rewrite::{make_rewriter, QuantifierOptions, RewriterChoice, SimplifyingRewriter};
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

use crate::gauss::{Answer, GaussSolver};
use crate::instantiate::{
    instantiate_until, InstantiateOptions, InstantiationError, SearchStrategy, Strategy,
};
use deadline::Deadline;
use crate::result::{millis, SolveReport};

#[derive(Debug, Error, Diagnostic)]
pub enum PipelineError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Instantiation(#[from] InstantiationError),
    #[error("{parameterized} of {equations} instantiated equation(s) still have parameters")]
    #[diagnostic(
        code(mufix::pipeline::not_ground),
        help("use the lazy strategy, or select only parameters of finite sorts for expansion")
    )]
    NotGround {
        equations: usize,
        parameterized: usize,
    },
}

/// Options for the solving pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub strategy: Strategy,
    pub rewriter: RewriterChoice,
    pub search: SearchStrategy,
    pub quantifiers: QuantifierOptions,
    pub max_equations: Option<usize>,
    /// Budget in seconds for instantiation, quantifier elimination included.
    /// 0 disables it.
    pub timeout_secs: u64,
    pub finite_parameters: Option<IndexMap<String, IndexSet<String>>>,
    pub short_names: bool,
    /// When set and Gauss elimination leaves the answer unknown, retry with
    /// the approximate solver using at most this many rounds per equation.
    pub approximate_rounds: Option<usize>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::Lazy,
            rewriter: RewriterChoice::EnumerateQuantifiers,
            search: SearchStrategy::BreadthFirst,
            quantifiers: QuantifierOptions::default(),
            max_equations: None,
            timeout_secs: 300,
            finite_parameters: None,
            short_names: false,
            approximate_rounds: None,
        }
    }
}

/// Instantiates `system` to a boolean equation system and solves it.
pub fn solve_pbes(
    system: &Pbes,
    data_spec: &DataSpecification,
    options: &PipelineOptions,
) -> Result<SolveReport, PipelineError> {
    let deadline = Deadline::after_secs(options.timeout_secs);
    let mut quantifiers = options.quantifiers.clone();
    quantifiers.deadline = match (quantifiers.deadline, deadline.instant()) {
        (Some(given), Some(own)) => Some(given.min(own)),
        (given, own) => given.or(own),
    };
    let enumerator = SortEnumerator::new(data_spec.clone());
    let rewriter = make_rewriter(options.rewriter, EvaluatingRewriter, &enumerator, quantifiers);

    info!(
        strategy = ?options.strategy,
        rewriter = ?options.rewriter,
        equations = system.len(),
        "Instantiating equation system..."
    );
    let started = Instant::now();
    let instantiate_options = InstantiateOptions {
        search: options.search,
        max_equations: options.max_equations,
        timeout_secs: options.timeout_secs,
        finite_parameters: options.finite_parameters.clone(),
        short_names: options.short_names,
    };
    let bes = instantiate_until(
        system,
        options.strategy,
        data_spec,
        &*rewriter,
        &instantiate_options,
        deadline,
    )?;
    let instantiate_ms = millis(started.elapsed());
    info!(equations = bes.len(), elapsed_ms = instantiate_ms, "Instantiation finished");

    if !bes.is_bes() {
        let parameterized = bes.equations().iter().filter(|eq| !eq.is_ground()).count();
        return Err(PipelineError::NotGround {
            equations: bes.len(),
            parameterized,
        });
    }

    if !bes.is_empty() && !starts_with_initial(&bes) {
        warn!(
            front = %bes.equations()[0].name(),
            initial = %bes.initial().name,
            "The answer is the value of the first equation, not of the initial variable"
        );
    }

    let started = Instant::now();
    let solver = GaussSolver::new(SimplifyingRewriter::new(EvaluatingRewriter));
    let mut answer = solver.solve(&bes);
    let mut approximated = false;
    if let (Answer::Unknown, Some(rounds)) = (answer, options.approximate_rounds) {
        answer = solver.solve_approximate(&bes, rounds, |a, b| a == b).answer;
        approximated = true;
    }
    let solve_ms = millis(started.elapsed());
    info!(%answer, approximated, elapsed_ms = solve_ms, "Solved");

    Ok(SolveReport {
        answer,
        strategy: options.strategy,
        rewriter: options.rewriter,
        input_equations: system.len(),
        bes_equations: bes.len(),
        instantiate_ms,
        solve_ms,
        approximated,
    })
}

/// Whether the first equation of `bes` defines its initial variable.
fn starts_with_initial(bes: &Pbes) -> bool {
    bes.equations()
        .first()
        .is_some_and(|eq| eq.name() == bes.initial().name)
}
