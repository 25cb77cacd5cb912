//! Instantiation of parameterized equation systems.
//!
//! Both strategies replace variable instantiations by fresh names built with
//! [`mufix_ir::rename`], so `X(1, true)` becomes the variable `X@1@true`.

mod finite;
mod lazy;

use indexmap::{IndexMap, IndexSet};
use miette::Diagnostic;
use mufix_data::{DataEnumerator, DataSpecification, Substitution};
use mufix_ir::rename::shorten_names;
use mufix_ir::{Pbes, PbesExpr, PropVarInst, RenameError, SystemError};
use mufix_rewrite::PbesRewriter;
use serde::Serialize;
use thiserror::Error;

use crate::pipeline::deadline::Deadline;

pub use finite::parse_parameter_selection;

#[derive(Debug, Error, Diagnostic)]
pub enum InstantiationError {
    #[error("Unknown variable '{0}'")]
    #[diagnostic(
        code(mufix::instantiate::unknown_variable),
        help("every instantiated variable needs a declaring equation")
    )]
    UnknownVariable(String),
    #[error(transparent)]
    #[diagnostic(transparent)]
    NonClosedInstantiation(#[from] RenameError),
    #[error("Variable '{name}' takes {expected} argument(s) but is applied to {found}")]
    #[diagnostic(code(mufix::instantiate::arity_mismatch))]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Parameter '{parameter}' of '{variable}' has sort {sort}, which is not finite")]
    #[diagnostic(
        code(mufix::instantiate::infinite_parameter),
        help("only parameters of finite sorts can be expanded by the finite strategy")
    )]
    InfiniteParameter {
        variable: String,
        parameter: String,
        sort: String,
    },
    #[error("Variable '{variable}' has no parameter '{parameter}'")]
    #[diagnostic(code(mufix::instantiate::unknown_parameter))]
    UnknownParameter { variable: String, parameter: String },
    #[error("Invalid parameter selection '{0}'")]
    #[diagnostic(
        code(mufix::instantiate::invalid_selection),
        help("expected entries like 'X(*:D)' or 'X(b:Bool, d:D)' separated by whitespace")
    )]
    InvalidSelection(String),
    #[error("Instantiation exceeded the limit of {0} equation(s)")]
    #[diagnostic(
        code(mufix::instantiate::limit_exceeded),
        help("the set of reachable instantiations may be infinite")
    )]
    LimitExceeded(usize),
    #[error("Instantiation timed out after {0}s")]
    #[diagnostic(code(mufix::instantiate::timeout))]
    Timeout(u64),
    #[error(transparent)]
    #[diagnostic(transparent)]
    InvalidSystem(#[from] SystemError),
}

/// Instantiation algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Strategy {
    /// Emit one equation per instantiation reachable from the initial one.
    #[default]
    Lazy,
    /// Expand every finite-sort parameter over all of its values.
    Finite,
}

/// Order in which the lazy strategy visits pending instantiations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SearchStrategy {
    #[default]
    BreadthFirst,
    DepthFirst,
}

/// Bounds and knobs for [`instantiate_with_options`]. All bounds are off by
/// default.
#[derive(Debug, Clone, Default)]
pub struct InstantiateOptions {
    pub search: SearchStrategy,
    /// Abort with [`InstantiationError::LimitExceeded`] instead of emitting
    /// more equations than this.
    pub max_equations: Option<usize>,
    /// 0 disables the timeout.
    pub timeout_secs: u64,
    /// Finite strategy only: variable name to the parameters to expand.
    /// Variables missing from the map keep all of their parameters. When the
    /// map is absent, every finite-sort parameter is expanded.
    pub finite_parameters: Option<IndexMap<String, IndexSet<String>>>,
    /// Rename the result to `X0, X1, ...` in equation order.
    pub short_names: bool,
}

/// Instantiates `system` with default options.
pub fn instantiate<P, E>(
    system: &Pbes,
    strategy: Strategy,
    data_spec: &DataSpecification,
    rewriter: &P,
    enumerator: &E,
) -> Result<Pbes, InstantiationError>
where
    P: PbesRewriter + ?Sized,
    E: DataEnumerator + ?Sized,
{
    instantiate_with_options(
        system,
        strategy,
        data_spec,
        rewriter,
        enumerator,
        &InstantiateOptions::default(),
    )
}

/// Instantiates `system`. No partial system is returned on failure.
///
/// Finite domains are read from `data_spec`. The enumerator is the one
/// `rewriter` eliminates quantifiers with and is not consulted here.
pub fn instantiate_with_options<P, E>(
    system: &Pbes,
    strategy: Strategy,
    data_spec: &DataSpecification,
    rewriter: &P,
    _enumerator: &E,
    options: &InstantiateOptions,
) -> Result<Pbes, InstantiationError>
where
    P: PbesRewriter + ?Sized,
    E: DataEnumerator + ?Sized,
{
    let deadline = Deadline::after_secs(options.timeout_secs);
    instantiate_until(system, strategy, data_spec, rewriter, options, deadline)
}

/// [`instantiate_with_options`] against an already running deadline. The
/// deadline is checked once more at the end, since a rewriter sharing it may
/// have stopped eliminating quantifiers early.
pub(crate) fn instantiate_until<P>(
    system: &Pbes,
    strategy: Strategy,
    data_spec: &DataSpecification,
    rewriter: &P,
    options: &InstantiateOptions,
    deadline: Deadline,
) -> Result<Pbes, InstantiationError>
where
    P: PbesRewriter + ?Sized,
{
    let result = match strategy {
        Strategy::Lazy => lazy::run(system, rewriter, options, deadline)?,
        Strategy::Finite => finite::run(system, data_spec, rewriter, options, deadline)?,
    };
    deadline.check()?;
    if options.short_names {
        Ok(shorten_names(result, "X")?)
    } else {
        Ok(result)
    }
}

/// `x` with its arguments normalized by `rewriter`.
fn normalize_instance<P: PbesRewriter + ?Sized>(rewriter: &P, x: &PropVarInst) -> PropVarInst {
    match rewriter.normalize(&PbesExpr::PropVar(x.clone())) {
        PbesExpr::PropVar(normalized) => normalized,
        _ => x.clone(),
    }
}

/// Rewrites the right-hand side of `x`'s declaring equation with the formal
/// parameters bound to `x`'s arguments. Returns the equation index too.
fn instantiate_rhs<P: PbesRewriter + ?Sized>(
    system: &Pbes,
    rewriter: &P,
    x: &PropVarInst,
) -> Result<(usize, PbesExpr), InstantiationError> {
    let index = system
        .index_of(&x.name)
        .ok_or_else(|| InstantiationError::UnknownVariable(x.name.clone()))?;
    let eq = &system.equations()[index];
    if eq.variable.arity() != x.arity() {
        return Err(InstantiationError::ArityMismatch {
            name: x.name.clone(),
            expected: eq.variable.arity(),
            found: x.arity(),
        });
    }
    let sigma: Substitution = eq
        .variable
        .parameters
        .iter()
        .cloned()
        .zip(x.arguments.iter().cloned())
        .collect();
    Ok((index, rewriter.rewrite(&eq.rhs, &sigma).expr))
}

fn check_limit(emitted: usize, max_equations: Option<usize>) -> Result<(), InstantiationError> {
    match max_equations {
        Some(max) if emitted >= max => Err(InstantiationError::LimitExceeded(max)),
        _ => Ok(()),
    }
}
