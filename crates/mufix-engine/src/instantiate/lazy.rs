//! Reachability-driven instantiation.

use indexmap::IndexSet;
use mufix_ir::{Equation, Pbes, PbesExpr, PropVarDecl, PropVarInst, Renamer};
use mufix_rewrite::PbesRewriter;
use std::collections::VecDeque;
use tracing::{debug, info};

use super::{
    check_limit, instantiate_rhs, normalize_instance, InstantiateOptions, InstantiationError,
    SearchStrategy,
};
use crate::pipeline::deadline::Deadline;

/// Pending instantiations. Every instantiation is queued at most once.
struct Worklist {
    pending: VecDeque<PropVarInst>,
    seen: IndexSet<PropVarInst>,
    search: SearchStrategy,
}

impl Worklist {
    fn new(search: SearchStrategy) -> Self {
        Self {
            pending: VecDeque::new(),
            seen: IndexSet::new(),
            search,
        }
    }

    fn push(&mut self, x: &PropVarInst) {
        if self.seen.insert(x.clone()) {
            self.pending.push_back(x.clone());
        }
    }

    fn pop(&mut self) -> Option<PropVarInst> {
        match self.search {
            SearchStrategy::BreadthFirst => self.pending.pop_front(),
            SearchStrategy::DepthFirst => self.pending.pop_back(),
        }
    }

    fn len(&self) -> usize {
        self.pending.len()
    }
}

/// Emits one ground equation per instantiation reachable from the initial
/// one. Equations are grouped by the equation they were instantiated from,
/// in discovery order within a group.
pub(super) fn run<P: PbesRewriter + ?Sized>(
    system: &Pbes,
    rewriter: &P,
    options: &InstantiateOptions,
    deadline: Deadline,
) -> Result<Pbes, InstantiationError> {
    let initial = normalize_instance(rewriter, system.initial());

    let mut renamer = Renamer::new();
    let mut todo = Worklist::new(options.search);
    let mut groups: Vec<Vec<Equation>> = vec![Vec::new(); system.len()];
    let mut emitted = 0;

    todo.push(&initial);
    while let Some(x) = todo.pop() {
        deadline.check()?;
        check_limit(emitted, options.max_equations)?;

        let (index, rhs) = instantiate_rhs(system, rewriter, &x)?;
        let rhs = rhs.try_map_propvars(&mut |y: &PropVarInst| {
            let name = renamer.rename(y)?;
            todo.push(y);
            Ok::<_, InstantiationError>(PbesExpr::var(name))
        })?;

        let name = renamer.rename(&x)?;
        let symbol = system.equations()[index].symbol;
        debug!(equation = %name, %symbol, pending = todo.len(), "Instantiated equation");
        groups[index].push(Equation::new(symbol, PropVarDecl::ground(name), rhs));
        emitted += 1;
    }

    let initial = PropVarInst::ground(renamer.rename(&initial)?);
    let equations: Vec<Equation> = groups.into_iter().flatten().collect();
    info!(
        equations = equations.len(),
        source_equations = system.len(),
        "Lazy instantiation finished"
    );
    Ok(Pbes::from_generated(equations, initial)?)
}
