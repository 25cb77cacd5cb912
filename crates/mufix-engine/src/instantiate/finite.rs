//! Eager expansion of finite-sort parameters.

use indexmap::map::Entry;
use indexmap::{IndexMap, IndexSet};
use mufix_data::specification::cartesian_product;
use mufix_data::{DataExpr, DataSpecification, DataVariable, Sort, Substitution};
use mufix_ir::{Equation, Pbes, PbesExpr, PropVarDecl, PropVarInst, Renamer};
use mufix_rewrite::PbesRewriter;
use tracing::{debug, info};

use super::{check_limit, normalize_instance, InstantiateOptions, InstantiationError};
use crate::pipeline::deadline::Deadline;

/// Parses a parameter selection such as `X(*:D) Y(b:Bool, n:Nat)`.
///
/// `*:S` selects every parameter of sort `S`; `p:S` selects parameter `p`,
/// which must have sort `S`. Entries are separated by whitespace or `;`.
pub fn parse_parameter_selection(
    text: &str,
    system: &Pbes,
) -> Result<IndexMap<String, IndexSet<String>>, InstantiationError> {
    let invalid = || InstantiationError::InvalidSelection(text.to_string());
    let mut selection: IndexMap<String, IndexSet<String>> = IndexMap::new();
    let mut rest = text.trim_start_matches(|c: char| c.is_whitespace() || c == ';');
    while !rest.is_empty() {
        let open = rest.find('(').ok_or_else(invalid)?;
        let close = rest.find(')').ok_or_else(invalid)?;
        if close < open {
            return Err(invalid());
        }
        let name = rest[..open].trim();
        let eq = system
            .equation_by_name(name)
            .ok_or_else(|| InstantiationError::UnknownVariable(name.to_string()))?;
        let selected = selection.entry(name.to_string()).or_default();
        for item in rest[open + 1..close].split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (param, sort) = item.split_once(':').ok_or_else(invalid)?;
            let (param, sort) = (param.trim(), sort.trim());
            let matching: Vec<&DataVariable> = eq
                .variable
                .parameters
                .iter()
                .filter(|p| (param == "*" || p.name == param) && p.sort.to_string() == sort)
                .collect();
            if param != "*" && matching.is_empty() {
                return Err(InstantiationError::UnknownParameter {
                    variable: name.to_string(),
                    parameter: param.to_string(),
                });
            }
            selected.extend(matching.into_iter().map(|p| p.name.clone()));
        }
        rest = rest[close + 1..].trim_start_matches(|c: char| c.is_whitespace() || c == ';');
    }
    Ok(selection)
}

/// Per equation, which parameters get expanded.
fn selection_masks(
    system: &Pbes,
    data_spec: &DataSpecification,
    selection: Option<&IndexMap<String, IndexSet<String>>>,
) -> Result<Vec<Vec<bool>>, InstantiationError> {
    let Some(selection) = selection else {
        return Ok(system
            .equations()
            .iter()
            .map(|eq| {
                eq.variable
                    .parameters
                    .iter()
                    .map(|p| data_spec.is_certainly_finite(&p.sort))
                    .collect()
            })
            .collect());
    };

    for (variable, parameters) in selection {
        let eq = system
            .equation_by_name(variable)
            .ok_or_else(|| InstantiationError::UnknownVariable(variable.clone()))?;
        for parameter in parameters {
            let declared = eq
                .variable
                .parameters
                .iter()
                .find(|p| &p.name == parameter)
                .ok_or_else(|| InstantiationError::UnknownParameter {
                    variable: variable.clone(),
                    parameter: parameter.clone(),
                })?;
            if !data_spec.is_certainly_finite(&declared.sort) {
                return Err(InstantiationError::InfiniteParameter {
                    variable: variable.clone(),
                    parameter: parameter.clone(),
                    sort: declared.sort.to_string(),
                });
            }
        }
    }
    Ok(system
        .equations()
        .iter()
        .map(|eq| {
            let selected = selection.get(eq.name());
            eq.variable
                .parameters
                .iter()
                .map(|p| selected.is_some_and(|s| s.contains(&p.name)))
                .collect()
        })
        .collect())
}

fn mask_of<'m>(
    system: &Pbes,
    masks: &'m [Vec<bool>],
    x: &PropVarInst,
) -> Result<&'m [bool], InstantiationError> {
    system
        .index_of(&x.name)
        .map(|i| masks[i].as_slice())
        .ok_or_else(|| InstantiationError::UnknownVariable(x.name.clone()))
}

/// Emits, for every equation, one equation per combination of values of its
/// selected parameters. Unselected parameters stay parameters of the new
/// equations. Values are the constructor terms of `data_spec`.
pub(super) fn run<P: PbesRewriter + ?Sized>(
    system: &Pbes,
    data_spec: &DataSpecification,
    rewriter: &P,
    options: &InstantiateOptions,
    deadline: Deadline,
) -> Result<Pbes, InstantiationError> {
    let masks = selection_masks(system, data_spec, options.finite_parameters.as_ref())?;
    let mut values: IndexMap<Sort, Vec<DataExpr>> = IndexMap::new();
    let mut renamer = Renamer::new();
    let mut equations = Vec::new();

    for (eq, mask) in system.equations().iter().zip(&masks) {
        let mut selected: Vec<&DataVariable> = Vec::new();
        let mut kept: Vec<DataVariable> = Vec::new();
        for (p, &expand) in eq.variable.parameters.iter().zip(mask) {
            if expand {
                selected.push(p);
            } else {
                kept.push(p.clone());
            }
        }
        let mut domains: Vec<Vec<DataExpr>> = Vec::with_capacity(selected.len());
        for p in &selected {
            let domain = match values.entry(p.sort.clone()) {
                Entry::Occupied(entry) => entry.get().clone(),
                Entry::Vacant(entry) => {
                    let domain = data_spec.enumerate_constructors(&p.sort).ok_or_else(|| {
                        InstantiationError::InfiniteParameter {
                            variable: eq.name().to_string(),
                            parameter: p.name.clone(),
                            sort: p.sort.to_string(),
                        }
                    })?;
                    entry.insert(domain).clone()
                }
            };
            domains.push(domain);
        }

        for combination in cartesian_product(&domains) {
            deadline.check()?;
            check_limit(equations.len(), options.max_equations)?;

            let sigma: Substitution = selected
                .iter()
                .map(|p| (*p).clone())
                .zip(combination)
                .collect();
            let rhs = rewriter.rewrite(&eq.rhs, &sigma).expr;
            let rhs = rhs.try_map_propvars(&mut |y: &PropVarInst| {
                let mask = mask_of(system, &masks, y)?;
                Ok::<_, InstantiationError>(PbesExpr::PropVar(renamer.rename_selected(y, mask)?))
            })?;

            let head = PropVarInst::new(
                eq.name(),
                eq.variable
                    .parameters
                    .iter()
                    .map(|p| sigma.get(p).cloned().unwrap_or_else(|| DataExpr::Var(p.clone())))
                    .collect(),
            );
            let name = renamer.rename_selected(&head, mask)?.name;
            debug!(equation = %name, symbol = %eq.symbol, "Expanded equation");
            equations.push(Equation::new(
                eq.symbol,
                PropVarDecl::new(name, kept.clone()),
                rhs,
            ));
        }
    }

    let initial = normalize_instance(rewriter, system.initial());
    let initial = renamer.rename_selected(&initial, mask_of(system, &masks, &initial)?)?;
    info!(
        equations = equations.len(),
        source_equations = system.len(),
        sorts = values.len(),
        "Finite instantiation finished"
    );
    Ok(Pbes::from_generated(equations, initial)?)
}
