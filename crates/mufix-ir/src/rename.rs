//! Renaming of closed variable instantiations to ground names.
//!
//! `X(a1, ..., an)` becomes `X@a1@...@an`, where each `ai` is printed in its
//! canonical form. Declared names never contain `@` and canonical forms are
//! injective, so distinct closed instantiations always get distinct names.

use indexmap::IndexMap;
use miette::Diagnostic;
use std::fmt::Write;
use thiserror::Error;

use crate::equation::{Equation, PropVarDecl, PropVarInst};
use crate::system::{Pbes, SystemError};

/// Separator between a variable name and each encoded argument.
pub const SEPARATOR: char = '@';

#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum RenameError {
    #[error("Cannot rename '{instance}': argument {position} is not closed")]
    #[diagnostic(
        code(mufix::rename::non_closed_instantiation),
        help("only instantiations whose arguments contain no data variables can be renamed")
    )]
    NonClosedInstantiation { instance: String, position: usize },
}

/// Name for `instance`, encoding the arguments selected by `mask` (all of
/// them when `mask` is `None`).
pub fn encoded_name(instance: &PropVarInst, mask: Option<&[bool]>) -> Result<String, RenameError> {
    let mut name = instance.name.clone();
    for (position, arg) in instance.arguments.iter().enumerate() {
        if !mask.map_or(true, |m| m.get(position).copied().unwrap_or(false)) {
            continue;
        }
        if !arg.is_closed() {
            return Err(RenameError::NonClosedInstantiation {
                instance: instance.to_string(),
                position,
            });
        }
        // Writing into a String cannot fail.
        let _ = write!(name, "{SEPARATOR}{arg}");
    }
    Ok(name)
}

/// Memoizing renamer. Names are recorded in discovery order.
#[derive(Debug, Clone, Default)]
pub struct Renamer {
    memo: IndexMap<PropVarInst, String>,
}

impl Renamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ground name of a closed instantiation.
    pub fn rename(&mut self, instance: &PropVarInst) -> Result<String, RenameError> {
        if let Some(name) = self.memo.get(instance) {
            return Ok(name.clone());
        }
        let name = encoded_name(instance, None)?;
        self.memo.insert(instance.clone(), name.clone());
        Ok(name)
    }

    /// Renames by the arguments selected in `mask` and returns the new
    /// instantiation carrying the unselected arguments.
    pub fn rename_selected(
        &mut self,
        instance: &PropVarInst,
        mask: &[bool],
    ) -> Result<PropVarInst, RenameError> {
        let (selected, rest): (Vec<_>, Vec<_>) = instance
            .arguments
            .iter()
            .enumerate()
            .partition(|(i, _)| mask.get(*i).copied().unwrap_or(false));
        let key = PropVarInst::new(
            instance.name.clone(),
            selected.into_iter().map(|(_, a)| a.clone()).collect(),
        );
        let name = match self.memo.get(&key) {
            Some(name) => name.clone(),
            None => {
                let name = encoded_name(instance, Some(mask))?;
                self.memo.insert(key, name.clone());
                name
            }
        };
        Ok(PropVarInst::new(
            name,
            rest.into_iter().map(|(_, a)| a.clone()).collect(),
        ))
    }

    pub fn len(&self) -> usize {
        self.memo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }

    /// Renamed instantiations with their names, in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&PropVarInst, &str)> {
        self.memo.iter().map(|(x, n)| (x, n.as_str()))
    }
}

/// Replaces every variable name by `prefix` followed by the equation's
/// position, so the first equation becomes `X0`, the second `X1`, and so on.
pub fn shorten_names(pbes: Pbes, prefix: &str) -> Result<Pbes, SystemError> {
    let mapping: IndexMap<String, String> = pbes
        .equations()
        .iter()
        .enumerate()
        .map(|(i, eq)| (eq.name().to_string(), format!("{prefix}{i}")))
        .collect();
    let rename = |x: &PropVarInst| -> Result<PropVarInst, SystemError> {
        let name = mapping
            .get(&x.name)
            .ok_or_else(|| SystemError::UnknownVariable(x.name.clone()))?;
        Ok(PropVarInst::new(name.clone(), x.arguments.clone()))
    };

    let (equations, initial) = pbes.into_parts();
    let initial = rename(&initial)?;
    let mut renamed = Vec::with_capacity(equations.len());
    for eq in equations {
        let rhs = eq.rhs.try_map_propvars(&mut |x: &PropVarInst| rename(x).map(Into::into))?;
        let name = rename(&eq.variable.instance())?.name;
        renamed.push(Equation::new(
            eq.symbol,
            PropVarDecl::new(name, eq.variable.parameters),
            rhs,
        ));
    }
    Pbes::from_generated(renamed, initial)
}
