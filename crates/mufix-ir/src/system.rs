use indexmap::{IndexMap, IndexSet};
use miette::Diagnostic;
use mufix_data::specification::is_valid_identifier;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::equation::{Equation, PropVarInst};

#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum SystemError {
    #[error("Variable '{0}' is declared by more than one equation")]
    #[diagnostic(code(mufix::system::duplicate_variable))]
    DuplicateVariable(String),
    #[error("Unknown variable '{0}'")]
    #[diagnostic(
        code(mufix::system::unknown_variable),
        help("every referenced variable needs an equation in the same system")
    )]
    UnknownVariable(String),
    #[error("Variable '{name}' takes {expected} argument(s) but is applied to {found}")]
    #[diagnostic(code(mufix::system::arity_mismatch))]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Invalid variable name '{0}'")]
    #[diagnostic(
        code(mufix::system::invalid_identifier),
        help("names start with a letter or '_' and may not contain '@', which is reserved for generated names")
    )]
    InvalidIdentifier(String),
}

/// A parameterized boolean equation system.
///
/// Equation order matters: solving eliminates equations from last to first
/// and answers with the value of the first one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pbes {
    equations: Vec<Equation>,
    initial: PropVarInst,
    #[serde(skip)]
    index: IndexMap<String, usize>,
}

impl Pbes {
    /// Builds and validates a system written by a user.
    pub fn new(equations: Vec<Equation>, initial: PropVarInst) -> Result<Self, SystemError> {
        for eq in &equations {
            if !is_valid_identifier(eq.name()) {
                return Err(SystemError::InvalidIdentifier(eq.name().to_string()));
            }
        }
        Self::build(equations, initial)
    }

    /// Builds and validates a system whose variable names were generated by
    /// renaming. Such names may contain the `@` separator.
    pub fn from_generated(
        equations: Vec<Equation>,
        initial: PropVarInst,
    ) -> Result<Self, SystemError> {
        for eq in &equations {
            if eq.name().is_empty() {
                return Err(SystemError::InvalidIdentifier(String::new()));
            }
        }
        Self::build(equations, initial)
    }

    fn build(equations: Vec<Equation>, initial: PropVarInst) -> Result<Self, SystemError> {
        let mut index = IndexMap::with_capacity(equations.len());
        for (i, eq) in equations.iter().enumerate() {
            if index.insert(eq.name().to_string(), i).is_some() {
                return Err(SystemError::DuplicateVariable(eq.name().to_string()));
            }
        }
        let pbes = Self {
            equations,
            initial,
            index,
        };
        pbes.check_reference(&pbes.initial)?;
        for eq in &pbes.equations {
            for x in eq.rhs.propvars() {
                pbes.check_reference(x)?;
            }
        }
        Ok(pbes)
    }

    fn check_reference(&self, x: &PropVarInst) -> Result<(), SystemError> {
        let eq = self
            .equation_by_name(&x.name)
            .ok_or_else(|| SystemError::UnknownVariable(x.name.clone()))?;
        if eq.variable.arity() != x.arity() {
            return Err(SystemError::ArityMismatch {
                name: x.name.clone(),
                expected: eq.variable.arity(),
                found: x.arity(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.equations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equations.is_empty()
    }

    pub fn equations(&self) -> &[Equation] {
        &self.equations
    }

    pub fn equation(&self, i: usize) -> Option<&Equation> {
        self.equations.get(i)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn equation_by_name(&self, name: &str) -> Option<&Equation> {
        self.index_of(name).map(|i| &self.equations[i])
    }

    pub fn initial(&self) -> &PropVarInst {
        &self.initial
    }

    pub fn into_parts(self) -> (Vec<Equation>, PropVarInst) {
        (self.equations, self.initial)
    }

    /// Whether every declaration and instantiation is parameter-free.
    pub fn is_bes(&self) -> bool {
        self.initial.is_ground() && self.equations.iter().all(Equation::is_ground)
    }

    /// Whether the only free data variables of each right-hand side are the
    /// equation's own parameters, and the initial instantiation is closed.
    pub fn is_closed(&self) -> bool {
        self.initial.is_closed()
            && self.equations.iter().all(|eq| {
                eq.rhs
                    .free_variables()
                    .iter()
                    .all(|v| eq.variable.parameters.contains(v))
            })
    }

    /// Names of the variables referenced from right-hand sides or the initial
    /// instantiation, in order of first occurrence.
    pub fn occurring_variables(&self) -> IndexSet<&str> {
        let mut out = IndexSet::new();
        out.insert(self.initial.name.as_str());
        for eq in &self.equations {
            for x in eq.rhs.propvars() {
                out.insert(x.name.as_str());
            }
        }
        out
    }
}

impl fmt::Display for Pbes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for eq in &self.equations {
            writeln!(f, "{eq};")?;
        }
        writeln!(f, "init {};", self.initial)
    }
}
