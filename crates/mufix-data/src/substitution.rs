use indexmap::IndexMap;
use std::fmt;

use crate::expr::{DataExpr, DataVariable};

/// A finite map from data variables to data expressions, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    bindings: IndexMap<DataVariable, DataExpr>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `variable`, replacing any earlier binding. Returns the old value.
    pub fn insert(&mut self, variable: DataVariable, value: DataExpr) -> Option<DataExpr> {
        self.bindings.insert(variable, value)
    }

    pub fn remove(&mut self, variable: &DataVariable) -> Option<DataExpr> {
        self.bindings.shift_remove(variable)
    }

    pub fn get(&self, variable: &DataVariable) -> Option<&DataExpr> {
        self.bindings.get(variable)
    }

    pub fn contains(&self, variable: &DataVariable) -> bool {
        self.bindings.contains_key(variable)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DataVariable, &DataExpr)> {
        self.bindings.iter()
    }

    /// A copy of `self` extended (and overridden) by `bindings`.
    pub fn extended<I>(&self, bindings: I) -> Substitution
    where
        I: IntoIterator<Item = (DataVariable, DataExpr)>,
    {
        let mut out = self.clone();
        for (variable, value) in bindings {
            out.insert(variable, value);
        }
        out
    }

    /// A copy of `self` without bindings for `variables`.
    pub fn without<'a, I>(&self, variables: I) -> Substitution
    where
        I: IntoIterator<Item = &'a DataVariable>,
    {
        let mut out = self.clone();
        for variable in variables {
            out.remove(variable);
        }
        out
    }
}

impl FromIterator<(DataVariable, DataExpr)> for Substitution {
    fn from_iter<T: IntoIterator<Item = (DataVariable, DataExpr)>>(iter: T) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, (variable, value)) in self.bindings.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} := {value}", variable.name)?;
        }
        write!(f, "]")
    }
}
