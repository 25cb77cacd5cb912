use mufix_data::{DataExpr, DataVariable};
use serde::Serialize;
use std::fmt;

use crate::expression::PbesExpr;

/// Fixpoint symbol of an equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FixpointSymbol {
    /// Least fixpoint.
    Mu,
    /// Greatest fixpoint.
    Nu,
}

impl FixpointSymbol {
    /// Value a variable starts from when its equation is eliminated:
    /// `false` for `mu`, `true` for `nu`.
    pub fn default_value(self) -> bool {
        matches!(self, FixpointSymbol::Nu)
    }
}

impl fmt::Display for FixpointSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixpointSymbol::Mu => write!(f, "mu"),
            FixpointSymbol::Nu => write!(f, "nu"),
        }
    }
}

/// Left-hand side of an equation: a variable name and its formal parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PropVarDecl {
    pub name: String,
    pub parameters: Vec<DataVariable>,
}

impl PropVarDecl {
    pub fn new(name: impl Into<String>, parameters: Vec<DataVariable>) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    pub fn ground(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_ground(&self) -> bool {
        self.parameters.is_empty()
    }

    /// The instantiation `X(d1, ..., dn)` with the formal parameters as arguments.
    pub fn instance(&self) -> PropVarInst {
        PropVarInst::new(
            self.name.clone(),
            self.parameters.iter().cloned().map(DataExpr::Var).collect(),
        )
    }
}

impl fmt::Display for PropVarDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        write_list(f, &self.parameters)
    }
}

/// A variable applied to actual data arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PropVarInst {
    pub name: String,
    pub arguments: Vec<DataExpr>,
}

impl PropVarInst {
    pub fn new(name: impl Into<String>, arguments: Vec<DataExpr>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    pub fn ground(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn arity(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_ground(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Whether every argument is free of data variables.
    pub fn is_closed(&self) -> bool {
        self.arguments.iter().all(DataExpr::is_closed)
    }
}

impl fmt::Display for PropVarInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        write_list(f, &self.arguments)
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    write!(f, "(")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, ")")
}

/// A fixpoint equation `sigma X(d: D) = phi`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Equation {
    pub symbol: FixpointSymbol,
    pub variable: PropVarDecl,
    pub rhs: PbesExpr,
}

impl Equation {
    pub fn new(symbol: FixpointSymbol, variable: PropVarDecl, rhs: PbesExpr) -> Self {
        Self {
            symbol,
            variable,
            rhs,
        }
    }

    pub fn name(&self) -> &str {
        &self.variable.name
    }

    /// A ground equation has no parameters and only ground references.
    pub fn is_ground(&self) -> bool {
        self.variable.is_ground() && self.rhs.propvars().iter().all(|x| x.is_ground())
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} = {}", self.symbol, self.variable, self.rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mufix_data::Sort;

    #[test]
    fn display_forms() {
        let decl = PropVarDecl::new(
            "X",
            vec![
                DataVariable::new("n", Sort::Nat),
                DataVariable::new("b", Sort::Bool),
            ],
        );
        assert_eq!(decl.to_string(), "X(n: Nat, b: Bool)");
        assert_eq!(decl.instance().to_string(), "X(n, b)");
        assert_eq!(PropVarInst::ground("Y").to_string(), "Y");

        let eq = Equation::new(FixpointSymbol::Mu, PropVarDecl::ground("Y"), PbesExpr::False);
        assert_eq!(eq.to_string(), "mu Y = false");
        assert!(eq.is_ground());
    }

    #[test]
    fn default_values_follow_fixpoint_symbol() {
        assert!(!FixpointSymbol::Mu.default_value());
        assert!(FixpointSymbol::Nu.default_value());
    }

    #[test]
    fn closedness_of_instantiations() {
        let open = PropVarInst::new("X", vec![DataExpr::var("n", Sort::Nat)]);
        let closed = PropVarInst::new("X", vec![DataExpr::int(1).add(DataExpr::int(2))]);
        assert!(!open.is_closed());
        assert!(closed.is_closed());
        assert!(!closed.is_ground());
    }
}
