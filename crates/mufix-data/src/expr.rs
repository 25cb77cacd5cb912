use indexmap::IndexSet;
use serde::Serialize;
use std::fmt;

use crate::sort::Sort;
use crate::substitution::Substitution;

/// A typed data variable. Two variables are equal only if name and sort agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DataVariable {
    pub name: String,
    pub sort: Sort,
}

impl DataVariable {
    pub fn new(name: impl Into<String>, sort: Sort) -> Self {
        Self {
            name: name.into(),
            sort,
        }
    }
}

impl fmt::Display for DataVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.sort)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,

    // Boolean logic
    And,
    Or,
    Implies,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "div",
            BinaryOp::Mod => "mod",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Implies => "=>",
        }
    }
}

/// Data expression, embedded opaquely into predicate formulas.
///
/// There are no binders at the data level: quantification only happens in
/// predicate formulas, so substitution never needs to rename.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DataExpr {
    Var(DataVariable),
    Bool(bool),
    /// Number literal, shared by `Nat`, `Pos` and `Int`.
    Number(i64),
    /// Constructor application of a declared sort (nullary constructors have no arguments).
    Cons(String, Vec<DataExpr>),
    Unary(UnaryOp, Box<DataExpr>),
    Binary(BinaryOp, Box<DataExpr>, Box<DataExpr>),
    If(Box<DataExpr>, Box<DataExpr>, Box<DataExpr>),
}

#[allow(clippy::should_implement_trait)]
impl DataExpr {
    pub fn var(name: impl Into<String>, sort: Sort) -> Self {
        DataExpr::Var(DataVariable::new(name, sort))
    }

    pub fn bool(b: bool) -> Self {
        DataExpr::Bool(b)
    }

    pub fn int(n: i64) -> Self {
        DataExpr::Number(n)
    }

    pub fn cons(name: impl Into<String>, args: Vec<DataExpr>) -> Self {
        DataExpr::Cons(name.into(), args)
    }

    pub fn constant(name: impl Into<String>) -> Self {
        DataExpr::Cons(name.into(), Vec::new())
    }

    pub fn binary(op: BinaryOp, lhs: DataExpr, rhs: DataExpr) -> Self {
        DataExpr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn add(self, other: DataExpr) -> Self {
        Self::binary(BinaryOp::Add, self, other)
    }

    pub fn sub(self, other: DataExpr) -> Self {
        Self::binary(BinaryOp::Sub, self, other)
    }

    pub fn mul(self, other: DataExpr) -> Self {
        Self::binary(BinaryOp::Mul, self, other)
    }

    pub fn div(self, other: DataExpr) -> Self {
        Self::binary(BinaryOp::Div, self, other)
    }

    pub fn modulo(self, other: DataExpr) -> Self {
        Self::binary(BinaryOp::Mod, self, other)
    }

    pub fn eq(self, other: DataExpr) -> Self {
        Self::binary(BinaryOp::Eq, self, other)
    }

    pub fn neq(self, other: DataExpr) -> Self {
        Self::binary(BinaryOp::Neq, self, other)
    }

    pub fn lt(self, other: DataExpr) -> Self {
        Self::binary(BinaryOp::Lt, self, other)
    }

    pub fn le(self, other: DataExpr) -> Self {
        Self::binary(BinaryOp::Le, self, other)
    }

    pub fn gt(self, other: DataExpr) -> Self {
        Self::binary(BinaryOp::Gt, self, other)
    }

    pub fn ge(self, other: DataExpr) -> Self {
        Self::binary(BinaryOp::Ge, self, other)
    }

    pub fn and(self, other: DataExpr) -> Self {
        Self::binary(BinaryOp::And, self, other)
    }

    pub fn or(self, other: DataExpr) -> Self {
        Self::binary(BinaryOp::Or, self, other)
    }

    pub fn implies(self, other: DataExpr) -> Self {
        Self::binary(BinaryOp::Implies, self, other)
    }

    pub fn not(self) -> Self {
        DataExpr::Unary(UnaryOp::Not, Box::new(self))
    }

    pub fn neg(self) -> Self {
        DataExpr::Unary(UnaryOp::Neg, Box::new(self))
    }

    pub fn ite(cond: DataExpr, then: DataExpr, otherwise: DataExpr) -> Self {
        DataExpr::If(Box::new(cond), Box::new(then), Box::new(otherwise))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DataExpr::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            DataExpr::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// A value is a closed term built only from literals and constructors.
    pub fn is_value(&self) -> bool {
        match self {
            DataExpr::Bool(_) | DataExpr::Number(_) => true,
            DataExpr::Cons(_, args) => args.iter().all(DataExpr::is_value),
            _ => false,
        }
    }

    /// Free data variables in order of first occurrence.
    pub fn free_variables(&self) -> IndexSet<DataVariable> {
        let mut out = IndexSet::new();
        self.collect_variables(&mut out);
        out
    }

    pub(crate) fn collect_variables(&self, out: &mut IndexSet<DataVariable>) {
        match self {
            DataExpr::Var(v) => {
                out.insert(v.clone());
            }
            DataExpr::Bool(_) | DataExpr::Number(_) => {}
            DataExpr::Cons(_, args) => {
                for arg in args {
                    arg.collect_variables(out);
                }
            }
            DataExpr::Unary(_, inner) => inner.collect_variables(out),
            DataExpr::Binary(_, lhs, rhs) => {
                lhs.collect_variables(out);
                rhs.collect_variables(out);
            }
            DataExpr::If(c, t, e) => {
                c.collect_variables(out);
                t.collect_variables(out);
                e.collect_variables(out);
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            DataExpr::Var(_) => false,
            DataExpr::Bool(_) | DataExpr::Number(_) => true,
            DataExpr::Cons(_, args) => args.iter().all(DataExpr::is_closed),
            DataExpr::Unary(_, inner) => inner.is_closed(),
            DataExpr::Binary(_, lhs, rhs) => lhs.is_closed() && rhs.is_closed(),
            DataExpr::If(c, t, e) => c.is_closed() && t.is_closed() && e.is_closed(),
        }
    }

    pub fn mentions(&self, variable: &DataVariable) -> bool {
        match self {
            DataExpr::Var(v) => v == variable,
            DataExpr::Bool(_) | DataExpr::Number(_) => false,
            DataExpr::Cons(_, args) => args.iter().any(|a| a.mentions(variable)),
            DataExpr::Unary(_, inner) => inner.mentions(variable),
            DataExpr::Binary(_, lhs, rhs) => lhs.mentions(variable) || rhs.mentions(variable),
            DataExpr::If(c, t, e) => {
                c.mentions(variable) || t.mentions(variable) || e.mentions(variable)
            }
        }
    }

    /// Syntactic substitution without any normalization.
    pub fn substitute(&self, sigma: &Substitution) -> DataExpr {
        if sigma.is_empty() {
            return self.clone();
        }
        match self {
            DataExpr::Var(v) => sigma.get(v).cloned().unwrap_or_else(|| self.clone()),
            DataExpr::Bool(_) | DataExpr::Number(_) => self.clone(),
            DataExpr::Cons(name, args) => DataExpr::Cons(
                name.clone(),
                args.iter().map(|a| a.substitute(sigma)).collect(),
            ),
            DataExpr::Unary(op, inner) => DataExpr::Unary(*op, Box::new(inner.substitute(sigma))),
            DataExpr::Binary(op, lhs, rhs) => DataExpr::Binary(
                *op,
                Box::new(lhs.substitute(sigma)),
                Box::new(rhs.substitute(sigma)),
            ),
            DataExpr::If(c, t, e) => DataExpr::If(
                Box::new(c.substitute(sigma)),
                Box::new(t.substitute(sigma)),
                Box::new(e.substitute(sigma)),
            ),
        }
    }
}

/// Canonical text form. Distinct expressions print differently: binary
/// applications are always parenthesized and unary minus wraps its operand.
impl fmt::Display for DataExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataExpr::Var(v) => write!(f, "{}", v.name),
            DataExpr::Bool(b) => write!(f, "{b}"),
            DataExpr::Number(n) => write!(f, "{n}"),
            DataExpr::Cons(name, args) => {
                write!(f, "{name}")?;
                if !args.is_empty() {
                    write!(f, "(")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
            DataExpr::Unary(UnaryOp::Not, inner) => write!(f, "!{inner}"),
            DataExpr::Unary(UnaryOp::Neg, inner) => write!(f, "-({inner})"),
            DataExpr::Binary(op, lhs, rhs) => write!(f, "({lhs} {} {rhs})", op.symbol()),
            DataExpr::If(c, t, e) => write!(f, "if({c}, {t}, {e})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n() -> DataExpr {
        DataExpr::var("n", Sort::Nat)
    }

    #[test]
    fn display_is_parenthesized() {
        let e = n().add(DataExpr::int(1)).lt(DataExpr::int(3));
        assert_eq!(e.to_string(), "((n + 1) < 3)");
        assert_eq!(DataExpr::int(-3).to_string(), "-3");
        assert_eq!(DataExpr::int(3).neg().to_string(), "-(3)");
        assert_eq!(
            DataExpr::cons("pair", vec![DataExpr::bool(true), DataExpr::constant("d1")]).to_string(),
            "pair(true, d1)"
        );
    }

    #[test]
    fn free_variables_in_first_occurrence_order() {
        let b = DataExpr::var("b", Sort::Bool);
        let e = DataExpr::ite(b.clone(), n(), n().add(DataExpr::var("m", Sort::Nat)));
        let vars: Vec<String> = e.free_variables().into_iter().map(|v| v.name).collect();
        assert_eq!(vars, vec!["b", "n", "m"]);
        assert!(!e.is_closed());
        assert!(DataExpr::int(2).add(DataExpr::int(3)).is_closed());
    }

    #[test]
    fn variables_with_different_sorts_are_distinct() {
        let nat = DataVariable::new("x", Sort::Nat);
        let int = DataVariable::new("x", Sort::Int);
        assert_ne!(nat, int);
        assert!(!DataExpr::Var(nat).mentions(&int));
    }

    #[test]
    fn substitute_replaces_only_mapped_variables() {
        let mut sigma = Substitution::new();
        sigma.insert(DataVariable::new("n", Sort::Nat), DataExpr::int(4));
        let e = n().add(DataExpr::var("m", Sort::Nat));
        assert_eq!(
            e.substitute(&sigma),
            DataExpr::int(4).add(DataExpr::var("m", Sort::Nat))
        );
    }

    #[test]
    fn values_are_closed_constructor_terms() {
        assert!(DataExpr::cons("s", vec![DataExpr::int(1)]).is_value());
        assert!(!DataExpr::int(1).add(DataExpr::int(1)).is_value());
        assert!(!n().is_value());
    }
}
