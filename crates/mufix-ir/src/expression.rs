use indexmap::IndexSet;
use mufix_data::{DataExpr, DataVariable, Substitution};
use serde::Serialize;
use std::fmt;

use crate::equation::PropVarInst;

/// Predicate formula: the right-hand side of a fixpoint equation.
///
/// Equality and ordering are structural. Quantifiers bind data variables;
/// the bound list of a well-formed quantifier is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PbesExpr {
    True,
    False,
    Not(Box<PbesExpr>),
    And(Box<PbesExpr>, Box<PbesExpr>),
    Or(Box<PbesExpr>, Box<PbesExpr>),
    Implies(Box<PbesExpr>, Box<PbesExpr>),
    Forall(Vec<DataVariable>, Box<PbesExpr>),
    Exists(Vec<DataVariable>, Box<PbesExpr>),
    PropVar(PropVarInst),
    /// Boolean data expression used as a formula.
    Data(DataExpr),
}

#[allow(clippy::should_implement_trait)]
impl PbesExpr {
    pub fn from_bool(b: bool) -> Self {
        if b {
            PbesExpr::True
        } else {
            PbesExpr::False
        }
    }

    pub fn data(expr: DataExpr) -> Self {
        PbesExpr::Data(expr)
    }

    pub fn propvar(name: impl Into<String>, arguments: Vec<DataExpr>) -> Self {
        PbesExpr::PropVar(PropVarInst::new(name, arguments))
    }

    /// Reference to a ground variable.
    pub fn var(name: impl Into<String>) -> Self {
        PbesExpr::PropVar(PropVarInst::ground(name))
    }

    pub fn not(self) -> Self {
        PbesExpr::Not(Box::new(self))
    }

    pub fn and(self, other: PbesExpr) -> Self {
        PbesExpr::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: PbesExpr) -> Self {
        PbesExpr::Or(Box::new(self), Box::new(other))
    }

    pub fn implies(self, other: PbesExpr) -> Self {
        PbesExpr::Implies(Box::new(self), Box::new(other))
    }

    /// Universal quantification; an empty variable list yields `body` itself.
    pub fn forall(variables: Vec<DataVariable>, body: PbesExpr) -> Self {
        if variables.is_empty() {
            body
        } else {
            PbesExpr::Forall(variables, Box::new(body))
        }
    }

    /// Existential quantification; an empty variable list yields `body` itself.
    pub fn exists(variables: Vec<DataVariable>, body: PbesExpr) -> Self {
        if variables.is_empty() {
            body
        } else {
            PbesExpr::Exists(variables, Box::new(body))
        }
    }

    /// Conjunction of all operands, `True` when there are none.
    pub fn join_and<I: IntoIterator<Item = PbesExpr>>(operands: I) -> Self {
        operands
            .into_iter()
            .reduce(PbesExpr::and)
            .unwrap_or(PbesExpr::True)
    }

    /// Disjunction of all operands, `False` when there are none.
    pub fn join_or<I: IntoIterator<Item = PbesExpr>>(operands: I) -> Self {
        operands
            .into_iter()
            .reduce(PbesExpr::or)
            .unwrap_or(PbesExpr::False)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PbesExpr::True => Some(true),
            PbesExpr::False => Some(false),
            _ => None,
        }
    }

    /// Free data variables in order of first occurrence. Quantifiers bind.
    pub fn free_variables(&self) -> IndexSet<DataVariable> {
        let mut out = IndexSet::new();
        self.collect_free(&mut Vec::new(), &mut out);
        out
    }

    fn collect_free<'a>(&'a self, bound: &mut Vec<&'a DataVariable>, out: &mut IndexSet<DataVariable>) {
        let mut add = |e: &DataExpr, out: &mut IndexSet<DataVariable>| {
            for v in e.free_variables() {
                if !bound.contains(&&v) {
                    out.insert(v);
                }
            }
        };
        match self {
            PbesExpr::True | PbesExpr::False => {}
            PbesExpr::Data(e) => add(e, out),
            PbesExpr::PropVar(x) => {
                for arg in &x.arguments {
                    add(arg, out);
                }
            }
            PbesExpr::Not(p) => p.collect_free(bound, out),
            PbesExpr::And(p, q) | PbesExpr::Or(p, q) | PbesExpr::Implies(p, q) => {
                p.collect_free(bound, out);
                q.collect_free(bound, out);
            }
            PbesExpr::Forall(vars, body) | PbesExpr::Exists(vars, body) => {
                let depth = bound.len();
                bound.extend(vars.iter());
                body.collect_free(bound, out);
                bound.truncate(depth);
            }
        }
    }

    /// Whether `variable` occurs free.
    pub fn mentions(&self, variable: &DataVariable) -> bool {
        match self {
            PbesExpr::True | PbesExpr::False => false,
            PbesExpr::Data(e) => e.mentions(variable),
            PbesExpr::PropVar(x) => x.arguments.iter().any(|a| a.mentions(variable)),
            PbesExpr::Not(p) => p.mentions(variable),
            PbesExpr::And(p, q) | PbesExpr::Or(p, q) | PbesExpr::Implies(p, q) => {
                p.mentions(variable) || q.mentions(variable)
            }
            PbesExpr::Forall(vars, body) | PbesExpr::Exists(vars, body) => {
                !vars.contains(variable) && body.mentions(variable)
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.free_variables().is_empty()
    }

    /// Variable instantiations in left-to-right order, duplicates included.
    pub fn propvars(&self) -> Vec<&PropVarInst> {
        let mut out = Vec::new();
        self.collect_propvars(&mut out);
        out
    }

    fn collect_propvars<'a>(&'a self, out: &mut Vec<&'a PropVarInst>) {
        match self {
            PbesExpr::True | PbesExpr::False | PbesExpr::Data(_) => {}
            PbesExpr::PropVar(x) => out.push(x),
            PbesExpr::Not(p) | PbesExpr::Forall(_, p) | PbesExpr::Exists(_, p) => {
                p.collect_propvars(out)
            }
            PbesExpr::And(p, q) | PbesExpr::Or(p, q) | PbesExpr::Implies(p, q) => {
                p.collect_propvars(out);
                q.collect_propvars(out);
            }
        }
    }

    /// Rebuilds the formula with every variable instantiation replaced by
    /// `f(instantiation)`, visiting instantiations left to right.
    pub fn try_map_propvars<E, F>(&self, f: &mut F) -> Result<PbesExpr, E>
    where
        F: FnMut(&PropVarInst) -> Result<PbesExpr, E>,
    {
        Ok(match self {
            PbesExpr::True | PbesExpr::False | PbesExpr::Data(_) => self.clone(),
            PbesExpr::PropVar(x) => f(x)?,
            PbesExpr::Not(p) => p.try_map_propvars(f)?.not(),
            PbesExpr::And(p, q) => p.try_map_propvars(f)?.and(q.try_map_propvars(f)?),
            PbesExpr::Or(p, q) => p.try_map_propvars(f)?.or(q.try_map_propvars(f)?),
            PbesExpr::Implies(p, q) => p.try_map_propvars(f)?.implies(q.try_map_propvars(f)?),
            PbesExpr::Forall(vars, body) => {
                PbesExpr::Forall(vars.clone(), Box::new(body.try_map_propvars(f)?))
            }
            PbesExpr::Exists(vars, body) => {
                PbesExpr::Exists(vars.clone(), Box::new(body.try_map_propvars(f)?))
            }
        })
    }

    /// Replaces every reference to the ground variable `name` by `replacement`.
    /// Instantiations with arguments are left alone.
    pub fn replace_ground(&self, name: &str, replacement: &PbesExpr) -> PbesExpr {
        let result: Result<PbesExpr, std::convert::Infallible> =
            self.try_map_propvars(&mut |x: &PropVarInst| {
                Ok(if x.is_ground() && x.name == name {
                    replacement.clone()
                } else {
                    PbesExpr::PropVar(x.clone())
                })
            });
        match result {
            Ok(expr) => expr,
            Err(never) => match never {},
        }
    }

    /// Applies `sigma` to data sub-terms and instantiation arguments without
    /// normalizing. Bound variables shadow the substitution; substituted
    /// values are expected to be closed, so no renaming takes place.
    pub fn substitute(&self, sigma: &Substitution) -> PbesExpr {
        if sigma.is_empty() {
            return self.clone();
        }
        match self {
            PbesExpr::True | PbesExpr::False => self.clone(),
            PbesExpr::Data(e) => PbesExpr::Data(e.substitute(sigma)),
            PbesExpr::PropVar(x) => PbesExpr::PropVar(PropVarInst::new(
                x.name.clone(),
                x.arguments.iter().map(|a| a.substitute(sigma)).collect(),
            )),
            PbesExpr::Not(p) => p.substitute(sigma).not(),
            PbesExpr::And(p, q) => p.substitute(sigma).and(q.substitute(sigma)),
            PbesExpr::Or(p, q) => p.substitute(sigma).or(q.substitute(sigma)),
            PbesExpr::Implies(p, q) => p.substitute(sigma).implies(q.substitute(sigma)),
            PbesExpr::Forall(vars, body) => {
                PbesExpr::Forall(vars.clone(), Box::new(body.substitute(&sigma.without(vars))))
            }
            PbesExpr::Exists(vars, body) => {
                PbesExpr::Exists(vars.clone(), Box::new(body.substitute(&sigma.without(vars))))
            }
        }
    }

    /// Number of formula nodes, data terms counting as one.
    pub fn size(&self) -> usize {
        match self {
            PbesExpr::True | PbesExpr::False | PbesExpr::Data(_) | PbesExpr::PropVar(_) => 1,
            PbesExpr::Not(p) | PbesExpr::Forall(_, p) | PbesExpr::Exists(_, p) => 1 + p.size(),
            PbesExpr::And(p, q) | PbesExpr::Or(p, q) | PbesExpr::Implies(p, q) => {
                1 + p.size() + q.size()
            }
        }
    }
}

impl From<PropVarInst> for PbesExpr {
    fn from(x: PropVarInst) -> Self {
        PbesExpr::PropVar(x)
    }
}

impl fmt::Display for PbesExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PbesExpr::True => write!(f, "true"),
            PbesExpr::False => write!(f, "false"),
            PbesExpr::Not(p) => write!(f, "!{p}"),
            PbesExpr::And(p, q) => write!(f, "({p} && {q})"),
            PbesExpr::Or(p, q) => write!(f, "({p} || {q})"),
            PbesExpr::Implies(p, q) => write!(f, "({p} => {q})"),
            PbesExpr::Forall(vars, body) => write_quantifier(f, "forall", vars, body),
            PbesExpr::Exists(vars, body) => write_quantifier(f, "exists", vars, body),
            PbesExpr::PropVar(x) => write!(f, "{x}"),
            PbesExpr::Data(e) => write!(f, "val({e})"),
        }
    }
}

fn write_quantifier(
    f: &mut fmt::Formatter<'_>,
    keyword: &str,
    vars: &[DataVariable],
    body: &PbesExpr,
) -> fmt::Result {
    write!(f, "({keyword} ")?;
    for (i, v) in vars.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{v}")?;
    }
    write!(f, ". {body})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mufix_data::Sort;

    fn n() -> DataVariable {
        DataVariable::new("n", Sort::Nat)
    }

    fn m() -> DataVariable {
        DataVariable::new("m", Sort::Nat)
    }

    #[test]
    fn quantifiers_bind_their_variables() {
        let body = PbesExpr::propvar("X", vec![DataExpr::Var(n()), DataExpr::Var(m())]);
        let phi = PbesExpr::forall(vec![n()], body);
        let free: Vec<_> = phi.free_variables().into_iter().collect();
        assert_eq!(free, vec![m()]);
        assert!(!phi.mentions(&n()));
        assert!(phi.mentions(&m()));
    }

    #[test]
    fn substitute_respects_shadowing() {
        let body = PbesExpr::data(DataExpr::Var(n()).lt(DataExpr::Var(m())));
        let phi = PbesExpr::data(DataExpr::Var(n()).eq(DataExpr::int(0)))
            .and(PbesExpr::exists(vec![n()], body));
        let sigma: Substitution = [(n(), DataExpr::int(5)), (m(), DataExpr::int(7))]
            .into_iter()
            .collect();
        assert_eq!(
            phi.substitute(&sigma).to_string(),
            "(val((5 == 0)) && (exists n: Nat. val((n < 7))))"
        );
    }

    #[test]
    fn joins_of_empty_sequences_are_identities() {
        assert_eq!(PbesExpr::join_and(Vec::new()), PbesExpr::True);
        assert_eq!(PbesExpr::join_or(Vec::new()), PbesExpr::False);
        let joined = PbesExpr::join_or([PbesExpr::var("X"), PbesExpr::var("Y"), PbesExpr::var("Z")]);
        assert_eq!(joined.to_string(), "((X || Y) || Z)");
    }

    #[test]
    fn replace_ground_only_touches_matching_ground_references() {
        let phi = PbesExpr::var("X")
            .and(PbesExpr::propvar("X", vec![DataExpr::int(1)]))
            .or(PbesExpr::var("Y").not());
        let replaced = phi.replace_ground("X", &PbesExpr::False);
        assert_eq!(replaced.to_string(), "((false && X(1)) || !Y)");
    }

    #[test]
    fn propvars_are_listed_left_to_right() {
        let phi = PbesExpr::var("B")
            .and(PbesExpr::forall(vec![n()], PbesExpr::propvar("A", vec![DataExpr::Var(n())])))
            .or(PbesExpr::var("B"));
        let names: Vec<&str> = phi.propvars().iter().map(|x| x.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "B"]);
        assert_eq!(phi.size(), 6);
    }
}
