//! Proptest strategies for generating well-formed equation systems.

use proptest::prelude::*;

use mufix_data::{DataExpr, DataVariable, Sort};

use crate::equation::{Equation, FixpointSymbol, PropVarDecl, PropVarInst};
use crate::expression::PbesExpr;
use crate::system::Pbes;

/// Formula shape with abstract leaf choices, resolved once the arities of all
/// equations are known.
#[derive(Debug, Clone)]
enum Shape {
    Const(bool),
    /// A boolean data term: selects a parameter or a bound variable.
    Param(usize, bool),
    /// A reference: target equation and one selector per argument.
    Call(usize, Vec<usize>),
    Not(Box<Shape>),
    And(Box<Shape>, Box<Shape>),
    Or(Box<Shape>, Box<Shape>),
    Forall(Box<Shape>),
    Exists(Box<Shape>),
}

fn arb_shape(quantifiers: bool) -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(Shape::Const),
        (0..4usize, any::<bool>()).prop_map(|(i, neg)| Shape::Param(i, neg)),
        (0..8usize, proptest::collection::vec(0..8usize, 2)).prop_map(|(t, a)| Shape::Call(t, a)),
    ];
    leaf.prop_recursive(3, 16, 2, move |inner| {
        let mut options = vec![
            inner.clone().prop_map(|s| Shape::Not(Box::new(s))).boxed(),
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Shape::And(Box::new(a), Box::new(b)))
                .boxed(),
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Shape::Or(Box::new(a), Box::new(b)))
                .boxed(),
        ];
        if quantifiers {
            options.push(inner.clone().prop_map(|s| Shape::Forall(Box::new(s))).boxed());
            options.push(inner.prop_map(|s| Shape::Exists(Box::new(s))).boxed());
        }
        proptest::strategy::Union::new(options)
    })
}

/// Resolves a shape against the declared arities. `scope` lists the boolean
/// data variables visible at this point.
fn build(shape: &Shape, arities: &[usize], scope: &mut Vec<DataVariable>) -> PbesExpr {
    let pick = |i: usize, neg: bool, scope: &[DataVariable]| -> DataExpr {
        let value = if scope.is_empty() {
            DataExpr::bool(i % 2 == 0)
        } else {
            DataExpr::Var(scope[i % scope.len()].clone())
        };
        if neg {
            value.not()
        } else {
            value
        }
    };
    match shape {
        Shape::Const(b) => PbesExpr::from_bool(*b),
        Shape::Param(i, neg) => PbesExpr::data(pick(*i, *neg, scope)),
        Shape::Call(target, selectors) => {
            let target = target % arities.len();
            let args = (0..arities[target])
                .map(|k| {
                    let s = selectors.get(k).copied().unwrap_or(0);
                    pick(s / 2, s % 2 == 1, scope)
                })
                .collect();
            PbesExpr::propvar(format!("X{target}"), args)
        }
        Shape::Not(s) => build(s, arities, scope).not(),
        Shape::And(a, b) => build(a, arities, scope).and(build(b, arities, scope)),
        Shape::Or(a, b) => build(a, arities, scope).or(build(b, arities, scope)),
        Shape::Forall(s) | Shape::Exists(s) => {
            let q = DataVariable::new(format!("q{}", scope.len()), Sort::Bool);
            scope.push(q.clone());
            let body = build(s, arities, scope);
            scope.pop();
            if matches!(shape, Shape::Forall(_)) {
                PbesExpr::forall(vec![q], body)
            } else {
                PbesExpr::exists(vec![q], body)
            }
        }
    }
}

fn arb_system(
    max_equations: usize,
    max_arity: usize,
    quantifiers: bool,
) -> impl Strategy<Value = Pbes> {
    proptest::collection::vec((any::<bool>(), 0..=max_arity), 1..=max_equations)
        .prop_flat_map(move |decls| {
            let n = decls.len();
            (
                Just(decls),
                proptest::collection::vec(arb_shape(quantifiers), n..=n),
                proptest::collection::vec(any::<bool>(), max_arity..=max_arity),
            )
        })
        .prop_filter_map("well-formed system", |(decls, shapes, initial_args)| {
            let arities: Vec<usize> = decls.iter().map(|(_, a)| *a).collect();
            let equations = decls
                .iter()
                .zip(&shapes)
                .enumerate()
                .map(|(i, ((mu, arity), shape))| {
                    let params: Vec<DataVariable> = (0..*arity)
                        .map(|k| DataVariable::new(format!("b{k}"), Sort::Bool))
                        .collect();
                    let mut scope = params.clone();
                    let rhs = build(shape, &arities, &mut scope);
                    let symbol = if *mu {
                        FixpointSymbol::Mu
                    } else {
                        FixpointSymbol::Nu
                    };
                    Equation::new(symbol, PropVarDecl::new(format!("X{i}"), params), rhs)
                })
                .collect();
            let initial = PropVarInst::new(
                "X0",
                initial_args[..arities[0]]
                    .iter()
                    .map(|b| DataExpr::bool(*b))
                    .collect(),
            );
            Pbes::new(equations, initial).ok()
        })
}

/// Strategy for a ground system (BES) with 1 to `max_equations` equations
/// named `X0`, `X1`, ... The initial variable is `X0`.
pub fn arb_bes(max_equations: usize) -> impl Strategy<Value = Pbes> {
    arb_system(max_equations, 0, false)
}

/// Strategy for a closed system whose parameters all have sort `Bool`.
///
/// Equations have up to two parameters; right-hand sides may quantify over
/// fresh boolean variables. Every reachable instantiation is finite, so both
/// instantiation strategies terminate on these systems.
pub fn arb_bool_pbes(max_equations: usize) -> impl Strategy<Value = Pbes> {
    arb_system(max_equations, 2, true)
}
