use crate::expr::{BinaryOp, DataExpr, UnaryOp};
use crate::substitution::Substitution;

/// Normalizes data expressions.
///
/// Implementations must be total and side-effect free: the same input and
/// substitution always give the same normal form.
pub trait DataRewriter {
    /// Applies `sigma` to `expr` and returns its normal form.
    fn rewrite(&self, expr: &DataExpr, sigma: &Substitution) -> DataExpr;

    /// Normal form of `expr` without a substitution.
    fn normalize(&self, expr: &DataExpr) -> DataExpr {
        self.rewrite(expr, &Substitution::new())
    }
}

impl<R: DataRewriter + ?Sized> DataRewriter for &R {
    fn rewrite(&self, expr: &DataExpr, sigma: &Substitution) -> DataExpr {
        (**self).rewrite(expr, sigma)
    }
}

impl<R: DataRewriter + ?Sized> DataRewriter for Box<R> {
    fn rewrite(&self, expr: &DataExpr, sigma: &Substitution) -> DataExpr {
        (**self).rewrite(expr, sigma)
    }
}

/// Reference data rewriter.
///
/// Works innermost-first. Closed arithmetic, comparisons, boolean connectives
/// and conditionals are evaluated; constructor values are compared
/// structurally (constructors are free). Open terms only get unit and
/// absorption laws, so the result may still mention variables. Operations that
/// would overflow or divide by zero are left unevaluated.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluatingRewriter;

impl EvaluatingRewriter {
    pub fn new() -> Self {
        Self
    }

    fn eval(&self, expr: &DataExpr, sigma: &Substitution) -> DataExpr {
        match expr {
            DataExpr::Var(v) => sigma.get(v).cloned().unwrap_or_else(|| expr.clone()),
            DataExpr::Bool(_) | DataExpr::Number(_) => expr.clone(),
            DataExpr::Cons(name, args) => DataExpr::Cons(
                name.clone(),
                args.iter().map(|a| self.eval(a, sigma)).collect(),
            ),
            DataExpr::Unary(op, inner) => eval_unary(*op, self.eval(inner, sigma)),
            DataExpr::Binary(op, lhs, rhs) => {
                let lhs = self.eval(lhs, sigma);
                // Short-circuit before evaluating the right operand.
                match (op, lhs.as_bool()) {
                    (BinaryOp::And, Some(false)) => return DataExpr::bool(false),
                    (BinaryOp::Or, Some(true)) => return DataExpr::bool(true),
                    (BinaryOp::Implies, Some(false)) => return DataExpr::bool(true),
                    _ => {}
                }
                eval_binary(*op, lhs, self.eval(rhs, sigma))
            }
            DataExpr::If(c, t, e) => match self.eval(c, sigma) {
                DataExpr::Bool(true) => self.eval(t, sigma),
                DataExpr::Bool(false) => self.eval(e, sigma),
                cond => {
                    let then = self.eval(t, sigma);
                    let otherwise = self.eval(e, sigma);
                    if then == otherwise {
                        then
                    } else {
                        DataExpr::ite(cond, then, otherwise)
                    }
                }
            },
        }
    }
}

impl DataRewriter for EvaluatingRewriter {
    fn rewrite(&self, expr: &DataExpr, sigma: &Substitution) -> DataExpr {
        self.eval(expr, sigma)
    }
}

fn eval_unary(op: UnaryOp, inner: DataExpr) -> DataExpr {
    match (op, inner) {
        (UnaryOp::Not, DataExpr::Bool(b)) => DataExpr::bool(!b),
        (UnaryOp::Not, DataExpr::Unary(UnaryOp::Not, x)) => *x,
        (UnaryOp::Neg, DataExpr::Number(n)) => match n.checked_neg() {
            Some(m) => DataExpr::int(m),
            None => DataExpr::int(n).neg(),
        },
        (UnaryOp::Neg, DataExpr::Unary(UnaryOp::Neg, x)) => *x,
        (op, x) => DataExpr::Unary(op, Box::new(x)),
    }
}

fn eval_binary(op: BinaryOp, lhs: DataExpr, rhs: DataExpr) -> DataExpr {
    use BinaryOp::*;

    match op {
        And => match (lhs.as_bool(), rhs.as_bool()) {
            (Some(false), _) | (_, Some(false)) => DataExpr::bool(false),
            (Some(true), _) => rhs,
            (_, Some(true)) => lhs,
            _ if lhs == rhs => lhs,
            _ => DataExpr::binary(op, lhs, rhs),
        },
        Or => match (lhs.as_bool(), rhs.as_bool()) {
            (Some(true), _) | (_, Some(true)) => DataExpr::bool(true),
            (Some(false), _) => rhs,
            (_, Some(false)) => lhs,
            _ if lhs == rhs => lhs,
            _ => DataExpr::binary(op, lhs, rhs),
        },
        Implies => match (lhs.as_bool(), rhs.as_bool()) {
            (Some(false), _) | (_, Some(true)) => DataExpr::bool(true),
            (Some(true), _) => rhs,
            (_, Some(false)) => eval_unary(UnaryOp::Not, lhs),
            _ if lhs == rhs => DataExpr::bool(true),
            _ => DataExpr::binary(op, lhs, rhs),
        },
        Eq | Neq => {
            let equal = if lhs == rhs {
                Some(true)
            } else if lhs.is_value() && rhs.is_value() {
                Some(false)
            } else {
                None
            };
            match equal {
                Some(b) => DataExpr::bool(if op == Eq { b } else { !b }),
                None => DataExpr::binary(op, lhs, rhs),
            }
        }
        Lt | Le | Gt | Ge => match (lhs.as_number(), rhs.as_number()) {
            (Some(a), Some(b)) => DataExpr::bool(match op {
                Lt => a < b,
                Le => a <= b,
                Gt => a > b,
                _ => a >= b,
            }),
            _ if lhs == rhs => DataExpr::bool(matches!(op, Le | Ge)),
            _ => DataExpr::binary(op, lhs, rhs),
        },
        Add | Sub | Mul | Div | Mod => eval_arithmetic(op, lhs, rhs),
    }
}

fn eval_arithmetic(op: BinaryOp, lhs: DataExpr, rhs: DataExpr) -> DataExpr {
    use BinaryOp::*;

    if let (Some(a), Some(b)) = (lhs.as_number(), rhs.as_number()) {
        let folded = match op {
            Add => a.checked_add(b),
            Sub => a.checked_sub(b),
            Mul => a.checked_mul(b),
            Div if b != 0 => a.checked_div_euclid(b),
            Mod if b != 0 => a.checked_rem_euclid(b),
            _ => None,
        };
        return match folded {
            Some(n) => DataExpr::int(n),
            None => DataExpr::binary(op, lhs, rhs),
        };
    }
    match (op, lhs.as_number(), rhs.as_number()) {
        (Add, Some(0), _) => rhs,
        (Add | Sub, _, Some(0)) => lhs,
        (Mul, Some(1), _) => rhs,
        (Mul | Div, _, Some(1)) => lhs,
        (Mul, Some(0), _) | (Mul, _, Some(0)) => DataExpr::int(0),
        _ => DataExpr::binary(op, lhs, rhs),
    }
}
