#![allow(dead_code)]

use mufix_data::{DataExpr, DataSpecification, DataVariable, EvaluatingRewriter, Sort, SortEnumerator};
use mufix_engine::instantiate::{instantiate_with_options, InstantiateOptions, InstantiationError, Strategy};
use mufix_ir::{Equation, FixpointSymbol, Pbes, PbesExpr, PropVarDecl, PropVarInst};
use mufix_rewrite::{EnumerateQuantifiersRewriter, QuantifierOptions};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn boolean(name: &str) -> DataVariable {
    DataVariable::new(name, Sort::Bool)
}

pub fn nat(name: &str) -> DataVariable {
    DataVariable::new(name, Sort::Nat)
}

pub fn v(variable: &DataVariable) -> DataExpr {
    DataExpr::Var(variable.clone())
}

pub fn val(e: DataExpr) -> PbesExpr {
    PbesExpr::data(e)
}

pub fn x(name: &str, arguments: Vec<DataExpr>) -> PbesExpr {
    PbesExpr::propvar(name, arguments)
}

pub fn eq(symbol: FixpointSymbol, name: &str, parameters: Vec<DataVariable>, rhs: PbesExpr) -> Equation {
    Equation::new(symbol, PropVarDecl::new(name, parameters), rhs)
}

pub fn system(equations: Vec<Equation>, name: &str, arguments: Vec<DataExpr>) -> Pbes {
    Pbes::new(equations, PropVarInst::new(name, arguments)).expect("valid system")
}

/// `sort D = struct d1 | d2;`
pub fn enum_spec() -> DataSpecification {
    let mut spec = DataSpecification::new();
    spec.add_enum("D", &["d1", "d2"]).expect("valid sort");
    spec
}

/// nu X(b: Bool, n: Nat) = (val(b) => X(!b, n)) && (val(!b) => X(!b, n + 1));
/// init X(true, 0);
pub fn alternating_counter() -> Pbes {
    let (b, n) = (boolean("b"), nat("n"));
    let rhs = val(v(&b))
        .implies(x("X", vec![v(&b).not(), v(&n)]))
        .and(val(v(&b).not()).implies(x("X", vec![v(&b).not(), v(&n).add(DataExpr::int(1))])));
    system(
        vec![eq(FixpointSymbol::Nu, "X", vec![b, n], rhs)],
        "X",
        vec![DataExpr::bool(true), DataExpr::int(0)],
    )
}

/// nu X(b: Bool, n: Nat) = forall c: Bool. X(c, n); init X(true, 0);
pub fn universal_choice() -> Pbes {
    let (b, n, c) = (boolean("b"), nat("n"), boolean("c"));
    let rhs = PbesExpr::forall(vec![c.clone()], x("X", vec![v(&c), v(&n)]));
    system(
        vec![eq(FixpointSymbol::Nu, "X", vec![b, n], rhs)],
        "X",
        vec![DataExpr::bool(true), DataExpr::int(0)],
    )
}

/// nu X(b: Bool, n: Nat) = exists c: Bool. X(c, n + 1); init X(true, 0);
pub fn existential_counter() -> Pbes {
    let (b, n, c) = (boolean("b"), nat("n"), boolean("c"));
    let rhs = PbesExpr::exists(
        vec![c.clone()],
        x("X", vec![v(&c), v(&n).add(DataExpr::int(1))]),
    );
    system(
        vec![eq(FixpointSymbol::Nu, "X", vec![b, n], rhs)],
        "X",
        vec![DataExpr::bool(true), DataExpr::int(0)],
    )
}

/// nu X(b: Bool, n: Nat) = val(b && n < 10) => X(!b, n + 1); init X(true, 0);
pub fn bounded_counter() -> Pbes {
    let (b, n) = (boolean("b"), nat("n"));
    let rhs = val(v(&b).and(v(&n).lt(DataExpr::int(10))))
        .implies(x("X", vec![v(&b).not(), v(&n).add(DataExpr::int(1))]));
    system(
        vec![eq(FixpointSymbol::Nu, "X", vec![b, n], rhs)],
        "X",
        vec![DataExpr::bool(true), DataExpr::int(0)],
    )
}

/// nu X(d: D, n: Nat) = val(d == d1 && n < 10) => X(d2, n + 1); init X(d1, 0);
pub fn enum_counter() -> Pbes {
    let (d, n) = (DataVariable::new("d", Sort::named("D")), nat("n"));
    let rhs = val(v(&d)
        .eq(DataExpr::constant("d1"))
        .and(v(&n).lt(DataExpr::int(10))))
    .implies(x("X", vec![DataExpr::constant("d2"), v(&n).add(DataExpr::int(1))]));
    system(
        vec![eq(FixpointSymbol::Nu, "X", vec![d, n], rhs)],
        "X",
        vec![DataExpr::constant("d1"), DataExpr::int(0)],
    )
}

/// nu X(b: Bool) = forall c: Bool. X(if(c, !c, c)); init X(true);
pub fn conditional_argument() -> Pbes {
    let (b, c) = (boolean("b"), boolean("c"));
    let rhs = PbesExpr::forall(
        vec![c.clone()],
        x("X", vec![DataExpr::ite(v(&c), v(&c).not(), v(&c))]),
    );
    system(
        vec![eq(FixpointSymbol::Nu, "X", vec![b], rhs)],
        "X",
        vec![DataExpr::bool(true)],
    )
}

/// nu X(b: Bool) = val(b) && Y(!b);
/// mu Y(c: Bool) = forall d: Bool. X(d && c) || Y(d);
/// init X(true);
pub fn alternating_fixpoints() -> Pbes {
    let (b, c, d) = (boolean("b"), boolean("c"), boolean("d"));
    let x_rhs = val(v(&b)).and(x("Y", vec![v(&b).not()]));
    let y_rhs = PbesExpr::forall(
        vec![d.clone()],
        x("X", vec![v(&d).and(v(&c))]).or(x("Y", vec![v(&d)])),
    );
    system(
        vec![
            eq(FixpointSymbol::Nu, "X", vec![b], x_rhs),
            eq(FixpointSymbol::Mu, "Y", vec![c], y_rhs),
        ],
        "X",
        vec![DataExpr::bool(true)],
    )
}

/// nu X(d: D) = (val(d == d1) && X(d2)) || (val(d == d2) && X(d1)); init X(d1);
pub fn enum_swap() -> Pbes {
    let d = DataVariable::new("d", Sort::named("D"));
    let is = |c: &str| val(v(&d).eq(DataExpr::constant(c)));
    let rhs = is("d1")
        .and(x("X", vec![DataExpr::constant("d2")]))
        .or(is("d2").and(x("X", vec![DataExpr::constant("d1")])));
    system(
        vec![eq(FixpointSymbol::Nu, "X", vec![d.clone()], rhs)],
        "X",
        vec![DataExpr::constant("d1")],
    )
}

/// Instantiates with the reference collaborators and quantifier elimination.
pub fn instantiate_reference(
    pbes: &Pbes,
    spec: &DataSpecification,
    strategy: Strategy,
    options: &InstantiateOptions,
) -> Result<Pbes, InstantiationError> {
    let enumerator = SortEnumerator::new(spec.clone());
    let rewriter = EnumerateQuantifiersRewriter::new(
        EvaluatingRewriter,
        &enumerator,
        QuantifierOptions::default(),
    );
    instantiate_with_options(pbes, strategy, spec, &rewriter, &enumerator, options)
}
