use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mufix_data::{DataExpr, DataSpecification, DataVariable, EvaluatingRewriter, Sort, SortEnumerator};
use mufix_engine::gauss::GaussSolver;
use mufix_engine::instantiate::{instantiate, Strategy};
use mufix_engine::pipeline::{solve_pbes, PipelineOptions};
use mufix_ir::{Equation, FixpointSymbol, Pbes, PbesExpr, PropVarDecl, PropVarInst};
use mufix_rewrite::{EnumerateQuantifiersRewriter, QuantifierOptions, SimplifyingRewriter};

/// nu X(n: Nat) = val(n < 200) => (X(n + 1) && Y(n));
/// mu Y(m: Nat) = val(m > 150) || X(m + 1);
/// init X(0);
fn ladder() -> Pbes {
    let n = DataVariable::new("n", Sort::Nat);
    let m = DataVariable::new("m", Sort::Nat);
    let nv = || DataExpr::Var(n.clone());
    let mv = || DataExpr::Var(m.clone());
    Pbes::new(
        vec![
            Equation::new(
                FixpointSymbol::Nu,
                PropVarDecl::new("X", vec![n.clone()]),
                PbesExpr::data(nv().lt(DataExpr::int(200))).implies(
                    PbesExpr::propvar("X", vec![nv().add(DataExpr::int(1))])
                        .and(PbesExpr::propvar("Y", vec![nv()])),
                ),
            ),
            Equation::new(
                FixpointSymbol::Mu,
                PropVarDecl::new("Y", vec![m.clone()]),
                PbesExpr::data(mv().gt(DataExpr::int(150)))
                    .or(PbesExpr::propvar("X", vec![mv().add(DataExpr::int(1))])),
            ),
        ],
        PropVarInst::new("X", vec![DataExpr::int(0)]),
    )
    .unwrap()
}

/// Ground system of `size` equations with alternating fixpoints and a
/// back edge from every equation.
fn alternating_bes(size: usize) -> Pbes {
    let equations = (0..size)
        .map(|i| {
            let symbol = if i % 2 == 0 {
                FixpointSymbol::Nu
            } else {
                FixpointSymbol::Mu
            };
            let next = PbesExpr::var(format!("X{}", (i + 1) % size));
            let back = PbesExpr::var(format!("X{}", (i * 7) % size));
            let rhs = if i % 3 == 0 { next.and(back) } else { next.or(back) };
            Equation::new(symbol, PropVarDecl::ground(format!("X{i}")), rhs)
        })
        .collect();
    Pbes::new(equations, PropVarInst::ground("X0")).unwrap()
}

/// forall b0..b5: Bool. val(b0 || ... || b5) || Z
fn wide_quantifier() -> PbesExpr {
    let vars: Vec<DataVariable> = (0..6)
        .map(|i| DataVariable::new(format!("b{i}"), Sort::Bool))
        .collect();
    let disjunction = vars
        .iter()
        .skip(1)
        .fold(DataExpr::Var(vars[0].clone()), |acc, v| {
            acc.or(DataExpr::Var(v.clone()))
        });
    PbesExpr::forall(vars, PbesExpr::data(disjunction).or(PbesExpr::var("Z")))
}

fn bench_lazy_instantiation(c: &mut Criterion) {
    let system = ladder();
    let spec = DataSpecification::new();
    let enumerator = SortEnumerator::default();
    let rewriter = SimplifyingRewriter::new(EvaluatingRewriter);
    c.bench_function("engine_lazy_instantiation_ladder", |b| {
        b.iter(|| {
            instantiate(
                black_box(&system),
                Strategy::Lazy,
                &spec,
                &rewriter,
                &enumerator,
            )
            .unwrap()
        })
    });
}

fn bench_gauss_elimination(c: &mut Criterion) {
    let system = alternating_bes(300);
    let solver = GaussSolver::new(SimplifyingRewriter::new(EvaluatingRewriter));
    c.bench_function("engine_gauss_alternating_300", |b| {
        b.iter(|| solver.solve(black_box(&system)))
    });
}

fn bench_quantifier_elimination(c: &mut Criterion) {
    use mufix_rewrite::PbesRewriter;

    let phi = wide_quantifier();
    let rewriter = EnumerateQuantifiersRewriter::new(
        EvaluatingRewriter,
        SortEnumerator::default(),
        QuantifierOptions::default(),
    );
    c.bench_function("engine_enumerate_forall_6_bools", |b| {
        b.iter(|| rewriter.normalize(black_box(&phi)))
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let system = ladder();
    let spec = DataSpecification::new();
    let options = PipelineOptions::default();
    c.bench_function("engine_solve_pbes_ladder", |b| {
        b.iter(|| solve_pbes(black_box(&system), &spec, black_box(&options)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_lazy_instantiation,
    bench_gauss_elimination,
    bench_quantifier_elimination,
    bench_pipeline,
);
criterion_main!(benches);
