#![no_main]
use libfuzzer_sys::fuzz_target;
use mufix_data::{DataExpr, DataSpecification, DataVariable, EvaluatingRewriter, Sort, SortEnumerator};
use mufix_engine::gauss::solve;
use mufix_engine::instantiate::{instantiate_with_options, InstantiateOptions, Strategy};
use mufix_ir::{Equation, FixpointSymbol, Pbes, PbesExpr, PropVarDecl, PropVarInst};
use mufix_rewrite::{EnumerateQuantifiersRewriter, QuantifierOptions};

/// Decodes a formula over the boolean parameters `b0`, `b1` of equations
/// `X0..X{n-1}`, each taking two arguments.
fn formula(bytes: &mut impl Iterator<Item = u8>, n: usize, depth: usize) -> PbesExpr {
    let b = |i: u8| DataExpr::Var(DataVariable::new(format!("b{}", i % 2), Sort::Bool));
    let Some(op) = bytes.next() else {
        return PbesExpr::True;
    };
    match (op % 7, depth) {
        (0, _) | (_, 0) => {
            let target = bytes.next().unwrap_or(0) as usize % n;
            let (x, y) = (bytes.next().unwrap_or(0), bytes.next().unwrap_or(1));
            PbesExpr::propvar(format!("X{target}"), vec![b(x), b(y).not()])
        }
        (1, _) => PbesExpr::data(b(op >> 3)),
        (2, _) => formula(bytes, n, depth - 1).not(),
        (3, _) => formula(bytes, n, depth - 1).and(formula(bytes, n, depth - 1)),
        (4, _) => formula(bytes, n, depth - 1).or(formula(bytes, n, depth - 1)),
        (5, _) => PbesExpr::forall(
            vec![DataVariable::new("b0", Sort::Bool)],
            formula(bytes, n, depth - 1),
        ),
        _ => PbesExpr::exists(
            vec![DataVariable::new("b1", Sort::Bool)],
            formula(bytes, n, depth - 1),
        ),
    }
}

fuzz_target!(|data: &[u8]| {
    let Some((&count, rest)) = data.split_first() else {
        return;
    };
    let n = count as usize % 4 + 1;
    let mut bytes = rest.iter().copied();
    let params = vec![
        DataVariable::new("b0", Sort::Bool),
        DataVariable::new("b1", Sort::Bool),
    ];
    let equations = (0..n)
        .map(|i| {
            let symbol = if i % 2 == 0 {
                FixpointSymbol::Nu
            } else {
                FixpointSymbol::Mu
            };
            let rhs = formula(&mut bytes, n, 4);
            Equation::new(symbol, PropVarDecl::new(format!("X{i}"), params.clone()), rhs)
        })
        .collect();
    let Ok(system) = Pbes::new(
        equations,
        PropVarInst::new("X0", vec![DataExpr::bool(false), DataExpr::bool(false)]),
    ) else {
        return;
    };

    let spec = DataSpecification::new();
    let enumerator = SortEnumerator::default();
    let rewriter = EnumerateQuantifiersRewriter::new(
        EvaluatingRewriter,
        &enumerator,
        QuantifierOptions {
            max_candidates: Some(64),
            ..QuantifierOptions::default()
        },
    );
    let options = InstantiateOptions {
        max_equations: Some(64),
        ..InstantiateOptions::default()
    };
    let lazy = instantiate_with_options(&system, Strategy::Lazy, &spec, &rewriter, &enumerator, &options);
    let finite =
        instantiate_with_options(&system, Strategy::Finite, &spec, &rewriter, &enumerator, &options);
    if let (Ok(lazy), Ok(finite)) = (lazy, finite) {
        assert!(lazy.is_bes() && finite.is_bes());
        assert_eq!(solve(&lazy), solve(&finite));
    }
});
