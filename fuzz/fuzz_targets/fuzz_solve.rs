#![no_main]
use libfuzzer_sys::fuzz_target;
use mufix_engine::gauss::{solve, Answer};
use mufix_ir::{Equation, FixpointSymbol, Pbes, PbesExpr, PropVarDecl, PropVarInst};

// Every three bytes describe one ground equation: fixpoint and connective,
// then the two referenced equations.
fuzz_target!(|data: &[u8]| {
    let chunks: Vec<&[u8]> = data.chunks_exact(3).take(64).collect();
    if chunks.is_empty() {
        return;
    }
    let n = chunks.len();
    let var = |b: u8| PbesExpr::var(format!("X{}", b as usize % n));
    let equations = chunks
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let symbol = if c[0] & 1 == 0 {
                FixpointSymbol::Mu
            } else {
                FixpointSymbol::Nu
            };
            let rhs = match (c[0] >> 1) % 5 {
                0 => var(c[1]).and(var(c[2])),
                1 => var(c[1]).or(var(c[2])),
                2 => var(c[1]).implies(var(c[2])),
                3 => PbesExpr::from_bool(c[1] & 1 == 1).or(var(c[2])),
                _ => var(c[1]).not().not(),
            };
            Equation::new(symbol, PropVarDecl::ground(format!("X{i}")), rhs)
        })
        .collect();
    if let Ok(pbes) = Pbes::new(equations, PropVarInst::ground("X0")) {
        // Closed formulas always evaluate once every variable is eliminated.
        assert_ne!(solve(&pbes), Answer::Unknown);
    }
});
