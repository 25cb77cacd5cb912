#![no_main]
use libfuzzer_sys::fuzz_target;
use mufix_data::{DataExpr, DataVariable, Sort};
use mufix_engine::instantiate::parse_parameter_selection;
use mufix_ir::{Equation, FixpointSymbol, Pbes, PbesExpr, PropVarDecl, PropVarInst};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let b = DataVariable::new("b", Sort::Bool);
    let n = DataVariable::new("n", Sort::Nat);
    let Ok(system) = Pbes::new(
        vec![Equation::new(
            FixpointSymbol::Nu,
            PropVarDecl::new("X", vec![b.clone(), n.clone()]),
            PbesExpr::propvar("X", vec![DataExpr::Var(b), DataExpr::Var(n)]),
        )],
        PropVarInst::new("X", vec![DataExpr::bool(true), DataExpr::int(0)]),
    ) else {
        return;
    };
    if let Ok(selection) = parse_parameter_selection(text, &system) {
        for (variable, parameters) in &selection {
            assert_eq!(variable, "X");
            assert!(parameters.iter().all(|p| p == "b" || p == "n"));
        }
    }
});
