use std::collections::HashMap;

use crate::expr::{DataExpr, DataVariable};
use crate::sort::Sort;
use crate::specification::{cartesian_product, DataSpecification};

/// Number of consecutive empty weight levels after which a constructor sort
/// is considered exhausted.
const MAX_EMPTY_LEVELS: usize = 64;

/// Produces the values a data variable can take.
///
/// Enumeration is pull-based: callers that only need a prefix of an infinite
/// domain simply stop pulling.
pub trait DataEnumerator {
    /// Closed values of `variable`'s sort. May be infinite.
    fn enumerate<'a>(&'a self, variable: &DataVariable) -> Box<dyn Iterator<Item = DataExpr> + 'a>;

    /// Whether `sort` certainly has finitely many values.
    fn is_finite(&self, sort: &Sort) -> bool;
}

impl<E: DataEnumerator + ?Sized> DataEnumerator for &E {
    fn enumerate<'a>(&'a self, variable: &DataVariable) -> Box<dyn Iterator<Item = DataExpr> + 'a> {
        (**self).enumerate(variable)
    }

    fn is_finite(&self, sort: &Sort) -> bool {
        (**self).is_finite(sort)
    }
}

/// Reference enumerator over the built-in sorts and a [`DataSpecification`].
///
/// `Bool` yields `false, true`; `Nat` yields `0, 1, 2, ...`; `Pos` yields
/// `1, 2, ...`; `Int` yields `0, -1, 1, -2, 2, ...`. Finite constructor sorts
/// yield their values in declaration order. Infinite constructor sorts are
/// enumerated by increasing term weight, where a constructor application
/// weighs one more than its arguments and a number weighs its distance from
/// the smallest value of its sort.
#[derive(Debug, Clone, Default)]
pub struct SortEnumerator {
    spec: DataSpecification,
}

impl SortEnumerator {
    pub fn new(spec: DataSpecification) -> Self {
        Self { spec }
    }

    pub fn specification(&self) -> &DataSpecification {
        &self.spec
    }
}

impl DataEnumerator for SortEnumerator {
    fn enumerate<'a>(&'a self, variable: &DataVariable) -> Box<dyn Iterator<Item = DataExpr> + 'a> {
        match &variable.sort {
            Sort::Bool => Box::new([false, true].into_iter().map(DataExpr::bool)),
            Sort::Nat => Box::new((0..=i64::MAX).map(DataExpr::int)),
            Sort::Pos => Box::new((1..=i64::MAX).map(DataExpr::int)),
            Sort::Int => Box::new((0..=i64::MAX).flat_map(|n| {
                let first = (n > 0).then(|| DataExpr::int(-n));
                first.into_iter().chain(std::iter::once(DataExpr::int(n)))
            })),
            sort @ Sort::Named(_) => match self.spec.enumerate_constructors(sort) {
                Some(values) => Box::new(values.into_iter()),
                None => Box::new(WeightLevels::new(&self.spec, sort.clone())),
            },
        }
    }

    fn is_finite(&self, sort: &Sort) -> bool {
        self.spec.is_certainly_finite(sort)
    }
}

/// Iterates the values of a constructor sort one weight level at a time.
struct WeightLevels<'a> {
    spec: &'a DataSpecification,
    sort: Sort,
    weight: usize,
    empty_levels: usize,
    pending: std::vec::IntoIter<DataExpr>,
    memo: HashMap<(Sort, usize), Vec<DataExpr>>,
}

impl<'a> WeightLevels<'a> {
    fn new(spec: &'a DataSpecification, sort: Sort) -> Self {
        Self {
            spec,
            sort,
            weight: 0,
            empty_levels: 0,
            pending: Vec::new().into_iter(),
            memo: HashMap::new(),
        }
    }

    fn level(&mut self, sort: &Sort, weight: usize) -> Vec<DataExpr> {
        if let Some(values) = self.memo.get(&(sort.clone(), weight)) {
            return values.clone();
        }
        let values = self.compute_level(sort, weight);
        self.memo.insert((sort.clone(), weight), values.clone());
        values
    }

    fn compute_level(&mut self, sort: &Sort, weight: usize) -> Vec<DataExpr> {
        let Ok(w) = i64::try_from(weight) else {
            return Vec::new();
        };
        match sort {
            Sort::Bool if weight == 0 => vec![DataExpr::bool(false), DataExpr::bool(true)],
            Sort::Bool => Vec::new(),
            Sort::Nat => vec![DataExpr::int(w)],
            Sort::Pos => w.checked_add(1).map(DataExpr::int).into_iter().collect(),
            Sort::Int if weight == 0 => vec![DataExpr::int(0)],
            Sort::Int => vec![DataExpr::int(-w), DataExpr::int(w)],
            Sort::Named(name) => {
                let spec = self.spec;
                let Some(constructors) = spec.constructors(name) else {
                    return Vec::new();
                };
                if weight == 0 {
                    return Vec::new();
                }
                let mut out = Vec::new();
                for constructor in constructors {
                    if constructor.arguments.is_empty() {
                        if weight == 1 {
                            out.push(DataExpr::constant(constructor.name.clone()));
                        }
                        continue;
                    }
                    for split in compositions(weight - 1, constructor.arguments.len()) {
                        let domains: Vec<Vec<DataExpr>> = constructor
                            .arguments
                            .iter()
                            .zip(&split)
                            .map(|(arg, part)| self.level(arg, *part))
                            .collect();
                        for args in cartesian_product(&domains) {
                            out.push(DataExpr::cons(constructor.name.clone(), args));
                        }
                    }
                }
                out
            }
        }
    }
}

impl Iterator for WeightLevels<'_> {
    type Item = DataExpr;

    fn next(&mut self) -> Option<DataExpr> {
        loop {
            if let Some(value) = self.pending.next() {
                return Some(value);
            }
            if self.empty_levels >= MAX_EMPTY_LEVELS {
                return None;
            }
            let sort = self.sort.clone();
            let values = self.level(&sort, self.weight);
            self.weight += 1;
            if values.is_empty() {
                self.empty_levels += 1;
            } else {
                self.empty_levels = 0;
                self.pending = values.into_iter();
            }
        }
    }
}

/// All ways to write `total` as an ordered sum of `parts` non-negative terms.
fn compositions(total: usize, parts: usize) -> Vec<Vec<usize>> {
    if parts == 0 {
        return if total == 0 { vec![Vec::new()] } else { Vec::new() };
    }
    if parts == 1 {
        return vec![vec![total]];
    }
    let mut out = Vec::new();
    for first in 0..=total {
        for mut rest in compositions(total - first, parts - 1) {
            rest.insert(0, first);
            out.push(rest);
        }
    }
    out
}
