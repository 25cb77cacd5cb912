use indexmap::{IndexMap, IndexSet};
use miette::Diagnostic;
use thiserror::Error;

use crate::expr::DataExpr;
use crate::sort::Sort;

const RESERVED_WORDS: &[&str] = &["true", "false", "if", "div", "mod"];

/// A constructor of a declared sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constructor {
    pub name: String,
    pub arguments: Vec<Sort>,
}

impl Constructor {
    pub fn new(name: impl Into<String>, arguments: Vec<Sort>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    pub fn constant(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}

#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum SpecificationError {
    #[error("Duplicate sort '{0}'")]
    #[diagnostic(code(mufix::data::duplicate_sort))]
    DuplicateSort(String),
    #[error("Duplicate constructor '{0}'")]
    #[diagnostic(
        code(mufix::data::duplicate_constructor),
        help("constructor names are global; rename one of the declarations")
    )]
    DuplicateConstructor(String),
    #[error("Invalid identifier '{0}'")]
    #[diagnostic(
        code(mufix::data::invalid_identifier),
        help("identifiers start with a letter or '_' and contain only letters, digits, '_' or '\\''")
    )]
    InvalidIdentifier(String),
    #[error("Sort '{sort}' is used by constructor '{constructor}' but never declared")]
    #[diagnostic(code(mufix::data::undeclared_sort))]
    UndeclaredSort { sort: String, constructor: String },
}

/// Returns true if `name` is usable as a sort, constructor, or variable name.
///
/// Identifiers never contain `@`, which keeps generated instantiation names
/// unambiguous.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '\'') {
        return false;
    }
    !RESERVED_WORDS.contains(&name)
}

/// Declared constructor sorts.
///
/// The built-in sorts (`Bool`, `Pos`, `Nat`, `Int`) are always available and
/// never declared here.
#[derive(Debug, Clone, Default)]
pub struct DataSpecification {
    sorts: IndexMap<String, Vec<Constructor>>,
    constructor_sorts: IndexMap<String, String>,
}

impl DataSpecification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a constructor sort. Argument sorts may refer to the sort
    /// itself or to sorts declared earlier.
    pub fn add_sort(
        &mut self,
        name: &str,
        constructors: Vec<Constructor>,
    ) -> Result<(), SpecificationError> {
        if !is_valid_identifier(name) {
            return Err(SpecificationError::InvalidIdentifier(name.to_string()));
        }
        if self.sorts.contains_key(name) {
            return Err(SpecificationError::DuplicateSort(name.to_string()));
        }
        let mut seen = IndexSet::new();
        for constructor in &constructors {
            if !is_valid_identifier(&constructor.name) {
                return Err(SpecificationError::InvalidIdentifier(
                    constructor.name.clone(),
                ));
            }
            if self.constructor_sorts.contains_key(&constructor.name)
                || !seen.insert(constructor.name.as_str())
            {
                return Err(SpecificationError::DuplicateConstructor(
                    constructor.name.clone(),
                ));
            }
            for argument in &constructor.arguments {
                if let Sort::Named(arg) = argument {
                    if arg != name && !self.sorts.contains_key(arg) {
                        return Err(SpecificationError::UndeclaredSort {
                            sort: arg.clone(),
                            constructor: constructor.name.clone(),
                        });
                    }
                }
            }
        }
        for constructor in &constructors {
            self.constructor_sorts
                .insert(constructor.name.clone(), name.to_string());
        }
        self.sorts.insert(name.to_string(), constructors);
        Ok(())
    }

    /// Declares an enumeration sort: a sort whose constructors are all constants.
    pub fn add_enum(&mut self, name: &str, constants: &[&str]) -> Result<(), SpecificationError> {
        self.add_sort(
            name,
            constants.iter().map(|c| Constructor::constant(*c)).collect(),
        )
    }

    pub fn constructors(&self, sort: &str) -> Option<&[Constructor]> {
        self.sorts.get(sort).map(Vec::as_slice)
    }

    pub fn sort_of_constructor(&self, constructor: &str) -> Option<Sort> {
        self.constructor_sorts
            .get(constructor)
            .map(|s| Sort::Named(s.clone()))
    }

    pub fn sorts(&self) -> impl Iterator<Item = Sort> + '_ {
        self.sorts.keys().map(|s| Sort::Named(s.clone()))
    }

    /// Whether `sort` certainly has finitely many values.
    ///
    /// Numeric sorts are infinite. A declared sort is finite when it is not
    /// recursive and every constructor argument sort is finite.
    pub fn is_certainly_finite(&self, sort: &Sort) -> bool {
        let mut visiting = IndexSet::new();
        self.is_finite_rec(sort, &mut visiting)
    }

    fn is_finite_rec<'a>(&'a self, sort: &'a Sort, visiting: &mut IndexSet<&'a str>) -> bool {
        match sort {
            Sort::Bool => true,
            Sort::Pos | Sort::Nat | Sort::Int => false,
            Sort::Named(name) => {
                let Some(constructors) = self.sorts.get(name) else {
                    return false;
                };
                if !visiting.insert(name.as_str()) {
                    return false;
                }
                let finite = constructors
                    .iter()
                    .flat_map(|c| c.arguments.iter())
                    .all(|arg| self.is_finite_rec(arg, visiting));
                visiting.shift_remove(name.as_str());
                finite
            }
        }
    }

    /// All values of a certainly-finite sort, in declaration order.
    ///
    /// Returns `None` for sorts that are not certainly finite.
    pub fn enumerate_constructors(&self, sort: &Sort) -> Option<Vec<DataExpr>> {
        if !self.is_certainly_finite(sort) {
            return None;
        }
        Some(self.finite_values(sort))
    }

    fn finite_values(&self, sort: &Sort) -> Vec<DataExpr> {
        match sort {
            Sort::Bool => vec![DataExpr::bool(false), DataExpr::bool(true)],
            Sort::Named(name) => {
                let mut out = Vec::new();
                for constructor in self.sorts.get(name).into_iter().flatten() {
                    let domains: Vec<Vec<DataExpr>> = constructor
                        .arguments
                        .iter()
                        .map(|arg| self.finite_values(arg))
                        .collect();
                    for args in cartesian_product(&domains) {
                        out.push(DataExpr::Cons(constructor.name.clone(), args));
                    }
                }
                out
            }
            Sort::Pos | Sort::Nat | Sort::Int => Vec::new(),
        }
    }
}

/// All combinations picking one element from each domain, leftmost slowest.
pub fn cartesian_product<T: Clone>(domains: &[Vec<T>]) -> Vec<Vec<T>> {
    let mut out: Vec<Vec<T>> = vec![Vec::new()];
    for domain in domains {
        let mut next = Vec::with_capacity(out.len() * domain.len());
        for prefix in &out {
            for value in domain {
                let mut combination = prefix.clone();
                combination.push(value.clone());
                next.push(combination);
            }
        }
        out = next;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> DataSpecification {
        let mut spec = DataSpecification::new();
        spec.add_enum("D", &["d1", "d2"]).unwrap();
        spec.add_sort(
            "Pair",
            vec![Constructor::new("pair", vec![Sort::named("D"), Sort::Bool])],
        )
        .unwrap();
        spec.add_sort(
            "List",
            vec![
                Constructor::constant("nil"),
                Constructor::new("cons", vec![Sort::Bool, Sort::named("List")]),
            ],
        )
        .unwrap();
        spec
    }

    #[test]
    fn finiteness_of_builtin_and_declared_sorts() {
        let spec = spec();
        assert!(spec.is_certainly_finite(&Sort::Bool));
        assert!(!spec.is_certainly_finite(&Sort::Nat));
        assert!(spec.is_certainly_finite(&Sort::named("D")));
        assert!(spec.is_certainly_finite(&Sort::named("Pair")));
        assert!(!spec.is_certainly_finite(&Sort::named("List")));
        assert!(!spec.is_certainly_finite(&Sort::named("Undeclared")));
    }

    #[test]
    fn enumerate_constructors_of_finite_sorts() {
        let spec = spec();
        let pairs = spec.enumerate_constructors(&Sort::named("Pair")).unwrap();
        let printed: Vec<String> = pairs.iter().map(ToString::to_string).collect();
        assert_eq!(
            printed,
            vec![
                "pair(d1, false)",
                "pair(d1, true)",
                "pair(d2, false)",
                "pair(d2, true)"
            ]
        );
        assert_eq!(spec.enumerate_constructors(&Sort::Nat), None);
        assert_eq!(spec.enumerate_constructors(&Sort::named("List")), None);
    }

    #[test]
    fn rejects_duplicates_and_bad_names() {
        let mut spec = spec();
        assert_eq!(
            spec.add_enum("D", &["x"]),
            Err(SpecificationError::DuplicateSort("D".into()))
        );
        assert_eq!(
            spec.add_enum("E", &["d1"]),
            Err(SpecificationError::DuplicateConstructor("d1".into()))
        );
        assert_eq!(
            spec.add_enum("F", &["a@b"]),
            Err(SpecificationError::InvalidIdentifier("a@b".into()))
        );
        assert!(matches!(
            spec.add_sort("G", vec![Constructor::new("g", vec![Sort::named("H")])]),
            Err(SpecificationError::UndeclaredSort { .. })
        ));
    }

    #[test]
    fn identifier_rules() {
        assert!(is_valid_identifier("X"));
        assert!(is_valid_identifier("x_1'"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("1x"));
        assert!(!is_valid_identifier("X@1"));
        assert!(!is_valid_identifier("true"));
    }

    #[test]
    fn cartesian_product_of_empty_list_is_single_empty_combination() {
        let empty: Vec<Vec<i32>> = Vec::new();
        assert_eq!(cartesian_product(&empty), vec![Vec::<i32>::new()]);
        assert_eq!(
            cartesian_product(&[vec![1, 2], vec![3]]),
            vec![vec![1, 3], vec![2, 3]]
        );
    }
}
