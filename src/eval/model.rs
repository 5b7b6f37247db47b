use std::collections::HashMap;
use std::fmt;

use super::EvalError;
use crate::validate::Language;

type FunctionImpl<V> = Box<dyn Fn(&[V]) -> V>;
type PredicateImpl<V> = Box<dyn Fn(&[V]) -> bool>;

struct Implementation<F> {
    /// `None` accepts any number of arguments
    arity: Option<usize>,
    call: F,
}

impl<F> Implementation<F> {
    fn check_arity(&self, name: &str, found: usize) -> Result<(), EvalError> {
        match self.arity {
            Some(expected) if expected != found => Err(EvalError::ArityMismatch {
                name: name.to_string(),
                expected,
                found,
            }),
            _ => Ok(()),
        }
    }
}

/// A finite universe with concrete function and predicate implementations
pub struct Model<V> {
    universe: Vec<V>,
    functions: HashMap<String, Implementation<FunctionImpl<V>>>,
    predicates: HashMap<String, Implementation<PredicateImpl<V>>>,
}

impl<V> Model<V> {
    pub fn new(universe: impl IntoIterator<Item = V>) -> Self {
        Model {
            universe: universe.into_iter().collect(),
            functions: HashMap::new(),
            predicates: HashMap::new(),
        }
    }

    pub fn with_function(
        mut self,
        name: impl Into<String>,
        arity: usize,
        f: impl Fn(&[V]) -> V + 'static,
    ) -> Self {
        self.functions.insert(
            name.into(),
            Implementation {
                arity: Some(arity),
                call: Box::new(f),
            },
        );
        self
    }

    /// Function accepting any number of arguments
    pub fn with_variadic_function(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&[V]) -> V + 'static,
    ) -> Self {
        self.functions.insert(
            name.into(),
            Implementation {
                arity: None,
                call: Box::new(f),
            },
        );
        self
    }

    pub fn with_predicate(
        mut self,
        name: impl Into<String>,
        arity: usize,
        p: impl Fn(&[V]) -> bool + 'static,
    ) -> Self {
        self.predicates.insert(
            name.into(),
            Implementation {
                arity: Some(arity),
                call: Box::new(p),
            },
        );
        self
    }

    pub fn with_variadic_predicate(
        mut self,
        name: impl Into<String>,
        p: impl Fn(&[V]) -> bool + 'static,
    ) -> Self {
        self.predicates.insert(
            name.into(),
            Implementation {
                arity: None,
                call: Box::new(p),
            },
        );
        self
    }

    pub fn universe(&self) -> &[V] {
        &self.universe
    }

    /// Signature of the fixed-arity symbols this model implements, for
    /// strict validation of formulas before evaluating them
    pub fn language(&self) -> Language {
        let mut language = Language::new();
        for (name, implementation) in &self.functions {
            if let Some(arity) = implementation.arity {
                language.functions.insert(name.clone(), arity);
            }
        }
        for (name, implementation) in &self.predicates {
            if let Some(arity) = implementation.arity {
                language.predicates.insert(name.clone(), arity);
            }
        }
        language
    }

    pub(crate) fn apply_function(&self, name: &str, args: &[V]) -> Result<V, EvalError> {
        let implementation = self
            .functions
            .get(name)
            .ok_or_else(|| EvalError::MissingFunction {
                name: name.to_string(),
            })?;
        implementation.check_arity(name, args.len())?;
        Ok((implementation.call)(args))
    }

    pub(crate) fn apply_predicate(&self, name: &str, args: &[V]) -> Result<bool, EvalError> {
        let implementation = self
            .predicates
            .get(name)
            .ok_or_else(|| EvalError::MissingPredicate {
                name: name.to_string(),
            })?;
        implementation.check_arity(name, args.len())?;
        Ok((implementation.call)(args))
    }
}

impl<V: fmt::Debug> fmt::Debug for Model<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut functions: Vec<_> = self.functions.keys().collect();
        let mut predicates: Vec<_> = self.predicates.keys().collect();
        functions.sort();
        predicates.sort();
        f.debug_struct("Model")
            .field("universe", &self.universe)
            .field("functions", &functions)
            .field("predicates", &predicates)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variadic_implementations_accept_any_arity() {
        let model = Model::new(0..4u32)
            .with_variadic_function("sum", |args| args.iter().sum::<u32>() % 4)
            .with_variadic_predicate("D", |args| {
                args.iter().enumerate().all(|(i, a)| args[i + 1..].iter().all(|b| a != b))
            });
        assert_eq!(model.apply_function("sum", &[3, 2]), Ok(1));
        assert_eq!(model.apply_function("sum", &[]), Ok(0));
        assert_eq!(model.apply_predicate("D", &[1, 2, 3]), Ok(true));
        assert_eq!(model.apply_predicate("D", &[1, 2, 1]), Ok(false));
        assert_eq!(model.universe(), &[0, 1, 2, 3]);
    }

    #[test]
    fn language_lists_fixed_arity_symbols() {
        let model = Model::new([true, false])
            .with_function("neg", 1, |args| !args[0])
            .with_variadic_function("all", |args| args.iter().all(|b| *b))
            .with_predicate("T", 1, |args| args[0]);
        assert_eq!(
            model.language(),
            Language::new().with_function("neg", 1).with_predicate("T", 1)
        );
    }

    #[test]
    fn debug_lists_symbol_names() {
        let model = Model::new([1u8]).with_predicate("P", 0, |_| true);
        assert_eq!(
            format!("{:?}", model),
            r#"Model { universe: [1], functions: [], predicates: ["P"] }"#
        );
    }
}
