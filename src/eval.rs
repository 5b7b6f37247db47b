use std::collections::HashMap;
use std::fmt::Debug;

use miette::Diagnostic;
use slog::{debug, o, Logger};
use thiserror::Error;

use crate::ast::{Node, NodeKind, Reference};

pub mod model;

pub use model::Model;

/// Result of evaluating a node: an element of the universe for terms, a
/// truth value for formulas. Propositional variables are bound to truth
/// values in the valuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value<V> {
    Element(V),
    Truth(bool),
}

/// Assignment of values to free variable names
#[derive(Debug, Clone)]
pub struct Valuation<V> {
    variables: HashMap<String, Value<V>>,
}

impl<V> Default for Valuation<V> {
    fn default() -> Self {
        Valuation {
            variables: HashMap::new(),
        }
    }
}

impl<V> Valuation<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(mut self, name: impl Into<String>, element: V) -> Self {
        self.insert(name, Value::Element(element));
        self
    }

    pub fn with_truth(mut self, name: impl Into<String>, truth: bool) -> Self {
        self.insert(name, Value::Truth(truth));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value<V>) {
        self.variables.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value<V>> {
        self.variables.get(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Diagnostic, Error)]
pub enum EvalError {
    #[error("Variable '{name}' has no value in the valuation")]
    #[diagnostic(code(formula::unbound_variable))]
    UnboundVariable { name: String },

    #[error("Variable '{name}' refers to binder {index} which is not in scope")]
    #[diagnostic(code(formula::dangling_reference))]
    DanglingReference { name: String, index: usize },

    #[error("Model has no function '{name}'")]
    #[diagnostic(code(formula::missing_function))]
    MissingFunction { name: String },

    #[error("Model has no predicate '{name}'")]
    #[diagnostic(code(formula::missing_predicate))]
    MissingPredicate { name: String },

    #[error("Model implements '{name}' with {expected} arguments, called with {found}")]
    #[diagnostic(code(formula::model_arity))]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Expected {expected}, but '{subtree}' evaluates to something else")]
    #[diagnostic(code(formula::type_mismatch))]
    TypeMismatch {
        expected: &'static str,
        subtree: String,
    },
}

/// Evaluates nodes against a model and a valuation.
///
/// Quantifiers range over the model's (finite) universe: each candidate
/// element is pushed as a binder frame and bound variables resolve by
/// their de Bruijn index into that frame stack.
pub struct Evaluator<'m, V> {
    model: &'m Model<V>,
    valuation: &'m Valuation<V>,
    logger: Logger,
}

impl<'m, V: Clone + PartialEq + Debug> Evaluator<'m, V> {
    pub fn new(model: &'m Model<V>, valuation: &'m Valuation<V>) -> Self {
        Evaluator {
            model,
            valuation,
            logger: Logger::root(slog::Discard, o!()),
        }
    }

    pub fn with_logger(mut self, logger: &Logger) -> Self {
        self.logger = logger.new(o!("component" => "eval"));
        self
    }

    pub fn value(&self, node: &Node) -> Result<Value<V>, EvalError> {
        self.eval(node, &mut Vec::new())
    }

    /// Evaluate a formula
    pub fn truth(&self, node: &Node) -> Result<bool, EvalError> {
        self.truth_in(node, &mut Vec::new())
    }

    /// Evaluate a term
    pub fn element(&self, node: &Node) -> Result<V, EvalError> {
        self.element_in(node, &mut Vec::new())
    }

    fn truth_in(&self, node: &Node, frames: &mut Vec<V>) -> Result<bool, EvalError> {
        match self.eval(node, frames)? {
            Value::Truth(b) => Ok(b),
            Value::Element(_) => Err(EvalError::TypeMismatch {
                expected: "a truth value",
                subtree: node.unparse(),
            }),
        }
    }

    fn element_in(&self, node: &Node, frames: &mut Vec<V>) -> Result<V, EvalError> {
        match self.eval(node, frames)? {
            Value::Element(e) => Ok(e),
            Value::Truth(_) => Err(EvalError::TypeMismatch {
                expected: "an element of the universe",
                subtree: node.unparse(),
            }),
        }
    }

    fn arguments(&self, node: &Node, frames: &mut Vec<V>) -> Result<Vec<V>, EvalError> {
        node.children()
            .iter()
            .map(|arg| self.element_in(arg, frames))
            .collect()
    }

    fn eval(&self, node: &Node, frames: &mut Vec<V>) -> Result<Value<V>, EvalError> {
        debug!(self.logger, "visit node"; "node" => %node, "depth" => frames.len());

        let value = match node.kind() {
            NodeKind::Variable(Reference::Free(name)) => self
                .valuation
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UnboundVariable { name: name.clone() })?,
            NodeKind::Variable(Reference::Bound(index)) => frames
                .len()
                .checked_sub(index + 1)
                .and_then(|i| frames.get(i))
                .cloned()
                .map(Value::Element)
                .ok_or_else(|| EvalError::DanglingReference {
                    name: node.token().text().to_string(),
                    index: *index,
                })?,
            NodeKind::Function => {
                let args = self.arguments(node, frames)?;
                Value::Element(self.model.apply_function(node.token().text(), &args)?)
            }
            NodeKind::Predicate => {
                let args = self.arguments(node, frames)?;
                Value::Truth(self.model.apply_predicate(node.token().text(), &args)?)
            }
            NodeKind::And | NodeKind::Or | NodeKind::Implication => {
                let (lhs, rhs) = (&node.children()[0], &node.children()[1]);
                let lhs = self.truth_in(lhs, frames)?;
                let rhs = self.truth_in(rhs, frames)?;
                Value::Truth(match node.kind() {
                    NodeKind::And => lhs && rhs,
                    NodeKind::Or => lhs || rhs,
                    _ => !lhs || rhs,
                })
            }
            NodeKind::Not => Value::Truth(!self.truth_in(&node.children()[0], frames)?),
            NodeKind::Equality | NodeKind::Inequality => {
                let lhs = self.eval(&node.children()[0], frames)?;
                let rhs = self.eval(&node.children()[1], frames)?;
                let equal = lhs == rhs;
                Value::Truth(if matches!(node.kind(), NodeKind::Equality) {
                    equal
                } else {
                    !equal
                })
            }
            NodeKind::ForAll(_) => Value::Truth(self.quantify(&node.children()[0], frames, true)?),
            NodeKind::Exists(_) => Value::Truth(self.quantify(&node.children()[0], frames, false)?),
        };

        debug!(self.logger, "evaluated"; "node" => %node, "value" => ?value);
        Ok(value)
    }

    /// Fold `body` over the universe with AND (`universal`) or OR,
    /// stopping at the first element that decides the result.
    fn quantify(&self, body: &Node, frames: &mut Vec<V>, universal: bool) -> Result<bool, EvalError> {
        for element in self.model.universe() {
            frames.push(element.clone());
            let holds = self.truth_in(body, frames);
            frames.pop();
            if holds? != universal {
                return Ok(!universal);
            }
        }
        Ok(universal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::*;
    use crate::parser::parse;

    fn parity_model() -> Model<u8> {
        Model::new([0, 1])
            .with_function("add", 2, |args| (args[0] + args[1]) % 2)
            .with_function("one", 0, |_| 1)
            .with_predicate("P", 3, |args| (args[0] + args[1]) % 2 == args[2])
    }

    #[test]
    fn evaluates_predicate_over_function_terms() {
        let model = parity_model();
        let valuation = Valuation::new().with_element("x", 0);
        let evaluator = Evaluator::new(&model, &valuation);

        // P(x, 1, add(x, 1)), with the numeral as a nullary function
        let node = pred(
            "P",
            vec![
                var("x"),
                func("one", vec![]),
                func("add", vec![var("x"), func("one", vec![])]),
            ],
        );
        assert_eq!(evaluator.truth(&node), Ok(true));
        assert_eq!(evaluator.value(&node), Ok(Value::Truth(true)));
    }

    #[test]
    fn connectives_follow_two_valued_logic() {
        let model: Model<()> = Model::new([]);
        for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
            let valuation = Valuation::new().with_truth("a", a).with_truth("b", b);
            let evaluator = Evaluator::new(&model, &valuation);
            let truth = |input: &str| evaluator.truth(&parse(input).unwrap()).unwrap();
            assert_eq!(truth("a ^ b"), a && b);
            assert_eq!(truth("a v b"), a || b);
            assert_eq!(truth("a -> b"), !a || b);
            assert_eq!(truth("~a"), !a);
            assert!(truth("(a -> b) v (b -> a)"));
        }
    }

    #[test]
    fn equality_compares_term_values() {
        let model = parity_model();
        let valuation = Valuation::new().with_element("x", 1).with_element("y", 0);
        let evaluator = Evaluator::new(&model, &valuation);
        assert_eq!(evaluator.truth(&parse("add(x, x) == y").unwrap()), Ok(true));
        assert_eq!(evaluator.truth(&parse("x != y").unwrap()), Ok(true));
        assert_eq!(evaluator.truth(&parse("x == y").unwrap()), Ok(false));
    }

    #[test]
    fn quantifiers_range_over_the_universe() {
        let model = parity_model();
        let valuation = Valuation::new();
        let evaluator = Evaluator::new(&model, &valuation);
        let truth = |input: &str| evaluator.truth(&parse(input).unwrap());

        assert_eq!(truth("forall x. exists y. add(x, y) == one()"), Ok(true));
        assert_eq!(truth("exists x. forall y. add(x, y) == y"), Ok(true));
        assert_eq!(truth("forall x. forall y. add(x, y) == x"), Ok(false));
        assert_eq!(truth("forall x. forall y. P(x, y, add(x, y))"), Ok(true));
    }

    #[test]
    fn shadowed_binder_uses_innermost_element() {
        let model = parity_model();
        let valuation = Valuation::new();
        let evaluator = Evaluator::new(&model, &valuation);
        // inner x is always equal to itself regardless of the outer x
        let node = parse("forall x. exists x. x == add(x, add(one(), one()))").unwrap();
        assert_eq!(evaluator.truth(&node), Ok(true));
    }

    #[test]
    fn empty_universe() {
        let model: Model<u8> = Model::new([]);
        let valuation = Valuation::new();
        let evaluator = Evaluator::new(&model, &valuation);
        assert_eq!(evaluator.truth(&parse("forall x. x != x").unwrap()), Ok(true));
        assert_eq!(evaluator.truth(&parse("exists x. x == x").unwrap()), Ok(false));
    }

    #[test]
    fn missing_values_are_errors() {
        let model = parity_model();
        let valuation = Valuation::new();
        let evaluator = Evaluator::new(&model, &valuation);

        assert_eq!(
            evaluator.truth(&parse("x == x").unwrap()),
            Err(EvalError::UnboundVariable {
                name: "x".to_string()
            })
        );
        assert_eq!(
            evaluator.truth(&parse("Q(one())").unwrap()),
            Err(EvalError::MissingPredicate {
                name: "Q".to_string()
            })
        );
        assert_eq!(
            evaluator.element(&parse("mul(one(), one())").unwrap()),
            Err(EvalError::MissingFunction {
                name: "mul".to_string()
            })
        );
        assert_eq!(
            evaluator.element(&parse("add(one())").unwrap()),
            Err(EvalError::ArityMismatch {
                name: "add".to_string(),
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn detached_body_has_dangling_reference() {
        let model = parity_model();
        let valuation = Valuation::new().with_element("x", 0);
        let evaluator = Evaluator::new(&model, &valuation);
        let node = parse("forall x. x == x").unwrap();
        let body = node.child().unwrap();
        assert!(matches!(
            evaluator.truth(body),
            Err(EvalError::DanglingReference { index: 0, .. })
        ));
    }

    #[test]
    fn operand_kinds_are_checked() {
        let model = parity_model();
        let valuation = Valuation::new().with_element("x", 0).with_truth("p", true);
        let evaluator = Evaluator::new(&model, &valuation);
        assert!(matches!(
            evaluator.truth(&parse("x ^ p").unwrap()),
            Err(EvalError::TypeMismatch { .. })
        ));
        assert!(matches!(
            evaluator.element(&parse("add(p, x)").unwrap()),
            Err(EvalError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn logs_through_supplied_logger() {
        let model = parity_model();
        let valuation = Valuation::new().with_element("x", 1);
        let logger = Logger::root(slog::Discard, o!("test" => "eval"));
        let evaluator = Evaluator::new(&model, &valuation).with_logger(&logger);
        assert_eq!(evaluator.element(&parse("add(x, one())").unwrap()), Ok(0));
    }
}
