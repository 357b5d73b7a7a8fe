pub mod error;

use crate::value::Value;
use compact_str::{CompactString, CompactStringExt};
use error::EvaluationError;
use std::cmp::Ordering;

/// Name resolution used by the evaluator. The render context is the only implementor in the crate.
pub trait Bindings {
    fn find_value(&self, name: &str) -> Option<Value>;
}

#[derive(Debug, Clone, Copy)]
pub enum PrefixOperator {
    Not,
    Minus,
}

#[derive(Debug, Clone, Copy)]
pub enum InfixOperator {
    Add,
    Subtract,
    Multiply,
    Modulo,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

#[derive(Debug, Clone, Copy)]
pub enum ShortCircuitOperator {
    And,
    Or,
}

#[derive(Debug, Clone)]
pub enum Expression {
    Constant(Value),
    Variable(CompactString),
    Attribute {
        object: Box<Expression>,
        name: CompactString,
    },
    Prefix {
        operator: PrefixOperator,
        rhs: Box<Expression>,
    },
    Infix {
        operator: InfixOperator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    ShortCircuit {
        operator: ShortCircuitOperator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    List(Vec<Expression>),
    /// `<expr> is defined`: true when the variable or field is bound at all, even to `Empty`.
    IsDefined(Box<Expression>),
}

impl Expression {
    pub fn constant(value: impl Into<Value>) -> Self {
        Expression::Constant(value.into())
    }

    pub fn variable(name: &str) -> Self {
        Expression::Variable(name.into())
    }

    pub fn attribute(object: Expression, name: &str) -> Self {
        Expression::Attribute {
            object: Box::new(object),
            name: name.into(),
        }
    }

    pub fn prefix(operator: PrefixOperator, rhs: Expression) -> Self {
        Expression::Prefix {
            operator,
            rhs: Box::new(rhs),
        }
    }

    pub fn infix(operator: InfixOperator, lhs: Expression, rhs: Expression) -> Self {
        Expression::Infix {
            operator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn short_circuit(operator: ShortCircuitOperator, lhs: Expression, rhs: Expression) -> Self {
        Expression::ShortCircuit {
            operator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn is_defined(inner: Expression) -> Self {
        Expression::IsDefined(Box::new(inner))
    }

    pub fn evaluate(&self, bindings: &dyn Bindings) -> Result<Value, EvaluationError> {
        let result = match self {
            Expression::Constant(value) => value.clone(),
            Expression::Variable(name) => bindings.find_value(name).unwrap_or_default(),
            Expression::Attribute { object, name } => object.evaluate(bindings)?.subscript(name),
            Expression::Prefix { operator, rhs } => {
                let rhs = rhs.evaluate(bindings)?;
                evaluate_prefix(*operator, &rhs)?
            }
            Expression::Infix { operator, lhs, rhs } => {
                let lhs = lhs.evaluate(bindings)?;
                let rhs = rhs.evaluate(bindings)?;
                evaluate_infix(*operator, &lhs, &rhs)?
            }
            Expression::ShortCircuit { operator, lhs, rhs } => {
                let lhs = lhs.evaluate(bindings)?;
                match operator {
                    ShortCircuitOperator::And if !lhs.is_truthy() => lhs,
                    ShortCircuitOperator::Or if lhs.is_truthy() => lhs,
                    _ => rhs.evaluate(bindings)?,
                }
            }
            Expression::List(items) => Value::list(
                items
                    .iter()
                    .map(|item| item.evaluate(bindings))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Expression::IsDefined(inner) => Value::Bool(Self::is_bound(inner, bindings)?),
        };
        Ok(result)
    }

    fn is_bound(expr: &Expression, bindings: &dyn Bindings) -> Result<bool, EvaluationError> {
        match expr {
            Expression::Variable(name) => Ok(bindings.find_value(name).is_some()),
            Expression::Attribute { object, name } => {
                if !Self::is_bound(object, bindings)? {
                    return Ok(false);
                }
                Ok(object.evaluate(bindings)?.has_field(name))
            }
            _ => Ok(true),
        }
    }
}

fn evaluate_prefix(operator: PrefixOperator, rhs: &Value) -> Result<Value, EvaluationError> {
    match (operator, rhs) {
        (PrefixOperator::Not, v) => Ok(Value::Bool(!v.is_truthy())),
        (PrefixOperator::Minus, Value::Int(v)) => Ok(Value::Int(v.wrapping_neg())),
        (PrefixOperator::Minus, Value::Float(v)) => Ok(Value::Float(-v)),
        (PrefixOperator::Minus, v) => Err(EvaluationError::NonNumeric(v.clone())),
    }
}

fn evaluate_infix(
    operator: InfixOperator,
    lhs: &Value,
    rhs: &Value,
) -> Result<Value, EvaluationError> {
    match operator {
        InfixOperator::Add => add(lhs, rhs),
        InfixOperator::Subtract => arithmetic(lhs, rhs, i64::wrapping_sub, |l, r| l - r),
        InfixOperator::Multiply => arithmetic(lhs, rhs, i64::wrapping_mul, |l, r| l * r),
        InfixOperator::Modulo => match (lhs, rhs) {
            (Value::Int(_), Value::Int(0)) => Err(EvaluationError::DivisionByZero(lhs.clone())),
            _ => arithmetic(lhs, rhs, i64::wrapping_rem, |l, r| l % r),
        },
        InfixOperator::Equal => Ok(Value::Bool(lhs.is_equal(rhs))),
        InfixOperator::NotEqual => Ok(Value::Bool(!lhs.is_equal(rhs))),
        InfixOperator::Less => compare(lhs, rhs).map(|o| Value::Bool(o.is_lt())),
        InfixOperator::LessEqual => compare(lhs, rhs).map(|o| Value::Bool(o.is_le())),
        InfixOperator::Greater => compare(lhs, rhs).map(|o| Value::Bool(o.is_gt())),
        InfixOperator::GreaterEqual => compare(lhs, rhs).map(|o| Value::Bool(o.is_ge())),
    }
}

fn add(lhs: &Value, rhs: &Value) -> Result<Value, EvaluationError> {
    match (lhs, rhs) {
        (Value::String(l), Value::String(r)) => Ok(Value::String([l, r].concat_compact())),
        (Value::List(l), Value::List(r)) => Ok(Value::list(l.iter().chain(r.iter()))),
        (l, r) => arithmetic(l, r, i64::wrapping_add, |l, r| l + r)
            .map_err(|_| EvaluationError::NonAddable(l.clone(), r.clone())),
    }
}

fn arithmetic(
    lhs: &Value,
    rhs: &Value,
    int_op: fn(i64, i64) -> i64,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, EvaluationError> {
    match (lhs, rhs) {
        (Value::Int(l), Value::Int(r)) => Ok(Value::Int(int_op(*l, *r))),
        (Value::Float(l), Value::Float(r)) => Ok(Value::Float(float_op(*l, *r))),
        (Value::Int(l), Value::Float(r)) => Ok(Value::Float(float_op(*l as f64, *r))),
        (Value::Float(l), Value::Int(r)) => Ok(Value::Float(float_op(*l, *r as f64))),
        (l, r) => Err(EvaluationError::NonNumerics(l.clone(), r.clone())),
    }
}

fn compare(lhs: &Value, rhs: &Value) -> Result<Ordering, EvaluationError> {
    let ordering = match (lhs, rhs) {
        (Value::Int(l), Value::Int(r)) => Some(l.cmp(r)),
        (Value::Float(l), Value::Float(r)) => l.partial_cmp(r),
        (Value::Int(l), Value::Float(r)) => (*l as f64).partial_cmp(r),
        (Value::Float(l), Value::Int(r)) => l.partial_cmp(&(*r as f64)),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        _ => None,
    };
    ordering.ok_or_else(|| EvaluationError::NonComparable(lhs.clone(), rhs.clone()))
}
