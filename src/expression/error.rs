use crate::value::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum EvaluationError {
    #[error("Non-Number {{Unary}}: {0}")]
    NonNumeric(Value),
    #[error("Non-Numbers {{Binary}}: [{0} , {1}]")]
    NonNumerics(Value, Value),
    #[error("Non-Numbers/Non-Strings {{Binary}}: [{0} , {1}]")]
    NonAddable(Value, Value),
    #[error("Non-Comparable {{Binary}}: [{0} , {1}]")]
    NonComparable(Value, Value),
    #[error("Division By Zero: {0}")]
    DivisionByZero(Value),
}

impl EvaluationError {
    pub fn code(&self) -> &'static str {
        match self {
            EvaluationError::NonNumeric(_) => "EV001",
            EvaluationError::NonNumerics(_, _) => "EV002",
            EvaluationError::NonAddable(_, _) => "EV003",
            EvaluationError::NonComparable(_, _) => "EV004",
            EvaluationError::DivisionByZero(_) => "EV005",
        }
    }
}
