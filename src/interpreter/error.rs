use crate::expression::error::EvaluationError;
use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum RenderError {
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error("Inheritance Cycle: {}", .chain.join(" -> "))]
    InheritanceCycle { chain: Vec<CompactString> },
    #[error("Inheritance Too Deep: {depth} of {limit}")]
    InheritanceTooDeep { depth: usize, limit: usize },
}

impl RenderError {
    pub fn code(&self) -> &'static str {
        match self {
            RenderError::Evaluation(error) => error.code(),
            RenderError::InheritanceCycle { .. } => "RE001",
            RenderError::InheritanceTooDeep { .. } => "RE002",
        }
    }
}
