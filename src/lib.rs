pub mod expression;
pub mod interpreter;
pub mod statement;
pub mod template;
pub mod value;
