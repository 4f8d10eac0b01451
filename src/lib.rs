pub mod config;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod number;
pub mod repl;

pub use config::Config;
pub use error::Error;
pub use evaluator::{EvalError, Evaluator};
pub use lexer::*;
pub use number::Number;

/// Evaluates an RPN expression such as `2 ( 3 4 + ) *` with the default [`Config`].
pub fn evaluate(expression: &str) -> Result<Number, Error> {
    evaluate_with(expression, &Config::default())
}

pub fn evaluate_with(expression: &str, config: &Config) -> Result<Number, Error> {
    let tokens = tokenize(expression)?;
    let value = Evaluator::new(config).evaluate(&tokens)?;
    tracing::debug!(expression, %value, "evaluated expression");
    Ok(value)
}
