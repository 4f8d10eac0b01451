use miette::Diagnostic;
use thiserror::Error;

use crate::{evaluator::EvalError, lexer::LexError};

/// Any failure of [`crate::evaluate`].
#[derive(Diagnostic, Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Eval(#[from] EvalError),
}
