use std::mem;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    config::Config,
    lexer::{BinaryOp, Operator, Token, TokenKind, UnaryOp},
    number::{ArithmeticError, Number},
};

#[derive(Diagnostic, Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("empty brackets")]
    #[diagnostic(code(rpn::eval::empty_brackets))]
    EmptyBrackets {
        #[label("nothing to evaluate in here")]
        span: SourceSpan,
    },

    #[error("invalid expression in brackets: {count} values left instead of 1")]
    #[diagnostic(
        code(rpn::eval::invalid_bracket_content),
        help("a bracketed group must reduce to exactly one value")
    )]
    InvalidBracketContent {
        count: usize,
        #[label("this group")]
        span: SourceSpan,
    },

    #[error("invalid expression: {count} values left on the stack")]
    #[diagnostic(
        code(rpn::eval::invalid_expression),
        help("an expression must reduce to exactly one value")
    )]
    InvalidExpression { count: usize },

    #[error("unprocessed tokens remain")]
    #[diagnostic(code(rpn::eval::unprocessed_tokens))]
    UnprocessedTokens {
        #[label("not evaluated")]
        span: SourceSpan,
    },

    #[error("brackets nested deeper than {max} levels")]
    #[diagnostic(code(rpn::eval::nesting_too_deep))]
    NestingTooDeep {
        max: usize,
        #[label("this bracket")]
        span: SourceSpan,
    },

    #[error("not enough arguments for unary operator {op}")]
    #[diagnostic(code(rpn::eval::not_enough_unary_args))]
    NotEnoughUnaryArgs {
        op: UnaryOp,
        #[label("needs one operand")]
        span: SourceSpan,
    },

    #[error("not enough arguments for binary operator {op}")]
    #[diagnostic(code(rpn::eval::not_enough_binary_args))]
    NotEnoughBinaryArgs {
        op: BinaryOp,
        #[label("needs two operands")]
        span: SourceSpan,
    },

    #[error("division by zero")]
    #[diagnostic(code(rpn::eval::division_by_zero))]
    DivisionByZero {
        #[label("divisor is zero")]
        span: SourceSpan,
    },

    #[error("operator {op} is only defined for integers")]
    #[diagnostic(code(rpn::eval::integer_only_operator))]
    IntegerOnlyOperator {
        op: BinaryOp,
        #[label("needs integer-valued operands")]
        span: SourceSpan,
    },

    #[error("result of {op} is out of range")]
    #[diagnostic(code(rpn::eval::overflow))]
    Overflow {
        op: Operator,
        #[label("result is out of range")]
        span: SourceSpan,
    },
}

impl EvalError {
    fn binary(err: ArithmeticError, op: BinaryOp, span: SourceSpan) -> Self {
        match err {
            ArithmeticError::DivisionByZero => EvalError::DivisionByZero { span },
            ArithmeticError::IntegerOnly => EvalError::IntegerOnlyOperator { op, span },
            ArithmeticError::Overflow => EvalError::Overflow {
                op: op.into(),
                span,
            },
        }
    }
}

/// Operands of one bracket nesting level.
#[derive(Debug, Default)]
struct Frame {
    stack: Vec<Number>,
    /// Offset of the `(` that opened this frame; `None` for the outermost level.
    opened_at: Option<usize>,
}

impl Frame {
    fn group(offset: usize) -> Self {
        Self {
            stack: Vec::new(),
            opened_at: Some(offset),
        }
    }

    /// Pops `(a, b)` for `a b op`, leaving the stack untouched when fewer than two remain.
    fn pop_operands(&mut self) -> Option<(Number, Number)> {
        if self.stack.len() < 2 {
            return None;
        }
        let b = self.stack.pop()?;
        let a = self.stack.pop()?;
        Some((a, b))
    }

    /// Reduces the frame to its single value when its `)` is reached.
    fn close(self, close: &Token<'_>) -> Result<Number, EvalError> {
        let start = self.opened_at.unwrap_or(close.offset);
        let span: SourceSpan = (start, close.offset + close.slice.len() - start).into();
        match self.stack.as_slice() {
            [value] => Ok(*value),
            [] => Err(EvalError::EmptyBrackets { span }),
            values => Err(EvalError::InvalidBracketContent {
                count: values.len(),
                span,
            }),
        }
    }

    /// Reduces the frame to its single value at end of input.
    fn finish(self) -> Result<Number, EvalError> {
        match self.stack.as_slice() {
            [value] => Ok(*value),
            values => Err(EvalError::InvalidExpression {
                count: values.len(),
            }),
        }
    }
}

/// Stack machine over a token sequence.
///
/// Each `(` opens a new frame and each `)` reduces the current frame to one
/// value that is pushed onto the enclosing frame, so groups are resolved
/// depth-first, left to right, without recursion. Nesting beyond
/// [`Config::max_depth`] is rejected.
#[derive(Debug, Clone)]
pub struct Evaluator {
    max_depth: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Evaluator {
    pub fn new(config: &Config) -> Self {
        Self {
            max_depth: config.max_depth,
        }
    }

    pub fn evaluate(&self, tokens: &[Token<'_>]) -> Result<Number, EvalError> {
        let mut current = Frame::default();
        let mut parents: Vec<Frame> = Vec::new();
        let mut cursor = 0;

        while let Some(token) = tokens.get(cursor) {
            cursor += 1;
            trace!(%token, depth = parents.len(), stack = ?current.stack, "evaluating token");

            match token.kind {
                TokenKind::LeftParen => {
                    if parents.len() >= self.max_depth {
                        return Err(EvalError::NestingTooDeep {
                            max: self.max_depth,
                            span: token.span(),
                        });
                    }
                    parents.push(mem::replace(&mut current, Frame::group(token.offset)));
                }
                TokenKind::RightParen => match parents.pop() {
                    Some(parent) => {
                        let value = mem::replace(&mut current, parent).close(token)?;
                        current.stack.push(value);
                    }
                    // A `)` at the outermost level ends the expression.
                    None => {
                        let value = current.close(token)?;
                        let rest = &tokens[cursor..];
                        return match (rest.first(), rest.last()) {
                            (Some(first), Some(last)) => Err(EvalError::UnprocessedTokens {
                                span: (first.offset, last.offset + last.slice.len() - first.offset)
                                    .into(),
                            }),
                            _ => Ok(value),
                        };
                    }
                },
                TokenKind::Unary(op) => {
                    let operand = current
                        .stack
                        .pop()
                        .ok_or(EvalError::NotEnoughUnaryArgs {
                            op,
                            span: token.span(),
                        })?;
                    let value = operand.apply_unary(op).map_err(|_| EvalError::Overflow {
                        op: op.into(),
                        span: token.span(),
                    })?;
                    current.stack.push(value);
                }
                TokenKind::Binary(op) => {
                    let (a, b) = current
                        .pop_operands()
                        .ok_or(EvalError::NotEnoughBinaryArgs {
                            op,
                            span: token.span(),
                        })?;
                    let value = a
                        .apply_binary(op, b)
                        .map_err(|err| EvalError::binary(err, op, token.span()))?;
                    current.stack.push(value);
                }
                TokenKind::Number(n) => current.stack.push(n),
            }
        }

        // Groups left open by a caller-built token sequence fold into their parents.
        while let Some(parent) = parents.pop() {
            let value = mem::replace(&mut current, parent).finish()?;
            current.stack.push(value);
        }

        let result = current.finish()?;
        debug!(%result, tokens = tokens.len(), "evaluated tokens");
        Ok(result)
    }
}
