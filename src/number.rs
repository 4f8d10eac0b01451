use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::lexer::{BinaryOp, UnaryOp};

/// Significant digits used when displaying a non-integral float.
const SIGNIFICANT_DIGITS: usize = 6;

/// A scalar produced by the calculator.
///
/// Literals without a decimal point are `Integer`, literals with one are `Float`.
/// Every operator keeps `Integer` when both operands are `Integer`, except `/`
/// which always yields `Float`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

/// Why an operator could not be applied to its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("operator requires integer operands")]
    IntegerOnly,
    #[error("result out of range")]
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid numeric literal `{0}`")]
pub struct ParseNumberError(pub String);

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Integer(n) => n as f64,
            Number::Float(x) => x,
        }
    }

    /// True for integers and for finite floats with no fractional part, such as `5.0`.
    pub fn is_integer_valued(self) -> bool {
        match self {
            Number::Integer(_) => true,
            Number::Float(x) => x.is_finite() && x.fract() == 0.0,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Integer(n) => n == 0,
            Number::Float(x) => x == 0.0,
        }
    }

    pub fn apply_unary(self, op: UnaryOp) -> Result<Number, ArithmeticError> {
        match (op, self) {
            (UnaryOp::Plus, n) => Ok(n),
            (UnaryOp::Negate, Number::Integer(n)) => n
                .checked_neg()
                .map(Number::Integer)
                .ok_or(ArithmeticError::Overflow),
            (UnaryOp::Negate, Number::Float(x)) => Ok(Number::Float(-x)),
        }
    }

    /// Computes `self op rhs`, where `self` is the earlier operand on the stack.
    pub fn apply_binary(self, op: BinaryOp, rhs: Number) -> Result<Number, ArithmeticError> {
        match op {
            BinaryOp::Add => checked(self, rhs, i64::checked_add, |a, b| a + b),
            BinaryOp::Sub => checked(self, rhs, i64::checked_sub, |a, b| a - b),
            BinaryOp::Mul => checked(self, rhs, i64::checked_mul, |a, b| a * b),
            BinaryOp::Div => {
                if rhs.is_zero() {
                    return Err(ArithmeticError::DivisionByZero);
                }
                Ok(Number::Float(self.as_f64() / rhs.as_f64()))
            }
            BinaryOp::Pow => pow(self, rhs),
            BinaryOp::FloorDiv => integral(self, rhs, floor_div, |a, b| (a / b).floor()),
            BinaryOp::Mod => integral(self, rhs, floor_mod, floor_mod_f64),
        }
    }
}

fn checked(
    a: Number,
    b: Number,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Number, ArithmeticError> {
    match (a, b) {
        (Number::Integer(a), Number::Integer(b)) => int_op(a, b)
            .map(Number::Integer)
            .ok_or(ArithmeticError::Overflow),
        _ => Ok(Number::Float(float_op(a.as_f64(), b.as_f64()))),
    }
}

fn pow(base: Number, exponent: Number) -> Result<Number, ArithmeticError> {
    match (base, exponent) {
        (Number::Integer(b), Number::Integer(e)) if e >= 0 => {
            let e = u32::try_from(e).map_err(|_| ArithmeticError::Overflow)?;
            b.checked_pow(e)
                .map(Number::Integer)
                .ok_or(ArithmeticError::Overflow)
        }
        _ => {
            let (b, e) = (base.as_f64(), exponent.as_f64());
            if b == 0.0 && e < 0.0 {
                return Err(ArithmeticError::DivisionByZero);
            }
            // NaN from a negative base and fractional exponent passes through.
            let result = b.powf(e);
            if result.is_infinite() && b.is_finite() && e.is_finite() {
                return Err(ArithmeticError::Overflow);
            }
            Ok(Number::Float(result))
        }
    }
}

/// Shared checks of `//` and `%`: a zero divisor is reported before a non-integral operand.
fn integral(
    a: Number,
    b: Number,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Number, ArithmeticError> {
    if b.is_zero() {
        return Err(ArithmeticError::DivisionByZero);
    }
    if !a.is_integer_valued() || !b.is_integer_valued() {
        return Err(ArithmeticError::IntegerOnly);
    }
    checked(a, b, int_op, float_op)
}

/// Quotient rounded towards negative infinity. `b` must be non-zero.
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && (a < 0) != (b < 0) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

/// Remainder carrying the sign of the divisor. `b` must be non-zero.
fn floor_mod(a: i64, b: i64) -> Option<i64> {
    let r = a.wrapping_rem(b);
    if r != 0 && (r < 0) != (b < 0) {
        Some(r + b)
    } else {
        Some(r)
    }
}

fn floor_mod_f64(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r != 0.0 && (r < 0.0) != (b < 0.0) {
        r + b
    } else {
        r
    }
}

impl FromStr for Number {
    type Err = ParseNumberError;

    /// Parses an optionally signed literal: `42`, `-7`, `3.14`, `.5`, `+2.`.
    fn from_str(literal: &str) -> Result<Self, Self::Err> {
        let err = || ParseNumberError(literal.to_string());
        let digits = literal.trim_start_matches(['+', '-']);
        if digits.is_empty() || literal.len() - digits.len() > 1 {
            return Err(err());
        }

        if literal.contains('.') {
            literal.parse::<f64>().map(Number::Float).map_err(|_| err())
        } else {
            literal.parse::<i64>().map(Number::Integer).map_err(|_| err())
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Integer(n) => write!(f, "{n}"),
            Number::Float(x) if x == 0.0 => f.write_str("0"),
            Number::Float(x) if self.is_integer_valued() => write!(f, "{x:.0}"),
            Number::Float(x) => write_general(f, x),
        }
    }
}

/// Writes `x` the way C's `%g` does with six significant digits.
fn write_general(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        return f.write_str("nan");
    }
    if x.is_infinite() {
        return f.write_str(if x > 0.0 { "inf" } else { "-inf" });
    }

    // The exponent is taken after rounding so 999999.5 switches to scientific form.
    let scientific = format!("{:.*e}", SIGNIFICANT_DIGITS - 1, x);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return f.write_str(&scientific);
    };
    let exponent: i32 = exponent.parse().map_err(|_| fmt::Error)?;

    if exponent < -4 || exponent >= SIGNIFICANT_DIGITS as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        write!(f, "{}e{sign}{:02}", trim_fraction(mantissa), exponent.abs())
    } else {
        let decimals = (SIGNIFICANT_DIGITS as i32 - 1 - exponent) as usize;
        let fixed = format!("{:.*}", decimals, x);
        f.write_str(trim_fraction(&fixed))
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}
