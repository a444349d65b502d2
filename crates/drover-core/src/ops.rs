//! Operator semantics over [`Value`]s.
//!
//! Arithmetic coerces aggressively: numeric strings and bools count as
//! numbers, and integer results stay integers only when both operands were
//! integers. Division always produces a float. Equality compares rendered
//! strings, so `"42" == 42` holds. Ordering comparisons try numbers first
//! and fall back to string ordering.

use std::cmp::Ordering;

use crate::ast::{BinaryOp, UnaryOp};
use crate::error::ScriptError;
use crate::value::Value;

/// Upper bound on the bytes a string repetition may produce.
const MAX_REPEAT_BYTES: usize = 1 << 20;

pub fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, ScriptError> {
    match op {
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub => subtract(left, right),
        BinaryOp::Mul => multiply(left, right),
        BinaryOp::Div => divide(left, right),
        BinaryOp::Mod => modulo(left, right),
        BinaryOp::Eq => Ok(Value::Bool(left.as_string() == right.as_string())),
        BinaryOp::NotEq => Ok(Value::Bool(left.as_string() != right.as_string())),
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::LtEq | BinaryOp::GtEq => {
            Ok(Value::Bool(compare(op, left, right)))
        }
        BinaryOp::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        BinaryOp::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
    }
}

pub fn apply_unary(op: UnaryOp, operand: &Value) -> Result<Value, ScriptError> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
        UnaryOp::Neg => match operand {
            // Negation keeps integer operands integral.
            Value::Int(n) => Ok(n
                .checked_neg()
                .map(Value::Int)
                .unwrap_or(Value::Float(-(*n as f64)))),
            _ => operand
                .as_number()
                .map(|x| Value::Float(-x))
                .ok_or_else(|| ScriptError::Type {
                    message: format!("cannot negate {}", operand.type_name()),
                }),
        },
    }
}

fn add(left: &Value, right: &Value) -> Result<Value, ScriptError> {
    match (left.as_number(), right.as_number()) {
        (Some(l), Some(r)) => {
            if let (Value::Int(a), Value::Int(b)) = (left, right) {
                if let Some(sum) = a.checked_add(*b) {
                    return Ok(Value::Int(sum));
                }
            }
            Ok(Value::Float(l + r))
        }
        // Anything that does not add numerically concatenates.
        _ => Ok(Value::Str(format!("{}{}", left, right))),
    }
}

fn subtract(left: &Value, right: &Value) -> Result<Value, ScriptError> {
    match (left.as_number(), right.as_number()) {
        (Some(l), Some(r)) => {
            if let (Value::Int(a), Value::Int(b)) = (left, right) {
                if let Some(difference) = a.checked_sub(*b) {
                    return Ok(Value::Int(difference));
                }
            }
            Ok(Value::Float(l - r))
        }
        _ => Err(ScriptError::Type {
            message: format!(
                "cannot subtract {} from {}",
                right.type_name(),
                left.type_name()
            ),
        }),
    }
}

fn multiply(left: &Value, right: &Value) -> Result<Value, ScriptError> {
    // String repetition wins over numeric coercion: "3" * 2 is "33", not 6.
    if let Value::Str(s) = left {
        if let Some(count) = repeat_count(right) {
            return repeat(s, count);
        }
    }
    if let Value::Str(s) = right {
        if let Some(count) = repeat_count(left) {
            return repeat(s, count);
        }
    }
    match (left.as_number(), right.as_number()) {
        (Some(l), Some(r)) => {
            if let (Value::Int(a), Value::Int(b)) = (left, right) {
                if let Some(product) = a.checked_mul(*b) {
                    return Ok(Value::Int(product));
                }
            }
            Ok(Value::Float(l * r))
        }
        _ => Err(ScriptError::Type {
            message: format!(
                "cannot multiply {} by {}",
                left.type_name(),
                right.type_name()
            ),
        }),
    }
}

/// Repetition counts must be real numbers; numeric strings do not qualify.
fn repeat_count(value: &Value) -> Option<i64> {
    match value {
        Value::Int(n) => Some(*n),
        Value::Float(x) => Some(*x as i64),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn repeat(s: &str, count: i64) -> Result<Value, ScriptError> {
    if count <= 0 {
        return Ok(Value::Str(String::new()));
    }
    let count = count as usize;
    if s.len().saturating_mul(count) > MAX_REPEAT_BYTES {
        return Err(ScriptError::Value {
            message: "string repetition result is too large".to_string(),
        });
    }
    Ok(Value::Str(s.repeat(count)))
}

fn divide(left: &Value, right: &Value) -> Result<Value, ScriptError> {
    let divisor = right.as_number().ok_or_else(|| ScriptError::Type {
        message: format!(
            "cannot divide {} by {}",
            left.type_name(),
            right.type_name()
        ),
    })?;
    if divisor == 0.0 {
        return Err(ScriptError::DivisionByZero);
    }
    let dividend = left.as_number().ok_or_else(|| ScriptError::Type {
        message: format!(
            "cannot divide {} by {}",
            left.type_name(),
            right.type_name()
        ),
    })?;
    // Division always yields a float, even for exact integer quotients.
    Ok(Value::Float(dividend / divisor))
}

fn modulo(left: &Value, right: &Value) -> Result<Value, ScriptError> {
    let type_error = || ScriptError::Type {
        message: format!(
            "cannot take {} modulo {}",
            left.type_name(),
            right.type_name()
        ),
    };
    let l = left.as_number().ok_or_else(type_error)?;
    let r = right.as_number().ok_or_else(type_error)?;
    if r == 0.0 {
        return Err(ScriptError::DivisionByZero);
    }
    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        // i64::MIN % -1 overflows checked_rem; the result is 0.
        let rem = a.checked_rem(*b).unwrap_or(0);
        // The result takes the sign of the divisor.
        let rem = if rem != 0 && (rem < 0) != (*b < 0) {
            rem + b
        } else {
            rem
        };
        return Ok(Value::Int(rem));
    }
    Ok(Value::Float(l - (l / r).floor() * r))
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> bool {
    match (left.as_number(), right.as_number()) {
        (Some(l), Some(r)) => ordering_holds(op, l.partial_cmp(&r)),
        _ => ordering_holds(op, left.as_string().partial_cmp(&right.as_string())),
    }
}

fn ordering_holds(op: BinaryOp, ordering: Option<Ordering>) -> bool {
    let Some(ordering) = ordering else {
        // Unordered operands (NaN) satisfy nothing.
        return false;
    };
    match op {
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::LtEq => ordering != Ordering::Greater,
        BinaryOp::GtEq => ordering != Ordering::Less,
        _ => false,
    }
}
