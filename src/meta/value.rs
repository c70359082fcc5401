//! Operator semantics over compile-time [`Value`]s.
//!
//! Arithmetic runs in `f64` (every arithmetic result is a double), shifts in `i64`. Strings only take
//! part in comparisons.

use eon_core::lang::kinds::OpKind;

use crate::ast::Value;

/// Why an operator could not be applied to its operands.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error("operator '{op}' is not supported in compile-time evaluation")]
    Unsupported { op: &'static str },
    #[error("operator '{op}' cannot take a {found} operand")]
    Operand { op: &'static str, found: &'static str },
    #[error("cannot compare {left} with {right}")]
    Incomparable { left: &'static str, right: &'static str },
    #[error("operator '{op}' does not produce a finite number")]
    NonFinite { op: &'static str },
    #[error("shift amount {0} is out of range")]
    ShiftRange(i64),
    #[error("operator '{op}' expects {expected} operands, found {found}")]
    Arity {
        op: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Apply a side-effect free operator to already evaluated operands.
pub fn apply(op: OpKind, args: &[Value]) -> Result<Value, ValueError> {
    let info = op.info();
    if !info.const_eval || info.is_assign || is_step(op) {
        return Err(ValueError::Unsupported { op: info.name });
    }
    if args.len() != info.arity {
        return Err(ValueError::Arity {
            op: info.name,
            expected: info.arity,
            found: args.len(),
        });
    }
    match op {
        OpKind::Negative => finite(op, -number(op, &args[0])?),
        OpKind::Positive => Ok(Value::Double(number(op, &args[0])?)),
        OpKind::Not => Ok(Value::Bool(!args[0].is_truthy())),
        OpKind::Add | OpKind::Sub | OpKind::Mul | OpKind::Div => {
            let (l, r) = (number(op, &args[0])?, number(op, &args[1])?);
            let v = match op {
                OpKind::Add => l + r,
                OpKind::Sub => l - r,
                OpKind::Mul => l * r,
                _ => l / r,
            };
            finite(op, v)
        }
        OpKind::Lsh | OpKind::Rsh => {
            let (l, r) = (integer(op, &args[0])?, integer(op, &args[1])?);
            let amount = u32::try_from(r).ok().filter(|a| *a < 64).ok_or(ValueError::ShiftRange(r))?;
            Ok(Value::Int(if op == OpKind::Lsh { l << amount } else { l >> amount }))
        }
        OpKind::Greater | OpKind::Less | OpKind::GreaterEq | OpKind::LessEq => {
            let ord = compare(&args[0], &args[1])?;
            let holds = match op {
                OpKind::Greater => ord.is_gt(),
                OpKind::Less => ord.is_lt(),
                OpKind::GreaterEq => ord.is_ge(),
                _ => ord.is_le(),
            };
            Ok(Value::Bool(holds))
        }
        OpKind::Eq => Ok(Value::Bool(compare(&args[0], &args[1])?.is_eq())),
        OpKind::Ineq => Ok(Value::Bool(compare(&args[0], &args[1])?.is_ne())),
        OpKind::And => Ok(Value::Bool(args[0].is_truthy() && args[1].is_truthy())),
        OpKind::Or => Ok(Value::Bool(args[0].is_truthy() || args[1].is_truthy())),
        _ => Err(ValueError::Unsupported { op: info.name }),
    }
}

/// `++`/`--` in either position.
pub fn is_step(op: OpKind) -> bool {
    matches!(op, OpKind::PreInc | OpKind::PreDec | OpKind::PostInc | OpKind::PostDec)
}

/// Value after one `++` (`delta = 1`) or `--` (`delta = -1`).
pub fn step(op: OpKind, value: &Value, delta: i64) -> Result<Value, ValueError> {
    match value {
        Value::Int(i) => Ok(Value::Int(i.wrapping_add(delta))),
        Value::Double(d) => finite(op, d + delta as f64),
        other => Err(ValueError::Operand {
            op: op.info().name,
            found: other.type_name(),
        }),
    }
}

/// Doubles are exported as source literals, which have no spelling for infinities or NaN.
fn finite(op: OpKind, v: f64) -> Result<Value, ValueError> {
    if v.is_finite() {
        Ok(Value::Double(v))
    } else {
        Err(ValueError::NonFinite { op: op.info().name })
    }
}

fn number(op: OpKind, v: &Value) -> Result<f64, ValueError> {
    v.as_f64().ok_or(ValueError::Operand {
        op: op.info().name,
        found: v.type_name(),
    })
}

fn integer(op: OpKind, v: &Value) -> Result<i64, ValueError> {
    v.as_i64().ok_or(ValueError::Operand {
        op: op.info().name,
        found: v.type_name(),
    })
}

fn compare(l: &Value, r: &Value) -> Result<std::cmp::Ordering, ValueError> {
    match (l, r) {
        (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
        _ => match (l.as_f64(), r.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).ok_or(ValueError::Incomparable {
                left: l.type_name(),
                right: r.type_name(),
            }),
            _ => Err(ValueError::Incomparable {
                left: l.type_name(),
                right: r.type_name(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_is_double() {
        assert_eq!(apply(OpKind::Mul, &[Value::Int(2), Value::Int(7)]), Ok(Value::Double(14.0)));
        assert_eq!(apply(OpKind::Div, &[Value::Int(5), Value::Int(2)]), Ok(Value::Double(2.5)));
        assert_eq!(apply(OpKind::Negative, &[Value::Int(3)]), Ok(Value::Double(-3.0)));
    }

    #[test]
    fn test_non_finite_results_are_rejected() {
        assert_eq!(
            apply(OpKind::Div, &[Value::Int(1), Value::Int(0)]),
            Err(ValueError::NonFinite { op: "division" })
        );
        assert!(apply(OpKind::Div, &[Value::Double(0.0), Value::Int(0)]).is_err());
        assert!(apply(OpKind::Mul, &[Value::Double(f64::MAX), Value::Int(2)]).is_err());
    }

    #[test]
    fn test_shifts_are_integral() {
        assert_eq!(apply(OpKind::Lsh, &[Value::Int(1), Value::Int(4)]), Ok(Value::Int(16)));
        assert_eq!(
            apply(OpKind::Lsh, &[Value::Int(1), Value::Int(64)]),
            Err(ValueError::ShiftRange(64))
        );
    }

    #[test]
    fn test_comparisons() {
        let a = Value::Str("a".into());
        assert_eq!(apply(OpKind::Eq, &[a.clone(), a.clone()]), Ok(Value::Bool(true)));
        assert_eq!(apply(OpKind::Less, &[Value::Int(1), Value::Double(1.5)]), Ok(Value::Bool(true)));
        assert!(matches!(
            apply(OpKind::Eq, &[a, Value::Int(1)]),
            Err(ValueError::Incomparable { left: "string", right: "int" })
        ));
    }

    #[test]
    fn test_unsupported_operators_are_reported() {
        let err = apply(OpKind::Mod, &[Value::Int(5), Value::Int(2)]).unwrap_err();
        assert_eq!(err.to_string(), "operator 'modulus' is not supported in compile-time evaluation");
        assert!(apply(OpKind::Assign, &[Value::Int(1), Value::Int(2)]).is_err());
    }

    #[test]
    fn test_string_arithmetic_is_rejected() {
        let err = apply(OpKind::Add, &[Value::Str("a".into()), Value::Int(1)]).unwrap_err();
        assert_eq!(err.to_string(), "operator 'addition' cannot take a string operand");
    }

    #[test]
    fn test_step() {
        assert_eq!(step(OpKind::PostInc, &Value::Int(1), 1), Ok(Value::Int(2)));
        assert_eq!(step(OpKind::PreDec, &Value::Double(1.5), -1), Ok(Value::Double(0.5)));
        assert!(step(OpKind::PreInc, &Value::Bool(true), 1).is_err());
    }
}
