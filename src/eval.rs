//! Expression evaluator.
//!
//! Evaluates parsed filter ASTs against a [`VariantCall`].

use regex::Regex;

use crate::call::VariantCall;
use crate::error::{IonVcfError, Result};
use crate::filter::{AccessPart, BinaryOp, Expr, UnaryOp};
use crate::func::FuncAnnotation;
use crate::value::Value;

/// Evaluate a filter expression against a call.
pub fn evaluate(expr: &Expr, call: &VariantCall) -> Result<Value> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::String(s) => Ok(Value::String(s.clone())),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Var(parts) => resolve_variable(parts, call),
        Expr::Binary(left, op, right) => evaluate_binary(left, op, right, call),
        Expr::Unary(UnaryOp::Not, inner) => {
            let val = evaluate(inner, call)?;
            Ok(Value::Bool(!value_to_bool(&val)))
        }
        Expr::Exists(parts) => {
            let value = resolve_variable(parts, call)?;
            Ok(Value::Bool(!value.is_missing()))
        }
    }
}

/// Evaluate an expression down to a yes/no answer.
pub fn matches(expr: &Expr, call: &VariantCall) -> Result<bool> {
    Ok(value_to_bool(&evaluate(expr, call)?))
}

fn resolve_variable(parts: &[AccessPart], call: &VariantCall) -> Result<Value> {
    let Some(AccessPart::Field(name)) = parts.first() else {
        return Err(IonVcfError::EvaluationError(
            "Variable must start with a field name".to_string(),
        ));
    };

    if name == "FUNC" {
        return Ok(resolve_func(&parts[1..], call));
    }

    let mut value = call.get(name);
    for part in &parts[1..] {
        value = match (part, value) {
            (AccessPart::Index(i), Value::Array(arr)) => {
                arr.into_iter().nth(*i).unwrap_or(Value::Missing)
            }
            // A single value behaves as a one-element list.
            (AccessPart::Index(0), single) if !single.is_missing() => single,
            (AccessPart::Wildcard, v) => v,
            _ => Value::Missing,
        };
    }
    Ok(value)
}

/// `FUNC[i].field` and `FUNC[*].field` over every annotation of the row.
fn resolve_func(parts: &[AccessPart], call: &VariantCall) -> Value {
    let field_of = |ann: &FuncAnnotation, field: &str| -> Value {
        ann.get(field).map(Value::from).unwrap_or(Value::Missing)
    };

    match parts {
        [AccessPart::Index(i), AccessPart::Field(field)] => call
            .annotations
            .get(*i)
            .map(|ann| field_of(ann, field))
            .unwrap_or(Value::Missing),
        [AccessPart::Wildcard, AccessPart::Field(field)] => {
            let values: Vec<Value> = call
                .annotations
                .iter()
                .map(|ann| field_of(ann, field))
                .filter(|v| !v.is_missing())
                .collect();
            if values.is_empty() {
                Value::Missing
            } else {
                Value::Array(values)
            }
        }
        [] if !call.annotations.is_empty() => Value::Bool(true),
        _ => Value::Missing,
    }
}

fn evaluate_binary(left: &Expr, op: &BinaryOp, right: &Expr, call: &VariantCall) -> Result<Value> {
    // Short-circuit logic before touching the right side.
    match op {
        BinaryOp::And => {
            let result = value_to_bool(&evaluate(left, call)?) && value_to_bool(&evaluate(right, call)?);
            return Ok(Value::Bool(result));
        }
        BinaryOp::Or => {
            let result = value_to_bool(&evaluate(left, call)?) || value_to_bool(&evaluate(right, call)?);
            return Ok(Value::Bool(result));
        }
        _ => {}
    }

    let left_val = evaluate(left, call)?;
    let right_val = evaluate(right, call)?;

    // Lists (wildcards, multi-valued fields) match when any element does,
    // except != which must hold for every element.
    if let Value::Array(ref arr) = left_val {
        let result = match op {
            BinaryOp::NotEq => arr.iter().all(|v| !values_equal(v, &right_val)),
            _ => {
                let mut any = false;
                for v in arr {
                    if compare(v, op, &right_val)? {
                        any = true;
                        break;
                    }
                }
                any
            }
        };
        return Ok(Value::Bool(result));
    }

    Ok(Value::Bool(compare(&left_val, op, &right_val)?))
}

fn compare(left: &Value, op: &BinaryOp, right: &Value) -> Result<bool> {
    match op {
        BinaryOp::Eq => Ok(values_equal(left, right)),
        BinaryOp::NotEq => Ok(!values_equal(left, right)),
        BinaryOp::Contains => Ok(value_contains(left, right)),
        BinaryOp::Matches => value_matches(left, right),
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::LtEq | BinaryOp::GtEq => {
            compare_ordered(left, op, right)
        }
        BinaryOp::And | BinaryOp::Or => Err(IonVcfError::EvaluationError(format!(
            "Unexpected logical operator {op:?} in comparison"
        ))),
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(l), Value::String(r)) => l == r,
        (Value::Number(l), Value::Number(r)) => (l - r).abs() < f64::EPSILON,
        (Value::Bool(l), Value::Bool(r)) => l == r,
        (Value::Missing, Value::Missing) => true,
        (Value::String(s), Value::Number(n)) | (Value::Number(n), Value::String(s)) => s
            .parse::<f64>()
            .map(|sn| (sn - n).abs() < f64::EPSILON)
            .unwrap_or(false),
        _ => false,
    }
}

fn value_contains(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(l), Value::String(r)) => l.contains(r.as_str()),
        _ => false,
    }
}

fn value_matches(left: &Value, right: &Value) -> Result<bool> {
    let Value::String(pattern) = right else {
        return Err(IonVcfError::TypeMismatch {
            left: left.type_name().to_string(),
            right: right.type_name().to_string(),
        });
    };
    let re = Regex::new(pattern)
        .map_err(|e| IonVcfError::EvaluationError(format!("Bad pattern '{pattern}': {e}")))?;
    Ok(match left {
        Value::String(s) => re.is_match(s),
        Value::Number(n) => re.is_match(&n.to_string()),
        _ => false,
    })
}

fn compare_ordered(left: &Value, op: &BinaryOp, right: &Value) -> Result<bool> {
    if left.is_missing() || right.is_missing() {
        return Ok(false);
    }

    let ordering = match (left.as_number(), right.as_number()) {
        (Some(l), Some(r)) => l.partial_cmp(&r),
        _ => match (left, right) {
            (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
            _ => {
                return Err(IonVcfError::TypeMismatch {
                    left: left.type_name().to_string(),
                    right: right.type_name().to_string(),
                });
            }
        },
    };

    let Some(ordering) = ordering else {
        return Ok(false);
    };
    Ok(match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::LtEq => ordering.is_le(),
        BinaryOp::GtEq => ordering.is_ge(),
        _ => false,
    })
}

fn value_to_bool(val: &Value) -> bool {
    match val {
        Value::Bool(b) => *b,
        Value::Missing => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => *n != 0.0,
        Value::Array(arr) => !arr.is_empty(),
    }
}
