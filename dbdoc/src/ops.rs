//! Ordering and arithmetic on values.
//!
//! Numbers compare by numeric value regardless of their discriminant, with NaN above every other number. Values of
//! other types compare structurally if their types agree and by type id otherwise. All numbers share the rank of
//! `Byte` there, so they sort as one block between `Boolean` and `Char`.
//!
//! Arithmetic is defined on numbers only; any other operand yields `Null`. The result takes the widest type of both
//! operands. Integer results which do not fit that type are returned as `Decimal` instead. Division never truncates:
//! it yields a `Decimal` if either operand is one and a `Double` otherwise.
//!
//! Mixed operations with a `Single` or `Double` result are computed in `f64`, all other mixed operations in
//! `Decimal`. The operators cannot fail, so results beyond the range of `Decimal` and division of a `Decimal` by
//! zero yield `Null`.

use crate::collation::{Binary, Collation};
use crate::types::DocType;
use crate::value::{Number, Value};
use crate::varint::VarInt;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::convert::TryFrom;
use std::ops::{Add, Div, Mul, Sub};

impl Value {

    /// Compares with ordinal string ordering.
    pub fn compare(&self, other: &Value) -> Ordering {
        self.compare_with(other, &Binary)
    }

    /// Compares using `collation` for all strings in the tree.
    pub fn compare_with(&self, other: &Value, collation: &dyn Collation) -> Ordering {
        if let (Some(a), Some(b)) = (self.number(), other.number()) {
            return compare_numbers(a, b);
        }
        match (self, other) {
            (Value::Null, Value::Null)                 => Ordering::Equal,
            (Value::Boolean(a), Value::Boolean(b))     => a.cmp(b),
            (Value::Char(a), Value::Char(b))           => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b))   => a.cmp(b),
            (Value::Guid(a), Value::Guid(b))           => a.cmp(b),
            (Value::String(a), Value::String(b))       => collation.compare(a, b),
            (Value::Blob(a), Value::Blob(b))           => a.cmp(b),
            (Value::Array(a), Value::Array(b))         => {
                for (x, y) in a.iter().zip(b.iter()) {
                    let o = x.compare_with(y, collation);
                    if o != Ordering::Equal {
                        return o;
                    }
                }
                a.len().cmp(&b.len())
            },
            (Value::Document(a), Value::Document(b))   => {
                for ((ka, va), (kb, vb)) in a.iter().zip(b.iter()) {
                    let o = ka.cmp(kb).then_with(|| va.compare_with(vb, collation));
                    if o != Ordering::Equal {
                        return o;
                    }
                }
                a.len().cmp(&b.len())
            },
            _ => self.doc_type().sort_rank().cmp(&other.doc_type().sort_rank()),
        }
    }

}

fn compare_numbers(a: Number, b: Number) -> Ordering {
    match (a, b) {
        (Number::Int(x), Number::Int(y))         => x.cmp(&y),
        (Number::Decimal(x), Number::Decimal(y)) => x.cmp(&y),
        (Number::Int(x), Number::Decimal(y))     => compare_int_decimal(x, y),
        (Number::Decimal(x), Number::Int(y))     => compare_int_decimal(y, x).reverse(),
        (Number::Int(x), _)                      => compare_int_float(x, float(b)),
        (_, Number::Int(y))                      => compare_int_float(y, float(a)).reverse(),
        (Number::Decimal(x), _)                  => compare_decimal_float(x, float(b)),
        (_, Number::Decimal(y))                  => compare_decimal_float(y, float(a)).reverse(),
        _                                        => compare_floats(float(a), float(b)),
    }
}

fn float(n: Number) -> f64 {
    n.to_f64().unwrap_or(f64::NAN)
}

/// NaN sorts above every other number and equals itself. Both zeros are equal.
fn compare_floats(x: f64, y: f64) -> Ordering {
    match (x.is_nan(), y.is_nan()) {
        (true, true)   => Ordering::Equal,
        (true, false)  => Ordering::Greater,
        (false, true)  => Ordering::Less,
        (false, false) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
    }
}

fn compare_int_decimal(x: i128, y: Decimal) -> Ordering {
    match Decimal::try_from_i128_with_scale(x, 0) {
        Ok(d)  => d.cmp(&y),
        // beyond the range of any decimal
        Err(_) => x.cmp(&0),
    }
}

/// Exact: compares the integral part first and the fraction on a tie.
fn compare_int_float(x: i128, f: f64) -> Ordering {
    const LIMIT: f64 = i128::MAX as f64;
    if f.is_nan() || f >= LIMIT {
        return Ordering::Less;
    }
    if f < -LIMIT {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    x.cmp(&(whole as i128)).then_with(|| compare_floats(0.0, f - whole))
}

/// Integral parts compare exactly, fractions at the 28 digit precision of `Decimal`.
fn compare_decimal_float(x: Decimal, f: f64) -> Ordering {
    if f.is_nan() || f == f64::INFINITY {
        return Ordering::Less;
    }
    if f == f64::NEG_INFINITY {
        return Ordering::Greater;
    }
    let whole = x.trunc();
    let integral = match Number::Decimal(whole).to_i128() {
        Some(i) => i,
        None    => return compare_floats(float(Number::Decimal(x)), f),
    };
    let f_whole = f.trunc();
    compare_int_float(integral, f_whole).then_with(|| {
        let fraction = f - f_whole;
        match Number::Double(fraction).to_decimal() {
            Some(d) if !d.is_zero() || fraction == 0.0 => (x - whole).cmp(&d),
            // fractions below decimal precision
            _ => (x - whole).cmp(&Decimal::ZERO).then_with(|| compare_floats(0.0, fraction)),
        }
    })
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Value) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Value) -> Ordering {
        self.compare(other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {

    fn int32(self, a: i32, b: i32) -> Option<i32> {
        match self {
            Op::Add => a.checked_add(b),
            Op::Sub => a.checked_sub(b),
            Op::Mul => a.checked_mul(b),
            Op::Div => None,
        }
    }

    fn int64(self, a: i64, b: i64) -> Option<i64> {
        match self {
            Op::Add => a.checked_add(b),
            Op::Sub => a.checked_sub(b),
            Op::Mul => a.checked_mul(b),
            Op::Div => None,
        }
    }

    fn float(self, a: f64, b: f64) -> f64 {
        match self {
            Op::Add => a + b,
            Op::Sub => a - b,
            Op::Mul => a * b,
            Op::Div => a / b,
        }
    }

    fn decimal(self, a: Decimal, b: Decimal) -> Option<Decimal> {
        match self {
            Op::Add => a.checked_add(b),
            Op::Sub => a.checked_sub(b),
            Op::Mul => a.checked_mul(b),
            Op::Div => a.checked_div(b),
        }
    }

}

fn arithmetic(op: Op, lhs: &Value, rhs: &Value) -> Value {
    let (l, r) = match (lhs.number(), rhs.number()) {
        (Some(l), Some(r)) => (l, r),
        _                  => return Value::Null,
    };

    if op == Op::Div {
        return match (lhs, rhs) {
            (Value::Decimal(_), _) | (_, Value::Decimal(_)) => in_decimal(op, l, r, DocType::Decimal),
            _ => Value::Double(op.float(l.to_f64().unwrap_or(f64::NAN), r.to_f64().unwrap_or(f64::NAN))),
        };
    }

    match (lhs, rhs) {
        (Value::Int32(a), Value::Int32(b)) => if let Some(v) = op.int32(*a, *b) {
            return Value::Int32(v);
        },
        (Value::Int64(a), Value::Int64(b)) => if let Some(v) = op.int64(*a, *b) {
            return Value::Int64(v);
        },
        (Value::Double(a), Value::Double(b)) => return Value::Double(op.float(*a, *b)),
        (Value::Decimal(a), Value::Decimal(b)) => return op.decimal(*a, *b).map(Value::Decimal).unwrap_or(Value::Null),
        _ => {},
    }

    let (lt, rt) = (lhs.doc_type(), rhs.doc_type());
    let target = if lt.numeric_rank() >= rt.numeric_rank() { lt } else { rt };
    match target {
        DocType::Single | DocType::Double => {
            let v = op.float(l.to_f64().unwrap_or(f64::NAN), r.to_f64().unwrap_or(f64::NAN));
            if target == DocType::Single { Value::Single(v as f32) } else { Value::Double(v) }
        },
        _ => in_decimal(op, l, r, target),
    }
}

fn in_decimal(op: Op, l: Number, r: Number, target: DocType) -> Value {
    match (l.to_decimal(), r.to_decimal()) {
        (Some(a), Some(b)) => op.decimal(a, b).map(|d| narrow(d, target)).unwrap_or(Value::Null),
        _                  => Value::Null,
    }
}

/// Converts `d` into an integer of type `target`, falling back to `Decimal` if it does not fit.
fn narrow(d: Decimal, target: DocType) -> Value {
    let narrowed = Number::Decimal(d).to_i128().and_then(|i| Some(match target {
        DocType::Byte   => Value::Byte(u8::try_from(i).ok()?),
        DocType::SByte  => Value::SByte(i8::try_from(i).ok()?),
        DocType::Int16  => Value::Int16(i16::try_from(i).ok()?),
        DocType::UInt16 => Value::UInt16(u16::try_from(i).ok()?),
        DocType::Int32  => Value::Int32(i32::try_from(i).ok()?),
        DocType::UInt32 => Value::UInt32(u32::try_from(i).ok()?),
        DocType::Int64  => Value::Int64(i64::try_from(i).ok()?),
        DocType::UInt64 => Value::UInt64(u64::try_from(i).ok()?),
        DocType::VarInt => Value::VarInt(u64::try_from(i).ok().and_then(|v| VarInt::new(v).ok())?),
        _               => return None,
    }));
    narrowed.unwrap_or(Value::Decimal(d))
}

macro_rules! binary_ops {
    ($($trait:ident, $method:ident => $op:expr;)*) => {
        $(
            impl $trait<&Value> for &Value {
                type Output = Value;

                fn $method(self, rhs: &Value) -> Value {
                    arithmetic($op, self, rhs)
                }
            }

            impl $trait for Value {
                type Output = Value;

                fn $method(self, rhs: Value) -> Value {
                    arithmetic($op, &self, &rhs)
                }
            }
        )*
    };
}

binary_ops! {
    Add, add => Op::Add;
    Sub, sub => Op::Sub;
    Mul, mul => Op::Mul;
    Div, div => Op::Div;
}
