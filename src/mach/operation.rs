use super::Val;
use crate::error;
use crate::lang::Error;
use std::cmp::Ordering;

type Result<T> = std::result::Result<T, Error>;

fn mismatch(lhs: &Val, rhs: &Val) -> Error {
    error!(TypeMismatch; &format!("{} AND {}", lhs.type_name(), rhs.type_name()))
}

fn overflow(lhs: i32, op: &str, rhs: i32) -> Error {
    error!(Overflow; &format!("{} {} {}", lhs, op, rhs))
}

/// Integer, boolean and string operators of the expression stack.
pub struct Operation {}

impl Operation {
    pub fn negate(val: Val) -> Result<Val> {
        match val {
            Val::Integer(n) => match n.checked_neg() {
                Some(n) => Ok(Val::Integer(n)),
                None => Err(error!(Overflow; &format!("-{}", n))),
            },
            _ => Err(error!(TypeMismatch; &format!("NEGATE {}", val.type_name()))),
        }
    }

    pub fn not(val: Val) -> Result<Val> {
        match val {
            Val::Integer(n) => Ok(Val::Integer(!n)),
            _ => Err(error!(TypeMismatch; &format!("NOT {}", val.type_name()))),
        }
    }

    pub fn sum(lhs: Val, rhs: Val) -> Result<Val> {
        match (&lhs, &rhs) {
            (Val::Integer(l), Val::Integer(r)) => match l.checked_add(*r) {
                Some(n) => Ok(Val::Integer(n)),
                None => Err(overflow(*l, "+", *r)),
            },
            (Val::String(l), Val::String(r)) => {
                let mut s = String::with_capacity(l.len() + r.len());
                s.push_str(l);
                s.push_str(r);
                Ok(Val::from(s))
            }
            _ => Err(mismatch(&lhs, &rhs)),
        }
    }

    pub fn subtract(lhs: Val, rhs: Val) -> Result<Val> {
        Operation::integers(lhs, rhs, "-", |l, r| l.checked_sub(r))
    }

    pub fn multiply(lhs: Val, rhs: Val) -> Result<Val> {
        Operation::integers(lhs, rhs, "*", |l, r| l.checked_mul(r))
    }

    /// Rounded half away from zero.
    pub fn divide(lhs: Val, rhs: Val) -> Result<Val> {
        Operation::dividing(lhs, rhs, "/", |l, r| {
            let q = (l as f64 / r as f64).round();
            if q >= i32::MIN as f64 && q <= i32::MAX as f64 {
                Some(q as i32)
            } else {
                None
            }
        })
    }

    pub fn div(lhs: Val, rhs: Val) -> Result<Val> {
        Operation::dividing(lhs, rhs, "DIV", |l, r| l.checked_div(r))
    }

    pub fn modulo(lhs: Val, rhs: Val) -> Result<Val> {
        Operation::dividing(lhs, rhs, "MOD", |l, r| l.checked_rem(r))
    }

    pub fn and(lhs: Val, rhs: Val) -> Result<Val> {
        Operation::integers(lhs, rhs, "AND", |l, r| Some(l & r))
    }

    pub fn or(lhs: Val, rhs: Val) -> Result<Val> {
        Operation::integers(lhs, rhs, "OR", |l, r| Some(l | r))
    }

    pub fn eor(lhs: Val, rhs: Val) -> Result<Val> {
        Operation::integers(lhs, rhs, "EOR", |l, r| Some(l ^ r))
    }

    /// Compare two integers or two strings, pushing -1 or 0.
    pub fn compare(lhs: Val, rhs: Val, test: fn(Ordering) -> bool) -> Result<Val> {
        let ordering = match (&lhs, &rhs) {
            (Val::Integer(l), Val::Integer(r)) => l.cmp(r),
            (Val::String(l), Val::String(r)) => l.cmp(r),
            _ => return Err(mismatch(&lhs, &rhs)),
        };
        Ok(Val::from(test(ordering)))
    }

    fn integers(lhs: Val, rhs: Val, op: &str, f: impl Fn(i32, i32) -> Option<i32>) -> Result<Val> {
        match (&lhs, &rhs) {
            (Val::Integer(l), Val::Integer(r)) => match f(*l, *r) {
                Some(n) => Ok(Val::Integer(n)),
                None => Err(overflow(*l, op, *r)),
            },
            _ => Err(mismatch(&lhs, &rhs)),
        }
    }

    fn dividing(lhs: Val, rhs: Val, op: &str, f: impl Fn(i32, i32) -> Option<i32>) -> Result<Val> {
        if rhs == Val::Integer(0) {
            return Err(error!(DivisionByZero));
        }
        Operation::integers(lhs, rhs, op, f)
    }
}
