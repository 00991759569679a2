use super::Address;
use crate::error;
use crate::lang::Error;
use std::convert::TryFrom;
use std::rc::Rc;

/// ## Machine values
///
/// Everything the operand stack, the dedicated stacks and memory hold.
/// Booleans are integers: -1 is true and 0 is false.

#[derive(Debug, Clone, PartialEq)]
pub enum Val {
    Undefined,
    Integer(i32),
    String(Rc<str>),
    /// Arena index and the serial number of the `DIM` that created it.
    Array(usize, usize),
    /// Routine index and address to resume at.
    Return(usize, Address),
    /// Memory and array arena lengths to release back to.
    Mark(usize, usize),
    /// A saved subroutine register.
    Register(Option<usize>),
}

impl Val {
    pub fn type_name(&self) -> &'static str {
        match self {
            Val::Undefined => "UNDEFINED",
            Val::Integer(_) => "INTEGER",
            Val::String(_) => "STRING",
            Val::Array(..) => "ARRAY",
            Val::Return(..) => "RETURN ADDRESS",
            Val::Mark(..) => "MEMORY MARK",
            Val::Register(_) => "REGISTER",
        }
    }

    fn mismatch(&self, wanted: &str) -> Error {
        error!(TypeMismatch; &format!("{} WHERE {} EXPECTED", self.type_name(), wanted))
    }
}

impl From<i32> for Val {
    fn from(n: i32) -> Val {
        Val::Integer(n)
    }
}

impl From<bool> for Val {
    fn from(b: bool) -> Val {
        Val::Integer(if b { -1 } else { 0 })
    }
}

impl From<&str> for Val {
    fn from(s: &str) -> Val {
        Val::String(s.into())
    }
}

impl From<String> for Val {
    fn from(s: String) -> Val {
        Val::String(s.into())
    }
}

impl TryFrom<Val> for i32 {
    type Error = Error;
    fn try_from(val: Val) -> std::result::Result<Self, Self::Error> {
        match val {
            Val::Integer(n) => Ok(n),
            _ => Err(val.mismatch("INTEGER")),
        }
    }
}

impl TryFrom<Val> for bool {
    type Error = Error;
    fn try_from(val: Val) -> std::result::Result<Self, Self::Error> {
        Ok(i32::try_from(val)? != 0)
    }
}

impl TryFrom<Val> for Rc<str> {
    type Error = Error;
    fn try_from(val: Val) -> std::result::Result<Self, Self::Error> {
        match val {
            Val::String(s) => Ok(s),
            _ => Err(val.mismatch("STRING")),
        }
    }
}

impl TryFrom<Val> for (usize, usize) {
    type Error = Error;
    fn try_from(val: Val) -> std::result::Result<Self, Self::Error> {
        match val {
            Val::Array(index, serial) => Ok((index, serial)),
            _ => Err(val.mismatch("ARRAY")),
        }
    }
}

impl std::fmt::Display for Val {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Val::Undefined => write!(f, "?"),
            Val::Integer(n) => write!(f, "{}", n),
            Val::String(s) => write!(f, "\"{}\"", s),
            Val::Array(index, serial) => write!(f, "ARRAY({}#{})", index, serial),
            Val::Return(routine, addr) => write!(f, "RETURN({},{})", routine, addr),
            Val::Mark(slots, arrays) => write!(f, "MARK({},{})", slots, arrays),
            Val::Register(Some(base)) => write!(f, "REG({})", base),
            Val::Register(None) => write!(f, "REG(-)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(Val::from(true), Val::Integer(-1));
        assert_eq!(i32::try_from(Val::Integer(7)).ok(), Some(7));
        assert_eq!(bool::try_from(Val::Integer(-1)).ok(), Some(true));
        let e = i32::try_from(Val::from("x")).err();
        assert_eq!(
            e.map(|e| e.to_string()),
            Some("TYPE MISMATCH; STRING WHERE INTEGER EXPECTED".to_string())
        );
    }
}
