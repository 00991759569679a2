use super::Val;
use crate::error;
use crate::lang::Error;
use std::convert::TryFrom;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// Built-in functions that depend only on their arguments.
pub struct Function {}

fn int(val: Val) -> Result<i32> {
    i32::try_from(val)
}

fn string(val: Val) -> Result<Rc<str>> {
    Rc::<str>::try_from(val)
}

fn illegal(name: &str, n: i32) -> Error {
    error!(IllegalFunctionCall; &format!("{}({})", name, n))
}

impl Function {
    pub fn abs(val: Val) -> Result<Val> {
        let n = int(val)?;
        match n.checked_abs() {
            Some(n) => Ok(Val::Integer(n)),
            None => Err(error!(Overflow; &format!("ABS({})", n))),
        }
    }

    pub fn sgn(val: Val) -> Result<Val> {
        Ok(Val::Integer(int(val)?.signum()))
    }

    pub fn max(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::Integer(int(lhs)?.max(int(rhs)?)))
    }

    pub fn min(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::Integer(int(lhs)?.min(int(rhs)?)))
    }

    /// Rounded square root.
    pub fn sqrt(val: Val) -> Result<Val> {
        let n = int(val)?;
        if n < 0 {
            return Err(illegal("SQRT", n));
        }
        Ok(Val::Integer((n as f64).sqrt().round() as i32))
    }

    /// `SIN(degrees, mult)` is the sine scaled by `mult` and rounded.
    pub fn sin(angle: Val, mult: Val) -> Result<Val> {
        Function::trig(angle, mult, f64::sin)
    }

    pub fn cos(angle: Val, mult: Val) -> Result<Val> {
        Function::trig(angle, mult, f64::cos)
    }

    fn trig(angle: Val, mult: Val, f: fn(f64) -> f64) -> Result<Val> {
        let radians = (int(angle)? as f64).to_radians();
        Ok(Val::Integer((f(radians) * int(mult)? as f64).round() as i32))
    }

    /// Components are clamped to 0..=255.
    pub fn rgb(r: Val, g: Val, b: Val) -> Result<Val> {
        let component = |val: Val| -> Result<i32> { Ok(int(val)?.max(0).min(255)) };
        Ok(Val::Integer(
            (component(r)? << 16) | (component(g)? << 8) | component(b)?,
        ))
    }

    pub fn len(val: Val) -> Result<Val> {
        Ok(Val::Integer(string(val)?.chars().count() as i32))
    }

    pub fn str(val: Val) -> Result<Val> {
        Ok(Val::from(int(val)?.to_string()))
    }

    /// Leading integer of the string, or 0.
    pub fn val(val: Val) -> Result<Val> {
        let s = string(val)?;
        let s = s.trim_start();
        let end = s
            .char_indices()
            .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+'))))
            .map_or(s.len(), |(i, _)| i);
        Ok(Val::Integer(s[..end].parse().unwrap_or(0)))
    }

    pub fn chr(val: Val) -> Result<Val> {
        let n = int(val)?;
        match u32::try_from(n).ok().and_then(std::char::from_u32) {
            Some(ch) => Ok(Val::from(ch.to_string())),
            None => Err(illegal("CHR$", n)),
        }
    }

    /// Code of the first character, -1 for the empty string.
    pub fn asc(val: Val) -> Result<Val> {
        Ok(Val::Integer(
            string(val)?.chars().next().map_or(-1, |ch| ch as i32),
        ))
    }

    /// `MID$(s, start, len)` with a 1-based start, clipped to the string.
    pub fn mid(val: Val, start: Val, len: Val) -> Result<Val> {
        let s = string(val)?;
        let start = int(start)?;
        let len = int(len)?;
        if start < 1 {
            return Err(illegal("MID$ START", start));
        }
        if len < 0 {
            return Err(illegal("MID$ LENGTH", len));
        }
        let mid: String = s
            .chars()
            .skip(start as usize - 1)
            .take(len as usize)
            .collect();
        Ok(Val::from(mid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric() {
        assert_eq!(Function::sqrt(Val::Integer(10)).ok(), Some(Val::Integer(3)));
        assert!(Function::sqrt(Val::Integer(-1)).is_err());
        assert_eq!(Function::sin(Val::Integer(90), Val::Integer(100)).ok(), Some(Val::Integer(100)));
        assert_eq!(Function::cos(Val::Integer(60), Val::Integer(10)).ok(), Some(Val::Integer(5)));
        assert_eq!(
            Function::rgb(Val::Integer(255), Val::Integer(0), Val::Integer(300)).ok(),
            Some(Val::Integer(0xff00ff))
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(Function::val(Val::from(" -42abc")).ok(), Some(Val::Integer(-42)));
        assert_eq!(Function::val(Val::from("abc")).ok(), Some(Val::Integer(0)));
        assert_eq!(
            Function::mid(Val::from("turtle"), Val::Integer(2), Val::Integer(3)).ok(),
            Some(Val::from("urt"))
        );
        assert_eq!(
            Function::mid(Val::from("turtle"), Val::Integer(5), Val::Integer(9)).ok(),
            Some(Val::from("le"))
        );
        assert_eq!(Function::asc(Val::from("")).ok(), Some(Val::Integer(-1)));
        assert_eq!(Function::chr(Val::Integer(65)).ok(), Some(Val::from("A")));
        assert_eq!(Function::len(Val::from("héllo")).ok(), Some(Val::Integer(5)));
    }
}
