use super::Address;
use crate::lang::{Builtin, TurtleAttribute};
use std::rc::Rc;

/// ## Pcode instruction set
///
/// The turtle machine evaluates expressions on an operand stack.
/// Variables are addressed by slot: globals by absolute slot and
/// locals by routine register plus offset.
///
/// For example: `x% = 3 * y%` in the main program compiles to
/// `[LDIN(3), LDVG(1), MUL, STVG(0)]`
///
/// See <https://en.wikipedia.org/wiki/Reverse_Polish_notation>

#[derive(Clone, PartialEq)]
pub enum Opcode {
    // *** Memory and literals
    /// Reserve the global slots of the main program.
    Alloc(usize),
    /// Push an integer literal.
    Ldin(i32),
    /// Push a string literal.
    Cstr(Rc<str>),
    /// Pop a length then that many character codes and push the string.
    Mkst,
    /// Load and store a global slot.
    Ldvg(Address),
    Stvg(Address),
    /// Load and store slot `offset` of the frame `routine`'s register points at.
    Ldvr(usize, Address),
    Stvr(usize, Address),
    /// Load and store a turtle attribute held by the machine.
    Ldtu(TurtleAttribute),
    Sttu(TurtleAttribute),
    /// Pop a size and push a new array of that many zeros or empty strings.
    Dim(bool),
    /// Pop an index and an array, push the element.
    Lelt,
    /// Pop a value, an index and an array, store the element.
    Selt,

    // *** Branch control
    /// Unconditional branch to Address.
    Jump(Address),
    /// Pop stack and branch to Address if zero.
    IfNo(Address),
    Halt,

    // *** Subroutines
    /// Push a memory mark on the operand stack.
    Mark,
    /// Push a memory mark on the memory control stack.
    MarkMc,
    /// Pop a memory mark from the operand stack and release memory above it.
    Release,
    ReleaseMc,
    /// Save the register of a routine on the operand stack.
    SaveReg(usize),
    /// Save the register of a routine on the subroutine register stack.
    SaveRegRs(usize),
    LoadReg(usize),
    LoadRegRs(usize),
    /// Pop `params` arguments into a new frame of `locals` slots and
    /// enter `routine`, pushing the return address on the operand stack.
    Call {
        routine: usize,
        params: usize,
        locals: usize,
    },
    /// As `Call` with the return address on the return stack.
    CallRs {
        routine: usize,
        params: usize,
        locals: usize,
    },
    Ret,
    RetRs,
    /// Pop the function result into the result register.
    StoreResult,
    /// Push and clear the result register.
    LoadResult,

    // *** Expression operations
    Neg,
    Add,
    Sub,
    Mul,
    /// Division rounded to the nearest integer.
    Divr,
    /// Division truncated toward zero.
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Not,
    And,
    Or,
    Eor,

    // *** Built-in commands and functions
    Builtin(Builtin),
}

impl std::fmt::Debug for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string())
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Opcode::*;
        match self {
            Alloc(n) => write!(f, "ALLOC({})", n),
            Ldin(n) => write!(f, "LDIN({})", n),
            Cstr(s) => write!(f, "CSTR({:?})", s),
            Mkst => write!(f, "MKST"),
            Ldvg(a) => write!(f, "LDVG({})", a),
            Stvg(a) => write!(f, "STVG({})", a),
            Ldvr(r, a) => write!(f, "LDVR({},{})", r, a),
            Stvr(r, a) => write!(f, "STVR({},{})", r, a),
            Ldtu(t) => write!(f, "LDTU({})", t),
            Sttu(t) => write!(f, "STTU({})", t),
            Dim(false) => write!(f, "DIM"),
            Dim(true) => write!(f, "DIM$"),
            Lelt => write!(f, "LELT"),
            Selt => write!(f, "SELT"),

            Jump(a) => write!(f, "JUMP({})", a),
            IfNo(a) => write!(f, "IFNO({})", a),
            Halt => write!(f, "HALT"),

            Mark => write!(f, "MARK"),
            MarkMc => write!(f, "MARKMC"),
            Release => write!(f, "RELEASE"),
            ReleaseMc => write!(f, "RELEASEMC"),
            SaveReg(r) => write!(f, "SVREG({})", r),
            SaveRegRs(r) => write!(f, "SVREGRS({})", r),
            LoadReg(r) => write!(f, "LDREG({})", r),
            LoadRegRs(r) => write!(f, "LDREGRS({})", r),
            Call {
                routine,
                params,
                locals,
            } => write!(f, "CALL({},{},{})", routine, params, locals),
            CallRs {
                routine,
                params,
                locals,
            } => write!(f, "CALLRS({},{},{})", routine, params, locals),
            Ret => write!(f, "RET"),
            RetRs => write!(f, "RETRS"),
            StoreResult => write!(f, "STRES"),
            LoadResult => write!(f, "LDRES"),

            Neg => write!(f, "NEG"),
            Add => write!(f, "ADD"),
            Sub => write!(f, "SUB"),
            Mul => write!(f, "MUL"),
            Divr => write!(f, "DIVR"),
            Div => write!(f, "DIV"),
            Mod => write!(f, "MOD"),
            Eq => write!(f, "EQ"),
            NotEq => write!(f, "NOTEQ"),
            Lt => write!(f, "LT"),
            LtEq => write!(f, "LTEQ"),
            Gt => write!(f, "GT"),
            GtEq => write!(f, "GTEQ"),
            Not => write!(f, "NOT"),
            And => write!(f, "AND"),
            Or => write!(f, "OR"),
            Eor => write!(f, "EOR"),

            Builtin(b) => write!(f, "{}", b),
        }
    }
}
