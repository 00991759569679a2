use super::{Address, Opcode};
use std::rc::Rc;

/// Coded instructions of one routine.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineCode {
    pub name: Rc<str>,
    pub ops: Vec<Opcode>,
    /// Source line of the statement that emitted each instruction.
    pub lines: Vec<usize>,
}

impl RoutineCode {
    pub fn line(&self, addr: Address) -> Option<usize> {
        self.lines.get(addr).copied()
    }
}

/// A coded program: routine 0 is the main program.
#[derive(Debug, Clone, PartialEq)]
pub struct PCode {
    pub routines: Vec<RoutineCode>,
    /// Signature of the options the program was coded for.
    pub signature: u32,
}

impl PCode {
    pub fn len(&self) -> usize {
        self.routines.iter().map(|routine| routine.ops.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human readable listing, one instruction per line.
    pub fn listing(&self) -> String {
        let mut s = String::new();
        for (index, routine) in self.routines.iter().enumerate() {
            s.push_str(&format!("{} {}\n", index, routine.name));
            for (addr, op) in routine.ops.iter().enumerate() {
                let line = routine.line(addr).unwrap_or_default();
                s.push_str(&format!("{:>6} {:>5}  {}\n", addr, line, op));
            }
        }
        s
    }
}

impl std::fmt::Display for PCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.listing())
    }
}
