use super::{Address, Opcode, Symbol};
use crate::error;
use crate::lang::Error;
use std::collections::{BTreeMap, HashMap};

type Result<T> = std::result::Result<T, Error>;

/// ## Label back-patching for one routine

#[derive(Debug, Default)]
pub struct Link {
    current_symbol: Symbol,
    symbols: BTreeMap<Symbol, Address>,
    unlinked: HashMap<Address, Symbol>,
}

impl Link {
    pub fn new() -> Link {
        Link::default()
    }

    pub fn clear(&mut self) {
        self.current_symbol = 0;
        self.symbols.clear();
        self.unlinked.clear();
    }

    pub fn next_symbol(&mut self) -> Symbol {
        self.current_symbol += 1;
        self.current_symbol
    }

    pub fn insert(&mut self, sym: Symbol, addr: Address) {
        self.symbols.insert(sym, addr);
    }

    pub fn link_addr_to_symbol(&mut self, addr: Address, symbol: Symbol) {
        self.unlinked.insert(addr, symbol);
    }

    /// Patch every branch recorded against a symbol and reset for the next routine.
    pub fn link(&mut self, ops: &mut [Opcode]) -> Result<()> {
        let mut unlinked: Vec<(Address, Symbol)> = std::mem::take(&mut self.unlinked).into_iter().collect();
        unlinked.sort_unstable();
        for (op_addr, symbol) in unlinked {
            let dest = match self.symbols.get(&symbol) {
                Some(dest) => *dest,
                None => return Err(error!(LinkFailure; &format!("NO ADDRESS FOR LABEL {}", symbol))),
            };
            match ops.get_mut(op_addr) {
                Some(Opcode::Jump(addr)) | Some(Opcode::IfNo(addr)) => *addr = dest,
                _ => return Err(error!(LinkFailure; &format!("NO BRANCH AT {}", op_addr))),
            }
        }
        self.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patches_forward_branch() {
        let mut link = Link::new();
        let mut ops = vec![Opcode::Ldin(0), Opcode::IfNo(0), Opcode::Ldin(1), Opcode::Halt];
        let end = link.next_symbol();
        link.link_addr_to_symbol(1, end);
        link.insert(end, 3);
        assert!(link.link(&mut ops).is_ok());
        assert_eq!(ops[1], Opcode::IfNo(3));
    }

    #[test]
    fn test_missing_label() {
        let mut link = Link::new();
        let mut ops = vec![Opcode::Jump(0)];
        let sym = link.next_symbol();
        link.link_addr_to_symbol(0, sym);
        let e = link.link(&mut ops).err();
        assert_eq!(e.map(|e| e.to_string()), Some("LINK FAILURE; NO ADDRESS FOR LABEL 1".to_string()));
    }
}
