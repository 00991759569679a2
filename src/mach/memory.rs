use super::{Address, Val};
use crate::error;
use crate::lang::Error;
use std::convert::TryFrom;

type Result<T> = std::result::Result<T, Error>;

/// Most slots a program may hold at once, frames included.
const MAX_SLOTS: usize = 1 << 20;
/// Most elements in one array.
const MAX_ELEMENTS: usize = 1 << 20;

/// ## Machine memory
///
/// Global slots come first and call frames are appended above them.
/// Arrays live in an arena addressed by handle. A memory mark records
/// both lengths so that a returning call releases its frame and any
/// arrays it dimensioned. Every `DIM` takes a fresh serial number, so a
/// handle that outlives its array never resolves to a later one.

#[derive(Debug, Default)]
pub struct Memory {
    slots: Vec<Val>,
    arrays: Vec<(usize, Vec<Val>)>,
    serial: usize,
}

impl Memory {
    pub fn new() -> Memory {
        Memory::default()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.arrays.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Grow the global area to `len` undefined slots.
    pub fn alloc(&mut self, len: usize) -> Result<()> {
        if len > MAX_SLOTS {
            return Err(error!(OutOfMemory; "GLOBALS"));
        }
        if len > self.slots.len() {
            self.slots.resize(len, Val::Undefined);
        }
        Ok(())
    }

    pub fn get(&self, addr: Address) -> Result<&Val> {
        match self.slots.get(addr) {
            Some(val) => Ok(val),
            None => Err(error!(MemoryFault; &format!("NO SLOT {}", addr))),
        }
    }

    pub fn set(&mut self, addr: Address, val: Val) -> Result<()> {
        match self.slots.get_mut(addr) {
            Some(slot) => {
                *slot = val;
                Ok(())
            }
            None => Err(error!(MemoryFault; &format!("NO SLOT {}", addr))),
        }
    }

    /// Append a frame holding `args` followed by undefined slots, returning its base.
    pub fn frame(&mut self, args: Vec<Val>, size: usize) -> Result<Address> {
        let base = self.slots.len();
        if base + size.max(args.len()) > MAX_SLOTS {
            return Err(error!(OutOfMemory; "CALL FRAME"));
        }
        let padding = size.saturating_sub(args.len());
        self.slots.extend(args);
        self.slots
            .extend(std::iter::repeat(Val::Undefined).take(padding));
        Ok(base)
    }

    pub fn mark(&self) -> Val {
        Val::Mark(self.slots.len(), self.arrays.len())
    }

    pub fn release(&mut self, mark: Val) -> Result<()> {
        match mark {
            Val::Mark(slots, arrays) => {
                self.slots.truncate(slots);
                self.arrays.truncate(arrays);
                Ok(())
            }
            _ => Err(error!(TypeMismatch; &format!("{} WHERE MEMORY MARK EXPECTED", mark.type_name()))),
        }
    }

    /// A new array of `size` zeros or empty strings.
    pub fn dim(&mut self, size: i32, strings: bool) -> Result<Val> {
        let size = match usize::try_from(size) {
            Ok(size) if size > 0 => size,
            _ => return Err(error!(SubscriptOutOfRange; &format!("DIM {}", size))),
        };
        if size > MAX_ELEMENTS {
            return Err(error!(OutOfMemory; "ARRAY"));
        }
        let zero = if strings { Val::from("") } else { Val::Integer(0) };
        self.serial += 1;
        self.arrays.push((self.serial, vec![zero; size]));
        Ok(Val::Array(self.arrays.len() - 1, self.serial))
    }

    fn array(&mut self, array: Val) -> Result<&mut Vec<Val>> {
        let (index, serial) = match array {
            Val::Undefined => return Err(error!(NotDimensioned)),
            _ => <(usize, usize)>::try_from(array)?,
        };
        match self.arrays.get_mut(index) {
            Some((current, elements)) if *current == serial => Ok(elements),
            _ => Err(error!(MemoryFault; &format!("NO ARRAY {}", index))),
        }
    }

    pub fn element(&mut self, array: Val, index: i32) -> Result<Val> {
        let elements = self.array(array)?;
        match usize::try_from(index).ok().and_then(|i| elements.get(i)) {
            Some(val) => Ok(val.clone()),
            None => Err(error!(SubscriptOutOfRange; &format!("{} OF {}", index, elements.len()))),
        }
    }

    pub fn set_element(&mut self, array: Val, index: i32, val: Val) -> Result<()> {
        let elements = self.array(array)?;
        let len = elements.len();
        match usize::try_from(index).ok().and_then(|i| elements.get_mut(i)) {
            Some(element) => {
                *element = val;
                Ok(())
            }
            None => Err(error!(SubscriptOutOfRange; &format!("{} OF {}", index, len))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;

    #[test]
    fn test_release_discards_frame_and_arrays() {
        let mut memory = Memory::new();
        assert!(memory.alloc(2).is_ok());
        let mark = memory.mark();
        let base = memory.frame(vec![Val::Integer(7)], 3).ok();
        assert_eq!(base, Some(2));
        assert_eq!(memory.get(2).ok(), Some(&Val::Integer(7)));
        assert_eq!(memory.get(4).ok(), Some(&Val::Undefined));
        let array = memory.dim(4, false).ok();
        assert_eq!(array, Some(Val::Array(0, 1)));
        assert!(memory.release(mark).is_ok());
        assert_eq!(memory.len(), 2);
        let e = memory.element(Val::Array(0, 1), 0).err();
        assert_eq!(e.map(|e| e.code()), Some(ErrorCode::MemoryFault as u16));
    }

    #[test]
    fn test_released_handle_is_not_reused() {
        let mut memory = Memory::new();
        let mark = memory.mark();
        let stale = memory.dim(2, false).unwrap_or(Val::Undefined);
        assert!(memory.release(mark).is_ok());
        let fresh = memory.dim(5, false).unwrap_or(Val::Undefined);
        assert_eq!(fresh, Val::Array(0, 2));
        assert!(memory.set_element(fresh, 0, Val::Integer(7)).is_ok());
        let e = memory.element(stale.clone(), 0).err();
        assert_eq!(e.map(|e| e.to_string()), Some("MEMORY FAULT; NO ARRAY 0".to_string()));
        let e = memory.set_element(stale, 0, Val::Integer(1)).err();
        assert_eq!(e.map(|e| e.code()), Some(ErrorCode::MemoryFault as u16));
    }

    #[test]
    fn test_subscripts() {
        let mut memory = Memory::new();
        let array = memory.dim(3, true).unwrap_or(Val::Undefined);
        assert!(memory.set_element(array.clone(), 2, Val::from("z")).is_ok());
        assert_eq!(memory.element(array.clone(), 2).ok(), Some(Val::from("z")));
        assert_eq!(memory.element(array.clone(), 0).ok(), Some(Val::from("")));
        let e = memory.element(array, 3).err();
        assert_eq!(e.map(|e| e.to_string()), Some("SUBSCRIPT OUT OF RANGE; 3 OF 3".to_string()));
        let e = memory.element(Val::Undefined, 0).err();
        assert_eq!(e.map(|e| e.code()), Some(ErrorCode::NotDimensioned as u16));
    }
}
