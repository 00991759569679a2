/*!
## Machine Module

The pcode coder and the turtle machine that runs it.

*/

pub type Address = usize;
pub type Symbol = usize;

mod catalog;
mod codegen;
mod compile;
mod function;
mod link;
mod machine;
mod memory;
mod opcode;
mod operation;
mod options;
mod pcode;
mod stack;
mod turtle;
mod val;

pub use catalog::{Catalog, Entry};
pub use codegen::code;
pub use compile::{compile, compile_with, Compilation};
pub use function::Function;
pub use link::Link;
pub use machine::{Event, InputKind, Machine, State};
pub use memory::Memory;
pub use opcode::Opcode;
pub use operation::Operation;
pub use options::{Options, TURTLE_SLOTS};
pub use pcode::{PCode, RoutineCode};
pub use stack::Stack;
pub use turtle::{Drawing, Turtle};
pub use val::Val;
