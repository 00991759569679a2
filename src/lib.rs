//! # Turtle pcode
//!
//! A teaching language for turtle graphics, in a BASIC and a COMAL
//! flavour, compiled to pcode and run on a small stack machine.
//!
//! ```
//! use turtle::lang::Dialect;
//! use turtle::mach::{Event, Machine};
//! use std::rc::Rc;
//!
//! let compiled = turtle::compile("FORWARD(100)\nRIGHT(90)\n", Dialect::Basic).unwrap();
//! let options = turtle::mach::Options::default();
//! let catalog = Rc::new(turtle::mach::Catalog::standard());
//! let mut machine = Machine::new(compiled.pcode, options, catalog).unwrap();
//! machine.start().unwrap();
//! assert_eq!(machine.execute(1000), Event::Finished);
//! assert_eq!(machine.drawings().len(), 2);
//! ```
//!
//! Run `turtle run program.tb` from a terminal to try programs out.

#[path = "doc/introduction.rs"]
#[allow(non_snake_case)]
pub mod _Introduction;

#[path = "doc/chapter_1.rs"]
#[allow(non_snake_case)]
pub mod __Chapter_1;

#[path = "doc/chapter_2.rs"]
#[allow(non_snake_case)]
pub mod __Chapter_2;

pub mod lang;
pub mod mach;

pub use mach::{compile, compile_with, Compilation};
