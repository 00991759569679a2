//! # Turtle
//!
//! Command line front end for the turtle compiler and pcode machine.

mod term;

fn main() {
    term::main();
}
