/*!
# Language Module

Lexical analysis, parsing and usage analysis for both turtle dialects.

*/

#[macro_use]
mod error;
mod analyse;
mod builtin;
mod colour;
mod dialect;
mod lex;
mod parse;
mod token;

pub use analyse::{analyse, Category, Usage, UsageEntry};
pub use colour::{colour, COLOURS};
pub use dialect::{Dialect, HeaderStyle, ResultStyle, Rules};
pub use error::{Error, ErrorCode, ErrorKind};
pub use lex::lex;
pub use parse::parse;
pub use token::{Builtin, Delimiter, Keyword, Lexeme, LexemeKind, Operator, TurtleAttribute};

pub mod ast;
