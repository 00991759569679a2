use super::{code, Catalog, Options, PCode};
use crate::lang::ast::Routine;
use crate::lang::{analyse, lex, parse, Dialect, Error, Lexeme, Usage};

type Result<T> = std::result::Result<T, Error>;

/// Everything the pipeline produced for one source text.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub lexemes: Vec<Lexeme>,
    pub routines: Vec<Routine>,
    pub pcode: PCode,
    pub usage: Usage,
}

/// Compile with default options and the standard catalog.
pub fn compile(source: &str, dialect: Dialect) -> Result<Compilation> {
    compile_with(source, dialect, &Options::default(), &Catalog::standard())
}

/// Lex, parse, code and analyse. The first error aborts with no pcode.
pub fn compile_with(
    source: &str,
    dialect: Dialect,
    options: &Options,
    catalog: &Catalog,
) -> Result<Compilation> {
    let lexemes = lex(source, dialect);
    let routines = parse(&lexemes, dialect)?;
    let pcode = code(&routines, dialect, options, catalog)?;
    let usage = analyse(&lexemes, &routines[1..], dialect);
    log::debug!(
        "compiled {} lexemes into {} routines for {}",
        lexemes.len(),
        routines.len(),
        dialect
    );
    Ok(Compilation {
        lexemes,
        routines,
        pcode,
        usage,
    })
}
