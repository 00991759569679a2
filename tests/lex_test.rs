use turtle::lang::*;

fn lexemes(source: &str, dialect: Dialect) -> Vec<(usize, usize, LexemeKind, String)> {
    lex(source, dialect)
        .into_iter()
        .map(|l| (l.line, l.column, l.kind, l.content.to_string()))
        .collect()
}

#[test]
fn test_positions() {
    let lexed = lexemes("FORWARD(10)\n  RIGHT(90)", Dialect::Basic);
    assert_eq!(lexed[0], (1, 1, LexemeKind::Builtin(Builtin::Forward), "FORWARD".to_string()));
    assert_eq!(lexed[4].2, LexemeKind::Newline);
    assert_eq!(lexed[5], (2, 3, LexemeKind::Builtin(Builtin::Right), "RIGHT".to_string()));
}

#[test]
fn test_lexing_never_fails() {
    let lexed = lexemes("a% = 1 # \"open", Dialect::Basic);
    let unknown: Vec<&str> = lexed
        .iter()
        .filter(|l| l.2 == LexemeKind::Unknown)
        .map(|l| l.3.as_str())
        .collect();
    assert_eq!(unknown, vec!["#", "\"open"]);
}

#[test]
fn test_content_is_exact() {
    let source = "REM hi\nx$ = \"a\"\"b\" + CHR$(&41)";
    let joined: Vec<String> = lexemes(source, Dialect::Basic)
        .into_iter()
        .map(|l| l.3)
        .collect();
    assert_eq!(
        joined,
        vec!["REM hi", "\n", "x$", "=", "\"a\"\"b\"", "+", "CHR$", "(", "&41", ")"]
    );
}

#[test]
fn test_comment_needs_word_boundary() {
    let kinds: Vec<LexemeKind> = lex("REMARK% = 1", Dialect::Basic)
        .into_iter()
        .map(|l| l.kind)
        .collect();
    assert_eq!(kinds[0], LexemeKind::Identifier);
}

#[test]
fn test_colours_and_turtle_attributes() {
    let kinds: Vec<LexemeKind> = lex("TURTC = red", Dialect::Comal)
        .into_iter()
        .map(|l| l.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            LexemeKind::Turtle(TurtleAttribute::Colour),
            LexemeKind::Operator(Operator::Equal),
            LexemeKind::Colour(0xFF0000),
        ]
    );
}

#[test]
fn test_routine_numbering() {
    let source = "PROCa\nEND\nDEF PROCa\nENDPROC\nDEF FNb%\n=1\n";
    let routines: Vec<usize> = lex(source, Dialect::Basic)
        .into_iter()
        .filter(|l| l.kind != LexemeKind::Newline)
        .map(|l| l.routine)
        .collect();
    assert_eq!(routines, vec![0, 0, 1, 1, 1, 2, 2, 2, 2]);
}

#[test]
fn test_comal_symbols() {
    let kinds: Vec<LexemeKind> = lex("x := $1F <> 3 // note", Dialect::Comal)
        .into_iter()
        .map(|l| l.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            LexemeKind::Identifier,
            LexemeKind::Operator(Operator::Assign),
            LexemeKind::Integer,
            LexemeKind::Operator(Operator::NotEqual),
            LexemeKind::Integer,
            LexemeKind::Comment,
        ]
    );
}
