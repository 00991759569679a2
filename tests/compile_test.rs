use turtle::lang::{Category, Dialect};
use turtle::mach::{Opcode, Options};
use turtle::{compile, compile_with, Compilation};

fn compiled(source: &str) -> Compilation {
    match compile(source, Dialect::Basic) {
        Ok(compiled) => compiled,
        Err(e) => panic!("{}", e),
    }
}

#[test]
fn test_empty_program() {
    let c = compiled("");
    assert_eq!(c.pcode.routines.len(), 1);
    assert_eq!(c.pcode.routines[0].ops, vec![Opcode::Alloc(0), Opcode::Halt]);
    assert!(c.usage.entries.is_empty());
}

#[test]
fn test_listing() {
    let c = compiled("FORWARD(100)\nRIGHT(90)\n");
    assert_eq!(
        c.pcode.listing(),
        "\
0 PROGRAM
     0     0  ALLOC(0)
     1     1  LDIN(100)
     2     1  FORWARD
     3     2  LDIN(90)
     4     2  RIGHT
     5     0  HALT
"
    );
}

#[test]
fn test_compilation_is_deterministic() {
    let source = "\
PROCsquare(50)
END
DEF PROCsquare(size%)
  LOCAL n%
  FOR n% = 1 TO 4
    FORWARD(size%)
    RIGHT(90)
  NEXT
ENDPROC
";
    let first = compiled(source);
    let second = compiled(source);
    assert_eq!(first.lexemes, second.lexemes);
    assert_eq!(first.routines, second.routines);
    assert_eq!(first.pcode, second.pcode);
    assert_eq!(first.usage, second.usage);
    assert_eq!(first.routines.len(), 2);
}

#[test]
fn test_signature_follows_options() {
    let source = "WRITELN(\"x\")";
    let shared = Options {
        separate_return_stack: false,
        ..Options::default()
    };
    let a = compiled(source);
    let b = match compile_with(source, Dialect::Basic, &shared, &turtle::mach::Catalog::standard()) {
        Ok(compiled) => compiled,
        Err(e) => panic!("{}", e),
    };
    assert_eq!(a.pcode.signature, Options::default().signature());
    assert_eq!(b.pcode.signature, shared.signature());
    assert_ne!(a.pcode.signature, b.pcode.signature);
}

#[test]
fn test_string_literals_without_cstr() {
    let options = Options {
        allow_cstr: false,
        ..Options::default()
    };
    let c = match compile_with(
        "WRITE(\"ok\")",
        Dialect::Basic,
        &options,
        &turtle::mach::Catalog::standard(),
    ) {
        Ok(compiled) => compiled,
        Err(e) => panic!("{}", e),
    };
    let ops = &c.pcode.routines[0].ops;
    assert!(ops.contains(&Opcode::Mkst));
    assert!(!ops.iter().any(|op| matches!(op, Opcode::Cstr(_))));

    let long = format!("WRITE(\"{}\")", "x".repeat(300));
    assert!(compile_with(&long, Dialect::Basic, &options, &turtle::mach::Catalog::standard()).is_err());
    assert!(compile(&long, Dialect::Basic).is_ok());
}

#[test]
fn test_most_negative_step_compiles() {
    let c = compiled("FOR i% = 1 TO 2 STEP -&80000000\nNEXT\n");
    assert!(c.pcode.routines[0].ops.contains(&Opcode::Neg));
}

#[test]
fn test_usage() {
    let source = "\
FORWARD(10)
PROCa
END
DEF PROCa
  LOCAL n%
  FOR n% = 1 TO 2
    FORWARD(n%)
  NEXT
  WRITELN(STR$(n%))
ENDPROC
";
    let usage = compiled(source).usage;
    let forward = usage.get("FORWARD").map(|e| (e.count, e.routines.clone()));
    assert_eq!(forward, Some((2, vec!["PROCa".to_string()])));
    let commands: Vec<&str> = usage
        .category(Category::Command)
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(commands, vec!["FORWARD", "WRITELN"]);
    assert_eq!(
        usage.get("STR$").map(|e| e.category),
        Some(Category::Function)
    );
    assert_eq!(
        usage.get("LOCAL").map(|e| e.routines.clone()),
        Some(vec!["PROCa".to_string()])
    );
    assert_eq!(
        usage.get("END").map(|e| e.routines.len()),
        Some(0)
    );
}
