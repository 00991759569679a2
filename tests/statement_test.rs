mod common;
use common::*;

#[test]
fn test_writeln() {
    assert_eq!(run("WRITELN(\"hello\")"), "hello\n");
    assert_eq!(run("WRITE(\"a\"): WRITE(\"b\")\nWRITELN(\"\")"), "ab\n");
}

#[test]
fn test_assignment_and_arithmetic() {
    let source = "\
a% = 7
b% = 2
WRITELN(STR$(a% / b%) + \" \" + STR$(a% DIV b%) + \" \" + STR$(a% MOD b%))
WRITELN(STR$(-a% / b%))
WRITELN(STR$(2 + 3 * 4) + \" \" + STR$((2 + 3) * 4))
";
    assert_eq!(run(source), "4 3 1\n-4\n14 20\n");
}

#[test]
fn test_booleans_are_integers() {
    let source = "\
t% = 1 < 2
WRITELN(STR$(t%) + STR$(FALSE))
WRITELN(STR$(NOT 0))
WRITELN(STR$(6 AND 3) + \" \" + STR$(6 OR 3) + \" \" + STR$(6 EOR 3))
";
    assert_eq!(run(source), "-10\n-1\n2 7 5\n");
}

#[test]
fn test_string_comparison() {
    let source = "\
IF \"abc\" < \"abd\" THEN WRITELN(\"less\")
IF \"x\" + \"y\" = \"xy\" THEN WRITELN(\"joined\")
";
    assert_eq!(run(source), "less\njoined\n");
}

#[test]
fn test_if_else() {
    assert_eq!(
        run("IF 1 = 2 THEN WRITELN(\"one\") ELSE WRITELN(\"two\")"),
        "two\n"
    );
    let source = "\
n% = 5
IF n% > 3 THEN
  WRITELN(\"big\")
ELSE
  WRITELN(\"small\")
ENDIF
WRITELN(\"done\")
";
    assert_eq!(run(source), "big\ndone\n");
}

#[test]
fn test_single_line_if_runs_every_statement() {
    let source = "IF TRUE THEN WRITE(\"a\"): WRITE(\"b\") ELSE WRITE(\"c\")\nWRITELN(\"!\")";
    assert_eq!(run(source), "ab!\n");
}

#[test]
fn test_for_loops() {
    assert_eq!(
        run("FOR i% = 1 TO 3\nWRITE(STR$(i%))\nNEXT\nWRITELN(\" \" + STR$(i%))"),
        "123 4\n"
    );
    assert_eq!(
        run("FOR i% = 10 TO 1 STEP -3\nWRITE(STR$(i%) + \" \")\nNEXT i%\nWRITELN(\"\")"),
        "10 7 4 1 \n"
    );
    assert_eq!(run("FOR i% = 5 TO 1\nWRITELN(\"never\")\nNEXT\n"), "");
}

#[test]
fn test_for_loops_reaching_integer_limits() {
    assert_eq!(
        run("FOR i% = 2147483646 TO 2147483647\nWRITE(\"x\")\nNEXT\nWRITELN(\"done \" + STR$(i%))"),
        "xxdone 2147483647\n"
    );
    assert_eq!(
        run("FOR i% = -2147483647 TO &80000000 STEP -1\nWRITE(\"y\")\nNEXT\nWRITELN(\"\")"),
        "yy\n"
    );
    let source = "\
s% = 1
FOR i% = 2147483646 TO 2147483647 STEP s%
  WRITE(\"z\")
NEXT
s% = -1
FOR i% = -2147483647 TO &80000000 STEP s%
  WRITE(\"w\")
NEXT
WRITELN(\"\")
";
    assert_eq!(run(source), "zzww\n");
}

#[test]
fn test_for_with_variable_step() {
    let source = "\
s% = -2
FOR i% = 4 TO 0 STEP s%
  WRITE(STR$(i%))
NEXT
s% = 2
FOR i% = 0 TO 4 STEP s%
  WRITE(STR$(i%))
NEXT
WRITELN(\"\")
";
    assert_eq!(run(source), "420024\n");
}

#[test]
fn test_while_and_repeat() {
    let source = "\
n% = 0
WHILE n% < 3
  n% = n% + 1
ENDWHILE
REPEAT
  n% = n% * 2
UNTIL n% > 20
WRITELN(STR$(n%))
";
    assert_eq!(run(source), "24\n");
}

#[test]
fn test_end_stops_the_program() {
    assert_eq!(run("WRITELN(\"a\")\nEND\nWRITELN(\"b\")"), "a\n");
}

#[test]
fn test_arrays() {
    let source = "\
DIM squares%(5)
FOR i% = 0 TO 4
  squares%(i%) = i% * i%
NEXT
total% = 0
FOR i% = 0 TO 4
  total% = total% + squares%(i%)
NEXT
WRITELN(STR$(total%))
DIM names$(2)
names$(1) = \"turtle\"
WRITELN(\"[\" + names$(0) + \"]\" + names$(1))
";
    assert_eq!(run(source), "30\n[]turtle\n");
}

#[test]
fn test_array_subscript_fault() {
    let source = "DIM a%(3)\na%(3) = 1";
    assert_eq!(
        run(source),
        "SUBSCRIPT OUT OF RANGE IN LINE 2 (PROGRAM); 3 OF 3\n"
    );
}

#[test]
fn test_comments() {
    let source = "\
REM nothing to see
WRITELN(\"x\") ' trailing
";
    assert_eq!(run(source), "x\n");
}
