mod common;
use common::*;
use turtle::lang::Dialect;
use turtle::mach::Options;

#[test]
fn test_procedure_with_parameters() {
    let source = "\
PROCgreet(\"turtle\", 2)
END
DEF PROCgreet(name$, times%)
  LOCAL i%
  FOR i% = 1 TO times%
    WRITELN(\"hi \" + name$)
  NEXT
ENDPROC
";
    assert_eq!(run(source), "hi turtle\nhi turtle\n");
}

#[test]
fn test_single_line_function() {
    let source = "\
WRITELN(STR$(FNsq%(3) + FNsq%(4)))
END
DEF FNsq%(n%) = n% * n%
";
    assert_eq!(run(source), "25\n");
}

#[test]
fn test_recursive_function() {
    let source = "\
WRITELN(STR$(FNfact%(10)))
END
DEF FNfact%(n%)
IF n% <= 1 THEN =1
=n% * FNfact%(n% - 1)
";
    assert_eq!(run(source), "3628800\n");
}

#[test]
fn test_string_function() {
    let source = "\
WRITELN(FNtwice$(\"ab\"))
END
DEF FNtwice$(s$)
=s$ + s$
";
    assert_eq!(run(source), "abab\n");
}

#[test]
fn test_parameters_are_copies() {
    let source = "\
n% = 1
PROCbump(n%)
WRITELN(STR$(n%))
END
DEF PROCbump(n%)
  n% = n% + 10
  WRITELN(STR$(n%))
ENDPROC
";
    assert_eq!(run(source), "11\n1\n");
}

#[test]
fn test_globals_visible_in_routines() {
    let source = "\
count% = 0
PROCadd
PROCadd
WRITELN(STR$(count%))
END
DEF PROCadd
  count% = count% + 1
ENDPROC
";
    assert_eq!(run(source), "2\n");
}

#[test]
fn test_private_keeps_value_between_calls() {
    let source = "\
PROCtick
PROCtick
PROCtick
END
DEF PROCtick
  PRIVATE calls%
  calls% = calls% + 1
  WRITE(STR$(calls%))
ENDPROC
";
    assert_eq!(run(source), "123");
}

#[test]
fn test_locals_start_at_zero_each_call() {
    let source = "\
PROCa
PROCa
END
DEF PROCa
  LOCAL n%, s$
  WRITE(STR$(n%) + \"[\" + s$ + \"]\")
  n% = 5
  s$ = \"x\"
ENDPROC
";
    assert_eq!(run(source), "0[]0[]");
}

#[test]
fn test_uninitialised_local_faults() {
    let source = "\
PROCa
END
DEF PROCa
  LOCAL n%
  WRITELN(STR$(n%))
ENDPROC
";
    let options = Options {
        initialise_locals: false,
        ..Options::default()
    };
    let mut m = machine(source, Dialect::Basic, options);
    assert_eq!(
        exec(&mut m),
        "UNINITIALISED VARIABLE IN LINE 5 (PROCa); LOCAL 0\n"
    );
}

#[test]
fn test_endproc_inside_block_returns_early() {
    let source = "\
PROCcheck(1)
PROCcheck(-1)
END
DEF PROCcheck(n%)
  IF n% < 0 THEN ENDPROC
  WRITELN(\"positive\")
ENDPROC
";
    assert_eq!(run(source), "positive\n");
}

#[test]
fn test_nested_calls_restore_frames() {
    let source = "\
PROCouter(3)
END
DEF PROCouter(n%)
  LOCAL m%
  m% = n% * 10
  PROCinner(n% + 1)
  WRITELN(STR$(n%) + \" \" + STR$(m%))
ENDPROC
DEF PROCinner(k%)
  LOCAL m%
  m% = 99
  WRITELN(STR$(k%) + \" \" + STR$(m%))
ENDPROC
";
    assert_eq!(run(source), "4 99\n3 30\n");
}

#[test]
fn test_array_local_to_call() {
    let source = "\
WRITELN(STR$(FNsum%(4)))
WRITELN(STR$(FNsum%(3)))
END
DEF FNsum%(n%)
  LOCAL i%, t%
  DIM a%(n%)
  FOR i% = 0 TO n% - 1
    a%(i%) = i% + 1
  NEXT
  FOR i% = 0 TO n% - 1
    t% = t% + a%(i%)
  NEXT
=t%
";
    assert_eq!(run(source), "10\n6\n");
}

#[test]
fn test_global_array_dimensioned_in_subroutine() {
    let source = "\
DIM a%(3)
PROCr
END
DEF PROCr
  DIM a%(2)
ENDPROC
";
    let e = compile_error(source, Dialect::Basic);
    assert_eq!(e.code(), turtle::lang::ErrorCode::MisplacedStatement as u16);
    assert_eq!(e.text(), "\"a%\" CAN ONLY BE DIMENSIONED IN THE MAIN PROGRAM");
}

#[test]
fn test_subroutine_arrays_leave_globals_alone() {
    let source = "\
DIM a%(3)
a%(0) = 5
PROCr
DIM b%(5)
b%(0) = 7
WRITELN(STR$(a%(0)) + \" \" + STR$(b%(0)))
END
DEF PROCr
  DIM c%(2)
  c%(0) = 1
ENDPROC
";
    assert_eq!(run(source), "5 7\n");
}

#[test]
fn test_fault_names_routine_and_line() {
    let source = "\
PROCdivide(0)
END
DEF PROCdivide(n%)
  WRITELN(STR$(10 DIV n%))
ENDPROC
";
    assert_eq!(run(source), "DIVISION BY ZERO IN LINE 4 (PROCdivide)\n");
}

#[test]
fn test_overflow() {
    assert_eq!(
        run("a% = 2147483647\nb% = a% + 1"),
        "OVERFLOW IN LINE 2 (PROGRAM); 2147483647 + 1\n"
    );
}
