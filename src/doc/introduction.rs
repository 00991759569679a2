/*!
# Introductory Tutorial

Turtle programs move a pen around a square canvas. The turtle starts in
the middle, facing up, with its pen down. Save the following as
`square.tb` and run it with `turtle run square.tb`.

```text
REM a square
FOR side% = 1 TO 4
  FORWARD(200)
  RIGHT(90)
NEXT
```

Each command the turtle obeys is printed as it is drawn. Add `--json`
to get one JSON object per drawing command instead.

Programs can print text to the console and read the keyboard.

```text
WRITE("What is your name? ")
name$ = READLN$
WRITELN("Hello " + name$)
```

## Procedures and functions

Routines follow the main program. A procedure is called by name; a
function returns a value.

```text
PROCpolygon(6, 100)
END

DEF PROCpolygon(sides%, length%)
  LOCAL turn%
  turn% = 360 / sides%
  REPEAT
    FORWARD(length%)
    RIGHT(turn%)
    sides% = sides% - 1
  UNTIL sides% = 0
ENDPROC
```

The same program in the COMAL dialect, selected with `--dialect comal`
or a `.tc` file extension:

```text
polygon(6, 100)
END

PROC polygon(sides, length)
  LOCAL turn
  turn := 360 / sides
  REPEAT
    FORWARD(length)
    RIGHT(turn)
    sides := sides - 1
  UNTIL sides = 0
ENDPROC polygon
```

## Seeing the pcode

`turtle compile square.tb` prints the pcode listing: one line per
instruction with its address and source line. Add `--usage` to see
which commands and structures the program uses, and in which routines.

*/
