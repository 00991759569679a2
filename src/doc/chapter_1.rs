/*!
# The Language

Both dialects share one set of types, built-in commands and functions.
They differ in spelling, which the table below summarises.

| | BASIC | COMAL |
|-|-------|-------|
| keywords | upper case | any case |
| comments | `REM`, `'` | `//` |
| strings | `"..."` | `"..."`, `'...'` |
| hex | `&FF` | `$FF` |
| integer variable | `n%` | `n`, `n#` |
| string variable | `s$` | `s$` |
| assignment | `=` | `:=` |
| separator | `:` | one statement per line |
| procedure | `DEF PROCname ... ENDPROC` | `PROC name ... ENDPROC name` |
| function | `DEF FNname% ... =result` | `FUNC name ... RETURN result ... ENDFUNC name` |
| loops | `FOR ... NEXT`, `WHILE ... ENDWHILE` | `FOR ... DO ... ENDFOR`, `WHILE ... DO ... ENDWHILE` |

## Types

Integers are signed 32-bit. Arithmetic that leaves that range stops the
program with `OVERFLOW`. Booleans are produced by comparisons and by
`TRUE`/`FALSE`; they are stored as -1 and 0 and may be assigned to
integer variables. Conditions of `IF`, `WHILE` and `UNTIL` must be
boolean.

`/` divides and rounds to the nearest integer. `DIV` truncates and
`MOD` takes the remainder. `+` also joins strings.

Arrays are created with `DIM`, are indexed from 0 and hold integers or
strings:

```text
DIM squares%(10)
FOR i% = 0 TO 9
  squares%(i%) = i% * i%
NEXT
```

## Variables and scope

In the main program, assigning to a new name declares a global. Inside a
routine every name must already be a parameter, a `LOCAL` or `PRIVATE`
declaration, a `DIM`, or a global. `PRIVATE` variables keep their value
between calls of the routine that declares them. An array dimensioned in a
routine lasts until the routine returns, so global arrays are dimensioned
in the main program.

## Turtle

| Command | Effect |
|---------|--------|
| `FORWARD(n)`, `BACK(n)` | move, drawing when the pen is down |
| `LEFT(n)`, `RIGHT(n)` | turn by degrees |
| `DRAWXY(dx, dy)`, `MOVEXY(dx, dy)` | relative line or move |
| `SETX(x)`, `SETY(y)`, `SETXY(x, y)` | absolute move |
| `DIRECTION(d)`, `TURNXY(dx, dy)` | face a direction or point |
| `HOME` | centre of the canvas facing up |
| `PENUP`, `PENDOWN` | lift or lower the pen |
| `THICKNESS(n)`, `COLOUR(c)` | pen style |
| `BLOT(r)`, `CIRCLE(r)`, `BOX(w, h, c, border)` | shapes at the turtle |
| `BLANK(c)` | clear the canvas |
| `PRINT(text, font, size)` | text at the turtle |
| `CURSOR(n)`, `CANVAS(x, y, w, h)` | host pointer and coordinates |

`TURTX`, `TURTY`, `TURTD`, `TURTT` and `TURTC` read and set the turtle's
position, direction, thickness and colour. Colour names such as `RED`
and `BLUE` are integer constants, and `RGB(r, g, b)` builds others.

## Console and keyboard

`WRITE(s)` and `WRITELN(s)` print. `READLN$` waits for a line of input.
`GETKEY$` takes the next key from the key buffer, waiting when it is
empty; `KEYBUFFER(n)` replaces the buffer with one holding `n` keys.

## Functions

`ABS SGN MAX MIN SQRT RND TIME` work on integers. `SIN(a, m)` and
`COS(a, m)` take degrees and return the result scaled by `m`.
`LEN VAL ASC STR$ CHR$ MID$` convert and slice strings.

*/
