/*!
# The Pcode Machine

Each routine is coded into its own list of instructions. Routine 0 is
the main program: it reserves the globals with `ALLOC`, sets each to
zero or the empty string and ends with `HALT`.

```text
x% = 3 * 4
```
```text
0 PROGRAM
     0     0  ALLOC(1)
     1     0  LDIN(0)
     2     0  STVG(0)
     3     1  LDIN(3)
     4     1  LDIN(4)
     5     1  MUL
     6     1  STVG(0)
     7     0  HALT
```

## Memory

Globals occupy the first slots. A call appends a frame for the callee's
parameters and locals, and the callee's register points at its base so
`LDVR(r, n)` reads slot `n` of routine `r`'s current frame. Arrays live
in an arena and are released with the frame that created them.

## Calls

The caller saves a memory mark and the callee's register, pushes the
arguments and executes `CALL`. On return it restores the register,
releases memory to the mark and, for functions, loads the result.

```text
MARKMC  SVREGRS(1)  LDIN(6)  LDIN(100)  CALLRS(1,2,3)  LDREGRS(1)  RELEASEMC
```

## Options

| Option | Effect |
|--------|--------|
| `separateReturnStack` | `CALLRS`/`RETRS` instead of `CALL`/`RET` |
| `separateMemoryControlStack` | `MARKMC`/`RELEASEMC` instead of `MARK`/`RELEASE` |
| `separateSubroutineRegisterStack` | `SVREGRS`/`LDREGRS` instead of `SVREG`/`LDREG` |
| `initialiseLocals` | zero locals on entry; otherwise reading one first faults |
| `turtleAttributesAsGlobals` | turtle attributes in global slots 0 to 4 |
| `allowCSTR` | string literals as `CSTR`; otherwise built with `MKST` |
| `setupDefaultKeyBuffer` | start with a 32 key buffer |
| `canvasStartSize` | width and height of the canvas |

Pcode records the CRC-32 signature of the options it was coded for, and
a machine built with different options refuses to run it.

## Errors

Compiler errors point at a lexeme. Machine errors name the source line
and routine of the failing instruction. System errors come from a
mismatch between the pcode, the options and the host.

*/
