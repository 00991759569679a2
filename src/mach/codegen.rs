use super::{Catalog, Link, Opcode, Options, PCode, RoutineCode, Symbol};
use crate::error;
use crate::lang::ast::*;
use crate::lang::{Builtin, Dialect, Error, Lexeme, Operator, TurtleAttribute};

type Result<T> = std::result::Result<T, Error>;

/// Longest string literal that can be built from character codes.
const MAX_MKST: usize = 255;

/// ## Code generator
///
/// Emits one `RoutineCode` per routine. Branches are emitted against
/// symbols and patched by `Link` once the routine is complete.
pub fn code(
    routines: &[Routine],
    dialect: Dialect,
    options: &Options,
    catalog: &Catalog,
) -> Result<PCode> {
    let mut coder = Coder {
        routines,
        options,
        catalog,
        ops: vec![],
        lines: vec![],
        line: 0,
        link: Link::new(),
        epilogue: 0,
    };
    let mut coded = Vec::with_capacity(routines.len());
    for routine in routines {
        coded.push(
            coder
                .routine(routine)
                .map_err(|e| e.in_routine(&routine.name))?,
        );
    }
    let pcode = PCode {
        routines: coded,
        signature: options.signature(),
    };
    log::debug!(
        "coded {} routines into {} instructions for {}",
        pcode.routines.len(),
        pcode.len(),
        dialect
    );
    Ok(pcode)
}

struct Coder<'a> {
    routines: &'a [Routine],
    options: &'a Options,
    catalog: &'a Catalog,
    ops: Vec<Opcode>,
    lines: Vec<usize>,
    line: usize,
    link: Link,
    epilogue: Symbol,
}

impl<'a> Coder<'a> {
    fn routine(&mut self, routine: &Routine) -> Result<RoutineCode> {
        self.ops.clear();
        self.lines.clear();
        self.line = 0;
        self.epilogue = self.link.next_symbol();
        if routine.index == 0 {
            let globals = routine
                .variables
                .iter()
                .filter(|v| matches!(v.slot, Slot::Global(_)))
                .count();
            self.emit(Opcode::Alloc(self.options.global_base() + globals));
            for variable in &routine.variables {
                if let Slot::Global(_) = variable.slot {
                    self.zero(variable)?;
                }
            }
        } else if self.options.initialise_locals {
            for variable in &routine.variables[routine.arity..] {
                if let Slot::Local(..) = variable.slot {
                    self.zero(variable)?;
                }
            }
        }
        self.statements(&routine.statements)?;
        self.line = 0;
        let epilogue = self.epilogue;
        self.link.insert(epilogue, self.ops.len());
        if routine.index == 0 {
            self.emit(Opcode::Halt);
        } else if self.options.separate_return_stack {
            self.emit(Opcode::RetRs);
        } else {
            self.emit(Opcode::Ret);
        }
        let mut ops = std::mem::take(&mut self.ops);
        self.link.link(&mut ops)?;
        Ok(RoutineCode {
            name: routine.name.clone(),
            ops,
            lines: std::mem::take(&mut self.lines),
        })
    }

    fn emit(&mut self, op: Opcode) {
        self.ops.push(op);
        self.lines.push(self.line);
    }

    fn emit_branch(&mut self, op: Opcode, symbol: Symbol) {
        self.link.link_addr_to_symbol(self.ops.len(), symbol);
        self.emit(op);
    }

    fn label(&mut self) -> Symbol {
        let symbol = self.link.next_symbol();
        self.link.insert(symbol, self.ops.len());
        symbol
    }

    /// Zero or empty string; arrays are left for `DIM`.
    fn zero(&mut self, variable: &Variable) -> Result<()> {
        match variable.ty {
            Type::Integer | Type::Boolean => self.emit(Opcode::Ldin(0)),
            Type::String => self.string(None, "")?,
            Type::IntegerArray | Type::StringArray => return Ok(()),
        }
        self.store(variable.slot);
        Ok(())
    }

    fn load(&mut self, slot: Slot) {
        match slot {
            Slot::Global(n) => self.emit(Opcode::Ldvg(self.options.global_base() + n)),
            Slot::Local(r, n) => self.emit(Opcode::Ldvr(r, n)),
        }
    }

    fn store(&mut self, slot: Slot) {
        match slot {
            Slot::Global(n) => self.emit(Opcode::Stvg(self.options.global_base() + n)),
            Slot::Local(r, n) => self.emit(Opcode::Stvr(r, n)),
        }
    }

    fn load_turtle(&mut self, attribute: TurtleAttribute) {
        if self.options.turtle_attributes_as_globals {
            self.emit(Opcode::Ldvg(attribute.slot()));
        } else {
            self.emit(Opcode::Ldtu(attribute));
        }
    }

    fn store_turtle(&mut self, attribute: TurtleAttribute) {
        if self.options.turtle_attributes_as_globals {
            self.emit(Opcode::Stvg(attribute.slot()));
        } else {
            self.emit(Opcode::Sttu(attribute));
        }
    }

    fn string(&mut self, lexeme: Option<&Lexeme>, s: &str) -> Result<()> {
        if self.options.allow_cstr {
            self.emit(Opcode::Cstr(s.into()));
            return Ok(());
        }
        let len = s.chars().count();
        if len > MAX_MKST {
            let e = error!(Unsupported; "STRING LITERAL {lex} TOO LONG WITHOUT CSTR");
            return Err(match lexeme {
                Some(lexeme) => e.at_lexeme(lexeme),
                None => e,
            });
        }
        for ch in s.chars() {
            self.emit(Opcode::Ldin(ch as i32));
        }
        self.emit(Opcode::Ldin(len as i32));
        self.emit(Opcode::Mkst);
        Ok(())
    }

    fn statements(&mut self, statements: &[Statement]) -> Result<()> {
        for statement in statements {
            self.statement(statement)?;
        }
        Ok(())
    }

    fn statement(&mut self, statement: &Statement) -> Result<()> {
        self.line = statement.lexeme().line;
        match statement {
            Statement::Assign(_, target, expr) => match target {
                Target::Variable(slot, _) => {
                    self.expression(expr)?;
                    self.store(*slot);
                }
                Target::Element(slot, _, index) => {
                    self.load(*slot);
                    self.expression(index)?;
                    self.expression(expr)?;
                    self.emit(Opcode::Selt);
                }
                Target::Turtle(attribute) => {
                    self.expression(expr)?;
                    self.store_turtle(*attribute);
                }
            },
            Statement::Dim(_, slot, ty, size) => {
                self.expression(size)?;
                self.emit(Opcode::Dim(*ty == Type::StringArray));
                self.store(*slot);
            }
            Statement::Call(_, routine, args) => self.call(*routine, args)?,
            Statement::Command(_, builtin, args) => self.builtin(*builtin, args)?,
            Statement::If(_, condition, then_branch, else_branch) => {
                let else_symbol = self.link.next_symbol();
                self.expression(condition)?;
                self.emit_branch(Opcode::IfNo(0), else_symbol);
                self.statements(then_branch)?;
                if else_branch.is_empty() {
                    self.link.insert(else_symbol, self.ops.len());
                } else {
                    let end_symbol = self.link.next_symbol();
                    self.emit_branch(Opcode::Jump(0), end_symbol);
                    self.link.insert(else_symbol, self.ops.len());
                    self.statements(else_branch)?;
                    self.link.insert(end_symbol, self.ops.len());
                }
            }
            Statement::While(lexeme, condition, body) => {
                let top = self.label();
                let end = self.link.next_symbol();
                self.expression(condition)?;
                self.emit_branch(Opcode::IfNo(0), end);
                self.statements(body)?;
                self.line = lexeme.line;
                self.emit_branch(Opcode::Jump(0), top);
                self.link.insert(end, self.ops.len());
            }
            Statement::Repeat(_, body, condition) => {
                let top = self.label();
                self.statements(body)?;
                self.line = condition.lexeme().line;
                self.expression(condition)?;
                self.emit_branch(Opcode::IfNo(0), top);
            }
            Statement::For(lexeme, for_loop, body) => self.r#for(lexeme, for_loop, body)?,
            Statement::Return(_, value) => {
                if let Some(expr) = value {
                    self.expression(expr)?;
                    self.emit(Opcode::StoreResult);
                }
                let epilogue = self.epilogue;
                self.emit_branch(Opcode::Jump(0), epilogue);
            }
            Statement::End(_) => self.emit(Opcode::Halt),
        }
        Ok(())
    }

    fn r#for(&mut self, lexeme: &Lexeme, for_loop: &ForLoop, body: &[Statement]) -> Result<()> {
        self.expression(&for_loop.from)?;
        self.store(for_loop.counter);
        self.expression(&for_loop.to)?;
        self.store(for_loop.limit);
        match &for_loop.by {
            Some(by) => self.expression(by)?,
            None => self.emit(Opcode::Ldin(1)),
        }
        self.store(for_loop.step);
        let top = self.label();
        let end = self.link.next_symbol();
        match for_loop.by.as_ref().map_or(Some(1), |by| by.constant()) {
            Some(step) => {
                self.load(for_loop.counter);
                self.load(for_loop.limit);
                self.emit(if step < 0 { Opcode::GtEq } else { Opcode::LtEq });
            }
            None => {
                // (step >= 0 AND counter <= limit) OR (step < 0 AND counter >= limit)
                self.load(for_loop.step);
                self.emit(Opcode::Ldin(0));
                self.emit(Opcode::GtEq);
                self.load(for_loop.counter);
                self.load(for_loop.limit);
                self.emit(Opcode::LtEq);
                self.emit(Opcode::And);
                self.load(for_loop.step);
                self.emit(Opcode::Ldin(0));
                self.emit(Opcode::Lt);
                self.load(for_loop.counter);
                self.load(for_loop.limit);
                self.emit(Opcode::GtEq);
                self.emit(Opcode::And);
                self.emit(Opcode::Or);
            }
        }
        self.emit_branch(Opcode::IfNo(0), end);
        self.statements(body)?;
        self.line = lexeme.line;
        self.step_would_overflow(for_loop, end);
        self.load(for_loop.counter);
        self.load(for_loop.step);
        self.emit(Opcode::Add);
        self.store(for_loop.counter);
        self.emit_branch(Opcode::Jump(0), top);
        self.link.insert(end, self.ops.len());
        Ok(())
    }

    /// Leaves the loop through `end` when the next step would pass the
    /// integer range, since it would pass any limit too. The counter then
    /// keeps its last value.
    fn step_would_overflow(&mut self, for_loop: &ForLoop, end: Symbol) {
        match for_loop.by.as_ref().map_or(Some(1), |by| by.constant()) {
            Some(step) if step < 0 => {
                self.load(for_loop.counter);
                self.emit(Opcode::Ldin(i32::MIN - step));
                self.emit(Opcode::GtEq);
                self.emit_branch(Opcode::IfNo(0), end);
            }
            Some(step) => {
                self.load(for_loop.counter);
                self.emit(Opcode::Ldin(i32::MAX - step));
                self.emit(Opcode::LtEq);
                self.emit_branch(Opcode::IfNo(0), end);
            }
            None => {
                let positive = self.link.next_symbol();
                let safe = self.link.next_symbol();
                self.load(for_loop.step);
                self.emit(Opcode::Ldin(0));
                self.emit(Opcode::Lt);
                self.emit_branch(Opcode::IfNo(0), positive);
                self.load(for_loop.counter);
                self.emit(Opcode::Ldin(i32::MIN));
                self.load(for_loop.step);
                self.emit(Opcode::Sub);
                self.emit(Opcode::GtEq);
                self.emit_branch(Opcode::IfNo(0), end);
                self.emit_branch(Opcode::Jump(0), safe);
                self.link.insert(positive, self.ops.len());
                self.load(for_loop.counter);
                self.emit(Opcode::Ldin(i32::MAX));
                self.load(for_loop.step);
                self.emit(Opcode::Sub);
                self.emit(Opcode::LtEq);
                self.emit_branch(Opcode::IfNo(0), end);
                self.link.insert(safe, self.ops.len());
            }
        }
    }

    /// Caller side of a subroutine call. Each save has a matching restore
    /// on the same stack once the callee returns.
    fn call(&mut self, routine: usize, args: &[Expression]) -> Result<()> {
        let options = self.options;
        self.emit(if options.separate_memory_control_stack {
            Opcode::MarkMc
        } else {
            Opcode::Mark
        });
        self.emit(if options.separate_subroutine_register_stack {
            Opcode::SaveRegRs(routine)
        } else {
            Opcode::SaveReg(routine)
        });
        for arg in args {
            self.expression(arg)?;
        }
        let params = args.len();
        let locals = self
            .routines
            .get(routine)
            .map_or(params, |callee| callee.frame_size());
        self.emit(if options.separate_return_stack {
            Opcode::CallRs {
                routine,
                params,
                locals,
            }
        } else {
            Opcode::Call {
                routine,
                params,
                locals,
            }
        });
        self.emit(if options.separate_subroutine_register_stack {
            Opcode::LoadRegRs(routine)
        } else {
            Opcode::LoadReg(routine)
        });
        self.emit(if options.separate_memory_control_stack {
            Opcode::ReleaseMc
        } else {
            Opcode::Release
        });
        Ok(())
    }

    fn builtin(&mut self, builtin: Builtin, args: &[Expression]) -> Result<()> {
        let catalogued = match builtin {
            Builtin::Print => args.get(1).map(|arg| (arg, "FONT")),
            Builtin::Cursor => args.get(0).map(|arg| (arg, "CURSOR")),
            _ => None,
        };
        if let Some((arg, table)) = catalogued {
            if let Some(index) = arg.constant() {
                let found = match builtin {
                    Builtin::Print => self.catalog.font(index).is_some(),
                    _ => self.catalog.cursor(index).is_some(),
                };
                if !found {
                    return Err(
                        error!(NotInCatalog, arg.lexeme(); &format!("NO {} {{lex}}", table)),
                    );
                }
            }
        }
        for arg in args {
            self.expression(arg)?;
        }
        self.emit(Opcode::Builtin(builtin));
        Ok(())
    }

    fn expression(&mut self, expr: &Expression) -> Result<()> {
        match expr {
            Expression::Integer(_, n) => self.emit(Opcode::Ldin(*n)),
            Expression::Boolean(_, b) => self.emit(Opcode::Ldin(if *b { -1 } else { 0 })),
            Expression::String(lexeme, s) => self.string(Some(lexeme), s)?,
            Expression::Variable(_, slot, _) => self.load(*slot),
            Expression::Element(_, slot, _, index) => {
                self.load(*slot);
                self.expression(index)?;
                self.emit(Opcode::Lelt);
            }
            Expression::Turtle(_, attribute) => self.load_turtle(*attribute),
            Expression::Call(_, routine, _, args) => {
                self.call(*routine, args)?;
                self.emit(Opcode::LoadResult);
            }
            Expression::Builtin(_, builtin, args) => self.builtin(*builtin, args)?,
            Expression::Unary(_, op, operand) => {
                self.expression(operand)?;
                match op {
                    Operator::Not => self.emit(Opcode::Not),
                    _ => self.emit(Opcode::Neg),
                }
            }
            Expression::Binary(lexeme, op, lhs, rhs) => {
                self.expression(lhs)?;
                self.expression(rhs)?;
                let opcode = match op {
                    Operator::Plus => Opcode::Add,
                    Operator::Minus => Opcode::Sub,
                    Operator::Multiply => Opcode::Mul,
                    Operator::Divide => Opcode::Divr,
                    Operator::Div => Opcode::Div,
                    Operator::Mod => Opcode::Mod,
                    Operator::Equal => Opcode::Eq,
                    Operator::NotEqual => Opcode::NotEq,
                    Operator::Less => Opcode::Lt,
                    Operator::LessEqual => Opcode::LtEq,
                    Operator::Greater => Opcode::Gt,
                    Operator::GreaterEqual => Opcode::GtEq,
                    Operator::And => Opcode::And,
                    Operator::Or => Opcode::Or,
                    Operator::Eor => Opcode::Eor,
                    Operator::Not | Operator::Assign => {
                        return Err(error!(SyntaxError, lexeme; "UNEXPECTED {lex}"))
                    }
                };
                self.emit(opcode);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::{lex, parse, ErrorCode};

    fn coded(source: &str, options: &Options) -> Result<PCode> {
        let lexemes = lex(source, Dialect::Basic);
        let routines = parse(&lexemes, Dialect::Basic)?;
        code(&routines, Dialect::Basic, options, &Catalog::standard())
    }

    fn ops(source: &str, options: &Options) -> Vec<Vec<Opcode>> {
        match coded(source, options) {
            Ok(pcode) => pcode.routines.into_iter().map(|r| r.ops).collect(),
            Err(e) => panic!("{}", e),
        }
    }

    #[test]
    fn test_main_program_allocates_and_halts() {
        use Opcode::*;
        let routines = ops("x% = 3 * 4\n", &Options::default());
        assert_eq!(
            routines[0],
            vec![Alloc(1), Ldin(0), Stvg(0), Ldin(3), Ldin(4), Mul, Stvg(0), Halt]
        );
    }

    #[test]
    fn test_turtle_globals_shift_slots() {
        use Opcode::*;
        let options = Options {
            turtle_attributes_as_globals: true,
            ..Options::default()
        };
        let routines = ops("x% = TURTX\n", &options);
        assert_eq!(
            routines[0],
            vec![Alloc(6), Ldin(0), Stvg(5), Ldvg(0), Stvg(5), Halt]
        );
    }

    #[test]
    fn test_call_sequence_follows_stack_options() {
        use Opcode::*;
        let source = "PROCa(2)\nEND\nDEF PROCa(n%)\nENDPROC\n";
        let call = |routines: &Vec<Vec<Opcode>>| routines[0][1..8].to_vec();
        assert_eq!(
            call(&ops(source, &Options::default())),
            vec![
                MarkMc,
                SaveRegRs(1),
                Ldin(2),
                CallRs {
                    routine: 1,
                    params: 1,
                    locals: 1
                },
                LoadRegRs(1),
                ReleaseMc,
                Halt
            ]
        );
        let shared = Options {
            separate_return_stack: false,
            separate_memory_control_stack: false,
            separate_subroutine_register_stack: false,
            ..Options::default()
        };
        let routines = ops(source, &shared);
        assert_eq!(
            call(&routines),
            vec![
                Mark,
                SaveReg(1),
                Ldin(2),
                Call {
                    routine: 1,
                    params: 1,
                    locals: 1
                },
                LoadReg(1),
                Release,
                Halt
            ]
        );
        assert_eq!(routines[1], vec![Ret]);
    }

    #[test]
    fn test_initialise_locals() {
        use Opcode::*;
        let source = "PROCa\nEND\nDEF PROCa\nLOCAL n%\nn% = n% + 1\nENDPROC\n";
        let routines = ops(source, &Options::default());
        assert_eq!(&routines[1][..2], &[Ldin(0), Stvr(1, 0)]);
        let options = Options {
            initialise_locals: false,
            ..Options::default()
        };
        let routines = ops(source, &options);
        assert_eq!(routines[1][0], Ldvr(1, 0));
    }

    #[test]
    fn test_strings_without_cstr() {
        use Opcode::*;
        let options = Options {
            allow_cstr: false,
            ..Options::default()
        };
        let routines = ops("WRITE(\"hi\")\n", &options);
        assert_eq!(
            routines[0],
            vec![Alloc(0), Ldin(104), Ldin(105), Ldin(2), Mkst, Builtin(crate::lang::Builtin::Write), Halt]
        );
        let long = format!("WRITE(\"{}\")\n", "x".repeat(256));
        let e = coded(&long, &options).err();
        assert_eq!(e.map(|e| e.code()), Some(ErrorCode::Unsupported as u16));
        assert!(coded(&long, &Options::default()).is_ok());
    }

    #[test]
    fn test_branches_are_linked() {
        use Opcode::*;
        let routines = ops("WHILE TURTX < 10\nFORWARD(1)\nENDWHILE\n", &Options::default());
        assert_eq!(
            routines[0],
            vec![
                Alloc(0),
                Ldtu(TurtleAttribute::X),
                Ldin(10),
                Lt,
                IfNo(8),
                Ldin(1),
                Builtin(crate::lang::Builtin::Forward),
                Jump(1),
                Halt
            ]
        );
    }

    #[test]
    fn test_catalog_literals() {
        let e = coded("CURSOR(99)\n", &Options::default()).err();
        assert_eq!(e.as_ref().map(|e| e.code()), Some(ErrorCode::NotInCatalog as u16));
        assert_eq!(e.map(|e| e.text()), Some("NO CURSOR \"99\"".to_string()));
        assert!(coded("PRINT(\"hi\", 0, 12)\n", &Options::default()).is_ok());
    }

    #[test]
    fn test_line_table() {
        let pcode = match coded("x% = 1\n\ny% = 2\n", &Options::default()) {
            Ok(pcode) => pcode,
            Err(e) => panic!("{}", e),
        };
        let main = &pcode.routines[0];
        assert_eq!(main.lines.len(), main.ops.len());
        assert_eq!(main.line(5), Some(1));
        assert_eq!(main.line(7), Some(3));
    }
}
