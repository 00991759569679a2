use super::options::{DEFAULT_KEY_BUFFER, MAX_CANVAS, TURTLE_SLOTS};
use super::*;
use crate::error;
use crate::lang::{Builtin, Error, TurtleAttribute};
use chrono::{DateTime, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::convert::TryFrom;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Running,
    /// Running, but blocked on `GETKEY$` or `READLN$`.
    WaitingForInput,
    Paused,
    Finished,
    Faulted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Key,
    Line,
}

/// Why `execute` or `step` handed control back to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The cycle budget ran out; call `execute` again.
    Running,
    Print(String),
    Input(InputKind),
    Paused,
    Stopped,
    Finished,
    Fault(Error),
}

#[derive(Debug)]
struct KeyBuffer {
    keys: VecDeque<char>,
    capacity: usize,
}

impl KeyBuffer {
    fn new(capacity: usize) -> KeyBuffer {
        KeyBuffer {
            keys: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Keys arriving at a full buffer are dropped.
    fn push(&mut self, key: char) {
        if self.keys.len() < self.capacity {
            self.keys.push_back(key);
        }
    }
}

/// ## Pcode machine
///
/// Runs cooperatively on the caller's thread. The host drives it with
/// `execute`, drains `drawings` and answers `Event::Input` with `key`
/// or `line`.
pub struct Machine {
    pcode: PCode,
    options: Options,
    catalog: Rc<Catalog>,
    state: State,
    stop_requested: bool,
    fault: Option<Error>,
    waiting: Option<InputKind>,
    routine: usize,
    pc: Address,
    stack: Stack<Val>,
    return_stack: Option<Stack<Val>>,
    memory_stack: Option<Stack<Val>>,
    register_stack: Option<Stack<Val>>,
    memory: Memory,
    registers: Vec<Option<Address>>,
    result: Option<Val>,
    turtle: Turtle,
    drawings: VecDeque<Drawing>,
    keys: Option<KeyBuffer>,
    lines: VecDeque<String>,
    rng: StdRng,
    started: DateTime<Utc>,
}

fn dedicated<'s>(stack: &'s mut Option<Stack<Val>>, name: &str) -> Result<&'s mut Stack<Val>> {
    match stack {
        Some(stack) => Ok(stack),
        None => Err(error!(UnsupportedArchitecture; &format!("NO {}", name))),
    }
}

impl Machine {
    /// Checks the pcode was coded for `options` before anything runs.
    pub fn new(pcode: PCode, options: Options, catalog: Rc<Catalog>) -> Result<Machine> {
        if pcode.signature != options.signature() {
            return Err(error!(OptionsMismatch; &format!(
                "PCODE {:08X} MACHINE {:08X}",
                pcode.signature,
                options.signature()
            )));
        }
        let size = options.canvas_start_size;
        if size < 1 || size > MAX_CANVAS {
            return Err(error!(CanvasUnavailable; &format!("SIZE {}", size)));
        }
        let routines = pcode.routines.len();
        Ok(Machine {
            pcode,
            options,
            catalog,
            state: State::Idle,
            stop_requested: false,
            fault: None,
            waiting: None,
            routine: 0,
            pc: 0,
            stack: Stack::new("OPERAND STACK"),
            return_stack: if options.separate_return_stack {
                Some(Stack::new("RETURN STACK"))
            } else {
                None
            },
            memory_stack: if options.separate_memory_control_stack {
                Some(Stack::new("MEMORY CONTROL STACK"))
            } else {
                None
            },
            register_stack: if options.separate_subroutine_register_stack {
                Some(Stack::new("SUBROUTINE REGISTER STACK"))
            } else {
                None
            },
            memory: Memory::new(),
            registers: vec![None; routines],
            result: None,
            turtle: Turtle::home(size),
            drawings: VecDeque::new(),
            keys: None,
            lines: VecDeque::new(),
            rng: StdRng::from_entropy(),
            started: Utc::now(),
        })
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn fault(&self) -> Option<&Error> {
        self.fault.as_ref()
    }

    /// Make `RND` repeatable.
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Current turtle, read from global memory when attributes live there.
    pub fn turtle(&self) -> Turtle {
        self.load_turtle().unwrap_or(self.turtle)
    }

    /// Take every drawing command queued since the last call.
    pub fn drawings(&mut self) -> Vec<Drawing> {
        self.drawings.drain(..).collect()
    }

    fn set_state(&mut self, state: State) {
        log::trace!("machine {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    fn invalid(&self, action: &str) -> Error {
        error!(InvalidState; &format!("CANNOT {} WHEN {:?}", action, self.state).to_ascii_uppercase())
    }

    pub fn start(&mut self) -> Result<()> {
        if self.state != State::Idle {
            return Err(self.invalid("start"));
        }
        self.routine = 0;
        self.pc = 0;
        self.stack.clear();
        for stack in vec![
            self.return_stack.as_mut(),
            self.memory_stack.as_mut(),
            self.register_stack.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            stack.clear();
        }
        self.memory.clear();
        self.registers = vec![None; self.pcode.routines.len()];
        self.result = None;
        self.turtle = Turtle::home(self.options.canvas_start_size);
        if self.options.turtle_attributes_as_globals {
            self.memory.alloc(TURTLE_SLOTS)?;
            self.save_turtle(self.turtle)?;
        }
        self.drawings.clear();
        self.keys = if self.options.setup_default_key_buffer {
            Some(KeyBuffer::new(DEFAULT_KEY_BUFFER))
        } else {
            None
        };
        self.lines.clear();
        self.waiting = None;
        self.fault = None;
        self.stop_requested = false;
        self.started = Utc::now();
        self.set_state(State::Running);
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        match self.state {
            State::Running | State::WaitingForInput => {
                self.set_state(State::Paused);
                Ok(())
            }
            _ => Err(self.invalid("pause")),
        }
    }

    pub fn resume(&mut self) -> Result<()> {
        if self.state != State::Paused {
            return Err(self.invalid("resume"));
        }
        if self.waiting.is_some() {
            self.set_state(State::WaitingForInput);
        } else {
            self.set_state(State::Running);
        }
        Ok(())
    }

    /// Running machines stop at the next `execute`; paused and waiting
    /// machines stop at once. Finished and faulted machines return to
    /// `Idle` so they can be started again.
    pub fn stop(&mut self) {
        match self.state {
            State::Running => self.stop_requested = true,
            State::Paused | State::WaitingForInput | State::Finished | State::Faulted => {
                self.waiting = None;
                self.set_state(State::Idle);
            }
            State::Idle => {}
        }
    }

    /// Deliver a key press. Ignored when the program has no key buffer.
    pub fn key(&mut self, key: char) {
        if let Some(buffer) = &mut self.keys {
            buffer.push(key);
            if self.waiting == Some(InputKind::Key) {
                self.input_arrived();
            }
        }
    }

    /// Deliver a line of text for `READLN$`.
    pub fn line(&mut self, line: &str) {
        self.lines.push_back(line.to_string());
        if self.waiting == Some(InputKind::Line) {
            self.input_arrived();
        }
    }

    fn input_arrived(&mut self) {
        self.waiting = None;
        if self.state == State::WaitingForInput {
            self.set_state(State::Running);
        }
    }

    /// Run up to `cycles` instructions.
    pub fn execute(&mut self, cycles: usize) -> Event {
        match self.state {
            State::Idle => return Event::Stopped,
            State::Paused => return Event::Paused,
            State::Finished => return Event::Finished,
            State::Faulted => {
                return Event::Fault(self.fault.clone().unwrap_or_else(|| self.invalid("execute")))
            }
            State::WaitingForInput => {
                if let Some(kind) = self.waiting {
                    if !self.stop_requested {
                        return Event::Input(kind);
                    }
                }
            }
            State::Running => {}
        }
        if self.stop_requested {
            self.stop_requested = false;
            self.waiting = None;
            self.set_state(State::Idle);
            return Event::Stopped;
        }
        for _ in 0..cycles {
            if let Some(event) = self.run_cycle() {
                if let Event::Input(_) = event {
                    self.set_state(State::WaitingForInput);
                }
                return event;
            }
        }
        Event::Running
    }

    /// Run one instruction of a paused machine.
    pub fn step(&mut self) -> Result<Event> {
        if self.state != State::Paused {
            return Err(self.invalid("step"));
        }
        if let Some(kind) = self.waiting {
            return Ok(Event::Input(kind));
        }
        Ok(self.run_cycle().unwrap_or(Event::Paused))
    }

    fn run_cycle(&mut self) -> Option<Event> {
        let routine = self.routine;
        let addr = self.pc;
        match self.cycle() {
            Ok(event) => event,
            Err(e) => {
                let e = match self.pcode.routines.get(routine) {
                    Some(code) => {
                        let e = match code.line(addr) {
                            Some(line) if line > 0 => e.in_line(line),
                            _ => e,
                        };
                        e.in_routine(&code.name)
                    }
                    None => e,
                };
                log::debug!("machine fault: {}", e);
                self.fault = Some(e.clone());
                self.set_state(State::Faulted);
                Some(Event::Fault(e))
            }
        }
    }

    fn cycle(&mut self) -> Result<Option<Event>> {
        let op = match self
            .pcode
            .routines
            .get(self.routine)
            .and_then(|code| code.ops.get(self.pc))
        {
            Some(op) => op.clone(),
            None => {
                return Err(error!(MemoryFault; &format!(
                    "NO INSTRUCTION AT {}:{}",
                    self.routine, self.pc
                )))
            }
        };
        self.pc += 1;
        match op {
            Opcode::Alloc(len) => self.memory.alloc(len)?,
            Opcode::Ldin(n) => self.stack.push(Val::Integer(n))?,
            Opcode::Cstr(s) => self.stack.push(Val::String(s))?,
            Opcode::Mkst => {
                let len = self.pop_int()?;
                let len = usize::try_from(len)
                    .map_err(|_| error!(IllegalFunctionCall; &format!("STRING LENGTH {}", len)))?;
                let mut s = String::with_capacity(len);
                for code in self.stack.pop_n(len)? {
                    let code = i32::try_from(code)?;
                    match u32::try_from(code).ok().and_then(std::char::from_u32) {
                        Some(ch) => s.push(ch),
                        None => {
                            return Err(error!(IllegalFunctionCall; &format!("CHARACTER {}", code)))
                        }
                    }
                }
                self.stack.push(Val::from(s))?;
            }
            Opcode::Ldvg(addr) => {
                let val = self.memory.get(addr)?.clone();
                if val == Val::Undefined {
                    return Err(error!(Uninitialised; &format!("GLOBAL {}", addr)));
                }
                self.stack.push(val)?;
            }
            Opcode::Stvg(addr) => {
                let val = self.stack.pop()?;
                if self.options.turtle_attributes_as_globals && addr < TURTLE_SLOTS {
                    self.set_attribute(TurtleAttribute::ALL[addr], val)?;
                } else {
                    self.memory.set(addr, val)?;
                }
            }
            Opcode::Ldvr(routine, offset) => {
                let addr = self.register(routine)? + offset;
                let val = self.memory.get(addr)?.clone();
                if val == Val::Undefined {
                    return Err(error!(Uninitialised; &format!("LOCAL {}", offset)));
                }
                self.stack.push(val)?;
            }
            Opcode::Stvr(routine, offset) => {
                let addr = self.register(routine)? + offset;
                let val = self.stack.pop()?;
                self.memory.set(addr, val)?;
            }
            Opcode::Ldtu(attribute) => {
                let turtle = self.load_turtle()?;
                self.stack.push(Val::Integer(turtle.get(attribute)))?;
            }
            Opcode::Sttu(attribute) => {
                let val = self.stack.pop()?;
                self.set_attribute(attribute, val)?;
            }
            Opcode::Dim(strings) => {
                let size = self.pop_int()?;
                let array = self.memory.dim(size, strings)?;
                self.stack.push(array)?;
            }
            Opcode::Lelt => {
                let index = self.pop_int()?;
                let array = self.stack.pop()?;
                let val = self.memory.element(array, index)?;
                self.stack.push(val)?;
            }
            Opcode::Selt => {
                let val = self.stack.pop()?;
                let index = self.pop_int()?;
                let array = self.stack.pop()?;
                self.memory.set_element(array, index, val)?;
            }

            Opcode::Jump(addr) => self.pc = addr,
            Opcode::IfNo(addr) => {
                if self.pop_int()? == 0 {
                    self.pc = addr;
                }
            }
            Opcode::Halt => {
                self.set_state(State::Finished);
                return Ok(Some(Event::Finished));
            }

            Opcode::Mark => {
                let mark = self.memory.mark();
                self.stack.push(mark)?;
            }
            Opcode::MarkMc => {
                let mark = self.memory.mark();
                dedicated(&mut self.memory_stack, "MEMORY CONTROL STACK")?.push(mark)?;
            }
            Opcode::Release => {
                let mark = self.stack.pop()?;
                self.memory.release(mark)?;
            }
            Opcode::ReleaseMc => {
                let mark = dedicated(&mut self.memory_stack, "MEMORY CONTROL STACK")?.pop()?;
                self.memory.release(mark)?;
            }
            Opcode::SaveReg(routine) => {
                let saved = Val::Register(self.saved_register(routine)?);
                self.stack.push(saved)?;
            }
            Opcode::SaveRegRs(routine) => {
                let saved = Val::Register(self.saved_register(routine)?);
                dedicated(&mut self.register_stack, "SUBROUTINE REGISTER STACK")?.push(saved)?;
            }
            Opcode::LoadReg(routine) => {
                let saved = self.stack.pop()?;
                self.restore_register(routine, saved)?;
            }
            Opcode::LoadRegRs(routine) => {
                let saved =
                    dedicated(&mut self.register_stack, "SUBROUTINE REGISTER STACK")?.pop()?;
                self.restore_register(routine, saved)?;
            }
            Opcode::Call {
                routine,
                params,
                locals,
            } => {
                let ret = self.enter(routine, params, locals)?;
                self.stack.push(ret)?;
            }
            Opcode::CallRs {
                routine,
                params,
                locals,
            } => {
                dedicated(&mut self.return_stack, "RETURN STACK")?;
                let ret = self.enter(routine, params, locals)?;
                dedicated(&mut self.return_stack, "RETURN STACK")?.push(ret)?;
            }
            Opcode::Ret => {
                let ret = self.stack.pop()?;
                self.leave(ret)?;
            }
            Opcode::RetRs => {
                let ret = dedicated(&mut self.return_stack, "RETURN STACK")?.pop()?;
                self.leave(ret)?;
            }
            Opcode::StoreResult => self.result = Some(self.stack.pop()?),
            Opcode::LoadResult => match self.result.take() {
                Some(val) => self.stack.push(val)?,
                None => return Err(error!(NoFunctionResult)),
            },

            Opcode::Neg => {
                let val = self.stack.pop()?;
                self.stack.push(Operation::negate(val)?)?;
            }
            Opcode::Not => {
                let val = self.stack.pop()?;
                self.stack.push(Operation::not(val)?)?;
            }
            Opcode::Add => self.binary(Operation::sum)?,
            Opcode::Sub => self.binary(Operation::subtract)?,
            Opcode::Mul => self.binary(Operation::multiply)?,
            Opcode::Divr => self.binary(Operation::divide)?,
            Opcode::Div => self.binary(Operation::div)?,
            Opcode::Mod => self.binary(Operation::modulo)?,
            Opcode::And => self.binary(Operation::and)?,
            Opcode::Or => self.binary(Operation::or)?,
            Opcode::Eor => self.binary(Operation::eor)?,
            Opcode::Eq => self.compare(Ordering::is_eq)?,
            Opcode::NotEq => self.compare(Ordering::is_ne)?,
            Opcode::Lt => self.compare(Ordering::is_lt)?,
            Opcode::LtEq => self.compare(Ordering::is_le)?,
            Opcode::Gt => self.compare(Ordering::is_gt)?,
            Opcode::GtEq => self.compare(Ordering::is_ge)?,

            Opcode::Builtin(builtin) => return self.builtin(builtin),
        }
        Ok(None)
    }

    fn pop_int(&mut self) -> Result<i32> {
        i32::try_from(self.stack.pop()?)
    }

    fn pop_ints(&mut self, len: usize) -> Result<Vec<i32>> {
        self.stack
            .pop_n(len)?
            .into_iter()
            .map(i32::try_from)
            .collect()
    }

    fn pop_string(&mut self) -> Result<Rc<str>> {
        Rc::<str>::try_from(self.stack.pop()?)
    }

    fn binary(&mut self, f: fn(Val, Val) -> Result<Val>) -> Result<()> {
        let (lhs, rhs) = self.stack.pop_2()?;
        self.stack.push(f(lhs, rhs)?)
    }

    fn compare(&mut self, test: fn(Ordering) -> bool) -> Result<()> {
        let (lhs, rhs) = self.stack.pop_2()?;
        self.stack.push(Operation::compare(lhs, rhs, test)?)
    }

    fn register(&self, routine: usize) -> Result<Address> {
        match self.registers.get(routine) {
            Some(Some(base)) => Ok(*base),
            Some(None) => Err(error!(MemoryFault; &format!("ROUTINE {} HAS NO FRAME", routine))),
            None => Err(error!(UnresolvedCall; &format!("ROUTINE {}", routine))),
        }
    }

    fn saved_register(&self, routine: usize) -> Result<Option<Address>> {
        match self.registers.get(routine) {
            Some(base) => Ok(*base),
            None => Err(error!(UnresolvedCall; &format!("ROUTINE {}", routine))),
        }
    }

    fn restore_register(&mut self, routine: usize, saved: Val) -> Result<()> {
        let base = match saved {
            Val::Register(base) => base,
            _ => {
                return Err(error!(TypeMismatch; &format!(
                    "{} WHERE REGISTER EXPECTED",
                    saved.type_name()
                )))
            }
        };
        match self.registers.get_mut(routine) {
            Some(register) => {
                *register = base;
                Ok(())
            }
            None => Err(error!(UnresolvedCall; &format!("ROUTINE {}", routine))),
        }
    }

    /// Build the callee frame and jump to it, returning the resume point.
    fn enter(&mut self, routine: usize, params: usize, locals: usize) -> Result<Val> {
        if routine == 0 || routine >= self.pcode.routines.len() {
            return Err(error!(UnresolvedCall; &format!("ROUTINE {}", routine)));
        }
        let args = self.stack.pop_n(params)?;
        let base = self.memory.frame(args, locals)?;
        self.registers[routine] = Some(base);
        let ret = Val::Return(self.routine, self.pc);
        self.result = None;
        self.routine = routine;
        self.pc = 0;
        Ok(ret)
    }

    fn leave(&mut self, ret: Val) -> Result<()> {
        match ret {
            Val::Return(routine, addr) => {
                self.routine = routine;
                self.pc = addr;
                Ok(())
            }
            _ => Err(error!(TypeMismatch; &format!(
                "{} WHERE RETURN ADDRESS EXPECTED",
                ret.type_name()
            ))),
        }
    }

    fn load_turtle(&self) -> Result<Turtle> {
        let mut turtle = self.turtle;
        if self.options.turtle_attributes_as_globals {
            turtle.x = i32::try_from(self.memory.get(TurtleAttribute::X.slot())?.clone())?;
            turtle.y = i32::try_from(self.memory.get(TurtleAttribute::Y.slot())?.clone())?;
            turtle.direction =
                i32::try_from(self.memory.get(TurtleAttribute::Direction.slot())?.clone())?;
            turtle.thickness =
                i32::try_from(self.memory.get(TurtleAttribute::Thickness.slot())?.clone())?;
            turtle.colour =
                i32::try_from(self.memory.get(TurtleAttribute::Colour.slot())?.clone())?;
        }
        Ok(turtle)
    }

    fn save_turtle(&mut self, turtle: Turtle) -> Result<()> {
        self.turtle = turtle;
        if self.options.turtle_attributes_as_globals {
            for attribute in TurtleAttribute::ALL.iter() {
                self.memory
                    .set(attribute.slot(), Val::Integer(turtle.get(*attribute)))?;
            }
        }
        Ok(())
    }

    fn update_turtle(&mut self, f: impl FnOnce(&mut Turtle) -> Drawing) -> Result<()> {
        let mut turtle = self.load_turtle()?;
        let drawing = f(&mut turtle);
        self.save_turtle(turtle)?;
        self.drawings.push_back(drawing);
        Ok(())
    }

    fn set_attribute(&mut self, attribute: TurtleAttribute, val: Val) -> Result<()> {
        let value = i32::try_from(val)?;
        self.update_turtle(|turtle| turtle.set(attribute, value))
    }

    fn builtin(&mut self, builtin: Builtin) -> Result<Option<Event>> {
        match builtin {
            Builtin::Forward | Builtin::Back => {
                let n = self.pop_int()?;
                let n = if builtin == Builtin::Back { n.saturating_neg() } else { n };
                self.update_turtle(|t| t.forward(n))?;
            }
            Builtin::Left | Builtin::Right => {
                let n = self.pop_int()?;
                let n = if builtin == Builtin::Left { n.saturating_neg() } else { n };
                self.update_turtle(|t| t.turn(n))?;
            }
            Builtin::Drawxy | Builtin::Movexy => {
                let d = self.pop_ints(2)?;
                self.update_turtle(|t| {
                    t.travel(t.x.saturating_add(d[0]), t.y.saturating_add(d[1]), builtin == Builtin::Drawxy)
                })?;
            }
            Builtin::Setx => {
                let x = self.pop_int()?;
                self.update_turtle(|t| t.travel(x, t.y, false))?;
            }
            Builtin::Sety => {
                let y = self.pop_int()?;
                self.update_turtle(|t| t.travel(t.x, y, false))?;
            }
            Builtin::Setxy => {
                let p = self.pop_ints(2)?;
                self.update_turtle(|t| t.travel(p[0], p[1], false))?;
            }
            Builtin::Direction => {
                let d = self.pop_int()?;
                self.update_turtle(|t| t.turn_to(d))?;
            }
            Builtin::Turnxy => {
                let d = self.pop_ints(2)?;
                self.update_turtle(|t| t.turn_xy(d[0], d[1]))?;
            }
            Builtin::Home => {
                let centre = self.options.canvas_start_size / 2;
                self.update_turtle(|t| t.travel(centre, centre, false))?;
                self.update_turtle(|t| t.turn_to(0))?;
            }
            Builtin::Penup | Builtin::Pendown => {
                self.update_turtle(|t| t.pen(builtin == Builtin::Pendown))?;
            }
            Builtin::Thickness => {
                let val = self.stack.pop()?;
                self.set_attribute(TurtleAttribute::Thickness, val)?;
            }
            Builtin::Colour => {
                let val = self.stack.pop()?;
                self.set_attribute(TurtleAttribute::Colour, val)?;
            }
            Builtin::Blot | Builtin::Circle => {
                let radius = self.pop_int()?;
                let t = self.load_turtle()?;
                self.drawings.push_back(if builtin == Builtin::Blot {
                    Drawing::Blot {
                        x: t.x,
                        y: t.y,
                        radius,
                        colour: t.colour,
                    }
                } else {
                    Drawing::Circle {
                        x: t.x,
                        y: t.y,
                        radius,
                        colour: t.colour,
                        thickness: t.thickness,
                    }
                });
            }
            Builtin::Box => {
                let b = self.pop_ints(4)?;
                let t = self.load_turtle()?;
                self.drawings.push_back(Drawing::Box {
                    x: t.x,
                    y: t.y,
                    width: b[0],
                    height: b[1],
                    colour: b[2],
                    border: b[3] != 0,
                });
            }
            Builtin::Blank => {
                let colour = self.pop_int()?;
                self.drawings.push_back(Drawing::Clear { colour });
            }
            Builtin::Cursor => {
                let index = self.pop_int()?;
                if self.catalog.cursor(index).is_none() {
                    return Err(error!(IllegalFunctionCall; &format!("CURSOR({})", index)));
                }
                self.drawings.push_back(Drawing::Cursor { index });
            }
            Builtin::Print => {
                let p = self.pop_ints(2)?;
                let text = self.pop_string()?;
                if self.catalog.font(p[0]).is_none() {
                    return Err(error!(IllegalFunctionCall; &format!("FONT {}", p[0])));
                }
                let t = self.load_turtle()?;
                self.drawings.push_back(Drawing::Text {
                    text: text.to_string(),
                    font: p[0],
                    size: p[1],
                    x: t.x,
                    y: t.y,
                    colour: t.colour,
                });
            }
            Builtin::Canvas => {
                let c = self.pop_ints(4)?;
                if c[2] < 1 || c[3] < 1 {
                    return Err(error!(IllegalFunctionCall; &format!("CANVAS SIZE {} BY {}", c[2], c[3])));
                }
                self.drawings.push_back(Drawing::Canvas {
                    x: c[0],
                    y: c[1],
                    width: c[2],
                    height: c[3],
                });
            }
            Builtin::Write => {
                let text = self.pop_string()?;
                return Ok(Some(Event::Print(text.to_string())));
            }
            Builtin::Writeln => {
                let text = self.pop_string()?;
                return Ok(Some(Event::Print(format!("{}\n", text))));
            }
            Builtin::Keybuffer => {
                let n = self.pop_int()?;
                match usize::try_from(n) {
                    Ok(capacity) if capacity > 0 => self.keys = Some(KeyBuffer::new(capacity)),
                    _ => return Err(error!(IllegalFunctionCall; &format!("KEYBUFFER({})", n))),
                }
            }
            Builtin::Getkey => {
                let key = match &mut self.keys {
                    Some(buffer) => buffer.keys.pop_front(),
                    None => return Err(error!(NoKeyBuffer)),
                };
                match key {
                    Some(key) => self.stack.push(Val::from(key.to_string()))?,
                    None => return Ok(Some(self.wait(InputKind::Key))),
                }
            }
            Builtin::Readln => match self.lines.pop_front() {
                Some(line) => self.stack.push(Val::from(line))?,
                None => return Ok(Some(self.wait(InputKind::Line))),
            },
            Builtin::Rnd => {
                let n = self.pop_int()?;
                if n < 1 {
                    return Err(error!(IllegalFunctionCall; &format!("RND({})", n)));
                }
                let r = self.rng.gen_range(1..=n);
                self.stack.push(Val::Integer(r))?;
            }
            Builtin::Time => {
                let elapsed = (Utc::now() - self.started).num_milliseconds();
                let centiseconds = i32::try_from(elapsed / 10).unwrap_or(i32::MAX);
                self.stack.push(Val::Integer(centiseconds))?;
            }
            _ => {
                let val = self.function(builtin)?;
                self.stack.push(val)?;
            }
        }
        Ok(None)
    }

    fn function(&mut self, builtin: Builtin) -> Result<Val> {
        let mut args = self.stack.pop_n(builtin.params().len())?.into_iter();
        let mut arg = || args.next().unwrap_or(Val::Undefined);
        match builtin {
            Builtin::Abs => Function::abs(arg()),
            Builtin::Sgn => Function::sgn(arg()),
            Builtin::Max => Function::max(arg(), arg()),
            Builtin::Min => Function::min(arg(), arg()),
            Builtin::Sqrt => Function::sqrt(arg()),
            Builtin::Sin => Function::sin(arg(), arg()),
            Builtin::Cos => Function::cos(arg(), arg()),
            Builtin::Rgb => Function::rgb(arg(), arg(), arg()),
            Builtin::Len => Function::len(arg()),
            Builtin::Str => Function::str(arg()),
            Builtin::Val => Function::val(arg()),
            Builtin::Chr => Function::chr(arg()),
            Builtin::Asc => Function::asc(arg()),
            Builtin::Mid => Function::mid(arg(), arg(), arg()),
            _ => Err(error!(IllegalFunctionCall; &format!("{} IS NOT A FUNCTION", builtin))),
        }
    }

    /// Rewind onto the input instruction so it runs again once input arrives.
    fn wait(&mut self, kind: InputKind) -> Event {
        self.pc -= 1;
        self.waiting = Some(kind);
        Event::Input(kind)
    }
}
