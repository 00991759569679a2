#![allow(dead_code)]
use std::rc::Rc;
use turtle::compile_with;
use turtle::lang::{Dialect, Error};
use turtle::mach::{Catalog, Drawing, Event, Machine, Options};

pub fn machine(source: &str, dialect: Dialect, options: Options) -> Machine {
    let catalog = Rc::new(Catalog::standard());
    let compiled = match compile_with(source, dialect, &options, &catalog) {
        Ok(compiled) => compiled,
        Err(e) => panic!("{}", e),
    };
    let mut machine = match Machine::new(compiled.pcode, options, catalog) {
        Ok(machine) => machine,
        Err(e) => panic!("{}", e),
    };
    machine.seed(1);
    if let Err(e) = machine.start() {
        panic!("{}", e);
    }
    machine
}

pub fn compile_error(source: &str, dialect: Dialect) -> Error {
    match turtle::compile(source, dialect) {
        Ok(compiled) => panic!("compiled {}", compiled.pcode),
        Err(e) => e,
    }
}

/// Output of a BASIC program run with default options.
pub fn run(source: &str) -> String {
    exec(&mut machine(source, Dialect::Basic, Options::default()))
}

pub fn run_comal(source: &str) -> String {
    exec(&mut machine(source, Dialect::Comal, Options::default()))
}

pub fn exec(machine: &mut Machine) -> String {
    exec_n(machine, 5000)
}

/// Collects printed text until the program ends, faults or wants input.
/// Faults are appended as a line of their own.
pub fn exec_n(machine: &mut Machine, cycles: usize) -> String {
    let mut s = String::new();
    let mut prev_running = false;
    loop {
        let event = machine.execute(cycles);
        match &event {
            Event::Finished | Event::Stopped | Event::Paused => break,
            Event::Fault(error) => {
                s.push_str(&format!("{}\n", error));
                break;
            }
            Event::Running => {
                if prev_running {
                    s.push_str(&format!("\n{} Execution cycles exceeded.\n", cycles));
                    break;
                }
            }
            Event::Print(ps) => s.push_str(ps),
            Event::Input(_) => break,
        }
        prev_running = event == Event::Running;
    }
    s
}

/// Output and drawings of a run under `options`.
pub fn trace(source: &str, dialect: Dialect, options: Options) -> (String, Vec<Drawing>) {
    let mut machine = machine(source, dialect, options);
    let output = exec(&mut machine);
    (output, machine.drawings())
}
