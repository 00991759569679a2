extern crate ansi_term;
extern crate ctrlc;
extern crate linefeed;
use turtle::compile_with;
use turtle::lang::{lex, Dialect, LexemeKind};
use turtle::mach::{Catalog, Drawing, Event, InputKind, Machine, Options};
use ansi_term::{Colour, Style};
use clap::{Args, Parser, Subcommand};
use linefeed::{Interface, ReadResult, Signal};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "turtle", version)]
/// Turtle graphics compiler and pcode machine
struct Cli {
    /// Log more; repeat for trace output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the lexemes of a program
    Lex {
        #[command(flatten)]
        source: Source,
    },
    /// Print the pcode of a program
    Compile {
        #[command(flatten)]
        source: Source,
        /// Print command and structure usage
        #[arg(long)]
        usage: bool,
        /// Print usage as JSON instead of the listing
        #[arg(long)]
        json: bool,
    },
    /// Compile and run a program
    Run {
        #[command(flatten)]
        source: Source,
        /// Print drawing commands as JSON lines
        #[arg(long)]
        json: bool,
        /// Instructions per batch
        #[arg(long, default_value_t = 10_000)]
        cycles: usize,
        /// Seed for RND
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Args)]
struct Source {
    /// Program file; a `.tc` extension selects COMAL
    path: PathBuf,

    /// basic or comal, overriding the file extension
    #[arg(long, short)]
    dialect: Option<Dialect>,

    /// JSON file of machine options
    #[arg(long)]
    options: Option<PathBuf>,

    /// Canvas width and height
    #[arg(long)]
    canvas: Option<i32>,

    /// Keep turtle attributes in global memory
    #[arg(long)]
    turtle_globals: bool,

    /// Leave locals undefined on routine entry
    #[arg(long)]
    no_init_locals: bool,

    /// Build string literals from character codes
    #[arg(long)]
    no_cstr: bool,

    /// Use the operand stack for returns, marks and registers
    #[arg(long)]
    shared_stacks: bool,
}

impl Source {
    fn dialect(&self) -> Dialect {
        match self.dialect {
            Some(dialect) => dialect,
            None => match self.path.extension().and_then(|e| e.to_str()) {
                Some(ext) => ext.parse().unwrap_or(Dialect::Basic),
                None => Dialect::Basic,
            },
        }
    }

    fn text(&self) -> Result<String> {
        let mut text = String::new();
        BufReader::new(File::open(&self.path)?).read_to_string(&mut text)?;
        Ok(text)
    }

    fn options(&self) -> Result<Options> {
        let mut options: Options = match &self.options {
            Some(path) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
            None => Options::default(),
        };
        if let Some(size) = self.canvas {
            options.canvas_start_size = size;
        }
        if self.turtle_globals {
            options.turtle_attributes_as_globals = true;
        }
        if self.no_init_locals {
            options.initialise_locals = false;
        }
        if self.no_cstr {
            options.allow_cstr = false;
        }
        if self.shared_stacks {
            options.separate_return_stack = false;
            options.separate_memory_control_stack = false;
            options.separate_subroutine_register_stack = false;
        }
        Ok(options)
    }
}

struct Logger {
    level: log::LevelFilter,
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let style = match record.level() {
            log::Level::Error => Colour::Red.bold(),
            log::Level::Warn => Colour::Yellow.normal(),
            log::Level::Info => Style::new().bold(),
            log::Level::Debug | log::Level::Trace => Style::new().dimmed(),
        };
        eprintln!("{} {}", style.paint(record.level().to_string()), record.args());
    }

    fn flush(&self) {}
}

pub fn main() {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    if log::set_boxed_logger(Box::new(Logger { level })).is_ok() {
        log::set_max_level(level);
    }
    let result = match &cli.command {
        Command::Lex { source } => lex_command(source),
        Command::Compile {
            source,
            usage,
            json,
        } => compile_command(source, *usage, *json),
        Command::Run {
            source,
            json,
            cycles,
            seed,
        } => run_command(source, *json, *cycles, *seed),
    };
    if let Err(error) = result {
        eprintln!("{}", Colour::Red.bold().paint(error.to_string()));
        std::process::exit(1);
    }
}

fn lex_command(source: &Source) -> Result<()> {
    for lexeme in lex(&source.text()?, source.dialect()) {
        if lexeme.kind == LexemeKind::Newline {
            continue;
        }
        println!(
            "{:>4}:{:<3} {:<24} {}",
            lexeme.line,
            lexeme.column,
            format!("{:?}", lexeme.kind),
            lexeme.content
        );
    }
    Ok(())
}

fn compile_command(source: &Source, usage: bool, json: bool) -> Result<()> {
    let options = source.options()?;
    let compiled = compile_with(
        &source.text()?,
        source.dialect(),
        &options,
        &Catalog::standard(),
    )?;
    if json {
        println!("{}", serde_json::to_string_pretty(&compiled.usage)?);
        return Ok(());
    }
    print!("{}", compiled.pcode);
    if usage {
        let bold = Style::new().bold();
        println!();
        for entry in &compiled.usage.entries {
            println!(
                "{:<10} {:<12} {:>4}  {}",
                format!("{:?}", entry.category).to_ascii_lowercase(),
                bold.paint(entry.name.as_str()),
                entry.count,
                entry.routines.join(" ")
            );
        }
    }
    Ok(())
}

fn run_command(source: &Source, json: bool, cycles: usize, seed: Option<u64>) -> Result<()> {
    let options = source.options()?;
    let catalog = Rc::new(Catalog::standard());
    let compiled = compile_with(&source.text()?, source.dialect(), &options, &catalog)?;
    let mut machine = Machine::new(compiled.pcode, options, catalog)?;
    if let Some(seed) = seed {
        machine.seed(seed);
    }

    let interrupted = Arc::new(AtomicBool::new(false));
    let int_moved = interrupted.clone();
    ctrlc::set_handler(move || {
        int_moved.store(true, Ordering::SeqCst);
    })?;
    let input = Interface::new("turtle")?;
    input.set_report_signal(Signal::Interrupt, true);
    input.set_prompt("? ")?;

    machine.start()?;
    loop {
        if interrupted.swap(false, Ordering::SeqCst) {
            machine.stop();
        }
        let event = machine.execute(cycles);
        for drawing in machine.drawings() {
            show_drawing(&drawing, json)?;
        }
        match event {
            Event::Running => {}
            Event::Print(s) => print!("{}", s),
            Event::Input(kind) => match input.read_line()? {
                ReadResult::Input(line) => match kind {
                    InputKind::Line => machine.line(&line),
                    InputKind::Key => {
                        for key in line.chars().chain(std::iter::once('\r')) {
                            machine.key(key);
                        }
                    }
                },
                ReadResult::Signal(_) | ReadResult::Eof => machine.stop(),
            },
            Event::Paused => machine.resume()?,
            Event::Stopped => {
                eprintln!("{}", Style::new().bold().paint("STOPPED"));
                break;
            }
            Event::Finished => break,
            Event::Fault(error) => return Err(Box::new(error)),
        }
    }
    Ok(())
}

fn show_drawing(drawing: &Drawing, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(drawing)?);
    } else {
        println!("{}", Style::new().dimmed().paint(format!("{:?}", drawing)));
    }
    Ok(())
}
