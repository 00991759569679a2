use super::ast::Type;

/// Built-in commands and functions shared by every dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Builtin {
    // *** Turtle commands
    Forward,
    Back,
    Left,
    Right,
    Drawxy,
    Movexy,
    Setx,
    Sety,
    Setxy,
    Direction,
    Turnxy,
    Home,
    Penup,
    Pendown,
    Thickness,
    Colour,
    Blot,
    Circle,
    Box,
    Blank,
    Cursor,
    Print,
    Canvas,

    // *** Console and keyboard
    Write,
    Writeln,
    Keybuffer,
    Getkey,
    Readln,

    // *** Functions
    Abs,
    Sgn,
    Max,
    Min,
    Sqrt,
    Sin,
    Cos,
    Rnd,
    Rgb,
    Len,
    Str,
    Val,
    Chr,
    Asc,
    Mid,
    Time,
}

const INT: Type = Type::Integer;
const STR: Type = Type::String;
const BOOL: Type = Type::Boolean;

impl Builtin {
    pub const ALL: [Builtin; 44] = [
        Builtin::Forward,
        Builtin::Back,
        Builtin::Left,
        Builtin::Right,
        Builtin::Drawxy,
        Builtin::Movexy,
        Builtin::Setx,
        Builtin::Sety,
        Builtin::Setxy,
        Builtin::Direction,
        Builtin::Turnxy,
        Builtin::Home,
        Builtin::Penup,
        Builtin::Pendown,
        Builtin::Thickness,
        Builtin::Colour,
        Builtin::Blot,
        Builtin::Circle,
        Builtin::Box,
        Builtin::Blank,
        Builtin::Cursor,
        Builtin::Print,
        Builtin::Canvas,
        Builtin::Write,
        Builtin::Writeln,
        Builtin::Keybuffer,
        Builtin::Getkey,
        Builtin::Readln,
        Builtin::Abs,
        Builtin::Sgn,
        Builtin::Max,
        Builtin::Min,
        Builtin::Sqrt,
        Builtin::Sin,
        Builtin::Cos,
        Builtin::Rnd,
        Builtin::Rgb,
        Builtin::Len,
        Builtin::Str,
        Builtin::Val,
        Builtin::Chr,
        Builtin::Asc,
        Builtin::Mid,
        Builtin::Time,
    ];

    /// Canonical upper case spelling.
    pub fn name(&self) -> &'static str {
        use Builtin::*;
        match self {
            Forward => "FORWARD",
            Back => "BACK",
            Left => "LEFT",
            Right => "RIGHT",
            Drawxy => "DRAWXY",
            Movexy => "MOVEXY",
            Setx => "SETX",
            Sety => "SETY",
            Setxy => "SETXY",
            Direction => "DIRECTION",
            Turnxy => "TURNXY",
            Home => "HOME",
            Penup => "PENUP",
            Pendown => "PENDOWN",
            Thickness => "THICKNESS",
            Colour => "COLOUR",
            Blot => "BLOT",
            Circle => "CIRCLE",
            Box => "BOX",
            Blank => "BLANK",
            Cursor => "CURSOR",
            Print => "PRINT",
            Canvas => "CANVAS",
            Write => "WRITE",
            Writeln => "WRITELN",
            Keybuffer => "KEYBUFFER",
            Getkey => "GETKEY$",
            Readln => "READLN$",
            Abs => "ABS",
            Sgn => "SGN",
            Max => "MAX",
            Min => "MIN",
            Sqrt => "SQRT",
            Sin => "SIN",
            Cos => "COS",
            Rnd => "RND",
            Rgb => "RGB",
            Len => "LEN",
            Str => "STR$",
            Val => "VAL",
            Chr => "CHR$",
            Asc => "ASC",
            Mid => "MID$",
            Time => "TIME",
        }
    }

    pub fn from_name(name: &str) -> Option<Builtin> {
        Builtin::ALL.iter().find(|b| b.name() == name).copied()
    }

    pub fn params(&self) -> &'static [Type] {
        use Builtin::*;
        match self {
            Home | Penup | Pendown | Getkey | Readln | Time => &[],
            Forward | Back | Left | Right | Setx | Sety | Direction | Thickness | Colour
            | Blot | Circle | Blank | Cursor | Keybuffer | Abs | Sgn | Sqrt | Rnd | Str
            | Chr => &[INT],
            Drawxy | Movexy | Setxy | Turnxy | Max | Min | Sin | Cos => &[INT, INT],
            Rgb => &[INT, INT, INT],
            Box => &[INT, INT, INT, BOOL],
            Canvas => &[INT, INT, INT, INT],
            Print => &[STR, INT, INT],
            Write | Writeln | Len | Val | Asc => &[STR],
            Mid => &[STR, INT, INT],
        }
    }

    /// `None` for commands, the result type for functions.
    pub fn result(&self) -> Option<Type> {
        use Builtin::*;
        match self {
            Abs | Sgn | Max | Min | Sqrt | Sin | Cos | Rnd | Rgb | Len | Val | Asc | Time => {
                Some(INT)
            }
            Str | Chr | Mid | Getkey | Readln => Some(STR),
            _ => None,
        }
    }

    pub fn is_command(&self) -> bool {
        self.result().is_none()
    }

    /// Commands that talk to the canvas rather than the console.
    pub fn is_turtle(&self) -> bool {
        (*self as usize) <= (Builtin::Canvas as usize)
    }
}

impl std::fmt::Display for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
