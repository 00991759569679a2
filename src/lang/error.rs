use super::Lexeme;

/// Which stage of the system rejected the program.
///
/// `Compiler` errors point at source, `Machine` errors are the program's own
/// runtime faults, and `System` errors come from the environment running it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Compiler,
    Machine,
    System,
}

#[derive(Clone, PartialEq)]
pub struct Error {
    code: u16,
    lexeme: Option<Lexeme>,
    line: Option<usize>,
    routine: Option<String>,
    message: String,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($err:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
    };
    ($err:ident; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).message($msg)
    };
    ($err:ident, $lex:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).at_lexeme($lex)
    };
    ($err:ident, $lex:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .at_lexeme($lex)
            .message($msg)
    };
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code: code as u16,
            lexeme: None,
            line: None,
            routine: None,
            message: String::new(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.code {
            0..=49 => ErrorKind::Compiler,
            50..=99 => ErrorKind::Machine,
            _ => ErrorKind::System,
        }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn lexeme(&self) -> Option<&Lexeme> {
        self.lexeme.as_ref()
    }

    pub fn line(&self) -> Option<usize> {
        match &self.lexeme {
            Some(lexeme) => Some(lexeme.line),
            None => self.line,
        }
    }

    pub fn routine(&self) -> Option<&str> {
        self.routine.as_deref()
    }

    pub fn at_lexeme(self, lexeme: &Lexeme) -> Error {
        debug_assert!(self.lexeme.is_none());
        Error {
            lexeme: Some(lexeme.clone()),
            ..self
        }
    }

    pub fn in_line(self, line: usize) -> Error {
        Error {
            line: Some(line),
            ..self
        }
    }

    pub fn in_routine(self, routine: &str) -> Error {
        Error {
            routine: Some(routine.to_string()),
            ..self
        }
    }

    pub fn message(self, message: &str) -> Error {
        debug_assert_eq!(self.message.len(), 0);
        Error {
            message: message.to_string(),
            ..self
        }
    }

    /// The message with `{lex}` replaced by the quoted offending lexeme.
    pub fn text(&self) -> String {
        match &self.lexeme {
            Some(lexeme) => self
                .message
                .replace("{lex}", &format!("\"{}\"", lexeme.content)),
            None => self.message.replace("{lex}", "END OF INPUT"),
        }
    }

    fn code_str(&self) -> &'static str {
        match self.code {
            1 => "SYNTAX ERROR",
            2 => "UNRECOGNISED INPUT",
            3 => "INCOMPATIBLE TYPES",
            4 => "UNDECLARED VARIABLE",
            5 => "UNDEFINED ROUTINE",
            6 => "DUPLICATE DECLARATION",
            7 => "WRONG NUMBER OF ARGUMENTS",
            8 => "INTEGER OUT OF RANGE",
            9 => "MISPLACED STATEMENT",
            10 => "UNSUPPORTED",
            11 => "NOT IN CATALOG",
            12 => "LINK FAILURE",
            50 => "STACK UNDERFLOW",
            51 => "STACK OVERFLOW",
            52 => "TYPE MISMATCH",
            53 => "UNINITIALISED VARIABLE",
            54 => "UNRESOLVED CALL",
            55 => "SUBSCRIPT OUT OF RANGE",
            56 => "DIVISION BY ZERO",
            57 => "OVERFLOW",
            58 => "NO KEY BUFFER",
            59 => "NO FUNCTION RESULT",
            60 => "ILLEGAL FUNCTION CALL",
            61 => "MEMORY FAULT",
            62 => "OUT OF MEMORY",
            63 => "ARRAY NOT DIMENSIONED",
            100 => "OPTIONS MISMATCH",
            101 => "CANVAS UNAVAILABLE",
            102 => "UNSUPPORTED ARCHITECTURE",
            103 => "INVALID MACHINE STATE",
            _ => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    SyntaxError = 1,
    UnrecognisedInput = 2,
    IncompatibleTypes = 3,
    UndeclaredVariable = 4,
    UndefinedRoutine = 5,
    DuplicateDeclaration = 6,
    WrongNumberOfArguments = 7,
    IntegerOutOfRange = 8,
    MisplacedStatement = 9,
    Unsupported = 10,
    NotInCatalog = 11,
    LinkFailure = 12,

    StackUnderflow = 50,
    StackOverflow = 51,
    TypeMismatch = 52,
    Uninitialised = 53,
    UnresolvedCall = 54,
    SubscriptOutOfRange = 55,
    DivisionByZero = 56,
    Overflow = 57,
    NoKeyBuffer = 58,
    NoFunctionResult = 59,
    IllegalFunctionCall = 60,
    MemoryFault = 61,
    OutOfMemory = 62,
    NotDimensioned = 63,

    OptionsMismatch = 100,
    CanvasUnavailable = 101,
    UnsupportedArchitecture = 102,
    InvalidState = 103,
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut suffix = String::new();
        if let Some(lexeme) = &self.lexeme {
            suffix.push_str(&format!(" LINE {}:{}", lexeme.line, lexeme.column));
        } else if let Some(line) = self.line {
            suffix.push_str(&format!(" LINE {}", line));
        }
        if let Some(routine) = &self.routine {
            suffix.push_str(&format!(" ({})", routine));
        }
        if !self.message.is_empty() {
            suffix.push_str(&format!("; {}", self.text()));
        }
        let code_str = self.code_str();
        if code_str.is_empty() {
            write!(f, "PROGRAM ERROR {}{}", self.code, suffix)
        } else if suffix.starts_with(';') || suffix.is_empty() {
            write!(f, "{}{}", code_str, suffix)
        } else {
            write!(f, "{} IN{}", code_str, suffix)
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::LexemeKind;

    fn then_lexeme() -> Lexeme {
        Lexeme {
            content: "THEN".into(),
            kind: LexemeKind::Unknown,
            line: 3,
            column: 7,
            routine: 0,
        }
    }

    #[test]
    fn test_lex_placeholder() {
        let e = error!(SyntaxError, &then_lexeme(); "UNEXPECTED {lex}");
        assert_eq!(e.text(), "UNEXPECTED \"THEN\"");
        assert_eq!(e.to_string(), "SYNTAX ERROR IN LINE 3:7; UNEXPECTED \"THEN\"");
        assert_eq!(e.kind(), ErrorKind::Compiler);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(error!(StackUnderflow).kind(), ErrorKind::Machine);
        assert_eq!(error!(OptionsMismatch).kind(), ErrorKind::System);
        assert_eq!(error!(DivisionByZero).to_string(), "DIVISION BY ZERO");
    }

    #[test]
    fn test_machine_location() {
        let e = error!(Uninitialised; "LOCAL 2").in_line(12).in_routine("PROCsquare");
        assert_eq!(
            e.to_string(),
            "UNINITIALISED VARIABLE IN LINE 12 (PROCsquare); LOCAL 2"
        );
    }
}
