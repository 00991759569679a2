pub use super::builtin::Builtin;
use std::rc::Rc;

/// A classified slice of source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    /// Exact source text, quotes and prefixes included.
    pub content: Rc<str>,
    pub kind: LexemeKind,
    /// 1-based line of the first character.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
    /// Number of routine headers seen up to and including this lexeme;
    /// 0 is the main program.
    pub routine: usize,
}

impl Lexeme {
    pub fn is_end_of_statement(&self) -> bool {
        match self.kind {
            LexemeKind::Newline | LexemeKind::Delimiter(Delimiter::Colon) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for Lexeme {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LexemeKind {
    Keyword(Keyword),
    Operator(Operator),
    Delimiter(Delimiter),
    Integer,
    String,
    Boolean(bool),
    Identifier,
    Builtin(Builtin),
    Turtle(TurtleAttribute),
    Colour(i32),
    Comment,
    Newline,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Keyword {
    Def,
    Dim,
    Do,
    Else,
    End,
    EndFor,
    EndFunc,
    EndIf,
    EndProc,
    EndWhile,
    Exec,
    For,
    Func,
    If,
    Local,
    Next,
    Private,
    Proc,
    Repeat,
    Return,
    Step,
    Then,
    To,
    Until,
    While,
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Keyword::*;
        match self {
            Def => write!(f, "DEF"),
            Dim => write!(f, "DIM"),
            Do => write!(f, "DO"),
            Else => write!(f, "ELSE"),
            End => write!(f, "END"),
            EndFor => write!(f, "ENDFOR"),
            EndFunc => write!(f, "ENDFUNC"),
            EndIf => write!(f, "ENDIF"),
            EndProc => write!(f, "ENDPROC"),
            EndWhile => write!(f, "ENDWHILE"),
            Exec => write!(f, "EXEC"),
            For => write!(f, "FOR"),
            Func => write!(f, "FUNC"),
            If => write!(f, "IF"),
            Local => write!(f, "LOCAL"),
            Next => write!(f, "NEXT"),
            Private => write!(f, "PRIVATE"),
            Proc => write!(f, "PROC"),
            Repeat => write!(f, "REPEAT"),
            Return => write!(f, "RETURN"),
            Step => write!(f, "STEP"),
            Then => write!(f, "THEN"),
            To => write!(f, "TO"),
            Until => write!(f, "UNTIL"),
            While => write!(f, "WHILE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Div,
    Mod,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Not,
    And,
    Or,
    Eor,
    Assign,
}

impl Operator {
    /// Binding strength for binary use; `None` for operators that only
    /// appear in prefix or statement position.
    pub fn precedence(&self) -> Option<usize> {
        use Operator::*;
        match self {
            Or | Eor => Some(10),
            And => Some(20),
            Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual => Some(30),
            Plus | Minus => Some(40),
            Multiply | Divide | Div | Mod => Some(50),
            Not | Assign => None,
        }
    }

    pub fn is_comparison(&self) -> bool {
        use Operator::*;
        match self {
            Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Operator::*;
        match self {
            Plus => write!(f, "+"),
            Minus => write!(f, "-"),
            Multiply => write!(f, "*"),
            Divide => write!(f, "/"),
            Div => write!(f, "DIV"),
            Mod => write!(f, "MOD"),
            Equal => write!(f, "="),
            NotEqual => write!(f, "<>"),
            Less => write!(f, "<"),
            LessEqual => write!(f, "<="),
            Greater => write!(f, ">"),
            GreaterEqual => write!(f, ">="),
            Not => write!(f, "NOT"),
            And => write!(f, "AND"),
            Or => write!(f, "OR"),
            Eor => write!(f, "EOR"),
            Assign => write!(f, ":="),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    LParen,
    RParen,
    Comma,
    Colon,
}

impl std::fmt::Display for Delimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Delimiter::*;
        match self {
            LParen => write!(f, "("),
            RParen => write!(f, ")"),
            Comma => write!(f, ","),
            Colon => write!(f, ":"),
        }
    }
}

/// Turtle state readable and writable like a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TurtleAttribute {
    X,
    Y,
    Direction,
    Thickness,
    Colour,
}

impl TurtleAttribute {
    pub const ALL: [TurtleAttribute; 5] = [
        TurtleAttribute::X,
        TurtleAttribute::Y,
        TurtleAttribute::Direction,
        TurtleAttribute::Thickness,
        TurtleAttribute::Colour,
    ];

    /// Global slot used when turtle attributes live in ordinary memory.
    pub fn slot(&self) -> usize {
        *self as usize
    }

    pub fn from_name(name: &str) -> Option<TurtleAttribute> {
        match name {
            "TURTX" => Some(TurtleAttribute::X),
            "TURTY" => Some(TurtleAttribute::Y),
            "TURTD" => Some(TurtleAttribute::Direction),
            "TURTT" => Some(TurtleAttribute::Thickness),
            "TURTC" => Some(TurtleAttribute::Colour),
            _ => None,
        }
    }
}

impl std::fmt::Display for TurtleAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use TurtleAttribute::*;
        match self {
            X => write!(f, "TURTX"),
            Y => write!(f, "TURTY"),
            Direction => write!(f, "TURTD"),
            Thickness => write!(f, "TURTT"),
            Colour => write!(f, "TURTC"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turtle_slots_are_dense() {
        for (index, attr) in TurtleAttribute::ALL.iter().enumerate() {
            assert_eq!(attr.slot(), index);
            assert_eq!(TurtleAttribute::from_name(&attr.to_string()), Some(*attr));
        }
    }

    #[test]
    fn test_precedence() {
        assert!(Operator::Multiply.precedence() > Operator::Plus.precedence());
        assert!(Operator::Plus.precedence() > Operator::Less.precedence());
        assert!(Operator::And.precedence() > Operator::Or.precedence());
        assert_eq!(Operator::Not.precedence(), None);
    }
}
