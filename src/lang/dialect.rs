use super::ast::Type;
use super::token::{Delimiter, Keyword, LexemeKind, Operator};

/// Language variant selector. Every difference between the variants lives
/// in the `Rules` table it selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Basic,
    Comal,
}

impl Dialect {
    pub fn rules(&self) -> &'static Rules {
        match self {
            Dialect::Basic => &BASIC,
            Dialect::Comal => &COMAL,
        }
    }
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Dialect, String> {
        match s.to_ascii_lowercase().as_str() {
            "basic" | "bas" => Ok(Dialect::Basic),
            "comal" | "tc" => Ok(Dialect::Comal),
            _ => Err(format!("unknown dialect \"{}\"", s)),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Dialect::Basic => write!(f, "BASIC"),
            Dialect::Comal => write!(f, "COMAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStyle {
    /// `DEF PROCname(...)` and `DEF FNname%(...)`; the name carries the kind.
    Prefixed,
    /// `PROC name(...)` and `FUNC name(...)`; the keyword carries the kind.
    Keyword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStyle {
    /// `=expr` closes a function at its top level and returns when nested.
    Equals,
    /// `RETURN expr`, with `ENDFUNC` closing the function.
    Return,
}

#[derive(Debug)]
pub struct Rules {
    pub case_sensitive: bool,
    /// Introducers running to the end of the line.
    pub comments: &'static [&'static str],
    pub quotes: &'static [char],
    /// Punctuation, longest spelling first.
    pub symbols: &'static [(&'static str, LexemeKind)],
    /// Reserved words in upper case.
    pub words: &'static [(&'static str, LexemeKind)],
    pub hex_prefix: char,
    pub integer_suffix: char,
    pub string_suffix: char,
    /// Type of an identifier with no suffix; `None` makes it an error.
    pub bare: Option<Type>,
    pub separator: bool,
    pub assignment: Operator,
    pub header: HeaderStyle,
    pub procedure_prefix: &'static str,
    pub function_prefix: &'static str,
    pub result: ResultStyle,
    /// Loop headers end with `DO`.
    pub loop_do: bool,
    pub for_closer: Keyword,
    pub while_closer: Keyword,
    /// `ENDPROC` inside a nested block returns early rather than closing.
    pub nested_closer_returns: bool,
    /// Closers may repeat the routine or counter name.
    pub closer_names: bool,
    pub program_name: &'static str,
}

impl Rules {
    pub fn word(&self, text: &str) -> Option<LexemeKind> {
        let upper;
        let text = if self.case_sensitive {
            text
        } else {
            upper = text.to_ascii_uppercase();
            &upper
        };
        self.words
            .iter()
            .find(|(word, _)| *word == text)
            .map(|(_, kind)| *kind)
    }

    /// Normalised spelling used for symbol table lookups.
    pub fn name(&self, text: &str) -> String {
        if self.case_sensitive {
            text.to_string()
        } else {
            text.to_ascii_lowercase()
        }
    }

    /// Type implied by an identifier's suffix.
    pub fn type_of(&self, name: &str) -> Option<Type> {
        match name.chars().last() {
            Some(ch) if ch == self.string_suffix => Some(Type::String),
            Some(ch) if ch == self.integer_suffix => Some(Type::Integer),
            _ => self.bare,
        }
    }

    pub fn is_header(&self, kind: LexemeKind) -> bool {
        match self.header {
            HeaderStyle::Prefixed => kind == LexemeKind::Keyword(Keyword::Def),
            HeaderStyle::Keyword => {
                kind == LexemeKind::Keyword(Keyword::Proc)
                    || kind == LexemeKind::Keyword(Keyword::Func)
            }
        }
    }
}

const LPAREN: LexemeKind = LexemeKind::Delimiter(Delimiter::LParen);
const RPAREN: LexemeKind = LexemeKind::Delimiter(Delimiter::RParen);
const COMMA: LexemeKind = LexemeKind::Delimiter(Delimiter::Comma);

const fn op(operator: Operator) -> LexemeKind {
    LexemeKind::Operator(operator)
}

const fn kw(keyword: Keyword) -> LexemeKind {
    LexemeKind::Keyword(keyword)
}

static BASIC: Rules = Rules {
    case_sensitive: true,
    comments: &["REM", "'"],
    quotes: &['"'],
    symbols: &[
        ("<=", op(Operator::LessEqual)),
        (">=", op(Operator::GreaterEqual)),
        ("<>", op(Operator::NotEqual)),
        ("=", op(Operator::Equal)),
        ("<", op(Operator::Less)),
        (">", op(Operator::Greater)),
        ("+", op(Operator::Plus)),
        ("-", op(Operator::Minus)),
        ("*", op(Operator::Multiply)),
        ("/", op(Operator::Divide)),
        ("(", LPAREN),
        (")", RPAREN),
        (",", COMMA),
        (":", LexemeKind::Delimiter(Delimiter::Colon)),
    ],
    words: &[
        ("AND", op(Operator::And)),
        ("DEF", kw(Keyword::Def)),
        ("DIM", kw(Keyword::Dim)),
        ("DIV", op(Operator::Div)),
        ("ELSE", kw(Keyword::Else)),
        ("END", kw(Keyword::End)),
        ("ENDIF", kw(Keyword::EndIf)),
        ("ENDPROC", kw(Keyword::EndProc)),
        ("ENDWHILE", kw(Keyword::EndWhile)),
        ("EOR", op(Operator::Eor)),
        ("FALSE", LexemeKind::Boolean(false)),
        ("FOR", kw(Keyword::For)),
        ("IF", kw(Keyword::If)),
        ("LOCAL", kw(Keyword::Local)),
        ("MOD", op(Operator::Mod)),
        ("NEXT", kw(Keyword::Next)),
        ("NOT", op(Operator::Not)),
        ("OR", op(Operator::Or)),
        ("PRIVATE", kw(Keyword::Private)),
        ("REPEAT", kw(Keyword::Repeat)),
        ("STEP", kw(Keyword::Step)),
        ("THEN", kw(Keyword::Then)),
        ("TO", kw(Keyword::To)),
        ("TRUE", LexemeKind::Boolean(true)),
        ("UNTIL", kw(Keyword::Until)),
        ("WHILE", kw(Keyword::While)),
    ],
    hex_prefix: '&',
    integer_suffix: '%',
    string_suffix: '$',
    bare: None,
    separator: true,
    assignment: Operator::Equal,
    header: HeaderStyle::Prefixed,
    procedure_prefix: "PROC",
    function_prefix: "FN",
    result: ResultStyle::Equals,
    loop_do: false,
    for_closer: Keyword::Next,
    while_closer: Keyword::EndWhile,
    nested_closer_returns: true,
    closer_names: false,
    program_name: "PROGRAM",
};

static COMAL: Rules = Rules {
    case_sensitive: false,
    comments: &["//"],
    quotes: &['"', '\''],
    symbols: &[
        (":=", op(Operator::Assign)),
        ("<=", op(Operator::LessEqual)),
        (">=", op(Operator::GreaterEqual)),
        ("<>", op(Operator::NotEqual)),
        ("=", op(Operator::Equal)),
        ("<", op(Operator::Less)),
        (">", op(Operator::Greater)),
        ("+", op(Operator::Plus)),
        ("-", op(Operator::Minus)),
        ("*", op(Operator::Multiply)),
        ("/", op(Operator::Divide)),
        ("(", LPAREN),
        (")", RPAREN),
        (",", COMMA),
    ],
    words: &[
        ("AND", op(Operator::And)),
        ("DIM", kw(Keyword::Dim)),
        ("DIV", op(Operator::Div)),
        ("DO", kw(Keyword::Do)),
        ("ELSE", kw(Keyword::Else)),
        ("END", kw(Keyword::End)),
        ("ENDFOR", kw(Keyword::EndFor)),
        ("ENDFUNC", kw(Keyword::EndFunc)),
        ("ENDIF", kw(Keyword::EndIf)),
        ("ENDPROC", kw(Keyword::EndProc)),
        ("ENDWHILE", kw(Keyword::EndWhile)),
        ("EOR", op(Operator::Eor)),
        ("EXEC", kw(Keyword::Exec)),
        ("FALSE", LexemeKind::Boolean(false)),
        ("FOR", kw(Keyword::For)),
        ("FUNC", kw(Keyword::Func)),
        ("IF", kw(Keyword::If)),
        ("LOCAL", kw(Keyword::Local)),
        ("MOD", op(Operator::Mod)),
        ("NOT", op(Operator::Not)),
        ("OR", op(Operator::Or)),
        ("PRIVATE", kw(Keyword::Private)),
        ("PROC", kw(Keyword::Proc)),
        ("REPEAT", kw(Keyword::Repeat)),
        ("RETURN", kw(Keyword::Return)),
        ("STEP", kw(Keyword::Step)),
        ("THEN", kw(Keyword::Then)),
        ("TO", kw(Keyword::To)),
        ("TRUE", LexemeKind::Boolean(true)),
        ("UNTIL", kw(Keyword::Until)),
        ("WHILE", kw(Keyword::While)),
    ],
    hex_prefix: '$',
    integer_suffix: '#',
    string_suffix: '$',
    bare: Some(Type::Integer),
    separator: false,
    assignment: Operator::Assign,
    header: HeaderStyle::Keyword,
    procedure_prefix: "",
    function_prefix: "",
    result: ResultStyle::Return,
    loop_do: true,
    for_closer: Keyword::EndFor,
    while_closer: Keyword::EndWhile,
    nested_closer_returns: false,
    closer_names: true,
    program_name: "PROGRAM",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_case() {
        let basic = Dialect::Basic.rules();
        let comal = Dialect::Comal.rules();
        assert_eq!(basic.word("FOR"), Some(kw(Keyword::For)));
        assert_eq!(basic.word("for"), None);
        assert_eq!(comal.word("For"), Some(kw(Keyword::For)));
        assert_eq!(comal.word("NEXT"), None);
    }

    #[test]
    fn test_suffix_types() {
        let basic = Dialect::Basic.rules();
        let comal = Dialect::Comal.rules();
        assert_eq!(basic.type_of("count%"), Some(Type::Integer));
        assert_eq!(basic.type_of("name$"), Some(Type::String));
        assert_eq!(basic.type_of("count"), None);
        assert_eq!(comal.type_of("count"), Some(Type::Integer));
        assert_eq!(comal.type_of("count#"), Some(Type::Integer));
    }

    #[test]
    fn test_symbols_longest_first() {
        for rules in [Dialect::Basic.rules(), Dialect::Comal.rules()].iter() {
            for (i, (a, _)) in rules.symbols.iter().enumerate() {
                for (b, _) in rules.symbols[i + 1..].iter() {
                    assert!(!b.starts_with(a) || b.len() <= a.len());
                }
            }
        }
    }
}
