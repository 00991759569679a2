use super::colour::colour;
use super::dialect::{Dialect, Rules};
use super::token::*;

/// Splits source text into lexemes. Never fails: anything the dialect does
/// not recognise becomes an `Unknown` lexeme at its own position.
pub fn lex(source: &str, dialect: Dialect) -> Vec<Lexeme> {
    let lexemes: Vec<Lexeme> = Lexer::new(source, dialect.rules()).collect();
    log::debug!(
        "lexed {} lexemes ({} unknown) as {}",
        lexemes.len(),
        lexemes
            .iter()
            .filter(|l| l.kind == LexemeKind::Unknown)
            .count(),
        dialect
    );
    lexemes
}

fn is_whitespace(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\r'
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Character cursor that keeps line and column in step with the offset.
struct Source<'a> {
    text: &'a str,
    offset: usize,
    line: usize,
    column: usize,
}

impl<'a> Source<'a> {
    fn rest(&self) -> &'a str {
        &self.text[self.offset..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn take(&mut self, chars: usize) -> String {
        let mut s = String::new();
        for _ in 0..chars {
            match self.next() {
                Some(ch) => s.push(ch),
                None => break,
            }
        }
        s
    }

    fn take_line(&mut self) -> String {
        let mut s = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            s.push(ch);
            self.next();
        }
        s
    }
}

trait Tokenizers<'a> {
    fn source(&mut self) -> &mut Source<'a>;
    fn rules(&self) -> &'static Rules;

    fn comment(&mut self) -> Option<(String, LexemeKind)> {
        let rules = self.rules();
        let rest = self.source().rest();
        for introducer in rules.comments {
            let head = match rest.get(..introducer.len()) {
                Some(head) => head,
                None => continue,
            };
            let matched = if rules.case_sensitive {
                head == *introducer
            } else {
                head.eq_ignore_ascii_case(introducer)
            };
            if !matched {
                continue;
            }
            let word = introducer.chars().all(is_identifier);
            if word {
                if let Some(after) = rest[introducer.len()..].chars().next() {
                    if is_identifier(after) {
                        continue;
                    }
                }
            }
            return Some((self.source().take_line(), LexemeKind::Comment));
        }
        None
    }

    fn number(&mut self) -> (String, LexemeKind) {
        let hex_prefix = self.rules().hex_prefix;
        let mut s = String::new();
        let hex = self.source().peek() == Some(hex_prefix);
        if hex {
            s.extend(self.source().next());
        }
        while let Some(pk) = self.source().peek() {
            let digit = if hex {
                pk.is_ascii_hexdigit()
            } else {
                pk.is_ascii_digit()
            };
            if !digit {
                break;
            }
            s.extend(self.source().next());
        }
        (s, LexemeKind::Integer)
    }

    fn string(&mut self) -> (String, LexemeKind) {
        let mut s = String::new();
        let quote = match self.source().next() {
            Some(quote) => quote,
            None => return (s, LexemeKind::Unknown),
        };
        s.push(quote);
        loop {
            match self.source().peek() {
                None | Some('\n') => return (s, LexemeKind::Unknown),
                Some(ch) => {
                    s.extend(self.source().next());
                    if ch != quote {
                        continue;
                    }
                    if self.source().peek() == Some(quote) {
                        s.extend(self.source().next());
                        continue;
                    }
                    return (s, LexemeKind::String);
                }
            }
        }
    }

    fn alphabetic(&mut self) -> (String, LexemeKind) {
        let rules = self.rules();
        let mut s = String::new();
        while let Some(pk) = self.source().peek() {
            if !is_identifier(pk) {
                break;
            }
            s.extend(self.source().next());
        }
        if let Some(pk) = self.source().peek() {
            if pk == rules.integer_suffix || pk == rules.string_suffix {
                s.extend(self.source().next());
            }
        }
        if let Some(kind) = rules.word(&s) {
            return (s, kind);
        }
        let upper = if rules.case_sensitive {
            s.clone()
        } else {
            s.to_ascii_uppercase()
        };
        if let Some(builtin) = Builtin::from_name(&upper) {
            return (s, LexemeKind::Builtin(builtin));
        }
        if let Some(attribute) = TurtleAttribute::from_name(&upper) {
            return (s, LexemeKind::Turtle(attribute));
        }
        if let Some(rgb) = colour(&upper) {
            return (s, LexemeKind::Colour(rgb));
        }
        (s, LexemeKind::Identifier)
    }

    fn minutia(&mut self) -> (String, LexemeKind) {
        let rules = self.rules();
        let rest = self.source().rest();
        for (symbol, kind) in rules.symbols {
            if rest.starts_with(symbol) {
                let len = symbol.chars().count();
                return (self.source().take(len), *kind);
            }
        }
        (self.source().take(1), LexemeKind::Unknown)
    }
}

struct Lexer<'a> {
    source: Source<'a>,
    rules: &'static Rules,
    routine: usize,
}

impl<'a> Tokenizers<'a> for Lexer<'a> {
    fn source(&mut self) -> &mut Source<'a> {
        &mut self.source
    }

    fn rules(&self) -> &'static Rules {
        self.rules
    }
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str, rules: &'static Rules) -> Lexer<'a> {
        Lexer {
            source: Source {
                text,
                offset: 0,
                line: 1,
                column: 1,
            },
            rules,
            routine: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Lexeme;

    fn next(&mut self) -> Option<Self::Item> {
        let mut pk = self.source.peek()?;
        while is_whitespace(pk) {
            self.source.next();
            pk = self.source.peek()?;
        }
        let line = self.source.line;
        let column = self.source.column;
        let (content, kind) = if pk == '\n' {
            self.source.next();
            ("\n".to_string(), LexemeKind::Newline)
        } else if let Some(comment) = self.comment() {
            comment
        } else if pk.is_ascii_digit()
            || (pk == self.rules.hex_prefix
                && self
                    .source
                    .peek_nth(1)
                    .map_or(false, |c| c.is_ascii_hexdigit()))
        {
            self.number()
        } else if self.rules.quotes.contains(&pk) {
            self.string()
        } else if is_identifier_start(pk) {
            self.alphabetic()
        } else {
            self.minutia()
        };
        if self.rules.is_header(kind) {
            self.routine += 1;
        }
        Some(Lexeme {
            content: content.into(),
            kind,
            line,
            column,
            routine: self.routine,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str, dialect: Dialect) -> Vec<LexemeKind> {
        lex(source, dialect).into_iter().map(|l| l.kind).collect()
    }

    #[test]
    fn test_basic_assignment() {
        assert_eq!(
            kinds("size% = &FF + 2", Dialect::Basic),
            vec![
                LexemeKind::Identifier,
                LexemeKind::Operator(Operator::Equal),
                LexemeKind::Integer,
                LexemeKind::Operator(Operator::Plus),
                LexemeKind::Integer,
            ]
        );
    }

    #[test]
    fn test_comal_is_case_insensitive() {
        assert_eq!(
            kinds("for i := 1 TO 3 Do", Dialect::Comal),
            vec![
                LexemeKind::Keyword(Keyword::For),
                LexemeKind::Identifier,
                LexemeKind::Operator(Operator::Assign),
                LexemeKind::Integer,
                LexemeKind::Keyword(Keyword::To),
                LexemeKind::Integer,
                LexemeKind::Keyword(Keyword::Do),
            ]
        );
        assert_eq!(kinds("for", Dialect::Basic), vec![LexemeKind::Identifier]);
    }

    #[test]
    fn test_positions() {
        let lexemes = lex("FORWARD(10)\n  é#", Dialect::Basic);
        let last = &lexemes[lexemes.len() - 1];
        assert_eq!(lexemes[0].kind, LexemeKind::Builtin(Builtin::Forward));
        assert_eq!((lexemes[2].line, lexemes[2].column), (1, 9));
        assert_eq!(lexemes[4].kind, LexemeKind::Newline);
        assert_eq!(&*last.content, "#");
        assert_eq!((last.line, last.column), (2, 4));
    }

    #[test]
    fn test_comments() {
        let lexemes = lex("REM hello\nREMARK% = 1 ' tail", Dialect::Basic);
        assert_eq!(lexemes[0].kind, LexemeKind::Comment);
        assert_eq!(&*lexemes[0].content, "REM hello");
        assert_eq!(lexemes[2].kind, LexemeKind::Identifier);
        assert_eq!(lexemes[5].kind, LexemeKind::Comment);
        let comal = lex("x := 1 // note", Dialect::Comal);
        assert_eq!(comal[3].kind, LexemeKind::Comment);
    }

    #[test]
    fn test_strings() {
        let lexemes = lex("\"say \"\"hi\"\"\" \"open", Dialect::Basic);
        assert_eq!(lexemes[0].kind, LexemeKind::String);
        assert_eq!(&*lexemes[0].content, "\"say \"\"hi\"\"\"");
        assert_eq!(lexemes[1].kind, LexemeKind::Unknown);
        assert_eq!(&*lexemes[1].content, "\"open");
        assert_eq!(kinds("'x'", Dialect::Comal), vec![LexemeKind::String]);
    }

    #[test]
    fn test_routine_hint() {
        let source = "PROCa\nEND\nDEF PROCa\nENDPROC\nDEF FNb%\n=1\n";
        let hints: Vec<usize> = lex(source, Dialect::Basic)
            .iter()
            .map(|l| l.routine)
            .collect();
        assert_eq!(hints, vec![0, 0, 0, 0, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2]);
    }

    #[test]
    fn test_names() {
        assert_eq!(
            kinds("TURTX RED GETKEY$ red", Dialect::Basic),
            vec![
                LexemeKind::Turtle(TurtleAttribute::X),
                LexemeKind::Colour(0xFF0000),
                LexemeKind::Builtin(Builtin::Getkey),
                LexemeKind::Identifier,
            ]
        );
        assert_eq!(
            kinds("turtx red", Dialect::Comal),
            vec![
                LexemeKind::Turtle(TurtleAttribute::X),
                LexemeKind::Colour(0xFF0000),
            ]
        );
    }
}
