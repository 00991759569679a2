use super::ast::*;
use super::dialect::Dialect;
use super::token::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Command,
    Function,
    Turtle,
    Structure,
    Operator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageEntry {
    pub name: String,
    pub category: Category,
    /// Occurrences in the whole lexeme stream, main program included.
    pub count: usize,
    /// Subroutines whose statements use it, in routine order.
    pub routines: Vec<String>,
}

/// Advisory counts of commands and structures, ordered by category then name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub entries: Vec<UsageEntry>,
}

impl Usage {
    pub fn get(&self, name: &str) -> Option<&UsageEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn category(&self, category: Category) -> impl Iterator<Item = &UsageEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.category == category)
    }
}

/// Counts usage over `lexemes` and attributes each name to the
/// `subroutines` that use it. Never fails; inconsistent input is logged
/// and skipped.
pub fn analyse(lexemes: &[Lexeme], subroutines: &[Routine], dialect: Dialect) -> Usage {
    let rules = dialect.rules();
    let mut counts: BTreeMap<(Category, String), (usize, Vec<String>)> = BTreeMap::new();
    let mut unknown = 0;
    for (index, lexeme) in lexemes.iter().enumerate() {
        let key = match lexeme.kind {
            LexemeKind::Builtin(builtin) => Some(builtin_key(builtin)),
            LexemeKind::Turtle(attribute) => Some((Category::Turtle, attribute.to_string())),
            LexemeKind::Keyword(keyword) => structure(keyword).map(|k| (Category::Structure, k)),
            LexemeKind::Operator(operator) => {
                if operator == rules.assignment && is_assignment(lexemes, index) {
                    None
                } else {
                    Some((Category::Operator, operator.to_string()))
                }
            }
            LexemeKind::Unknown => {
                unknown += 1;
                None
            }
            _ => None,
        };
        if let Some(key) = key {
            counts.entry(key).or_insert((0, vec![])).0 += 1;
        }
    }
    if unknown > 0 {
        log::warn!("usage ignores {} unrecognised lexemes", unknown);
    }
    let headers = lexemes
        .iter()
        .filter(|lexeme| rules.is_header(lexeme.kind))
        .count();
    if headers != subroutines.len() {
        log::warn!(
            "usage found {} routine headers but was given {} subroutines",
            headers,
            subroutines.len()
        );
    }
    for routine in subroutines {
        if routine.index == 0 {
            log::warn!("usage skips the main program passed as a subroutine");
            continue;
        }
        let mut names = Names::default();
        for statement in &routine.statements {
            statement.accept(&mut names);
        }
        for variable in &routine.variables {
            let declared = match variable.storage {
                Storage::Private if variable.routine == routine.index => Some("PRIVATE"),
                Storage::Local if variable.ty.element().is_none() && !variable.name.contains('.') => {
                    Some("LOCAL")
                }
                _ => None,
            };
            if let Some(keyword) = declared {
                names.0.insert((Category::Structure, keyword.to_string()));
            }
        }
        for key in names.0 {
            match counts.get_mut(&key) {
                Some((_, routines)) => routines.push(routine.name.to_string()),
                None => log::warn!(
                    "usage of {} in {} is missing from the lexeme stream",
                    key.1,
                    routine.name
                ),
            }
        }
    }
    Usage {
        entries: counts
            .into_iter()
            .map(|((category, name), (count, routines))| UsageEntry {
                name,
                category,
                count,
                routines,
            })
            .collect(),
    }
}

fn builtin_key(builtin: Builtin) -> (Category, String) {
    let category = if builtin.is_command() {
        Category::Command
    } else {
        Category::Function
    };
    (category, builtin.name().to_string())
}

/// Keywords that open a structure; closers are not counted separately.
fn structure(keyword: Keyword) -> Option<String> {
    use Keyword::*;
    match keyword {
        If | Else | While | Repeat | For | Dim | Local | Private | Return | End => {
            Some(keyword.to_string())
        }
        _ => None,
    }
}

/// True for the `=` of `name = ...` at the start of a statement.
fn is_assignment(lexemes: &[Lexeme], index: usize) -> bool {
    let mut previous = lexemes[..index]
        .iter()
        .rev()
        .filter(|lexeme| lexeme.kind != LexemeKind::Comment);
    match previous.next().map(|lexeme| lexeme.kind) {
        Some(LexemeKind::Identifier) | Some(LexemeKind::Turtle(_)) => {}
        _ => return false,
    }
    match previous.next() {
        None => true,
        Some(lexeme) => {
            lexeme.is_end_of_statement()
                || match lexeme.kind {
                    LexemeKind::Keyword(keyword) => {
                        keyword == Keyword::Then || keyword == Keyword::Else || keyword == Keyword::For
                    }
                    _ => false,
                }
        }
    }
}

#[derive(Default)]
struct Names(BTreeSet<(Category, String)>);

impl Visitor for Names {
    fn visit_statement(&mut self, statement: &Statement) {
        use Statement::*;
        let name = match statement {
            Command(_, builtin, _) => {
                self.0.insert(builtin_key(*builtin));
                return;
            }
            If(_, _, _, else_branch) => {
                if !else_branch.is_empty() {
                    self.0.insert((Category::Structure, Keyword::Else.to_string()));
                }
                Keyword::If
            }
            While(..) => Keyword::While,
            Repeat(..) => Keyword::Repeat,
            For(..) => Keyword::For,
            Dim(..) => Keyword::Dim,
            End(..) => Keyword::End,
            Return(lexeme, _) => match lexeme.kind {
                LexemeKind::Keyword(Keyword::Return) => Keyword::Return,
                _ => return,
            },
            Assign(..) | Call(..) => return,
        };
        self.0.insert((Category::Structure, name.to_string()));
    }

    fn visit_expression(&mut self, expression: &Expression) {
        use Expression::*;
        match expression {
            Builtin(_, builtin, _) => {
                self.0.insert(builtin_key(*builtin));
            }
            Turtle(_, attribute) => {
                self.0.insert((Category::Turtle, attribute.to_string()));
            }
            Unary(_, operator, _) | Binary(_, operator, _, _) => {
                self.0.insert((Category::Operator, operator.to_string()));
            }
            _ => {}
        }
    }

    fn visit_target(&mut self, target: &Target) {
        if let Target::Turtle(attribute) = target {
            self.0.insert((Category::Turtle, attribute.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{lex, parse};
    use super::*;

    fn usage(source: &str, dialect: Dialect) -> Usage {
        let lexemes = lex(source, dialect);
        let routines = match parse(&lexemes, dialect) {
            Ok(routines) => routines,
            Err(e) => panic!("{}", e),
        };
        analyse(&lexemes, &routines[1..], dialect)
    }

    #[test]
    fn test_counts_and_attribution() {
        let source = "\
FORWARD(10)
PROCa
PROCb
END
DEF PROCa
FORWARD(1): FORWARD(2)
ENDPROC
DEF PROCb
FORWARD(3)
IF TURTX > 10 THEN TURTX = 0
ENDPROC
";
        let usage = usage(source, Dialect::Basic);
        let forward = usage.get("FORWARD").map(|e| e.clone());
        assert_eq!(
            forward,
            Some(UsageEntry {
                name: "FORWARD".to_string(),
                category: Category::Command,
                count: 4,
                routines: vec!["PROCa".to_string(), "PROCb".to_string()],
            })
        );
        let turtx = usage.get("TURTX").map(|e| (e.count, e.routines.len()));
        assert_eq!(turtx, Some((2, 1)));
        assert_eq!(usage.get("=").map(|e| e.count), None);
        assert_eq!(usage.get(">").map(|e| e.count), Some(1));
    }

    #[test]
    fn test_main_program_is_not_attributed() {
        let usage = usage("WHILE TRUE\nFORWARD(1)\nENDWHILE\n", Dialect::Basic);
        let entry = usage.get("WHILE").map(|e| (e.count, e.routines.is_empty()));
        assert_eq!(entry, Some((1, true)));
        assert_eq!(usage.category(Category::Command).count(), 1);
    }

    #[test]
    fn test_degrades_on_mismatched_input() {
        let lexemes = lex("FORWARD(1) @", Dialect::Basic);
        let usage = analyse(&lexemes, &[], Dialect::Basic);
        assert_eq!(usage.get("FORWARD").map(|e| e.count), Some(1));
    }
}
