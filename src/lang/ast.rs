use super::token::{Builtin, Lexeme, Operator, TurtleAttribute};
use std::ops::Range;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Boolean,
    Integer,
    String,
    IntegerArray,
    StringArray,
}

impl Type {
    pub fn element(&self) -> Option<Type> {
        match self {
            Type::IntegerArray => Some(Type::Integer),
            Type::StringArray => Some(Type::String),
            _ => None,
        }
    }

    pub fn array_of(&self) -> Option<Type> {
        match self {
            Type::Integer => Some(Type::IntegerArray),
            Type::String => Some(Type::StringArray),
            _ => None,
        }
    }

    /// Whether a value of type `other` may be stored where `self` is expected.
    /// Booleans are integers (-1 or 0) once compiled.
    pub fn accepts(&self, other: Type) -> bool {
        *self == other || (*self == Type::Integer && other == Type::Boolean)
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Type::Boolean => write!(f, "BOOLEAN"),
            Type::Integer => write!(f, "INTEGER"),
            Type::String => write!(f, "STRING"),
            Type::IntegerArray => write!(f, "INTEGER ARRAY"),
            Type::StringArray => write!(f, "STRING ARRAY"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Global,
    Local,
    Parameter,
    Private,
}

/// Resolved location of a variable. Global slots are numbered from the
/// first user global; the coder adds any reserved slots in front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Global(usize),
    Local(usize, usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: Rc<str>,
    pub ty: Type,
    pub storage: Storage,
    /// Index of the declaring routine.
    pub routine: usize,
    pub slot: Slot,
    /// True when the machine guarantees a value before first use
    /// regardless of options (globals, privates and parameters).
    pub initialised: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineKind {
    Program,
    Procedure,
    Function,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Routine {
    pub index: usize,
    pub name: Rc<str>,
    pub kind: RoutineKind,
    pub result: Option<Type>,
    /// The first `arity` variables are the parameters, in order.
    pub arity: usize,
    pub variables: Vec<Variable>,
    pub statements: Vec<Statement>,
    /// Indices into the lexeme sequence this routine was parsed from.
    pub lexemes: Range<usize>,
}

impl Routine {
    pub fn parameters(&self) -> &[Variable] {
        &self.variables[..self.arity]
    }

    /// Variables held in this routine's call frame.
    pub fn frame_size(&self) -> usize {
        self.variables
            .iter()
            .filter(|v| matches!(v.slot, Slot::Local(..)))
            .count()
    }

    pub fn find(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| &*v.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Variable(Slot, Type),
    Element(Slot, Type, Expression),
    Turtle(TurtleAttribute),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    pub counter: Slot,
    pub limit: Slot,
    pub step: Slot,
    pub from: Expression,
    pub to: Expression,
    pub by: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assign(Lexeme, Target, Expression),
    Dim(Lexeme, Slot, Type, Expression),
    Call(Lexeme, usize, Vec<Expression>),
    Command(Lexeme, Builtin, Vec<Expression>),
    If(Lexeme, Expression, Vec<Statement>, Vec<Statement>),
    While(Lexeme, Expression, Vec<Statement>),
    Repeat(Lexeme, Vec<Statement>, Expression),
    For(Lexeme, Box<ForLoop>, Vec<Statement>),
    Return(Lexeme, Option<Expression>),
    End(Lexeme),
}

impl Statement {
    pub fn lexeme(&self) -> &Lexeme {
        use Statement::*;
        match self {
            Assign(lex, ..) | Dim(lex, ..) | Call(lex, ..) | Command(lex, ..) | If(lex, ..)
            | While(lex, ..) | Repeat(lex, ..) | For(lex, ..) | Return(lex, ..) | End(lex) => lex,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Integer(Lexeme, i32),
    String(Lexeme, Rc<str>),
    Boolean(Lexeme, bool),
    Variable(Lexeme, Slot, Type),
    Element(Lexeme, Slot, Type, Box<Expression>),
    Turtle(Lexeme, TurtleAttribute),
    Call(Lexeme, usize, Type, Vec<Expression>),
    Builtin(Lexeme, Builtin, Vec<Expression>),
    Unary(Lexeme, Operator, Box<Expression>),
    Binary(Lexeme, Operator, Box<Expression>, Box<Expression>),
}

impl Expression {
    pub fn lexeme(&self) -> &Lexeme {
        use Expression::*;
        match self {
            Integer(lex, ..) | String(lex, ..) | Boolean(lex, ..) | Variable(lex, ..)
            | Element(lex, ..) | Turtle(lex, ..) | Call(lex, ..) | Builtin(lex, ..)
            | Unary(lex, ..) | Binary(lex, ..) => lex,
        }
    }

    pub fn ty(&self) -> Type {
        use Expression::*;
        match self {
            Integer(..) | Turtle(..) => Type::Integer,
            String(..) => Type::String,
            Boolean(..) => Type::Boolean,
            Variable(_, _, ty) | Element(_, _, ty, _) | Call(_, _, ty, _) => *ty,
            Builtin(_, builtin, _) => builtin.result().unwrap_or(Type::Integer),
            Unary(_, Operator::Not, expr) => expr.ty(),
            Unary(..) => Type::Integer,
            Binary(_, op, lhs, rhs) => {
                if op.is_comparison() {
                    Type::Boolean
                } else if lhs.ty() == Type::String {
                    Type::String
                } else if lhs.ty() == Type::Boolean && rhs.ty() == Type::Boolean {
                    Type::Boolean
                } else {
                    Type::Integer
                }
            }
        }
    }

    /// Value of an integer literal, negated literals included.
    pub fn constant(&self) -> Option<i32> {
        match self {
            Expression::Integer(_, n) => Some(*n),
            Expression::Unary(_, Operator::Minus, expr) => expr.constant().and_then(i32::checked_neg),
            _ => None,
        }
    }
}

pub trait Visitor {
    fn visit_statement(&mut self, _: &Statement) {}
    fn visit_expression(&mut self, _: &Expression) {}
    fn visit_target(&mut self, _: &Target) {}
}

pub trait AcceptVisitor {
    fn accept<V: Visitor>(&self, visitor: &mut V);
}

impl AcceptVisitor for Target {
    fn accept<V: Visitor>(&self, visitor: &mut V) {
        if let Target::Element(_, _, expr) = self {
            expr.accept(visitor);
        }
        visitor.visit_target(self)
    }
}

impl AcceptVisitor for Statement {
    fn accept<V: Visitor>(&self, visitor: &mut V) {
        use Statement::*;
        match self {
            End(_) => {}
            Assign(_, target, expr) => {
                target.accept(visitor);
                expr.accept(visitor);
            }
            Dim(_, _, _, expr) => expr.accept(visitor),
            Call(_, _, vec_expr) | Command(_, _, vec_expr) => {
                for expr in vec_expr {
                    expr.accept(visitor);
                }
            }
            If(_, predicate, vec_stmt1, vec_stmt2) => {
                predicate.accept(visitor);
                for stmt in vec_stmt1 {
                    stmt.accept(visitor);
                }
                for stmt in vec_stmt2 {
                    stmt.accept(visitor);
                }
            }
            While(_, predicate, vec_stmt) => {
                predicate.accept(visitor);
                for stmt in vec_stmt {
                    stmt.accept(visitor);
                }
            }
            Repeat(_, vec_stmt, predicate) => {
                for stmt in vec_stmt {
                    stmt.accept(visitor);
                }
                predicate.accept(visitor);
            }
            For(_, for_loop, vec_stmt) => {
                for_loop.from.accept(visitor);
                for_loop.to.accept(visitor);
                if let Some(by) = &for_loop.by {
                    by.accept(visitor);
                }
                for stmt in vec_stmt {
                    stmt.accept(visitor);
                }
            }
            Return(_, expr) => {
                if let Some(expr) = expr {
                    expr.accept(visitor);
                }
            }
        }
        visitor.visit_statement(self)
    }
}

impl AcceptVisitor for Expression {
    fn accept<V: Visitor>(&self, visitor: &mut V) {
        use Expression::*;
        match self {
            Integer(..) | String(..) | Boolean(..) | Variable(..) | Turtle(..) => {}
            Element(_, _, _, expr) | Unary(_, _, expr) => expr.accept(visitor),
            Call(_, _, _, vec_expr) | Builtin(_, _, vec_expr) => {
                for expr in vec_expr {
                    expr.accept(visitor);
                }
            }
            Binary(_, _, expr1, expr2) => {
                expr1.accept(visitor);
                expr2.accept(visitor);
            }
        }
        visitor.visit_expression(self)
    }
}
