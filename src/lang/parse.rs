use super::ast::*;
use super::dialect::{Dialect, HeaderStyle, ResultStyle, Rules};
use super::token::*;
use super::Error;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// Builds the routine table. Routine 0 is the main program and is always
/// present; subroutines follow in header order.
pub fn parse(lexemes: &[Lexeme], dialect: Dialect) -> Result<Vec<Routine>> {
    let routines = Parser::parse(lexemes, dialect.rules())?;
    log::debug!(
        "parsed {} routines, {} globals",
        routines.len(),
        routines[0].variables.len()
    );
    Ok(routines)
}

struct Parser<'a> {
    lexemes: &'a [Lexeme],
    index: usize,
    rules: &'static Rules,
    routines: Vec<Routine>,
    headers: Vec<usize>,
    bodies: Vec<usize>,
    current: usize,
    globals: usize,
    loops: usize,
    single_line: usize,
}

impl<'a> Parser<'a> {
    fn parse(lexemes: &'a [Lexeme], rules: &'static Rules) -> Result<Vec<Routine>> {
        let headers = lexemes
            .iter()
            .enumerate()
            .filter(|(_, lexeme)| rules.is_header(lexeme.kind))
            .map(|(index, _)| index)
            .collect();
        let mut parser = Parser {
            lexemes,
            index: 0,
            rules,
            routines: vec![Routine {
                index: 0,
                name: rules.program_name.into(),
                kind: RoutineKind::Program,
                result: None,
                arity: 0,
                variables: vec![],
                statements: vec![],
                lexemes: 0..0,
            }],
            headers,
            bodies: vec![],
            current: 0,
            globals: 0,
            loops: 0,
            single_line: 0,
        };
        parser.signatures()?;
        parser.program()?;
        for index in 1..parser.routines.len() {
            parser.subroutine(index)?;
        }
        Ok(parser.routines)
    }

    // *** Lexeme stream

    fn peek(&mut self) -> Option<&'a Lexeme> {
        while let Some(lexeme) = self.lexemes.get(self.index) {
            if lexeme.kind != LexemeKind::Comment {
                return Some(lexeme);
            }
            self.index += 1;
        }
        None
    }

    fn next(&mut self) -> Option<&'a Lexeme> {
        let lexeme = self.peek()?;
        self.index += 1;
        Some(lexeme)
    }

    fn peek_is(&mut self, kind: LexemeKind) -> bool {
        self.peek().map_or(false, |lexeme| lexeme.kind == kind)
    }

    fn eat(&mut self, kind: LexemeKind) -> bool {
        if self.peek_is(kind) {
            self.index += 1;
            return true;
        }
        false
    }

    fn expect(&mut self, kind: LexemeKind, expected: &str) -> Result<&'a Lexeme> {
        if self.peek_is(kind) {
            if let Some(lexeme) = self.next() {
                return Ok(lexeme);
            }
        }
        Err(self.unexpected(expected))
    }

    fn identifier(&mut self, expected: &str) -> Result<&'a Lexeme> {
        self.expect(LexemeKind::Identifier, expected)
    }

    fn at_header(&mut self) -> bool {
        self.peek().is_some() && self.headers.binary_search(&self.index).is_ok()
    }

    fn unexpected(&mut self, expected: &str) -> Error {
        match self.peek() {
            Some(lexeme) if lexeme.kind == LexemeKind::Unknown => {
                error!(UnrecognisedInput, lexeme; "UNRECOGNISED {lex}")
            }
            Some(lexeme) => error!(SyntaxError, lexeme; &format!("{}, FOUND {{lex}}", expected)),
            None => {
                let error = error!(SyntaxError; &format!("{}, FOUND {{lex}}", expected));
                match self.lexemes.last() {
                    Some(last) => error.in_line(last.line),
                    None => error,
                }
            }
        }
    }

    // *** Routines

    fn signatures(&mut self) -> Result<()> {
        for (number, start) in self.headers.clone().into_iter().enumerate() {
            let index = number + 1;
            self.index = start + 1;
            self.current = index;
            let lexemes = self.lexemes;
            let keyword = &lexemes[start];
            let name_lexeme = self.identifier("EXPECTED ROUTINE NAME")?;
            let name = self.rules.name(&name_lexeme.content);
            let kind = match self.rules.header {
                HeaderStyle::Prefixed => {
                    let procedure = self.rules.procedure_prefix;
                    let function = self.rules.function_prefix;
                    if name.len() > procedure.len() && name.starts_with(procedure) {
                        RoutineKind::Procedure
                    } else if name.len() > function.len() && name.starts_with(function) {
                        RoutineKind::Function
                    } else {
                        return Err(error!(SyntaxError, name_lexeme;
                            "{lex} IS NOT A PROCEDURE OR FUNCTION NAME"));
                    }
                }
                HeaderStyle::Keyword => match keyword.kind {
                    LexemeKind::Keyword(Keyword::Func) => RoutineKind::Function,
                    _ => RoutineKind::Procedure,
                },
            };
            let result = match kind {
                RoutineKind::Function => match self.rules.type_of(&name) {
                    Some(ty) => Some(ty),
                    None => {
                        return Err(error!(SyntaxError, name_lexeme; "{lex} NEEDS A TYPE SUFFIX"))
                    }
                },
                _ => None,
            };
            if self.routines.iter().any(|r| *r.name == *name) {
                return Err(error!(DuplicateDeclaration, name_lexeme;
                    "{lex} IS ALREADY DEFINED"));
            }
            self.routines.push(Routine {
                index,
                name: name.into(),
                kind,
                result,
                arity: 0,
                variables: vec![],
                statements: vec![],
                lexemes: start..start,
            });
            if self.eat(LexemeKind::Delimiter(Delimiter::LParen)) {
                loop {
                    let parameter = self.identifier("EXPECTED PARAMETER NAME")?;
                    let name = self.rules.name(&parameter.content);
                    let ty = self.suffix_type(parameter, &name)?;
                    if self.routines[index].find(&name).is_some() {
                        return Err(error!(DuplicateDeclaration, parameter;
                            "{lex} IS ALREADY A PARAMETER"));
                    }
                    let offset = self.routines[index].variables.len();
                    self.routines[index].variables.push(Variable {
                        name: name.into(),
                        ty,
                        storage: Storage::Parameter,
                        routine: index,
                        slot: Slot::Local(index, offset),
                        initialised: true,
                    });
                    self.routines[index].arity += 1;
                    if self.eat(LexemeKind::Delimiter(Delimiter::Comma)) {
                        continue;
                    }
                    self.expect(
                        LexemeKind::Delimiter(Delimiter::RParen),
                        "EXPECTED , OR )",
                    )?;
                    break;
                }
            }
            self.bodies.push(self.index);
        }
        Ok(())
    }

    fn program(&mut self) -> Result<()> {
        self.current = 0;
        self.index = 0;
        let (statements, _) = self.block(&[], "")?;
        self.routines[0].statements = statements;
        self.routines[0].lexemes = 0..self.index;
        Ok(())
    }

    fn subroutine(&mut self, index: usize) -> Result<()> {
        self.current = index;
        self.index = self.bodies[index - 1];
        let kind = self.routines[index].kind;
        let (closer, missing) = match (kind, self.rules.result) {
            (RoutineKind::Function, ResultStyle::Equals) => {
                (LexemeKind::Operator(Operator::Equal), "FUNCTION RESULT")
            }
            (RoutineKind::Function, ResultStyle::Return) => {
                (LexemeKind::Keyword(Keyword::EndFunc), "ENDFUNC")
            }
            _ => (LexemeKind::Keyword(Keyword::EndProc), "ENDPROC"),
        };
        let (mut statements, closed_by) = self.block(&[closer], missing)?;
        if let Some(lexeme) = closed_by {
            if lexeme.kind == LexemeKind::Operator(Operator::Equal) {
                let result = self.function_result(lexeme)?;
                statements.push(result);
            } else if self.rules.closer_names && self.peek_is(LexemeKind::Identifier) {
                if let Some(name) = self.next() {
                    if self.rules.name(&name.content) != *self.routines[index].name {
                        return Err(error!(SyntaxError, name;
                            &format!("{{lex}} DOES NOT MATCH {}", self.routines[index].name)));
                    }
                }
            }
        }
        self.end_of_statement()?;
        while let Some(lexeme) = self.peek() {
            if self.at_header() {
                break;
            }
            if lexeme.kind != LexemeKind::Newline {
                return Err(match lexeme.kind {
                    LexemeKind::Unknown => self.unexpected(""),
                    _ => error!(MisplacedStatement, lexeme; "{lex} OUTSIDE ANY ROUTINE"),
                });
            }
            self.next();
        }
        let routine = &mut self.routines[index];
        routine.statements = statements;
        routine.lexemes = routine.lexemes.start..self.index;
        Ok(())
    }

    // *** Blocks

    fn block(
        &mut self,
        closers: &[LexemeKind],
        missing: &str,
    ) -> Result<(Vec<Statement>, Option<&'a Lexeme>)> {
        let mut statements = vec![];
        loop {
            while self.eat(LexemeKind::Newline)
                || self.eat(LexemeKind::Delimiter(Delimiter::Colon))
            {}
            let lexeme = match self.peek() {
                Some(lexeme) if !self.at_header() => lexeme,
                _ => {
                    if closers.is_empty() {
                        return Ok((statements, None));
                    }
                    return Err(self.unexpected(&format!("MISSING {}", missing)));
                }
            };
            if closers.contains(&lexeme.kind) {
                self.next();
                return Ok((statements, Some(lexeme)));
            }
            if let Some(statement) = self.statement()? {
                statements.push(statement);
            }
            self.end_of_statement()?;
        }
    }

    /// Statements after a single-line `THEN` or `ELSE`, up to the end of the line.
    fn line_block(&mut self) -> Result<Vec<Statement>> {
        self.single_line += 1;
        let mut statements = vec![];
        loop {
            if let Some(statement) = self.statement()? {
                statements.push(statement);
            }
            self.end_of_statement()?;
            if !self.eat(LexemeKind::Delimiter(Delimiter::Colon)) {
                break;
            }
            match self.peek().map(|lexeme| lexeme.kind) {
                None | Some(LexemeKind::Newline) | Some(LexemeKind::Keyword(Keyword::Else)) => {
                    break
                }
                _ => {}
            }
        }
        self.single_line -= 1;
        Ok(statements)
    }

    fn end_of_statement(&mut self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(lexeme) if lexeme.is_end_of_statement() => Ok(()),
            Some(lexeme)
                if self.single_line > 0 && lexeme.kind == LexemeKind::Keyword(Keyword::Else) =>
            {
                Ok(())
            }
            Some(_) => Err(self.unexpected("EXPECTED END OF STATEMENT")),
        }
    }

    // *** Statements

    fn statement(&mut self) -> Result<Option<Statement>> {
        let lexeme = match self.peek() {
            Some(lexeme) => lexeme,
            None => return Err(self.unexpected("EXPECTED STATEMENT")),
        };
        match lexeme.kind {
            LexemeKind::Keyword(keyword) => {
                self.next();
                self.keyword(lexeme, keyword)
            }
            LexemeKind::Identifier => self.identifier_statement(lexeme).map(Some),
            LexemeKind::Builtin(builtin) => {
                self.next();
                if !builtin.is_command() {
                    return Err(error!(SyntaxError, lexeme; "{lex} IS A FUNCTION, NOT A COMMAND"));
                }
                let arguments = self.arguments(lexeme, builtin.params())?;
                Ok(Some(Statement::Command(lexeme.clone(), builtin, arguments)))
            }
            LexemeKind::Turtle(attribute) => {
                self.next();
                self.assignment(lexeme, Target::Turtle(attribute)).map(Some)
            }
            LexemeKind::Operator(Operator::Equal) if self.rules.result == ResultStyle::Equals => {
                self.next();
                self.function_result(lexeme).map(Some)
            }
            _ => Err(self.unexpected("EXPECTED STATEMENT")),
        }
    }

    fn keyword(&mut self, lexeme: &'a Lexeme, keyword: Keyword) -> Result<Option<Statement>> {
        use Keyword::*;
        let statement = match keyword {
            If => self.r#if(lexeme)?,
            While => self.r#while(lexeme)?,
            Repeat => self.r#repeat(lexeme)?,
            For => self.r#for(lexeme)?,
            Dim => self.dim(lexeme)?,
            End => Statement::End(lexeme.clone()),
            Exec => {
                let name = self.identifier("EXPECTED PROCEDURE NAME")?;
                match self.routine_named(&self.rules.name(&name.content)) {
                    Some(index) => self.call(name, index)?,
                    None => return Err(error!(UndefinedRoutine, name; "{lex} IS NOT DEFINED")),
                }
            }
            Local => {
                self.declarations(lexeme, Storage::Local)?;
                return Ok(None);
            }
            Private => {
                self.declarations(lexeme, Storage::Private)?;
                return Ok(None);
            }
            Return if self.rules.result == ResultStyle::Return => self.r#return(lexeme)?,
            EndProc
                if self.rules.nested_closer_returns
                    && self.routines[self.current].kind == RoutineKind::Procedure =>
            {
                Statement::Return(lexeme.clone(), None)
            }
            _ => return Err(error!(MisplacedStatement, lexeme; "UNEXPECTED {lex}")),
        };
        Ok(Some(statement))
    }

    fn identifier_statement(&mut self, lexeme: &'a Lexeme) -> Result<Statement> {
        let name = self.rules.name(&lexeme.content);
        self.next();
        if let Some(index) = self.routine_named(&name) {
            return self.call(lexeme, index);
        }
        if let Some(variable) = self.lookup(&name) {
            let target = match variable.ty.element() {
                Some(element) => Target::Element(variable.slot, element, self.subscript()?),
                None => Target::Variable(variable.slot, variable.ty),
            };
            return self.assignment(lexeme, target);
        }
        if !self.peek_is(LexemeKind::Operator(self.rules.assignment)) {
            return Err(error!(UndefinedRoutine, lexeme;
                "{lex} IS NOT A DEFINED PROCEDURE OR VARIABLE"));
        }
        if self.current != 0 {
            return Err(error!(UndeclaredVariable, lexeme; "{lex} HAS NOT BEEN DECLARED"));
        }
        let ty = self.suffix_type(lexeme, &name)?;
        self.next();
        let value = self.expression()?;
        check(ty, &value)?;
        let slot = self.declare(name, ty, Storage::Global, true);
        Ok(Statement::Assign(
            lexeme.clone(),
            Target::Variable(slot, ty),
            value,
        ))
    }

    fn assignment(&mut self, lexeme: &'a Lexeme, target: Target) -> Result<Statement> {
        let assign = LexemeKind::Operator(self.rules.assignment);
        self.expect(assign, &format!("EXPECTED {}", self.rules.assignment))?;
        let value = self.expression()?;
        let ty = match &target {
            Target::Variable(_, ty) | Target::Element(_, ty, _) => *ty,
            Target::Turtle(_) => Type::Integer,
        };
        check(ty, &value)?;
        Ok(Statement::Assign(lexeme.clone(), target, value))
    }

    fn call(&mut self, lexeme: &'a Lexeme, index: usize) -> Result<Statement> {
        if self.routines[index].kind != RoutineKind::Procedure {
            return Err(error!(SyntaxError, lexeme; "{lex} IS A FUNCTION, NOT A PROCEDURE"));
        }
        let params = self.routine_params(index);
        let arguments = self.arguments(lexeme, &params)?;
        Ok(Statement::Call(lexeme.clone(), index, arguments))
    }

    fn function_result(&mut self, lexeme: &'a Lexeme) -> Result<Statement> {
        let routine = &self.routines[self.current];
        let result = match (routine.kind, routine.result) {
            (RoutineKind::Function, Some(result)) => result,
            _ => return Err(error!(MisplacedStatement, lexeme; "{lex} OUTSIDE A FUNCTION")),
        };
        let value = self.expression()?;
        check(result, &value)?;
        Ok(Statement::Return(lexeme.clone(), Some(value)))
    }

    fn r#return(&mut self, lexeme: &'a Lexeme) -> Result<Statement> {
        match self.routines[self.current].kind {
            RoutineKind::Function => self.function_result(lexeme),
            RoutineKind::Procedure => Ok(Statement::Return(lexeme.clone(), None)),
            RoutineKind::Program => {
                Err(error!(MisplacedStatement, lexeme; "{lex} OUTSIDE A SUBROUTINE"))
            }
        }
    }

    fn r#if(&mut self, lexeme: &'a Lexeme) -> Result<Statement> {
        let condition = self.condition()?;
        self.expect(LexemeKind::Keyword(Keyword::Then), "EXPECTED THEN")?;
        let else_kind = LexemeKind::Keyword(Keyword::Else);
        let endif_kind = LexemeKind::Keyword(Keyword::EndIf);
        if self.peek().map_or(true, |l| l.kind == LexemeKind::Newline) {
            let (then_branch, closer) = self.block(&[else_kind, endif_kind], "ENDIF")?;
            let else_branch = match closer {
                Some(closer) if closer.kind == else_kind => self.block(&[endif_kind], "ENDIF")?.0,
                _ => vec![],
            };
            return Ok(Statement::If(
                lexeme.clone(),
                condition,
                then_branch,
                else_branch,
            ));
        }
        let then_branch = self.line_block()?;
        let else_branch = if self.eat(else_kind) {
            self.line_block()?
        } else {
            vec![]
        };
        Ok(Statement::If(
            lexeme.clone(),
            condition,
            then_branch,
            else_branch,
        ))
    }

    fn r#while(&mut self, lexeme: &'a Lexeme) -> Result<Statement> {
        let condition = self.condition()?;
        if self.rules.loop_do {
            self.expect(LexemeKind::Keyword(Keyword::Do), "EXPECTED DO")?;
        }
        let closer = self.rules.while_closer;
        let (body, _) = self.block(&[LexemeKind::Keyword(closer)], &closer.to_string())?;
        Ok(Statement::While(lexeme.clone(), condition, body))
    }

    fn r#repeat(&mut self, lexeme: &'a Lexeme) -> Result<Statement> {
        let (body, _) = self.block(&[LexemeKind::Keyword(Keyword::Until)], "UNTIL")?;
        let condition = self.condition()?;
        Ok(Statement::Repeat(lexeme.clone(), body, condition))
    }

    fn r#for(&mut self, lexeme: &'a Lexeme) -> Result<Statement> {
        let counter_lexeme = self.identifier("EXPECTED LOOP COUNTER")?;
        let name = self.rules.name(&counter_lexeme.content);
        let counter = match self.lookup(&name) {
            Some(variable) => {
                if variable.ty != Type::Integer {
                    return Err(error!(IncompatibleTypes, counter_lexeme;
                        "{lex} IS NOT AN INTEGER VARIABLE"));
                }
                variable.slot
            }
            None if self.current == 0 => {
                let ty = self.suffix_type(counter_lexeme, &name)?;
                if ty != Type::Integer {
                    return Err(error!(IncompatibleTypes, counter_lexeme;
                        "{lex} IS NOT AN INTEGER VARIABLE"));
                }
                self.declare(name.clone(), ty, Storage::Global, true)
            }
            None => {
                return Err(error!(UndeclaredVariable, counter_lexeme;
                    "{lex} HAS NOT BEEN DECLARED"))
            }
        };
        let assign = LexemeKind::Operator(self.rules.assignment);
        self.expect(assign, &format!("EXPECTED {}", self.rules.assignment))?;
        let from = self.integer()?;
        self.expect(LexemeKind::Keyword(Keyword::To), "EXPECTED TO")?;
        let to = self.integer()?;
        let by = if self.eat(LexemeKind::Keyword(Keyword::Step)) {
            Some(self.integer()?)
        } else {
            None
        };
        if self.rules.loop_do {
            self.expect(LexemeKind::Keyword(Keyword::Do), "EXPECTED DO")?;
        }
        self.loops += 1;
        let storage = match self.current {
            0 => Storage::Global,
            _ => Storage::Local,
        };
        let limit = self.declare(format!("{}.limit{}", name, self.loops), Type::Integer, storage, true);
        let step = self.declare(format!("{}.step{}", name, self.loops), Type::Integer, storage, true);
        let closer = self.rules.for_closer;
        let (body, _) = self.block(&[LexemeKind::Keyword(closer)], &closer.to_string())?;
        if self.peek_is(LexemeKind::Identifier) {
            if let Some(repeated) = self.next() {
                if self.rules.name(&repeated.content) != name {
                    return Err(error!(SyntaxError, repeated;
                        &format!("{{lex}} DOES NOT MATCH {}", counter_lexeme.content)));
                }
            }
        }
        Ok(Statement::For(
            lexeme.clone(),
            Box::new(ForLoop {
                counter,
                limit,
                step,
                from,
                to,
                by,
            }),
            body,
        ))
    }

    fn dim(&mut self, lexeme: &'a Lexeme) -> Result<Statement> {
        let name_lexeme = self.identifier("EXPECTED ARRAY NAME")?;
        let name = self.rules.name(&name_lexeme.content);
        let element = self.suffix_type(name_lexeme, &name)?;
        let size = self.subscript()?;
        let ty = match element.array_of() {
            Some(ty) => ty,
            None => return Err(error!(IncompatibleTypes, name_lexeme; "{lex} CANNOT BE AN ARRAY")),
        };
        let slot = match self.lookup(&name) {
            Some(variable)
                if self.current != 0
                    && variable.ty == ty
                    && matches!(variable.storage, Storage::Global | Storage::Private) =>
            {
                return Err(error!(MisplacedStatement, name_lexeme;
                    "{lex} CAN ONLY BE DIMENSIONED IN THE MAIN PROGRAM"))
            }
            Some(variable) if variable.ty == ty => variable.slot,
            Some(_) => {
                return Err(error!(DuplicateDeclaration, name_lexeme;
                    "{lex} IS ALREADY DECLARED"))
            }
            None => {
                let storage = match self.current {
                    0 => Storage::Global,
                    _ => Storage::Local,
                };
                self.declare(name, ty, storage, false)
            }
        };
        Ok(Statement::Dim(lexeme.clone(), slot, ty, size))
    }

    fn declarations(&mut self, lexeme: &'a Lexeme, storage: Storage) -> Result<()> {
        if self.current == 0 {
            return Err(error!(MisplacedStatement, lexeme; "{lex} OUTSIDE A SUBROUTINE"));
        }
        loop {
            let name_lexeme = self.identifier("EXPECTED VARIABLE NAME")?;
            let name = self.rules.name(&name_lexeme.content);
            let ty = self.suffix_type(name_lexeme, &name)?;
            if self.routines[self.current].find(&name).is_some() {
                return Err(error!(DuplicateDeclaration, name_lexeme;
                    "{lex} IS ALREADY DECLARED"));
            }
            self.declare(name, ty, storage, storage == Storage::Private);
            if !self.eat(LexemeKind::Delimiter(Delimiter::Comma)) {
                return Ok(());
            }
        }
    }

    // *** Symbols

    fn routine_named(&self, name: &str) -> Option<usize> {
        self.routines
            .iter()
            .skip(1)
            .position(|routine| &*routine.name == name)
            .map(|position| position + 1)
    }

    fn routine_params(&self, index: usize) -> Vec<Type> {
        self.routines[index]
            .parameters()
            .iter()
            .map(|parameter| parameter.ty)
            .collect()
    }

    fn lookup(&self, name: &str) -> Option<Variable> {
        let own = self.routines[self.current]
            .variables
            .iter()
            .find(|v| &*v.name == name && (self.current != 0 || v.storage != Storage::Private));
        let global = || {
            self.routines[0]
                .variables
                .iter()
                .find(|v| &*v.name == name && v.storage != Storage::Private)
        };
        own.or_else(global).cloned()
    }

    fn declare<S: Into<Rc<str>>>(
        &mut self,
        name: S,
        ty: Type,
        storage: Storage,
        initialised: bool,
    ) -> Slot {
        let routine = self.current;
        let storage = if routine == 0 { Storage::Global } else { storage };
        let slot = match storage {
            Storage::Global | Storage::Private => {
                self.globals += 1;
                Slot::Global(self.globals - 1)
            }
            Storage::Local | Storage::Parameter => {
                Slot::Local(routine, self.routines[routine].frame_size())
            }
        };
        let variable = Variable {
            name: name.into(),
            ty,
            storage,
            routine,
            slot,
            initialised,
        };
        if storage == Storage::Private {
            self.routines[0].variables.push(variable.clone());
        }
        self.routines[routine].variables.push(variable);
        slot
    }

    fn suffix_type(&self, lexeme: &Lexeme, name: &str) -> Result<Type> {
        match self.rules.type_of(name) {
            Some(ty) => Ok(ty),
            None => Err(error!(SyntaxError, lexeme; "{lex} NEEDS A TYPE SUFFIX")),
        }
    }

    // *** Expressions

    fn arguments(&mut self, lexeme: &'a Lexeme, params: &[Type]) -> Result<Vec<Expression>> {
        let mut arguments = vec![];
        if self.eat(LexemeKind::Delimiter(Delimiter::LParen))
            && !self.eat(LexemeKind::Delimiter(Delimiter::RParen))
        {
            loop {
                arguments.push(self.expression()?);
                if self.eat(LexemeKind::Delimiter(Delimiter::Comma)) {
                    continue;
                }
                self.expect(
                    LexemeKind::Delimiter(Delimiter::RParen),
                    "EXPECTED , OR )",
                )?;
                break;
            }
        }
        if arguments.len() != params.len() {
            return Err(error!(WrongNumberOfArguments, lexeme;
                &format!("{{lex}} TAKES {} ARGUMENTS, NOT {}", params.len(), arguments.len())));
        }
        for (param, argument) in params.iter().zip(arguments.iter()) {
            check(*param, argument)?;
        }
        Ok(arguments)
    }

    fn subscript(&mut self) -> Result<Expression> {
        self.expect(LexemeKind::Delimiter(Delimiter::LParen), "EXPECTED (")?;
        let index = self.integer()?;
        self.expect(LexemeKind::Delimiter(Delimiter::RParen), "EXPECTED )")?;
        Ok(index)
    }

    fn integer(&mut self) -> Result<Expression> {
        let expr = self.expression()?;
        check(Type::Integer, &expr)?;
        Ok(expr)
    }

    fn condition(&mut self) -> Result<Expression> {
        let expr = self.expression()?;
        check(Type::Boolean, &expr)?;
        Ok(expr)
    }

    fn expression(&mut self) -> Result<Expression> {
        self.binary(0)
    }

    fn binary(&mut self, precedence: usize) -> Result<Expression> {
        let mut lhs = self.unary()?;
        loop {
            let lexeme = match self.peek() {
                Some(lexeme) => lexeme,
                None => break,
            };
            let (operator, op_precedence) = match lexeme.kind {
                LexemeKind::Operator(operator) => match operator.precedence() {
                    Some(op_precedence) if op_precedence >= precedence => {
                        (operator, op_precedence)
                    }
                    _ => break,
                },
                _ => break,
            };
            self.next();
            let rhs = self.binary(op_precedence + 1)?;
            lhs = combine(lexeme, operator, lhs, rhs)?;
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expression> {
        let lexeme = match self.peek() {
            Some(lexeme) => lexeme,
            None => return Err(self.unexpected("EXPECTED EXPRESSION")),
        };
        match lexeme.kind {
            LexemeKind::Operator(Operator::Minus) => {
                self.next();
                let operand = self.unary()?;
                check(Type::Integer, &operand)?;
                Ok(Expression::Unary(lexeme.clone(), Operator::Minus, Box::new(operand)))
            }
            LexemeKind::Operator(Operator::Not) => {
                self.next();
                let operand = self.unary()?;
                check(Type::Integer, &operand)?;
                Ok(Expression::Unary(lexeme.clone(), Operator::Not, Box::new(operand)))
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expression> {
        let lexeme = match self.peek() {
            Some(lexeme) => lexeme,
            None => return Err(self.unexpected("EXPECTED EXPRESSION")),
        };
        let expr = match lexeme.kind {
            LexemeKind::Integer => Expression::Integer(lexeme.clone(), self.integer_value(lexeme)?),
            LexemeKind::String => Expression::String(lexeme.clone(), unquote(&lexeme.content)),
            LexemeKind::Boolean(value) => Expression::Boolean(lexeme.clone(), value),
            LexemeKind::Colour(rgb) => Expression::Integer(lexeme.clone(), rgb),
            LexemeKind::Turtle(attribute) => Expression::Turtle(lexeme.clone(), attribute),
            LexemeKind::Builtin(builtin) => {
                self.next();
                if builtin.is_command() {
                    return Err(error!(SyntaxError, lexeme;
                        "{lex} IS A COMMAND, NOT A FUNCTION"));
                }
                let arguments = self.arguments(lexeme, builtin.params())?;
                return Ok(Expression::Builtin(lexeme.clone(), builtin, arguments));
            }
            LexemeKind::Identifier => {
                self.next();
                return self.name_expression(lexeme);
            }
            LexemeKind::Delimiter(Delimiter::LParen) => {
                self.next();
                let expr = self.expression()?;
                self.expect(LexemeKind::Delimiter(Delimiter::RParen), "EXPECTED )")?;
                return Ok(expr);
            }
            _ => return Err(self.unexpected("EXPECTED EXPRESSION")),
        };
        self.next();
        Ok(expr)
    }

    fn name_expression(&mut self, lexeme: &'a Lexeme) -> Result<Expression> {
        let name = self.rules.name(&lexeme.content);
        if let Some(index) = self.routine_named(&name) {
            let result = match self.routines[index].result {
                Some(result) => result,
                None => {
                    return Err(error!(SyntaxError, lexeme;
                        "{lex} IS A PROCEDURE, NOT A FUNCTION"))
                }
            };
            let params = self.routine_params(index);
            let arguments = self.arguments(lexeme, &params)?;
            return Ok(Expression::Call(lexeme.clone(), index, result, arguments));
        }
        let variable = match self.lookup(&name) {
            Some(variable) => variable,
            None => {
                return Err(error!(UndeclaredVariable, lexeme; "{lex} HAS NOT BEEN DECLARED"))
            }
        };
        match variable.ty.element() {
            Some(element) => {
                let index = self.subscript()?;
                Ok(Expression::Element(
                    lexeme.clone(),
                    variable.slot,
                    element,
                    Box::new(index),
                ))
            }
            None => Ok(Expression::Variable(
                lexeme.clone(),
                variable.slot,
                variable.ty,
            )),
        }
    }

    fn integer_value(&self, lexeme: &Lexeme) -> Result<i32> {
        let content = &*lexeme.content;
        let value = match content.strip_prefix(self.rules.hex_prefix) {
            Some(hex) => u32::from_str_radix(hex, 16).ok().map(|n| n as i32),
            None => content.parse::<i32>().ok(),
        };
        match value {
            Some(value) => Ok(value),
            None => Err(error!(IntegerOutOfRange, lexeme; "{lex} IS OUT OF RANGE")),
        }
    }
}

fn check(expected: Type, expr: &Expression) -> Result<()> {
    if expected.accepts(expr.ty()) {
        return Ok(());
    }
    Err(error!(IncompatibleTypes, expr.lexeme();
        &format!("{} FOUND AT {{lex}} WHERE {} IS NEEDED", expr.ty(), expected)))
}

fn combine(lexeme: &Lexeme, operator: Operator, lhs: Expression, rhs: Expression) -> Result<Expression> {
    let numeric = |ty: Type| Type::Integer.accepts(ty);
    let (l, r) = (lhs.ty(), rhs.ty());
    let strings = l == Type::String && r == Type::String;
    let allowed = match operator {
        Operator::Plus => strings || (numeric(l) && numeric(r)),
        op if op.is_comparison() => strings || (numeric(l) && numeric(r)),
        _ => numeric(l) && numeric(r),
    };
    if !allowed {
        return Err(error!(IncompatibleTypes, lexeme;
            &format!("{{lex}} CANNOT COMBINE {} WITH {}", l, r)));
    }
    Ok(Expression::Binary(
        lexeme.clone(),
        operator,
        Box::new(lhs),
        Box::new(rhs),
    ))
}

/// Strips the quotes and collapses doubled quote characters.
fn unquote(content: &str) -> Rc<str> {
    let mut chars = content.chars();
    let quote = match chars.next() {
        Some(quote) => quote,
        None => return "".into(),
    };
    let inner = chars.as_str();
    let inner = inner.strip_suffix(quote).unwrap_or(inner);
    let doubled: String = [quote, quote].iter().collect();
    inner.replace(&doubled, &quote.to_string()).into()
}
