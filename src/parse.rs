//! Análisis sintáctico.
//!
//! Parser de descenso recursivo con un token de lookahead. Cada nivel
//! de precedencia es una regla; todos los operadores binarios asocian
//! a la izquierda excepto la asignación, que asocia a la derecha:
//!
//! ```text
//! program     := statement* eof
//! statement   := expression ';'
//! expression  := assignment
//! assignment  := equality ( '=' assignment )?
//! equality    := relational ( ('==' | '!=') relational )*
//! relational  := additive ( ('<' | '<=' | '>' | '>=') additive )*
//! additive    := term ( ('+' | '-') term )*
//! term        := unary ( ('*' | '/') unary )*
//! unary       := ('+' | '-')? primary
//! primary     := integer | identifier | '(' expression ')'
//! ```
//!
//! Las variables se resuelven contra la [`SymbolTable`] en el momento en
//! que se encuentran, por lo que el AST ya contiene slots de frame.

use thiserror::Error;

use crate::{
    ir::Local,
    lex::{Identifier, Token},
    semantic::SymbolTable,
    source::{Located, Location},
};

/// Secuencia de sentencias, en orden de ejecución.
#[derive(Debug)]
pub struct Ast(Vec<Located<Expr>>);

impl Ast {
    pub fn statements(&self) -> &[Located<Expr>] {
        &self.0
    }
}

#[derive(Debug)]
pub enum Expr {
    Integer(i32),
    Variable(Local),
    Assign(Box<Located<Expr>>, Box<Located<Expr>>),
    Binary(Box<Located<Expr>>, BinOp, Box<Located<Expr>>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
}

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Expected {0}, found {1} instead")]
    UnexpectedToken(Token, Token),

    #[error("Expected an expression, found {0} instead")]
    ExpectedExpr(Token),

    #[error("Expression nested too deeply, limit is {0} levels")]
    TooDeep(usize),

    /// Solo ocurre con identificadores que no provienen del lexer.
    #[error("Symbol `{0}` is undefined")]
    Undefined(Identifier),

    /// Solo ocurre si se llama a [`parse()`] directamente con una
    /// secuencia que no termina en [`Token::Eof`].
    #[error("Abrupt end of program")]
    UnexpectedEof,
}

/// Máximo de paréntesis o asignaciones anidadas en una misma sentencia.
pub const MAX_NESTING: usize = 256;

pub fn parse(
    tokens: &[Located<Token>],
    symbols: &SymbolTable,
) -> Result<Ast, Located<ParserError>> {
    let mut parser = Parser {
        tokens,
        position: 0,
        depth: 0,
        symbols,
    };

    parser.program()
}

struct Parser<'a> {
    tokens: &'a [Located<Token>],
    position: usize,
    depth: usize,
    symbols: &'a SymbolTable,
}

type Parse<T> = Result<T, Located<ParserError>>;

impl Parser<'_> {
    fn program(&mut self) -> Parse<Ast> {
        let mut statements = Vec::new();
        while *self.peek()?.as_ref() != Token::Eof {
            statements.push(self.statement()?);
        }

        Ok(Ast(statements))
    }

    fn statement(&mut self) -> Parse<Located<Expr>> {
        let expr = self.expr()?;
        self.expect(Token::Semicolon)?;

        Ok(expr)
    }

    fn expr(&mut self) -> Parse<Located<Expr>> {
        self.assignment()
    }

    fn assignment(&mut self) -> Parse<Located<Expr>> {
        let target = self.equality()?;
        let location = self.peek()?.location().clone();
        if !self.accept(&Token::Assign) {
            return Ok(target);
        }

        // Que `target` sea asignable se verifica durante lowering
        let value = self.nested(&location, Self::assignment)?;
        Ok(binary_node(target, value, Expr::Assign))
    }

    fn equality(&mut self) -> Parse<Located<Expr>> {
        let mut lhs = self.relational()?;

        loop {
            let op = match self.peek()?.as_ref() {
                Token::Equal => BinOp::Equal,
                Token::NotEqual => BinOp::NotEqual,
                _ => break Ok(lhs),
            };

            self.next()?;
            let rhs = self.relational()?;
            lhs = binary_node(lhs, rhs, |lhs, rhs| Expr::Binary(lhs, op, rhs));
        }
    }

    fn relational(&mut self) -> Parse<Located<Expr>> {
        let mut lhs = self.additive()?;

        loop {
            // `a > b` y `a >= b` se normalizan a `b < a` y `b <= a`
            let (op, swap) = match self.peek()?.as_ref() {
                Token::Less => (BinOp::Less, false),
                Token::LessEqual => (BinOp::LessOrEqual, false),
                Token::Greater => (BinOp::Less, true),
                Token::GreaterEqual => (BinOp::LessOrEqual, true),
                _ => break Ok(lhs),
            };

            self.next()?;
            let rhs = self.additive()?;
            lhs = binary_node(lhs, rhs, |lhs, rhs| {
                if swap {
                    Expr::Binary(rhs, op, lhs)
                } else {
                    Expr::Binary(lhs, op, rhs)
                }
            });
        }
    }

    fn additive(&mut self) -> Parse<Located<Expr>> {
        let mut lhs = self.term()?;

        loop {
            let op = match self.peek()?.as_ref() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break Ok(lhs),
            };

            self.next()?;
            let rhs = self.term()?;
            lhs = binary_node(lhs, rhs, |lhs, rhs| Expr::Binary(lhs, op, rhs));
        }
    }

    fn term(&mut self) -> Parse<Located<Expr>> {
        let mut lhs = self.unary()?;

        loop {
            let op = match self.peek()?.as_ref() {
                Token::Times => BinOp::Mul,
                Token::Slash => BinOp::Div,
                _ => break Ok(lhs),
            };

            self.next()?;
            let rhs = self.unary()?;
            lhs = binary_node(lhs, rhs, |lhs, rhs| Expr::Binary(lhs, op, rhs));
        }
    }

    fn unary(&mut self) -> Parse<Located<Expr>> {
        let (location, token) = self.peek()?.clone().split();
        match token {
            Token::Plus => {
                self.next()?;
                self.primary()
            }

            // `-x` es `0 - x`
            Token::Minus => {
                self.next()?;
                let zero = Located::at(Expr::Integer(0), location);
                let operand = self.primary()?;

                Ok(binary_node(zero, operand, |zero, operand| {
                    Expr::Binary(zero, BinOp::Sub, operand)
                }))
            }

            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Parse<Located<Expr>> {
        let (location, token) = self.next()?.split();
        match token {
            Token::IntLiteral(integer) => Ok(Located::at(Expr::Integer(integer), location)),

            Token::Id(id) => {
                let id = Located::at(id, location);
                let local = self.symbols.lookup(&id)?;

                Ok(id.map(|_| Expr::Variable(local)))
            }

            Token::OpenParen => {
                let inner = self.nested(&location, Self::expr)?;
                let close = self.expect(Token::CloseParen)?;

                let location = Location::span(location, &close);
                Ok(Located::at(inner.into_inner(), location))
            }

            found => Err(Located::at(ParserError::ExpectedExpr(found), location)),
        }
    }

    /// Desciende un nivel de anidamiento, fallando en `at` si se excede el límite.
    fn nested<T, F>(&mut self, at: &Location, parse: F) -> Parse<T>
    where
        F: FnOnce(&mut Self) -> Parse<T>,
    {
        if self.depth >= MAX_NESTING {
            return Err(Located::at(ParserError::TooDeep(MAX_NESTING), at.clone()));
        }

        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;

        result
    }

    /// Consume el siguiente token si es igual a `token`.
    fn accept(&mut self, token: &Token) -> bool {
        match self.tokens.get(self.position) {
            Some(next) if next.as_ref() == token => {
                self.position += 1;
                true
            }

            _ => false,
        }
    }

    fn expect(&mut self, token: Token) -> Parse<Location> {
        let (location, found) = self.peek()?.clone().split();
        if found != token {
            return Err(Located::at(
                ParserError::UnexpectedToken(token, found),
                location,
            ));
        }

        self.position += 1;
        Ok(location)
    }

    fn peek(&self) -> Parse<&'_ Located<Token>> {
        match self.tokens.get(self.position) {
            Some(token) => Ok(token),
            None => self.fail(ParserError::UnexpectedEof),
        }
    }

    fn next(&mut self) -> Parse<Located<Token>> {
        let token = self.peek()?.clone();

        // `Eof` nunca se consume, así que siempre queda un token por delante
        if *token.as_ref() != Token::Eof {
            self.position += 1;
        }

        Ok(token)
    }

    fn fail<T>(&self, error: ParserError) -> Parse<T> {
        let location = self
            .tokens
            .last()
            .map(|token| token.location().clone())
            .unwrap_or_default();

        Err(Located::at(error, location))
    }
}

/// Construye un nodo que abarca desde su hijo izquierdo hasta el derecho.
fn binary_node<F>(lhs: Located<Expr>, rhs: Located<Expr>, node: F) -> Located<Expr>
where
    F: FnOnce(Box<Located<Expr>>, Box<Located<Expr>>) -> Expr,
{
    let location = Location::span(lhs.location().clone(), rhs.location());
    Located::at(node(Box::new(lhs), Box::new(rhs)), location)
}
