//! Análisis léxico.
//!
//! # Tokenization
//! Esta es la primera fase del compilador. Descompone un [`InputStream`]
//! (flujo de caracteres) en unidades léxicas denominadas tokens. Los espacios
//! en blanco se descartan durante esta operación. Cada token emitido está
//! asociado a una ubicación en el código fuente original, lo cual permite
//! rastrear errores en tanto los mismos como constructos más elevados de
//! fases posteriores.
//!
//! # Contenido de un token
//! Operadores y puntuación se identifican por el hecho de lo que son y no
//! incluyen lexemas. Los identificadores sí incluyen su lexema original.
//! Las constantes literales se resuelven a sus valores en vez de preservar
//! sus lexemas; la ubicación del token conserva de todas formas su longitud.
//!
//! # Reglas importantes del lenguaje
//! - Un identificador es exactamente una letra minúscula.
//! - Los operadores de dos caracteres (`==`, `!=`, `<=`, `>=`) tienen
//!   prioridad sobre cualquier interpretación de un solo carácter.
//! - La secuencia de tokens siempre termina en [`Token::Eof`].
//!
//! # Errores
//! No hay recuperación: el primer error léxico detiene el análisis.

use crate::source::{InputStream, Located, Location};
use std::{
    fmt::{self, Display},
    rc::Rc,
};

use thiserror::Error;

/// Error de escaneo.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LexerError {
    /// Carácter desconocido o inesperado en el flujo de entrada.
    #[error("Bad character {0:?} in input stream")]
    BadChar(char),

    /// Una constante entera se encuentra fuera de rango.
    #[error("Integer literal overflow, valid range is [0, 2147483647]")]
    IntOverflow,

    /// Se trató de formar un identificador con una letra mayúscula.
    #[error("Identifiers must be a single lowercase letter")]
    UppercaseId,
}

/// Un identificador.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(Rc<str>);

impl From<char> for Identifier {
    fn from(c: char) -> Self {
        Identifier(Rc::from(c.to_string()))
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Identifier {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.0)
    }
}

/// Objeto resultante del análisis léxico.
///
/// Un token contiene suficiente información para describir completamente
/// a una entidad léxica en el programa fuente.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Identificador.
    Id(Identifier),

    /// Literal de entero.
    IntLiteral(i32),

    /// `=`
    Assign,

    /// `+`
    Plus,

    /// `-`
    Minus,

    /// `*`
    Times,

    /// `/`
    Slash,

    /// `;`
    Semicolon,

    /// `(`
    OpenParen,

    /// `)`
    CloseParen,

    /// `==`
    Equal,

    /// `!=`
    NotEqual,

    /// `<`
    Less,

    /// `<=`
    LessEqual,

    /// `>`
    Greater,

    /// `>=`
    GreaterEqual,

    /// Fin de la entrada.
    Eof,
}

impl Display for Token {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Token::*;

        match self {
            Id(id) => write!(fmt, "identifier `{}`", id),
            IntLiteral(integer) => write!(fmt, "literal `{}`", integer),
            Assign => fmt.write_str("`=`"),
            Plus => fmt.write_str("`+`"),
            Minus => fmt.write_str("`-`"),
            Times => fmt.write_str("`*`"),
            Slash => fmt.write_str("`/`"),
            Semicolon => fmt.write_str("`;`"),
            OpenParen => fmt.write_str("`(`"),
            CloseParen => fmt.write_str("`)`"),
            Equal => fmt.write_str("`==`"),
            NotEqual => fmt.write_str("`!=`"),
            Less => fmt.write_str("`<`"),
            LessEqual => fmt.write_str("`<=`"),
            Greater => fmt.write_str("`>`"),
            GreaterEqual => fmt.write_str("`>=`"),
            Eof => fmt.write_str("end of input"),
        }
    }
}

/// Máquina de estados para análisis léxico.
///
/// Un lexer puede encontrarse en uno de diversos estados. La
/// salida del lexer, así como su siguiente estado, se define
/// a partir de tanto su estado actual como el siguiente carácter
/// encontrado en el flujo de entrada.
pub struct Lexer {
    source: InputStream,
    state: State,
    start: Location,
}

/// Posibles estados del lexer.
enum State {
    /// Estado que ocurre antes de encontrar el inicio de un token.
    Start,

    /// Estado terminal, ya sea por error o por haber emitido [`Token::Eof`].
    Done,

    /// Estado de completitud; siempre emite el token incluido,
    /// consume la entrada actual y pasa a [`State::Start`].
    Complete(Token),

    /// Se encontró uno de `<`, `>`, `=` o `!`.
    ///
    /// Si sigue `=` se forma un operador de dos caracteres.
    Prefix(char),

    /// Constante entera.
    ///
    /// Este estado incluirá dígitos en el token mientras que
    /// el siguiente carácter sea un dígito.
    Integer(i32),
}

impl Lexer {
    /// Crea un lexer en estado inicial a partir de un flujo.
    pub fn new(source: InputStream) -> Self {
        let start = source.here();
        Lexer {
            source,
            state: State::Start,
            start,
        }
    }

    /// Reduce la entrada a una secuencia completa de tokens, terminada
    /// en [`Token::Eof`], o bien al primer error encontrado.
    pub fn tokenize(self) -> Result<Vec<Located<Token>>, Located<LexerError>> {
        self.collect()
    }

    /// Intenta construir un siguiente token.
    fn lex(&mut self) -> Result<Option<(Token, Location)>, LexerError> {
        use {State::*, Token::*};

        let mut last_accepted = self.start.clone();
        let token = loop {
            let next_char = self.source.peek();

            // La posición de origen se mueve junto a la entrada
            // siempre que no se haya encontrado una frontera de token
            if let Start = self.state {
                self.start = self.source.here();
                last_accepted = self.start.clone();
            }

            // Switch table principal, determina cambios de estado
            // y de salida del lexer a partir de combinaciones del
            // estado actual y el siguiente carácter
            match (&mut self.state, next_char) {
                (Done, _) => return Ok(None),

                // El fin de entrada es en sí un token
                (Start, None) => {
                    self.state = Done;
                    break Ok(Eof);
                }

                // Tokens triviales
                (Start, Some('+')) => self.state = Complete(Plus),
                (Start, Some('-')) => self.state = Complete(Minus),
                (Start, Some('*')) => self.state = Complete(Times),
                (Start, Some('/')) => self.state = Complete(Slash),
                (Start, Some(';')) => self.state = Complete(Semicolon),
                (Start, Some('(')) => self.state = Complete(OpenParen),
                (Start, Some(')')) => self.state = Complete(CloseParen),

                // Posibles operadores de dos caracteres
                (Start, Some(c @ ('<' | '>' | '=' | '!'))) => self.state = Prefix(c),

                // Identificadores de una sola letra
                (Start, Some(c)) if c.is_ascii_lowercase() => {
                    self.state = Complete(Id(Identifier::from(c)))
                }

                (Start, Some(c)) if c.is_ascii_uppercase() => break Err(LexerError::UppercaseId),

                // Inicio de una constante numérica. No se consume
                // el dígito, ya que esta lógica ya está implementada
                // en el respectivo caso para un estado de constante
                // entera. Por tanto, la constante es inicialmente cero.
                (Start, Some(c)) if c.is_ascii_digit() => {
                    self.state = Integer(0);
                    continue;
                }

                // Espacios en blanco y caracteres inesperados
                (Start, Some(c)) if c.is_whitespace() => (),
                (Start, Some(c)) => break Err(LexerError::BadChar(c)),

                // Emisión retardada de tokens cualesquiera
                (Complete(value), _) => break Ok(std::mem::replace(value, Eof)),

                // Maximal munch: `<=` nunca se parte en `<` y `=`
                (Prefix(c), Some('=')) => {
                    let token = match *c {
                        '<' => LessEqual,
                        '>' => GreaterEqual,
                        '=' => Equal,
                        _ => NotEqual,
                    };

                    self.state = Complete(token);
                }

                (Prefix('<'), _) => break Ok(Less),
                (Prefix('>'), _) => break Ok(Greater),
                (Prefix('='), _) => break Ok(Assign),
                (Prefix(c), _) => break Err(LexerError::BadChar(*c)),

                // Acumulación dígito por dígito de constantes enteras
                (Integer(accumulated), Some(digit)) if digit.is_ascii_digit() => {
                    let digit = digit as i32 - '0' as i32;

                    match accumulated
                        .checked_mul(10)
                        .and_then(|n| n.checked_add(digit))
                    {
                        Some(result) => *accumulated = result,
                        None => break Err(LexerError::IntOverflow),
                    }
                }

                // Si sigue algo que no es un dígito, la constante ha terminado
                (Integer(integer), _) => break Ok(IntLiteral(*integer)),
            }

            // Si no hubo `continue`, aquí se consume el carácter que
            // se observó con lookahead anteriormente
            if let Some((_, location)) = self.source.next() {
                last_accepted = location;
            }
        };

        token.map(|token| Some((token, last_accepted)))
    }
}

impl Iterator for Lexer {
    type Item = Result<Located<Token>, Located<LexerError>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.lex() {
            Ok(None) => None,
            Ok(Some((token, last_accepted))) => {
                if let State::Complete(_) | State::Prefix(_) | State::Integer(_) = self.state {
                    self.state = State::Start;
                }

                let location = Location::span(self.start.clone(), &last_accepted);
                Some(Ok(Located::at(token, location)))
            }

            Err(error) => {
                self.state = State::Done;
                Some(Err(Located::at(error, self.start.clone())))
            }
        }
    }
}
