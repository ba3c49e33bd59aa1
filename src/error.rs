//! Reporte de errores.
//!
//! La compilación se detiene en el primer error, sin importar la fase
//! en la que ocurra. [`Diagnostics`] envuelve ese error junto con su
//! ubicación y lo presenta al estilo de un compilador de línea de
//! comandos: el texto fuente, un marcador `^` bajo el byte culpable y
//! un mensaje legible.

use crate::source::{Located, Location};
use std::{
    error::Error,
    fmt::{self, Debug, Display},
};

mod sealed {
    pub trait Sealed {}
}

pub trait LocatedError: sealed::Sealed {
    fn source(&self) -> &dyn Error;
    fn location(&self) -> &Location;
}

pub struct Diagnostics {
    kind: &'static str,
    error: Box<dyn 'static + LocatedError>,
}

impl Diagnostics {
    pub fn kind(self, kind: &'static str) -> Self {
        Diagnostics { kind, ..self }
    }

    pub fn location(&self) -> &Location {
        self.error.location()
    }
}

impl<E: 'static + LocatedError> From<E> for Diagnostics {
    fn from(error: E) -> Self {
        Diagnostics {
            kind: "error",
            error: Box::new(error),
        }
    }
}

impl Display for Diagnostics {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Diagnostics { kind, error } = self;

        let location = error.location();
        writeln!(fmt, "{}", location.source().text())?;

        // La columna es el desplazamiento en bytes, no en caracteres
        writeln!(
            fmt,
            "{:skip$}^ {}: {}",
            "",
            kind,
            error.source(),
            skip = location.start()
        )
    }
}

impl Debug for Diagnostics {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            fmt,
            "{} at {}: {}",
            self.kind,
            self.location(),
            self.error.source()
        )
    }
}

impl<E: Error> sealed::Sealed for Located<E> {}

impl<E: Error> LocatedError for Located<E> {
    fn source(&self) -> &dyn Error {
        self.as_ref()
    }

    fn location(&self) -> &Location {
        Located::location(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lex::Lexer, source};

    #[test]
    fn marker_sits_under_offending_byte() {
        let error = Lexer::new(source::consume("1 + $;", "<test>"))
            .tokenize()
            .unwrap_err();

        let diagnostics = Diagnostics::from(error).kind("Lexical error");
        assert_eq!(
            diagnostics.to_string(),
            "1 + $;\n    ^ Lexical error: Bad character '$' in input stream\n"
        );
    }

    #[test]
    fn marker_at_start_has_no_padding() {
        let error = Lexer::new(source::consume("#", "<test>"))
            .tokenize()
            .unwrap_err();

        let diagnostics = Diagnostics::from(error);
        assert!(diagnostics
            .to_string()
            .ends_with("\n^ error: Bad character '#' in input stream\n"));
        assert_eq!(diagnostics.location().start(), 0);
    }
}
