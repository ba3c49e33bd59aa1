//! Rastreo de ubicaciones originales en código fuente.
//!
//! Los distintos objetos internos que el compilador construye
//! deben llevar cuenta de rangos de ubicaciones en el código
//! fuente original, lo cual permite señalar el byte exacto en
//! donde ocurre un error. Las posiciones se miden en bytes desde
//! el inicio del texto, no en líneas y columnas, ya que el programa
//! completo llega como un único argumento.

use std::{
    fmt::{self, Debug, Display, Formatter},
    ops::Range,
    rc::Rc,
};

/// Un objeto cualquiera con una posición original asociada.
#[derive(Debug, Clone)]
pub struct Located<T> {
    location: Location,
    value: T,
}

impl<T> Located<T> {
    /// Obtiene el valor.
    pub fn val(&self) -> &T {
        &self.value
    }

    /// Obtiene la ubicación.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Descarta la ubicación y toma ownership del valor.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Descompone y toma ownership de las dos partes.
    pub fn split(self) -> (Location, T) {
        (self.location, self.value)
    }

    /// Construye a partir de un valor y una ubicación.
    pub fn at(value: T, location: Location) -> Self {
        Located { value, location }
    }

    /// Transforma el valor con la misma ubicación.
    pub fn map<U, F>(self, map: F) -> Located<U>
    where
        F: FnOnce(T) -> U,
    {
        Located {
            value: map(self.value),
            location: self.location,
        }
    }
}

impl<T> AsRef<T> for Located<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

/// Una ubicación está conformada por un origen y un rango de bytes.
#[derive(Clone)]
pub struct Location {
    from: Rc<Source>,
    position: Range<usize>,
}

impl Location {
    /// Unifica un rango de ubicaciones. Se asume el mismo origen.
    pub fn span(from: Location, to: &Location) -> Self {
        Location {
            from: from.from,
            position: from.position.start..to.position.end,
        }
    }

    /// Desplazamiento en bytes del inicio.
    pub fn start(&self) -> usize {
        self.position.start
    }

    /// Desplazamiento en bytes del fin, exclusivo.
    pub fn end(&self) -> usize {
        self.position.end
    }

    /// Origen completo al que pertenece esta ubicación.
    pub fn source(&self) -> &Source {
        &self.from
    }

    /// Fragmento de texto original que cubre esta ubicación.
    pub fn text(&self) -> &str {
        &self.from.text[self.position.clone()]
    }
}

impl Default for Location {
    /// Ubicación vacía en un origen vacío, para cuando no hay otra.
    fn default() -> Self {
        Location {
            from: Rc::new(Source {
                name: String::from("<unknown>"),
                text: String::new(),
            }),
            position: 0..0,
        }
    }
}

impl Display for Location {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:", self.from.name)?;

        let Range { start, end } = self.position;
        if end <= start + 1 {
            // Solo se señala un byte en específico
            write!(formatter, "{}", start)
        } else {
            write!(formatter, "[{}-{}]", start, end - 1)
        }
    }
}

impl Debug for Location {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        <Self as Display>::fmt(self, formatter)
    }
}

/// Nombre de origen y texto completo.
pub struct Source {
    name: String,
    text: String,
}

impl Source {
    /// Texto completo, tal y como se recibió.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Un flujo de entrada, carácter por carácter.
///
/// Cada carácter emitido incluye su propia ubicación. Al agotarse el
/// flujo, [`InputStream::here()`] produce una ubicación vacía al final
/// del texto, que es donde se ancla el token de fin de entrada.
pub struct InputStream {
    source: Rc<Source>,
    offset: usize,
}

impl InputStream {
    /// Observa el siguiente carácter sin consumirlo.
    pub fn peek(&self) -> Option<char> {
        self.source.text[self.offset..].chars().next()
    }

    /// Ubicación del siguiente carácter, o del final del texto.
    pub fn here(&self) -> Location {
        let width = self.peek().map_or(0, char::len_utf8);
        Location {
            from: Rc::clone(&self.source),
            position: self.offset..self.offset + width,
        }
    }
}

impl Iterator for InputStream {
    type Item = (char, Location);

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.peek()?;
        let location = self.here();

        self.offset += c.len_utf8();
        Some((c, location))
    }
}

/// Toma ownership de un texto fuente y lo expone como flujo de caracteres.
pub fn consume<T, S>(text: T, name: S) -> InputStream
where
    T: Into<String>,
    S: Into<String>,
{
    let source = Rc::new(Source {
        name: name.into(),
        text: text.into(),
    });

    InputStream { source, offset: 0 }
}
