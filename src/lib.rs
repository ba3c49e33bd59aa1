//! Compilador de expresiones aritméticas a ensamblador x86-64.
//!
//! # Front end
//! Cada programa deriva de un único texto fuente, recibido completo.
//! Este texto se somete primero a análisis léxico en [`lex`], de lo
//! cual se obtiene una secuencia de tokens. La secuencia de tokens se
//! dispone en un AST por medio de análisis sintáctico en [`parse`],
//! resolviendo de una vez cada variable a un slot del stack frame.
//! El árbol sintáctico es procesado en [`semantic`], de lo cual se
//! genera una representación intermedia de máquina de pila descrita
//! en [`ir`], con lo cual concluyen las fases delanteras del compilador.
//!
//! # Back end
//! En esta sección el compilador deja de ser agnóstico al sistema
//! objetivo. La emisión de código ensamblador ocurre en [`target`].
//! El ensamblado y enlazado del texto resultante quedan fuera del
//! compilador y se delegan a la toolchain del sistema.
//!
//! # Errores
//! No hay recuperación de errores: el primero que ocurra, en cualquier
//! fase, detiene la compilación y se reporta por medio de
//! [`error::Diagnostics`].

#[macro_use]
mod macros;

pub mod error;
pub mod ir;
pub mod lex;
pub mod parse;
pub mod semantic;
pub mod source;

mod codegen;

use error::Diagnostics;
use lex::{Lexer, Token};
use semantic::SymbolTable;
use source::Located;

/// Emisión de código.
///
/// Este módulo reexporta suficientes ítems internos relacionados a generación de código para
/// traducir IR a texto ensamblador.
pub mod target {
    pub use crate::codegen::{emit, EmitOptions};
}

/// Nombre con el que se identifica un texto fuente pasado como argumento.
pub const SOURCE_NAME: &str = "<input>";

/// Resultado intermedio de una fase, expuesto para depuración.
pub enum Phase<'a> {
    Tokens(&'a [Located<Token>]),
    Ast(&'a parse::Ast),
}

/// Ejecuta todas las fases delanteras sobre un texto fuente.
///
/// El programa resultante está listo para [`target::emit()`]. Ninguna
/// salida se produce aquí, por lo que un error nunca deja ensamblador
/// a medio escribir.
pub fn compile(text: &str) -> Result<ir::Program, Diagnostics> {
    compile_with(text, |_| ())
}

/// Como [`compile()`], pero permite observar el resultado de cada fase.
pub fn compile_with<F>(text: &str, mut observe: F) -> Result<ir::Program, Diagnostics>
where
    F: FnMut(Phase<'_>),
{
    let symbols = SymbolTable::default();

    let tokens = Lexer::new(source::consume(text, SOURCE_NAME))
        .tokenize()
        .map_err(|error| Diagnostics::from(error).kind("Lexical error"))?;

    observe(Phase::Tokens(&tokens));

    let ast = parse::parse(&tokens, &symbols)
        .map_err(|error| Diagnostics::from(error).kind("Syntax error"))?;

    observe(Phase::Ast(&ast));

    ast.lower(&symbols)
        .map_err(|error| Diagnostics::from(error).kind("Syntax error"))
}
