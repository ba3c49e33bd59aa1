//! Representación intermedia.
//!
//! El IR describe una máquina de pila: toda expresión deja exactamente
//! un valor en la pila de evaluación, y cada operación compuesta consume
//! los valores que dejaron sus operandos. Un programa es una secuencia de
//! bloques, uno por sentencia, cada uno terminado en [`Instruction::Discard`].

use crate::source::Location;

#[derive(Debug)]
pub struct Program {
    /// Cantidad de slots de variable en el único stack frame.
    pub frame_slots: u32,
    pub statements: Vec<Statement>,
}

#[derive(Debug)]
pub struct Statement {
    pub location: Location,
    pub code: Vec<Instruction>,
}

/// Slot de variable dentro del stack frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Local(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Arithmetic {
    Add,
    Sub,
    Mul,
    Div,
}

/// Condiciones de comparación. `>` y `>=` se expresan invirtiendo operandos.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// Apila una constante.
    Push(i32),

    /// Apila la dirección de una local.
    Address(Local),

    /// Reemplaza la dirección en el tope por el valor almacenado ahí.
    Load,

    /// Desapila valor y dirección, almacena, y vuelve a apilar el valor.
    Store,

    /// Desapila derecha e izquierda, apila el resultado.
    Arithmetic(Arithmetic),

    /// Como [`Instruction::Arithmetic`], pero el resultado es `0` o `1`.
    Compare(Condition),

    /// Desapila el tope hacia el registro de resultado.
    Discard,
}
