//! Tabla de símbolos y lowering a IR.
//!
//! El lenguaje no tiene declaraciones ni ámbitos: cada una de las 26 letras
//! minúsculas es una variable con un slot fijo en el único stack frame del
//! programa. El lowering recorre cada sentencia en post-orden y produce un
//! bloque de instrucciones de máquina de pila. Aquí, y no en el parser, se
//! detecta que el lado izquierdo de una asignación no es una variable.

use thiserror::Error;

use std::collections::HashMap;

use crate::{
    ir::{self, Arithmetic, Condition, Instruction, Local},
    lex::Identifier,
    parse::{self, BinOp, Expr, ParserError},
    source::Located,
};

/// Asociación de identificadores a slots del stack frame.
pub struct SymbolTable {
    symbols: HashMap<Identifier, Local>,
}

impl SymbolTable {
    /// Tabla con una variable por cada letra de `'a'` a `'z'`, en ese orden.
    pub fn alphabet() -> Self {
        let symbols = ('a'..='z')
            .zip(0..)
            .map(|(letter, slot)| (Identifier::from(letter), Local(slot)))
            .collect();

        SymbolTable { symbols }
    }

    pub fn lookup(&self, id: &Located<Identifier>) -> Result<Local, Located<ParserError>> {
        self.symbols.get(id.as_ref()).copied().ok_or_else(|| {
            Located::at(
                ParserError::Undefined(id.as_ref().clone()),
                id.location().clone(),
            )
        })
    }

    /// Cantidad de slots que el frame debe reservar.
    pub fn slots(&self) -> u32 {
        self.symbols
            .values()
            .map(|Local(slot)| slot + 1)
            .max()
            .unwrap_or(0)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::alphabet()
    }
}

pub type Semantic<T> = Result<T, Located<SemanticError>>;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SemanticError {
    #[error("Not an lvalue, only a variable can be assigned to")]
    NotAnLvalue,
}

/// Destino de las instrucciones generadas.
trait Sink {
    fn push(&mut self, instruction: Instruction);
}

impl Sink for Vec<Instruction> {
    fn push(&mut self, instruction: Instruction) {
        Vec::push(self, instruction)
    }
}

impl parse::Ast {
    /// Traduce cada sentencia a su bloque de IR, en orden.
    ///
    /// Todo bloque termina en [`Instruction::Discard`], lo cual deja en el
    /// registro de resultado el valor de la última sentencia ejecutada.
    pub fn lower(&self, symbols: &SymbolTable) -> Semantic<ir::Program> {
        let statements = self
            .statements()
            .iter()
            .map(|statement| -> Semantic<ir::Statement> {
                let mut code = Vec::new();
                value(statement, &mut code)?;
                code.push(Instruction::Discard);

                Ok(ir::Statement {
                    location: statement.location().clone(),
                    code,
                })
            })
            .collect::<Semantic<Vec<_>>>()?;

        Ok(ir::Program {
            frame_slots: symbols.slots(),
            statements,
        })
    }
}

/// Genera código que deja el valor de `expr` en la pila.
fn value<S: Sink>(expr: &Located<Expr>, sink: &mut S) -> Semantic<()> {
    match expr.as_ref() {
        Expr::Integer(integer) => sink.push(Instruction::Push(*integer)),

        Expr::Variable(_) => {
            address(expr, sink)?;
            sink.push(Instruction::Load);
        }

        Expr::Assign(target, source) => {
            address(target, sink)?;
            value(source, sink)?;
            sink.push(Instruction::Store);
        }

        Expr::Binary(lhs, op, rhs) => {
            value(lhs, sink)?;
            value(rhs, sink)?;

            let instruction = match op {
                BinOp::Add => Instruction::Arithmetic(Arithmetic::Add),
                BinOp::Sub => Instruction::Arithmetic(Arithmetic::Sub),
                BinOp::Mul => Instruction::Arithmetic(Arithmetic::Mul),
                BinOp::Div => Instruction::Arithmetic(Arithmetic::Div),
                BinOp::Equal => Instruction::Compare(Condition::Equal),
                BinOp::NotEqual => Instruction::Compare(Condition::NotEqual),
                BinOp::Less => Instruction::Compare(Condition::Less),
                BinOp::LessOrEqual => Instruction::Compare(Condition::LessOrEqual),
            };

            sink.push(instruction);
        }
    }

    Ok(())
}

/// Genera código que deja la dirección de `expr` en la pila.
fn address<S: Sink>(expr: &Located<Expr>, sink: &mut S) -> Semantic<()> {
    match expr.as_ref() {
        Expr::Variable(local) => {
            sink.push(Instruction::Address(*local));
            Ok(())
        }

        _ => Err(Located::at(
            SemanticError::NotAnLvalue,
            expr.location().clone(),
        )),
    }
}
