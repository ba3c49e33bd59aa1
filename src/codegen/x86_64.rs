use super::EmitOptions;
use crate::ir::{Arithmetic, Condition, Instruction, Local, Program};

use std::io::{self, Write};

// Esta es una arquitectura de 64 bits
const VALUE_SIZE: u32 = 8;

pub fn emit_function<W: Write>(
    output: &mut W,
    name: &str,
    program: &Program,
    options: EmitOptions,
) -> io::Result<()> {
    let x86_function = X86Function {
        output,
        program,
        options,
    };

    x86_function.write_asm(name)
}

#[derive(Copy, Clone)]
enum Reg {
    Rax,
    Rdi,
}

impl std::fmt::Display for Reg {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Reg::Rax => "rax",
            Reg::Rdi => "rdi",
        };

        formatter.write_str(name)
    }
}

struct X86Function<'a, W> {
    output: &'a mut W,
    program: &'a Program,
    options: EmitOptions,
}

impl<W: Write> X86Function<'_, W> {
    fn write_asm(mut self, name: &str) -> io::Result<()> {
        writeln!(self.output, "{}:", name)?;

        // Prólogo, crea un stack frame
        emit!(self, "push", "rbp")?;
        emit!(self, "mov", "rbp, rsp")?;

        // Se reserva memoria para todas las variables posibles
        let program = self.program;
        let slots = program.frame_slots;
        let stack_allocation = (slots + alignment_for(slots)) * VALUE_SIZE;
        if stack_allocation > 0 {
            emit!(self, "sub", "rsp, {}", stack_allocation)?;
        }

        // Cada bloque termina descartando su valor en %rax, por lo que
        // al salir queda ahí el valor de la última sentencia
        for statement in &program.statements {
            if self.options.contains(EmitOptions::ANNOTATE) {
                let text = statement.location.text();
                let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
                writeln!(self.output, "\t# {}", text)?;
            }

            for instruction in &statement.code {
                self.put_instruction(*instruction)?;
            }
        }

        if program.statements.is_empty() {
            emit!(self, "mov", "rax, 0")?;
        }

        // Epílogo, revierte al estado justo antes de la llamada
        emit!(self, "mov", "rsp, rbp")?;
        emit!(self, "pop", "rbp")?;
        emit!(self, "ret")
    }

    fn put_instruction(&mut self, instruction: Instruction) -> io::Result<()> {
        match instruction {
            Instruction::Push(value) => emit!(self, "push", "{}", value),

            Instruction::Address(local) => {
                emit!(self, "lea", "{}, {}", Reg::Rax, local_address(local))?;
                emit!(self, "push", "{}", Reg::Rax)
            }

            Instruction::Load => {
                emit!(self, "pop", "{}", Reg::Rax)?;
                emit!(self, "mov", "{0}, [{0}]", Reg::Rax)?;
                emit!(self, "push", "{}", Reg::Rax)
            }

            Instruction::Store => {
                self.pop_operands()?;
                emit!(self, "mov", "[{}], {}", Reg::Rax, Reg::Rdi)?;
                emit!(self, "push", "{}", Reg::Rdi)
            }

            Instruction::Arithmetic(operation) => {
                self.pop_operands()?;
                match operation {
                    Arithmetic::Add => emit!(self, "add", "{}, {}", Reg::Rax, Reg::Rdi)?,
                    Arithmetic::Sub => emit!(self, "sub", "{}, {}", Reg::Rax, Reg::Rdi)?,
                    Arithmetic::Mul => emit!(self, "imul", "{}, {}", Reg::Rax, Reg::Rdi)?,
                    Arithmetic::Div => {
                        // Extensión de signo de %rax a %rdx:%rax
                        emit!(self, "cqo")?;
                        emit!(self, "idiv", "{}", Reg::Rdi)?;
                    }
                }

                emit!(self, "push", "{}", Reg::Rax)
            }

            Instruction::Compare(condition) => {
                self.pop_operands()?;

                let set = match condition {
                    Condition::Equal => "sete",
                    Condition::NotEqual => "setne",
                    Condition::Less => "setl",
                    Condition::LessOrEqual => "setle",
                };

                emit!(self, "cmp", "{}, {}", Reg::Rax, Reg::Rdi)?;
                emit!(self, set, "al")?;
                emit!(self, "movzx", "{}, al", Reg::Rax)?;
                emit!(self, "push", "{}", Reg::Rax)
            }

            Instruction::Discard => emit!(self, "pop", "{}", Reg::Rax),
        }
    }

    /// El operando derecho se apiló de último, así que sale primero.
    fn pop_operands(&mut self) -> io::Result<()> {
        emit!(self, "pop", "{}", Reg::Rdi)?;
        emit!(self, "pop", "{}", Reg::Rax)
    }
}

fn local_address(Local(local): Local) -> String {
    format!("[rbp-{}]", (local + 1) * VALUE_SIZE)
}

fn alignment_for(slots: u32) -> u32 {
    // Cada valor es de 64 bits (8 bytes), y la frontera de alineamiento es de 16 bytes
    slots % 2
}
