//! Helpers compartidos por las pruebas de integración.
//!
//! [`Machine`] interpreta el subconjunto de x86-64 (sintaxis Intel) que
//! emite el compilador, lo cual permite verificar el valor de retorno de
//! un programa sin depender de un ensamblador en el host.

#![allow(dead_code)]

use mcc::target::{self, EmitOptions};
use std::collections::HashMap;

const STACK_TOP: i64 = 0x7fff_0000;

/// Compila y emite, fallando la prueba con el diagnóstico si hay error.
pub fn assemble(text: &str) -> String {
    let program = mcc::compile(text).unwrap_or_else(|diagnostics| panic!("\n{}", diagnostics));

    let mut output = Vec::new();
    target::emit(&program, EmitOptions::empty(), &mut output).unwrap();
    String::from_utf8(output).unwrap()
}

/// Valor de retorno de `main` para el programa dado.
pub fn run(text: &str) -> i64 {
    Machine::default().execute(&assemble(text))
}

/// Texto completo del diagnóstico de un programa que no compila.
pub fn diagnose(text: &str) -> String {
    match mcc::compile(text) {
        Ok(_) => panic!("`{}` should not compile", text),
        Err(diagnostics) => diagnostics.to_string(),
    }
}

#[derive(Default)]
pub struct Machine {
    registers: HashMap<String, i64>,
    memory: HashMap<i64, i64>,
    compared: (i64, i64),
}

impl Machine {
    /// Ejecuta `main` y retorna `%rax` al llegar a `ret`.
    pub fn execute(&mut self, assembly: &str) -> i64 {
        self.set("rsp", STACK_TOP);
        self.set("rbp", 0);

        let mut lines = assembly.lines().map(str::trim);
        assert_eq!(lines.next(), Some(".intel_syntax noprefix"));

        for line in lines {
            let directive = line.starts_with('.') || line.starts_with('#');
            if line.is_empty() || directive || line.ends_with(':') {
                continue;
            }

            let (opcode, operands) = match line.split_once(char::is_whitespace) {
                Some((opcode, operands)) => (opcode, operands.trim()),
                None => (line, ""),
            };

            let operands: Vec<_> = operands
                .split(',')
                .map(str::trim)
                .filter(|operand| !operand.is_empty())
                .collect();

            match (opcode, operands.as_slice()) {
                ("push", [source]) => {
                    let value = self.read(source);
                    let rsp = self.get("rsp") - 8;
                    self.set("rsp", rsp);
                    self.memory.insert(rsp, value);
                }

                ("pop", [target]) => {
                    let rsp = self.get("rsp");
                    let value = self.load(rsp);
                    self.set("rsp", rsp + 8);
                    self.write(target, value);
                }

                ("mov", [target, source]) => {
                    let value = self.read(source);
                    self.write(target, value);
                }

                ("lea", [target, source]) => {
                    let address = self.address(source).expect("lea without memory operand");
                    self.write(target, address);
                }

                ("add", [target, source]) => self.apply(target, source, i64::wrapping_add),
                ("sub", [target, source]) => self.apply(target, source, i64::wrapping_sub),
                ("imul", [target, source]) => self.apply(target, source, i64::wrapping_mul),

                ("cqo", []) => {
                    let sign = if self.get("rax") < 0 { -1 } else { 0 };
                    self.set("rdx", sign);
                }

                ("idiv", [divisor]) => {
                    let divisor = self.read(divisor);
                    assert_ne!(divisor, 0, "division by zero");

                    let dividend = self.get("rax");
                    self.set("rax", dividend.wrapping_div(divisor));
                    self.set("rdx", dividend.wrapping_rem(divisor));
                }

                ("cmp", [lhs, rhs]) => self.compared = (self.read(lhs), self.read(rhs)),

                ("sete", ["al"]) => self.set_al(self.compared.0 == self.compared.1),
                ("setne", ["al"]) => self.set_al(self.compared.0 != self.compared.1),
                ("setl", ["al"]) => self.set_al(self.compared.0 < self.compared.1),
                ("setle", ["al"]) => self.set_al(self.compared.0 <= self.compared.1),

                ("movzx", [target, "al"]) => {
                    let low = self.get("rax") & 0xff;
                    self.write(target, low);
                }

                ("ret", []) => {
                    assert_eq!(self.get("rsp"), STACK_TOP, "unbalanced stack at ret");
                    return self.get("rax");
                }

                _ => panic!("unsupported instruction: {}", line),
            }
        }

        panic!("fell off the end of main");
    }

    fn get(&self, register: &str) -> i64 {
        self.registers.get(register).copied().unwrap_or(0)
    }

    fn set(&mut self, register: &str, value: i64) {
        self.registers.insert(register.to_string(), value);
    }

    fn set_al(&mut self, flag: bool) {
        let rax = (self.get("rax") & !0xff) | flag as i64;
        self.set("rax", rax);
    }

    fn load(&self, address: i64) -> i64 {
        *self
            .memory
            .get(&address)
            .unwrap_or_else(|| panic!("read from uninitialized address {:#x}", address))
    }

    /// Dirección efectiva de un operando `[reg]` o `[reg-disp]`.
    fn address(&self, operand: &str) -> Option<i64> {
        let inner = operand.strip_prefix('[')?.strip_suffix(']')?;
        Some(match inner.split_once('-') {
            Some((base, displacement)) => self.get(base) - displacement.parse::<i64>().unwrap(),
            None => self.get(inner),
        })
    }

    fn read(&self, operand: &str) -> i64 {
        if let Some(address) = self.address(operand) {
            return self.load(address);
        }

        match operand.parse::<i64>() {
            Ok(immediate) => immediate,
            Err(_) => self.get(operand),
        }
    }

    fn write(&mut self, operand: &str, value: i64) {
        match self.address(operand) {
            Some(address) => {
                self.memory.insert(address, value);
            }

            None => self.set(operand, value),
        }
    }

    fn apply(&mut self, target: &str, source: &str, operation: fn(i64, i64) -> i64) {
        let value = operation(self.read(target), self.read(source));
        self.write(target, value);
    }
}
