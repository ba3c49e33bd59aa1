//! Emisión de código ensamblador.
//!
//! Recibe un [`Program`] ya validado, por lo cual esta fase no tiene
//! errores propios más allá de fallas de E/S en la salida. El resultado
//! es una rutina `main` completa en sintaxis Intel para x86-64.

use crate::ir::Program;
use bitflags::bitflags;
use std::io::{self, Write};

bitflags! {
    /// Opciones a aplicar durante la emisión.
    pub struct EmitOptions: u32 {
        /// Antecede el bloque de cada sentencia con un comentario que
        /// reproduce su texto original.
        const ANNOTATE = 0x01;
    }
}

/// Símbolo global de la rutina generada.
const ENTRY: &str = "main";

pub fn emit<W: Write>(program: &Program, options: EmitOptions, output: &mut W) -> io::Result<()> {
    writeln!(output, ".intel_syntax noprefix")?;
    writeln!(output, ".globl {}", ENTRY)?;

    x86_64::emit_function(output, ENTRY, program, options)
}

mod x86_64;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lex::Lexer, parse, semantic::SymbolTable, source};

    fn assembly(text: &str, options: EmitOptions) -> String {
        let symbols = SymbolTable::default();
        let tokens = Lexer::new(source::consume(text, "<test>"))
            .tokenize()
            .unwrap();

        let program = parse::parse(&tokens, &symbols)
            .unwrap()
            .lower(&symbols)
            .unwrap();

        let mut output = Vec::new();
        emit(&program, options, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn complete_routine() {
        let expected = "\
.intel_syntax noprefix
.globl main
main:
\tpush    rbp
\tmov     rbp, rsp
\tsub     rsp, 208
\tlea     rax, [rbp-8]
\tpush    rax
\tpush    3
\tpop     rdi
\tpop     rax
\tmov     [rax], rdi
\tpush    rdi
\tpop     rax
\tmov     rsp, rbp
\tpop     rbp
\tret
";

        assert_eq!(assembly("a=3;", EmitOptions::empty()), expected);
    }

    #[test]
    fn comparison_normalizes_to_one_or_zero() {
        let text = assembly("1<=2;", EmitOptions::empty());
        let body: Vec<_> = text
            .lines()
            .skip_while(|line| !line.contains("push    2"))
            .skip(1)
            .take(7)
            .map(str::trim)
            .collect();

        assert_eq!(
            body,
            vec![
                "pop     rdi",
                "pop     rax",
                "cmp     rax, rdi",
                "setle   al",
                "movzx   rax, al",
                "push    rax",
                "pop     rax",
            ]
        );
    }

    #[test]
    fn division_sign_extends() {
        let text = assembly("7/2;", EmitOptions::empty());
        assert!(text.contains("\tcqo\n\tidiv    rdi\n"));
    }

    #[test]
    fn variables_use_fixed_offsets() {
        let text = assembly("z;b;", EmitOptions::empty());
        assert!(text.contains("lea     rax, [rbp-208]"));
        assert!(text.contains("lea     rax, [rbp-16]"));
    }

    #[test]
    fn annotations_precede_statements() {
        let text = assembly("a = 1;\n a +\n 2;", EmitOptions::ANNOTATE);
        let comments: Vec<_> = text
            .lines()
            .filter(|line| line.starts_with("\t#"))
            .collect();

        assert_eq!(comments, vec!["\t# a = 1", "\t# a + 2"]);
    }

    #[test]
    fn empty_program_returns_zero() {
        let text = assembly("", EmitOptions::empty());
        assert!(text.contains("\tmov     rax, 0\n\tmov     rsp, rbp\n"));
    }
}
