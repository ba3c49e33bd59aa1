/// Escribe una instrucción con su mnemónico alineado a una columna fija.
macro_rules! emit {
    ($self:expr, $opcode:expr) => {
        writeln!($self.output, "\t{}", $opcode)
    };

    ($self:expr, $opcode:expr, $($format:tt)*) => {{
        write!($self.output, "\t{:8}", $opcode)?;
        writeln!($self.output, $($format)*)
    }};
}
