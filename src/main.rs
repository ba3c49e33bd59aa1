//! Punto de entrada ("driver").
//!
//! Este módulo orquesta las diferentes fases del proceso de
//! compilación y expone una CLI. El programa fuente llega como
//! único argumento posicional y el ensamblador sale por stdout.

use anyhow::{self, Context};
use clap::{self, crate_version, Arg};
use mcc::{target, Phase};

use std::{
    io::{self, Write},
    process,
};

fn main() -> anyhow::Result<()> {
    // Parsing de CLI
    let args = clap::App::new("mcc")
        .version(crate_version!())
        .about("Compiles an arithmetic program into x86-64 assembly")
        .arg(
            Arg::new("source")
                .required(true)
                .value_name("SOURCE")
                .allow_hyphen_values(true)
                .help("Program text, e.g. 'a=3;b=4;a+b;'"),
        )
        .arg(
            Arg::new("annotate")
                .short('a')
                .long("annotate")
                .help("Precede each statement's code with its source text"),
        )
        .arg(
            Arg::new("dump-tokens")
                .long("dump-tokens")
                .help("Print the token stream to stderr"),
        )
        .arg(
            Arg::new("dump-ast")
                .long("dump-ast")
                .help("Print the syntax tree to stderr"),
        )
        .get_matches();

    // Se extraen argumentos necesarios
    let source = args.value_of("source").unwrap_or_default();
    let dump_tokens = args.is_present("dump-tokens");
    let dump_ast = args.is_present("dump-ast");

    let mut options = target::EmitOptions::empty();
    if args.is_present("annotate") {
        options |= target::EmitOptions::ANNOTATE;
    }

    let result = mcc::compile_with(source, |phase| match phase {
        Phase::Tokens(tokens) if dump_tokens => eprint!("Tokens: {:#?}\n\n", tokens),
        Phase::Ast(ast) if dump_ast => eprint!("Ast: {:#?}\n\n", ast),
        _ => (),
    });

    let program = match result {
        Ok(program) => program,
        Err(diagnostics) => {
            eprint!("{}", diagnostics);
            process::exit(1);
        }
    };

    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    target::emit(&program, options, &mut stdout).context("Failed to emit to stdout")?;
    stdout.flush().context("Failed to flush stdout")?;

    Ok(())
}
