use mcc::{compile_with, Phase};
use std::io::Read;

fn main() {
    let mut text = String::new();
    if let Err(error) = std::io::stdin().read_to_string(&mut text) {
        eprintln!("Failed to read stdin: {}", error);
        std::process::exit(1);
    }

    let result = compile_with(&text, |phase| match phase {
        Phase::Tokens(tokens) => print!("Tokens: {:#?}\n\n", tokens),
        Phase::Ast(ast) => print!("Ast: {:#?}\n\n", ast),
    });

    match result {
        Ok(ir) => println!("IR: {:#?}", ir),
        Err(diagnostics) => eprint!("{}", diagnostics),
    }
}
