use clap::Parser;

use guwen::cli::{Command, GuwenCli};
use guwen::commands;

fn main() -> anyhow::Result<()> {
    let args = GuwenCli::parse();

    match args.cmd {
        Some(Command::Run { input }) => commands::run::main(input),
        Some(Command::Translate { input, tokens_out, ast_out }) => {
            commands::translate::main(input, tokens_out, ast_out)
        }
        Some(Command::Repl) => commands::repl::main(),
        // `guwen <file>` behaves like `guwen run <file>`; nothing at all
        // opens the interactive session.
        None => match args.input {
            Some(input) => commands::run::main(input),
            None => commands::repl::main(),
        },
    }
}
