use clap::{Parser, Subcommand};

mod commands;
mod output;
mod tty;

use commands::{enums, includes};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "srcmigrate")]
#[command(version = VERSION)]
#[command(about = "Regex-driven source migrations: enum renames and include extensions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rename enum types and values from a definition file
    Enums(enums::EnumsArgs),
    /// Rewrite #include directives
    Includes(includes::IncludesArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let (json_result, exit_code) = commands::run_json(cli.command);

    if let Err(err) = output::print_json_result(json_result) {
        eprintln!("srcmigrate: {}", err);
        return std::process::ExitCode::from(1);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
