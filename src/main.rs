//! Shop CLI - Local-first shopping list

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = shopping_list::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
