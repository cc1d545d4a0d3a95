use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    mdclip::init();

    let cli = mdclip::cli::Cli::parse();
    match mdclip::cli::run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
