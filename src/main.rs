use clap::Parser;
use laddersim::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
