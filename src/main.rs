use clap::Parser;
use emacross::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
