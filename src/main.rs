use clap::Parser;
use mocktrader::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
