use clap::Parser;
use cognilens::cli::Cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    cognilens::cli::run(Cli::parse()).await
}
