//! Rackdraw CLI - Compose network-rack diagrams

mod cli;

use clap::Parser;

fn main() {
    let cli_args = cli::Cli::parse();

    if let Err(e) = cli::RackdrawApp::run(cli_args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
