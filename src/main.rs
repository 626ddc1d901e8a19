use clap::Command;
use std::error::Error;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    // Logs go to stderr, stdout carries the JSON result.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("scroogecoin")
        .about("ScroogeCoin transaction validation tools.")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(scroogecoin_lib::commands::handle_command())
        .get_matches();

    if let Some(matches) = matches.subcommand_matches("handle") {
        scroogecoin_lib::commands::run_handle_command(matches)
    } else {
        panic!("Should report help.");
    }
}
