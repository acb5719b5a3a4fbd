//! kbox CLI - Linux kernel and busybox build orchestrator
//!
//! Entry point for the kbox command-line application.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use kbox::cli::output::display_error;
use kbox::cli::Cli;
use kbox::error::KboxError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let output = cli.output_config();

    // RUST_LOG wins over the verbosity flags
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(output.log_level())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = cli.run().await {
        let code = e.downcast_ref::<KboxError>().map_or(1, KboxError::exit_code);
        display_error(&e);
        std::process::exit(code);
    }
}
