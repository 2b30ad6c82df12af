use clap::Parser;
use taskify::cli::commands::Cli;
use taskify::cli::handlers;

fn main() {
    // Library diagnostics (swallowed storage errors etc.) go to stderr.
    // Level is overridable via RUST_LOG.
    let _logger = flexi_logger::Logger::try_with_env_or_str("warn")
        .and_then(|logger| logger.start())
        .ok();

    let cli = Cli::parse();
    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
