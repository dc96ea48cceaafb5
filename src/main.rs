mod analysis;
mod cli;
mod models;
mod query;
mod server;
mod store;

use tracing_subscriber::EnvFilter;

fn main() {
    // Logging is opt-in via RUST_LOG; the CLI stays quiet by default.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
