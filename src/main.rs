use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use tradesim::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: logging disabled ({e})");
    }

    run(Cli::parse())
}
