use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use crate::app::{App, Commands};

mod app;
mod commands;

fn main() -> anyhow::Result<()> {
    let app = App::parse();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(app.log_level()));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!(?app, "parsed arguments");

    match app.cmd {
        Commands::Pack(arg) => commands::pack(arg),
        Commands::Unpack(arg) => commands::unpack(arg),
        Commands::Formats => commands::formats(),
    }
}
