mod assets;
mod cli;
mod dom;
mod error;
mod preferences;
mod report;
mod selector;
mod session;
mod simplify;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use session::Session;
use std::process;
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let mut session = Session::open(cli.config.as_deref())?;
    if let Some(title) = &cli.title {
        session.prefs.title = Some(title.clone());
    }
    let summary = session.simplify(&cli.input, &cli.out)?;
    if cli.json {
        println!("{}", serde_json::to_string(&summary)?);
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    if let Err(err) = run(&cli) {
        eprintln!("simplify-transcript: {err:#}");
        process::exit(1);
    }
}
