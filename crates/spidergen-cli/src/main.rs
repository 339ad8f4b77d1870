use clap::Parser;

mod cli;
mod logging;

fn main() -> miette::Result<()> {
    let cli = cli::Cli::parse();

    let log_config = logging::LogConfig::from_env();
    if cli.verbose {
        log_config.verbose().init();
    } else {
        log_config.init();
    }
    tracing::debug!("cli: {cli:?}");

    cli.run()
}
