mod cli;
mod config;
mod logging;
mod run;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    logging::initialize(
        monitor_logging::level_from_verbosity(cli.verbose),
        cli.log_file.as_deref(),
    );

    let config = config::Config::resolve(&cli)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run::run(config))
}
