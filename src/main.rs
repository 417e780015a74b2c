use clap::Parser;
use validation_tool::{CliArgs, LoggingConfig, ToolConfig, init_logging, run};

fn main() -> anyhow::Result<()> {
    let logging_config = LoggingConfig::from_env();
    let _guard = init_logging(logging_config)?;

    let cli = CliArgs::parse();
    let config = ToolConfig::from_args(cli)?;

    // Fail fast on unreadable inputs
    config.validate()?;

    run(&config)
}
