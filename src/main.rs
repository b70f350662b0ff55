use anyhow::{Context, Result};
use clap::Parser;
use flexi_logger::{Logger, LoggerHandle};
use gwbms_lib::parameters::DeviceParameterRecord;
use log::*;
use std::panic;

mod commandline;
mod config;
mod input;
mod report;

use commandline::{CliArgs, CliCommands};
use config::{OutputConfig, OutputFormat};

fn logging_init(loglevel: LevelFilter) -> Result<LoggerHandle> {
    let log_handle = Logger::try_with_env_or_str(loglevel.as_str())
        .and_then(|logger| logger.start())
        .with_context(|| "Cannot start logging")?;

    panic::set_hook(Box::new(|panic_info| {
        error!("gwbms panicked: {panic_info}");
    }));
    Ok(log_handle)
}

fn print_record(record: &DeviceParameterRecord, config: &OutputConfig) -> Result<()> {
    match config.format {
        OutputFormat::Text => print!("{}", report::render(record)),
        OutputFormat::Debug => println!("{record:#?}"),
        OutputFormat::Json => {
            let json = if config.pretty {
                serde_json::to_string_pretty(record)
            } else {
                serde_json::to_string(record)
            }
            .with_context(|| "Cannot serialize parameters to JSON")?;
            println!("{json}");
        }
        OutputFormat::Yaml => print!(
            "{}",
            serde_yaml::to_string(record).with_context(|| "Cannot serialize parameters to YAML")?
        ),
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let _log_handle = logging_init(args.verbose.log_level_filter())?;

    match args.command {
        CliCommands::Decode {
            input,
            encoding,
            format,
            compact,
        } => {
            let config = OutputConfig::load_or_default(&args.config)
                .with_context(|| format!("Cannot load config file '{}'", args.config))?
                .with_overrides(format, encoding, compact);
            debug!("Output config: {config:?}");

            let frame = input::read_frame(&input, config.encoding)?;
            let record = gwbms_lib::decode(&frame)
                .with_context(|| format!("Cannot decode parameter frame from '{}'", input))?;
            info!(
                "Decoded parameters of '{}' with {} cells",
                record.battery_name, record.battery_serial_count
            );
            print_record(&record, &config)?;
        }
        CliCommands::Tables => print!("{}", report::render_tables()),
    }

    Ok(())
}
