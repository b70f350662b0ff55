use crate::config::{InputEncoding, OutputConfig, OutputFormat};
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CliCommands {
    /// Decode one parameter response frame and show the device parameters
    Decode {
        /// File holding the captured frame, "-" reads from standard input
        #[arg(short, long, default_value = "-")]
        input: String,
        /// Encoding of the captured frame (overrides the config file)
        #[arg(short, long, value_enum)]
        encoding: Option<InputEncoding>,
        /// Output format (overrides the config file)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
        /// Print JSON output on a single line
        #[clap(long, action)]
        compact: bool,
    },
    /// Show the lookup tables of the bit-packed protection settings
    Tables,
}

const fn about_text() -> &'static str {
    "greenway bms parameter decoder"
}

#[derive(Parser, Debug)]
#[command(version, about=about_text(), long_about = None)]
pub struct CliArgs {
    #[command(flatten)]
    pub verbose: Verbosity<WarnLevel>,

    /// Output configuration file (YAML), ignored if the default file does not exist
    #[arg(short, long, default_value_t = OutputConfig::DEFAULT_CONFIG_FILE.to_string())]
    pub config: String,

    #[command(subcommand)]
    pub command: CliCommands,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_defaults_to_stdin() {
        let args = CliArgs::try_parse_from(["gwbms", "decode"]).unwrap();
        assert_eq!(args.config, OutputConfig::DEFAULT_CONFIG_FILE);
        assert_eq!(
            args.command,
            CliCommands::Decode {
                input: "-".to_string(),
                encoding: None,
                format: None,
                compact: false,
            }
        );
    }

    #[test]
    fn decode_overrides() {
        let args = CliArgs::try_parse_from([
            "gwbms", "-c", "other.yaml", "decode", "-i", "frame.bin", "-e", "hex", "-f", "json",
            "--compact",
        ])
        .unwrap();
        assert_eq!(args.config, "other.yaml");
        assert_eq!(
            args.command,
            CliCommands::Decode {
                input: "frame.bin".to_string(),
                encoding: Some(InputEncoding::Hex),
                format: Some(OutputFormat::Json),
                compact: true,
            }
        );
    }

    #[test]
    fn tables_command() {
        let args = CliArgs::try_parse_from(["gwbms", "tables"]).unwrap();
        assert_eq!(args.command, CliCommands::Tables);
    }
}
