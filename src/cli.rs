//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;

/// shorturl - short id to URL mapping service
#[derive(Parser, Debug)]
#[command(name = "shorturl")]
#[command(version)]
#[command(about = "A small URL shortener service", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML); missing file means defaults + environment
    #[arg(long, short = 'c', global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Write a configuration file filled with defaults
    GenerateConfig {
        /// Output path
        #[arg(long, short = 'o', default_value = "config.example.toml")]
        output: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_is_default() {
        let cli = Cli::try_parse_from(["shorturl"]).unwrap();
        assert_eq!(cli.config, DEFAULT_CONFIG_PATH);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_config_flag_is_global() {
        let cli = Cli::try_parse_from(["shorturl", "serve", "-c", "prod.toml"]).unwrap();
        assert_eq!(cli.config, "prod.toml");
        assert_eq!(cli.command, Some(Commands::Serve));
    }

    #[test]
    fn test_generate_config_output() {
        let cli = Cli::try_parse_from(["shorturl", "generate-config", "-o", "out.toml"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::GenerateConfig {
                output: "out.toml".to_string()
            })
        );
    }
}
