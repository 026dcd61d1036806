//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Serve bundled CSS and JavaScript assets over HTTP
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: assetry.toml)
    #[arg(short = 'C', long, default_value = "assetry.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve assets over HTTP
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        common: CommonArgs,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Write every asset to the web root once
    #[command(visible_alias = "d")]
    Dump {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// List asset routes with their sources
    #[command(visible_alias = "r")]
    Routes {
        #[command(flatten)]
        common: CommonArgs,
    },
}

/// Arguments shared by every subcommand
#[derive(clap::Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// Override `assetic.debug` (per-leaf routes, skip `?` filters)
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub debug: Option<bool>,
}

impl Cli {
    pub fn common(&self) -> &CommonArgs {
        match &self.command {
            Commands::Serve { common, .. }
            | Commands::Dump { common }
            | Commands::Routes { common } => common,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::parse_from(["assetry", "-C", "site.toml", "serve", "-p", "8080", "--debug"]);
        assert_eq!(cli.config, PathBuf::from("site.toml"));
        assert_eq!(cli.common().debug, Some(true));
        assert!(matches!(
            cli.command,
            Commands::Serve {
                interface: None,
                port: Some(8080),
                ..
            }
        ));
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::parse_from(["assetry", "dump"]);
        assert_eq!(cli.config, PathBuf::from("assetry.toml"));
        assert_eq!(cli.common().debug, None);
        assert!(!cli.common().verbose);
        assert!(matches!(cli.command, Commands::Dump { .. }));
    }

    #[test]
    fn test_debug_false() {
        let cli = Cli::parse_from(["assetry", "routes", "-V", "--debug", "false"]);
        assert_eq!(cli.common().debug, Some(false));
        assert!(cli.common().verbose);
    }
}
