//! Command-line interface for saviour.
//!
//! This module provides the CLI structure for the `saviour` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AuthCommand, ConfigCommand, DonorsCommand, ExploreCommand, ListCommand, OutputFormat,
    ProfileArgs, RegisterCommand, ViewArg,
};

/// saviour - Find and register blood donors
///
/// Keeps a local registry of blood donors, renders it as cards, a map or a
/// dashboard, and manages a local account.
#[derive(Debug, Parser)]
#[command(name = "saviour")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search, list and register donors
    #[command(subcommand)]
    Donors(DonorsCommand),

    /// Print donor map markers
    Map {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print dashboard chart data
    Dashboard {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show registry and storage statistics
    Stats {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Open a page by route id (home, map-view, dashboard, donate)
    Navigate {
        /// Route id; unknown ids open home
        route: String,
    },

    /// Manage the local account
    #[command(subcommand)]
    Auth(AuthCommand),

    /// Search the explore directory and inspect state left by other pages
    #[command(subcommand)]
    Explore(ExploreCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "saviour");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_levels() {
        use crate::logging::Verbosity;

        assert_eq!(parse(&["saviour", "-q", "stats"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["saviour", "stats"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["saviour", "-v", "stats"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["saviour", "-vv", "stats"]).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_donors_list() {
        let cli = parse(&["saviour", "donors", "list", "--query", "dhaka", "--view", "light"]);
        let Command::Donors(DonorsCommand::List(list)) = cli.command else {
            panic!("expected donors list");
        };
        assert_eq!(list.query, "dhaka");
        assert_eq!(list.view, ViewArg::Light);
        assert_eq!(list.format, OutputFormat::Plain);
    }

    #[test]
    fn test_parse_saved_conflicts_with_query() {
        let result = Cli::try_parse_from(["saviour", "donors", "list", "--saved", "--query", "x"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_register() {
        let cli = parse(&[
            "saviour", "donors", "register", "--name", "Nila", "--group", "O-", "--city", "Sylhet",
        ]);
        assert!(matches!(
            cli.command,
            Command::Donors(DonorsCommand::Register(_))
        ));
    }

    #[test]
    fn test_parse_contact() {
        let cli = parse(&["saviour", "donors", "contact", "42"]);
        assert!(matches!(
            cli.command,
            Command::Donors(DonorsCommand::Contact { id: 42 })
        ));
    }

    #[test]
    fn test_parse_navigate() {
        let cli = parse(&["saviour", "navigate", "map-view"]);
        assert!(matches!(cli.command, Command::Navigate { ref route } if route == "map-view"));
    }

    #[test]
    fn test_parse_auth_signup() {
        let cli = parse(&[
            "saviour",
            "auth",
            "signup",
            "--name",
            "Nila",
            "--email",
            "nila@example.com",
            "--password",
            "pw",
            "--confirm",
            "pw",
        ]);
        let Command::Auth(AuthCommand::Signup { profile, .. }) = cli.command else {
            panic!("expected signup");
        };
        assert_eq!(profile.email.as_deref(), Some("nila@example.com"));
    }

    #[test]
    fn test_parse_auth_login() {
        let cli = parse(&["saviour", "auth", "login", "nila@example.com", "--password", "pw"]);
        assert!(matches!(cli.command, Command::Auth(AuthCommand::Login { .. })));
    }

    #[test]
    fn test_parse_explore() {
        let cli = parse(&["saviour", "explore", "saved-search"]);
        assert!(matches!(
            cli.command,
            Command::Explore(ExploreCommand::SavedSearch)
        ));
    }

    #[test]
    fn test_parse_explore_ask() {
        let cli = parse(&["saviour", "explore", "ask", "3", "-m", "Need B+ tonight"]);
        let Command::Explore(ExploreCommand::Ask { index, message }) = cli.command else {
            panic!("expected explore ask");
        };
        assert_eq!(index, 3);
        assert_eq!(message, "Need B+ tonight");
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["saviour", "-c", "/custom/config.toml", "config", "path"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert!(matches!(cli.command, Command::Config(ConfigCommand::Path)));
    }
}
