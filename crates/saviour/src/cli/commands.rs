//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::auth::UserProfile;
use crate::render::View;

/// Donor registry commands.
#[derive(Debug, Subcommand)]
pub enum DonorsCommand {
    /// List donors matching a search
    List(ListCommand),

    /// Show the compact donor feed
    Feed {
        /// Output format
        #[arg(short, long, value_enum, default_value = "html")]
        format: OutputFormat,
    },

    /// Register a new donor
    Register(RegisterCommand),

    /// Send a contact request to a donor
    Contact {
        /// Donor id
        id: i64,
    },

    /// Show one donor
    Show {
        /// Donor id
        id: i64,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Search text matched against name, blood group and city
    #[arg(long, default_value = "")]
    pub query: String,

    /// Presentation variant for HTML output
    #[arg(long, value_enum, default_value = "card")]
    pub view: ViewArg,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,

    /// Apply the search saved by the find page instead of --query
    #[arg(long, conflicts_with = "query")]
    pub saved: bool,
}

/// Register command arguments.
#[derive(Debug, Args)]
pub struct RegisterCommand {
    /// Donor name
    #[arg(short, long)]
    pub name: String,

    /// Blood group (A+, A-, B+, B-, O+, O-, AB+, AB-)
    #[arg(short, long)]
    pub group: String,

    /// City
    #[arg(long)]
    pub city: String,
}

/// Account commands.
#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Create the local account
    Signup {
        /// Profile fields
        #[command(flatten)]
        profile: ProfileArgs,

        /// Password
        #[arg(long)]
        password: String,

        /// Password again
        #[arg(long)]
        confirm: String,
    },

    /// Log in with email or name
    Login {
        /// Email or full name
        username: String,

        /// Password
        #[arg(long)]
        password: String,
    },

    /// Log out
    Logout,

    /// Show the logged-in profile
    Profile {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Change fields of the logged-in profile
    UpdateProfile {
        /// Profile fields to change
        #[command(flatten)]
        profile: ProfileArgs,

        /// New password
        #[arg(long)]
        password: Option<String>,
    },

    /// Request a password recovery link
    Recover {
        /// Account email
        email: String,
    },
}

/// Profile fields shared by signup and profile update.
#[derive(Debug, Clone, Default, Args)]
pub struct ProfileArgs {
    /// Full name
    #[arg(long)]
    pub name: Option<String>,

    /// Email address
    #[arg(long)]
    pub email: Option<String>,

    /// Gender
    #[arg(long)]
    pub gender: Option<String>,

    /// Blood group
    #[arg(long)]
    pub blood: Option<String>,

    /// Phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// City
    #[arg(long)]
    pub city: Option<String>,

    /// Area within the city
    #[arg(long)]
    pub area: Option<String>,

    /// Whether you volunteer as a donor
    #[arg(long)]
    pub donor: Option<bool>,
}

impl ProfileArgs {
    /// Overwrite the fields of `profile` that were given on the command line.
    #[must_use]
    pub fn apply_to(self, mut profile: UserProfile) -> UserProfile {
        let fields = [
            (self.name, &mut profile.name),
            (self.email, &mut profile.email),
            (self.gender, &mut profile.gender),
            (self.blood, &mut profile.blood),
            (self.phone, &mut profile.phone),
            (self.city, &mut profile.city),
            (self.area, &mut profile.area),
        ];
        for (value, field) in fields {
            if let Some(value) = value {
                *field = value;
            }
        }
        if let Some(donor) = self.donor {
            profile.isdonor = donor;
        }
        profile
    }
}

/// Explore page state commands.
#[derive(Debug, Subcommand)]
pub enum ExploreCommand {
    /// Print and consume the search saved by the find page
    SavedSearch,

    /// Print the number of pending donation requests
    Requests,

    /// Search the explore directory
    Directory {
        /// Search text matched against name, blood group, area and city
        #[arg(long, default_value = "")]
        query: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Ask a directory donor for help
    Ask {
        /// Directory index, as printed by `explore directory`
        index: usize,

        /// Message to send
        #[arg(short, long, default_value = "")]
        message: String,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Donor list presentation argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ViewArg {
    /// Full donor cards
    Card,
    /// Compact rows
    Light,
}

impl From<ViewArg> for View {
    fn from(arg: ViewArg) -> Self {
        match arg {
            ViewArg::Card => Self::Card,
            ViewArg::Light => Self::Light,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per donor
    #[default]
    Plain,
    /// Rendered markup
    Html,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_arg_conversion() {
        assert_eq!(View::from(ViewArg::Card), View::Card);
        assert_eq!(View::from(ViewArg::Light), View::Light);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_profile_args_apply_only_given_fields() {
        let current = UserProfile {
            name: "Nila".to_string(),
            email: "nila@example.com".to_string(),
            city: "Sylhet".to_string(),
            ..UserProfile::default()
        };
        let args = ProfileArgs {
            city: Some("Khulna".to_string()),
            donor: Some(true),
            ..ProfileArgs::default()
        };

        let updated = args.apply_to(current);

        assert_eq!(updated.name, "Nila");
        assert_eq!(updated.city, "Khulna");
        assert!(updated.isdonor);
    }

    #[test]
    fn test_list_command_debug() {
        let cmd = ListCommand {
            query: "dhaka".to_string(),
            view: ViewArg::Light,
            format: OutputFormat::Html,
            saved: false,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("dhaka"));
        assert!(debug_str.contains("Light"));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
