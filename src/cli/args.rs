//! CLI argument definitions using clap
//!
//! Commands:
//! - publishable check --config <path>
//! - publishable list --config <path> --model <name>
//! - publishable publish --config <path> --model <name> --id <uuid>
//! - publishable expire --config <path> --model <name> --id <uuid>
//! - publishable explain --config <path> --model <name>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// publishable - scheduled visibility windows for stored records
#[derive(Parser, Debug)]
#[command(name = "publishable")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load the configuration and report every registered model
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./publishable.json")]
        config: PathBuf,
    },

    /// List a model's records visible at an instant
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./publishable.json")]
        config: PathBuf,

        /// Model name
        #[arg(long)]
        model: String,

        /// Include unpublished, scheduled and expired records
        #[arg(long)]
        with_not_published: bool,

        /// Evaluate at this RFC 3339 instant instead of the system clock
        #[arg(long)]
        now: Option<String>,
    },

    /// Publish a stored record
    Publish {
        /// Path to configuration file
        #[arg(long, default_value = "./publishable.json")]
        config: PathBuf,

        /// Model name
        #[arg(long)]
        model: String,

        /// Record id
        #[arg(long)]
        id: String,

        /// Publication instant (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<String>,
    },

    /// Expire a stored record
    Expire {
        /// Path to configuration file
        #[arg(long, default_value = "./publishable.json")]
        config: PathBuf,

        /// Model name
        #[arg(long)]
        model: String,

        /// Record id
        #[arg(long)]
        id: String,

        /// Expiry instant (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<String>,
    },

    /// Show the resolved query for a model without running it
    Explain {
        /// Path to configuration file
        #[arg(long, default_value = "./publishable.json")]
        config: PathBuf,

        /// Model name
        #[arg(long)]
        model: String,

        /// Bypass the published scope
        #[arg(long)]
        with_not_published: bool,

        /// Resolve at this RFC 3339 instant instead of the system clock
        #[arg(long)]
        now: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_flags() {
        let cli = Cli::try_parse_from([
            "publishable",
            "list",
            "--model",
            "article",
            "--with-not-published",
            "--now",
            "2024-03-01T00:00:00Z",
        ])
        .unwrap();

        match cli.command {
            Command::List {
                config,
                model,
                with_not_published,
                now,
            } => {
                assert_eq!(config, PathBuf::from("./publishable.json"));
                assert_eq!(model, "article");
                assert!(with_not_published);
                assert_eq!(now.as_deref(), Some("2024-03-01T00:00:00Z"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_publish_requires_id() {
        let result = Cli::try_parse_from(["publishable", "publish", "--model", "article"]);
        assert!(result.is_err());
    }
}
