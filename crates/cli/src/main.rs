//! Simla CLI - Run directory gateway operations from the shell.
//!
//! # Usage
//!
//! ```bash
//! # Verify the API key
//! simla check
//!
//! # Fetch customers grouped by site, refreshing the cache
//! simla customers --no-cache
//!
//! # Dump cached orders as JSON
//! simla orders --json > orders.json
//!
//! # Merge customers 11 and 12 into 10
//! simla combine --into 10 11 12
//!
//! # Clear phones of customers sharing a number
//! simla clear-phones 11 12 13
//!
//! # Unsubscribe a customer from email
//! simla subscribe --channel email --subscribed false ext-42
//! ```
//!
//! # Commands
//!
//! - `check` - Verify credentials
//! - `customers` / `orders` - Bulk fetch grouped by site
//! - `combine` - Merge customer records
//! - `clear-phones` - Remove phone numbers from customers
//! - `subscribe` - Update subscription preferences
//!
//! Configuration is read from the environment (and `.env`); see
//! [`simla_gateway::SimlaConfig`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{ArgAction, Parser, Subcommand};
use simla_core::{ByIdentifier, CustomerId};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "simla")]
#[command(author, version, about = "Simla customer directory tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify the configured API key
    Check,
    /// Fetch all customers grouped by site
    Customers {
        /// Ignore the cache and fetch from the API
        #[arg(long)]
        no_cache: bool,

        /// Print the grouped map as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Fetch all orders grouped by site and customer
    Orders {
        /// Ignore the cache and fetch from the API
        #[arg(long)]
        no_cache: bool,

        /// Print the grouped map as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Merge customers into one surviving record
    Combine {
        /// Customer that survives the merge
        #[arg(long)]
        into: CustomerId,

        /// Customers merged into it
        #[arg(required = true)]
        ids: Vec<CustomerId>,
    },
    /// Remove every phone number from the given customers
    ClearPhones {
        /// Keep going after a failed edit
        #[arg(long)]
        continue_on_error: bool,

        /// Internal IDs of the customers
        #[arg(required = true)]
        ids: Vec<CustomerId>,
    },
    /// Update a customer's subscription to a channel
    Subscribe {
        /// Channel code, e.g. `email` or `sms`
        #[arg(long)]
        channel: String,

        /// Whether the customer is subscribed
        #[arg(long, action = ArgAction::Set)]
        subscribed: bool,

        /// How KEY identifies the customer (`externalId` or `id`)
        #[arg(long, default_value_t = ByIdentifier::ExternalId)]
        by: ByIdentifier,

        /// Site the customer belongs to
        #[arg(long)]
        site: Option<String>,

        /// Customer identifier
        key: String,
    },
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let gateway = commands::gateway()?;

    match cli.command {
        Commands::Check => commands::directory::check(&gateway).await?,
        Commands::Customers { no_cache, json } => {
            commands::directory::customers(&gateway, no_cache, json).await?;
        }
        Commands::Orders { no_cache, json } => {
            commands::directory::orders(&gateway, no_cache, json).await?;
        }
        Commands::Combine { into, ids } => {
            commands::customers::combine(&gateway, into, &ids).await?;
        }
        Commands::ClearPhones {
            continue_on_error,
            ids,
        } => {
            commands::customers::clear_phones(&gateway, &ids, continue_on_error).await?;
        }
        Commands::Subscribe {
            channel,
            subscribed,
            by,
            site,
            key,
        } => {
            let target = commands::customers::SubscribeTarget { key, by, site };
            commands::customers::subscribe(&gateway, &target, &channel, subscribed).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_combine() {
        let cli = Cli::try_parse_from(["simla", "combine", "--into", "10", "11", "12"]).unwrap();
        let Commands::Combine { into, ids } = cli.command else {
            panic!("expected combine");
        };
        assert_eq!(into, CustomerId::new(10));
        assert_eq!(ids, vec![CustomerId::new(11), CustomerId::new(12)]);
    }

    #[test]
    fn test_combine_requires_ids() {
        assert!(Cli::try_parse_from(["simla", "combine", "--into", "10"]).is_err());
    }

    #[test]
    fn test_parse_subscribe_by_id() {
        let cli = Cli::try_parse_from([
            "simla",
            "subscribe",
            "--channel",
            "email",
            "--subscribed",
            "false",
            "--by",
            "id",
            "42",
        ])
        .unwrap();
        let Commands::Subscribe {
            subscribed, by, key, ..
        } = cli.command
        else {
            panic!("expected subscribe");
        };
        assert!(!subscribed);
        assert_eq!(by, ByIdentifier::Id);
        assert_eq!(key, "42");
    }

    #[test]
    fn test_subscribe_defaults_to_external_id() {
        let cli = Cli::try_parse_from([
            "simla",
            "subscribe",
            "--channel",
            "sms",
            "--subscribed",
            "true",
            "ext-1",
        ])
        .unwrap();
        let Commands::Subscribe { by, site, .. } = cli.command else {
            panic!("expected subscribe");
        };
        assert_eq!(by, ByIdentifier::ExternalId);
        assert!(site.is_none());
    }
}
