//! Command-line surface for `larder`.

use clap::{Parser, Subcommand};
use larder_core::{PageRequest, UserId};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "larder", version, about = "Cached user directory over MySQL and Redis", long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and its overrides
    #[arg(long, env = "LARDER_CONFIG_DIR", default_value = "config")]
    pub config_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Apply pending database migrations
    Migrate,
    /// Insert the demo users if the table is empty
    Seed,
    /// Count users
    Count,
    /// List users, newest first
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = PageRequest::DEFAULT_SIZE)]
        size: u32,
        /// Return every user instead of one page
        #[arg(long, conflicts_with_all = ["page", "size"])]
        all: bool,
    },
    /// Get a user by id
    Get { id: UserId },
    /// Create a user
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
    },
    /// Change a user's name, username or email
    Update {
        id: UserId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Delete a user
    Delete { id: UserId },
    /// Delete every user and flush the cache
    Reset {
        /// Insert the demo users afterwards
        #[arg(long, default_value_t = false)]
        seed: bool,
    },
    /// Drop every cached user entry
    FlushCache,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("larder").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[test]
    fn test_list_defaults() {
        assert_eq!(
            parse(&["list"]),
            Command::List {
                page: 1,
                size: PageRequest::DEFAULT_SIZE,
                all: false
            }
        );
    }

    #[test]
    fn test_list_all_conflicts_with_page() {
        let result = Cli::try_parse_from(["larder", "list", "--all", "--page", "2"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_get_parses_id() {
        let id = UserId::new();
        assert_eq!(parse(&["get", &id.to_string()]), Command::Get { id });
        assert!(Cli::try_parse_from(["larder", "get", "not-a-uuid"]).is_err());
    }

    #[test]
    fn test_update_optional_fields() {
        let id = UserId::new();
        let command = parse(&["update", &id.to_string(), "--name", "Ada"]);
        assert_eq!(
            command,
            Command::Update {
                id,
                name: Some("Ada".to_string()),
                username: None,
                email: None
            }
        );
    }

    #[test]
    fn test_reset_and_flush() {
        assert_eq!(parse(&["reset", "--seed"]), Command::Reset { seed: true });
        assert_eq!(parse(&["flush-cache"]), Command::FlushCache);
        assert_eq!(parse(&["migrate"]), Command::Migrate);
    }

    #[test]
    fn test_config_dir_default() {
        let cli = Cli::try_parse_from(["larder", "count"]).unwrap();
        assert_eq!(cli.config_dir, PathBuf::from("config"));
    }
}
