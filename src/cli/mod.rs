//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "legal-mitra",
    version,
    about = "Ask questions about Indian statutes and get cited answers",
    long_about = "Legal Mitra answers natural-language legal questions over Indian statutes. Questions \
                  are matched against a partitioned vector index (one namespace per act), re-ranked \
                  with section-aware heuristics, and answered by a hosted LLM citing its sources."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/legal-mitra/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Configuration profile to apply
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a legal question and get a cited answer
    Ask {
        /// Question to ask
        question: String,

        /// Number of sections to retrieve (1 to retrieval.max_top_k)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Restrict the search to these namespaces (repeatable)
        #[arg(short, long = "namespace")]
        namespaces: Vec<String>,

        /// Omit the source list
        #[arg(long)]
        no_sources: bool,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Retrieve ranked sections without generating an answer
    Retrieve {
        /// Question to search for
        question: String,

        /// Number of sections to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Restrict the search to these namespaces (repeatable)
        #[arg(short, long = "namespace")]
        namespaces: Vec<String>,
    },

    /// List the searchable namespaces
    Namespaces {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check index connectivity
    Health,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Print the configuration file path
    Path,
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_ask_with_namespaces() {
        let cli = Cli::try_parse_from([
            "legal-mitra",
            "ask",
            "Is theft bailable?",
            "-k",
            "3",
            "-n",
            "ipc",
            "-n",
            "bns",
        ])
        .unwrap();

        match cli.command {
            Commands::Ask {
                question,
                top_k,
                namespaces,
                no_sources,
                json,
            } => {
                assert_eq!(question, "Is theft bailable?");
                assert_eq!(top_k, Some(3));
                assert_eq!(namespaces, vec!["ipc", "bns"]);
                assert!(!no_sources);
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
