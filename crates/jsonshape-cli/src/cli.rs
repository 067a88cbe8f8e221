//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Jsonshape CLI - validate and diff JSON/YAML documents against schemas
///
/// Checks documents against jsonshape schema files, fills in declared
/// fallbacks, and reports schema-guided differences between two documents.
#[derive(Parser, Debug)]
#[command(
    name = "jsonshape",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "JSONSHAPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a document against a schema
    Validate(ValidateArgs),

    /// Show the schema-guided differences between two documents
    Diff(DiffArgs),

    /// Validate a document and print it, failing on the first invalid run
    Assert(AssertArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the schema file (JSON or YAML)
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Path to the document to validate (JSON or YAML)
    #[arg(value_name = "DOCUMENT")]
    pub document: PathBuf,

    /// Accept missing values everywhere
    #[arg(long)]
    pub partial: bool,

    /// Substitute schema fallbacks for missing values
    #[arg(long)]
    pub fallback: bool,

    /// Write the document, with fallbacks applied, to this path
    #[arg(long, value_name = "PATH")]
    pub write: Option<PathBuf>,
}

/// Arguments for the diff command
#[derive(Parser, Debug)]
pub struct DiffArgs {
    /// Path to the schema file (JSON or YAML)
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Source document, or "-" for a missing source
    #[arg(value_name = "SRC")]
    pub src: PathBuf,

    /// Destination document, or "-" for a missing destination
    #[arg(value_name = "DST")]
    pub dst: PathBuf,

    /// A missing source value is not an addition
    #[arg(long)]
    pub src_partial: bool,

    /// A missing destination value is not a removal
    #[arg(long)]
    pub dst_partial: bool,

    /// Print one line per changed path instead of the diff tree
    #[arg(long)]
    pub flat: bool,
}

/// Arguments for the assert command
#[derive(Parser, Debug)]
pub struct AssertArgs {
    /// Path to the schema file (JSON or YAML)
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Document to check, or "-" for a missing document
    #[arg(value_name = "DOCUMENT")]
    pub document: PathBuf,

    /// Accept missing values everywhere
    #[arg(long)]
    pub partial: bool,

    /// Substitute schema fallbacks for missing values
    #[arg(long)]
    pub fallback: bool,

    /// Prefix for the failure message
    #[arg(short, long)]
    pub description: Option<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a project configuration file with default values
    Init(ConfigInitArgs),

    /// Show current configuration values
    Show(ConfigShowArgs),
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Where to write the file
    #[arg(long, default_value = ".jsonshape.toml")]
    pub path: PathBuf,

    /// Force overwrite existing config files
    #[arg(long)]
    pub force: bool,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "toml")]
    pub format: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli::parse_from(["jsonshape", "-vv", "validate", "schema.json", "doc.json"]);
        assert_eq!(cli.verbosity_level(), 2);

        let quiet = Cli::parse_from(["jsonshape", "--quiet", "validate", "schema.json", "doc.json"]);
        assert_eq!(quiet.verbosity_level(), 0);
    }

    #[test]
    fn test_diff_arguments() {
        let cli = Cli::parse_from(["jsonshape", "diff", "s.yaml", "-", "b.json", "--src-partial", "--flat"]);
        let Commands::Diff(args) = cli.command else {
            panic!("expected diff command");
        };
        assert_eq!(args.src, PathBuf::from("-"));
        assert!(args.src_partial);
        assert!(!args.dst_partial);
        assert!(args.flat);
    }

    #[test]
    fn test_output_format_flag() {
        let cli = Cli::parse_from(["jsonshape", "-o", "json-pretty", "completions", "bash"]);
        assert_eq!(cli.output, OutputFormat::JsonPretty);
    }
}
