use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for defprefs
#[derive(Parser, Debug)]
#[command(name = "defprefs")]
#[command(about = "Resolve default preference manifests from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a manifest file or directory and print the resulting defaults
    Resolve {
        /// Manifest file, or a directory of *.js manifests
        path: PathBuf,

        #[command(flatten)]
        build: BuildArgs,

        /// Only show keys matching these glob patterns (may be repeated)
        #[arg(short, long = "query", value_name = "GLOB")]
        query: Vec<String>,

        /// Print the raw value of a single key
        #[arg(short, long, conflicts_with_all = ["query", "output"])]
        get: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputType::JsonObject)]
        output: OutputType,
    },

    /// Print the items of a numbered-key list, e.g. "browser.contentHandlers.types"
    List {
        /// Manifest file, or a directory of *.js manifests
        path: PathBuf,

        #[command(flatten)]
        build: BuildArgs,

        /// Common key prefix of the list items
        #[arg(long)]
        prefix: String,
    },
}

/// Build flags shared by all subcommands
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Target platform (unix, macos, windows, os2)
    #[arg(long)]
    pub platform: Option<String>,

    /// Enable a build feature (may be repeated)
    #[arg(long = "feature", value_name = "FEATURE")]
    pub features: Vec<String>,

    /// Define a guard symbol, NAME or NAME=VALUE (may be repeated)
    #[arg(short = 'D', long = "define", value_name = "NAME[=VALUE]")]
    pub defines: Vec<String>,

    /// JSON build configuration file applied before the other flags
    #[arg(long, value_name = "FILE")]
    pub flags: Option<PathBuf>,

    /// Fail on guard symbols the build configuration does not know
    #[arg(long)]
    pub strict: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputType {
    /// A single JSON object mapping keys to values
    JsonObject,
    /// A JSON array of entries with key, value, kind and source
    JsonArray,
    /// Flattened manifest text
    Prefs,
}
